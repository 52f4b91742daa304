//! Line representation and text operations

use std::ops::Range;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// A single line of text in a buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    /// The text content (without trailing newline)
    text: String,
}

impl Line {
    /// Create a new empty line
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a line from a string
    pub fn from_string(s: String) -> Self {
        Self { text: s }
    }

    /// Get the text content
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if line is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Insert a character at byte position
    pub fn insert_char(&mut self, byte_pos: usize, ch: char) {
        self.text.insert(byte_pos, ch);
    }

    /// Replace a byte range, returning the removed text
    ///
    /// The range is clamped to the line and widened to char boundaries.
    pub fn replace_range(&mut self, range: Range<usize>, with: &str) -> String {
        let end = self.ceil_char_boundary(range.end);
        let start = self.floor_char_boundary(range.start.min(end));
        let removed = self.text[start..end].to_string();
        self.text.replace_range(start..end, with);
        removed
    }

    /// Delete a range of bytes and return the deleted text
    pub fn delete_range(&mut self, start: usize, end: usize) -> String {
        self.replace_range(start..end, "")
    }

    /// Split the line at byte position, returning the remainder
    pub fn split_off(&mut self, byte_pos: usize) -> Line {
        let pos = self.floor_char_boundary(byte_pos);
        Line::from_string(self.text.split_off(pos))
    }

    /// Append another line's content to this line
    pub fn append(&mut self, other: Line) {
        self.text.push_str(other.text());
    }

    /// Byte position of the character before `byte_pos`
    pub fn prev_char_boundary(&self, byte_pos: usize) -> usize {
        self.text[..byte_pos.min(self.text.len())]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    /// Byte position after the character at `byte_pos`
    pub fn next_char_boundary(&self, byte_pos: usize) -> usize {
        self.text[byte_pos.min(self.text.len())..]
            .chars()
            .next()
            .map_or(self.text.len(), |ch| byte_pos + ch.len_utf8())
    }

    /// Get byte position for a display column, clamped to the line end
    pub fn col_to_byte(&self, col: usize) -> usize {
        let mut current_col = 0;
        for (byte_idx, ch) in self.text.char_indices() {
            if current_col >= col {
                return byte_idx;
            }
            current_col += ch.width().unwrap_or(1);
        }
        self.text.len()
    }

    /// Get display column for a byte position
    pub fn byte_to_col(&self, byte_pos: usize) -> usize {
        let pos = self.floor_char_boundary(byte_pos);
        self.text[..pos].width()
    }

    fn floor_char_boundary(&self, pos: usize) -> usize {
        let mut p = pos.min(self.text.len());
        while p > 0 && !self.text.is_char_boundary(p) {
            p -= 1;
        }
        p
    }

    fn ceil_char_boundary(&self, pos: usize) -> usize {
        let mut p = pos.min(self.text.len());
        while p < self.text.len() && !self.text.is_char_boundary(p) {
            p += 1;
        }
        p
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Self {
        Self::from_string(s.to_string())
    }
}

impl From<String> for Line {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_line_operations() {
        let mut line = Line::from("Hello");
        assert_eq!(line.text(), "Hello");
        assert_eq!(line.len(), 5);
        assert!(!line.is_empty());

        line.insert_char(5, '!');
        assert_eq!(line.text(), "Hello!");
    }

    #[test]
    fn test_replace_range() {
        let mut line = Line::from("# heading");
        let removed = line.replace_range(0..2, "> ");
        assert_eq!(removed, "# ");
        assert_eq!(line.text(), "> heading");

        line.replace_range(0..0, "- ");
        assert_eq!(line.text(), "- > heading");
    }

    #[test]
    fn test_replace_range_clamps() {
        let mut line = Line::from("café");
        // Position 4 is inside 'é'
        line.replace_range(4..100, "e");
        assert_eq!(line.text(), "cafe");
    }

    #[test]
    fn test_char_boundaries() {
        let line = Line::from("a😀b");
        assert_eq!(line.next_char_boundary(1), 5);
        assert_eq!(line.prev_char_boundary(5), 1);
        assert_eq!(line.prev_char_boundary(0), 0);
        assert_eq!(line.next_char_boundary(6), 6);
    }

    #[test]
    fn test_columns_wide_chars() {
        let line = Line::from("你好x");
        assert_eq!(line.byte_to_col(3), 2);
        assert_eq!(line.byte_to_col(6), 4);
        assert_eq!(line.col_to_byte(4), 6);
        assert_eq!(line.col_to_byte(99), 7);
    }

    #[test]
    fn test_split_off() {
        let mut line = Line::from("Hello World");
        let remainder = line.split_off(6);
        assert_eq!(line.text(), "Hello ");
        assert_eq!(remainder.text(), "World");
    }

    #[test]
    fn test_append() {
        let mut line = Line::from("Hello ");
        line.append(Line::from("World"));
        assert_eq!(line.text(), "Hello World");
    }
}
