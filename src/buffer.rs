//! Buffer representation - a collection of lines with associated metadata
//!
//! Lines are stored without their newline. The marker engine addresses the
//! buffer by byte offset into the joined text, so the buffer also converts
//! between offsets and `(line, byte)` positions.

use std::borrow::Cow;
use std::fs;
use std::io::{self, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::line::Line;
use crate::marker::{Position, TextSource};

/// A buffer containing text and metadata
#[derive(Debug)]
pub struct Buffer {
    /// Lines of text
    lines: Vec<Line>,
    /// Buffer name (e.g., "notes.md", "*scratch*")
    name: String,
    /// Associated file path (None for unnamed buffers)
    filename: Option<PathBuf>,
    /// Whether buffer has unsaved changes
    modified: bool,
}

impl Buffer {
    /// Create a new empty buffer with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            lines: vec![Line::new()], // Always have at least one line
            name: name.into(),
            filename: None,
            modified: false,
        }
    }

    /// Create an unnamed buffer holding `text`
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        let mut buffer = Self::new(name);
        buffer.lines = split_lines(text);
        buffer
    }

    /// Create a buffer from file contents; a missing file gives an empty buffer
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e),
        };

        let mut buffer = Self::from_text(name, &content);
        buffer.filename = Some(path.to_path_buf());
        Ok(buffer)
    }

    /// Get buffer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get filename if set
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Check if buffer is modified
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Get number of lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get a line by index
    pub fn line(&self, idx: usize) -> Option<&Line> {
        self.lines.get(idx)
    }

    /// Byte offset of the start of line `idx` in the joined text
    pub fn line_start(&self, idx: usize) -> usize {
        self.lines[..idx.min(self.lines.len())]
            .iter()
            .map(|line| line.len() + 1)
            .sum()
    }

    /// Convert a position to a byte offset, clamping the column to the line
    pub fn offset_of(&self, pos: Position) -> usize {
        let line = pos.line.min(self.lines.len() - 1);
        self.line_start(line) + pos.ch.min(self.lines[line].len())
    }

    /// Convert a byte offset to a position; offsets past the end clamp to it
    pub fn position_of(&self, offset: usize) -> Position {
        let mut start = 0;
        for (idx, line) in self.lines.iter().enumerate() {
            let end = start + line.len();
            if offset <= end || idx + 1 == self.lines.len() {
                return Position::new(idx, offset.saturating_sub(start).min(line.len()));
            }
            start = end + 1;
        }
        Position::new(0, 0)
    }

    /// The whole text with lines joined by `\n`
    pub fn text(&self) -> String {
        self.slice(0..TextSource::len(self)).into_owned()
    }

    /// Insert a character at position
    pub fn insert_char(&mut self, line_idx: usize, byte_pos: usize, ch: char) {
        if let Some(line) = self.lines.get_mut(line_idx) {
            line.insert_char(byte_pos.min(line.len()), ch);
            self.modified = true;
        }
    }

    /// Insert a newline, splitting the current line
    pub fn insert_newline(&mut self, line_idx: usize, byte_pos: usize) {
        if let Some(line) = self.lines.get_mut(line_idx) {
            let new_line = line.split_off(byte_pos);
            self.lines.insert(line_idx + 1, new_line);
            self.modified = true;
        }
    }

    /// Replace a byte range within one line
    pub fn replace_in_line(&mut self, line_idx: usize, range: Range<usize>, with: &str) {
        if let Some(line) = self.lines.get_mut(line_idx) {
            line.replace_range(range, with);
            self.modified = true;
        }
    }

    /// Delete the character at position, returns the deleted char
    pub fn delete_char(&mut self, line_idx: usize, byte_pos: usize) -> Option<char> {
        let line = self.lines.get_mut(line_idx)?;
        let ch = line.text().get(byte_pos..)?.chars().next()?;
        line.delete_range(byte_pos, byte_pos + ch.len_utf8());
        self.modified = true;
        Some(ch)
    }

    /// Delete backward (backspace), returns the deleted char and new position
    pub fn delete_backward(&mut self, line_idx: usize, byte_pos: usize) -> Option<(char, usize)> {
        if byte_pos == 0 {
            return None;
        }
        let line = self.lines.get_mut(line_idx)?;
        let new_pos = line.prev_char_boundary(byte_pos);
        let removed = line.delete_range(new_pos, byte_pos);
        let ch = removed.chars().next()?;
        self.modified = true;
        Some((ch, new_pos))
    }

    /// Join line with the next line (delete newline at end of line)
    pub fn join_line(&mut self, line_idx: usize) -> bool {
        if line_idx + 1 >= self.lines.len() {
            return false;
        }
        let next_line = self.lines.remove(line_idx + 1);
        self.lines[line_idx].append(next_line);
        self.modified = true;
        true
    }

    /// Join with previous line (when backspacing at start of line)
    pub fn join_with_previous(&mut self, line_idx: usize) -> Option<usize> {
        if line_idx == 0 || line_idx >= self.lines.len() {
            return None;
        }
        let current_line = self.lines.remove(line_idx);
        let prev_line = &mut self.lines[line_idx - 1];
        let join_pos = prev_line.len();
        prev_line.append(current_line);
        self.modified = true;
        Some(join_pos)
    }

    /// Write buffer to its file
    pub fn save(&mut self) -> io::Result<()> {
        let path = self
            .filename
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "No filename set"))?;
        self.write_to(&path)?;
        self.modified = false;
        Ok(())
    }

    /// Write buffer to specific path
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        for (i, line) in self.lines.iter().enumerate() {
            write!(file, "{}", line.text())?;
            if i + 1 < self.lines.len() {
                writeln!(file)?;
            }
        }
        Ok(())
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new("*scratch*")
    }
}

impl TextSource for Buffer {
    fn len(&self) -> usize {
        self.lines.iter().map(Line::len).sum::<usize>() + self.lines.len() - 1
    }

    fn is_char_boundary(&self, offset: usize) -> bool {
        let pos = self.position_of(offset);
        self.line(pos.line).map_or(true, |l| l.text().is_char_boundary(pos.ch))
    }

    fn slice(&self, range: Range<usize>) -> Cow<'_, str> {
        let last = self.lines.len() - 1;
        let mut out = String::new();
        let mut start = 0;

        for (idx, line) in self.lines.iter().enumerate() {
            let end = start + line.len();
            if start >= range.end {
                break;
            }
            if range.start <= end {
                let from = range.start.saturating_sub(start);
                let to = (range.end - start).min(line.len());
                if from < to {
                    out.push_str(line.text().get(from..to).unwrap_or(""));
                }
                if idx < last && range.end > end {
                    out.push('\n');
                }
            }
            start = end + 1;
        }

        Cow::Owned(out)
    }
}

fn split_lines(text: &str) -> Vec<Line> {
    let mut lines: Vec<Line> = text
        .split('\n')
        .map(|l| Line::from(l.strip_suffix('\r').unwrap_or(l)))
        .collect();
    // A trailing newline does not start another line
    if lines.len() > 1 && text.ends_with('\n') {
        lines.pop();
    }
    lines
}
