//! Enter-key continuation of prefix-only markers
//!
//! Runs after the host has inserted the newline. If the line the cursor just
//! left starts with a continuing prefix, the prefix is carried onto the new
//! line. A line holding nothing but the prefix is treated as an empty marker:
//! the prefix is removed instead of being propagated, which ends the run.

use std::ops::Range;

/// Line/column position; `ch` is a byte offset within the line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// Line-oriented text and cursor access provided by the host editor
pub trait LineEditor {
    fn cursor(&self) -> Position;

    fn set_cursor(&mut self, pos: Position);

    /// Text of a line without its terminator
    fn line(&self, line: usize) -> Option<&str>;

    /// Replace a byte range within one line
    fn replace_in_line(&mut self, line: usize, range: Range<usize>, text: &str);
}

/// What the handler did with an Enter press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// No continuing prefix; default behavior stands
    Ignored,
    /// The previous line held only the prefix, which was deleted
    RemovedEmptyMarker { line: usize },
    /// The prefix was inserted at the start of the new line
    Continued { line: usize, prefix: String },
}

impl Continuation {
    /// Whether the host should skip its own post-Enter handling
    pub fn is_handled(&self) -> bool {
        !matches!(self, Continuation::Ignored)
    }
}

/// Handle an Enter press whose newline has already been inserted
///
/// `prefixes` are tried in order; the first one the previous line starts
/// with wins.
pub fn handle_enter<'p, E, I>(editor: &mut E, prefixes: I) -> Continuation
where
    E: LineEditor + ?Sized,
    I: IntoIterator<Item = &'p str>,
{
    let cursor = editor.cursor();
    if cursor.line == 0 {
        return Continuation::Ignored;
    }
    let previous = cursor.line - 1;

    let (prefix, only_prefix) = {
        let text = match editor.line(previous) {
            Some(text) => text,
            None => return Continuation::Ignored,
        };
        match prefixes.into_iter().find(|p| !p.is_empty() && text.starts_with(p)) {
            Some(prefix) => (prefix, text == prefix),
            None => return Continuation::Ignored,
        }
    };

    if only_prefix {
        editor.replace_in_line(previous, 0..prefix.len(), "");
        tracing::debug!("removed empty marker {:?} on line {}", prefix, previous);
        Continuation::RemovedEmptyMarker { line: previous }
    } else {
        editor.replace_in_line(cursor.line, 0..0, prefix);
        editor.set_cursor(Position::new(cursor.line, prefix.len()));
        tracing::debug!("continued marker {:?} onto line {}", prefix, cursor.line);
        Continuation::Continued {
            line: cursor.line,
            prefix: prefix.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lines {
        lines: Vec<String>,
        cursor: Position,
    }

    impl Lines {
        /// Lines as they look right after Enter was pressed at the end of `before`
        fn after_enter(before: &[&str]) -> Self {
            let mut lines: Vec<String> = before.iter().map(|s| s.to_string()).collect();
            lines.push(String::new());
            let cursor = Position::new(lines.len() - 1, 0);
            Self { lines, cursor }
        }
    }

    impl LineEditor for Lines {
        fn cursor(&self) -> Position {
            self.cursor
        }

        fn set_cursor(&mut self, pos: Position) {
            self.cursor = pos;
        }

        fn line(&self, line: usize) -> Option<&str> {
            self.lines.get(line).map(|s| s.as_str())
        }

        fn replace_in_line(&mut self, line: usize, range: Range<usize>, text: &str) {
            self.lines[line].replace_range(range, text);
        }
    }

    #[test]
    fn test_continues_prefix() {
        let mut lines = Lines::after_enter(&["# heading"]);
        let result = handle_enter(&mut lines, ["# "]);

        assert_eq!(result, Continuation::Continued { line: 1, prefix: "# ".into() });
        assert_eq!(lines.lines, vec!["# heading", "# "]);
        assert_eq!(lines.cursor, Position::new(1, 2));
        assert!(result.is_handled());
    }

    #[test]
    fn test_empty_marker_removed() {
        let mut lines = Lines::after_enter(&["# item", "# "]);
        let result = handle_enter(&mut lines, ["# "]);

        assert_eq!(result, Continuation::RemovedEmptyMarker { line: 1 });
        assert_eq!(lines.lines, vec!["# item", "", ""]);
        assert_eq!(lines.cursor, Position::new(2, 0));
    }

    #[test]
    fn test_no_prefix_ignored() {
        let mut lines = Lines::after_enter(&["plain"]);
        let result = handle_enter(&mut lines, ["# ", "> "]);

        assert_eq!(result, Continuation::Ignored);
        assert!(!result.is_handled());
        assert_eq!(lines.lines, vec!["plain", ""]);
    }

    #[test]
    fn test_first_prefix_wins() {
        let mut lines = Lines::after_enter(&["- - nested"]);
        handle_enter(&mut lines, ["- ", "- - "]);
        assert_eq!(lines.lines[1], "- ");
    }

    #[test]
    fn test_split_line_keeps_tail() {
        // Enter pressed in the middle of "> quoted": the tail moved down
        let mut lines = Lines {
            lines: vec!["> quo".to_string(), "ted".to_string()],
            cursor: Position::new(1, 0),
        };
        handle_enter(&mut lines, ["> "]);

        assert_eq!(lines.lines, vec!["> quo", "> ted"]);
        assert_eq!(lines.cursor, Position::new(1, 2));
    }

    #[test]
    fn test_first_line_ignored() {
        let mut lines = Lines {
            lines: vec!["# ".to_string()],
            cursor: Position::new(0, 2),
        };
        assert_eq!(handle_enter(&mut lines, ["# "]), Continuation::Ignored);
    }
}
