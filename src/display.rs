//! Display rendering
//!
//! Draws the window through the current decorations: hidden ranges take no
//! columns, marked ranges get the style of their class, and dimmed marks are
//! drawn faint. The selection is overlaid in reverse video.

use unicode_width::UnicodeWidthChar;

use crate::buffer::Buffer;
use crate::error::Result;
use crate::marker::{Decoration, DecorationKind, Selection};
use crate::style::{Style, StyleTable};
use crate::terminal::Terminal;
use crate::window::Window;

/// View flags shown on the mode line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewStatus {
    pub live: bool,
    pub has_focus: bool,
}

/// A line broken into styled runs, with hidden text removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineLayout {
    pub runs: Vec<(Style, String)>,
    /// Display column of the requested cursor byte, if it was on this line
    pub cursor_col: Option<usize>,
}

/// Lay out one line of text starting at document offset `line_start`
///
/// `decorations` must be sorted and disjoint. `cursor` is a byte offset
/// within the line.
pub fn layout_line(
    text: &str,
    line_start: usize,
    decorations: &[Decoration],
    styles: &StyleTable,
    selection: Selection,
    cursor: Option<usize>,
) -> LineLayout {
    let mut layout = LineLayout::default();
    let mut col = 0;
    let mut idx = decorations.partition_point(|d| d.end <= line_start);

    for (byte, ch) in text.char_indices() {
        if cursor == Some(byte) {
            layout.cursor_col = Some(col);
        }

        let pos = line_start + byte;
        while idx < decorations.len() && decorations[idx].end <= pos {
            idx += 1;
        }

        let mut style = Style::default();
        if let Some(deco) = decorations.get(idx).filter(|d| d.contains(pos)) {
            match &deco.kind {
                DecorationKind::ReplaceWithEmpty => continue,
                DecorationKind::Mark { class, dimmed } => {
                    style = styles.get(class);
                    style.dim = *dimmed;
                }
            }
        }
        if pos >= selection.from && pos < selection.to {
            style.reverse = true;
        }

        match layout.runs.last_mut() {
            Some((last, run)) if *last == style => run.push(ch),
            _ => layout.runs.push((style, ch.to_string())),
        }
        col += ch.width().unwrap_or(1);
    }

    if cursor.is_some_and(|c| c >= text.len()) {
        layout.cursor_col = Some(col);
    }
    layout
}

/// Byte offset within the line drawn at display column `target`
///
/// Hidden ranges take no columns, so a click lands after them.
pub fn column_to_byte(text: &str, line_start: usize, decorations: &[Decoration], target: usize) -> usize {
    let mut col = 0;
    for (byte, ch) in text.char_indices() {
        let pos = line_start + byte;
        if decorations.iter().any(|d| d.is_hidden() && d.contains(pos)) {
            continue;
        }
        if col >= target {
            return byte;
        }
        col += ch.width().unwrap_or(1);
    }
    text.len()
}

/// Display state
pub struct Display {
    /// Whether a full redraw is needed
    needs_redraw: bool,
    /// Message to show in minibuffer (bottom line)
    message: Option<String>,
}

impl Display {
    pub fn new() -> Self {
        Self {
            needs_redraw: true,
            message: None,
        }
    }

    /// Mark that a full redraw is needed
    pub fn force_redraw(&mut self) {
        self.needs_redraw = true;
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Render the editor display
    pub fn render(
        &mut self,
        terminal: &mut Terminal,
        window: &Window,
        buffer: &Buffer,
        decorations: &[Decoration],
        styles: &StyleTable,
        status: ViewStatus,
    ) -> Result<()> {
        let cols = terminal.cols() as usize;
        let rows = terminal.rows();

        terminal.set_cursor_visible(false)?;
        if self.needs_redraw {
            terminal.clear_screen()?;
        }

        let selection = match window.mark() {
            Some(_) => window.selection(buffer),
            None => Selection::default(),
        };

        let mut cursor_screen = (window.top_row(), 0);
        for row_offset in 0..window.height() {
            let screen_row = window.top_row() + row_offset;
            let line_idx = window.top_line() + row_offset as usize;
            terminal.move_cursor(screen_row, 0)?;

            match buffer.line(line_idx) {
                Some(line) => {
                    let cursor = (line_idx == window.cursor_line()).then(|| window.cursor_col());
                    let layout = layout_line(
                        line.text(),
                        buffer.line_start(line_idx),
                        decorations,
                        styles,
                        selection,
                        cursor,
                    );
                    if let Some(col) = layout.cursor_col {
                        cursor_screen = (screen_row, col);
                    }
                    self.render_runs(terminal, &layout.runs, cols)?;
                }
                None => {
                    // Empty line indicator (like vim's ~)
                    terminal.apply_style(&Style::default().with_dim())?;
                    terminal.write_str("~")?;
                    terminal.reset_attributes()?;
                }
            }

            terminal.clear_to_eol()?;
        }

        let mode_line_row = window.top_row() + window.height();
        self.render_mode_line(terminal, buffer, window, mode_line_row, cols, status)?;
        self.render_minibuffer(terminal, rows.saturating_sub(1), cols)?;

        let (row, col) = cursor_screen;
        terminal.move_cursor(row, col.min(cols.saturating_sub(1)) as u16)?;
        terminal.set_cursor_visible(true)?;
        terminal.flush()?;

        self.needs_redraw = false;
        Ok(())
    }

    fn render_runs(&self, terminal: &mut Terminal, runs: &[(Style, String)], cols: usize) -> Result<()> {
        let mut used = 0;
        for (style, text) in runs {
            if used >= cols {
                break;
            }
            let shown = truncate_to_width(text, cols - used);
            used += unicode_width::UnicodeWidthStr::width(shown.as_str());
            if style.is_default() {
                terminal.write_str(&shown)?;
            } else {
                terminal.apply_style(style)?;
                terminal.write_str(&shown)?;
                terminal.reset_attributes()?;
            }
        }
        Ok(())
    }

    /// Render the mode line for the window
    fn render_mode_line(
        &self,
        terminal: &mut Terminal,
        buffer: &Buffer,
        window: &Window,
        row: u16,
        cols: usize,
        status: ViewStatus,
    ) -> Result<()> {
        terminal.move_cursor(row, 0)?;
        terminal.apply_style(&Style::reverse())?;

        let modified = if buffer.is_modified() { "**" } else { "--" };
        let filename = buffer
            .filename()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| "no file".to_string());
        let mode = if status.live { "LIVE" } else { "SOURCE" };
        let focus = if status.has_focus { "" } else { " (unfocused)" };

        // Format: ---- markfold: name (filename) L12 [LIVE] ----
        let mode_line = format!(
            "{}-- markfold: {} ({}) L{} [{}]{} ",
            modified,
            buffer.name(),
            filename,
            window.cursor_line() + 1,
            mode,
            focus
        );

        let width = unicode_width::UnicodeWidthStr::width(mode_line.as_str());
        let padded = if width < cols {
            format!("{}{}", mode_line, "-".repeat(cols - width))
        } else {
            truncate_to_width(&mode_line, cols)
        };

        terminal.write_str(&padded)?;
        terminal.reset_attributes()?;
        Ok(())
    }

    /// Render the minibuffer (message area)
    fn render_minibuffer(&self, terminal: &mut Terminal, row: u16, cols: usize) -> Result<()> {
        terminal.move_cursor(row, 0)?;
        if let Some(ref msg) = self.message {
            terminal.write_str(&truncate_to_width(msg, cols))?;
        }
        terminal.clear_to_eol()?;
        Ok(())
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate a string to fit within a display width
fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut width = 0;

    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(1);
        if width + ch_width > max_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::{MarkerEngine, Observation, Precedence, RebuildPolicy, Rule, RuleSet};
    use crate::style::Color;

    fn decorations(doc: &str, cursor: usize, has_focus: bool) -> Vec<Decoration> {
        let rules = RuleSet::compile(
            &[Rule::new("//text//", "color-yellow", false)],
            "text",
            Precedence::default(),
        )
        .unwrap();
        let mut engine = MarkerEngine::new(rules, RebuildPolicy::default());
        let obs = Observation {
            cursor,
            selection: Selection::cursor(cursor),
            has_focus,
            visible: vec![0..doc.len()],
            live: true,
        };
        engine.rebuild(doc, &obs).to_vec()
    }

    fn visible_text(layout: &LineLayout) -> String {
        layout.runs.iter().map(|(_, s)| s.as_str()).collect()
    }

    #[test]
    fn test_rendered_marker_hides_delimiters() {
        let doc = "a //hi// b";
        let decos = decorations(doc, 0, true);
        let styles = StyleTable::with_defaults();
        let layout = layout_line(doc, 0, &decos, &styles, Selection::default(), Some(9));

        assert_eq!(visible_text(&layout), "a hi b");
        assert_eq!(layout.runs[1], (Style::fg(Color::Yellow), "hi".to_string()));
        // Four hidden delimiter bytes before the cursor
        assert_eq!(layout.cursor_col, Some(5));
    }

    #[test]
    fn test_raw_marker_dims_delimiters() {
        let doc = "//hi//";
        let decos = decorations(doc, 3, true);
        let styles = StyleTable::with_defaults();
        let layout = layout_line(doc, 0, &decos, &styles, Selection::default(), None);

        assert_eq!(visible_text(&layout), doc);
        let delimiter = Style::fg(Color::Yellow).with_dim();
        assert_eq!(layout.runs[0], (delimiter, "//".to_string()));
        assert_eq!(layout.runs[1], (Style::fg(Color::Yellow), "hi".to_string()));
        assert_eq!(layout.runs[2], (delimiter, "//".to_string()));
    }

    #[test]
    fn test_line_offset_into_document() {
        let doc = "first\n//x//";
        let decos = decorations(doc, 0, false);
        let styles = StyleTable::with_defaults();
        let layout = layout_line(&doc[6..], 6, &decos, &styles, Selection::default(), None);
        assert_eq!(visible_text(&layout), "x");
    }

    #[test]
    fn test_selection_reverse() {
        let styles = StyleTable::new();
        let layout = layout_line("abcd", 0, &[], &styles, Selection::new(1, 3), None);
        assert_eq!(layout.runs.len(), 3);
        assert_eq!(layout.runs[1], (Style::reverse(), "bc".to_string()));
    }

    #[test]
    fn test_column_to_byte_skips_hidden() {
        let doc = "//hi// x";
        let decos = decorations(doc, 7, true);
        // Rendered as "hi x"
        assert_eq!(column_to_byte(doc, 0, &decos, 0), 2);
        assert_eq!(column_to_byte(doc, 0, &decos, 1), 3);
        assert_eq!(column_to_byte(doc, 0, &decos, 3), 7);
        assert_eq!(column_to_byte(doc, 0, &decos, 50), 8);
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("你好x", 3), "你");
        assert_eq!(truncate_to_width("abc", 10), "abc");
    }
}
