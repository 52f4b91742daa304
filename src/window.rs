//! Window representation - a viewport into a buffer

use std::ops::Range;

use crate::buffer::Buffer;
use crate::marker::{Position, Selection};

/// A window displaying a portion of a buffer
#[derive(Debug)]
pub struct Window {
    /// First visible line in the window
    top_line: usize,
    /// Cursor line position (0-indexed)
    cursor_line: usize,
    /// Cursor column position (byte offset within line)
    cursor_col: usize,
    /// Selection anchor; the cursor is the other end
    mark: Option<Position>,
    /// Row on screen where window starts
    top_row: u16,
    /// Number of text rows in window (excluding mode line)
    height: u16,
    /// Goal column for vertical movement
    goal_col: usize,
}

impl Window {
    pub fn new(top_row: u16, height: u16) -> Self {
        Self {
            top_line: 0,
            cursor_line: 0,
            cursor_col: 0,
            mark: None,
            top_row,
            height,
            goal_col: 0,
        }
    }

    /// Get the first visible line
    pub fn top_line(&self) -> usize {
        self.top_line
    }

    /// Get cursor line
    pub fn cursor_line(&self) -> usize {
        self.cursor_line
    }

    /// Cursor column (byte offset)
    pub fn cursor_col(&self) -> usize {
        self.cursor_col
    }

    pub fn cursor(&self) -> Position {
        Position::new(self.cursor_line, self.cursor_col)
    }

    /// Set cursor position
    pub fn set_cursor(&mut self, line: usize, col: usize) {
        self.cursor_line = line;
        self.cursor_col = col;
    }

    pub fn goal_col(&self) -> usize {
        self.goal_col
    }

    pub fn set_goal_col(&mut self, col: usize) {
        self.goal_col = col;
    }

    /// Get mark position
    pub fn mark(&self) -> Option<Position> {
        self.mark
    }

    /// Set mark at current cursor position
    pub fn set_mark(&mut self) {
        self.mark = Some(self.cursor());
    }

    pub fn set_mark_at(&mut self, pos: Position) {
        self.mark = Some(pos);
    }

    /// Clear the mark
    pub fn clear_mark(&mut self) {
        self.mark = None;
    }

    /// Replace the selection with a bare cursor at `pos`
    ///
    /// Returns whether the cursor or the selection changed.
    pub fn collapse_to(&mut self, pos: Position) -> bool {
        let changed = self.mark.take().is_some() || self.cursor() != pos;
        self.set_cursor(pos.line, pos.ch);
        changed
    }

    pub fn top_row(&self) -> u16 {
        self.top_row
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn set_height(&mut self, height: u16) {
        self.height = height;
    }

    /// Ensure cursor is visible, adjusting top_line if needed
    ///
    /// Returns whether the window scrolled.
    pub fn ensure_cursor_visible(&mut self) -> bool {
        let top = self.top_line;
        if self.cursor_line < self.top_line {
            self.top_line = self.cursor_line;
        } else if self.cursor_line >= self.top_line + self.height.max(1) as usize {
            self.top_line = self.cursor_line + 1 - self.height.max(1) as usize;
        }
        top != self.top_line
    }

    /// Get the buffer line shown at a screen row
    pub fn screen_row_to_line(&self, row: u16) -> Option<usize> {
        if row < self.top_row || row >= self.top_row + self.height {
            return None;
        }
        Some(self.top_line + (row - self.top_row) as usize)
    }

    /// Scroll by whole pages, keeping the cursor on screen
    pub fn scroll_pages(&mut self, pages: isize, line_count: usize) {
        let step = (self.height as usize).saturating_sub(2).max(1);
        let max_top = line_count.saturating_sub(1);
        self.top_line = if pages < 0 {
            self.top_line.saturating_sub(step * pages.unsigned_abs())
        } else {
            (self.top_line + step * pages as usize).min(max_top)
        };
        let bottom = self.top_line + (self.height as usize).max(1) - 1;
        self.cursor_line = self.cursor_line.clamp(self.top_line, bottom.min(max_top));
    }

    /// Byte range of the buffer shown in this window
    pub fn visible_range(&self, buffer: &Buffer) -> Range<usize> {
        let last_line = buffer.line_count() - 1;
        let top = self.top_line.min(last_line);
        let bottom = (self.top_line + (self.height as usize).max(1) - 1).min(last_line);
        let start = buffer.line_start(top);
        let end = buffer.line_start(bottom) + buffer.line(bottom).map_or(0, |l| l.len());
        start..end
    }

    /// Selection in buffer offsets, anchored at the mark if one is set
    pub fn selection(&self, buffer: &Buffer) -> Selection {
        let head = buffer.offset_of(self.cursor());
        match self.mark {
            Some(mark) => Selection::new(buffer.offset_of(mark), head),
            None => Selection::cursor(head),
        }
    }
}
