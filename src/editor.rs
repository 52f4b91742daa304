//! Editor state and main loop
//!
//! Each frame starts by applying a pending cursor snap, then lets the marker
//! engine rebuild if the last input calls for it, then draws and waits for
//! the next event.

use std::ops::Range;
use std::path::Path;

use crate::buffer::Buffer;
use crate::display::{column_to_byte, Display, ViewStatus};
use crate::error::Result;
use crate::input::{Action, InputState};
use crate::marker::{handle_enter, Continuation, LineEditor, MarkerEngine, Observation, Position, ViewUpdate};
use crate::style::StyleTable;
use crate::terminal::Terminal;
use crate::window::Window;

/// Buffer text plus window cursor, as seen by the Enter continuation
struct CursorView<'a> {
    buffer: &'a mut Buffer,
    window: &'a mut Window,
}

impl LineEditor for CursorView<'_> {
    fn cursor(&self) -> Position {
        self.window.cursor()
    }

    fn set_cursor(&mut self, pos: Position) {
        self.window.set_cursor(pos.line, pos.ch);
    }

    fn line(&self, line: usize) -> Option<&str> {
        self.buffer.line(line).map(|l| l.text())
    }

    fn replace_in_line(&mut self, line: usize, range: Range<usize>, text: &str) {
        self.buffer.replace_in_line(line, range, text);
    }
}

/// Put a bare cursor at `offset`, dropping any selection around it
fn snap_cursor(buffer: &Buffer, window: &mut Window, offset: usize) -> bool {
    let pos = buffer.position_of(offset);
    let changed = window.collapse_to(pos);
    if changed {
        tracing::trace!("cursor snap to {:?}", pos);
    }
    changed
}

/// Main editor state
pub struct EditorState {
    pub buffer: Buffer,
    pub window: Window,
    pub terminal: Terminal,
    pub display: Display,
    pub input: InputState,
    /// Marker decorations for the window
    pub engine: MarkerEngine,
    /// Style classes used by marker rules
    pub styles: StyleTable,
    /// Live rendering (markers folded) vs. source mode
    pub live: bool,
    /// Whether the terminal has focus
    pub has_focus: bool,
    /// Whether editor is running
    pub running: bool,
}

impl EditorState {
    pub fn new(terminal: Terminal, engine: MarkerEngine, styles: StyleTable, live: bool) -> Self {
        // Leave 1 row for mode line, 1 for minibuffer
        let height = terminal.rows().saturating_sub(2);

        Self {
            buffer: Buffer::default(),
            window: Window::new(0, height),
            terminal,
            display: Display::new(),
            input: InputState::new(),
            engine,
            styles,
            live,
            has_focus: true,
            running: true,
        }
    }

    /// Open a file; a missing file starts an empty buffer with that name
    pub fn open_file(&mut self, path: &Path) -> Result<()> {
        self.buffer = Buffer::from_file(path)?;
        self.window = Window::new(0, self.window.height());
        Ok(())
    }

    /// What the marker engine needs to know about the view
    pub fn observation(&self) -> Observation {
        Observation {
            cursor: self.buffer.offset_of(self.window.cursor()),
            selection: self.window.selection(&self.buffer),
            has_focus: self.has_focus,
            visible: vec![self.window.visible_range(&self.buffer)],
            live: self.live,
        }
    }

    /// Run the main editor loop
    pub fn run(&mut self) -> Result<()> {
        self.display.force_redraw();
        let mut update = ViewUpdate::all();

        while self.running {
            if let Some(offset) = self.engine.take_snap() {
                update.selection_set |= self.apply_snap(offset);
            }

            let obs = self.observation();
            self.engine.update(&self.buffer, &obs, update);

            self.display.render(
                &mut self.terminal,
                &self.window,
                &self.buffer,
                self.engine.decorations(),
                &self.styles,
                ViewStatus {
                    live: self.live,
                    has_focus: self.has_focus,
                },
            )?;

            update = ViewUpdate::default();

            // A snap scheduled by this frame's rebuild applies on the next frame
            if self.engine.has_pending_snap() {
                continue;
            }

            let event = self.terminal.read_event()?;
            match self.input.translate(event) {
                Some(action) => update = self.handle_action(action)?,
                None if self.input.is_pending() => self.display.set_message("C-x -"),
                None => {}
            }
        }

        Ok(())
    }

    /// Collapse the selection to a snapped offset; returns whether it changed
    fn apply_snap(&mut self, offset: usize) -> bool {
        if !snap_cursor(&self.buffer, &mut self.window, offset) {
            return false;
        }
        self.update_goal_col();
        true
    }

    /// Apply one action and report what it changed
    pub fn handle_action(&mut self, action: Action) -> Result<ViewUpdate> {
        let mut update = ViewUpdate::default();
        self.display.clear_message();

        match action {
            Action::Insert(ch) => {
                self.insert_char(ch);
                update.doc_changed = true;
            }
            Action::Newline => {
                self.newline();
                update.doc_changed = true;
            }
            Action::DeleteBackward => update.doc_changed = self.delete_backward(),
            Action::DeleteForward => update.doc_changed = self.delete_forward(),
            Action::Left => update.selection_set = self.move_cursor_left(),
            Action::Right => update.selection_set = self.move_cursor_right(),
            Action::Up => update.selection_set = self.move_cursor_vertical(-1),
            Action::Down => update.selection_set = self.move_cursor_vertical(1),
            Action::LineStart => {
                let line = self.window.cursor_line();
                self.window.set_cursor(line, 0);
                self.window.set_goal_col(0);
                update.selection_set = true;
            }
            Action::LineEnd => {
                let line = self.window.cursor_line();
                let len = self.buffer.line(line).map_or(0, |l| l.len());
                self.window.set_cursor(line, len);
                self.update_goal_col();
                update.selection_set = true;
            }
            Action::PageUp | Action::PageDown => {
                let pages = if action == Action::PageUp { -1 } else { 1 };
                self.window.scroll_pages(pages, self.buffer.line_count());
                let col = self.col_in_line(self.window.cursor_line(), self.window.goal_col());
                self.window.set_cursor(self.window.cursor_line(), col);
                update.viewport_changed = true;
                update.selection_set = true;
            }
            Action::ToggleMark => {
                if self.window.mark().is_some() {
                    self.window.clear_mark();
                    self.display.set_message("Mark cleared");
                } else {
                    self.window.set_mark();
                    self.display.set_message("Mark set");
                }
                update.selection_set = true;
            }
            Action::ToggleLive => {
                self.live = !self.live;
                self.display.set_message(if self.live { "Live mode" } else { "Source mode" });
                update.geometry_changed = true;
            }
            Action::Save => self.save(),
            Action::Quit => self.running = false,
            Action::Cancel => {
                if self.window.mark().is_some() {
                    self.window.clear_mark();
                    update.selection_set = true;
                }
                self.display.set_message("Quit");
            }
            Action::PointerDown { row, col } => {
                self.window.clear_mark();
                if let Some(pos) = self.screen_to_position(row, col) {
                    self.window.set_cursor(pos.line, pos.ch);
                    self.window.set_mark_at(pos);
                    self.update_goal_col();
                    update.selection_set = true;
                }
            }
            Action::PointerDrag { row, col } => {
                if let Some(pos) = self.screen_to_position(row, col) {
                    self.window.set_cursor(pos.line, pos.ch);
                    update.selection_set = true;
                }
            }
            Action::PointerUp { row, col } => {
                if let Some(pos) = self.screen_to_position(row, col) {
                    self.window.set_cursor(pos.line, pos.ch);
                    self.update_goal_col();
                }
                // A click without a drag leaves no selection
                if self.window.mark() == Some(self.window.cursor()) {
                    self.window.clear_mark();
                }
                self.engine.pointer_released();
                update.selection_set = true;
            }
            Action::FocusGained | Action::FocusLost => {
                self.has_focus = action == Action::FocusGained;
                update.focus_changed = true;
            }
            Action::Resize { cols, rows } => {
                self.terminal.set_size(cols, rows);
                self.window.set_height(rows.saturating_sub(2));
                self.display.force_redraw();
                update.geometry_changed = true;
            }
        }

        if self.window.ensure_cursor_visible() {
            update.viewport_changed = true;
        }
        Ok(update)
    }

    /// Insert a character at cursor
    pub fn insert_char(&mut self, ch: char) {
        let line = self.window.cursor_line();
        let col = self.window.cursor_col();
        self.buffer.insert_char(line, col, ch);
        self.window.set_cursor(line, col + ch.len_utf8());
        self.update_goal_col();
    }

    /// Split the line at the cursor, then continue or end a prefix marker
    pub fn newline(&mut self) -> Continuation {
        let line = self.window.cursor_line();
        let col = self.window.cursor_col();
        self.buffer.insert_newline(line, col);
        self.window.set_cursor(line + 1, 0);

        let mut view = CursorView {
            buffer: &mut self.buffer,
            window: &mut self.window,
        };
        let outcome = handle_enter(&mut view, self.engine.rules().continuation_prefixes());
        self.update_goal_col();
        outcome
    }

    fn delete_backward(&mut self) -> bool {
        let line = self.window.cursor_line();
        let col = self.window.cursor_col();

        if let Some((_, new_col)) = self.buffer.delete_backward(line, col) {
            self.window.set_cursor(line, new_col);
        } else if let Some(join_col) = self.buffer.join_with_previous(line) {
            self.window.set_cursor(line - 1, join_col);
        } else {
            return false;
        }
        self.update_goal_col();
        true
    }

    fn delete_forward(&mut self) -> bool {
        let line = self.window.cursor_line();
        let col = self.window.cursor_col();
        self.buffer.delete_char(line, col).is_some() || self.buffer.join_line(line)
    }

    fn move_cursor_left(&mut self) -> bool {
        let line = self.window.cursor_line();
        let col = self.window.cursor_col();

        if col > 0 {
            let prev = self.buffer.line(line).map_or(0, |l| l.prev_char_boundary(col));
            self.window.set_cursor(line, prev);
        } else if line > 0 {
            let len = self.buffer.line(line - 1).map_or(0, |l| l.len());
            self.window.set_cursor(line - 1, len);
        } else {
            return false;
        }
        self.update_goal_col();
        true
    }

    fn move_cursor_right(&mut self) -> bool {
        let line = self.window.cursor_line();
        let col = self.window.cursor_col();
        let len = self.buffer.line(line).map_or(0, |l| l.len());

        if col < len {
            let next = self.buffer.line(line).map_or(len, |l| l.next_char_boundary(col));
            self.window.set_cursor(line, next);
        } else if line + 1 < self.buffer.line_count() {
            self.window.set_cursor(line + 1, 0);
        } else {
            return false;
        }
        self.update_goal_col();
        true
    }

    /// Move up (`-1`) or down (`1`) keeping the goal column
    fn move_cursor_vertical(&mut self, delta: isize) -> bool {
        let line = self.window.cursor_line();
        let target = match line.checked_add_signed(delta) {
            Some(target) if target < self.buffer.line_count() => target,
            _ => return false,
        };
        let col = self.col_in_line(target, self.window.goal_col());
        self.window.set_cursor(target, col);
        true
    }

    fn col_in_line(&self, line: usize, display_col: usize) -> usize {
        self.buffer.line(line).map_or(0, |l| l.col_to_byte(display_col))
    }

    fn update_goal_col(&mut self) {
        let col = self
            .buffer
            .line(self.window.cursor_line())
            .map_or(0, |l| l.byte_to_col(self.window.cursor_col()));
        self.window.set_goal_col(col);
    }

    /// Buffer position under a screen cell, as drawn with current decorations
    fn screen_to_position(&self, row: u16, col: u16) -> Option<Position> {
        let line = self.window.screen_row_to_line(row)?;
        let line = line.min(self.buffer.line_count() - 1);
        let text = self.buffer.line(line)?.text();
        let ch = column_to_byte(
            text,
            self.buffer.line_start(line),
            self.engine.decorations(),
            col as usize,
        );
        Some(Position::new(line, ch))
    }

    fn save(&mut self) {
        match self.buffer.save() {
            Ok(()) => {
                let name = self.buffer.name().to_string();
                self.display.set_message(format!("Wrote {}", name));
            }
            Err(e) => {
                tracing::warn!("save failed: {}", e);
                self.display.set_message(format!("Cannot save: {}", e));
            }
        }
    }
}
