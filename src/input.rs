//! Input handling - event translation
//!
//! Turns crossterm events into editor actions. Keys follow the usual emacs
//! bindings with a pending C-x prefix; mouse and focus events are passed
//! through because the marker engine reacts to them.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

/// An editor action decoded from terminal input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Insert(char),
    Newline,
    DeleteBackward,
    DeleteForward,
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    PageUp,
    PageDown,
    /// Set or clear the selection anchor (C-SPC)
    ToggleMark,
    /// Switch between live and source mode (F2)
    ToggleLive,
    Save,
    Quit,
    /// Abort a pending prefix or clear the mark (C-g, ESC)
    Cancel,
    PointerDown { row: u16, col: u16 },
    PointerDrag { row: u16, col: u16 },
    PointerUp { row: u16, col: u16 },
    FocusGained,
    FocusLost,
    Resize { cols: u16, rows: u16 },
}

/// Input state for handling multi-key sequences
#[derive(Debug, Default)]
pub struct InputState {
    /// Waiting for C-x continuation
    ctlx_pending: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if waiting for a continuation key
    pub fn is_pending(&self) -> bool {
        self.ctlx_pending
    }

    /// Translate a terminal event into an action
    pub fn translate(&mut self, event: Event) -> Option<Action> {
        match event {
            Event::Key(key) => self.translate_key(key),
            Event::Mouse(mouse) => translate_mouse(mouse),
            Event::FocusGained => Some(Action::FocusGained),
            Event::FocusLost => Some(Action::FocusLost),
            Event::Resize(cols, rows) => Some(Action::Resize { cols, rows }),
            _ => None,
        }
    }

    /// Translate a key press
    pub fn translate_key(&mut self, event: KeyEvent) -> Option<Action> {
        let KeyEvent {
            code, modifiers, kind, ..
        } = event;

        // Only process key press events, ignore release and repeat
        // This is critical on Windows where crossterm sends all event types
        if kind != KeyEventKind::Press {
            return None;
        }

        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        if self.ctlx_pending {
            self.ctlx_pending = false;
            return match code {
                KeyCode::Char('c') if ctrl => Some(Action::Quit),
                KeyCode::Char('s') if ctrl => Some(Action::Save),
                _ => Some(Action::Cancel),
            };
        }

        match code {
            KeyCode::Char('x') if ctrl => {
                self.ctlx_pending = true;
                None // Wait for next key
            }
            KeyCode::Char(' ') | KeyCode::Char('@') if ctrl => Some(Action::ToggleMark),
            KeyCode::Char(ch) if ctrl => translate_ctrl(ch),
            KeyCode::Char(ch) => Some(Action::Insert(ch)),
            KeyCode::Enter => Some(Action::Newline),
            KeyCode::Tab => Some(Action::Insert('\t')),
            KeyCode::Backspace => Some(Action::DeleteBackward),
            KeyCode::Delete => Some(Action::DeleteForward),
            KeyCode::Home => Some(Action::LineStart),
            KeyCode::End => Some(Action::LineEnd),
            KeyCode::PageUp => Some(Action::PageUp),
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::Up => Some(Action::Up),
            KeyCode::Down => Some(Action::Down),
            KeyCode::Left => Some(Action::Left),
            KeyCode::Right => Some(Action::Right),
            KeyCode::F(2) => Some(Action::ToggleLive),
            KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        }
    }
}

fn translate_ctrl(ch: char) -> Option<Action> {
    match ch.to_ascii_lowercase() {
        'a' => Some(Action::LineStart),
        'e' => Some(Action::LineEnd),
        'f' => Some(Action::Right),
        'b' => Some(Action::Left),
        'n' => Some(Action::Down),
        'p' => Some(Action::Up),
        'd' => Some(Action::DeleteForward),
        'h' => Some(Action::DeleteBackward),
        'm' | 'j' => Some(Action::Newline),
        'v' => Some(Action::PageDown),
        'g' => Some(Action::Cancel),
        's' => Some(Action::Save),
        'q' => Some(Action::Quit),
        _ => None,
    }
}

fn translate_mouse(event: MouseEvent) -> Option<Action> {
    let MouseEvent { kind, row, column: col, .. } = event;
    match kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Action::PointerDown { row, col }),
        MouseEventKind::Drag(MouseButton::Left) => Some(Action::PointerDrag { row, col }),
        MouseEventKind::Up(MouseButton::Left) => Some(Action::PointerUp { row, col }),
        _ => None,
    }
}
