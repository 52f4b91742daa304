//! markfold - a terminal markdown editor with live marker folding
//!
//! The `marker` module holds the editor-independent engine; the rest is a
//! small crossterm editor that hosts it.

pub mod buffer;
pub mod config;
pub mod display;
pub mod editor;
pub mod error;
pub mod input;
pub mod line;
pub mod marker;
pub mod style;
pub mod terminal;
pub mod window;
