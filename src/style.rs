//! Style types for text rendering
//!
//! Rules name their look with a style class (e.g. `color-yellow`). The
//! display resolves classes to terminal styles through a `StyleTable`.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{EditorError, Result};

/// Terminal colors (ANSI 16-color palette for compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl Color {
    /// All colors paired with their config names
    const NAMED: [(&'static str, Color); 17] = [
        ("default", Color::Default),
        ("black", Color::Black),
        ("red", Color::Red),
        ("green", Color::Green),
        ("yellow", Color::Yellow),
        ("blue", Color::Blue),
        ("magenta", Color::Magenta),
        ("cyan", Color::Cyan),
        ("white", Color::White),
        ("bright-black", Color::BrightBlack),
        ("bright-red", Color::BrightRed),
        ("bright-green", Color::BrightGreen),
        ("bright-yellow", Color::BrightYellow),
        ("bright-blue", Color::BrightBlue),
        ("bright-magenta", Color::BrightMagenta),
        ("bright-cyan", Color::BrightCyan),
        ("bright-white", Color::BrightWhite),
    ];

    /// Parse a color from its config name (`yellow`, `bright-blue`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase().replace('_', "-");
        Self::NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, color)| *color)
    }
}

impl From<Color> for crossterm::style::Color {
    fn from(color: Color) -> Self {
        use crossterm::style::Color as C;
        match color {
            Color::Default => C::Reset,
            Color::Black => C::Black,
            Color::Red => C::DarkRed,
            Color::Green => C::DarkGreen,
            Color::Yellow => C::DarkYellow,
            Color::Blue => C::DarkBlue,
            Color::Magenta => C::DarkMagenta,
            Color::Cyan => C::DarkCyan,
            Color::White => C::Grey,
            Color::BrightBlack => C::DarkGrey,
            Color::BrightRed => C::Red,
            Color::BrightGreen => C::Green,
            Color::BrightYellow => C::Yellow,
            Color::BrightBlue => C::Blue,
            Color::BrightMagenta => C::Magenta,
            Color::BrightCyan => C::Cyan,
            Color::BrightWhite => C::White,
        }
    }
}

/// Text style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Reverse video (swap fg/bg)
    pub reverse: bool,
    /// Faint text, used for delimiters shown raw
    pub dim: bool,
}

impl Style {
    /// Create a style with just foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Default::default()
        }
    }

    /// Create a style with just background color
    pub fn bg(color: Color) -> Self {
        Self {
            bg: color,
            ..Default::default()
        }
    }

    /// Create a reverse video style (for selections)
    pub fn reverse() -> Self {
        Self {
            reverse: true,
            ..Default::default()
        }
    }

    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn with_reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    pub fn with_dim(mut self) -> Self {
        self.dim = true;
        self
    }

    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A style as written in the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StyleSpec {
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub reverse: bool,
}

impl StyleSpec {
    /// Resolve color names into a `Style`
    pub fn to_style(&self) -> Result<Style> {
        let color = |name: &Option<String>| -> Result<Color> {
            match name {
                Some(name) => Color::from_name(name).ok_or_else(|| EditorError::UnknownColor(name.clone())),
                None => Ok(Color::Default),
            }
        };

        Ok(Style {
            fg: color(&self.fg)?,
            bg: color(&self.bg)?,
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            reverse: self.reverse,
            dim: false,
        })
    }
}

/// Style class name to terminal style lookup
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    styles: HashMap<String, Style>,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with `color-<name>` classes for every color plus a few text styles
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for (name, color) in Color::NAMED.iter().skip(1) {
            table.insert(&format!("color-{}", name), Style::fg(*color));
        }
        table.insert("bold", Style::default().with_bold());
        table.insert("italic", Style::default().with_italic());
        table.insert("underline", Style::default().with_underline());
        table.insert("highlight", Style::bg(Color::Yellow).with_bold());
        table.insert("quote", Style::fg(Color::BrightBlack).with_italic());
        table
    }

    pub fn insert(&mut self, class: &str, style: Style) {
        self.styles.insert(class.to_string(), style);
    }

    /// Style for a class; unknown classes render unstyled
    pub fn get(&self, class: &str) -> Style {
        self.styles.get(class).copied().unwrap_or_default()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.styles.contains_key(class)
    }
}
