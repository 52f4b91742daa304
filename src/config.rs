//! Configuration file support
//!
//! Loads settings from ~/.markfold.toml (or %USERPROFILE%\.markfold.toml on
//! Windows). A missing file means defaults.
//!
//! Example:
//! ```text
//! placeholder = "text"
//! precedence = "unsuffixed-first"
//! rebuild-on-keyboard-selection = false
//! live = true
//!
//! [[rules]]
//! pattern = "==text=="
//! class = "highlight"
//!
//! [[rules]]
//! pattern = "- text"
//! class = "color-cyan"
//! continues-line = true
//!
//! [styles.highlight]
//! bg = "yellow"
//! fg = "black"
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{EditorError, Result};
use crate::marker::{Precedence, RebuildPolicy, Rule, RuleSet, DEFAULT_PLACEHOLDER};
use crate::style::{StyleSpec, StyleTable};

/// Configuration settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Token standing for the content in rule patterns
    pub placeholder: String,
    /// Which rules win when two match at the same offset
    pub precedence: Precedence,
    /// Reveal markers on keyboard cursor moves, not only after mouse clicks
    pub rebuild_on_keyboard_selection: bool,
    /// Start in live mode rather than source mode
    pub live: bool,
    /// Marker rules, in registration order
    pub rules: Vec<Rule>,
    /// Style overrides by class name
    pub styles: HashMap<String, StyleSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            precedence: Precedence::default(),
            rebuild_on_keyboard_selection: false,
            live: true,
            rules: vec![
                Rule::new("//text//", "color-yellow", false),
                Rule::new("> text", "quote", true),
            ],
            styles: HashMap::new(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".markfold.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".markfold.toml"))
        }
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a file, falling back to defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                tracing::debug!("loading config from {}", path.display());
                Self::parse(&contents)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Compile every rule, failing on the first invalid one
    pub fn rule_set(&self) -> Result<RuleSet> {
        RuleSet::compile(&self.rules, &self.placeholder, self.precedence)
    }

    /// Compile the valid rules and report the invalid ones
    pub fn rule_set_lenient(&self) -> (RuleSet, Vec<EditorError>) {
        RuleSet::compile_lenient(&self.rules, &self.placeholder, self.precedence)
    }

    pub fn rebuild_policy(&self) -> RebuildPolicy {
        RebuildPolicy {
            rebuild_on_keyboard_selection: self.rebuild_on_keyboard_selection,
        }
    }

    /// Default styles with the `[styles]` overrides applied
    pub fn style_table(&self) -> Result<StyleTable> {
        let mut table = StyleTable::with_defaults();
        for (class, spec) in &self.styles {
            table.insert(class, spec.to_style()?);
        }
        Ok(table)
    }
}
