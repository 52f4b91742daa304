//! Error types for markfold

use thiserror::Error;

/// Result type alias for markfold operations
pub type Result<T> = std::result::Result<T, EditorError>;

/// Editor error types
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Rule {pattern:?} does not contain the placeholder {placeholder:?}")]
    MissingPlaceholder { pattern: String, placeholder: String },

    #[error("Rule {0:?} has an empty prefix")]
    EmptyPrefix(String),

    #[error("Rule {pattern:?} does not compile: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Unknown color: {0}")]
    UnknownColor(String),

    #[error("{0}")]
    Message(String),
}
