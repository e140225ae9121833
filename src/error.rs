//! Error types for npm-flat-config.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building the definition registry or
/// reading configuration input.
///
/// Flattening itself never fails; only construction and file access do.
#[derive(Error, Debug)]
pub enum Error {
    /// Two definitions share the same key.
    #[error("config option '{0}' is defined more than once")]
    DuplicateDefinition(String),

    /// Two definitions claim the same short form.
    #[error("short flag '-{short}' is used by both '{first}' and '{second}'")]
    DuplicateShort {
        short: char,
        first: String,
        second: String,
    },

    /// A derived short form collides with a static CLI shorthand.
    #[error("short flag '-{short}' for '{key}' collides with a built-in shorthand")]
    ShorthandCollision { short: char, key: String },

    /// Failed to read a config file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for npm-flat-config operations.
pub type Result<T> = std::result::Result<T, Error>;
