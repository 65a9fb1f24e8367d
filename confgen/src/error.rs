//! Error types for code generation.
//!
//! Every failure that can abort a generation run lives here. All of
//! these surface before any output is written; the pipeline validates
//! the whole tree first and only then emits source text.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generation operations.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Main error type for a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The input tree could not be decoded.
    #[error("failed to parse TOML input: {0}")]
    Parse(#[from] ParseError),

    /// An environment override did not convert to the target type.
    #[error("failed to apply environment overrides: {0}")]
    Override(#[from] OverrideError),

    /// A `file:` reference could not be embedded.
    #[error("failed to embed file contents: {0}")]
    Embed(#[from] EmbedError),

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error decoding the input tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Malformed TOML text.
    #[error("invalid TOML: {message}")]
    Syntax { message: String },
}

/// Error converting an environment override.
#[derive(Debug, Error)]
pub enum OverrideError {
    /// The override string does not match the original value's type.
    #[error("invalid value for {key}: expected {expected}, got {value:?}")]
    Conversion {
        key: String,
        expected: &'static str,
        value: String,
    },
}

/// Error resolving a `file:` reference.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The referenced file does not exist.
    #[error("file not found: {path} (referenced in config)")]
    NotFound { path: PathBuf },

    /// The referenced file is larger than the configured ceiling.
    #[error("file {path} exceeds maximum size {limit} bytes (actual: {actual} bytes)")]
    SizeExceeded {
        path: PathBuf,
        limit: u64,
        actual: u64,
    },

    /// Any other IO failure while reading the file.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// Create a syntax error from a decoder message.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }
}

impl OverrideError {
    /// Create a conversion error naming the offending environment key.
    pub fn conversion(
        key: impl Into<String>,
        expected: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::Conversion {
            key: key.into(),
            expected,
            value: value.into(),
        }
    }
}

impl EmbedError {
    /// Create a not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::NotFound { path }
    }

    /// Create a size exceeded error.
    pub fn size_exceeded(path: PathBuf, limit: u64, actual: u64) -> Self {
        Self::SizeExceeded {
            path,
            limit,
            actual,
        }
    }
}
