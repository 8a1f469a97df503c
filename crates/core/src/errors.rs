//! Error types for the conflictkit core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// Malformed conflict markers in a conflicted file.
///
/// These are unrecoverable for the file in question: callers should fall back
/// to presenting the raw text for manual editing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A marker appeared where the state machine did not expect it, e.g. a
    /// `=======` outside a conflict or a nested `<<<<<<<`.
    #[error("marker out of sequence at line {line}: {marker}")]
    MarkerOutOfSequence { line: usize, marker: String },

    /// Input ended inside a conflict region. `line` is the line of the
    /// opening `<<<<<<<` marker.
    #[error("unterminated conflict block starting at line {line}")]
    UnterminatedBlock { line: usize },
}

impl ParseError {
    /// Short machine-stable reason string.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MarkerOutOfSequence { .. } => "marker out of sequence",
            Self::UnterminatedBlock { .. } => "unterminated conflict block",
        }
    }

    /// 1-based line number the error refers to.
    pub fn line(&self) -> usize {
        match self {
            Self::MarkerOutOfSequence { line, .. } | Self::UnterminatedBlock { line } => *line,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution errors
// ---------------------------------------------------------------------------

/// Caller faults when mutating a [`ResolutionState`](crate::conflict::ResolutionState).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// The block index is past the end of the document.
    #[error("block index {index} out of range (document has {len} blocks)")]
    BlockOutOfRange { index: usize, len: usize },

    /// The block exists but is a context block, which carries no resolution.
    #[error("block {0} is not a conflict block")]
    NotAConflict(usize),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
