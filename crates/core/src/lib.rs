//! conflictkit core library.
//!
//! This crate turns a working file containing git's textual conflict markers
//! into a structured block model, tracks per-block resolution choices, and
//! deterministically reconstructs the resolved file content. It performs no
//! file I/O: callers supply the raw text and persist the result.

pub mod config;
pub mod conflict;
pub mod errors;

// Re-exports for convenience.
pub use config::EngineConfig;
pub use conflict::{parse, resolve, Document, ResolutionState, Selection, Side};
pub use errors::{CoreError, ParseError, ResolutionError};
