//! Conflict-marker parsing, resolution state, and reconstruction.
//!
//! The conflict subsystem is responsible for:
//! 1. **Scanning** -- classifying each line as a marker or plain text.
//! 2. **Building** -- grouping lines into a [`Document`] of context and
//!    conflict blocks.
//! 3. **Resolution** -- tracking which side(s) of each conflict to keep, or a
//!    manual replacement.
//! 4. **Reconciling** -- producing the final resolved text.

pub mod builder;
pub mod document;
pub mod reconciler;
pub mod resolution;
pub mod scanner;

pub use builder::BlockBuilder;
pub use document::{
    ConflictBlock, ConflictHunk, ConflictLine, ContextBlock, Document, LineEnding, Side,
};
pub use reconciler::Reconciler;
pub use resolution::{BlockResolution, ResolutionState, Selection};
pub use scanner::{LineClass, MarkerScanner};

use crate::errors::ParseError;

/// Parse the raw text of a conflicted file.
pub fn parse(text: &str) -> Result<Document, ParseError> {
    BlockBuilder::parse(text)
}

/// Build the resolved text for `doc` under `state`.
pub fn resolve(doc: &Document, state: &ResolutionState) -> String {
    Reconciler::resolve(doc, state)
}

/// Quick check: does any line of `text` look like a conflict marker?
///
/// Text without markers always parses into a single context block.
pub fn has_markers(text: &str) -> bool {
    text.lines().any(|line| MarkerScanner::classify(line).is_marker())
}
