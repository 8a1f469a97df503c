//! Reconstruction of the resolved file from a document and its resolutions.
//!
//! Per block, in document order:
//! - context lines are emitted verbatim;
//! - `Manual(text)` emits `text` verbatim in place of the block;
//! - `Toggled(selection)` emits the present ours lines (if selected) as one
//!   run, then the present theirs lines (if selected) as a second run.
//!   Ours and theirs are never interleaved row by row.
//!
//! The output uses the document's line terminator and ends with one only if
//! the parsed input did.

use tracing::debug;

use super::document::{ConflictBlock, ConflictHunk, Document, Side, TextWriter};
use super::resolution::{BlockResolution, ResolutionState, UNSELECTED};

/// Stateless reconstruction engine.
pub struct Reconciler;

impl Reconciler {
    /// Build the resolved text. Pure and total: conflict blocks missing from
    /// `state` resolve to nothing.
    pub fn resolve(doc: &Document, state: &ResolutionState) -> String {
        let mut out = TextWriter::new(doc);
        let mut empty_blocks = 0usize;

        for (index, block) in doc.blocks().iter().enumerate() {
            match block {
                ConflictBlock::Context(ctx) => out.lines(ctx.lines.iter().map(String::as_str)),
                ConflictBlock::Conflict(hunk) => {
                    let resolution = state.resolution(index).unwrap_or(&UNSELECTED);
                    if resolution.is_empty() {
                        empty_blocks += 1;
                    }
                    emit_hunk(&mut out, hunk, resolution);
                }
            }
        }

        debug!(
            blocks = doc.len(),
            empty_blocks, "reconciled conflicted document"
        );
        out.finish()
    }
}

fn emit_hunk(out: &mut TextWriter, hunk: &ConflictHunk, resolution: &BlockResolution) {
    match resolution {
        BlockResolution::Manual(text) => out.raw(text),
        BlockResolution::Toggled(selection) => {
            for side in [Side::Ours, Side::Theirs] {
                if selection.includes(side) {
                    out.lines(hunk.side_lines(side));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::{BlockBuilder, Selection};

    const EXAMPLE: &str = "line1\n<<<<<<< HEAD\nmine\n=======\ntheirs\n>>>>>>> branch\nline2";

    fn resolve_with(text: &str, selection: Selection) -> String {
        let doc = BlockBuilder::parse(text).unwrap();
        let state = ResolutionState::with_default(&doc, selection);
        Reconciler::resolve(&doc, &state)
    }

    #[test]
    fn test_resolve_selections() {
        assert_eq!(resolve_with(EXAMPLE, Selection::Ours), "line1\nmine\nline2");
        assert_eq!(resolve_with(EXAMPLE, Selection::Theirs), "line1\ntheirs\nline2");
        assert_eq!(
            resolve_with(EXAMPLE, Selection::Both),
            "line1\nmine\ntheirs\nline2"
        );
        assert_eq!(resolve_with(EXAMPLE, Selection::None), "line1\nline2");
    }

    #[test]
    fn test_resolve_manual_override() {
        let doc = BlockBuilder::parse(EXAMPLE).unwrap();
        let mut state = ResolutionState::new(&doc);
        state.set_selection(1, Selection::Both).unwrap();
        state.set_manual(1, "custom\n").unwrap();
        assert_eq!(Reconciler::resolve(&doc, &state), "line1\ncustom\nline2");
    }

    #[test]
    fn test_resolve_uneven_sides() {
        let text = "<<<<<<< HEAD\no1\no2\n=======\nt1\n>>>>>>> other\n";
        assert_eq!(resolve_with(text, Selection::Theirs), "t1\n");
        assert_eq!(resolve_with(text, Selection::Ours), "o1\no2\n");
        assert_eq!(resolve_with(text, Selection::Both), "o1\no2\nt1\n");
    }

    #[test]
    fn test_both_is_never_interleaved() {
        let text = "<<<<<<< HEAD\no1\no2\n=======\nt1\nt2\n>>>>>>> other\n";
        assert_eq!(resolve_with(text, Selection::Both), "o1\no2\nt1\nt2\n");
    }

    #[test]
    fn test_resolve_preserves_crlf() {
        let text = "a\r\n<<<<<<< HEAD\r\nx\r\n=======\r\ny\r\n>>>>>>> dev\r\nb\r\n";
        assert_eq!(resolve_with(text, Selection::Both), "a\r\nx\r\ny\r\nb\r\n");
    }

    #[test]
    fn test_resolve_all_dropped_is_empty() {
        let text = "<<<<<<< HEAD\nx\n=======\ny\n>>>>>>> dev\n";
        assert_eq!(resolve_with(text, Selection::None), "");
    }

    #[test]
    fn test_context_keeps_terminator_when_file_ends_on_marker() {
        let text = "a\n<<<<<<< HEAD\nx\n=======\ny\n>>>>>>> dev";
        assert_eq!(resolve_with(text, Selection::None), "a\n");
        assert_eq!(resolve_with(text, Selection::Ours), "a\nx\n");
    }

    #[test]
    fn test_resolve_without_state_entries_drops_conflicts() {
        let doc = BlockBuilder::parse(EXAMPLE).unwrap();
        let unrelated = BlockBuilder::parse("plain\n").unwrap();
        let state = ResolutionState::new(&unrelated);
        assert_eq!(Reconciler::resolve(&doc, &state), "line1\nline2");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let doc = BlockBuilder::parse(EXAMPLE).unwrap();
        let mut state = ResolutionState::new(&doc);
        state.set_toggle(1, Side::Ours, true).unwrap();
        let before = (doc.clone(), state.clone());
        let first = Reconciler::resolve(&doc, &state);
        let second = Reconciler::resolve(&doc, &state);
        assert_eq!(first, second);
        assert_eq!((doc, state), before);
    }
}
