//! Interactive per-conflict selection.
//!
//! Walks every conflict block, shows its rows side by side, and asks which
//! side(s) to keep. "Manual" opens `$EDITOR` pre-filled with both sides.

use anyhow::{Context, Result};
use dialoguer::{Editor, Select};

use conflictkit_core::conflict::{BlockResolution, Document, ResolutionState, Selection, Side};

use super::{hunk_table, style};

const CHOICES: &[&str] = &[
    "ours      — keep the current branch",
    "theirs    — keep the incoming branch",
    "both      — ours, then theirs",
    "none      — drop this hunk",
    "manual    — edit the replacement text",
];

const SELECTIONS: [Selection; 4] = [
    Selection::Ours,
    Selection::Theirs,
    Selection::Both,
    Selection::None,
];

/// Prompt for every conflict block of `doc`, updating `state` in place.
pub fn choose_all(doc: &Document, state: &mut ResolutionState, show_base: bool) -> Result<()> {
    let total = doc.conflict_count();

    for (number, index) in doc.conflict_indices().into_iter().enumerate() {
        let Some(hunk) = doc.blocks()[index].as_conflict() else {
            continue;
        };

        eprintln!();
        eprintln!(
            "{} {}",
            style::header(&format!("Conflict {}/{}", number + 1, total)),
            style::dim(&format!("(lines {}-{})", hunk.start_line, hunk.end_line))
        );
        eprintln!("{}", hunk_table(hunk, show_base));

        let default = match state.resolution(index) {
            Some(BlockResolution::Toggled(selection)) => SELECTIONS
                .iter()
                .position(|s| s == selection)
                .unwrap_or(0),
            Some(BlockResolution::Manual(_)) => SELECTIONS.len(),
            None => 0,
        };

        let choice = Select::new()
            .with_prompt("Keep which side?")
            .items(CHOICES)
            .default(default)
            .interact()
            .context("failed to read selection")?;

        match SELECTIONS.get(choice) {
            Some(selection) => state.set_selection(index, *selection)?,
            None => {
                let terminator = doc.line_ending().as_str();
                let mut initial = String::new();
                for side in [Side::Ours, Side::Theirs] {
                    for line in hunk.side_lines(side) {
                        initial.push_str(line);
                        initial.push_str(terminator);
                    }
                }

                match Editor::new()
                    .edit(&initial)
                    .context("failed to run editor")?
                {
                    Some(text) => state.set_manual(index, text)?,
                    None => eprintln!(
                        "{}",
                        style::warn("Editor closed without saving; keeping previous choice")
                    ),
                }
            }
        }
    }

    Ok(())
}
