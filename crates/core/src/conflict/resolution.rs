//! Per-block resolution choices.
//!
//! Each conflict block carries exactly one [`BlockResolution`]: a
//! [`Selection`] of sides to keep, or a manual replacement text. Setting one
//! kind replaces the other. Context blocks carry no resolution.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ResolutionError;

use super::document::{Document, Side};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Which sides of a conflict block to keep. `Both` emits ours, then theirs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// Drop the hunk entirely.
    #[default]
    None,
    Ours,
    Theirs,
    Both,
}

impl Selection {
    pub fn from_flags(ours: bool, theirs: bool) -> Self {
        match (ours, theirs) {
            (false, false) => Self::None,
            (true, false) => Self::Ours,
            (false, true) => Self::Theirs,
            (true, true) => Self::Both,
        }
    }

    pub fn includes(&self, side: Side) -> bool {
        match side {
            Side::Ours => matches!(self, Self::Ours | Self::Both),
            Side::Theirs => matches!(self, Self::Theirs | Self::Both),
        }
    }

    pub fn ours(&self) -> bool {
        self.includes(Side::Ours)
    }

    pub fn theirs(&self) -> bool {
        self.includes(Side::Theirs)
    }

    /// Copy of `self` with one side switched on or off.
    pub fn with(self, side: Side, selected: bool) -> Self {
        match side {
            Side::Ours => Self::from_flags(selected, self.theirs()),
            Side::Theirs => Self::from_flags(self.ours(), selected),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ours => "ours",
            Self::Theirs => "theirs",
            Self::Both => "both",
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "ours" => Ok(Self::Ours),
            "theirs" => Ok(Self::Theirs),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "invalid selection '{}': use none, ours, theirs or both",
                other
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// BlockResolution
// ---------------------------------------------------------------------------

/// The resolution of one conflict block.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BlockResolution {
    Toggled(Selection),
    /// Replaces the whole block verbatim.
    Manual(String),
}

impl BlockResolution {
    /// `true` if this resolution contributes no text.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Toggled(selection) => *selection == Selection::None,
            Self::Manual(text) => text.is_empty(),
        }
    }
}

impl Default for BlockResolution {
    fn default() -> Self {
        Self::Toggled(Selection::None)
    }
}

pub(crate) static UNSELECTED: BlockResolution = BlockResolution::Toggled(Selection::None);

// ---------------------------------------------------------------------------
// ResolutionState
// ---------------------------------------------------------------------------

/// Resolution choices for every conflict block of one [`Document`].
///
/// Built from the document so that block indices can be checked: mutating a
/// context block or an index past the end is a [`ResolutionError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionState {
    block_count: usize,
    default: Selection,
    entries: BTreeMap<usize, BlockResolution>,
}

impl ResolutionState {
    /// Every conflict block starts as `Toggled(None)`.
    pub fn new(doc: &Document) -> Self {
        Self::with_default(doc, Selection::None)
    }

    /// Every conflict block starts as `Toggled(default)`.
    pub fn with_default(doc: &Document, default: Selection) -> Self {
        let entries = doc
            .conflict_indices()
            .into_iter()
            .map(|index| (index, BlockResolution::Toggled(default)))
            .collect();
        Self {
            block_count: doc.len(),
            default,
            entries,
        }
    }

    pub fn default_selection(&self) -> Selection {
        self.default
    }

    /// The resolution of a conflict block, or `None` for context blocks and
    /// out-of-range indices.
    pub fn resolution(&self, index: usize) -> Option<&BlockResolution> {
        self.entries.get(&index)
    }

    /// `(block index, resolution)` for every conflict block, in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BlockResolution)> + '_ {
        self.entries.iter().map(|(index, res)| (*index, res))
    }

    /// Switch one side of a block's toggle. Clears a manual resolution.
    pub fn set_toggle(
        &mut self,
        index: usize,
        side: Side,
        selected: bool,
    ) -> Result<(), ResolutionError> {
        let entry = self.entry(index)?;
        let current = match entry {
            BlockResolution::Toggled(selection) => *selection,
            BlockResolution::Manual(_) => Selection::None,
        };
        let next = current.with(side, selected);
        debug!(index, %side, selected, selection = %next, "setting block toggle");
        *entry = BlockResolution::Toggled(next);
        Ok(())
    }

    /// Flip one side of a block's toggle. Clears a manual resolution.
    pub fn toggle(&mut self, index: usize, side: Side) -> Result<(), ResolutionError> {
        let selected = match self.entry(index)? {
            BlockResolution::Toggled(selection) => !selection.includes(side),
            BlockResolution::Manual(_) => true,
        };
        self.set_toggle(index, side, selected)
    }

    /// Replace a block's toggle with a whole selection.
    pub fn set_selection(
        &mut self,
        index: usize,
        selection: Selection,
    ) -> Result<(), ResolutionError> {
        let entry = self.entry(index)?;
        debug!(index, %selection, "setting block selection");
        *entry = BlockResolution::Toggled(selection);
        Ok(())
    }

    /// Replace a block with manual text. Clears any toggle.
    pub fn set_manual(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), ResolutionError> {
        let entry = self.entry(index)?;
        let text = text.into();
        debug!(index, bytes = text.len(), "setting manual block resolution");
        *entry = BlockResolution::Manual(text);
        Ok(())
    }

    /// Restore a block to the state's default selection.
    pub fn reset(&mut self, index: usize) -> Result<(), ResolutionError> {
        let default = self.default;
        *self.entry(index)? = BlockResolution::Toggled(default);
        Ok(())
    }

    /// Apply one selection to every conflict block, clearing manual text.
    pub fn select_all(&mut self, selection: Selection) {
        debug!(%selection, blocks = self.entries.len(), "selecting for all blocks");
        for entry in self.entries.values_mut() {
            *entry = BlockResolution::Toggled(selection);
        }
    }

    /// Conflict blocks that currently resolve to no text.
    pub fn unresolved(&self) -> Vec<usize> {
        self.entries
            .iter()
            .filter(|(_, res)| res.is_empty())
            .map(|(index, _)| *index)
            .collect()
    }

    /// `true` when every conflict block contributes some text.
    pub fn is_complete(&self) -> bool {
        self.entries.values().all(|res| !res.is_empty())
    }

    fn entry(&mut self, index: usize) -> Result<&mut BlockResolution, ResolutionError> {
        if index >= self.block_count {
            return Err(ResolutionError::BlockOutOfRange {
                index,
                len: self.block_count,
            });
        }
        self.entries
            .get_mut(&index)
            .ok_or(ResolutionError::NotAConflict(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::BlockBuilder;

    fn sample_doc() -> Document {
        BlockBuilder::parse("a\n<<<<<<< HEAD\nx\n=======\ny\n>>>>>>> dev\nb\n").unwrap()
    }

    #[test]
    fn test_selection_flags_round_trip() {
        for (ours, theirs) in [(false, false), (true, false), (false, true), (true, true)] {
            let selection = Selection::from_flags(ours, theirs);
            assert_eq!(selection.ours(), ours);
            assert_eq!(selection.theirs(), theirs);
        }
    }

    #[test]
    fn test_selection_with() {
        assert_eq!(Selection::None.with(Side::Ours, true), Selection::Ours);
        assert_eq!(Selection::Ours.with(Side::Theirs, true), Selection::Both);
        assert_eq!(Selection::Both.with(Side::Ours, false), Selection::Theirs);
        assert_eq!(Selection::Theirs.with(Side::Theirs, false), Selection::None);
    }

    #[test]
    fn test_selection_from_str() {
        assert_eq!("both".parse::<Selection>(), Ok(Selection::Both));
        assert!("all".parse::<Selection>().is_err());
    }

    #[test]
    fn test_default_state_has_nothing_selected() {
        let doc = sample_doc();
        let state = ResolutionState::new(&doc);
        assert_eq!(
            state.resolution(1),
            Some(&BlockResolution::Toggled(Selection::None))
        );
        assert_eq!(state.resolution(0), None);
        assert_eq!(state.unresolved(), vec![1]);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_configured_default_selection() {
        let doc = sample_doc();
        let state = ResolutionState::with_default(&doc, Selection::Theirs);
        assert_eq!(
            state.resolution(1),
            Some(&BlockResolution::Toggled(Selection::Theirs))
        );
        assert!(state.is_complete());
    }

    #[test]
    fn test_set_toggle_clears_manual() {
        let doc = sample_doc();
        let mut state = ResolutionState::new(&doc);
        state.set_manual(1, "custom\n").unwrap();
        state.set_toggle(1, Side::Theirs, true).unwrap();
        assert_eq!(
            state.resolution(1),
            Some(&BlockResolution::Toggled(Selection::Theirs))
        );
    }

    #[test]
    fn test_set_manual_clears_toggle() {
        let doc = sample_doc();
        let mut state = ResolutionState::new(&doc);
        state.set_selection(1, Selection::Both).unwrap();
        state.set_manual(1, "custom\n").unwrap();
        assert_eq!(
            state.resolution(1),
            Some(&BlockResolution::Manual("custom\n".into()))
        );
    }

    #[test]
    fn test_toggle_flips_one_side() {
        let doc = sample_doc();
        let mut state = ResolutionState::new(&doc);
        state.toggle(1, Side::Ours).unwrap();
        state.toggle(1, Side::Theirs).unwrap();
        assert_eq!(
            state.resolution(1),
            Some(&BlockResolution::Toggled(Selection::Both))
        );
        state.toggle(1, Side::Ours).unwrap();
        assert_eq!(
            state.resolution(1),
            Some(&BlockResolution::Toggled(Selection::Theirs))
        );
    }

    #[test]
    fn test_precondition_violations() {
        let doc = sample_doc();
        let mut state = ResolutionState::new(&doc);
        assert_eq!(
            state.set_toggle(0, Side::Ours, true),
            Err(ResolutionError::NotAConflict(0))
        );
        assert_eq!(
            state.set_manual(3, "x"),
            Err(ResolutionError::BlockOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(state.reset(2), Err(ResolutionError::NotAConflict(2)));
    }

    #[test]
    fn test_select_all_and_reset() {
        let doc = BlockBuilder::parse(
            "<<<<<<< a\n1\n=======\n2\n>>>>>>> b\nmid\n<<<<<<< a\n3\n=======\n4\n>>>>>>> b\n",
        )
        .unwrap();
        let mut state = ResolutionState::new(&doc);
        state.set_manual(0, "m").unwrap();
        state.select_all(Selection::Ours);
        assert!(state
            .iter()
            .all(|(_, res)| *res == BlockResolution::Toggled(Selection::Ours)));

        state.reset(2).unwrap();
        assert_eq!(state.unresolved(), vec![2]);
    }

    #[test]
    fn test_empty_manual_text_is_unresolved() {
        let doc = sample_doc();
        let mut state = ResolutionState::with_default(&doc, Selection::Ours);
        state.set_manual(1, "").unwrap();
        assert_eq!(state.unresolved(), vec![1]);
    }
}
