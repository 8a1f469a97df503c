//! Subcommands operating on a single conflicted file.
//!
//! The engine never touches the filesystem; these commands read the raw
//! text, hand it to `conflictkit_core`, and write the resolved text back.

pub mod interactive;
pub mod resolve;
pub mod show;
pub mod style;

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

use conflictkit_core::conflict::{self, ConflictHunk, Document};

/// Read `path` and parse it into a [`Document`]. Returns the raw text too.
///
/// A parse error is final for the file: the user is pointed at manual
/// editing of the raw text instead.
pub fn load_document(path: &Path) -> Result<(String, Document)> {
    let text = read_text(path)?;
    let doc = parse_document(path, &text)?;
    Ok((text, doc))
}

pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn parse_document(path: &Path, text: &str) -> Result<Document> {
    conflict::parse(text).with_context(|| {
        format!(
            "cannot parse conflict markers in {}; edit the file manually",
            path.display()
        )
    })
}

/// Map a 1-based conflict number to its block index.
pub fn conflict_block(doc: &Document, number: usize) -> Result<usize> {
    let conflicts = doc.conflict_indices();
    number
        .checked_sub(1)
        .and_then(|i| conflicts.get(i).copied())
        .with_context(|| {
            format!(
                "conflict {} does not exist (file has {} conflicts)",
                number,
                conflicts.len()
            )
        })
}

/// Map a block index back to its 1-based conflict number.
pub fn conflict_number(doc: &Document, index: usize) -> usize {
    doc.conflict_indices()
        .iter()
        .position(|&i| i == index)
        .map(|p| p + 1)
        .unwrap_or(0)
}

/// Side-by-side table of one conflict's aligned rows.
pub fn hunk_table(hunk: &ConflictHunk, show_base: bool) -> Table {
    let show_base = show_base && hunk.has_base();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec!["#", hunk.ours_label.as_deref().unwrap_or("ours")];
    if show_base {
        header.push(hunk.base_label.as_deref().unwrap_or("base"));
    }
    header.push(hunk.theirs_label.as_deref().unwrap_or("theirs"));
    table.set_header(header);

    // The base hunk may be longer than the aligned rows.
    let base = hunk.base.as_deref().unwrap_or(&[]);
    let height = if show_base {
        hunk.rows.len().max(base.len())
    } else {
        hunk.rows.len()
    };

    for i in 0..height {
        let row = hunk.rows.get(i);
        let mut cells = vec![
            Cell::new(i + 1),
            Cell::new(row.and_then(|r| r.ours.as_deref()).unwrap_or("")),
        ];
        if show_base {
            cells.push(Cell::new(base.get(i).map(String::as_str).unwrap_or("")));
        }
        cells.push(Cell::new(row.and_then(|r| r.theirs.as_deref()).unwrap_or("")));
        table.add_row(cells);
    }

    table
}
