//! Rendering of the block model.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

use conflictkit_core::conflict::{self, ConflictBlock, Document, Side};
use conflictkit_core::EngineConfig;

use super::{hunk_table, load_document, parse_document, read_text, style};

/// Print the block overview followed by every conflict side by side.
pub fn run_show(path: &Path, json: bool, config: &EngineConfig) -> Result<()> {
    let (_, doc) = load_document(path)?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&doc).context("failed to serialize document")?;
        println!("{}", rendered);
        return Ok(());
    }

    println!();
    println!(
        "{}",
        style::header(&format!(
            "{} — {} blocks, {} conflicts",
            path.display(),
            doc.len(),
            doc.conflict_count()
        ))
    );
    println!();
    println!("{}", block_table(&doc));

    let mut number = 0;
    for block in doc.blocks() {
        let ConflictBlock::Conflict(hunk) = block else {
            continue;
        };
        number += 1;
        println!();
        println!(
            "{} {} {} {}",
            style::header(&format!("Conflict {}", number)),
            style::dim(&format!("(lines {}-{})", hunk.start_line, hunk.end_line)),
            style::ours(hunk.label(Side::Ours).unwrap_or("ours")),
            style::theirs(hunk.label(Side::Theirs).unwrap_or("theirs")),
        );
        println!("{}", hunk_table(hunk, config.display.show_base));
    }
    println!();

    Ok(())
}

/// Parse only and report the number of conflicts.
pub fn run_check(path: &Path) -> Result<()> {
    match count_conflicts(path)? {
        0 => println!("{}", style::success("No conflict markers")),
        1 => println!("{}", style::warn("1 conflict")),
        n => println!("{}", style::warn(&format!("{} conflicts", n))),
    }
    Ok(())
}

/// Number of conflicts in `path`. Files without any marker line skip parsing.
pub fn count_conflicts(path: &Path) -> Result<usize> {
    let text = read_text(path)?;
    if !conflict::has_markers(&text) {
        return Ok(0);
    }
    Ok(parse_document(path, &text)?.conflict_count())
}

fn block_table(doc: &Document) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Block", "Kind", "Lines", "Ours", "Theirs"]);

    let mut number = 0;
    for (index, block) in doc.blocks().iter().enumerate() {
        let row = match block {
            ConflictBlock::Context(ctx) => {
                let span = match ctx.lines.len() {
                    0 => "—".to_string(),
                    n => format!("{}-{}", ctx.start_line, ctx.start_line + n - 1),
                };
                vec![
                    Cell::new(index),
                    Cell::new("context"),
                    Cell::new(span),
                    Cell::new(ctx.lines.len()),
                    Cell::new(ctx.lines.len()),
                ]
            }
            ConflictBlock::Conflict(hunk) => {
                number += 1;
                vec![
                    Cell::new(index),
                    Cell::new(format!("conflict {}", number)),
                    Cell::new(format!("{}-{}", hunk.start_line, hunk.end_line)),
                    Cell::new(hunk.side_lines(Side::Ours).count()),
                    Cell::new(hunk.side_lines(Side::Theirs).count()),
                ]
            }
        };
        table.add_row(row);
    }

    table
}
