//! Apply resolution choices to a conflicted file and emit the result.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info};

use conflictkit_core::conflict::{self, Document, ResolutionState, Selection};
use conflictkit_core::EngineConfig;

use super::{conflict_block, conflict_number, interactive, load_document, style};

/// `N=SELECTION`: keep `SELECTION` for the N-th conflict (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockChoice {
    pub number: usize,
    pub selection: Selection,
}

impl FromStr for BlockChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (number, selection) = split_assignment(s)?;
        Ok(Self {
            number,
            selection: selection.parse()?,
        })
    }
}

/// `N=PATH`: replace the N-th conflict with the contents of `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualChoice {
    pub number: usize,
    pub path: PathBuf,
}

impl FromStr for ManualChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (number, path) = split_assignment(s)?;
        if path.is_empty() {
            return Err(format!("missing path in '{}'", s));
        }
        Ok(Self {
            number,
            path: PathBuf::from(path),
        })
    }
}

fn split_assignment(s: &str) -> Result<(usize, &str), String> {
    let (number, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected N=VALUE, got '{}'", s))?;
    let number = number
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid conflict number '{}'", number))?;
    if number == 0 {
        return Err("conflict numbers start at 1".into());
    }
    Ok((number, value.trim()))
}

/// Arguments of `conflictkit resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Conflicted file to resolve.
    pub file: PathBuf,

    /// Selection applied to every conflict before per-block choices.
    #[arg(short, long, value_name = "SELECTION")]
    pub accept: Option<Selection>,

    /// Per-conflict selection, e.g. `--block 2=theirs`. Repeatable.
    #[arg(short, long = "block", value_name = "N=SELECTION")]
    pub blocks: Vec<BlockChoice>,

    /// Replace a conflict with the contents of a file. Repeatable.
    #[arg(short, long = "manual", value_name = "N=PATH")]
    pub manual: Vec<ManualChoice>,

    /// Prompt for every conflict.
    #[arg(short, long)]
    pub interactive: bool,

    /// Write the resolved text here instead of stdout.
    #[arg(short, long, conflicts_with = "in_place")]
    pub output: Option<PathBuf>,

    /// Overwrite FILE with the resolved text.
    #[arg(long)]
    pub in_place: bool,

    /// Print a unified diff of FILE against the resolution instead of writing it.
    #[arg(long, conflicts_with_all = ["output", "in_place"])]
    pub diff: bool,
}

/// Run `conflictkit resolve`.
pub fn run_resolve(args: &ResolveArgs, config: &EngineConfig) -> Result<()> {
    let (text, doc) = load_document(&args.file)?;
    let state = build_state(&doc, args, config)?;

    let unresolved = state.unresolved();
    debug!(
        default = %state.default_selection(),
        unresolved = unresolved.len(),
        "built resolution state"
    );
    for index in &unresolved {
        let start = doc.blocks()[*index].start_line();
        eprintln!(
            "{}",
            style::warn(&format!(
                "Conflict {} (line {}) resolves to no text",
                conflict_number(&doc, *index),
                start
            ))
        );
    }
    if !unresolved.is_empty() && !config.resolve.allow_empty {
        anyhow::bail!(
            "{} conflict(s) left without a selection and resolve.allow_empty is false",
            unresolved.len()
        );
    }

    let resolved = conflict::resolve(&doc, &state);

    if args.diff {
        print_diff(&text, &resolved, config.display.color);
        return Ok(());
    }

    let target = if args.in_place {
        Some(args.file.as_path())
    } else {
        args.output.as_deref()
    };

    match target {
        Some(path) => write_resolved(path, &resolved, doc.conflict_count()),
        None => {
            print!("{}", resolved);
            Ok(())
        }
    }
}

/// Build the resolution state from config defaults and command-line choices.
/// Later choices override earlier ones: `--accept`, then `--block`, then
/// `--manual`, then interactive prompts.
pub fn build_state(
    doc: &Document,
    args: &ResolveArgs,
    config: &EngineConfig,
) -> Result<ResolutionState> {
    let mut state = ResolutionState::with_default(doc, config.resolve.default_selection);

    if let Some(selection) = args.accept {
        state.select_all(selection);
    }

    for choice in &args.blocks {
        let index = conflict_block(doc, choice.number)?;
        state.set_selection(index, choice.selection)?;
    }

    for choice in &args.manual {
        let index = conflict_block(doc, choice.number)?;
        let text = std::fs::read_to_string(&choice.path)
            .with_context(|| format!("failed to read {}", choice.path.display()))?;
        if let Some(warning) = unterminated_manual_text(doc, choice, &text) {
            eprintln!("{}", style::warn(&warning));
        }
        state.set_manual(index, text)?;
    }

    if args.interactive {
        interactive::choose_all(doc, &mut state, config.display.show_base)?;
    }

    Ok(state)
}

/// Manual text is inserted verbatim, so text missing the document's final
/// terminator runs into the line that follows it.
fn unterminated_manual_text(doc: &Document, choice: &ManualChoice, text: &str) -> Option<String> {
    let terminator = doc.line_ending().as_str();
    if text.is_empty() || text.ends_with(terminator) {
        return None;
    }
    Some(format!(
        "{} (conflict {}) does not end with {:?}; the next line will be joined onto it",
        choice.path.display(),
        choice.number,
        terminator
    ))
}

fn write_resolved(path: &Path, resolved: &str, conflicts: usize) -> Result<()> {
    std::fs::write(path, resolved)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), conflicts, "wrote resolved file");
    eprintln!(
        "{}",
        style::success(&format!(
            "Resolved {} conflict(s) into {}",
            conflicts,
            path.display()
        ))
    );
    Ok(())
}

fn print_diff(original: &str, resolved: &str, color: bool) {
    let patch = diffy::create_patch(original, resolved);
    let formatter = if color {
        diffy::PatchFormatter::new().with_color()
    } else {
        diffy::PatchFormatter::new()
    };
    print!("{}", formatter.fmt_patch(&patch));
}
