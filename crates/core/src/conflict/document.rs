//! The block model of a parsed conflicted file.
//!
//! A [`Document`] is an ordered, gap-free partition of the input into
//! [`ConflictBlock`]s. Context blocks hold runs of unconflicted lines;
//! conflict blocks hold the aligned ours/theirs (and optional base) rows of a
//! single marker region. Documents are immutable once built.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Line endings
// ---------------------------------------------------------------------------

/// Line terminator used when reconstructing text.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Detect the terminator from the first line break in `text`. Text with
    /// no line break at all defaults to `\n`.
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(pos) if text[..pos].ends_with('\r') => Self::CrLf,
            _ => Self::Lf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Split `text` into lines without terminators.
///
/// Returns the lines, the detected [`LineEnding`], and whether the final line
/// was terminated. With CRLF detected, a trailing `\r` is stripped from every
/// line; with LF it is kept as line content so the text round-trips exactly.
pub(crate) fn split_lines(text: &str) -> (Vec<&str>, LineEnding, bool) {
    let ending = LineEnding::detect(text);
    if text.is_empty() {
        return (Vec::new(), ending, false);
    }

    let trailing_newline = text.ends_with('\n');
    let body = if trailing_newline {
        &text[..text.len() - 1]
    } else {
        text
    };

    let lines = body
        .split('\n')
        .map(|line| match ending {
            LineEnding::CrLf => line.strip_suffix('\r').unwrap_or(line),
            LineEnding::Lf => line,
        })
        .collect();

    (lines, ending, trailing_newline)
}

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

/// One of the two divergent versions in a conflict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The current branch (`<<<<<<<` half).
    Ours,
    /// The incoming branch (`>>>>>>>` half).
    Theirs,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ours => write!(f, "ours"),
            Self::Theirs => write!(f, "theirs"),
        }
    }
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// One aligned row inside a conflict region. A `None` side contributed no
/// line at this position because its hunk is shorter.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ConflictLine {
    pub ours: Option<String>,
    pub theirs: Option<String>,
    pub base: Option<String>,
}

impl ConflictLine {
    pub fn side(&self, side: Side) -> Option<&str> {
        match side {
            Side::Ours => self.ours.as_deref(),
            Side::Theirs => self.theirs.as_deref(),
        }
    }
}

/// A maximal run of unconflicted lines.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContextBlock {
    /// 1-based line of the first line in the raw file.
    pub start_line: usize,
    pub lines: Vec<String>,
}

/// A single `<<<<<<<` .. `>>>>>>>` region.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConflictHunk {
    /// 1-based line of the `<<<<<<<` marker.
    pub start_line: usize,
    /// 1-based line of the `>>>>>>>` marker.
    pub end_line: usize,
    pub ours_label: Option<String>,
    pub base_label: Option<String>,
    pub theirs_label: Option<String>,
    /// Rows padded to `max(ours, theirs)` lines.
    pub rows: Vec<ConflictLine>,
    /// The whole diff3 base hunk, `Some` whenever a `|||||||` marker was
    /// present (even if the hunk is empty).
    pub base: Option<Vec<String>>,
}

impl ConflictHunk {
    /// Present lines of one side, in row order.
    pub fn side_lines(&self, side: Side) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().filter_map(move |row| row.side(side))
    }

    pub fn label(&self, side: Side) -> Option<&str> {
        match side {
            Side::Ours => self.ours_label.as_deref(),
            Side::Theirs => self.theirs_label.as_deref(),
        }
    }

    pub fn has_base(&self) -> bool {
        self.base.is_some()
    }
}

/// A block of the document: either context or a conflict region.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictBlock {
    Context(ContextBlock),
    Conflict(ConflictHunk),
}

impl ConflictBlock {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    pub fn start_line(&self) -> usize {
        match self {
            Self::Context(block) => block.start_line,
            Self::Conflict(hunk) => hunk.start_line,
        }
    }

    pub fn as_context(&self) -> Option<&ContextBlock> {
        match self {
            Self::Context(block) => Some(block),
            Self::Conflict(_) => None,
        }
    }

    pub fn as_conflict(&self) -> Option<&ConflictHunk> {
        match self {
            Self::Context(_) => None,
            Self::Conflict(hunk) => Some(hunk),
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A parsed conflicted file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<ConflictBlock>,
    line_ending: LineEnding,
    trailing_newline: bool,
}

impl Document {
    pub(crate) fn new(
        blocks: Vec<ConflictBlock>,
        line_ending: LineEnding,
        trailing_newline: bool,
    ) -> Self {
        Self {
            blocks,
            line_ending,
            trailing_newline,
        }
    }

    pub fn blocks(&self) -> &[ConflictBlock] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&ConflictBlock> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Indices of all conflict blocks, in document order.
    pub fn conflict_indices(&self) -> Vec<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| block.is_conflict())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn conflict_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_conflict()).count()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn has_trailing_newline(&self) -> bool {
        self.trailing_newline
    }

    /// Reconstruct one side's pre-merge file: every context line plus that
    /// side's lines of every conflict.
    pub fn side_text(&self, side: Side) -> String {
        let mut out = TextWriter::new(self);
        for block in &self.blocks {
            match block {
                ConflictBlock::Context(ctx) => out.lines(ctx.lines.iter().map(String::as_str)),
                ConflictBlock::Conflict(hunk) => out.lines(hunk.side_lines(side)),
            }
        }
        out.finish()
    }

    /// Reconstruct the common ancestor when every conflict carries diff3 base
    /// text. Returns `None` if any conflict lacks a `|||||||` section.
    pub fn base_text(&self) -> Option<String> {
        let mut out = TextWriter::new(self);
        for block in &self.blocks {
            match block {
                ConflictBlock::Context(ctx) => out.lines(ctx.lines.iter().map(String::as_str)),
                ConflictBlock::Conflict(hunk) => {
                    out.lines(hunk.base.as_ref()?.iter().map(String::as_str))
                }
            }
        }
        Some(out.finish())
    }
}

// ---------------------------------------------------------------------------
// Text reconstruction
// ---------------------------------------------------------------------------

/// Accumulates output lines, each followed by the document's terminator.
///
/// The one exception is the last raw line of a file without a trailing
/// newline: when the document ends in a context block, that line is emitted
/// bare.
pub(crate) struct TextWriter {
    buf: String,
    terminator: &'static str,
    bare_tail: bool,
}

impl TextWriter {
    pub(crate) fn new(doc: &Document) -> Self {
        let ends_in_context = matches!(
            doc.blocks.last(),
            Some(ConflictBlock::Context(ctx)) if !ctx.lines.is_empty()
        );
        Self {
            buf: String::new(),
            terminator: doc.line_ending.as_str(),
            bare_tail: ends_in_context && !doc.trailing_newline,
        }
    }

    pub(crate) fn line(&mut self, line: &str) {
        self.buf.push_str(line);
        self.buf.push_str(self.terminator);
    }

    pub(crate) fn lines<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) {
        for line in lines {
            self.line(line);
        }
    }

    /// Append `text` verbatim.
    pub(crate) fn raw(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    pub(crate) fn finish(mut self) -> String {
        if self.bare_tail && self.buf.ends_with(self.terminator) {
            self.buf.truncate(self.buf.len() - self.terminator.len());
        }
        self.buf
    }
}
