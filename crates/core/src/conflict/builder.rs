//! Single-pass state machine that groups classified lines into a
//! [`Document`].
//!
//! ```text
//! Context --<<<<<<<--> Ours --|||||||--> Base
//!    ^                  |                 |
//!    |               =======           =======
//!    |                  v                 |
//!    +----->>>>>>>--- Theirs <------------+
//! ```
//!
//! The only accepting state is `Context`. Consecutive plain lines outside a
//! conflict are grouped into one context block. Ours/theirs hunks are aligned
//! into rows padded to the longer of the two.

use tracing::{debug, info};

use crate::errors::ParseError;

use super::document::{
    split_lines, ConflictBlock, ConflictHunk, ConflictLine, ContextBlock, Document, LineEnding,
};
use super::scanner::{LineClass, MarkerScanner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Context,
    Ours,
    Base,
    Theirs,
}

/// A conflict region whose closing marker has not been seen yet.
#[derive(Debug)]
struct OpenHunk {
    start_line: usize,
    ours_label: Option<String>,
    base_label: Option<String>,
    ours: Vec<String>,
    base: Option<Vec<String>>,
    theirs: Vec<String>,
}

impl OpenHunk {
    fn close(self, end_line: usize, theirs_label: Option<String>) -> ConflictHunk {
        let row_count = self.ours.len().max(self.theirs.len());
        let mut ours = self.ours.into_iter();
        let mut theirs = self.theirs.into_iter();
        let mut base = self.base.iter().flatten();

        let rows = (0..row_count)
            .map(|_| ConflictLine {
                ours: ours.next(),
                theirs: theirs.next(),
                base: base.next().cloned(),
            })
            .collect();

        ConflictHunk {
            start_line: self.start_line,
            end_line,
            ours_label: self.ours_label,
            base_label: self.base_label,
            theirs_label,
            rows,
            base: self.base,
        }
    }
}

/// Incremental document builder. Feed lines in order, then [`finish`].
///
/// [`finish`]: BlockBuilder::finish
#[derive(Debug)]
pub struct BlockBuilder {
    state: State,
    line_no: usize,
    blocks: Vec<ConflictBlock>,
    context: Option<ContextBlock>,
    hunk: Option<OpenHunk>,
    line_ending: LineEnding,
    trailing_newline: bool,
}

impl BlockBuilder {
    pub fn new(line_ending: LineEnding, trailing_newline: bool) -> Self {
        Self {
            state: State::Context,
            line_no: 0,
            blocks: Vec::new(),
            context: None,
            hunk: None,
            line_ending,
            trailing_newline,
        }
    }

    /// Parse the full text of a conflicted file.
    pub fn parse(text: &str) -> Result<Document, ParseError> {
        let (lines, line_ending, trailing_newline) = split_lines(text);
        debug!(
            lines = lines.len(),
            ?line_ending,
            trailing_newline,
            "splitting conflicted file"
        );

        let mut builder = Self::new(line_ending, trailing_newline);
        for line in lines {
            builder.feed(line)?;
        }
        builder.finish()
    }

    /// Consume the next line (without its terminator).
    pub fn feed(&mut self, line: &str) -> Result<(), ParseError> {
        self.line_no += 1;
        let class = MarkerScanner::classify(line);

        match (self.state, class) {
            (State::Context, LineClass::Plain) => {
                let line_no = self.line_no;
                self.context
                    .get_or_insert_with(|| ContextBlock {
                        start_line: line_no,
                        lines: Vec::new(),
                    })
                    .lines
                    .push(line.to_string());
            }
            (State::Context, LineClass::StartConflict(label)) => {
                self.flush_context();
                self.hunk = Some(OpenHunk {
                    start_line: self.line_no,
                    ours_label: non_empty(label),
                    base_label: None,
                    ours: Vec::new(),
                    base: None,
                    theirs: Vec::new(),
                });
                self.state = State::Ours;
            }
            (State::Ours, LineClass::Plain) => self.open_hunk()?.ours.push(line.to_string()),
            (State::Ours, LineClass::StartBase(label)) => {
                let hunk = self.open_hunk()?;
                hunk.base_label = non_empty(label);
                hunk.base = Some(Vec::new());
                self.state = State::Base;
            }
            (State::Base, LineClass::Plain) => {
                self.open_hunk()?
                    .base
                    .get_or_insert_with(Vec::new)
                    .push(line.to_string());
            }
            (State::Ours | State::Base, LineClass::Separator) => self.state = State::Theirs,
            (State::Theirs, LineClass::Plain) => self.open_hunk()?.theirs.push(line.to_string()),
            (State::Theirs, LineClass::EndConflict(label)) => {
                let hunk = self.hunk.take().ok_or_else(|| self.out_of_sequence(line))?;
                let hunk = hunk.close(self.line_no, non_empty(label));
                debug!(
                    start_line = hunk.start_line,
                    end_line = hunk.end_line,
                    rows = hunk.rows.len(),
                    diff3 = hunk.has_base(),
                    "closed conflict block"
                );
                self.blocks.push(ConflictBlock::Conflict(hunk));
                self.state = State::Context;
            }
            (_, _) => return Err(self.out_of_sequence(line)),
        }
        Ok(())
    }

    /// Finish parsing. Fails if input ended inside a conflict region.
    pub fn finish(mut self) -> Result<Document, ParseError> {
        if self.state != State::Context {
            let line = self
                .hunk
                .as_ref()
                .map(|h| h.start_line)
                .unwrap_or(self.line_no);
            return Err(ParseError::UnterminatedBlock { line });
        }

        self.flush_context();
        if self.blocks.is_empty() {
            self.blocks.push(ConflictBlock::Context(ContextBlock {
                start_line: 1,
                lines: Vec::new(),
            }));
        }

        let doc = Document::new(self.blocks, self.line_ending, self.trailing_newline);
        info!(
            blocks = doc.len(),
            conflicts = doc.conflict_count(),
            "parsed conflicted file"
        );
        Ok(doc)
    }

    fn flush_context(&mut self) {
        if let Some(ctx) = self.context.take() {
            self.blocks.push(ConflictBlock::Context(ctx));
        }
    }

    fn open_hunk(&mut self) -> Result<&mut OpenHunk, ParseError> {
        let line = self.line_no;
        self.hunk.as_mut().ok_or(ParseError::MarkerOutOfSequence {
            line,
            marker: String::new(),
        })
    }

    fn out_of_sequence(&self, line: &str) -> ParseError {
        ParseError::MarkerOutOfSequence {
            line: self.line_no,
            marker: line.trim_end_matches('\r').to_string(),
        }
    }
}

fn non_empty(label: &str) -> Option<String> {
    (!label.is_empty()).then(|| label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::document::Side;

    const EXAMPLE: &str = "line1\n<<<<<<< HEAD\nmine\n=======\ntheirs\n>>>>>>> branch\nline2";

    fn context_lines(block: &ConflictBlock) -> Vec<&str> {
        block
            .as_context()
            .expect("expected context block")
            .lines
            .iter()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn test_parse_single_conflict() {
        let doc = BlockBuilder::parse(EXAMPLE).unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(context_lines(&doc.blocks()[0]), vec!["line1"]);
        assert_eq!(context_lines(&doc.blocks()[2]), vec!["line2"]);

        let hunk = doc.blocks()[1].as_conflict().unwrap();
        assert_eq!(hunk.rows.len(), 1);
        assert_eq!(hunk.rows[0].ours.as_deref(), Some("mine"));
        assert_eq!(hunk.rows[0].theirs.as_deref(), Some("theirs"));
        assert_eq!(hunk.ours_label.as_deref(), Some("HEAD"));
        assert_eq!(hunk.theirs_label.as_deref(), Some("branch"));
        assert_eq!(hunk.start_line, 2);
        assert_eq!(hunk.end_line, 6);
        assert!(!hunk.has_base());
    }

    #[test]
    fn test_block_start_lines() {
        let doc = BlockBuilder::parse(EXAMPLE).unwrap();
        let starts: Vec<usize> = doc.blocks().iter().map(|b| b.start_line()).collect();
        assert_eq!(starts, vec![1, 2, 7]);
    }

    #[test]
    fn test_context_lines_are_grouped() {
        let doc = BlockBuilder::parse("a\nb\nc\n").unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(context_lines(&doc.blocks()[0]), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_uneven_sides_are_padded() {
        let text = "<<<<<<< HEAD\none\ntwo\n=======\nuno\n>>>>>>> other\n";
        let doc = BlockBuilder::parse(text).unwrap();
        assert_eq!(doc.len(), 1);
        let hunk = doc.blocks()[0].as_conflict().unwrap();
        assert_eq!(hunk.rows.len(), 2);
        assert_eq!(hunk.rows[1].ours.as_deref(), Some("two"));
        assert_eq!(hunk.rows[1].theirs, None);
    }

    #[test]
    fn test_empty_side() {
        let text = "<<<<<<< HEAD\n=======\nadded\n>>>>>>> other\n";
        let doc = BlockBuilder::parse(text).unwrap();
        let hunk = doc.blocks()[0].as_conflict().unwrap();
        assert_eq!(hunk.rows.len(), 1);
        assert_eq!(hunk.rows[0].ours, None);
        assert_eq!(hunk.side_lines(Side::Theirs).collect::<Vec<_>>(), vec!["added"]);
    }

    #[test]
    fn test_diff3_base_is_retained() {
        let text = "<<<<<<< ours\nA\n||||||| base\nB0\nB1\nB2\n=======\nC\n>>>>>>> theirs\n";
        let doc = BlockBuilder::parse(text).unwrap();
        let hunk = doc.blocks()[0].as_conflict().unwrap();
        assert_eq!(hunk.base_label.as_deref(), Some("base"));
        assert_eq!(hunk.rows.len(), 1);
        assert_eq!(hunk.rows[0].base.as_deref(), Some("B0"));
        assert_eq!(
            hunk.base.as_deref(),
            Some(&["B0".to_string(), "B1".to_string(), "B2".to_string()][..])
        );
    }

    #[test]
    fn test_unterminated_block() {
        let err = BlockBuilder::parse("<<<<<<< HEAD\nmine\n").unwrap_err();
        assert_eq!(err.reason(), "unterminated conflict block");
        assert_eq!(err, ParseError::UnterminatedBlock { line: 1 });

        let err = BlockBuilder::parse("ok\n<<<<<<< HEAD\na\n=======\nb\n").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedBlock { line: 2 });
    }

    #[test]
    fn test_markers_out_of_sequence() {
        let cases = [
            ("a\n=======\n", 2),
            ("a\n>>>>>>> branch\n", 2),
            ("||||||| base\n", 1),
            ("<<<<<<< HEAD\n<<<<<<< nested\n", 2),
            ("<<<<<<< HEAD\n>>>>>>> branch\n", 2),
            ("<<<<<<< HEAD\n=======\n=======\n", 3),
            ("<<<<<<< HEAD\n=======\n||||||| base\n", 3),
            ("<<<<<<< HEAD\n||||||| a\n||||||| b\n", 3),
        ];
        for (text, line) in cases {
            let err = BlockBuilder::parse(text).unwrap_err();
            assert_eq!(err.reason(), "marker out of sequence", "input: {text:?}");
            assert_eq!(err.line(), line, "input: {text:?}");
        }
    }

    #[test]
    fn test_empty_input_is_one_empty_context_block() {
        let doc = BlockBuilder::parse("").unwrap();
        assert_eq!(doc.len(), 1);
        assert!(context_lines(&doc.blocks()[0]).is_empty());
    }

    #[test]
    fn test_adjacent_conflicts_have_no_context_between() {
        let text = "<<<<<<< a\n1\n=======\n2\n>>>>>>> b\n<<<<<<< a\n3\n=======\n4\n>>>>>>> b\n";
        let doc = BlockBuilder::parse(text).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.conflict_indices(), vec![0, 1]);
    }

    #[test]
    fn test_bare_markers_have_no_labels() {
        let doc = BlockBuilder::parse("<<<<<<<\nx\n=======\ny\n>>>>>>>\n").unwrap();
        let hunk = doc.blocks()[0].as_conflict().unwrap();
        assert_eq!(hunk.ours_label, None);
        assert_eq!(hunk.theirs_label, None);
    }

    #[test]
    fn test_incremental_feed() {
        let mut builder = BlockBuilder::new(LineEnding::Lf, true);
        for line in ["keep", "<<<<<<< HEAD", "x", "=======", "y", ">>>>>>> dev"] {
            builder.feed(line).unwrap();
        }
        let doc = builder.finish().unwrap();
        assert_eq!(doc.conflict_count(), 1);
        assert!(doc.has_trailing_newline());
    }
}
