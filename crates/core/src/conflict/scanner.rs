//! Conflict-marker recognition.
//!
//! Classifies single lines of a conflicted file. Recognition is exact-prefix,
//! case-sensitive and anchored at the start of the line:
//!
//! | Marker | Form |
//! |--------|------|
//! | Conflict start | `<<<<<<< <label>` |
//! | Base (diff3) | `\|\|\|\|\|\|\| <label>` |
//! | Separator | `=======` |
//! | Conflict end | `>>>>>>> <label>` |
//!
//! A marker written without its label (exactly seven marker characters) is
//! accepted with an empty label.

const START: &str = "<<<<<<<";
const BASE: &str = "|||||||";
const SEPARATOR: &str = "=======";
const END: &str = ">>>>>>>";

/// Classification of one input line. Labels borrow from the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    StartConflict(&'a str),
    StartBase(&'a str),
    Separator,
    EndConflict(&'a str),
    Plain,
}

impl LineClass<'_> {
    /// `true` for every variant except [`LineClass::Plain`].
    pub fn is_marker(&self) -> bool {
        !matches!(self, Self::Plain)
    }
}

/// Stateless line classifier.
pub struct MarkerScanner;

impl MarkerScanner {
    /// Classify a single line (without its terminator).
    ///
    /// A stray trailing `\r` is ignored for recognition so that CRLF marker
    /// lines are still found in files whose dominant terminator is `\n`.
    pub fn classify(line: &str) -> LineClass<'_> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line == SEPARATOR {
            return LineClass::Separator;
        }
        if let Some(label) = labelled(line, START) {
            return LineClass::StartConflict(label);
        }
        if let Some(label) = labelled(line, BASE) {
            return LineClass::StartBase(label);
        }
        if let Some(label) = labelled(line, END) {
            return LineClass::EndConflict(label);
        }
        LineClass::Plain
    }
}

/// Match `marker` followed by either end of line or a space and a label.
fn labelled<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?;
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix(' ')
}
