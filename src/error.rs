use std::fmt;

use gocolon_parser::error::{Diag, DiagKind, LineIndex};
use thiserror::Error;

use crate::rewrite::OffsetMap;
use crate::MARKER_TAG;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    /// Scanning errors and the reserved `:=` token
    Lex,
    /// The rewritten buffer is not valid Go
    Parse,
    /// Misplaced or mixed declarations
    Translate,
}

/// Error found while translating one unit, positioned in the input as the
/// user wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line}:{column}: {message}")]
pub struct Diagnostic {
    pub file: String,
    /// 1-based
    pub line: u32,
    /// 1-based byte column
    pub column: u32,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Diagnostics of one unit, sorted by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList(Vec<Diagnostic>);

impl ErrorList {
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.0
    }
}

impl From<Vec<Diagnostic>> for ErrorList {
    fn from(mut diags: Vec<Diagnostic>) -> Self {
        diags.sort_by_key(|d| (d.line, d.column));
        Self(diags)
    }
}

impl IntoIterator for ErrorList {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum TranslateError {
    /// Marker, scanning or classification errors; every one found is listed.
    #[error("{0}")]
    Rejected(ErrorList),
    /// The unit does not parse once markers are encoded.
    #[error("{0}")]
    Parse(ErrorList),
    #[error("{name}: input is not valid UTF-8: {source}")]
    Encoding {
        name: String,
        #[source]
        source: std::str::Utf8Error,
    },
}

impl TranslateError {
    /// Positioned diagnostics; empty for encoding errors.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            TranslateError::Rejected(list) | TranslateError::Parse(list) => list.as_slice(),
            TranslateError::Encoding { .. } => &[],
        }
    }
}

/// Error position in rewritten-buffer coordinates, before it is mapped back
/// to the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Finding {
    pub offset: u32,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Finding {
    pub fn new(offset: u32, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            offset,
            kind,
            message: message.into(),
        }
    }
}

impl From<Diag> for Finding {
    fn from(d: Diag) -> Self {
        let kind = match d.kind {
            DiagKind::Lex => DiagnosticKind::Lex,
            DiagKind::Parse => DiagnosticKind::Parse,
        };
        Finding::new(d.span.start, kind, d.message)
    }
}

/// Turns findings into positioned diagnostics of the original input.
pub(crate) struct Locator<'a> {
    pub file: &'a str,
    pub lines: &'a LineIndex,
    pub offsets: Option<&'a OffsetMap>,
}

impl Locator<'_> {
    pub fn locate(&self, f: Finding) -> Diagnostic {
        let offset = match self.offsets {
            Some(map) => map.to_original(f.offset),
            None => f.offset,
        };
        let pos = self.lines.position(offset);
        Diagnostic {
            file: self.file.to_string(),
            line: pos.line,
            column: pos.column,
            kind: f.kind,
            message: f.message.replace(MARKER_TAG, ":"),
        }
    }

    pub fn list(&self, findings: impl IntoIterator<Item = Finding>) -> ErrorList {
        findings
            .into_iter()
            .map(|f| self.locate(f))
            .collect::<Vec<_>>()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(line: u32, column: u32, message: &str) -> Diagnostic {
        Diagnostic {
            file: "x.colon".into(),
            line,
            column,
            kind: DiagnosticKind::Translate,
            message: message.into(),
        }
    }

    #[test]
    fn lists_are_sorted_by_position() {
        let list = ErrorList::from(vec![diag(3, 1, "c"), diag(1, 9, "b"), diag(1, 2, "a")]);
        let messages: Vec<_> = list.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["a", "b", "c"]);
    }

    #[test]
    fn encoded_names_are_shown_as_written() {
        let src = "x = T{k:v, j:w}\n";
        let lines = LineIndex::new(src);
        let at = Locator {
            file: "x.colon",
            lines: &lines,
            offsets: None,
        };
        let d = at.locate(Finding::new(
            7,
            DiagnosticKind::Parse,
            "expected ',' or '}', found ꞏdecl_v",
        ));
        assert_eq!(d.to_string(), "x.colon:1:8: expected ',' or '}', found :v");
    }

    #[test]
    fn displays_go_style_positions() {
        let list = ErrorList::from(vec![diag(2, 5, "unexpected colon-prefix"), diag(4, 1, "x")]);
        assert_eq!(
            list.to_string(),
            "x.colon:2:5: unexpected colon-prefix\nx.colon:4:1: x"
        );
    }
}
