//! Translator from Go with colon declarations to plain Go.
//!
//! A name written `:name` as an assignment target declares it:
//!
//! ```text
//! :n, err = f()          ꞏtmp0, ꞏtmp1 := f()
//!                  =>    var n = ꞏtmp0
//!                        err = ꞏtmp1
//! ```
//!
//! Pipeline, one module each: [`rewrite`] encodes markers so the buffer
//! parses as Go, [`revert`] undoes the encoding on the tree, [`transform`]
//! classifies every assignment ([`classify`]) and records changes, and
//! [`apply`] performs them once no error was found. The tree is printed by
//! [`gocolon_parser::print_file`].

pub mod apply;
pub mod classify;
pub mod error;
pub mod logging;
pub mod revert;
pub mod rewrite;
pub mod transform;

use gocolon_parser::error::LineIndex;
use gocolon_parser::{parse_file, print_file};
use tracing::debug;

pub use error::{Diagnostic, DiagnosticKind, ErrorList, TranslateError};

use crate::apply::Temps;
use crate::error::{Finding, Locator};
use crate::transform::Transformer;

/// Prefix of encoded markers in the rewritten buffer.
pub const MARKER_TAG: &str = "ꞏdecl_";
/// Prefix of generated temporaries.
pub const TEMP_TAG: &str = "ꞏtmp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// The input in canonical form, markers kept
    pub formatted: Vec<u8>,
    /// Plain Go
    pub translated: Vec<u8>,
}

/// State of one translation run.
#[derive(Debug)]
pub struct Translator {
    name: String,
    temps: Temps,
}

impl Translator {
    /// `name` prefixes every diagnostic.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            temps: Temps::new(),
        }
    }

    pub fn run(mut self, src: &[u8]) -> Result<Translation, TranslateError> {
        let src = std::str::from_utf8(src).map_err(|source| TranslateError::Encoding {
            name: self.name.clone(),
            source,
        })?;
        let lines = LineIndex::new(src);

        let rw = rewrite::rewrite(src).map_err(|diags| {
            let at = Locator {
                file: &self.name,
                lines: &lines,
                offsets: None,
            };
            TranslateError::Rejected(at.list(diags.into_iter().map(Finding::from)))
        })?;
        debug!(file = %self.name, markers = rw.markers, "rewrote input");

        let at = Locator {
            file: &self.name,
            lines: &lines,
            offsets: Some(&rw.offsets),
        };
        let mut parsed = parse_file(&rw.text)
            .map_err(|e| TranslateError::Parse(at.list(e.diags.into_iter().map(Finding::from))))?;
        let (a, file) = (&mut parsed.arena, &parsed.file);

        revert::revert(a, file);
        let formatted = print_file(a, file, &rw.text);

        let mut transformer = Transformer::new();
        transformer.run(a, file);
        if !transformer.errors.is_empty() {
            return Err(TranslateError::Rejected(at.list(transformer.errors)));
        }
        let detached: Vec<Finding> = transformer
            .changes
            .into_iter()
            .filter_map(|change| change.apply(a, &rw.text, &mut self.temps).err())
            .collect();
        if !detached.is_empty() {
            return Err(TranslateError::Rejected(at.list(detached)));
        }
        debug!(file = %self.name, temporaries = self.temps.count(), "applied changes");

        let translated = print_file(a, file, &rw.text);
        Ok(Translation {
            formatted: formatted.into_bytes(),
            translated: translated.into_bytes(),
        })
    }
}

/// Translates one unit. See [`Translator`].
pub fn translate(name: &str, src: &[u8]) -> Result<Translation, TranslateError> {
    Translator::new(name).run(src)
}
