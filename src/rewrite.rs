//! Token-level pre-pass.
//!
//! `:name` markers are not Go. Before parsing, every marker of the form
//! `COLON IDENT (ASSIGN | COMMA)` with the colon touching the identifier is
//! encoded as an ordinary identifier: the colon becomes a space and the name
//! gets the [`MARKER_TAG`] prefix. A marked name directly followed by `=` and
//! not preceded by a comma also gets its `=` turned into `:=`, which makes
//! type switch guards (`switch :t = x.(type)`) parseable.
//!
//! Other colons (labels, case clauses, key/value pairs, slices) are left
//! alone. A colon separated from the name by whitespace is never a marker.
//!
//! Edits never add or remove newlines, so lines of the rewritten buffer are
//! the input lines. [`OffsetMap`] maps byte offsets back.

use gocolon_parser::ast::Span;
use gocolon_parser::error::{Diag, DiagKind};
use gocolon_parser::lexer::{Lexer, Spanned, Tok};
use tracing::trace;

use crate::MARKER_TAG;

pub const RESERVED_DEFINE: &str = r#"reserved token ":=" in input"#;

/// Output of [`rewrite`].
#[derive(Debug, Clone)]
pub struct Rewritten {
    pub text: String,
    pub offsets: OffsetMap,
    /// Number of encoded markers
    pub markers: usize,
}

/// Encodes colon markers. Scanning errors and any `:=` in the input are
/// returned instead, in input coordinates.
pub fn rewrite(src: &str) -> Result<Rewritten, Vec<Diag>> {
    let mut lexer = Lexer::new(src);
    let mut errors = Vec::new();
    let mut out = String::with_capacity(src.len() + src.len() / 16);
    let mut offsets = OffsetMap::default();
    let mut markers = 0;
    let mut low = 0;
    let mut window: [Spanned<'_>; 4] = [(0, Tok::Eof, 0); 4];

    for (i, tok) in lexer.by_ref().enumerate() {
        window[i % 4] = tok;
        let (start, kind, end) = tok;
        if kind == Tok::Define {
            errors.push(Diag {
                kind: DiagKind::Lex,
                span: Span::new(start, end),
                message: RESERVED_DEFINE.to_string(),
            });
            continue;
        }
        if i < 2 || !matches!(kind, Tok::Assign | Tok::Comma) {
            continue;
        }

        let (ident_start, ident, _) = window[(i - 1) % 4];
        let (colon_start, colon, colon_end) = window[(i - 2) % 4];
        let Tok::Ident(name) = ident else { continue };
        if colon != Tok::Colon || name == "_" || colon_end != ident_start {
            continue;
        }

        out.push_str(&src[low..colon_start]);
        out.push(' ');
        out.push_str(MARKER_TAG);
        offsets.splice(colon_start, colon_end - colon_start, 1 + MARKER_TAG.len());
        out.push_str(&src[colon_end..start]);
        low = start;
        markers += 1;
        trace!(name, offset = colon_start, "encoded marker");

        // `=` after a lone marked name must parse as `:=`
        if kind == Tok::Assign && (i < 3 || window[(i - 3) % 4].1 != Tok::Comma) {
            out.push(':');
            offsets.splice(start, 0, 1);
        }
    }
    out.push_str(&src[low..]);

    let mut diags = lexer.take_diags();
    if !errors.is_empty() || !diags.is_empty() {
        diags.append(&mut errors);
        return Err(diags);
    }
    Ok(Rewritten {
        text: out,
        offsets,
        markers,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Splice {
    /// Start in the input
    original: u32,
    /// Start in the rewritten buffer
    rewritten: u32,
    removed: u32,
    inserted: u32,
}

/// Rewritten-buffer offset -> input offset.
///
/// Offsets inside inserted text map to the start of the replaced input text,
/// so an encoded marker reports the position of its colon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetMap {
    splices: Vec<Splice>,
    /// Rewritten length minus input length so far
    delta: i64,
}

impl OffsetMap {
    /// Records that `removed` input bytes at `original` were replaced by
    /// `inserted` bytes. Splices must be recorded in input order.
    pub fn splice(&mut self, original: usize, removed: usize, inserted: usize) {
        debug_assert!(inserted > 0);
        let rewritten = original as i64 + self.delta;
        self.splices.push(Splice {
            original: original as u32,
            rewritten: rewritten as u32,
            removed: removed as u32,
            inserted: inserted as u32,
        });
        self.delta += inserted as i64 - removed as i64;
    }

    pub fn to_original(&self, offset: u32) -> u32 {
        let i = self.splices.partition_point(|s| s.rewritten <= offset);
        let Some(s) = i.checked_sub(1).map(|j| self.splices[j]) else {
            return offset;
        };
        if offset < s.rewritten + s.inserted {
            return s.original;
        }
        s.original + s.removed + (offset - s.rewritten - s.inserted)
    }

    pub fn is_empty(&self) -> bool {
        self.splices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(src: &str) -> String {
        rewrite(src).unwrap().text
    }

    #[test]
    fn encodes_a_lone_marker_and_forces_define() {
        assert_eq!(text(":x = 1"), " ꞏdecl_x := 1");
        assert_eq!(text("switch :t = v.(type) {}"), "switch  ꞏdecl_t := v.(type) {}");
    }

    #[test]
    fn marker_after_a_comma_keeps_plain_assignment() {
        assert_eq!(text("a, :b = f()"), "a,  ꞏdecl_b = f()");
        assert_eq!(text(":a, b = f()"), " ꞏdecl_a, b = f()");
        assert_eq!(text(":a, :b = f()"), " ꞏdecl_a,  ꞏdecl_b = f()");
    }

    #[test]
    fn ignores_colons_that_are_not_markers() {
        for src in [
            "x = a[1:n]",
            "L:\n\tx = 1",
            "m = T{k: v, j: w}",
            "switch x {\ncase 1:\n}",
            ": x = 1",
            ":_ = f()",
        ] {
            assert_eq!(text(src), src);
        }
    }

    #[test]
    fn rejects_every_define() {
        let diags = rewrite("a := 1\nb := 2\n").unwrap_err();
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.message == RESERVED_DEFINE));
        assert_eq!(diags[1].span.start, 9);
    }

    #[test]
    fn scanning_errors_are_reported() {
        let diags = rewrite("x = \"unterminated\n").unwrap_err();
        assert!(!diags.is_empty());
        assert!(diags.iter().all(|d| d.kind == DiagKind::Lex));
    }

    #[test]
    fn offsets_map_back_to_the_input() {
        let src = "f()\n:a, b = g(:c, 1)";
        let r = rewrite(src).unwrap();
        let tag_at = |n: usize| r.text.match_indices(MARKER_TAG).nth(n).unwrap().0 as u32;
        // Encoded names point at their colon.
        assert_eq!(r.offsets.to_original(tag_at(0)), 4);
        assert_eq!(r.offsets.to_original(tag_at(1)), 14);
        // Text between and after splices keeps its offset.
        let b = r.text.find(" b").unwrap() as u32 + 1;
        assert_eq!(r.offsets.to_original(b), 8);
        assert_eq!(r.offsets.to_original(0), 0);
        let one = r.text.rfind('1').unwrap() as u32;
        assert_eq!(r.offsets.to_original(one), src.rfind('1').unwrap() as u32);
    }

    #[test]
    fn preserves_lines() {
        let src = "x = 1\n:y = 2\n\nif :a, :b = f(); b {\n}\n";
        assert_eq!(text(src).lines().count(), src.lines().count());
    }
}
