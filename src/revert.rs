//! Undoes the token pre-pass on the parsed tree.
//!
//! Every `:=` in the tree was produced by the pre-pass (input `:=` is
//! rejected), so all of them go back to `=`; declaration intent is decided
//! later from the markers alone. Encoded names get their `:` back.

use gocolon_parser::ast::*;
use gocolon_parser::walk::{Visitor, Walk};

use crate::MARKER_TAG;

/// Reverts operators and marker names. Returns the number of restored names.
pub fn revert(a: &mut AstArena, file: &SourceFile) -> usize {
    let mut r = Revert::default();
    r.visit_source_file(a, file);

    let encoded = a.symbols.with_prefix(MARKER_TAG);
    for &sym in &encoded {
        let name = format!(":{}", &a.symbols.resolve(sym)[MARKER_TAG.len()..]);
        a.symbols.rename(sym, &name);
    }
    tracing::debug!(operators = r.operators, names = encoded.len(), "reverted pre-pass");
    encoded.len()
}

#[derive(Default)]
struct Revert {
    operators: usize,
}

impl Visitor for Revert {
    fn visit_simple_stmt(&mut self, a: &mut AstArena, id: SimpleStmtId) {
        if let SimpleStmt::Assign { op, .. } = &mut a.simple_stmts[id] {
            if *op == AssignOp::Define {
                *op = AssignOp::Assign;
                self.operators += 1;
            }
        }
        let s = a.simple_stmts[id];
        s.walk(a, self);
    }

    fn visit_stmt(&mut self, a: &mut AstArena, id: StmtId) {
        if let Stmt::For {
            kind: ForKind::Range { op, .. },
            ..
        } = &mut a.stmts[id]
        {
            if *op == Some(AssignOp::Define) {
                *op = Some(AssignOp::Assign);
                self.operators += 1;
            }
        }
        let s = a.stmts[id];
        s.walk(a, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::rewrite;
    use gocolon_parser::{parse_file, print_file};

    fn reverted(src: &str) -> String {
        let rw = rewrite(src).unwrap();
        let mut parsed = parse_file(&rw.text).unwrap();
        revert(&mut parsed.arena, &parsed.file);
        print_file(&parsed.arena, &parsed.file, &rw.text)
    }

    #[test]
    fn restores_markers_and_plain_assignment() {
        let src = "package p\n\nfunc f() {\n\t:x = 1\n\ta, :b = g()\n\tswitch :t = v.(type) {\n\t}\n}\n";
        assert_eq!(reverted(src), src);
    }

    #[test]
    fn restores_range_operators() {
        let src = "package p\n\nfunc f() {\n\tfor :i = range xs {\n\t}\n}\n";
        assert_eq!(reverted(src), src);
    }
}
