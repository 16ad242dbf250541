//! Applies recorded changes.
//!
//! A declaration-only assignment becomes `var names = values` in place. A
//! mixed one keeps its right-hand side and position but assigns into fresh
//! temporaries with `:=`; one statement per kept target follows it, in
//! target order:
//!
//! ```text
//! :n, err = f()   =>   ꞏtmp0, ꞏtmp1 := f()
//!                      var n = ꞏtmp0
//!                      err = ꞏtmp1
//! ```

use gocolon_parser::ast::*;
use smallvec::SmallVec;

use crate::classify::Entry;
use crate::error::{DiagnosticKind, Finding};
use crate::transform::{Change, Slot};
use crate::TEMP_TAG;

pub const DETACHED_STATEMENT: &str = "declaration outside its statement list";

/// Temporary names of one translation run.
#[derive(Debug, Default)]
pub struct Temps {
    next: usize,
}

impl Temps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self) -> String {
        let name = format!("{TEMP_TAG}{}", self.next);
        self.next += 1;
        name
    }

    /// Number of names minted so far.
    pub fn count(&self) -> usize {
        self.next
    }
}

impl Change {
    /// `src` is the buffer the tree was parsed from.
    pub(crate) fn apply(self, a: &mut AstArena, src: &str, temps: &mut Temps) -> Result<(), Finding> {
        if self.targets.is_mixed() {
            self.apply_mixed(a, src, temps)
        } else {
            self.apply_declaration(a)
        }
    }

    fn detached(&self, a: &AstArena) -> Finding {
        Finding::new(
            a.stmts.span(self.stmt).start,
            DiagnosticKind::Translate,
            DETACHED_STATEMENT,
        )
    }

    fn apply_declaration(self, a: &mut AstArena) -> Result<(), Finding> {
        let SimpleStmt::Assign { lhs, rhs, .. } = a.simple_stmts[self.assign] else {
            return Err(self.detached(a));
        };
        let names: SmallVec<[IdentName; 4]> = a
            .exprs_list(lhs)
            .iter()
            .filter_map(|&e| match a.exprs[e] {
                Expr::Ident(name) => Some(name),
                _ => None,
            })
            .collect();
        let values: SmallVec<[ExprId; 4]> = a.exprs_list(rhs).iter().copied().collect();
        let span = a.stmts.span(self.stmt);
        let decl = a.var_decl_stmt(names, values, span);

        match self.slot {
            Slot::Label(label) => {
                if !matches!(a.stmts[label], Stmt::Labeled { stmt, .. } if stmt == self.stmt) {
                    return Err(self.detached(a));
                }
                if let Stmt::Labeled { stmt, .. } = &mut a.stmts[label] {
                    *stmt = decl;
                }
            }
            Slot::List => {
                let Some(i) = a.stmt_lists[self.list].position(self.stmt) else {
                    return Err(self.detached(a));
                };
                a.stmt_lists[self.list].stmts[i] = decl;
            }
        }
        Ok(())
    }

    fn apply_mixed(self, a: &mut AstArena, src: &str, temps: &mut Temps) -> Result<(), Finding> {
        let SimpleStmt::Assign { lhs, rhs, op_pos, .. } = a.simple_stmts[self.assign] else {
            return Err(self.detached(a));
        };
        let Some(at) = a.stmt_lists[self.list].position(self.anchor) else {
            return Err(self.detached(a));
        };
        // Follow-ups start at the end of the line so a trailing comment stays
        // on the assignment.
        let end = a.stmts.span(self.stmt).end as usize;
        let eol = src
            .get(end..)
            .and_then(|rest| rest.find('\n'))
            .map_or(end, |i| end + i);
        let span = Span::empty_at(eol as u32);
        let targets: SmallVec<[ExprId; 4]> = a.exprs_list(lhs).iter().copied().collect();

        let mut new_lhs: SmallVec<[ExprId; 4]> = SmallVec::with_capacity(targets.len());
        let mut after: SmallVec<[StmtId; 4]> = SmallVec::new();
        for (&target, entry) in targets.iter().zip(&self.targets.entries) {
            if *entry == Entry::Ignored {
                new_lhs.push(target);
                continue;
            }
            let temp = temps.mint();
            let pos = a.exprs.span(target);
            new_lhs.push(a.ident_expr(&temp, pos));
            let value = a.ident_expr(&temp, pos);
            let stmt = match *entry {
                Entry::Declare(name) => a.var_decl_stmt([name], [value], span),
                _ => a.assign_stmt(target, value, span),
            };
            after.push(stmt);
        }

        let lhs = a.list_exprs(new_lhs);
        a.simple_stmts[self.assign] = SimpleStmt::Assign {
            lhs,
            op: AssignOp::Define,
            op_pos,
            rhs,
        };

        a.stmt_lists[self.list].stmts.splice(at + 1..at + 1, after);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revert::revert;
    use crate::rewrite::rewrite;
    use crate::transform::Transformer;
    use gocolon_parser::{parse_file, print_file};

    struct Fixture {
        text: String,
        arena: AstArena,
        file: SourceFile,
        changes: Vec<Change>,
    }

    fn fixture(body: &str) -> Fixture {
        let src = format!("package p\n\nfunc f() {{\n{body}\n}}\n");
        let rw = rewrite(&src).unwrap();
        let mut parsed = parse_file(&rw.text).unwrap();
        revert(&mut parsed.arena, &parsed.file);
        let mut t = Transformer::new();
        t.run(&mut parsed.arena, &parsed.file);
        assert!(t.errors.is_empty());
        Fixture {
            text: rw.text,
            arena: parsed.arena,
            file: parsed.file,
            changes: t.changes,
        }
    }

    #[test]
    fn follow_ups_are_placed_after_trailing_comments() {
        let mut f = fixture("\t:n, err = g() // note\n\tuse(n)");
        let mut temps = Temps::new();
        for c in std::mem::take(&mut f.changes) {
            c.apply(&mut f.arena, &f.text, &mut temps).unwrap();
        }
        assert_eq!(temps.count(), 2);
        assert_eq!(
            print_file(&f.arena, &f.file, &f.text),
            "package p\n\nfunc f() {\n\tꞏtmp0, ꞏtmp1 := g() // note\n\tvar n = ꞏtmp0\n\terr = ꞏtmp1\n\tuse(n)\n}\n"
        );
    }

    #[test]
    fn statements_missing_from_their_list_are_reported() {
        let mut f = fixture("\t:x = 1\n\t:n, err = g()");
        assert_eq!(f.changes.len(), 2);
        let list = f.changes[0].list;
        f.arena.stmt_lists[list].stmts.clear();
        let mut temps = Temps::new();
        for c in std::mem::take(&mut f.changes) {
            let err = c.apply(&mut f.arena, &f.text, &mut temps).unwrap_err();
            assert_eq!(err.message, DETACHED_STATEMENT);
        }
        assert_eq!(temps.count(), 0);
    }

    #[test]
    fn temporaries_are_numbered_per_run() {
        let mut t = Temps::new();
        assert_eq!(t.mint(), "ꞏtmp0");
        assert_eq!(t.mint(), "ꞏtmp1");
        assert_eq!(t.count(), 2);
        assert_eq!(Temps::new().mint(), "ꞏtmp0");
    }
}
