//! Statement transformer.
//!
//! One walk over the reverted tree. Assignments in control clause headers,
//! range clauses and select receive clauses are fixed in place (all targets
//! declared becomes `:=`). Every other assignment with declared targets is
//! recorded as a [`Change`] and applied after the walk, once no error has
//! been found.
//!
//! The context is not inherited: each node decides the context of its
//! children (statement list, header position, receive clause, labels).

use gocolon_parser::ast::*;
use gocolon_parser::walk::{Visitor, Walk};

use crate::apply::DETACHED_STATEMENT;
use crate::classify::{classify, Classification};
use crate::error::{DiagnosticKind, Finding};

pub const MIXED_INIT: &str = "mixed assignment in init statement";
pub const MIXED_RANGE: &str = "mixed assignment in range";
pub const UNEXPECTED_MARKER: &str = "unexpected colon-prefix";
pub const COMPOUND_MARKER: &str = "colon-prefix in compound assignment";

/// Where a rewritten statement lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Entry of the statement list, found by identity
    List,
    /// Body of this labeled statement
    Label(StmtId),
}

/// Deferred rewrite of one assignment statement.
#[derive(Debug, Clone)]
pub struct Change {
    pub assign: SimpleStmtId,
    /// Statement wrapping `assign`
    pub stmt: StmtId,
    pub list: StmtListId,
    pub slot: Slot,
    /// Follow-up statements go right after this entry of `list`: the
    /// statement itself or its outermost label
    pub anchor: StmtId,
    pub targets: Classification,
}

#[derive(Debug, Clone, Copy, Default)]
struct Ctx {
    list: Option<StmtListId>,
    /// Control clause header (if, for, switch)
    init: bool,
    /// Receive statement of the enclosing select case
    comm: Option<SimpleStmtId>,
    inner_label: Option<StmtId>,
    outer_label: Option<StmtId>,
}

#[derive(Default)]
pub struct Transformer {
    ctx: Ctx,
    pub changes: Vec<Change>,
    pub(crate) errors: Vec<Finding>,
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&mut self, a: &mut AstArena, file: &SourceFile) {
        self.visit_source_file(a, file);
        tracing::debug!(
            changes = self.changes.len(),
            errors = self.errors.len(),
            "classified assignments"
        );
    }

    /// Visits `f` under `ctx`, restoring the current context afterwards.
    fn scoped(&mut self, ctx: Ctx, a: &mut AstArena, f: impl FnOnce(&mut Self, &mut AstArena)) {
        let saved = std::mem::replace(&mut self.ctx, ctx);
        f(self, a);
        self.ctx = saved;
    }

    fn error(&mut self, offset: u32, message: &str) {
        self.errors
            .push(Finding::new(offset, DiagnosticKind::Translate, message));
    }

    fn simple_stmt(&mut self, a: &mut AstArena, id: SimpleStmtId, stmt: Option<StmtId>) {
        if let SimpleStmt::Assign { lhs, op, .. } = a.simple_stmts[id] {
            self.assign(a, id, lhs, op, stmt);
        }
        let s = a.simple_stmts[id];
        self.scoped(Ctx::default(), a, |v, a| s.walk(a, v));
    }

    fn assign(
        &mut self,
        a: &mut AstArena,
        id: SimpleStmtId,
        lhs: ListRef<ExprId>,
        op: AssignOp,
        stmt: Option<StmtId>,
    ) {
        let targets: Vec<Option<ExprId>> = a.exprs_list(lhs).iter().map(|&e| Some(e)).collect();
        let c = classify(a, &targets);
        if c.declare == 0 {
            return;
        }
        if op != AssignOp::Assign {
            self.error(a.simple_stmts.span(id).start, COMPOUND_MARKER);
            return;
        }

        if self.ctx.init || self.ctx.comm == Some(id) {
            if c.reassign > 0 {
                self.error(a.simple_stmts.span(id).start, MIXED_INIT);
            } else if let SimpleStmt::Assign { op, .. } = &mut a.simple_stmts[id] {
                *op = AssignOp::Define;
            }
            return;
        }

        // Plain statements always sit in a list, possibly behind labels.
        let (Some(stmt), Some(list)) = (stmt, self.ctx.list) else {
            self.error(a.simple_stmts.span(id).start, DETACHED_STATEMENT);
            return;
        };
        let (slot, anchor) = match (self.ctx.inner_label, self.ctx.outer_label) {
            (Some(inner), Some(outer)) => (Slot::Label(inner), outer),
            _ => (Slot::List, stmt),
        };
        self.changes.push(Change {
            assign: id,
            stmt,
            list,
            slot,
            anchor,
            targets: c,
        });
    }

    fn range(&mut self, a: &mut AstArena, id: StmtId, key: Option<ExprId>, value: Option<ExprId>) {
        let c = classify(a, &[key, value]);
        if c.declare == 0 {
            return;
        }
        if c.reassign > 0 {
            self.error(a.stmts.span(id).start, MIXED_RANGE);
            return;
        }
        if let Stmt::For {
            kind: ForKind::Range { op, .. },
            ..
        } = &mut a.stmts[id]
        {
            *op = Some(AssignOp::Define);
        }
    }
}

impl Visitor for Transformer {
    fn visit_stmt_list(&mut self, a: &mut AstArena, id: StmtListId) {
        let ctx = Ctx {
            list: Some(id),
            ..Ctx::default()
        };
        self.scoped(ctx, a, |v, a| {
            let stmts = a.stmt_lists[id].stmts.clone();
            for s in stmts {
                v.visit_stmt(a, s);
            }
        });
    }

    fn visit_stmt(&mut self, a: &mut AstArena, id: StmtId) {
        let stmt = a.stmts[id];
        match stmt {
            Stmt::Simple(s) => self.simple_stmt(a, s, Some(id)),
            Stmt::Labeled { label, stmt: inner } => {
                let ctx = Ctx {
                    list: self.ctx.list,
                    inner_label: Some(id),
                    outer_label: Some(self.ctx.outer_label.unwrap_or(id)),
                    ..Ctx::default()
                };
                self.scoped(ctx, a, |v, a| {
                    v.visit_ident(a, label);
                    v.visit_stmt(a, inner);
                });
            }
            Stmt::For {
                kind: ForKind::Range { key, value, .. },
                ..
            } => {
                self.range(a, id, key, value);
                let stmt = a.stmts[id];
                self.scoped(Ctx::default(), a, |v, a| stmt.walk(a, v));
            }
            Stmt::If { .. } | Stmt::For { .. } | Stmt::Switch { .. } | Stmt::TypeSwitch { .. } => {
                let ctx = Ctx {
                    init: true,
                    ..Ctx::default()
                };
                self.scoped(ctx, a, |v, a| stmt.walk(a, v));
            }
            _ => self.scoped(Ctx::default(), a, |v, a| stmt.walk(a, v)),
        }
    }

    fn visit_simple_stmt(&mut self, a: &mut AstArena, id: SimpleStmtId) {
        self.simple_stmt(a, id, None);
    }

    fn visit_switch_clause(&mut self, a: &mut AstArena, id: SwitchClauseId) {
        let clause = a.switch_clauses[id];
        let ctx = Ctx {
            list: Some(clause.body),
            ..Ctx::default()
        };
        self.scoped(ctx, a, |v, a| clause.walk(a, v));
    }

    fn visit_comm_clause(&mut self, a: &mut AstArena, id: CommClauseId) {
        let clause = a.comm_clauses[id];
        let ctx = Ctx {
            list: Some(clause.body),
            comm: clause.comm,
            ..Ctx::default()
        };
        self.scoped(ctx, a, |v, a| clause.walk(a, v));
    }

    fn visit_ident(&mut self, a: &mut AstArena, ident: IdentName) {
        if a.name(ident).starts_with(':') {
            self.error(ident.pos.start, UNEXPECTED_MARKER);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Entry;
    use crate::revert::revert;
    use crate::rewrite::rewrite;
    use gocolon_parser::parse_file;

    fn transform(body: &str) -> (AstArena, Transformer) {
        let src = format!("package p\n\nfunc f() {{\n{body}\n}}\n");
        let rw = rewrite(&src).unwrap();
        let mut parsed = parse_file(&rw.text).unwrap();
        revert(&mut parsed.arena, &parsed.file);
        let mut t = Transformer::new();
        t.run(&mut parsed.arena, &parsed.file);
        (parsed.arena, t)
    }

    fn messages(t: &Transformer) -> Vec<&str> {
        t.errors.iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn plain_assignments_are_left_alone() {
        let (_, t) = transform("x = 1\na, b = b, a");
        assert!(t.changes.is_empty());
        assert!(t.errors.is_empty());
    }

    #[test]
    fn records_declarations_and_mixed_assignments() {
        let (_, t) = transform(":x = 1\n:n, err = f()");
        assert_eq!(t.changes.len(), 2);
        assert!(!t.changes[0].targets.is_mixed());
        assert_eq!(t.changes[0].slot, Slot::List);
        assert!(t.changes[1].targets.is_mixed());
        assert!(matches!(t.changes[1].targets.entries[0], Entry::Declare(_)));
    }

    #[test]
    fn header_assignments_become_defines() {
        let (a, t) = transform("if :n, :err = f(); err != nil {\n}");
        assert!(t.changes.is_empty());
        assert!(t.errors.is_empty());
        let defines = a
            .simple_stmts
            .ids()
            .filter(|&id| matches!(a.simple_stmts[id], SimpleStmt::Assign { op: AssignOp::Define, .. }))
            .count();
        assert_eq!(defines, 1);
    }

    #[test]
    fn mixed_headers_and_ranges_are_errors() {
        let (_, t) = transform("if :n, err = f(); err != nil {\n}\nfor :k, v = range m {\n}");
        assert_eq!(messages(&t), [MIXED_INIT, MIXED_RANGE]);
    }

    #[test]
    fn receive_clauses_follow_header_rules() {
        let (_, t) = transform("select {\ncase :v, :ok = <-c:\n\t_ = v\ncase :w, err = <-c:\n}");
        assert_eq!(messages(&t), [MIXED_INIT]);
        assert!(t.changes.is_empty());
    }

    #[test]
    fn labeled_statements_are_replaced_through_the_label() {
        let (_, t) = transform("outer:\ninner:\n\t:x = 1");
        assert_eq!(t.changes.len(), 1);
        let c = &t.changes[0];
        assert!(matches!(c.slot, Slot::Label(l) if l != c.anchor));
    }

    #[test]
    fn misplaced_markers_are_reported() {
        let (_, t) = transform("g(:a, b)");
        assert_eq!(messages(&t), [UNEXPECTED_MARKER]);
    }

    #[test]
    fn markers_on_compound_assignments_are_errors() {
        let (_, t) = transform(":x, y <<= 1, 2");
        assert_eq!(messages(&t), [COMPOUND_MARKER]);
        assert!(t.changes.is_empty());
    }

    #[test]
    fn assignments_outside_a_statement_list_are_errors() {
        let (mut a, _) = transform("x = 1");
        let mut t = Transformer::new();
        let lhs = a.ident_expr(":y", Span::new(0, 2));
        let rhs = a.ident_expr("z", Span::new(5, 6));
        let stmt = a.assign_stmt(lhs, rhs, Span::new(0, 6));
        let Stmt::Simple(id) = a.stmts[stmt] else {
            unreachable!()
        };
        t.simple_stmt(&mut a, id, Some(stmt));
        assert_eq!(messages(&t), [DETACHED_STATEMENT]);
        assert!(t.changes.is_empty());
    }

    #[test]
    fn block_bodies_reset_the_header_context() {
        let (_, t) = transform("if ok {\n\t:n, err = f()\n}");
        assert!(t.errors.is_empty());
        assert_eq!(t.changes.len(), 1);
    }
}
