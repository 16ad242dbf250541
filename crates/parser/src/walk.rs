//! Mutable tree walking.
//!
//! Nodes are `Copy`: every default `visit_*` copies the node out of its arena
//! before walking it, so visitors may rewrite the arena (node contents,
//! statement lists, symbols) while the walk is in progress.

use crate::ast::*;

// Core traits
pub trait Walk {
    fn walk<V: Visitor + ?Sized>(&self, a: &mut AstArena, v: &mut V);
}

pub trait Visitor {
    #[inline(always)]
    fn visit_source_file(&mut self, a: &mut AstArena, f: &SourceFile) {
        f.walk(a, self);
    }

    #[inline(always)]
    fn visit_decl(&mut self, a: &mut AstArena, id: DeclId) {
        let d = a.decls[id];
        d.walk(a, self);
    }

    #[inline(always)]
    fn visit_spec(&mut self, a: &mut AstArena, id: SpecId) {
        let s = a.specs[id];
        s.walk(a, self);
    }

    #[inline(always)]
    fn visit_func_decl(&mut self, a: &mut AstArena, id: FuncDeclId) {
        let f = a.funcs[id];
        f.walk(a, self);
    }

    /// Statement sequence of a block or clause. The default walks a snapshot
    /// of the sequence taken before any child is visited.
    #[inline(always)]
    fn visit_stmt_list(&mut self, a: &mut AstArena, id: StmtListId) {
        let stmts = a.stmt_lists[id].stmts.clone();
        for s in stmts {
            self.visit_stmt(a, s);
        }
    }

    #[inline(always)]
    fn visit_stmt(&mut self, a: &mut AstArena, id: StmtId) {
        let s = a.stmts[id];
        s.walk(a, self);
    }

    #[inline(always)]
    fn visit_simple_stmt(&mut self, a: &mut AstArena, id: SimpleStmtId) {
        let s = a.simple_stmts[id];
        s.walk(a, self);
    }

    #[inline(always)]
    fn visit_expr(&mut self, a: &mut AstArena, id: ExprId) {
        let e = a.exprs[id];
        e.walk(a, self);
    }

    #[inline(always)]
    fn visit_type(&mut self, a: &mut AstArena, id: TypeId) {
        let t = a.types[id];
        t.walk(a, self);
    }

    #[inline(always)]
    fn visit_field(&mut self, a: &mut AstArena, id: FieldId) {
        let f = a.fields[id];
        f.walk(a, self);
    }

    #[inline(always)]
    fn visit_switch_clause(&mut self, a: &mut AstArena, id: SwitchClauseId) {
        let c = a.switch_clauses[id];
        c.walk(a, self);
    }

    #[inline(always)]
    fn visit_comm_clause(&mut self, a: &mut AstArena, id: CommClauseId) {
        let c = a.comm_clauses[id];
        c.walk(a, self);
    }

    #[inline(always)]
    fn visit_comment(&mut self, _a: &mut AstArena, _id: CommentId) {}

    /// Every written identifier: names, labels, selectors, type names.
    #[inline(always)]
    fn visit_ident(&mut self, _a: &mut AstArena, _ident: IdentName) {}
}

macro_rules! impl_walk_for_ids {
    ($($id:ty => $visit:ident),* $(,)?) => {
        $(
            impl Walk for $id {
                #[inline(always)]
                fn walk<V: Visitor + ?Sized>(&self, a: &mut AstArena, v: &mut V) {
                    v.$visit(a, *self);
                }
            }
        )*
    };
}

impl_walk_for_ids! {
    DeclId => visit_decl,
    SpecId => visit_spec,
    FuncDeclId => visit_func_decl,
    StmtListId => visit_stmt_list,
    StmtId => visit_stmt,
    SimpleStmtId => visit_simple_stmt,
    ExprId => visit_expr,
    TypeId => visit_type,
    FieldId => visit_field,
    SwitchClauseId => visit_switch_clause,
    CommClauseId => visit_comm_clause,
    CommentId => visit_comment,
    IdentName => visit_ident,
}

pub trait ListSlice<T> {
    fn slice(&self, r: ListRef<T>) -> &[T];
}

impl<T> Walk for ListRef<T>
where
    AstArena: ListSlice<T>,
    T: Walk + Copy,
{
    #[inline(always)]
    fn walk<V: Visitor + ?Sized>(&self, a: &mut AstArena, v: &mut V) {
        // Buffers are append-only, so indexing stays valid while `v` allocates.
        for i in 0..self.len() as usize {
            let item = a.slice(*self)[i];
            item.walk(a, v);
        }
    }
}

macro_rules! impl_list_slice {
    ($($t:ty => $getter:ident),* $(,)?) => {
        $(
            impl ListSlice<$t> for AstArena {
                #[inline(always)]
                fn slice(&self, r: ListRef<$t>) -> &[$t] {
                    self.$getter(r)
                }
            }
        )*
    };
}

impl_list_slice! {
    IdentName => ident_names,
    ExprId => exprs_list,
    TypeId => types_list,
    FieldId => fields_list,
    SpecId => specs_list,
    KeyedElement => keyed_elems_list,
    TopLevelDecl => top_decls,
    SwitchClauseId => switch_clause_ids,
    CommClauseId => comm_clause_ids,
    TypeTerm => type_terms,
    CommentId => comment_ids,
}

// Utilities
impl<T: Walk> Walk for Option<T> {
    #[inline(always)]
    fn walk<V: Visitor + ?Sized>(&self, a: &mut AstArena, v: &mut V) {
        if let Some(x) = self {
            x.walk(a, v);
        }
    }
}

impl Walk for Block {
    #[inline(always)]
    fn walk<V: Visitor + ?Sized>(&self, a: &mut AstArena, v: &mut V) {
        v.visit_stmt_list(a, self.stmts);
    }
}

// Leaves
macro_rules! impl_walk_noop {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Walk for $ty {
                #[inline(always)]
                fn walk<V: Visitor + ?Sized>(&self, _: &mut AstArena, _: &mut V) {}
            }
        )*
    };
}

impl_walk_noop! {
    Span,
    bool,
    BasicLit,
    GenDeclKind,
    CommentKind,
    BranchKind,
    ChanDir,
    UnaryOp,
    BinaryOp,
    AssignOp,
    IncDecOp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Names(Vec<String>);

    impl Visitor for Names {
        fn visit_ident(&mut self, a: &mut AstArena, ident: IdentName) {
            self.0.push(a.name(ident).to_string());
        }
    }

    #[test]
    fn walks_identifiers_in_source_order() {
        let mut a = AstArena::new();
        let x = a.ident_expr("x", Span::new(0, 1));
        let y = a.ident_expr("y", Span::new(4, 5));
        let stmt = a.assign_stmt(x, y, Span::new(0, 5));
        let list = a.stmt_lists.alloc(StmtList { stmts: vec![stmt] }, Span::new(0, 5));

        let mut names = Names::default();
        names.visit_stmt_list(&mut a, list);
        assert_eq!(names.0, ["x", "y"]);
    }

    struct Rename;

    impl Visitor for Rename {
        fn visit_expr(&mut self, a: &mut AstArena, id: ExprId) {
            if let Expr::Ident(name) = a.exprs[id] {
                let sym = a.symbols.intern("renamed");
                a.exprs[id] = Expr::Ident(IdentName { sym, ..name });
            }
            let e = a.exprs[id];
            e.walk(a, self);
        }
    }

    #[test]
    fn visitors_may_rewrite_nodes_in_place() {
        let mut a = AstArena::new();
        let x = a.ident_expr("x", Span::new(0, 1));
        let one = a.ident_expr("one", Span::new(4, 7));
        let stmt = a.var_decl_stmt([], [x, one], Span::new(0, 7));
        Rename.visit_stmt(&mut a, stmt);
        assert!(matches!(a.exprs[x], Expr::Ident(n) if a.name(n) == "renamed"));
        assert!(matches!(a.exprs[one], Expr::Ident(n) if a.name(n) == "renamed"));
    }
}
