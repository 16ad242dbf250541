//! # Go syntax tree
//!
//! Arena-allocated tree for Go source files.
//!
//! ## Architecture
//!
//! - **Nodes**: all nodes live in typed arenas (`SpannedArena<T>`) and are
//!   addressed by `Id<T>` handles; nodes themselves are `Copy`.
//! - **Lists**: expression, identifier, field... lists are slices of
//!   centralized buffers (`ListRef<T>`). Buffers are append-only, so a
//!   `ListRef` stays valid while the tree is being rewritten.
//! - **Statement sequences** are the exception: they are owned, growable
//!   containers (`StmtList`, addressed by `StmtListId`) so statements can be
//!   inserted after parsing.
//! - **Spans**: location information lives in side tables next to each arena.
//! - **Symbols**: identifiers are interned.
//!
//! ## Invariants
//!
//! - Every `StmtId` is referenced by at most one container: one `StmtList`
//!   entry, or the `stmt` slot of one `Stmt::Labeled`. Looking a statement up
//!   by identity inside its list is therefore well defined.
//! - Types that appear in expression position (`[]int{...}`, `make(chan T)`,
//!   conversions) are wrapped in `Expr::Type`.

use ast_derive::WalkAst;
use core::marker::PhantomData;
use core::ops::{Index, IndexMut};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher, RandomState};

// =============================================================================
// Core Foundation Types
// =============================================================================

/// Byte range in the parsed buffer.
///
/// Positions are stored as `u32` to save memory, limiting file size to 4GB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Creates a new span from usize positions.
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= u32::MAX as usize);
        debug_assert!(end <= u32::MAX as usize);
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    #[inline]
    pub const fn empty_at(pos: u32) -> Self {
        Self { start: pos, end: pos }
    }

    /// Smallest span covering both `self` and `other`.
    #[inline]
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Type-safe handle for arena-allocated nodes.
#[repr(transparent)]
pub struct Id<T> {
    raw: u32,
    _marker: PhantomData<fn() -> T>,
}

// Manual impls: derives would add `T: Copy`/`T: Eq` bounds.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.raw)
    }
}

impl<T> Id<T> {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn to_usize(&self) -> usize {
        self.raw as usize
    }

    #[inline]
    pub const fn raw(&self) -> u32 {
        self.raw
    }
}

/// Typed reference into a centralized list buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct ListRef<T> {
    start: u32,
    len: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for ListRef<T> {}

impl<T> Clone for ListRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Default for ListRef<T> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<T> ListRef<T> {
    pub const EMPTY: Self = Self {
        start: 0,
        len: 0,
        _marker: PhantomData,
    };

    #[inline]
    pub const fn new(start: u32, len: u32) -> Self {
        Self {
            start,
            len,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn start(&self) -> u32 {
        self.start
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.len
    }

    /// End index (exclusive).
    #[inline]
    pub const fn end(&self) -> u32 {
        self.start + self.len
    }
}

// =============================================================================
// Symbol Interning System
// =============================================================================

/// Interned string symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Symbol(u32);

impl Symbol {
    #[inline]
    pub const fn from_raw(v: u32) -> Self {
        Self(v)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Identifier occurrence (interned symbol + source position).
///
/// Every place an identifier is written uses this type, so the walker can
/// report each occurrence through `Visitor::visit_ident`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentName {
    pub sym: Symbol,
    pub pos: Span,
}

/// Identity hasher for u64 values (used for symbol hash buckets).
#[derive(Default)]
struct U64IdentityHasher(u64);

impl Hasher for U64IdentityHasher {
    fn write(&mut self, _b: &[u8]) {
        unreachable!("U64IdentityHasher only supports write_u64")
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.0 = i;
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
}

type U64IdentityBuild = BuildHasherDefault<U64IdentityHasher>;

/// String interner.
///
/// Symbols are stored once and looked up via hash buckets.
#[derive(Debug, Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    buckets: HashMap<u64, SmallVec<[Symbol; 1]>, U64IdentityBuild>,
    state: RandomState,
}

impl Interner {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    fn hash_str(&self, s: &str) -> u64 {
        self.state.hash_one(s)
    }

    /// Interns a string and returns its symbol.
    #[inline]
    pub fn intern(&mut self, s: &str) -> Symbol {
        let h = self.hash_str(s);
        let entry = self.buckets.entry(h).or_default();

        for &sym in entry.iter() {
            if self.strings[sym.0 as usize].as_ref() == s {
                return sym;
            }
        }

        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(s.into());
        entry.push(sym);
        sym
    }

    /// Resolves a symbol back to its string.
    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        self.strings
            .get(sym.0 as usize)
            .map(AsRef::as_ref)
            .unwrap_or("")
    }

    /// Changes the text of `sym`; every occurrence of the symbol follows.
    pub fn rename(&mut self, sym: Symbol, new: &str) {
        let old_hash = self.hash_str(self.resolve(sym));
        if let Some(bucket) = self.buckets.get_mut(&old_hash) {
            bucket.retain(|s| *s != sym);
        }
        let new_hash = self.hash_str(new);
        self.strings[sym.0 as usize] = new.into();
        self.buckets.entry(new_hash).or_default().push(sym);
    }

    /// All symbols whose text starts with `prefix`.
    pub fn with_prefix(&self, prefix: &str) -> Vec<Symbol> {
        self.strings
            .iter()
            .enumerate()
            .filter(|(_, s)| s.starts_with(prefix))
            .map(|(i, _)| Symbol(i as u32))
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

// =============================================================================
// Arena Allocation
// =============================================================================

/// Arena for nodes with associated spans.
#[derive(Debug)]
pub struct SpannedArena<T> {
    data: Vec<T>,
    spans: Vec<Span>,
}

impl<T> Default for SpannedArena<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            spans: Vec::new(),
        }
    }
}

impl<T> SpannedArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc(&mut self, node: T, span: Span) -> Id<T> {
        let id = Id::from_raw(self.data.len() as u32);
        self.data.push(node);
        self.spans.push(span);
        id
    }

    #[inline]
    pub fn get(&self, id: Id<T>) -> &T {
        &self.data[id.to_usize()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: Id<T>) -> &mut T {
        &mut self.data[id.to_usize()]
    }

    #[inline]
    pub fn span(&self, id: Id<T>) -> Span {
        self.spans[id.to_usize()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Ids in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = Id<T>> {
        (0..self.data.len() as u32).map(Id::from_raw)
    }
}

impl<T> Index<Id<T>> for SpannedArena<T> {
    type Output = T;
    fn index(&self, id: Id<T>) -> &T {
        self.get(id)
    }
}

impl<T> IndexMut<Id<T>> for SpannedArena<T> {
    fn index_mut(&mut self, id: Id<T>) -> &mut T {
        self.get_mut(id)
    }
}

// =============================================================================
// Type Aliases for Node IDs
// =============================================================================

pub type DeclId = Id<GenDecl>;
pub type SpecId = Id<Spec>;
pub type FuncDeclId = Id<FuncDecl>;
pub type StmtId = Id<Stmt>;
pub type StmtListId = Id<StmtList>;
pub type SimpleStmtId = Id<SimpleStmt>;
pub type ExprId = Id<Expr>;
pub type TypeId = Id<Type>;
pub type FieldId = Id<Field>;
pub type SwitchClauseId = Id<SwitchClause>;
pub type CommClauseId = Id<CommClause>;
pub type CommentId = Id<Comment>;

// =============================================================================
// Centralized List Storage
// =============================================================================

#[derive(Debug, Default)]
pub struct ExtraData {
    pub ident_names: Vec<IdentName>,
    pub exprs: Vec<ExprId>,
    pub types: Vec<TypeId>,
    pub fields: Vec<FieldId>,
    pub specs: Vec<SpecId>,
    pub keyed_elems: Vec<KeyedElement>,
    pub top_decls: Vec<TopLevelDecl>,
    pub switch_clause_ids: Vec<SwitchClauseId>,
    pub comm_clause_ids: Vec<CommClauseId>,
    pub type_terms: Vec<TypeTerm>,
    pub comment_ids: Vec<CommentId>,
}

// =============================================================================
// Main AST Arena
// =============================================================================

/// Central arena holding all nodes, list buffers and the symbol table.
#[derive(Debug, Default)]
pub struct AstArena {
    pub decls: SpannedArena<GenDecl>,
    pub specs: SpannedArena<Spec>,
    pub funcs: SpannedArena<FuncDecl>,
    pub stmts: SpannedArena<Stmt>,
    pub stmt_lists: SpannedArena<StmtList>,
    pub simple_stmts: SpannedArena<SimpleStmt>,
    pub exprs: SpannedArena<Expr>,
    pub types: SpannedArena<Type>,
    pub fields: SpannedArena<Field>,
    pub switch_clauses: SpannedArena<SwitchClause>,
    pub comm_clauses: SpannedArena<CommClause>,
    pub comments: SpannedArena<Comment>,
    pub extras: ExtraData,
    pub symbols: Interner,
}

macro_rules! list_builders {
    ($($build:ident / $get:ident : $t:ty => $buf:ident),* $(,)?) => {
        $(
            pub fn $build(&mut self, items: impl IntoIterator<Item = $t>) -> ListRef<$t> {
                Self::push_list(&mut self.extras.$buf, items)
            }

            pub fn $get(&self, r: ListRef<$t>) -> &[$t] {
                Self::slice(&self.extras.$buf, r)
            }
        )*
    };
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn push_list<T>(buf: &mut Vec<T>, items: impl IntoIterator<Item = T>) -> ListRef<T> {
        let start = buf.len();
        buf.extend(items);
        let len = buf.len() - start;
        if len == 0 {
            return ListRef::EMPTY;
        }
        debug_assert!(start <= u32::MAX as usize);
        ListRef::new(start as u32, len as u32)
    }

    #[inline]
    fn slice<T>(buf: &[T], r: ListRef<T>) -> &[T] {
        &buf[r.start() as usize..r.end() as usize]
    }

    list_builders! {
        list_ident_names / ident_names: IdentName => ident_names,
        list_exprs / exprs_list: ExprId => exprs,
        list_types / types_list: TypeId => types,
        list_fields / fields_list: FieldId => fields,
        list_specs / specs_list: SpecId => specs,
        list_keyed_elems / keyed_elems_list: KeyedElement => keyed_elems,
        list_top_decls / top_decls: TopLevelDecl => top_decls,
        list_switch_clause_ids / switch_clause_ids: SwitchClauseId => switch_clause_ids,
        list_comm_clause_ids / comm_clause_ids: CommClauseId => comm_clause_ids,
        list_type_terms / type_terms: TypeTerm => type_terms,
        list_comment_ids / comment_ids: CommentId => comment_ids,
    }

    /// Text of an identifier occurrence.
    #[inline]
    pub fn name(&self, ident: IdentName) -> &str {
        self.symbols.resolve(ident.sym)
    }

    /// Statements of a sequence.
    #[inline]
    pub fn stmt_list(&self, id: StmtListId) -> &[StmtId] {
        &self.stmt_lists[id].stmts
    }

    /// Allocates an identifier expression for `name`.
    pub fn ident_expr(&mut self, name: &str, pos: Span) -> ExprId {
        let sym = self.symbols.intern(name);
        self.exprs.alloc(Expr::Ident(IdentName { sym, pos }), pos)
    }

    /// Allocates `var n1, n2 = v1, v2` as a statement.
    pub fn var_decl_stmt(
        &mut self,
        names: impl IntoIterator<Item = IdentName>,
        values: impl IntoIterator<Item = ExprId>,
        span: Span,
    ) -> StmtId {
        let names = self.list_ident_names(names);
        let values = self.list_exprs(values);
        let spec = self.specs.alloc(
            Spec::Value(ValueSpec {
                names,
                typ: None,
                values,
            }),
            span,
        );
        let specs = self.list_specs([spec]);
        let decl = self.decls.alloc(
            GenDecl {
                kw_pos: Span::empty_at(span.start),
                kind: GenDeclKind::Var,
                l_paren: None,
                specs,
                r_paren: None,
            },
            span,
        );
        self.stmts.alloc(Stmt::Decl(decl), span)
    }

    /// Allocates `lhs = rhs` as a statement.
    pub fn assign_stmt(&mut self, lhs: ExprId, rhs: ExprId, span: Span) -> StmtId {
        let lhs = self.list_exprs([lhs]);
        let rhs = self.list_exprs([rhs]);
        let simple = self.simple_stmts.alloc(
            SimpleStmt::Assign {
                lhs,
                op: AssignOp::Assign,
                op_pos: Span::empty_at(span.start),
                rhs,
            },
            span,
        );
        self.stmts.alloc(Stmt::Simple(simple), span)
    }
}

// =============================================================================
// Comments
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

/// Comment (text is recovered from the buffer via its span).
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct Comment {
    pub kind: CommentKind,
}

// =============================================================================
// Source File (Root Node)
// =============================================================================

/// ```text
/// SourceFile = PackageClause ";" { ImportDecl ";" } { TopLevelDecl ";" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct SourceFile {
    pub package_pos: Span,
    pub name: IdentName,
    /// Imports and other declarations, in source order
    pub decls: ListRef<TopLevelDecl>,
    /// Every comment of the file, in source order
    pub comments: ListRef<CommentId>,
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum TopLevelDecl {
    Decl(DeclId),
    Func(FuncDeclId),
}

/// `import`, `const`, `type` or `var` declaration, single or grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct GenDecl {
    pub kw_pos: Span,
    pub kind: GenDeclKind,
    pub l_paren: Option<Span>,
    pub specs: ListRef<SpecId>,
    pub r_paren: Option<Span>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GenDeclKind {
    Import,
    Const,
    Type,
    Var,
}

impl GenDeclKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            GenDeclKind::Import => "import",
            GenDeclKind::Const => "const",
            GenDeclKind::Type => "type",
            GenDeclKind::Var => "var",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

/// `ImportSpec = [ "." | PackageName ] ImportPath`
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct ImportSpec {
    /// `.`, `_` or an alias
    pub name: Option<IdentName>,
    pub path: BasicLit,
}

/// `IdentifierList [ Type ] [ "=" ExpressionList ]` (const and var).
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct ValueSpec {
    pub names: ListRef<IdentName>,
    pub typ: Option<TypeId>,
    pub values: ListRef<ExprId>,
}

/// `TypeSpec = AliasDecl | TypeDef`
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct TypeSpec {
    pub name: IdentName,
    pub type_params: Option<FieldList>,
    /// True for aliases (`type A = B`)
    pub alias: bool,
    pub typ: TypeId,
}

/// Function or method declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct FuncDecl {
    pub func_pos: Span,
    pub recv: Option<FieldList>,
    pub name: IdentName,
    pub type_params: Option<FieldList>,
    pub sig: Signature,
    /// None for declarations without a body
    pub body: Option<Block>,
}

// =============================================================================
// Signatures and Fields
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct Signature {
    pub params: FieldList,
    pub results: Option<Results>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum Results {
    /// `(x int, err error)` or `(int, error)`
    Params(FieldList),
    /// Single unnamed result: `int`
    Type(TypeId),
}

/// Delimited field list: parameters, type parameters, struct fields or
/// interface elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct FieldList {
    pub open: Span,
    pub fields: ListRef<FieldId>,
    pub close: Span,
}

/// One entry of a `FieldList`.
///
/// Interface methods are fields with one name and a `Type::Func`; embedded
/// fields and interface type elements have no names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct Field {
    pub names: ListRef<IdentName>,
    /// `...` of a variadic parameter
    pub ellipsis: Option<Span>,
    pub typ: TypeId,
    /// Struct tag
    pub tag: Option<BasicLit>,
}

// =============================================================================
// Statements
// =============================================================================

/// Owned statement sequence (block body or clause body).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StmtList {
    pub stmts: Vec<StmtId>,
}

impl StmtList {
    /// Index of `stmt`, compared by identity.
    pub fn position(&self, stmt: StmtId) -> Option<usize> {
        self.stmts.iter().position(|&s| s == stmt)
    }
}

/// `Block = "{" StatementList "}"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub l_brace: Span,
    pub stmts: StmtListId,
    pub r_brace: Span,
}

/// Statement usable in headers: `SimpleStmt = EmptyStmt | ExpressionStmt |
/// SendStmt | IncDecStmt | Assignment | ShortVarDecl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum SimpleStmt {
    Empty,
    Expr(ExprId),
    /// `ch <- v`
    Send { chan: ExprId, value: ExprId },
    /// `x++` / `x--`
    IncDec { expr: ExprId, op: IncDecOp },
    /// `a, b = x, y`, `a += x` or `a, b := x, y`
    Assign {
        lhs: ListRef<ExprId>,
        op: AssignOp,
        op_pos: Span,
        rhs: ListRef<ExprId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum Stmt {
    Simple(SimpleStmtId),
    Decl(DeclId),
    /// `label: stmt`
    Labeled { label: IdentName, stmt: StmtId },
    Go { call: ExprId },
    Defer { call: ExprId },
    Return { results: ListRef<ExprId> },
    /// break, continue, goto, fallthrough
    Branch {
        kind: BranchKind,
        label: Option<IdentName>,
    },
    Block(Block),
    If {
        init: Option<SimpleStmtId>,
        cond: ExprId,
        then_block: Block,
        /// `Stmt::If` or `Stmt::Block`
        else_stmt: Option<StmtId>,
    },
    For { kind: ForKind, block: Block },
    Switch {
        init: Option<SimpleStmtId>,
        tag: Option<ExprId>,
        l_brace: Span,
        clauses: ListRef<SwitchClauseId>,
        r_brace: Span,
    },
    /// `assign` is `x := y.(type)` or the bare `y.(type)` expression
    TypeSwitch {
        init: Option<SimpleStmtId>,
        assign: SimpleStmtId,
        l_brace: Span,
        clauses: ListRef<SwitchClauseId>,
        r_brace: Span,
    },
    Select {
        l_brace: Span,
        clauses: ListRef<CommClauseId>,
        r_brace: Span,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum ForKind {
    /// `for { ... }`
    Infinite,
    /// `for cond { ... }`
    Cond(ExprId),
    /// `for init; cond; post { ... }`
    Clause {
        init: Option<SimpleStmtId>,
        cond: Option<ExprId>,
        post: Option<SimpleStmtId>,
    },
    /// `for k, v := range x { ... }`; `op` is None for `for range x`
    Range {
        key: Option<ExprId>,
        value: Option<ExprId>,
        op: Option<AssignOp>,
        expr: ExprId,
    },
}

/// `case x, y:` / `default:` of an expression or type switch.
///
/// Type switch items are `Expr::Type` (or the `nil` identifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct SwitchClause {
    /// Empty for `default`
    pub items: ListRef<ExprId>,
    pub is_default: bool,
    pub colon_pos: Span,
    pub body: StmtListId,
}

/// `case <comm>:` / `default:` of a select statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct CommClause {
    /// Send, receive expression or receive assignment; None for `default`
    pub comm: Option<SimpleStmtId>,
    pub colon_pos: Span,
    pub body: StmtListId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

impl BranchKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            BranchKind::Break => "break",
            BranchKind::Continue => "continue",
            BranchKind::Goto => "goto",
            BranchKind::Fallthrough => "fallthrough",
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

/// `KeyedElement = [ Key ":" ] Element`
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct KeyedElement {
    pub key: Option<ExprId>,
    pub value: ExprId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum Expr {
    Ident(IdentName),
    BasicLit(BasicLit),
    /// `func(x int) int { return x }`
    FuncLit { sig: Signature, body: Block },
    /// `T{...}`; `typ` is None for elided inner literals
    CompositeLit {
        typ: Option<ExprId>,
        l_brace: Span,
        elems: ListRef<KeyedElement>,
        r_brace: Span,
    },
    Paren { expr: ExprId },
    /// `x.sel`
    Selector { expr: ExprId, sel: IdentName },
    /// `a[i]` or generic instantiation `F[T1, T2]`
    Index { expr: ExprId, indices: ListRef<ExprId> },
    /// `a[lo:hi]` or `a[lo:hi:max]`
    Slice {
        expr: ExprId,
        lo: Option<ExprId>,
        hi: Option<ExprId>,
        max: Option<ExprId>,
        slice3: bool,
    },
    /// `x.(T)`; `typ` is None for `x.(type)`
    TypeAssert { expr: ExprId, typ: Option<TypeId> },
    /// Call or conversion
    Call {
        fun: ExprId,
        l_paren: Span,
        args: ListRef<ExprId>,
        ellipsis: Option<Span>,
        r_paren: Span,
    },
    Unary { op: UnaryOp, expr: ExprId },
    Binary {
        left: ExprId,
        op: BinaryOp,
        op_pos: Span,
        right: ExprId,
    },
    /// Type in expression position
    Type(TypeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicLit {
    pub kind: BasicLitKind,
    pub raw: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BasicLitKind {
    Int,
    Float,
    Imag,
    Rune,
    String,
}

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum Type {
    /// `Name`, `pkg.Name`, `Name[T]`
    Named {
        pkg: Option<IdentName>,
        name: IdentName,
        args: ListRef<TypeId>,
    },
    /// `*T`
    Pointer { elem: TypeId },
    /// `[N]T`; `len` is None for `[...]T`
    Array { len: Option<ExprId>, elem: TypeId },
    /// `[]T`
    Slice { elem: TypeId },
    /// `map[K]V`
    Map { key: TypeId, val: TypeId },
    Chan { dir: ChanDir, elem: TypeId },
    Struct { fields: FieldList },
    Interface { elems: FieldList },
    Func { sig: Signature },
    Paren { typ: TypeId },
    /// Constraint union `~int | string`
    Union { terms: ListRef<TypeTerm> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

/// `~T` or `T` inside a union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct TypeTerm {
    pub tilde: bool,
    pub typ: TypeId,
}

// =============================================================================
// Operators
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Add,   // +
    Sub,   // -
    Not,   // !
    Xor,   // ^
    Deref, // *
    Addr,  // &
    Recv,  // <-
    Tilde, // ~
}

impl UnaryOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Add => "+",
            UnaryOp::Sub => "-",
            UnaryOp::Not => "!",
            UnaryOp::Xor => "^",
            UnaryOp::Deref => "*",
            UnaryOp::Addr => "&",
            UnaryOp::Recv => "<-",
            UnaryOp::Tilde => "~",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,    // +
    Sub,    // -
    Mul,    // *
    Div,    // /
    Mod,    // %
    And,    // &
    Or,     // |
    Xor,    // ^
    Shl,    // <<
    Shr,    // >>
    AndNot, // &^
    LAnd,   // &&
    LOr,    // ||
    Eq,     // ==
    Ne,     // !=
    Lt,     // <
    Le,     // <=
    Gt,     // >
    Ge,     // >=
}

impl BinaryOp {
    /// Go operator precedence (5 binds tightest).
    pub const fn precedence(self) -> u8 {
        match self {
            BinaryOp::LOr => 1,
            BinaryOp::LAnd => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Or | BinaryOp::Xor => 4,
            BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Mod
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::And
            | BinaryOp::AndNot => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::AndNot => "&^",
            BinaryOp::LAnd => "&&",
            BinaryOp::LOr => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,       // =
    Define,       // :=
    AddAssign,    // +=
    SubAssign,    // -=
    MulAssign,    // *=
    DivAssign,    // /=
    ModAssign,    // %=
    AndAssign,    // &=
    OrAssign,     // |=
    XorAssign,    // ^=
    ShlAssign,    // <<=
    ShrAssign,    // >>=
    AndNotAssign, // &^=
}

impl AssignOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Define => ":=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
            AssignOp::AndAssign => "&=",
            AssignOp::OrAssign => "|=",
            AssignOp::XorAssign => "^=",
            AssignOp::ShlAssign => "<<=",
            AssignOp::ShrAssign => ">>=",
            AssignOp::AndNotAssign => "&^=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncDecOp {
    Inc, // ++
    Dec, // --
}
