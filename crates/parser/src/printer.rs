//! gofmt-style printer.
//!
//! Output is produced in two passes: the tree is written with tab
//! indentation and `\x0b` cell separators, then [`align`] turns separators
//! into space padding. Line breaks and single blank lines between
//! statements, declarations and list elements follow the source positions
//! recorded in the arena. Comments are interleaved by position.

use crate::align::{self, CELL_SEP};
use crate::ast::*;
use crate::error::LineIndex;

const HIGHEST_PREC: u8 = 7;
const UNARY_PREC: u8 = 6;
const MAX_ONE_LINE_BODY: u32 = 100;
const MAX_ONE_LINE_FIELD: u32 = 30;

/// Prints `file` as canonically formatted Go source.
///
/// `src` is the buffer the tree was parsed from; literal and comment text is
/// taken from it.
pub fn print_file(a: &AstArena, file: &SourceFile, src: &str) -> String {
    let mut p = Printer::new(a, file, src);
    p.source_file(file);
    align::align(&p.finish())
}

#[derive(Clone, Copy)]
enum Item {
    Expr(ExprId),
    Elem(KeyedElement),
    Field(FieldId),
}

struct Printer<'a> {
    a: &'a AstArena,
    src: &'a str,
    lines: LineIndex,
    comments: &'a [CommentId],
    next_comment: usize,
    out: String,
    indent: usize,
    at_line_start: bool,
    pending_newline: bool,
    /// Source line of the last printed item
    last_line: u32,
}

impl<'a> Printer<'a> {
    fn new(a: &'a AstArena, file: &SourceFile, src: &'a str) -> Self {
        Self {
            a,
            src,
            lines: LineIndex::new(src),
            comments: a.comment_ids(file.comments),
            next_comment: 0,
            out: String::with_capacity(src.len() + src.len() / 8),
            indent: 0,
            at_line_start: true,
            pending_newline: false,
            last_line: 0,
        }
    }

    fn finish(mut self) -> String {
        self.flush_comments(u32::MAX, 1);
        let len = self.out.trim_end_matches('\n').len();
        self.out.truncate(len);
        self.out.push('\n');
        self.out
    }

    // =========================================================================
    // Output primitives
    // =========================================================================

    #[inline]
    fn line(&self, pos: u32) -> u32 {
        self.lines.line_of(pos)
    }

    fn write(&mut self, s: &str) {
        if self.pending_newline {
            self.newline();
        }
        if self.at_line_start {
            for _ in 0..self.indent {
                self.out.push('\t');
            }
            self.at_line_start = false;
        }
        self.out.push_str(s);
    }

    /// Writes an operator, separating it from a previous operator it would
    /// otherwise merge with (`- -x`, `a < <-c`).
    fn token(&mut self, s: &str) {
        if !self.at_line_start && !self.pending_newline {
            if let (Some(&prev), Some(&next)) = (self.out.as_bytes().last(), s.as_bytes().first()) {
                if may_combine(prev, next) {
                    self.out.push(' ');
                }
            }
        }
        self.write(s);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
        self.pending_newline = false;
    }

    /// Breaks the line before an item starting on source line `line`: at
    /// least `min` newlines, at most one blank line.
    fn linebreak(&mut self, line: u32, min: u32) {
        if self.out.is_empty() {
            self.pending_newline = false;
            return;
        }
        let n = line.saturating_sub(self.last_line).clamp(min, 2);
        for _ in 0..n {
            self.newline();
        }
    }

    /// Starts an item on its own line, printing the comments before it.
    fn line_item(&mut self, start: u32, min: u32) {
        let min = self.flush_comments(start, min);
        let line = self.line(start);
        self.linebreak(line, min);
    }

    /// Prints every pending comment starting before `before`. Returns the
    /// line-break minimum left for the next item.
    fn flush_comments(&mut self, before: u32, mut min: u32) -> u32 {
        let a = self.a;
        let src = self.src;
        while let Some(&id) = self.comments.get(self.next_comment) {
            let span = a.comments.span(id);
            if span.start >= before {
                break;
            }
            self.next_comment += 1;

            let text = &src[span.start as usize..span.end as usize];
            let line = self.line(span.start);
            if !self.out.is_empty() && !self.at_line_start && !self.pending_newline && line == self.last_line {
                if self.out.ends_with('{') || self.out.ends_with('(') {
                    self.out.push(' ');
                } else {
                    self.out.push(CELL_SEP);
                }
                self.out.push_str(text);
            } else {
                self.linebreak(line, min);
                min = 1;
                self.write(text);
            }
            self.last_line = self.line(span.end);
            if a.comments[id].kind == CommentKind::Line {
                self.pending_newline = true;
            }
        }
        min
    }

    fn has_comment_in(&self, start: u32, end: u32) -> bool {
        self.comments[self.next_comment..]
            .iter()
            .map(|&id| self.a.comments.span(id))
            .take_while(|s| s.start < end)
            .any(|s| s.start >= start)
    }

    fn has_trailing_comment(&self, end: u32) -> bool {
        self.comments
            .get(self.next_comment)
            .map(|&id| self.a.comments.span(id))
            .is_some_and(|s| s.start >= end && self.line(s.start) == self.line(end))
    }

    /// A comment group ends on the line right before `start`, on its own line.
    fn has_doc(&self, start: u32) -> bool {
        let line = self.line(start);
        self.comments[self.next_comment..]
            .iter()
            .map(|&id| self.a.comments.span(id))
            .take_while(|s| s.start < start)
            .last()
            .is_some_and(|s| self.line(s.end) + 1 == line && self.line(s.start) > self.last_line)
    }

    fn ident(&mut self, n: IdentName) {
        let a = self.a;
        self.write(a.name(n));
    }

    fn lit(&mut self, l: BasicLit) {
        let src = self.src;
        self.write(&src[l.raw.start as usize..l.raw.end as usize]);
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn source_file(&mut self, f: &SourceFile) {
        self.line_item(f.package_pos.start, 1);
        self.write("package ");
        self.ident(f.name);
        self.last_line = self.line(f.name.pos.end);

        let a = self.a;
        // None: func; Some(kind): gen decl
        let mut prev: Option<Option<GenDeclKind>> = None;
        for &d in a.top_decls(f.decls) {
            let (tok, span) = match d {
                TopLevelDecl::Decl(id) => (Some(a.decls[id].kind), a.decls.span(id)),
                TopLevelDecl::Func(id) => (None, a.funcs.span(id)),
            };
            let min = if prev != Some(tok) || self.has_doc(span.start) { 2 } else { 1 };
            self.line_item(span.start, min);
            match d {
                TopLevelDecl::Decl(id) => self.gen_decl(id),
                TopLevelDecl::Func(id) => self.func_decl(id),
            }
            self.last_line = self.line(span.end);
            prev = Some(tok);
        }
    }

    fn gen_decl(&mut self, id: DeclId) {
        let a = self.a;
        let d = a.decls[id];
        self.write(d.kind.keyword());
        let specs = a.specs_list(d.specs);

        let (Some(l_paren), Some(r_paren)) = (d.l_paren, d.r_paren) else {
            if let Some(&s) = specs.first() {
                self.write(" ");
                self.spec(s, false, false);
            }
            return;
        };

        self.write(" (");
        self.last_line = self.line(l_paren.start);
        let grouped = specs.len() > 1;
        let keep_type = if grouped && d.kind != GenDeclKind::Type {
            keep_type_column(a, specs)
        } else {
            vec![false; specs.len()]
        };

        self.indent += 1;
        for (i, &s) in specs.iter().enumerate() {
            let span = a.specs.span(s);
            self.line_item(span.start, 1);
            self.spec(s, grouped, keep_type[i]);
            self.last_line = self.line(span.end);
        }
        let printed_comments = self.has_comment_in(l_paren.start, r_paren.start);
        self.flush_comments(r_paren.start, 1);
        self.indent -= 1;
        if !specs.is_empty() || printed_comments {
            self.linebreak(self.line(r_paren.start), 1);
        }
        self.write(")");
        self.last_line = self.line(r_paren.start);
    }

    fn spec(&mut self, id: SpecId, grouped: bool, keep_type: bool) {
        let a = self.a;
        let sep = if grouped { "\x0b" } else { " " };
        match a.specs[id] {
            Spec::Import(s) => {
                if let Some(name) = s.name {
                    self.ident(name);
                    self.write(" ");
                }
                self.lit(s.path);
            }
            Spec::Value(v) => {
                self.ident_list(v.names);
                if v.typ.is_some() || keep_type {
                    self.write(sep);
                }
                if let Some(t) = v.typ {
                    self.typ(t);
                }
                if !v.values.is_empty() {
                    self.write(sep);
                    self.write("= ");
                    self.expr_list(v.values, 1);
                }
            }
            Spec::Type(t) => {
                self.ident(t.name);
                if let Some(tp) = t.type_params {
                    self.params(tp);
                }
                self.write(sep);
                if t.alias {
                    self.write("= ");
                }
                self.typ(t.typ);
            }
        }
    }

    fn ident_list(&mut self, names: ListRef<IdentName>) {
        let a = self.a;
        for (i, &n) in a.ident_names(names).iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.ident(n);
        }
    }

    fn func_decl(&mut self, id: FuncDeclId) {
        let f = self.a.funcs[id];
        self.write("func ");
        if let Some(recv) = f.recv {
            self.params(recv);
            self.write(" ");
        }
        self.ident(f.name);
        if let Some(tp) = f.type_params {
            self.params(tp);
        }
        self.signature(f.sig);
        if let Some(body) = f.body {
            self.func_body(f.func_pos.start, body, "\x0b");
        }
    }

    /// Function bodies written on one source line stay on one line when
    /// they are short and hold only simple statements.
    fn func_body(&mut self, header_start: u32, b: Block, sep: &str) {
        let a = self.a;
        let stmts: Vec<StmtId> = a
            .stmt_list(b.stmts)
            .iter()
            .copied()
            .filter(|&s| !is_empty_stmt(a, s))
            .collect();

        if self.fits_one_line(header_start, b, &stmts) {
            self.write(sep);
            self.write("{");
            if !stmts.is_empty() {
                self.write(" ");
                for (i, &s) in stmts.iter().enumerate() {
                    if i > 0 {
                        self.write("; ");
                    }
                    self.stmt(s);
                }
                self.write(" ");
            }
            self.write("}");
            self.last_line = self.line(b.r_brace.start);
            return;
        }

        self.write(" ");
        self.block(b);
    }

    fn fits_one_line(&self, header_start: u32, b: Block, stmts: &[StmtId]) -> bool {
        if self.line(b.l_brace.start) != self.line(b.r_brace.start) || stmts.len() > 5 {
            return false;
        }
        if self.has_comment_in(b.l_brace.start, b.r_brace.end) {
            return false;
        }
        let mut size = b.l_brace.start.saturating_sub(header_start);
        for (i, &s) in stmts.iter().enumerate() {
            if !is_simple_line(self.a, s) {
                return false;
            }
            if i > 0 {
                size += 2;
            }
            size += self.a.stmts.span(s).len();
        }
        size <= MAX_ONE_LINE_BODY
    }

    // =========================================================================
    // Signatures and fields
    // =========================================================================

    fn signature(&mut self, sig: Signature) {
        self.params(sig.params);
        match sig.results {
            None => {}
            Some(Results::Type(t)) => {
                self.write(" ");
                self.typ(t);
            }
            Some(Results::Params(fl)) => {
                let a = self.a;
                let fields = a.fields_list(fl.fields);
                match fields {
                    [] => {}
                    [f] if a.fields[*f].names.is_empty() => {
                        self.write(" ");
                        let mut t = a.fields[*f].typ;
                        while let Type::Paren { typ } = a.types[t] {
                            t = typ;
                        }
                        self.typ(t);
                    }
                    _ => {
                        self.write(" ");
                        self.params(fl);
                    }
                }
            }
        }
    }

    fn params(&mut self, fl: FieldList) {
        let a = self.a;
        let (open, close) = if self.src.as_bytes().get(fl.open.start as usize) == Some(&b'[') {
            ("[", "]")
        } else {
            ("(", ")")
        };
        let items: Vec<Item> = a.fields_list(fl.fields).iter().map(|&f| Item::Field(f)).collect();
        self.delimited(open, fl.open, &items, false, fl.close, close, 1);
    }

    fn param_field(&mut self, id: FieldId) {
        let f = self.a.fields[id];
        if !f.names.is_empty() {
            self.ident_list(f.names);
            self.write(" ");
        }
        if f.ellipsis.is_some() {
            self.write("...");
        }
        self.typ(f.typ);
    }

    /// Struct fields or interface elements.
    fn field_list(&mut self, fl: FieldList, is_struct: bool) {
        let a = self.a;
        let fields = a.fields_list(fl.fields);
        let one_line_src = self.line(fl.open.start) == self.line(fl.close.start);
        if one_line_src && !self.has_comment_in(fl.open.start, fl.close.end) {
            match fields {
                [] => {
                    self.write("{}");
                    return;
                }
                [f] if self.is_one_line_field(*f) => {
                    self.write("{ ");
                    self.field(*f, is_struct, " ");
                    self.write(" }");
                    return;
                }
                _ => {}
            }
        }

        self.write(" {");
        self.last_line = self.line(fl.open.start);
        self.indent += 1;
        for &f in fields {
            let span = a.fields.span(f);
            self.line_item(span.start, 1);
            self.field(f, is_struct, "\x0b");
            self.last_line = self.line(span.end);
        }
        self.flush_comments(fl.close.start, 1);
        self.indent -= 1;
        self.linebreak(self.line(fl.close.start), 1);
        self.write("}");
        self.last_line = self.line(fl.close.start);
    }

    fn is_one_line_field(&self, id: FieldId) -> bool {
        let f = self.a.fields[id];
        f.tag.is_none() && self.a.fields.span(id).len() <= MAX_ONE_LINE_FIELD
    }

    fn field(&mut self, id: FieldId, is_struct: bool, sep: &str) {
        let a = self.a;
        let f = a.fields[id];
        let names = a.ident_names(f.names);
        if !is_struct {
            match (names.first(), a.types[f.typ]) {
                (Some(&name), Type::Func { sig }) => {
                    self.ident(name);
                    self.signature(sig);
                }
                _ => self.typ(f.typ),
            }
            return;
        }
        if !names.is_empty() {
            self.ident_list(f.names);
            self.write(sep);
        }
        self.typ(f.typ);
        if let Some(tag) = f.tag {
            self.write(sep);
            self.lit(tag);
        } else if names.is_empty() && sep == "\x0b" && self.has_trailing_comment(a.fields.span(id).end) {
            // Embedded fields skip the type column.
            self.write(sep);
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn typ(&mut self, id: TypeId) {
        let a = self.a;
        match a.types[id] {
            Type::Named { pkg, name, args } => {
                if let Some(pkg) = pkg {
                    self.ident(pkg);
                    self.write(".");
                }
                self.ident(name);
                if !args.is_empty() {
                    self.write("[");
                    for (i, &t) in a.types_list(args).iter().enumerate() {
                        if i > 0 {
                            self.write(", ");
                        }
                        self.typ(t);
                    }
                    self.write("]");
                }
            }
            Type::Pointer { elem } => {
                self.write("*");
                self.typ(elem);
            }
            Type::Array { len, elem } => {
                self.write("[");
                match len {
                    Some(len) => self.expr(len),
                    None => self.write("..."),
                }
                self.write("]");
                self.typ(elem);
            }
            Type::Slice { elem } => {
                self.write("[]");
                self.typ(elem);
            }
            Type::Map { key, val } => {
                self.write("map[");
                self.typ(key);
                self.write("]");
                self.typ(val);
            }
            Type::Chan { dir, elem } => {
                self.write(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.typ(elem);
            }
            Type::Struct { fields } => {
                self.write("struct");
                self.field_list(fields, true);
            }
            Type::Interface { elems } => {
                self.write("interface");
                self.field_list(elems, false);
            }
            Type::Func { sig } => {
                self.write("func");
                self.signature(sig);
            }
            Type::Paren { typ } => {
                self.write("(");
                self.typ(typ);
                self.write(")");
            }
            Type::Union { terms } => {
                for (i, term) in a.type_terms(terms).iter().enumerate() {
                    if i > 0 {
                        self.write(" | ");
                    }
                    if term.tilde {
                        self.write("~");
                    }
                    self.typ(term.typ);
                }
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn block(&mut self, b: Block) {
        self.write("{");
        self.last_line = self.line(b.l_brace.start);
        self.indent += 1;
        self.stmts(b.stmts);
        self.flush_comments(b.r_brace.start, 1);
        self.indent -= 1;
        self.linebreak(self.line(b.r_brace.start), 1);
        self.write("}");
        self.last_line = self.line(b.r_brace.start);
    }

    fn stmts(&mut self, list: StmtListId) {
        let a = self.a;
        for &s in a.stmt_list(list) {
            if is_empty_stmt(a, s) {
                continue;
            }
            let span = a.stmts.span(s);
            self.line_item(span.start, 1);
            self.stmt(s);
            self.last_line = self.line(span.end);
        }
    }

    fn stmt(&mut self, id: StmtId) {
        let a = self.a;
        match a.stmts[id] {
            Stmt::Simple(s) => self.simple_stmt(s),
            Stmt::Decl(d) => self.gen_decl(d),
            Stmt::Labeled { label, stmt } => {
                let dedent = self.at_line_start && self.indent > 0;
                if dedent {
                    self.indent -= 1;
                }
                self.ident(label);
                self.write(":");
                if dedent {
                    self.indent += 1;
                }
                if is_empty_stmt(a, stmt) {
                    return;
                }
                self.last_line = self.line(label.pos.end);
                self.line_item(a.stmts.span(stmt).start, 1);
                self.stmt(stmt);
            }
            Stmt::Go { call } => {
                self.write("go ");
                self.expr(call);
            }
            Stmt::Defer { call } => {
                self.write("defer ");
                self.expr(call);
            }
            Stmt::Return { results } => {
                self.write("return");
                if !results.is_empty() {
                    self.write(" ");
                    self.expr_list(results, 1);
                }
            }
            Stmt::Branch { kind, label } => {
                self.write(kind.keyword());
                if let Some(label) = label {
                    self.write(" ");
                    self.ident(label);
                }
            }
            Stmt::Block(b) => self.block(b),
            Stmt::If {
                init,
                cond,
                then_block,
                else_stmt,
            } => {
                self.write("if");
                self.control_clause(false, init, Some(cond), None);
                self.block(then_block);
                if let Some(e) = else_stmt {
                    self.write(" else ");
                    self.stmt(e);
                }
            }
            Stmt::For { kind, block } => {
                if !matches!(kind, ForKind::Range { .. }) {
                    self.write("for");
                }
                match kind {
                    ForKind::Infinite => self.control_clause(true, None, None, None),
                    ForKind::Cond(c) => self.control_clause(true, None, Some(c), None),
                    ForKind::Clause { init, cond, post } => {
                        self.control_clause(true, init, cond, post)
                    }
                    ForKind::Range {
                        key,
                        value,
                        op,
                        expr,
                    } => {
                        self.write("for ");
                        if let Some(key) = key {
                            self.expr(key);
                            if let Some(value) = value {
                                self.write(", ");
                                self.expr(value);
                            }
                            self.write(" ");
                            self.write(op.unwrap_or(AssignOp::Define).as_str());
                            self.write(" ");
                        }
                        self.write("range ");
                        self.expr(strip_parens(a, expr));
                        self.write(" ");
                    }
                }
                self.block(block);
            }
            Stmt::Switch {
                init,
                tag,
                l_brace,
                clauses,
                r_brace,
            } => {
                self.write("switch");
                self.control_clause(false, init, tag, None);
                self.switch_body(l_brace, clauses, r_brace);
            }
            Stmt::TypeSwitch {
                init,
                assign,
                l_brace,
                clauses,
                r_brace,
            } => {
                self.write("switch");
                if let Some(init) = init {
                    self.write(" ");
                    self.simple_stmt(init);
                    self.write(";");
                }
                self.write(" ");
                self.simple_stmt(assign);
                self.write(" ");
                self.switch_body(l_brace, clauses, r_brace);
            }
            Stmt::Select {
                l_brace,
                clauses,
                r_brace,
            } => {
                self.write("select ");
                if clauses.is_empty() && !self.has_comment_in(l_brace.start, r_brace.start) {
                    self.write("{}");
                    return;
                }
                self.write("{");
                self.last_line = self.line(l_brace.start);
                for &c in a.comm_clause_ids(clauses) {
                    let clause = a.comm_clauses[c];
                    let span = a.comm_clauses.span(c);
                    self.line_item(span.start, 1);
                    match clause.comm {
                        Some(comm) => {
                            self.write("case ");
                            self.simple_stmt(comm);
                        }
                        None => self.write("default"),
                    }
                    self.write(":");
                    self.clause_body(clause.colon_pos, clause.body);
                    self.last_line = self.line(span.end);
                }
                self.close_brace(r_brace);
            }
        }
    }

    fn simple_stmt(&mut self, id: SimpleStmtId) {
        let a = self.a;
        match a.simple_stmts[id] {
            SimpleStmt::Empty => {}
            SimpleStmt::Expr(e) => self.expr(e),
            SimpleStmt::Send { chan, value } => {
                self.expr(chan);
                self.write(" <- ");
                self.expr(value);
            }
            SimpleStmt::IncDec { expr, op } => {
                self.expr0(expr, 2);
                self.write(match op {
                    IncDecOp::Inc => "++",
                    IncDecOp::Dec => "--",
                });
            }
            SimpleStmt::Assign { lhs, op, rhs, .. } => {
                let depth = if lhs.len() > 1 && rhs.len() > 1 { 2 } else { 1 };
                self.expr_list(lhs, depth);
                self.write(" ");
                self.write(op.as_str());
                self.write(" ");
                self.expr_list(rhs, depth);
            }
        }
    }

    fn control_clause(
        &mut self,
        is_for: bool,
        init: Option<SimpleStmtId>,
        cond: Option<ExprId>,
        post: Option<SimpleStmtId>,
    ) {
        let a = self.a;
        self.write(" ");
        let mut needs_blank = false;
        if init.is_none() && post.is_none() {
            if let Some(c) = cond {
                self.expr(strip_parens(a, c));
                needs_blank = true;
            }
        } else {
            if let Some(init) = init {
                self.simple_stmt(init);
            }
            self.write("; ");
            if let Some(c) = cond {
                self.expr(strip_parens(a, c));
                needs_blank = true;
            }
            if is_for {
                self.write("; ");
                needs_blank = false;
                if let Some(post) = post {
                    self.simple_stmt(post);
                    needs_blank = true;
                }
            }
        }
        if needs_blank {
            self.write(" ");
        }
    }

    fn switch_body(&mut self, l_brace: Span, clauses: ListRef<SwitchClauseId>, r_brace: Span) {
        let a = self.a;
        self.write("{");
        self.last_line = self.line(l_brace.start);
        for &c in a.switch_clause_ids(clauses) {
            let clause = a.switch_clauses[c];
            let span = a.switch_clauses.span(c);
            self.line_item(span.start, 1);
            if clause.is_default {
                self.write("default");
            } else {
                self.write("case ");
                self.expr_list(clause.items, 1);
            }
            self.write(":");
            self.clause_body(clause.colon_pos, clause.body);
            self.last_line = self.line(span.end);
        }
        self.close_brace(r_brace);
    }

    fn clause_body(&mut self, colon: Span, body: StmtListId) {
        self.last_line = self.line(colon.start);
        self.indent += 1;
        self.stmts(body);
        self.indent -= 1;
    }

    fn close_brace(&mut self, r_brace: Span) {
        self.flush_comments(r_brace.start, 1);
        self.linebreak(self.line(r_brace.start), 1);
        self.write("}");
        self.last_line = self.line(r_brace.start);
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    #[inline]
    fn expr(&mut self, e: ExprId) {
        self.expr1(e, 0, 1);
    }

    #[inline]
    fn expr0(&mut self, e: ExprId, depth: u32) {
        self.expr1(e, 0, depth);
    }

    /// Comma-separated list without delimiters; items starting on a later
    /// source line keep their line break.
    fn expr_list(&mut self, list: ListRef<ExprId>, depth: u32) {
        let a = self.a;
        let mut indented = false;
        let mut prev_line = 0;
        for (i, &e) in a.exprs_list(list).iter().enumerate() {
            let span = a.exprs.span(e);
            if i > 0 {
                self.write(",");
                if self.line(span.start) > prev_line {
                    if !indented {
                        self.indent += 1;
                        indented = true;
                    }
                    self.last_line = prev_line;
                    self.line_item(span.start, 1);
                } else {
                    self.write(" ");
                }
            }
            self.expr0(e, depth);
            prev_line = self.line(span.end);
        }
        if indented {
            self.indent -= 1;
        }
    }

    fn item_span(&self, item: Item) -> Span {
        let a = self.a;
        match item {
            Item::Expr(e) => a.exprs.span(e),
            Item::Elem(el) => {
                let value = a.exprs.span(el.value);
                match el.key {
                    Some(k) => a.exprs.span(k).to(value),
                    None => value,
                }
            }
            Item::Field(f) => a.fields.span(f),
        }
    }

    fn item(&mut self, item: Item, align_key: bool, depth: u32) {
        match item {
            Item::Expr(e) => self.expr0(e, depth),
            Item::Elem(KeyedElement { key: Some(k), value }) => {
                self.expr0(k, depth);
                self.write(if align_key { ":\x0b" } else { ": " });
                self.expr0(value, depth);
            }
            Item::Elem(KeyedElement { key: None, value }) => self.expr0(value, depth),
            Item::Field(f) => self.param_field(f),
        }
    }

    /// Bracketed list (call arguments, composite literal elements,
    /// parameters). Source line breaks between items are kept; a closing
    /// bracket on its own line gets a trailing comma.
    #[allow(clippy::too_many_arguments)]
    fn delimited(
        &mut self,
        open_text: &str,
        open: Span,
        items: &[Item],
        ellipsis: bool,
        close: Span,
        close_text: &str,
        depth: u32,
    ) {
        self.write(open_text);
        let close_line = self.line(close.start);
        let mut prev_line = self.line(open.start);
        let mut indented = false;
        let pairs = items.len() > 1;

        for (i, &item) in items.iter().enumerate() {
            let span = self.item_span(item);
            if i > 0 {
                self.write(",");
            }
            let own_line = self.line(span.start) > prev_line;
            if own_line {
                if !indented {
                    self.indent += 1;
                    indented = true;
                }
                self.last_line = prev_line;
                self.line_item(span.start, 1);
            } else if i > 0 {
                self.write(" ");
            }
            self.item(item, own_line && pairs, depth);
            prev_line = prev_line.max(self.line(span.end));
        }
        if ellipsis {
            self.write("...");
        }

        if !items.is_empty() && close_line > prev_line {
            self.write(",");
            if !indented {
                self.indent += 1;
            }
            self.last_line = prev_line;
            self.flush_comments(close.start, 1);
            self.indent -= 1;
            self.linebreak(close_line, 1);
        } else if indented {
            self.indent -= 1;
        }
        self.write(close_text);
        self.last_line = self.last_line.max(close_line);
    }

    fn expr1(&mut self, e: ExprId, prec1: u8, depth: u32) {
        let a = self.a;
        match a.exprs[e] {
            Expr::Ident(n) => self.ident(n),
            Expr::BasicLit(l) => self.lit(l),
            Expr::FuncLit { sig, body } => {
                self.write("func");
                self.signature(sig);
                self.func_body(a.exprs.span(e).start, body, " ");
            }
            Expr::CompositeLit {
                typ,
                l_brace,
                elems,
                r_brace,
            } => {
                if let Some(t) = typ {
                    self.expr1(t, HIGHEST_PREC, depth);
                }
                let items: Vec<Item> = a.keyed_elems_list(elems).iter().map(|&el| Item::Elem(el)).collect();
                self.delimited("{", l_brace, &items, false, r_brace, "}", 1);
            }
            Expr::Paren { expr } => {
                if matches!(a.exprs[expr], Expr::Paren { .. }) {
                    self.expr0(expr, depth);
                } else {
                    self.write("(");
                    self.expr0(expr, reduce_depth(depth));
                    self.write(")");
                }
            }
            Expr::Selector { expr, sel } => {
                self.expr1(expr, HIGHEST_PREC, depth);
                self.write(".");
                self.ident(sel);
            }
            Expr::Index { expr, indices } => {
                self.expr1(expr, HIGHEST_PREC, 1);
                self.write("[");
                for (i, &x) in a.exprs_list(indices).iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.expr0(x, depth + 1);
                }
                self.write("]");
            }
            Expr::Slice {
                expr,
                lo,
                hi,
                max,
                slice3,
            } => {
                self.expr1(expr, HIGHEST_PREC, 1);
                self.write("[");
                let indices: &[Option<ExprId>] = if slice3 { &[lo, hi, max] } else { &[lo, hi] };
                let needs_blanks = depth <= 1
                    && indices.iter().flatten().count() > 1
                    && indices
                        .iter()
                        .flatten()
                        .any(|&x| matches!(a.exprs[x], Expr::Binary { .. }));
                for (i, x) in indices.iter().enumerate() {
                    if i > 0 {
                        if indices[i - 1].is_some() && needs_blanks {
                            self.write(" ");
                        }
                        self.write(":");
                        if x.is_some() && needs_blanks {
                            self.write(" ");
                        }
                    }
                    if let Some(x) = *x {
                        self.expr0(x, depth + 1);
                    }
                }
                self.write("]");
            }
            Expr::TypeAssert { expr, typ } => {
                self.expr1(expr, HIGHEST_PREC, depth);
                self.write(".(");
                match typ {
                    Some(t) => self.typ(t),
                    None => self.write("type"),
                }
                self.write(")");
            }
            Expr::Call {
                fun,
                l_paren,
                args,
                ellipsis,
                r_paren,
            } => {
                let depth = if args.len() > 1 { depth + 1 } else { depth };
                let func_type = matches!(a.exprs[fun], Expr::Type(t) if matches!(a.types[t], Type::Func { .. }));
                if func_type {
                    self.write("(");
                    self.expr1(fun, HIGHEST_PREC, depth);
                    self.write(")");
                } else {
                    self.expr1(fun, HIGHEST_PREC, depth);
                }
                let items: Vec<Item> = a.exprs_list(args).iter().map(|&x| Item::Expr(x)).collect();
                self.delimited("(", l_paren, &items, ellipsis.is_some(), r_paren, ")", depth);
            }
            Expr::Unary { op, expr } => {
                self.token(op.as_str());
                self.expr1(expr, UNARY_PREC, depth);
            }
            Expr::Binary { .. } => {
                let cutoff = cutoff(a, e, depth.max(1));
                self.binary(e, prec1, cutoff, depth.max(1));
            }
            Expr::Type(t) => self.typ(t),
        }
    }

    fn binary(&mut self, e: ExprId, prec1: u8, cutoff: u8, depth: u32) {
        let a = self.a;
        let Expr::Binary { left, op, right, .. } = a.exprs[e] else {
            return;
        };
        let prec = op.precedence();
        if prec < prec1 {
            self.write("(");
            self.expr0(e, reduce_depth(depth));
            self.write(")");
            return;
        }

        let print_blank = prec < cutoff;
        self.expr1(left, prec, depth + diff_prec(a, left, prec));
        if print_blank {
            self.write(" ");
        }
        let xline = self.line(a.exprs.span(left).end);
        let right_span = a.exprs.span(right);
        self.token(op.as_str());
        if self.line(right_span.start) > xline {
            self.indent += 1;
            self.last_line = self.last_line.max(xline);
            self.line_item(right_span.start, 1);
            self.expr1(right, prec + 1, depth + 1);
            self.indent -= 1;
        } else {
            if print_blank {
                self.write(" ");
            }
            self.expr1(right, prec + 1, depth + 1);
        }
    }
}

// =============================================================================
// Layout helpers
// =============================================================================

fn may_combine(prev: u8, next: u8) -> bool {
    matches!(
        (prev, next),
        (b'+', b'+') | (b'-', b'-') | (b'/', b'*') | (b'<', b'-') | (b'<', b'<') | (b'&', b'&') | (b'&', b'^')
    )
}

fn is_empty_stmt(a: &AstArena, s: StmtId) -> bool {
    matches!(a.stmts[s], Stmt::Simple(id) if matches!(a.simple_stmts[id], SimpleStmt::Empty))
}

/// Statements printed without a block of their own.
fn is_simple_line(a: &AstArena, s: StmtId) -> bool {
    match a.stmts[s] {
        Stmt::Simple(_)
        | Stmt::Go { .. }
        | Stmt::Defer { .. }
        | Stmt::Return { .. }
        | Stmt::Branch { .. } => true,
        Stmt::Decl(d) => a.decls[d].l_paren.is_none(),
        _ => false,
    }
}

/// Which specs of a const/var group keep an (empty) type column: runs of
/// specs with values where at least one spec has a type.
fn keep_type_column(a: &AstArena, specs: &[SpecId]) -> Vec<bool> {
    let value_spec = |s: SpecId| match a.specs[s] {
        Spec::Value(v) => Some(v),
        _ => None,
    };
    let mut keep = vec![false; specs.len()];
    let mut run_start: Option<usize> = None;
    let mut keep_type = false;
    for (i, &s) in specs.iter().enumerate() {
        let Some(v) = value_spec(s) else { continue };
        if !v.values.is_empty() {
            if run_start.is_none() {
                run_start = Some(i);
                keep_type = false;
            }
        } else if let Some(start) = run_start.take() {
            if keep_type {
                keep[start..i].fill(true);
            }
        }
        if v.typ.is_some() {
            keep_type = true;
        }
    }
    if let Some(start) = run_start {
        if keep_type {
            keep[start..].fill(true);
        }
    }
    keep
}

/// Drops redundant parentheses around a header expression unless they
/// protect a composite literal of a named type.
fn strip_parens(a: &AstArena, e: ExprId) -> ExprId {
    match a.exprs[e] {
        Expr::Paren { expr } if !has_bare_type_literal(a, expr) => strip_parens(a, expr),
        _ => e,
    }
}

fn has_bare_type_literal(a: &AstArena, e: ExprId) -> bool {
    match a.exprs[e] {
        Expr::CompositeLit { typ: Some(t), .. } => matches!(
            a.exprs[t],
            Expr::Ident(_) | Expr::Selector { .. } | Expr::Index { .. }
        ),
        Expr::Binary { left, right, .. } => {
            has_bare_type_literal(a, left) || has_bare_type_literal(a, right)
        }
        Expr::Unary { expr, .. } | Expr::Selector { expr, .. } | Expr::TypeAssert { expr, .. } => {
            has_bare_type_literal(a, expr)
        }
        Expr::Index { expr, indices } => {
            has_bare_type_literal(a, expr)
                || a.exprs_list(indices).iter().any(|&x| has_bare_type_literal(a, x))
        }
        Expr::Call { fun, args, .. } => {
            has_bare_type_literal(a, fun)
                || a.exprs_list(args).iter().any(|&x| has_bare_type_literal(a, x))
        }
        _ => false,
    }
}

fn reduce_depth(depth: u32) -> u32 {
    depth.saturating_sub(1).max(1)
}

fn diff_prec(a: &AstArena, e: ExprId, prec: u8) -> u32 {
    match a.exprs[e] {
        Expr::Binary { op, .. } if op.precedence() == prec => 0,
        _ => 1,
    }
}

/// Precedence from which binary operators are printed without blanks.
fn cutoff(a: &AstArena, e: ExprId, depth: u32) -> u8 {
    let (has4, has5, max_problem) = walk_binary(a, e);
    if max_problem > 0 {
        return max_problem + 1;
    }
    match (has4 && has5, depth == 1) {
        (true, true) => 5,
        (true, false) => 4,
        (false, true) => 6,
        (false, false) => 4,
    }
}

fn walk_binary(a: &AstArena, e: ExprId) -> (bool, bool, u8) {
    let Expr::Binary { left, op, right, .. } = a.exprs[e] else {
        return (false, false, 0);
    };
    let prec = op.precedence();
    let mut has4 = prec == 4;
    let mut has5 = prec == 5;
    let mut max_problem = 0;

    if let Expr::Binary { op: l_op, .. } = a.exprs[left] {
        if l_op.precedence() >= prec {
            let (h4, h5, mp) = walk_binary(a, left);
            has4 |= h4;
            has5 |= h5;
            max_problem = max_problem.max(mp);
        }
    }

    match a.exprs[right] {
        Expr::Binary { op: r_op, .. } => {
            if r_op.precedence() > prec {
                let (h4, h5, mp) = walk_binary(a, right);
                has4 |= h4;
                has5 |= h5;
                max_problem = max_problem.max(mp);
            }
        }
        Expr::Unary { op: UnaryOp::Deref, .. } if op == BinaryOp::Div => max_problem = 5,
        Expr::Unary { op: r_op, .. } => match (op, r_op) {
            (BinaryOp::And, UnaryOp::Addr) | (BinaryOp::And, UnaryOp::Xor) => max_problem = 5,
            (BinaryOp::Add, UnaryOp::Add) | (BinaryOp::Sub, UnaryOp::Sub) => {
                max_problem = max_problem.max(4)
            }
            _ => {}
        },
        _ => {}
    }
    (has4, has5, max_problem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_file;

    fn fmt(src: &str) -> String {
        match parse_file(src) {
            Ok(p) => print_file(&p.arena, &p.file, src),
            Err(e) => panic!("{src:?}: {:?}", e.diags),
        }
    }

    fn assert_canonical(src: &str) {
        assert_eq!(fmt(src), src);
    }

    #[test]
    fn binary_spacing_follows_precedence() {
        assert_eq!(
            fmt("package p\n\nvar x = a+b*c\n\nvar y = a + b\n\nvar z = f(a+b, c)\n"),
            "package p\n\nvar x = a + b*c\n\nvar y = a + b\n\nvar z = f(a+b, c)\n"
        );
    }

    #[test]
    fn keeps_canonical_functions_unchanged() {
        assert_canonical(
            "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tx := 1\n\tif x > 0 {\n\t\tfmt.Println(x)\n\t} else {\n\t\treturn\n\t}\n\n\tfor i := 0; i < 3; i++ {\n\t\tx += i\n\t}\n}\n",
        );
    }

    #[test]
    fn one_line_bodies_stay_on_one_line() {
        assert_canonical("package p\n\nfunc f() int { return 1 }\n\nfunc g() {}\n");
    }

    #[test]
    fn multi_line_call_keeps_its_trailing_comma() {
        assert_eq!(
            fmt("package p\n\nfunc f() {\n\tg(a,\n\t\tb,\n\t)\n}\n"),
            "package p\n\nfunc f() {\n\tg(a,\n\t\tb,\n\t)\n}\n"
        );
    }

    #[test]
    fn argument_before_a_closing_line_needs_a_comma() {
        let err = parse_file("package p\n\nfunc f() {\n\tg(a,\n\t\tb\n\t)\n}\n").err();
        assert!(err.is_some_and(|e| e.diags.iter().any(|d| d.message.contains("newline"))));
    }

    #[test]
    fn aligns_struct_fields_and_comments() {
        assert_eq!(
            fmt("package p\n\ntype T struct {\n\ta int // first\n\tlonger string // second\n}\n"),
            "package p\n\ntype T struct {\n\ta      int    // first\n\tlonger string // second\n}\n"
        );
    }

    #[test]
    fn grouped_specs_align_assignments() {
        assert_eq!(
            fmt("package p\n\nconst (\n\ta = 1\n\tbcd = 2\n)\n"),
            "package p\n\nconst (\n\ta   = 1\n\tbcd = 2\n)\n"
        );
    }

    #[test]
    fn switch_cases_and_labels() {
        assert_canonical(
            "package p\n\nfunc f(x int) {\nouter:\n\tfor {\n\t\tswitch x {\n\t\tcase 1, 2:\n\t\t\tbreak outer\n\t\tdefault:\n\t\t}\n\t}\n}\n",
        );
    }

    #[test]
    fn multi_line_literal_keys_are_aligned() {
        assert_eq!(
            fmt("package p\n\nvar m = map[string]int{\n\t\"a\": 1,\n\t\"bb\": 2,\n}\n"),
            "package p\n\nvar m = map[string]int{\n\t\"a\":  1,\n\t\"bb\": 2,\n}\n"
        );
    }

    #[test]
    fn strips_header_parentheses() {
        assert_eq!(
            fmt("package p\n\nfunc f() {\n\tif (x) {\n\t}\n}\n"),
            "package p\n\nfunc f() {\n\tif x {\n\t}\n}\n"
        );
    }

    #[test]
    fn keeps_leading_comments() {
        assert_canonical("// Package p does things.\npackage p\n\n// F is documented.\nfunc F() {\n\t// inside\n\tg()\n}\n");
    }
}
