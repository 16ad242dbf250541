//! Recursive-descent parser for Go source files.
//!
//! The token stream is scanned up front; parsing stops at the first syntax
//! error. Composite literals of bare type names are not allowed in control
//! clause headers (`expr_lev < 0`), as in the Go grammar.

use crate::ast::*;
use crate::error::{Diag, ParseFailure};
use crate::lexer::{Lexer, RawComment, Spanned, Tok};
use crate::parser_support::{self, ParamDecl};

pub type PResult<T> = Result<T, Diag>;

/// Parsed file: the arena and its root.
#[derive(Debug)]
pub struct ParsedFile {
    pub arena: AstArena,
    pub file: SourceFile,
}

/// Parses a complete Go source file, comments included.
pub fn parse_file(src: &str) -> Result<ParsedFile, ParseFailure> {
    let mut lexer = Lexer::new(src);
    let toks = lexer.tokenize();
    let diags = lexer.take_diags();
    if !diags.is_empty() {
        return Err(ParseFailure { diags });
    }
    let comments = lexer.take_comments();

    let mut p = Parser::new(toks);
    match p.source_file(&comments) {
        Ok(file) => Ok(ParsedFile { arena: p.a, file }),
        Err(diag) => Err(ParseFailure { diags: vec![diag] }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Basic,
    LabelOk,
    RangeOk,
}

enum Simple {
    Stmt(SimpleStmtId),
    Label(IdentName),
    Range {
        key: Option<ExprId>,
        value: Option<ExprId>,
        op: Option<AssignOp>,
        expr: ExprId,
    },
}

struct Parser<'src> {
    toks: Vec<Spanned<'src>>,
    pos: usize,
    a: AstArena,
    expr_lev: i32,
}

impl<'src> Parser<'src> {
    fn new(toks: Vec<Spanned<'src>>) -> Self {
        Self {
            toks,
            pos: 0,
            a: AstArena::new(),
            expr_lev: 0,
        }
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    #[inline]
    fn tok(&self) -> Tok<'src> {
        self.toks[self.pos].1
    }

    #[inline]
    fn peek(&self, n: usize) -> Tok<'src> {
        self.toks.get(self.pos + n).map_or(Tok::Eof, |t| t.1)
    }

    #[inline]
    fn span(&self) -> Span {
        let (start, _, end) = self.toks[self.pos];
        Span::new(start, end)
    }

    #[inline]
    fn at(&self, t: Tok<'src>) -> bool {
        self.tok() == t
    }

    /// Consumes the current token and returns its span. `Eof` is never consumed.
    fn next(&mut self) -> Span {
        let sp = self.span();
        if self.pos + 1 < self.toks.len() {
            self.pos += 1;
        }
        sp
    }

    fn got(&mut self, t: Tok<'src>) -> Option<Span> {
        if self.at(t) {
            Some(self.next())
        } else {
            None
        }
    }

    fn expect(&mut self, t: Tok<'src>, what: &str) -> PResult<Span> {
        self.got(t).ok_or_else(|| self.error_expected(what))
    }

    fn expect_semi(&mut self) -> PResult<()> {
        match self.tok() {
            Tok::Semi => {
                self.next();
                Ok(())
            }
            Tok::RParen | Tok::RBrace | Tok::Eof => Ok(()),
            _ => Err(self.error_expected("';'")),
        }
    }

    fn prev_end(&self) -> u32 {
        match self.pos.checked_sub(1) {
            Some(i) => self.toks[i].2 as u32,
            None => 0,
        }
    }

    fn span_from(&self, start: u32) -> Span {
        Span {
            start,
            end: self.prev_end().max(start),
        }
    }

    fn error_expected(&self, what: &str) -> Diag {
        let found = describe(self.tok(), self.span());
        Diag::parse(self.span(), format!("expected {what}, found {found}"))
    }

    fn with_expr_lev<T>(&mut self, lev: i32, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let old = self.expr_lev;
        self.expr_lev = lev;
        let r = f(self);
        self.expr_lev = old;
        r
    }

    /// Inside (), [] or {}: composite literals are allowed again.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        self.with_expr_lev(self.expr_lev + 1, f)
    }

    fn control<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        self.with_expr_lev(-1, f)
    }

    // =========================================================================
    // File and declarations
    // =========================================================================

    fn source_file(&mut self, comments: &[RawComment]) -> PResult<SourceFile> {
        let package_pos = self.expect(Tok::KwPackage, "'package'")?;
        let name = self.ident()?;
        self.expect_semi()?;

        let mut decls = Vec::new();
        while self.at(Tok::KwImport) {
            decls.push(TopLevelDecl::Decl(self.gen_decl(GenDeclKind::Import)?));
            self.expect_semi()?;
        }
        while !self.at(Tok::Eof) {
            let decl = match self.tok() {
                Tok::KwFunc => TopLevelDecl::Func(self.func_decl()?),
                Tok::KwConst => TopLevelDecl::Decl(self.gen_decl(GenDeclKind::Const)?),
                Tok::KwVar => TopLevelDecl::Decl(self.gen_decl(GenDeclKind::Var)?),
                Tok::KwType => TopLevelDecl::Decl(self.gen_decl(GenDeclKind::Type)?),
                Tok::KwImport => {
                    return Err(Diag::parse(
                        self.span(),
                        "imports must appear before other declarations",
                    ))
                }
                _ => return Err(self.error_expected("declaration")),
            };
            decls.push(decl);
            self.expect_semi()?;
        }

        let decls = self.a.list_top_decls(decls);
        let ids: Vec<_> = comments
            .iter()
            .map(|c| self.a.comments.alloc(Comment { kind: c.kind }, c.span))
            .collect();
        let comments = self.a.list_comment_ids(ids);
        Ok(SourceFile {
            package_pos,
            name,
            decls,
            comments,
        })
    }

    fn ident(&mut self) -> PResult<IdentName> {
        match self.tok() {
            Tok::Ident(s) => {
                let pos = self.next();
                Ok(IdentName {
                    sym: self.a.symbols.intern(s),
                    pos,
                })
            }
            _ => Err(self.error_expected("identifier")),
        }
    }

    fn ident_list(&mut self) -> PResult<Vec<IdentName>> {
        let mut names = vec![self.ident()?];
        while self.got(Tok::Comma).is_some() {
            names.push(self.ident()?);
        }
        Ok(names)
    }

    fn gen_decl(&mut self, kind: GenDeclKind) -> PResult<DeclId> {
        let kw_pos = self.next();
        let mut specs = Vec::new();
        let (l_paren, r_paren) = match self.got(Tok::LParen) {
            Some(l) => {
                while !self.at(Tok::RParen) && !self.at(Tok::Eof) {
                    specs.push(self.spec(kind)?);
                    self.expect_semi()?;
                }
                let r = self.expect(Tok::RParen, "')'")?;
                (Some(l), Some(r))
            }
            None => {
                specs.push(self.spec(kind)?);
                (None, None)
            }
        };
        let specs = self.a.list_specs(specs);
        let span = self.span_from(kw_pos.start);
        Ok(self.a.decls.alloc(
            GenDecl {
                kw_pos,
                kind,
                l_paren,
                specs,
                r_paren,
            },
            span,
        ))
    }

    fn spec(&mut self, kind: GenDeclKind) -> PResult<SpecId> {
        let start = self.span().start;
        let spec = match kind {
            GenDeclKind::Import => {
                let name = match self.tok() {
                    Tok::Ident(_) => Some(self.ident()?),
                    Tok::Dot => {
                        let pos = self.next();
                        Some(IdentName {
                            sym: self.a.symbols.intern("."),
                            pos,
                        })
                    }
                    _ => None,
                };
                let path = match self.tok() {
                    Tok::StringLit(_) | Tok::RawStringLit(_) => BasicLit {
                        kind: BasicLitKind::String,
                        raw: self.next(),
                    },
                    _ => return Err(self.error_expected("import path")),
                };
                Spec::Import(ImportSpec { name, path })
            }
            GenDeclKind::Const | GenDeclKind::Var => {
                let names = self.ident_list()?;
                let typ = match self.tok() {
                    Tok::Assign | Tok::Semi | Tok::RParen | Tok::Eof => None,
                    _ => Some(self.parse_type()?),
                };
                let values = if self.got(Tok::Assign).is_some() {
                    self.expr_list()?
                } else {
                    Vec::new()
                };
                Spec::Value(ValueSpec {
                    names: self.a.list_ident_names(names),
                    typ,
                    values: self.a.list_exprs(values),
                })
            }
            GenDeclKind::Type => {
                let name = self.ident()?;
                let type_params = if self.at(Tok::LBrack) && self.looks_like_type_params() {
                    Some(self.param_list(Tok::LBrack, Tok::RBrack, true)?)
                } else {
                    None
                };
                let alias = self.got(Tok::Assign).is_some();
                let typ = self.parse_type()?;
                Spec::Type(TypeSpec {
                    name,
                    type_params,
                    alias,
                    typ,
                })
            }
        };
        let span = self.span_from(start);
        Ok(self.a.specs.alloc(spec, span))
    }

    /// `type A[T any] ...` versus the array type of `type A [N]int`.
    fn looks_like_type_params(&self) -> bool {
        matches!(self.peek(1), Tok::Ident(_))
            && matches!(
                self.peek(2),
                Tok::Ident(_)
                    | Tok::Comma
                    | Tok::Tilde
                    | Tok::LBrack
                    | Tok::KwInterface
                    | Tok::KwMap
                    | Tok::KwChan
                    | Tok::KwFunc
                    | Tok::KwStruct
            )
    }

    fn func_decl(&mut self) -> PResult<FuncDeclId> {
        let func_pos = self.next();
        let recv = if self.at(Tok::LParen) {
            Some(self.param_list(Tok::LParen, Tok::RParen, false)?)
        } else {
            None
        };
        let name = self.ident()?;
        let type_params = if self.at(Tok::LBrack) {
            Some(self.param_list(Tok::LBrack, Tok::RBrack, true)?)
        } else {
            None
        };
        let sig = self.signature()?;
        let body = if self.at(Tok::LBrace) {
            Some(self.nested(|p| p.block())?)
        } else {
            None
        };
        let span = self.span_from(func_pos.start);
        Ok(self.a.funcs.alloc(
            FuncDecl {
                func_pos,
                recv,
                name,
                type_params,
                sig,
                body,
            },
            span,
        ))
    }

    // =========================================================================
    // Signatures, parameters and fields
    // =========================================================================

    fn signature(&mut self) -> PResult<Signature> {
        let params = self.param_list(Tok::LParen, Tok::RParen, false)?;
        let results = match self.tok() {
            Tok::LParen => Some(Results::Params(self.param_list(
                Tok::LParen,
                Tok::RParen,
                false,
            )?)),
            t if starts_type(t) => Some(Results::Type(self.parse_type()?)),
            _ => None,
        };
        Ok(Signature { params, results })
    }

    fn param_list(&mut self, open: Tok<'src>, close: Tok<'src>, type_params: bool) -> PResult<FieldList> {
        let (open_what, close_what) = if open == Tok::LBrack {
            ("'['", "']'")
        } else {
            ("'('", "')'")
        };
        let open_span = self.expect(open, open_what)?;
        let mut entries = Vec::new();
        while !self.at(close) && !self.at(Tok::Eof) {
            entries.push(self.param_entry(close, type_params)?);
            if self.got(Tok::Comma).is_none() {
                break;
            }
        }
        let close_span = self.expect(close, close_what)?;
        if type_params && entries.is_empty() {
            return Err(Diag::parse(close_span, "empty type parameter list"));
        }
        let fields = parser_support::resolve_param_list(&mut self.a, entries);
        Ok(FieldList {
            open: open_span,
            fields: self.a.list_fields(fields),
            close: close_span,
        })
    }

    fn param_entry(&mut self, close: Tok<'src>, type_params: bool) -> PResult<ParamDecl> {
        let start = self.span().start;
        let (name, ellipsis, typ) = match self.tok() {
            Tok::Ident(_) => {
                let name = self.ident()?;
                match self.tok() {
                    Tok::Dot => (None, None, Some(self.type_name_rest(name)?)),
                    Tok::LBrack if !type_params => {
                        let (name, typ) =
                            self.bracket_after_name(name, |t| t == Tok::Comma || t == close)?;
                        (name, None, Some(typ))
                    }
                    Tok::Ellipsis => {
                        let e = self.next();
                        (Some(name), Some(e), Some(self.parse_type()?))
                    }
                    t if t == Tok::Comma || t == close => (Some(name), None, None),
                    _ if type_params => (Some(name), None, Some(self.constraint()?)),
                    _ => (Some(name), None, Some(self.parse_type()?)),
                }
            }
            Tok::Ellipsis => {
                let e = self.next();
                (None, Some(e), Some(self.parse_type()?))
            }
            _ if type_params => (None, None, Some(self.constraint()?)),
            _ => (None, None, Some(self.parse_type()?)),
        };
        Ok(ParamDecl {
            name,
            ellipsis,
            typ,
            span: self.span_from(start),
        })
    }

    /// After `name` with `[` current: either `name []T` / `name [N]T` (returns
    /// the name and the array type) or a generic instantiation `name[A, B]`
    /// (returns no name). `generic_if` tells which token may follow an
    /// instantiation.
    fn bracket_after_name(
        &mut self,
        name: IdentName,
        generic_if: impl Fn(Tok<'src>) -> bool,
    ) -> PResult<(Option<IdentName>, TypeId)> {
        let lbrack = self.next();
        if self.got(Tok::RBrack).is_some() {
            let elem = self.parse_type()?;
            let span = self.span_from(lbrack.start);
            return Ok((Some(name), self.a.types.alloc(Type::Slice { elem }, span)));
        }

        let items = self.nested(|p| {
            let mut items = vec![p.parse_expr()?];
            while p.got(Tok::Comma).is_some() {
                if p.at(Tok::RBrack) {
                    break;
                }
                items.push(p.parse_expr()?);
            }
            Ok(items)
        })?;
        self.expect(Tok::RBrack, "']'")?;

        if items.len() > 1 || generic_if(self.tok()) {
            let args = items
                .into_iter()
                .map(|e| self.expr_to_type(e))
                .collect::<PResult<Vec<_>>>()?;
            let args = self.a.list_types(args);
            let span = self.span_from(name.pos.start);
            let typ = self.a.types.alloc(
                Type::Named {
                    pkg: None,
                    name,
                    args,
                },
                span,
            );
            return Ok((None, typ));
        }

        let elem = self.parse_type()?;
        let span = self.span_from(lbrack.start);
        let typ = self.a.types.alloc(
            Type::Array {
                len: Some(items[0]),
                elem,
            },
            span,
        );
        Ok((Some(name), typ))
    }

    /// Reinterprets an expression parsed where a type was expected.
    fn expr_to_type(&mut self, e: ExprId) -> PResult<TypeId> {
        let span = self.a.exprs.span(e);
        let t = match self.a.exprs[e] {
            Expr::Type(t) => return Ok(t),
            Expr::Ident(name) => Type::Named {
                pkg: None,
                name,
                args: ListRef::EMPTY,
            },
            Expr::Selector { expr, sel } => match self.a.exprs[expr] {
                Expr::Ident(pkg) => Type::Named {
                    pkg: Some(pkg),
                    name: sel,
                    args: ListRef::EMPTY,
                },
                _ => return Err(Diag::parse(span, "expected type")),
            },
            Expr::Index { expr, indices } => {
                let base = self.expr_to_type(expr)?;
                let Type::Named { pkg, name, .. } = self.a.types[base] else {
                    return Err(Diag::parse(span, "expected type"));
                };
                let idx = self.a.exprs_list(indices).to_vec();
                let args = idx
                    .into_iter()
                    .map(|i| self.expr_to_type(i))
                    .collect::<PResult<Vec<_>>>()?;
                Type::Named {
                    pkg,
                    name,
                    args: self.a.list_types(args),
                }
            }
            Expr::Unary {
                op: UnaryOp::Deref,
                expr,
            } => Type::Pointer {
                elem: self.expr_to_type(expr)?,
            },
            Expr::Paren { expr } => Type::Paren {
                typ: self.expr_to_type(expr)?,
            },
            _ => return Err(Diag::parse(span, "expected type")),
        };
        Ok(self.a.types.alloc(t, span))
    }

    fn struct_fields(&mut self) -> PResult<FieldList> {
        let open = self.expect(Tok::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while !self.at(Tok::RBrace) && !self.at(Tok::Eof) {
            fields.push(self.field_decl()?);
            self.expect_semi()?;
        }
        let close = self.expect(Tok::RBrace, "'}'")?;
        Ok(FieldList {
            open,
            fields: self.a.list_fields(fields),
            close,
        })
    }

    fn field_decl(&mut self) -> PResult<FieldId> {
        let start = self.span().start;
        let (names, typ) = match self.tok() {
            Tok::Star => (Vec::new(), self.parse_type()?),
            Tok::Ident(_) => {
                let first = self.ident()?;
                match self.tok() {
                    Tok::Dot => (Vec::new(), self.type_name_rest(first)?),
                    Tok::Semi | Tok::RBrace | Tok::StringLit(_) | Tok::RawStringLit(_) => {
                        (Vec::new(), parser_support::named_type_from_ident(&mut self.a, first))
                    }
                    Tok::LBrack => {
                        let (name, typ) = self.bracket_after_name(first, |t| {
                            matches!(
                                t,
                                Tok::Semi | Tok::RBrace | Tok::StringLit(_) | Tok::RawStringLit(_)
                            )
                        })?;
                        (name.into_iter().collect(), typ)
                    }
                    Tok::Comma => {
                        let mut names = vec![first];
                        while self.got(Tok::Comma).is_some() {
                            names.push(self.ident()?);
                        }
                        (names, self.parse_type()?)
                    }
                    _ => (vec![first], self.parse_type()?),
                }
            }
            _ => return Err(self.error_expected("field name or embedded type")),
        };
        let tag = match self.tok() {
            Tok::StringLit(_) | Tok::RawStringLit(_) => Some(BasicLit {
                kind: BasicLitKind::String,
                raw: self.next(),
            }),
            _ => None,
        };
        let field = Field {
            names: self.a.list_ident_names(names),
            ellipsis: None,
            typ,
            tag,
        };
        let span = self.span_from(start);
        Ok(self.a.fields.alloc(field, span))
    }

    fn interface_elems(&mut self) -> PResult<FieldList> {
        let open = self.expect(Tok::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while !self.at(Tok::RBrace) && !self.at(Tok::Eof) {
            let start = self.span().start;
            let field = if matches!(self.tok(), Tok::Ident(_)) && self.peek(1) == Tok::LParen {
                let name = self.ident()?;
                let sig_start = self.span().start;
                let sig = self.signature()?;
                let sig_span = self.span_from(sig_start);
                let typ = self.a.types.alloc(Type::Func { sig }, sig_span);
                Field {
                    names: self.a.list_ident_names([name]),
                    ellipsis: None,
                    typ,
                    tag: None,
                }
            } else {
                Field {
                    names: ListRef::EMPTY,
                    ellipsis: None,
                    typ: self.constraint()?,
                    tag: None,
                }
            };
            let span = self.span_from(start);
            fields.push(self.a.fields.alloc(field, span));
            self.expect_semi()?;
        }
        let close = self.expect(Tok::RBrace, "'}'")?;
        Ok(FieldList {
            open,
            fields: self.a.list_fields(fields),
            close,
        })
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// `~int | string`, or a plain type.
    fn constraint(&mut self) -> PResult<TypeId> {
        let start = self.span().start;
        let first = self.type_term()?;
        if !first.tilde && !self.at(Tok::Pipe) {
            return Ok(first.typ);
        }
        let mut terms = vec![first];
        while self.got(Tok::Pipe).is_some() {
            terms.push(self.type_term()?);
        }
        let terms = self.a.list_type_terms(terms);
        let span = self.span_from(start);
        Ok(self.a.types.alloc(Type::Union { terms }, span))
    }

    fn type_term(&mut self) -> PResult<TypeTerm> {
        let tilde = self.got(Tok::Tilde).is_some();
        let typ = self.parse_type()?;
        Ok(TypeTerm { tilde, typ })
    }

    /// `pkg.Name[args]` / `Name[args]` after the first identifier.
    fn type_name_rest(&mut self, first: IdentName) -> PResult<TypeId> {
        let (pkg, name) = if self.got(Tok::Dot).is_some() {
            (Some(first), self.ident()?)
        } else {
            (None, first)
        };
        let args = if self.at(Tok::LBrack) {
            self.next();
            let args = self.nested(|p| {
                let mut args = vec![p.parse_type()?];
                while p.got(Tok::Comma).is_some() {
                    if p.at(Tok::RBrack) {
                        break;
                    }
                    args.push(p.parse_type()?);
                }
                Ok(args)
            })?;
            self.expect(Tok::RBrack, "']'")?;
            self.a.list_types(args)
        } else {
            ListRef::EMPTY
        };
        let span = self.span_from(first.pos.start);
        Ok(self.a.types.alloc(Type::Named { pkg, name, args }, span))
    }

    fn parse_type(&mut self) -> PResult<TypeId> {
        let start = self.span().start;
        let t = match self.tok() {
            Tok::Ident(_) => {
                let name = self.ident()?;
                return self.type_name_rest(name);
            }
            Tok::LBrack => {
                self.next();
                if self.got(Tok::RBrack).is_some() {
                    Type::Slice {
                        elem: self.parse_type()?,
                    }
                } else {
                    let len = if self.got(Tok::Ellipsis).is_some() {
                        None
                    } else {
                        Some(self.nested(|p| p.parse_expr())?)
                    };
                    self.expect(Tok::RBrack, "']'")?;
                    Type::Array {
                        len,
                        elem: self.parse_type()?,
                    }
                }
            }
            Tok::Star => {
                self.next();
                Type::Pointer {
                    elem: self.parse_type()?,
                }
            }
            Tok::Arrow => {
                self.next();
                self.expect(Tok::KwChan, "'chan'")?;
                Type::Chan {
                    dir: ChanDir::Recv,
                    elem: self.parse_type()?,
                }
            }
            Tok::KwChan => {
                self.next();
                let dir = if self.got(Tok::Arrow).is_some() {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Type::Chan {
                    dir,
                    elem: self.parse_type()?,
                }
            }
            Tok::KwMap => {
                self.next();
                self.expect(Tok::LBrack, "'['")?;
                let key = self.parse_type()?;
                self.expect(Tok::RBrack, "']'")?;
                Type::Map {
                    key,
                    val: self.parse_type()?,
                }
            }
            Tok::KwStruct => {
                self.next();
                Type::Struct {
                    fields: self.struct_fields()?,
                }
            }
            Tok::KwInterface => {
                self.next();
                Type::Interface {
                    elems: self.interface_elems()?,
                }
            }
            Tok::KwFunc => {
                self.next();
                Type::Func {
                    sig: self.signature()?,
                }
            }
            Tok::LParen => {
                self.next();
                let typ = self.parse_type()?;
                self.expect(Tok::RParen, "')'")?;
                Type::Paren { typ }
            }
            _ => return Err(self.error_expected("type")),
        };
        let span = self.span_from(start);
        Ok(self.a.types.alloc(t, span))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn block(&mut self) -> PResult<Block> {
        let l_brace = self.expect(Tok::LBrace, "'{'")?;
        let stmts = self.stmt_list()?;
        let r_brace = self.expect(Tok::RBrace, "'}'")?;
        let stmts = self
            .a
            .stmt_lists
            .alloc(StmtList { stmts }, l_brace.to(r_brace));
        Ok(Block {
            l_brace,
            stmts,
            r_brace,
        })
    }

    fn stmt_list(&mut self) -> PResult<Vec<StmtId>> {
        let mut out = Vec::new();
        loop {
            match self.tok() {
                Tok::KwCase | Tok::KwDefault | Tok::RBrace | Tok::Eof => break,
                Tok::Semi => {
                    self.next();
                }
                _ => {
                    out.push(self.stmt()?);
                    self.expect_semi()?;
                }
            }
        }
        Ok(out)
    }

    fn stmt(&mut self) -> PResult<StmtId> {
        let start = self.span().start;
        let s = match self.tok() {
            Tok::KwConst => Stmt::Decl(self.gen_decl(GenDeclKind::Const)?),
            Tok::KwVar => Stmt::Decl(self.gen_decl(GenDeclKind::Var)?),
            Tok::KwType => Stmt::Decl(self.gen_decl(GenDeclKind::Type)?),
            Tok::KwGo | Tok::KwDefer => {
                let is_go = self.at(Tok::KwGo);
                let kw = self.next();
                let call = self.parse_expr()?;
                if !matches!(self.a.exprs[call], Expr::Call { .. }) {
                    let what = if is_go { "go" } else { "defer" };
                    return Err(Diag::parse(
                        kw,
                        format!("expression in {what} must be function call"),
                    ));
                }
                if is_go {
                    Stmt::Go { call }
                } else {
                    Stmt::Defer { call }
                }
            }
            Tok::KwReturn => {
                self.next();
                let results = match self.tok() {
                    Tok::Semi | Tok::RBrace => Vec::new(),
                    _ => self.expr_list()?,
                };
                Stmt::Return {
                    results: self.a.list_exprs(results),
                }
            }
            Tok::KwBreak | Tok::KwContinue | Tok::KwGoto | Tok::KwFallthrough => {
                let kind = match self.tok() {
                    Tok::KwBreak => BranchKind::Break,
                    Tok::KwContinue => BranchKind::Continue,
                    Tok::KwGoto => BranchKind::Goto,
                    _ => BranchKind::Fallthrough,
                };
                self.next();
                let label = match self.tok() {
                    Tok::Ident(_) if kind != BranchKind::Fallthrough => Some(self.ident()?),
                    _ => None,
                };
                Stmt::Branch { kind, label }
            }
            Tok::LBrace => Stmt::Block(self.block()?),
            Tok::KwIf => return self.if_stmt(),
            Tok::KwFor => return self.for_stmt(),
            Tok::KwSwitch => return self.switch_stmt(),
            Tok::KwSelect => return self.select_stmt(),
            // Only reachable as the body of a label: `L: }`
            Tok::Semi | Tok::RBrace => {
                let empty = self.a.simple_stmts.alloc(SimpleStmt::Empty, Span::empty_at(start));
                return Ok(self.a.stmts.alloc(Stmt::Simple(empty), Span::empty_at(start)));
            }
            _ => match self.simple_stmt(Mode::LabelOk)? {
                Simple::Stmt(s) => Stmt::Simple(s),
                Simple::Label(label) => {
                    let stmt = self.stmt()?;
                    Stmt::Labeled { label, stmt }
                }
                Simple::Range { expr, .. } => {
                    return Err(Diag::parse(self.a.exprs.span(expr), "unexpected range"))
                }
            },
        };
        let span = self.span_from(start);
        Ok(self.a.stmts.alloc(s, span))
    }

    fn simple_stmt(&mut self, mode: Mode) -> PResult<Simple> {
        let start = self.span().start;

        if mode == Mode::RangeOk && self.at(Tok::KwRange) {
            self.next();
            let expr = self.parse_expr()?;
            return Ok(Simple::Range {
                key: None,
                value: None,
                op: None,
                expr,
            });
        }

        let lhs = self.expr_list()?;

        if let Some(op) = assign_op(self.tok()) {
            let op_pos = self.next();
            if op == AssignOp::Define {
                self.check_define_lhs(&lhs)?;
            }

            if mode == Mode::RangeOk
                && self.at(Tok::KwRange)
                && matches!(op, AssignOp::Assign | AssignOp::Define)
            {
                self.next();
                if lhs.len() > 2 {
                    return Err(Diag::parse(
                        self.a.exprs.span(lhs[2]),
                        "range clause permits at most two iteration variables",
                    ));
                }
                let expr = self.parse_expr()?;
                return Ok(Simple::Range {
                    key: Some(lhs[0]),
                    value: lhs.get(1).copied(),
                    op: Some(op),
                    expr,
                });
            }

            let rhs = self.expr_list()?;
            let s = SimpleStmt::Assign {
                lhs: self.a.list_exprs(lhs),
                op,
                op_pos,
                rhs: self.a.list_exprs(rhs),
            };
            let span = self.span_from(start);
            return Ok(Simple::Stmt(self.a.simple_stmts.alloc(s, span)));
        }

        if lhs.len() > 1 {
            return Err(self.error_expected("'=' or ':='"));
        }
        let x = lhs[0];

        let s = match self.tok() {
            Tok::Colon if mode == Mode::LabelOk => {
                if let Expr::Ident(label) = self.a.exprs[x] {
                    self.next();
                    return Ok(Simple::Label(label));
                }
                SimpleStmt::Expr(x)
            }
            Tok::Arrow => {
                self.next();
                let value = self.parse_expr()?;
                SimpleStmt::Send { chan: x, value }
            }
            Tok::Inc => {
                self.next();
                SimpleStmt::IncDec {
                    expr: x,
                    op: IncDecOp::Inc,
                }
            }
            Tok::Dec => {
                self.next();
                SimpleStmt::IncDec {
                    expr: x,
                    op: IncDecOp::Dec,
                }
            }
            _ => SimpleStmt::Expr(x),
        };
        let span = self.span_from(start);
        Ok(Simple::Stmt(self.a.simple_stmts.alloc(s, span)))
    }

    fn simple_stmt_basic(&mut self) -> PResult<SimpleStmtId> {
        match self.simple_stmt(Mode::Basic)? {
            Simple::Stmt(s) => Ok(s),
            Simple::Label(l) => Err(Diag::parse(l.pos, "unexpected label")),
            Simple::Range { expr, .. } => Err(Diag::parse(self.a.exprs.span(expr), "unexpected range")),
        }
    }

    fn check_define_lhs(&self, lhs: &[ExprId]) -> PResult<()> {
        for &e in lhs {
            if !matches!(self.a.exprs[e], Expr::Ident(_)) {
                return Err(Diag::parse(self.a.exprs.span(e), "non-name on left side of :="));
            }
        }
        Ok(())
    }

    /// Condition of an `if`/`for` header, taken from a parsed simple statement.
    fn cond_of(&self, s: SimpleStmtId, what: &str) -> PResult<ExprId> {
        match self.a.simple_stmts[s] {
            SimpleStmt::Expr(e) => Ok(e),
            _ => Err(Diag::parse(
                self.a.simple_stmts.span(s),
                format!("cannot use statement as {what}"),
            )),
        }
    }

    fn if_stmt(&mut self) -> PResult<StmtId> {
        let start = self.next().start;
        let (init, cond) = self.control(|p| p.if_header())?;
        let then_block = self.block()?;
        let else_stmt = if self.got(Tok::KwElse).is_some() {
            match self.tok() {
                Tok::KwIf => Some(self.if_stmt()?),
                Tok::LBrace => {
                    let bstart = self.span().start;
                    let b = self.block()?;
                    let span = self.span_from(bstart);
                    Some(self.a.stmts.alloc(Stmt::Block(b), span))
                }
                _ => return Err(self.error_expected("if statement or block")),
            }
        } else {
            None
        };
        let span = self.span_from(start);
        Ok(self.a.stmts.alloc(
            Stmt::If {
                init,
                cond,
                then_block,
                else_stmt,
            },
            span,
        ))
    }

    fn if_header(&mut self) -> PResult<(Option<SimpleStmtId>, ExprId)> {
        if self.at(Tok::LBrace) {
            return Err(Diag::parse(self.span(), "missing condition in if statement"));
        }
        let first = if self.at(Tok::Semi) {
            None
        } else {
            Some(self.simple_stmt_basic()?)
        };
        if self.got(Tok::Semi).is_some() {
            if self.at(Tok::LBrace) {
                return Err(Diag::parse(self.span(), "missing condition in if statement"));
            }
            let cond = self.simple_stmt_basic()?;
            Ok((first, self.cond_of(cond, "value")?))
        } else {
            match first {
                Some(s) => Ok((None, self.cond_of(s, "value")?)),
                None => Err(Diag::parse(self.span(), "missing condition in if statement")),
            }
        }
    }

    fn for_stmt(&mut self) -> PResult<StmtId> {
        let start = self.next().start;
        let kind = self.control(|p| p.for_header())?;
        let block = self.block()?;
        let span = self.span_from(start);
        Ok(self.a.stmts.alloc(Stmt::For { kind, block }, span))
    }

    fn for_header(&mut self) -> PResult<ForKind> {
        if self.at(Tok::LBrace) {
            return Ok(ForKind::Infinite);
        }
        let mut init = None;
        if !self.at(Tok::Semi) {
            match self.simple_stmt(Mode::RangeOk)? {
                Simple::Range {
                    key,
                    value,
                    op,
                    expr,
                } => {
                    return Ok(ForKind::Range {
                        key,
                        value,
                        op,
                        expr,
                    })
                }
                Simple::Stmt(s) => init = Some(s),
                Simple::Label(l) => return Err(Diag::parse(l.pos, "unexpected label")),
            }
        }
        if self.got(Tok::Semi).is_none() {
            return match init {
                Some(s) => Ok(ForKind::Cond(self.cond_of(s, "for loop condition")?)),
                None => Err(self.error_expected("for loop condition")),
            };
        }
        let cond = if self.at(Tok::Semi) {
            None
        } else {
            let s = self.simple_stmt_basic()?;
            Some(self.cond_of(s, "for loop condition")?)
        };
        self.expect(Tok::Semi, "';'")?;
        let post = if self.at(Tok::LBrace) {
            None
        } else {
            Some(self.simple_stmt_basic()?)
        };
        Ok(ForKind::Clause { init, cond, post })
    }

    fn switch_stmt(&mut self) -> PResult<StmtId> {
        let start = self.next().start;
        let (init, guard) = self.control(|p| {
            let mut init = None;
            let mut guard = None;
            if !p.at(Tok::LBrace) {
                if !p.at(Tok::Semi) {
                    guard = Some(p.simple_stmt_basic()?);
                }
                if p.got(Tok::Semi).is_some() {
                    init = guard.take();
                    if !p.at(Tok::LBrace) {
                        guard = Some(p.simple_stmt_basic()?);
                    }
                }
            }
            Ok((init, guard))
        })?;

        let type_switch = match guard {
            Some(g) => self.is_type_switch_guard(g)?,
            None => false,
        };

        let l_brace = self.expect(Tok::LBrace, "'{'")?;
        let mut clauses = Vec::new();
        while matches!(self.tok(), Tok::KwCase | Tok::KwDefault) {
            clauses.push(self.switch_clause(type_switch)?);
        }
        let r_brace = self.expect(Tok::RBrace, "'}'")?;
        let clauses = self.a.list_switch_clause_ids(clauses);

        let s = match guard {
            Some(assign) if type_switch => Stmt::TypeSwitch {
                init,
                assign,
                l_brace,
                clauses,
                r_brace,
            },
            _ => Stmt::Switch {
                init,
                tag: match guard {
                    Some(g) => Some(self.cond_of(g, "switch expression")?),
                    None => None,
                },
                l_brace,
                clauses,
                r_brace,
            },
        };
        let span = self.span_from(start);
        Ok(self.a.stmts.alloc(s, span))
    }

    fn is_type_switch_guard(&self, s: SimpleStmtId) -> PResult<bool> {
        let is_type_assert =
            |e: ExprId| matches!(self.a.exprs[e], Expr::TypeAssert { typ: None, .. });
        match self.a.simple_stmts[s] {
            SimpleStmt::Expr(e) => Ok(is_type_assert(e)),
            SimpleStmt::Assign {
                lhs,
                op,
                op_pos,
                rhs,
            } => {
                let lhs = self.a.exprs_list(lhs);
                let rhs = self.a.exprs_list(rhs);
                if lhs.len() != 1 || rhs.len() != 1 || !is_type_assert(rhs[0]) {
                    return Ok(false);
                }
                match op {
                    AssignOp::Define => Ok(true),
                    AssignOp::Assign => Err(Diag::parse(op_pos, "expected ':=', found '='")),
                    _ => Ok(false),
                }
            }
            _ => Ok(false),
        }
    }

    fn switch_clause(&mut self, type_switch: bool) -> PResult<SwitchClauseId> {
        let start = self.span().start;
        let (items, is_default) = if self.got(Tok::KwCase).is_some() {
            let items = if type_switch {
                let mut items = vec![self.type_item()?];
                while self.got(Tok::Comma).is_some() {
                    items.push(self.type_item()?);
                }
                items
            } else {
                self.expr_list()?
            };
            (items, false)
        } else {
            self.expect(Tok::KwDefault, "'case' or 'default'")?;
            (Vec::new(), true)
        };
        let colon_pos = self.expect(Tok::Colon, "':'")?;
        let stmts = self.stmt_list()?;
        let body_span = self.span_from(colon_pos.end);
        let body = self.a.stmt_lists.alloc(StmtList { stmts }, body_span);
        let clause = SwitchClause {
            items: self.a.list_exprs(items),
            is_default,
            colon_pos,
            body,
        };
        let span = self.span_from(start);
        Ok(self.a.switch_clauses.alloc(clause, span))
    }

    fn type_item(&mut self) -> PResult<ExprId> {
        let t = self.parse_type()?;
        let span = self.a.types.span(t);
        Ok(self.a.exprs.alloc(Expr::Type(t), span))
    }

    fn select_stmt(&mut self) -> PResult<StmtId> {
        let start = self.next().start;
        let l_brace = self.expect(Tok::LBrace, "'{'")?;
        let mut clauses = Vec::new();
        while matches!(self.tok(), Tok::KwCase | Tok::KwDefault) {
            clauses.push(self.comm_clause()?);
        }
        let r_brace = self.expect(Tok::RBrace, "'}'")?;
        let clauses = self.a.list_comm_clause_ids(clauses);
        let span = self.span_from(start);
        Ok(self.a.stmts.alloc(
            Stmt::Select {
                l_brace,
                clauses,
                r_brace,
            },
            span,
        ))
    }

    fn comm_clause(&mut self) -> PResult<CommClauseId> {
        let start = self.span().start;
        let comm = if self.got(Tok::KwCase).is_some() {
            let cstart = self.span().start;
            let lhs = self.expr_list()?;
            let s = match self.tok() {
                Tok::Arrow => {
                    if lhs.len() > 1 {
                        return Err(self.error_expected("1 expression"));
                    }
                    self.next();
                    let value = self.parse_expr()?;
                    SimpleStmt::Send {
                        chan: lhs[0],
                        value,
                    }
                }
                Tok::Assign | Tok::Define => {
                    let op = if self.at(Tok::Define) {
                        AssignOp::Define
                    } else {
                        AssignOp::Assign
                    };
                    if lhs.len() > 2 {
                        return Err(Diag::parse(
                            self.a.exprs.span(lhs[2]),
                            "expected 1 or 2 expressions",
                        ));
                    }
                    if op == AssignOp::Define {
                        self.check_define_lhs(&lhs)?;
                    }
                    let op_pos = self.next();
                    let rhs = self.parse_expr()?;
                    SimpleStmt::Assign {
                        lhs: self.a.list_exprs(lhs),
                        op,
                        op_pos,
                        rhs: self.a.list_exprs([rhs]),
                    }
                }
                _ => {
                    if lhs.len() > 1 {
                        return Err(self.error_expected("1 expression"));
                    }
                    SimpleStmt::Expr(lhs[0])
                }
            };
            let span = self.span_from(cstart);
            Some(self.a.simple_stmts.alloc(s, span))
        } else {
            self.expect(Tok::KwDefault, "'case' or 'default'")?;
            None
        };
        let colon_pos = self.expect(Tok::Colon, "':'")?;
        let stmts = self.stmt_list()?;
        let body_span = self.span_from(colon_pos.end);
        let body = self.a.stmt_lists.alloc(StmtList { stmts }, body_span);
        let span = self.span_from(start);
        Ok(self.a.comm_clauses.alloc(
            CommClause {
                comm,
                colon_pos,
                body,
            },
            span,
        ))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn expr_list(&mut self) -> PResult<Vec<ExprId>> {
        let mut list = vec![self.parse_expr()?];
        while self.got(Tok::Comma).is_some() {
            list.push(self.parse_expr()?);
        }
        Ok(list)
    }

    fn parse_expr(&mut self) -> PResult<ExprId> {
        self.binary_expr(1)
    }

    fn binary_expr(&mut self, prec1: u8) -> PResult<ExprId> {
        let start = self.span().start;
        let mut x = self.unary_expr()?;
        while let Some(op) = binary_op(self.tok()) {
            let prec = op.precedence();
            if prec < prec1 {
                break;
            }
            let op_pos = self.next();
            let right = self.binary_expr(prec + 1)?;
            let span = self.span_from(start);
            x = self.a.exprs.alloc(
                Expr::Binary {
                    left: x,
                    op,
                    op_pos,
                    right,
                },
                span,
            );
        }
        Ok(x)
    }

    fn unary_expr(&mut self) -> PResult<ExprId> {
        let start = self.span().start;
        let op = match self.tok() {
            Tok::Plus => UnaryOp::Add,
            Tok::Minus => UnaryOp::Sub,
            Tok::Bang => UnaryOp::Not,
            Tok::Caret => UnaryOp::Xor,
            Tok::Amp => UnaryOp::Addr,
            Tok::Tilde => UnaryOp::Tilde,
            Tok::Star => UnaryOp::Deref,
            Tok::Arrow if self.peek(1) == Tok::KwChan => {
                let t = self.parse_type()?;
                let span = self.a.types.span(t);
                let x = self.a.exprs.alloc(Expr::Type(t), span);
                return self.primary_suffix(x, start);
            }
            Tok::Arrow => UnaryOp::Recv,
            _ => return self.primary_expr(),
        };
        self.next();
        let expr = self.unary_expr()?;
        let span = self.span_from(start);
        Ok(self.a.exprs.alloc(Expr::Unary { op, expr }, span))
    }

    fn primary_expr(&mut self) -> PResult<ExprId> {
        let start = self.span().start;
        let x = self.operand()?;
        self.primary_suffix(x, start)
    }

    fn primary_suffix(&mut self, mut x: ExprId, start: u32) -> PResult<ExprId> {
        loop {
            let e = match self.tok() {
                Tok::Dot => {
                    self.next();
                    match self.tok() {
                        Tok::Ident(_) => {
                            let sel = self.ident()?;
                            Expr::Selector { expr: x, sel }
                        }
                        Tok::LParen => {
                            self.next();
                            let typ = if self.got(Tok::KwType).is_some() {
                                None
                            } else {
                                Some(self.nested(|p| p.parse_type())?)
                            };
                            self.expect(Tok::RParen, "')'")?;
                            Expr::TypeAssert { expr: x, typ }
                        }
                        _ => return Err(self.error_expected("selector or type assertion")),
                    }
                }
                Tok::LBrack => self.index_or_slice(x)?,
                Tok::LParen => self.call(x)?,
                Tok::LBrace if self.is_literal_type(x) => self.literal_value(Some(x))?,
                _ => return Ok(x),
            };
            let span = self.span_from(start);
            x = self.a.exprs.alloc(e, span);
        }
    }

    fn is_literal_type(&self, x: ExprId) -> bool {
        match self.a.exprs[x] {
            Expr::Ident(_) | Expr::Selector { .. } | Expr::Index { .. } => self.expr_lev >= 0,
            Expr::Type(t) => matches!(
                self.a.types[t],
                Type::Array { .. } | Type::Slice { .. } | Type::Struct { .. } | Type::Map { .. }
            ),
            _ => false,
        }
    }

    fn index_or_slice(&mut self, x: ExprId) -> PResult<Expr> {
        let lbrack = self.next();
        let e = self.nested(|p| {
            let mut idx: [Option<ExprId>; 3] = [None; 3];
            if !p.at(Tok::Colon) {
                idx[0] = Some(p.parse_expr()?);
            }

            if p.at(Tok::Comma) {
                let mut indices: Vec<ExprId> = idx[0].into_iter().collect();
                while p.got(Tok::Comma).is_some() {
                    if p.at(Tok::RBrack) {
                        break;
                    }
                    indices.push(p.parse_expr()?);
                }
                return Ok(Expr::Index {
                    expr: x,
                    indices: p.a.list_exprs(indices),
                });
            }

            let mut ncolons = 0;
            while p.at(Tok::Colon) && ncolons < 2 {
                let colon = p.next();
                ncolons += 1;
                if !p.at(Tok::Colon) && !p.at(Tok::RBrack) {
                    idx[ncolons] = Some(p.parse_expr()?);
                } else if ncolons == 2 {
                    return Err(Diag::parse(colon, "final index required in 3-index slice"));
                }
            }

            match (ncolons, idx[0]) {
                (0, Some(i)) => Ok(Expr::Index {
                    expr: x,
                    indices: p.a.list_exprs([i]),
                }),
                (0, None) => Err(Diag::parse(lbrack, "expected operand")),
                _ => {
                    if ncolons == 2 && idx[1].is_none() {
                        return Err(Diag::parse(lbrack, "middle index required in 3-index slice"));
                    }
                    Ok(Expr::Slice {
                        expr: x,
                        lo: idx[0],
                        hi: idx[1],
                        max: idx[2],
                        slice3: ncolons == 2,
                    })
                }
            }
        })?;
        self.expect(Tok::RBrack, "']'")?;
        Ok(e)
    }

    fn call(&mut self, fun: ExprId) -> PResult<Expr> {
        let l_paren = self.next();
        let (args, ellipsis) = self.nested(|p| {
            let mut args = Vec::new();
            let mut ellipsis = None;
            while !p.at(Tok::RParen) && !p.at(Tok::Eof) && ellipsis.is_none() {
                args.push(p.parse_expr()?);
                ellipsis = p.got(Tok::Ellipsis);
                if p.got(Tok::Comma).is_none() {
                    break;
                }
            }
            Ok((args, ellipsis))
        })?;
        let r_paren = self.expect(Tok::RParen, "')'")?;
        Ok(Expr::Call {
            fun,
            l_paren,
            args: self.a.list_exprs(args),
            ellipsis,
            r_paren,
        })
    }

    fn literal_value(&mut self, typ: Option<ExprId>) -> PResult<Expr> {
        let l_brace = self.next();
        let elems = self.nested(|p| {
            let mut elems = Vec::new();
            while !p.at(Tok::RBrace) && !p.at(Tok::Eof) {
                elems.push(p.element()?);
                if p.got(Tok::Comma).is_none() {
                    break;
                }
            }
            Ok(elems)
        })?;
        let r_brace = self.expect(Tok::RBrace, "',' or '}'")?;
        Ok(Expr::CompositeLit {
            typ,
            l_brace,
            elems: self.a.list_keyed_elems(elems),
            r_brace,
        })
    }

    fn element(&mut self) -> PResult<KeyedElement> {
        let x = self.element_value()?;
        if self.got(Tok::Colon).is_some() {
            let value = self.element_value()?;
            Ok(KeyedElement { key: Some(x), value })
        } else {
            Ok(KeyedElement { key: None, value: x })
        }
    }

    fn element_value(&mut self) -> PResult<ExprId> {
        if self.at(Tok::LBrace) {
            let start = self.span().start;
            let lit = self.literal_value(None)?;
            let span = self.span_from(start);
            Ok(self.a.exprs.alloc(lit, span))
        } else {
            self.parse_expr()
        }
    }

    fn operand(&mut self) -> PResult<ExprId> {
        let start = self.span().start;
        let kind = match self.tok() {
            Tok::IntLit(_) => Some(BasicLitKind::Int),
            Tok::FloatLit(_) => Some(BasicLitKind::Float),
            Tok::ImagLit(_) => Some(BasicLitKind::Imag),
            Tok::RuneLit(_) => Some(BasicLitKind::Rune),
            Tok::StringLit(_) | Tok::RawStringLit(_) => Some(BasicLitKind::String),
            _ => None,
        };
        if let Some(kind) = kind {
            let raw = self.next();
            return Ok(self.a.exprs.alloc(Expr::BasicLit(BasicLit { kind, raw }), raw));
        }

        let e = match self.tok() {
            Tok::Ident(_) => {
                let name = self.ident()?;
                return Ok(self.a.exprs.alloc(Expr::Ident(name), name.pos));
            }
            Tok::LParen => {
                self.next();
                let expr = self.nested(|p| p.parse_expr())?;
                self.expect(Tok::RParen, "')'")?;
                Expr::Paren { expr }
            }
            Tok::KwFunc => {
                let func_pos = self.next();
                let sig = self.signature()?;
                if self.at(Tok::LBrace) {
                    let body = self.nested(|p| p.block())?;
                    Expr::FuncLit { sig, body }
                } else {
                    let span = self.span_from(func_pos.start);
                    Expr::Type(self.a.types.alloc(Type::Func { sig }, span))
                }
            }
            Tok::LBrack | Tok::KwStruct | Tok::KwMap | Tok::KwChan | Tok::KwInterface => {
                Expr::Type(self.parse_type()?)
            }
            _ => return Err(self.error_expected("operand")),
        };
        let span = self.span_from(start);
        Ok(self.a.exprs.alloc(e, span))
    }
}

// =============================================================================
// Token helpers
// =============================================================================

fn starts_type(t: Tok<'_>) -> bool {
    matches!(
        t,
        Tok::Ident(_)
            | Tok::LBrack
            | Tok::Star
            | Tok::Arrow
            | Tok::KwFunc
            | Tok::KwMap
            | Tok::KwChan
            | Tok::KwStruct
            | Tok::KwInterface
    )
}

fn assign_op(t: Tok<'_>) -> Option<AssignOp> {
    Some(match t {
        Tok::Assign => AssignOp::Assign,
        Tok::Define => AssignOp::Define,
        Tok::AddAssign => AssignOp::AddAssign,
        Tok::SubAssign => AssignOp::SubAssign,
        Tok::MulAssign => AssignOp::MulAssign,
        Tok::DivAssign => AssignOp::DivAssign,
        Tok::ModAssign => AssignOp::ModAssign,
        Tok::AndAssign => AssignOp::AndAssign,
        Tok::OrAssign => AssignOp::OrAssign,
        Tok::XorAssign => AssignOp::XorAssign,
        Tok::ShlAssign => AssignOp::ShlAssign,
        Tok::ShrAssign => AssignOp::ShrAssign,
        Tok::AndNotAssign => AssignOp::AndNotAssign,
        _ => return None,
    })
}

fn binary_op(t: Tok<'_>) -> Option<BinaryOp> {
    Some(match t {
        Tok::Plus => BinaryOp::Add,
        Tok::Minus => BinaryOp::Sub,
        Tok::Star => BinaryOp::Mul,
        Tok::Slash => BinaryOp::Div,
        Tok::Percent => BinaryOp::Mod,
        Tok::Amp => BinaryOp::And,
        Tok::Pipe => BinaryOp::Or,
        Tok::Caret => BinaryOp::Xor,
        Tok::Shl => BinaryOp::Shl,
        Tok::Shr => BinaryOp::Shr,
        Tok::AndNot => BinaryOp::AndNot,
        Tok::LAnd => BinaryOp::LAnd,
        Tok::LOr => BinaryOp::LOr,
        Tok::EqEq => BinaryOp::Eq,
        Tok::NotEq => BinaryOp::Ne,
        Tok::Lt => BinaryOp::Lt,
        Tok::Le => BinaryOp::Le,
        Tok::Gt => BinaryOp::Gt,
        Tok::Ge => BinaryOp::Ge,
        _ => return None,
    })
}

/// Token as shown in "expected X, found Y" messages.
fn describe(t: Tok<'_>, span: Span) -> String {
    let text = match t {
        Tok::Ident(s)
        | Tok::IntLit(s)
        | Tok::FloatLit(s)
        | Tok::ImagLit(s)
        | Tok::RuneLit(s)
        | Tok::StringLit(s)
        | Tok::RawStringLit(s) => return s.to_string(),
        Tok::Semi if span.is_empty() => return "newline".to_string(),
        Tok::Eof => return "EOF".to_string(),
        Tok::Error => return "invalid token".to_string(),
        Tok::KwBreak => "break",
        Tok::KwCase => "case",
        Tok::KwChan => "chan",
        Tok::KwConst => "const",
        Tok::KwContinue => "continue",
        Tok::KwDefault => "default",
        Tok::KwDefer => "defer",
        Tok::KwElse => "else",
        Tok::KwFallthrough => "fallthrough",
        Tok::KwFor => "for",
        Tok::KwFunc => "func",
        Tok::KwGo => "go",
        Tok::KwGoto => "goto",
        Tok::KwIf => "if",
        Tok::KwImport => "import",
        Tok::KwInterface => "interface",
        Tok::KwMap => "map",
        Tok::KwPackage => "package",
        Tok::KwRange => "range",
        Tok::KwReturn => "return",
        Tok::KwSelect => "select",
        Tok::KwStruct => "struct",
        Tok::KwSwitch => "switch",
        Tok::KwType => "type",
        Tok::KwVar => "var",
        Tok::Ellipsis => "...",
        Tok::ShlAssign => "<<=",
        Tok::ShrAssign => ">>=",
        Tok::AndNotAssign => "&^=",
        Tok::AddAssign => "+=",
        Tok::SubAssign => "-=",
        Tok::MulAssign => "*=",
        Tok::DivAssign => "/=",
        Tok::ModAssign => "%=",
        Tok::AndAssign => "&=",
        Tok::OrAssign => "|=",
        Tok::XorAssign => "^=",
        Tok::Shl => "<<",
        Tok::Shr => ">>",
        Tok::AndNot => "&^",
        Tok::LAnd => "&&",
        Tok::LOr => "||",
        Tok::EqEq => "==",
        Tok::NotEq => "!=",
        Tok::Le => "<=",
        Tok::Ge => ">=",
        Tok::Inc => "++",
        Tok::Dec => "--",
        Tok::Define => ":=",
        Tok::Arrow => "<-",
        Tok::Assign => "=",
        Tok::Plus => "+",
        Tok::Minus => "-",
        Tok::Star => "*",
        Tok::Slash => "/",
        Tok::Percent => "%",
        Tok::Amp => "&",
        Tok::Pipe => "|",
        Tok::Caret => "^",
        Tok::Tilde => "~",
        Tok::Bang => "!",
        Tok::Lt => "<",
        Tok::Gt => ">",
        Tok::LParen => "(",
        Tok::RParen => ")",
        Tok::LBrack => "[",
        Tok::RBrack => "]",
        Tok::LBrace => "{",
        Tok::RBrace => "}",
        Tok::Comma => ",",
        Tok::Semi => ";",
        Tok::Colon => ":",
        Tok::Dot => ".",
    };
    format!("'{text}'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> ParsedFile {
        match parse_file(src) {
            Ok(f) => f,
            Err(e) => panic!("{src:?}: {:?}", e.diags),
        }
    }

    fn first_message(src: &str) -> String {
        match parse_file(src) {
            Ok(_) => panic!("{src:?} parsed"),
            Err(e) => e.diags[0].message.clone(),
        }
    }

    fn body(p: &ParsedFile) -> Vec<StmtId> {
        let decls = p.arena.top_decls(p.file.decls);
        let Some(TopLevelDecl::Func(f)) = decls.last() else {
            panic!("no func");
        };
        let Some(b) = p.arena.funcs[*f].body else {
            panic!("no body");
        };
        p.arena.stmt_list(b.stmts).to_vec()
    }

    #[test]
    fn parses_assignments_and_declarations() {
        let p = parse("package p\n\nfunc f() {\n\tx := 1\n\ta, b = b, a\n\tvar c int\n}\n");
        let stmts = body(&p);
        assert_eq!(stmts.len(), 3);
        let Stmt::Simple(s) = p.arena.stmts[stmts[0]] else { panic!() };
        assert!(matches!(p.arena.simple_stmts[s], SimpleStmt::Assign { op: AssignOp::Define, .. }));
        assert!(matches!(p.arena.stmts[stmts[2]], Stmt::Decl(_)));
    }

    #[test]
    fn composite_literals_are_not_allowed_in_headers() {
        let p = parse("package p\n\nfunc f() {\n\tif x == y {\n\t}\n\tfor _, v := range []T{a} {\n\t}\n}\n");
        let stmts = body(&p);
        assert!(matches!(p.arena.stmts[stmts[0]], Stmt::If { .. }));
        assert!(matches!(
            p.arena.stmts[stmts[1]],
            Stmt::For { kind: ForKind::Range { op: Some(AssignOp::Define), .. }, .. }
        ));
    }

    #[test]
    fn labels_wrap_the_following_statement() {
        let p = parse("package p\n\nfunc f() {\nouter:\n\tfor {\n\t\tbreak outer\n\t}\n}\n");
        let stmts = body(&p);
        let Stmt::Labeled { stmt, .. } = p.arena.stmts[stmts[0]] else { panic!() };
        assert!(matches!(p.arena.stmts[stmt], Stmt::For { kind: ForKind::Infinite, .. }));
    }

    #[test]
    fn type_switches_and_selects() {
        let p = parse(
            "package p\n\nfunc f() {\n\tswitch v := x.(type) {\n\tcase int, nil:\n\t}\n\tselect {\n\tcase v, ok := <-ch:\n\tdefault:\n\t}\n}\n",
        );
        let stmts = body(&p);
        assert!(matches!(p.arena.stmts[stmts[0]], Stmt::TypeSwitch { .. }));
        let Stmt::Select { clauses, .. } = p.arena.stmts[stmts[1]] else { panic!() };
        assert_eq!(p.arena.comm_clause_ids(clauses).len(), 2);
    }

    #[test]
    fn generics() {
        parse("package p\n\ntype List[T any] struct {\n\tnext *List[T]\n\tval  T\n}\n\nfunc Map[K comparable, V any](m map[K]V, f func(V) V) List[V] {\n\treturn List[V]{}\n}\n\ntype Number interface {\n\t~int | ~float64\n}\n\ntype A [N]int\n");
    }

    #[test]
    fn rejects_define_with_non_names() {
        assert_eq!(
            first_message("package p\n\nfunc f() {\n\ta.b := 1\n}\n"),
            "non-name on left side of :="
        );
    }

    #[test]
    fn rejects_plain_assignment_in_type_switch_guard() {
        assert_eq!(
            first_message("package p\n\nfunc f() {\n\tswitch v = x.(type) {\n\t}\n}\n"),
            "expected ':=', found '='"
        );
    }

    #[test]
    fn reports_the_found_token() {
        assert_eq!(
            first_message("package p\n\nfunc f() {\n\tx = \n}\n"),
            "expected operand, found '}'"
        );
    }
}
