use crate::ast::{self, Span};

/// One comma-separated entry of a parameter or type parameter list, before
/// names and types are grouped.
///
/// - `name` without `typ`: a bare identifier; a name or a type depending on
///   the rest of the list.
/// - `name` with `typ`: `x int`.
/// - `typ` only: `[]int`, `pkg.T`, `...string`.
#[derive(Clone, Copy, Debug)]
pub struct ParamDecl {
    pub name: Option<ast::IdentName>,
    pub ellipsis: Option<Span>,
    pub typ: Option<ast::TypeId>,
    pub span: Span,
}

/// Groups a parsed parameter list into fields.
///
/// If any entry is `name Type`, bare identifiers are names sharing the type
/// of the next typed entry (`a, b int`). Otherwise every entry is a type
/// (`(int, error)`, `(T, U)`).
pub fn resolve_param_list(arena: &mut ast::AstArena, params: Vec<ParamDecl>) -> Vec<ast::FieldId> {
    let named = params.iter().any(|p| p.name.is_some() && p.typ.is_some());
    let mut out = Vec::with_capacity(params.len());

    if !named {
        for p in params {
            let typ = match (p.typ, p.name) {
                (Some(t), _) => t,
                (None, Some(name)) => named_type_from_ident(arena, name),
                (None, None) => continue,
            };
            let field = ast::Field {
                names: ast::ListRef::EMPTY,
                ellipsis: p.ellipsis,
                typ,
                tag: None,
            };
            out.push(arena.fields.alloc(field, p.span));
        }
        return out;
    }

    let mut pending: Vec<ast::IdentName> = Vec::new();
    let mut pending_start: Option<u32> = None;

    for p in params {
        match (p.name, p.typ) {
            (Some(name), None) => {
                if pending.is_empty() {
                    pending_start = Some(p.span.start);
                }
                pending.push(name);
            }
            (name, Some(typ)) => {
                if name.is_none() {
                    // A bare type in a named list: earlier identifiers stand alone.
                    flush_as_types(arena, &mut pending, &mut out);
                    pending_start = None;
                }
                pending.extend(name);
                let start = pending_start.take().unwrap_or(p.span.start);
                let names = arena.list_ident_names(pending.drain(..));
                let field = ast::Field {
                    names,
                    ellipsis: p.ellipsis,
                    typ,
                    tag: None,
                };
                out.push(arena.fields.alloc(field, Span { start, end: p.span.end }));
            }
            (None, None) => {}
        }
    }

    flush_as_types(arena, &mut pending, &mut out);
    out
}

fn flush_as_types(
    arena: &mut ast::AstArena,
    pending: &mut Vec<ast::IdentName>,
    out: &mut Vec<ast::FieldId>,
) {
    for name in pending.drain(..) {
        let typ = named_type_from_ident(arena, name);
        let field = ast::Field {
            names: ast::ListRef::EMPTY,
            ellipsis: None,
            typ,
            tag: None,
        };
        out.push(arena.fields.alloc(field, name.pos));
    }
}

pub fn named_type_from_ident(arena: &mut ast::AstArena, name: ast::IdentName) -> ast::TypeId {
    arena.types.alloc(
        ast::Type::Named {
            pkg: None,
            name,
            args: ast::ListRef::EMPTY,
        },
        name.pos,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstArena, IdentName, Type};

    fn ident(a: &mut AstArena, s: &str, at: usize) -> IdentName {
        IdentName {
            sym: a.symbols.intern(s),
            pos: Span::new(at, at + s.len()),
        }
    }

    #[test]
    fn groups_names_with_the_following_type() {
        let mut a = AstArena::new();
        let x = ident(&mut a, "x", 0);
        let y = ident(&mut a, "y", 3);
        let int = ident(&mut a, "int", 5);
        let int_t = named_type_from_ident(&mut a, int);
        let params = vec![
            ParamDecl { name: Some(x), ellipsis: None, typ: None, span: x.pos },
            ParamDecl { name: Some(y), ellipsis: None, typ: Some(int_t), span: Span::new(3, 8) },
        ];
        let fields = resolve_param_list(&mut a, params);
        assert_eq!(fields.len(), 1);
        let f = a.fields[fields[0]];
        assert_eq!(a.ident_names(f.names).len(), 2);
        assert_eq!(a.fields.span(fields[0]), Span::new(0, 8));
    }

    #[test]
    fn bare_identifiers_are_types_in_unnamed_lists() {
        let mut a = AstArena::new();
        let int = ident(&mut a, "int", 1);
        let err = ident(&mut a, "error", 6);
        let params = vec![
            ParamDecl { name: Some(int), ellipsis: None, typ: None, span: int.pos },
            ParamDecl { name: Some(err), ellipsis: None, typ: None, span: err.pos },
        ];
        let fields = resolve_param_list(&mut a, params);
        assert_eq!(fields.len(), 2);
        for id in fields {
            let f = a.fields[id];
            assert!(f.names.is_empty());
            assert!(matches!(a.types[f.typ], Type::Named { .. }));
        }
    }
}
