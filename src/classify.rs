use gocolon_parser::ast::{AstArena, Expr, ExprId, IdentName};
use smallvec::SmallVec;

/// Role of one assignment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// `_`, or a missing range key/value
    Ignored,
    /// Marked name, with the marker already removed
    Declare(IdentName),
    /// Existing name or any other target expression
    Reassign(ExprId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub entries: SmallVec<[Entry; 4]>,
    pub declare: usize,
    pub reassign: usize,
}

impl Classification {
    #[inline]
    pub fn is_mixed(&self) -> bool {
        self.declare > 0 && self.reassign > 0
    }
}

/// Classifies the targets of an assignment, range clause or receive clause.
///
/// Marked names lose their `:` here, in the tree itself; any marker left
/// after classification is misplaced.
pub fn classify(a: &mut AstArena, lhs: &[Option<ExprId>]) -> Classification {
    let mut c = Classification::default();
    for &target in lhs {
        let entry = match target.map(|e| (e, a.exprs[e])) {
            None => Entry::Ignored,
            Some((e, Expr::Ident(ident))) => {
                let name = a.name(ident);
                if let Some(plain) = name.strip_prefix(':') {
                    let plain = plain.to_owned();
                    let ident = IdentName {
                        sym: a.symbols.intern(&plain),
                        ..ident
                    };
                    a.exprs[e] = Expr::Ident(ident);
                    Entry::Declare(ident)
                } else if name == "_" {
                    Entry::Ignored
                } else {
                    Entry::Reassign(e)
                }
            }
            Some((e, _)) => Entry::Reassign(e),
        };
        match entry {
            Entry::Declare(_) => c.declare += 1,
            Entry::Reassign(_) => c.reassign += 1,
            Entry::Ignored => {}
        }
        c.entries.push(entry);
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use gocolon_parser::ast::Span;

    fn targets(a: &mut AstArena, names: &[&str]) -> Vec<Option<ExprId>> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| match *n {
                "" => None,
                "a.b" => {
                    let x = a.ident_expr("a", Span::new(i * 4, i * 4 + 1));
                    let sel = IdentName {
                        sym: a.symbols.intern("b"),
                        pos: Span::new(i * 4 + 2, i * 4 + 3),
                    };
                    Some(a.exprs.alloc(Expr::Selector { expr: x, sel }, Span::new(i * 4, i * 4 + 3)))
                }
                n => Some(a.ident_expr(n, Span::new(i * 4, i * 4 + n.len()))),
            })
            .collect()
    }

    #[test]
    fn counts_declarations_and_reassignments() {
        let mut a = AstArena::new();
        let lhs = targets(&mut a, &[":n", "err", "_", "a.b"]);
        let c = classify(&mut a, &lhs);
        assert_eq!((c.declare, c.reassign), (1, 2));
        assert!(c.is_mixed());
        assert!(matches!(c.entries[0], Entry::Declare(n) if a.name(n) == "n"));
        assert_eq!(c.entries[1], Entry::Reassign(lhs[1].unwrap()));
        assert_eq!(c.entries[2], Entry::Ignored);
        assert!(matches!(c.entries[3], Entry::Reassign(_)));
    }

    #[test]
    fn strips_markers_in_the_tree() {
        let mut a = AstArena::new();
        let lhs = targets(&mut a, &[":x"]);
        classify(&mut a, &lhs);
        let x = lhs[0].unwrap();
        assert!(matches!(a.exprs[x], Expr::Ident(n) if a.name(n) == "x"));
    }

    #[test]
    fn missing_range_targets_are_ignored() {
        let mut a = AstArena::new();
        let lhs = targets(&mut a, &["", ":v"]);
        let c = classify(&mut a, &lhs);
        assert_eq!(c.entries[0], Entry::Ignored);
        assert_eq!((c.declare, c.reassign), (1, 0));
        assert!(!c.is_mixed());
    }

    #[test]
    fn other_occurrences_of_a_marked_name_keep_the_marker() {
        let mut a = AstArena::new();
        let lhs = targets(&mut a, &[":x"]);
        let other = a.ident_expr(":x", Span::new(20, 22));
        classify(&mut a, &lhs);
        assert!(matches!(a.exprs[other], Expr::Ident(n) if a.name(n) == ":x"));
    }
}
