use gocolon_parser::error::{Diag, DiagKind};
use gocolon_parser::lexer::{Lexer, Tok};

fn lex_all(input: &str) -> (Vec<(usize, Tok<'_>, usize)>, Vec<Diag>) {
    let mut lx = Lexer::new(input);
    let toks: Vec<_> = lx.by_ref().collect();
    let diags = lx.take_diags();
    (toks, diags)
}

fn toks(input: &str) -> Vec<Tok<'_>> {
    lex_all(input).0.into_iter().map(|(_, t, _)| t).collect()
}

/// Positions of semicolons inserted at line ends (zero-width).
fn injected_semis(input: &str) -> Vec<usize> {
    lex_all(input)
        .0
        .into_iter()
        .filter(|(s, t, e)| matches!(t, Tok::Semi) && s == e)
        .map(|(s, _, _)| s)
        .collect()
}

#[test]
fn colon_and_name_are_separate_tokens() {
    assert_eq!(
        toks(":x = 1"),
        vec![Tok::Colon, Tok::Ident("x"), Tok::Assign, Tok::IntLit("1"), Tok::Semi]
    );
}

#[test]
fn define_is_a_single_token() {
    assert_eq!(
        toks("a := b"),
        vec![Tok::Ident("a"), Tok::Define, Tok::Ident("b"), Tok::Semi]
    );
}

#[test]
fn colon_spans_are_adjacent_to_the_name() {
    let (toks, _) = lex_all("f(:a, : b)");
    let colons: Vec<_> = toks.iter().filter(|t| t.1 == Tok::Colon).collect();
    assert_eq!(colons.len(), 2);
    assert_eq!(colons[0].2, 3);
    assert_eq!(toks[3].0, 3);
    assert_eq!(colons[1].2, 7);
    assert_eq!(toks[6].0, 8);
}

#[test]
fn semicolons_follow_go_insertion_rules() {
    assert_eq!(injected_semis("x\ny"), [1, 3]);
    assert_eq!(injected_semis("return\nx"), [6, 8]);
    assert_eq!(injected_semis("if\nx"), [4]);
    assert_eq!(injected_semis("x/*\n*/y"), [3, 7]);
    assert_eq!(injected_semis("a[0]\n:b = 1"), [4, 11]);
    assert_eq!(injected_semis("x = \n1"), [6]);
}

#[test]
fn multibyte_identifiers_are_single_tokens() {
    assert_eq!(toks("ꞏdecl_x"), vec![Tok::Ident("ꞏdecl_x"), Tok::Semi]);
    assert_eq!(toks("ꞏtmp0"), vec![Tok::Ident("ꞏtmp0"), Tok::Semi]);
}

#[test]
fn comments_are_recorded_outside_the_stream() {
    let mut lx = Lexer::new("a // one\nb /* two */");
    let toks = lx.tokenize();
    let comments = lx.take_comments();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].span.start, 2);
    assert_eq!(comments[1].span.end, 20);
    assert_eq!(toks.last().map(|t| t.1), Some(Tok::Eof));
}

#[test]
fn unterminated_comment_is_reported() {
    let (toks, diags) = lex_all("x /* never closed");
    assert!(toks.iter().any(|(_, t, _)| *t == Tok::Error));
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, DiagKind::Lex);
    assert_eq!(diags[0].message, "unterminated comment");
}

#[test]
fn invalid_numbers_are_reported() {
    let (_, diags) = lex_all("x = 0b12");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "invalid numeric literal");
}

#[test]
fn stray_characters_are_invalid_tokens() {
    let (toks, diags) = lex_all("a $ b");
    assert_eq!(toks[1].1, Tok::Error);
    assert_eq!(diags[0].message, "invalid token");
}
