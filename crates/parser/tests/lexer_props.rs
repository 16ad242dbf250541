use gocolon_parser::lexer::{Lexer, Tok};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]
    #[test]
    fn spans_stay_in_bounds_and_advance(s in ".*") {
        let mut lx = Lexer::new(&s);
        let toks = lx.tokenize();

        let mut last_end = 0usize;
        for &(start, tok, end) in &toks {
            prop_assert!(start <= end, "({start},{end}) {tok:?} in {s:?}");
            prop_assert!(end <= s.len(), "({start},{end}) {tok:?} in {s:?}");
            prop_assert!(start >= last_end, "{tok:?} at {start} overlaps {last_end} in {s:?}");
            last_end = end;
        }
        prop_assert!(matches!(toks.last(), Some((_, Tok::Eof, _))));
        prop_assert!(toks.len() <= s.len() * 2 + 2);
    }

    #[test]
    fn go_like_input_never_panics(s in "[a-z:=,;(){}\\[\\] \n\t0-9+*/\"._-]{0,64}") {
        let _ = gocolon_parser::parse_file(&s);
    }
}
