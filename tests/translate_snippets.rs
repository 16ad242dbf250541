use gocolon::{translate, DiagnosticKind, TranslateError, Translation};
use proptest::prelude::*;

fn unit(body: &str) -> String {
    format!("package p\n\nfunc f() {{\n{body}}}\n")
}

fn run(src: &str) -> Translation {
    translate("x.colon", src.as_bytes()).unwrap()
}

fn translated(body: &str) -> String {
    String::from_utf8_lossy(&run(&unit(body)).translated).into_owned()
}

fn rejected(src: &str) -> TranslateError {
    translate("x.colon", src.as_bytes()).unwrap_err()
}

/// `line:column: message` of every diagnostic.
fn errors(src: &str) -> Vec<String> {
    rejected(src)
        .diagnostics()
        .iter()
        .map(|d| format!("{}:{}: {}", d.line, d.column, d.message))
        .collect()
}

#[test]
fn marker_free_input_round_trips() {
    let src = r#"package main

import "fmt"

var xs = []int{1, 2, 3}

func main() {
	var t, n int
	for _, n = range xs {
		t += n
	}
	if t > 3 {
		fmt.Println(t, xs[1:2], map[string]int{"a": 1})
	}
	switch {
	case t > 1:
		t = 0
	}
}
"#;
    let out = run(src);
    assert_eq!(String::from_utf8_lossy(&out.formatted), src);
    assert_eq!(out.translated, out.formatted);
}

#[test]
fn declarations_become_var_statements() {
    assert_eq!(
        translated("\t:x = 1\n\t:a, :b = g()\n\t:y, _ = h()\n"),
        unit("\tvar x = 1\n\tvar a, b = g()\n\tvar y, _ = h()\n")
    );
}

#[test]
fn formatted_output_keeps_markers() {
    let out = run(&unit("\t:x=1\n\t:n,  err = f()\n"));
    assert_eq!(
        String::from_utf8_lossy(&out.formatted),
        unit("\t:x = 1\n\t:n, err = f()\n")
    );
}

#[test]
fn mixed_assignments_go_through_temporaries() {
    assert_eq!(
        translated("\t:n, err = f()\n"),
        unit("\tꞏtmp0, ꞏtmp1 := f()\n\tvar n = ꞏtmp0\n\terr = ꞏtmp1\n")
    );
}

#[test]
fn temporaries_are_numbered_across_statements() {
    assert_eq!(
        translated("\t:n, err = f()\n\ts.x, :m, _ = g()\n"),
        unit(concat!(
            "\tꞏtmp0, ꞏtmp1 := f()\n",
            "\tvar n = ꞏtmp0\n",
            "\terr = ꞏtmp1\n",
            "\tꞏtmp2, ꞏtmp3, _ := g()\n",
            "\ts.x = ꞏtmp2\n",
            "\tvar m = ꞏtmp3\n",
        ))
    );
}

#[test]
fn follow_ups_stay_in_the_enclosing_block() {
    assert_eq!(
        translated("\tif ok {\n\t\t:n, err = f()\n\t}\n\tdone()\n"),
        unit(concat!(
            "\tif ok {\n",
            "\t\tꞏtmp0, ꞏtmp1 := f()\n",
            "\t\tvar n = ꞏtmp0\n",
            "\t\terr = ꞏtmp1\n",
            "\t}\n",
            "\tdone()\n",
        ))
    );
}

#[test]
fn header_declarations_use_define() {
    assert_eq!(
        translated("\tif :n, :err = f(); err != nil {\n\t\treturn\n\t}\n"),
        unit("\tif n, err := f(); err != nil {\n\t\treturn\n\t}\n")
    );
    assert_eq!(
        translated("\tfor :i = 0; i < 3; i++ {\n\t}\n"),
        unit("\tfor i := 0; i < 3; i++ {\n\t}\n")
    );
    assert_eq!(
        translated("\tswitch :x = f(); x {\n\t}\n"),
        unit("\tswitch x := f(); x {\n\t}\n")
    );
}

#[test]
fn header_declarations_may_ignore_targets() {
    assert_eq!(
        translated("\tif _, :ok = m[k]; ok {\n\t}\n"),
        unit("\tif _, ok := m[k]; ok {\n\t}\n")
    );
}

#[test]
fn mixed_header_is_rejected() {
    let src = unit("\tif :n, err = f(); err != nil {\n\t}\n");
    assert_eq!(errors(&src), ["4:5: mixed assignment in init statement"]);
    let e = rejected(&src);
    assert!(matches!(e, TranslateError::Rejected(_)));
    assert_eq!(e.diagnostics()[0].kind, DiagnosticKind::Translate);
    assert_eq!(
        e.to_string(),
        "x.colon:4:5: mixed assignment in init statement"
    );
}

#[test]
fn range_clauses() {
    assert_eq!(
        translated("\tfor :k, :v = range m {\n\t}\n\tfor :i = range xs {\n\t}\n"),
        unit("\tfor k, v := range m {\n\t}\n\tfor i := range xs {\n\t}\n")
    );
    assert_eq!(
        translated("\tfor _, :v = range m {\n\t}\n"),
        unit("\tfor _, v := range m {\n\t}\n")
    );
    assert_eq!(
        errors(&unit("\tfor :k, v = range m {\n\t}\n")),
        ["4:2: mixed assignment in range"]
    );
}

#[test]
fn select_receive_clauses() {
    assert_eq!(
        translated("\tselect {\n\tcase :v, :ok = <-c:\n\t\tuse(v, ok)\n\tcase :w = <-c:\n\t\tuse(w)\n\t}\n"),
        unit("\tselect {\n\tcase v, ok := <-c:\n\t\tuse(v, ok)\n\tcase w := <-c:\n\t\tuse(w)\n\t}\n")
    );
    assert_eq!(
        errors(&unit("\tselect {\n\tcase :v, ok = <-c:\n\t}\n")),
        ["5:7: mixed assignment in init statement"]
    );
}

#[test]
fn declarations_inside_select_bodies_are_statements() {
    assert_eq!(
        translated("\tselect {\n\tcase <-c:\n\t\t:x = 1\n\t}\n"),
        unit("\tselect {\n\tcase <-c:\n\t\tvar x = 1\n\t}\n")
    );
}

#[test]
fn type_switch_guard() {
    assert_eq!(
        translated("\tswitch :t = v.(type) {\n\tcase int:\n\t\t_ = t\n\t}\n"),
        unit("\tswitch t := v.(type) {\n\tcase int:\n\t\t_ = t\n\t}\n")
    );
}

#[test]
fn labeled_statements() {
    assert_eq!(
        translated("L:\n\t:x = 1\n"),
        unit("L:\n\tvar x = 1\n")
    );
    assert_eq!(
        translated("L:\n\t:n, err = f()\n\tuse(n)\n"),
        unit(concat!(
            "L:\n",
            "\tꞏtmp0, ꞏtmp1 := f()\n",
            "\tvar n = ꞏtmp0\n",
            "\terr = ꞏtmp1\n",
            "\tuse(n)\n",
        ))
    );
}

#[test]
fn nested_labels_anchor_follow_ups_after_the_outer_label() {
    assert_eq!(
        translated("A:\nB:\n\t:n, err = f()\n"),
        unit(concat!(
            "A:\n",
            "B:\n",
            "\tꞏtmp0, ꞏtmp1 := f()\n",
            "\tvar n = ꞏtmp0\n",
            "\terr = ꞏtmp1\n",
        ))
    );
}

#[test]
fn trailing_comment_stays_on_the_split_assignment() {
    assert_eq!(
        translated("\t:n, err = f() // note\n\tuse(n)\n"),
        unit(concat!(
            "\tꞏtmp0, ꞏtmp1 := f() // note\n",
            "\tvar n = ꞏtmp0\n",
            "\terr = ꞏtmp1\n",
            "\tuse(n)\n",
        ))
    );
}

#[test]
fn markers_on_compound_assignments_are_rejected() {
    assert_eq!(
        errors(&unit("\t:x, y <<= 1, 2\n")),
        ["4:2: colon-prefix in compound assignment"]
    );
}

#[test]
fn parse_errors_name_markers_as_written() {
    assert_eq!(
        errors(&unit("\tx = T{k:v, j:w}\n")),
        ["4:9: expected ',' or '}', found :v"]
    );
}

#[test]
fn unexpected_markers_are_rejected() {
    assert_eq!(
        errors(&unit("\tg(:a, b)\n")),
        ["4:4: unexpected colon-prefix"]
    );
}

#[test]
fn every_error_is_reported_in_input_order() {
    let src = unit("\tg(:a, b)\n\tif :n, err = f(); ok {\n\t}\n");
    assert_eq!(
        errors(&src),
        [
            "4:4: unexpected colon-prefix",
            "5:5: mixed assignment in init statement",
        ]
    );
}

#[test]
fn reserved_define_is_rejected() {
    let src = unit("\tx := 1\n\ty := 2\n");
    let e = rejected(&src);
    assert!(e.diagnostics().iter().all(|d| d.kind == DiagnosticKind::Lex));
    assert_eq!(
        errors(&src),
        [
            r#"4:4: reserved token ":=" in input"#,
            r#"5:4: reserved token ":=" in input"#,
        ]
    );
}

#[test]
fn parse_errors_point_into_the_input() {
    let e = rejected(&unit("\t:abc = )\n"));
    assert!(matches!(e, TranslateError::Parse(_)));
    let d = &e.diagnostics()[0];
    assert_eq!((d.line, d.column, d.kind), (4, 9, DiagnosticKind::Parse));
}

#[test]
fn invalid_utf8_is_rejected() {
    let e = translate("x.colon", b"package p\n\xff\n").err();
    assert!(matches!(e, Some(TranslateError::Encoding { .. })));
}

#[test]
fn declaration_only_output_is_a_fixed_point() {
    let once = run(&unit("\t:x = 1\n\t:a, :b = g()\n\tx, a = a, x\n"));
    let twice = run(&String::from_utf8_lossy(&once.translated));
    assert_eq!(twice.translated, once.translated);
    assert_eq!(twice.formatted, once.translated);
}

fn name() -> impl Strategy<Value = String> {
    "x[a-z0-9_]{0,6}"
}

proptest! {
    #[test]
    fn never_panics(src in "\\PC{0,200}") {
        let _ = translate("fuzz.colon", src.as_bytes());
    }

    #[test]
    fn never_panics_on_marker_soup(
        parts in proptest::collection::vec(
            prop_oneof![
                Just(":"), Just(":x"), Just("="), Just(","), Just(" "),
                Just("\n"), Just("{"), Just("}"), Just("if "), Just("for "),
                Just("range "), Just("case "), Just("select "), Just("f()"),
            ],
            0..40,
        )
    ) {
        let body: String = parts.concat();
        let _ = translate("fuzz.colon", unit(&body).as_bytes());
    }

    #[test]
    fn plain_assignments_round_trip(names in proptest::collection::vec(name(), 1..6)) {
        let body: String = names.iter().map(|n| format!("\t{n} = {n}\n")).collect();
        let out = run(&unit(&body));
        prop_assert_eq!(&out.translated, &out.formatted);
        prop_assert_eq!(String::from_utf8_lossy(&out.translated), unit(&body));
    }

    #[test]
    fn declarations_become_vars(names in proptest::collection::vec(name(), 1..6)) {
        let body: String = names.iter().map(|n| format!("\t:{n} = 1\n")).collect();
        let want: String = names.iter().map(|n| format!("\tvar {n} = 1\n")).collect();
        let out = run(&unit(&body));
        prop_assert_eq!(String::from_utf8_lossy(&out.translated), unit(&want));
    }
}
