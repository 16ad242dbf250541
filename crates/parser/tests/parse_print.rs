use gocolon_parser::{parse_file, print_file};

fn fmt(src: &str) -> String {
    let parsed = parse_file(src).unwrap_or_else(|e| panic!("{src:?}: {:?}", e.diags));
    print_file(&parsed.arena, &parsed.file, src)
}

#[test]
fn canonical_program_is_unchanged() {
    let src = r#"package main

import (
	"fmt"
	"strings"
)

// Point is a position.
type Point struct {
	X, Y int
}

func (p *Point) Move(dx, dy int) {
	p.X += dx
	p.Y += dy
}

func main() {
	pts := []Point{{1, 2}, {3, 4}}
	for i, p := range pts {
		fmt.Println(i, p.X*2+p.Y)
	}
	var sb strings.Builder
	sb.WriteString("done")
	ok := len(pts) > 1 &&
		sb.Len() > 0
	switch n := len(pts); {
	case n > 1 && ok:
		fmt.Println(sb.String())
	}
}
"#;
    assert_eq!(fmt(src), src);
}

#[test]
fn spacing_and_blank_lines_are_normalized() {
    let src = "package p\nfunc f( a int ,b int )int{\nx:=a+b\n\n\n\nreturn x\n}\n";
    assert_eq!(
        fmt(src),
        "package p\n\nfunc f(a int, b int) int {\n\tx := a + b\n\n\treturn x\n}\n"
    );
}

#[test]
fn trailing_comments_align_across_statements() {
    let src = "package p\n\nfunc f() {\n\tx := 1 // one\n\tlonger := 2 // two\n}\n";
    assert_eq!(
        fmt(src),
        "package p\n\nfunc f() {\n\tx := 1      // one\n\tlonger := 2 // two\n}\n"
    );
}

#[test]
fn select_and_type_switch_layout() {
    let src = r#"package p

func f(c chan int, v any) {
	select {
	case x := <-c:
		_ = x
	default:
	}
	switch t := v.(type) {
	case int, string:
		_ = t
	}
}
"#;
    assert_eq!(fmt(src), src);
}

#[test]
fn generics_and_interfaces() {
    let src = r#"package p

type Number interface {
	~int | ~float64
}

type Pair[K comparable, V any] struct {
	Key K
	Val V
}

func Sum[T Number](xs ...T) (total T) {
	for _, x := range xs {
		total += x
	}
	return
}
"#;
    assert_eq!(fmt(src), src);
}
