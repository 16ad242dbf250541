use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gocolon::rewrite::rewrite;
use gocolon::translate;
use gocolon_parser::{parse_file, print_file};
use std::hint::black_box as bb;

// =============================================================================
// Test Corpus
// =============================================================================

const SMALL_HELLO: &str = r#"
package main

func main() {
    :msg = "Hello, World!"
    println(msg)
}
"#;

const MEDIUM_HANDLERS: &str = r#"
package server

import (
    "fmt"
    "strconv"
)

type Request struct {
    Path  string
    Query map[string]string
}

func parsePage(r *Request) (int, error) {
    :raw, :ok = r.Query["page"]
    if !ok {
        return 1, nil
    }
    var err error
    :n, err = strconv.Atoi(raw)
    if err != nil {
        return 0, fmt.Errorf("page %q: %w", raw, err)
    }
    return n, nil
}

func route(r *Request) string {
    switch :p = r.Path; p {
    case "/":
        return "index"
    }
    for :k, :v = range r.Query {
        :line = k + "=" + v
        println(line)
    }
    return "missing"
}
"#;

/// `n` functions mixing declarations, reassignments and headers.
fn generated(n: usize) -> String {
    let mut s = String::from("package gen\n\n");
    for i in 0..n {
        s.push_str(&format!(
            "func f{i}(xs []int) (total int, err error) {{\n\
             \t:count = len(xs)\n\
             \t:first, err = head(xs)\n\
             \tif :ok, :msg = check(first); !ok {{\n\
             \t\treturn 0, fail(msg)\n\
             \t}}\n\
             \tfor _, :x = range xs {{\n\
             \t\ttotal += x * count\n\
             \t}}\n\
             \treturn\n\
             }}\n\n"
        ));
    }
    s
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");
    let large = generated(50);
    let corpora = [
        ("small", SMALL_HELLO),
        ("medium", MEDIUM_HANDLERS),
        ("large", large.as_str()),
    ];

    for (name, input) in corpora {
        group.throughput(Throughput::Bytes(input.len() as u64));

        group.bench_with_input(BenchmarkId::new("rewrite", name), &input, |b, &input| {
            b.iter(|| bb(rewrite(bb(input)).map(|r| r.markers)));
        });

        let Ok(rewritten) = rewrite(input) else {
            continue;
        };
        group.bench_with_input(
            BenchmarkId::new("parse_print", name),
            &rewritten.text,
            |b, text| {
                b.iter(|| {
                    if let Ok(p) = parse_file(bb(text)) {
                        bb(print_file(&p.arena, &p.file, text));
                    }
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("translate", name), &input, |b, &input| {
            b.iter(|| bb(translate("bench.colon", bb(input.as_bytes())).is_ok()));
        });
    }
    group.finish();
}

fn bench_scalability(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalability");
    for n in [10, 100, 500] {
        let input = generated(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("functions", n), &input, |b, input| {
            b.iter(|| bb(translate("bench.colon", bb(input.as_bytes())).is_ok()));
        });
    }
    group.finish();
}

// =============================================================================
// Criterion registration
// =============================================================================

criterion_group!(benches, bench_stages, bench_scalability);
criterion_main!(benches);
