use gocolon::translate;
use gocolon_parser::{parse_file, print_file};
use walkdir::WalkDir;

/// Set `GOCOLON_CORPUS` to a directory of Go sources (e.g. `$GOROOT/src`).
#[test]
fn go_corpus_if_configured() {
    let Some(root) = std::env::var_os("GOCOLON_CORPUS") else {
        eprintln!("GOCOLON_CORPUS not set; skipping corpus test");
        return;
    };

    let mut total = 0usize;
    let mut translated = 0usize;

    for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("go") {
            continue;
        }
        if path.to_string_lossy().contains("testdata") {
            continue;
        }
        let Ok(src) = std::fs::read_to_string(path) else {
            continue;
        };
        total += 1;

        let parsed = match parse_file(&src) {
            Ok(p) => p,
            Err(f) => {
                for d in f.diags.iter().take(8) {
                    eprintln!("  {:?} {:?}: {}", d.kind, d.span, d.message);
                }
                panic!("{}: parse failed after {total} files", path.display());
            }
        };
        let printed = print_file(&parsed.arena, &parsed.file, &src);
        if let Err(f) = parse_file(&printed) {
            panic!("{}: printed output does not parse: {:?}", path.display(), f.diags);
        }

        // Ordinary Go uses `:=`, which the translator reserves; only
        // define-free files go through it.
        if src.contains(":=") {
            continue;
        }
        match translate(&path.display().to_string(), src.as_bytes()) {
            Ok(out) => {
                assert_eq!(out.translated, out.formatted, "{} changed", path.display());
                translated += 1;
            }
            Err(e) => eprintln!("skipped: {e}"),
        }
    }

    eprintln!("Parsed {total} Go files, translated {translated} unchanged.");
}
