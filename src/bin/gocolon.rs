use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use gocolon::{logging, translate, TranslateError};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Translates Go with colon declarations (`:name = value`) into plain Go.
#[derive(Parser, Debug)]
#[command(name = "gocolon", version)]
struct Args {
    /// Rewrite each input file with its formatted form.
    #[arg(short = 'w')]
    write: bool,

    /// List files whose formatted form differs from the input.
    #[arg(short = 'l')]
    list: bool,

    /// Extension of input files found in directories.
    #[arg(long, default_value = "colon")]
    ext: String,

    /// Files or directories. Reads stdin and writes stdout when empty.
    paths: Vec<PathBuf>,
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    if args.paths.is_empty() {
        return match filter_stdin() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e:#}");
                ExitCode::FAILURE
            }
        };
    }

    let mut failed = false;
    for unit in units(&args) {
        let result = unit.and_then(|path| process(&args, &path));
        if let Err(e) = result {
            eprintln!("{e:#}");
            failed = true;
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn filter_stdin() -> Result<()> {
    let mut src = Vec::new();
    std::io::stdin()
        .read_to_end(&mut src)
        .context("reading stdin")?;
    let out = translate("<standard input>", &src).map_err(report)?;
    std::io::stdout()
        .write_all(&out.translated)
        .context("writing stdout")
}

/// Input files named on the command line. Directories contribute every file
/// with the configured extension, in walk order.
fn units(args: &Args) -> impl Iterator<Item = Result<PathBuf>> + '_ {
    args.paths.iter().flat_map(move |path| -> Vec<Result<PathBuf>> {
        if !path.is_dir() {
            return vec![Ok(path.clone())];
        }
        WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) if e.file_type().is_file() && has_ext(e.path(), &args.ext) => {
                    Some(Ok(e.into_path()))
                }
                Ok(_) => None,
                Err(e) => Some(Err(e.into())),
            })
            .collect()
    })
}

fn has_ext(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}

fn process(args: &Args, path: &Path) -> Result<()> {
    let target = path.with_extension("go");
    if target == path {
        anyhow::bail!("{}: input would be overwritten by its translation", path.display());
    }
    let src = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let out = translate(&path.display().to_string(), &src).map_err(report)?;

    if out.formatted != src {
        if args.list {
            println!("{}", path.display());
        }
        if args.write {
            write_atomic(path, &out.formatted)?;
        }
    }
    write_atomic(&target, &out.translated)
}

/// Diagnostics already carry file and position; print them one per line.
fn report(e: TranslateError) -> anyhow::Error {
    anyhow::Error::msg(e.to_string())
}

/// Replaces `path` through a temporary file in the same directory.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    tmp.write_all(data)
        .with_context(|| format!("writing {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}
