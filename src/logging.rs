//! Log output for the `gocolon` binary.
//!
//! Nothing is installed unless `GOCOLON_LOG` or `RUST_LOG` is set:
//!
//! ```bash
//! GOCOLON_LOG=debug gocolon main.colon
//! GOCOLON_LOG=gocolon::rewrite=trace gocolon main.colon
//! ```

use tracing_subscriber::EnvFilter;

/// `GOCOLON_LOG` takes precedence over `RUST_LOG`.
fn build_filter() -> Option<EnvFilter> {
    if let Ok(val) = std::env::var("GOCOLON_LOG") {
        return Some(EnvFilter::builder().parse_lossy(val));
    }
    std::env::var("RUST_LOG")
        .ok()
        .map(|_| EnvFilter::from_default_env())
}

/// Installs the global subscriber. Output goes to stderr, stdout carries
/// translated source in filter mode.
pub fn init() {
    let Some(filter) = build_filter() else {
        return;
    };
    // A subscriber installed by the embedding program wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
