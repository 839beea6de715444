//! Tracing configuration for debugging resolution.
//!
//! Supports three output formats controlled by `JAZ_LOG_FORMAT`:
//!
//! - `text` (default): Standard `tracing-subscriber` flat output
//! - `tree`: Hierarchical indented output via `tracing-tree` — easy to read
//!   when chasing a pass ordering problem
//! - `json`: One JSON object per span/event — machine-readable
//!
//! ## Quick start
//!
//! ```bash
//! # Human-readable tree
//! JAZ_LOG=debug JAZ_LOG_FORMAT=tree jaz Main.jav
//!
//! # JSON (for tooling)
//! JAZ_LOG=debug JAZ_LOG_FORMAT=json jaz Main.jav
//!
//! # Fine-grained filtering
//! JAZ_LOG="jaz_resolver=trace" jaz Main.jav
//! ```
//!
//! The subscriber is only initialised when `JAZ_LOG` (or `RUST_LOG`) is set,
//! so there is zero overhead in normal builds.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse from the `JAZ_LOG_FORMAT` environment variable.
    fn from_env() -> Self {
        match std::env::var("JAZ_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Build an `EnvFilter` from `JAZ_LOG`, falling back to `RUST_LOG`.
///
/// `JAZ_LOG` takes precedence when both are set. Values use the same
/// syntax as `RUST_LOG` (e.g. `debug`, `jaz_resolver=trace`).
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("JAZ_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `JAZ_LOG` nor `RUST_LOG` is set, keeping
/// startup cost at zero for normal usage.
///
/// All output goes to stderr so it never interferes with stdout (regenerated
/// sources and declaration dumps).
pub fn init_tracing() {
    let has_jaz_log = std::env::var("JAZ_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_jaz_log && !has_rust_log {
        return;
    }

    let filter = build_filter();
    let format = LogFormat::from_env();

    match format {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);

            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
