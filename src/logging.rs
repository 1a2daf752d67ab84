//! Diagnostic tracing for the CLI and server.
//!
//! Output goes to stderr so that `run --json` keeps stdout clean.
//! `RUST_LOG` wins over the configured level when set.
//!
//! ```bash
//! RUST_LOG=agent_core=debug agent-core run "Calculate 2 + 2"
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// `level` is any `EnvFilter` directive (`info`, `agent_core=debug,tower_http=info`).
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
