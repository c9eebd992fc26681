//! Identity middleware: decode every exchange, log it to stderr, write it back unchanged.
//!
//! Log verbosity follows `RUST_LOG` (default `info`). Per-line diagnostics
//! are emitted at `debug`.

use replay_middleware::Filter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout is the data channel; logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "replay_middleware=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();

    let filter = Filter::builder().build();
    let stats = filter.run_stdio().await?;

    tracing::info!(
        lines = stats.lines,
        emitted = stats.emitted,
        dropped = stats.dropped,
        failed = stats.failed,
        "Input closed, shutting down"
    );
    Ok(())
}
