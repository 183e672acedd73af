// Logging module - Logging infrastructure
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` wins, else `--verbose` means debug, else the
/// configured level.
pub fn build_filter(level: &str, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { level };
        EnvFilter::try_new(format!("memctl={}", level))
            .unwrap_or_else(|_| EnvFilter::new("memctl=warn"))
    })
}

/// Initialize logging system; diagnostics always go to stderr
pub fn init_logging(level: &str, verbose: bool) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(build_filter(level, verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(verbose)
                .with_level(true)
                .with_file(verbose)
                .with_line_number(verbose),
        )
        .try_init()?;

    tracing::debug!("memctl logging initialized");
    Ok(())
}
