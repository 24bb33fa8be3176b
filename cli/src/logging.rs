//! Log setup for the `legacy-transfer` binary.
//!
//! Everything goes to stderr. Stdout is reserved for command results (the
//! transfer JSON, a fee, account states) so they can be piped.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Selected with `--log-format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Multi-line, colored. Shows event targets.
    #[default]
    Pretty,
    /// One line per event, no timestamps. Handy when scripting sweeps.
    Compact,
    /// JSON lines with the current span list, for log collectors.
    Json,
}

/// Install the global subscriber. `default_filter` applies when `RUST_LOG`
/// is unset. Must be called at most once.
pub fn init_logging(default_filter: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let layer = match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .without_time()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_span_list(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry().with(filter).with(layer).init();
}
