//! Logging setup
//!
//! - `STRAND_LOG_FORMAT=json` for structured output, anything else is pretty
//! - `STRAND_LOG_DIR` adds a daily-rolling JSON log file
//! - `RUST_LOG` overrides the default `strand=info` filter

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "strand=info";
const LOG_FILE_PREFIX: &str = "strand.log";

/// Install the global subscriber
///
/// The returned guard flushes the log file on drop; keep it alive for the
/// lifetime of the process.
pub fn init() -> Result<Option<WorkerGuard>> {
    let log_format = std::env::var("STRAND_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let (file_writer, guard) = match std::env::var("STRAND_LOG_DIR") {
        Ok(dir) => {
            let dir = shellexpand::tilde(&dir).into_owned();
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        Err(_) => (None, None),
    };
    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
    });

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    match log_format.as_str() {
        "json" => registry.with(fmt::layer().json()).try_init()?,
        _ => registry.with(fmt::layer().pretty()).try_init()?,
    }

    Ok(guard)
}
