use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Env var naming a log file. When unset, logs go to stderr.
pub const LOG_FILE_ENV: &str = "SECTIONED_LOG";

/// Initialize tracing.
///
/// `RUST_LOG` wins over the configured filter. When `SECTIONED_LOG` is set,
/// output goes to a file named `{path}.{timestamp}.{pid}` so concurrent runs
/// never share one.
///
/// If the log file cannot be created, logs go to stderr instead.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(log_path) = std::env::var(LOG_FILE_ENV).ok() else {
        init_stderr(filter);
        return;
    };

    let unique_path = unique_log_path(&log_path);
    let file = match std::fs::File::create(&unique_path) {
        Ok(file) => file,
        Err(e) => {
            init_stderr(filter);
            tracing::warn!(path = %unique_path, error = %e, "Failed to create log file, logging to stderr");
            return;
        }
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();
}

fn init_stderr(filter: EnvFilter) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}

/// `{path}.{timestamp}.{pid}`, so concurrent runs never share a file.
fn unique_log_path(path: &str) -> String {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}.{}.{}", path, timestamp, std::process::id())
}
