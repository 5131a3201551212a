use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::CliConfig;

const LOG_ENV: &str = "CLOUDKEY_LOG";
const DEFAULT_LEVEL: &str = "warn";
const VERBOSE_LEVEL: &str = "debug";
const LOG_FILE_PREFIX: &str = "cloudkey.log";

/// Install the global subscriber.
///
/// Logs go to stderr, and to a daily file when file logging is configured.
/// The returned guard flushes the file writer and must live until exit.
pub fn init(verbose: bool, config: &CliConfig) -> Result<Option<WorkerGuard>> {
    let filter = filter(verbose, config.logging.level.as_deref())?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    let (file_layer, guard) = match config.log_directory() {
        Some(log_dir) => {
            std::fs::create_dir_all(&log_dir)
                .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
            let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false)
                .with_level(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

/// `--verbose` beats CLOUDKEY_LOG, which beats the configured level.
fn filter(verbose: bool, configured: Option<&str>) -> Result<EnvFilter> {
    if verbose {
        return Ok(EnvFilter::new(VERBOSE_LEVEL));
    }
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    let level = configured.unwrap_or(DEFAULT_LEVEL);
    EnvFilter::try_new(level).with_context(|| format!("Invalid log level {level:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_filter() {
        let filter = filter(true, Some("error")).unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn test_configured_filter() {
        assert!(filter(false, Some("cloudkey_core=info")).is_ok());
    }
}
