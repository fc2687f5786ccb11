//! Tracing subscriber setup.
//!
//! Installs a registry with an `EnvFilter` and one `fmt` layer writing either to
//! stderr or, when a log directory is configured, to a non-rolling file through
//! `tracing-appender`.
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;
use crate::error::{Result, RuntimeError};

/// Keeps the background log writer alive. Dropping it flushes pending lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.directive`. Fails without
/// panicking if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.directive))
        .map_err(|e| RuntimeError::Logging(format!("invalid filter directive: {e}")))?;

    match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                RuntimeError::Logging(format!("cannot create log dir {}: {e}", dir.display()))
            })?;
            let file_appender = tracing_appender::rolling::never(dir, &config.file_name);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .try_init()
                .map_err(|e| RuntimeError::Logging(e.to_string()))?;

            tracing::info!(
                target: "runtime::logging",
                "Log file: {}",
                dir.join(&config.file_name).display()
            );
            Ok(LoggingGuard { _file: Some(guard) })
        }
        None => {
            let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .try_init()
                .map_err(|e| RuntimeError::Logging(e.to_string()))?;

            Ok(LoggingGuard { _file: None })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_reported() {
        let config = LoggingConfig::default();
        let first = init_logging(&config);
        // `first` may itself fail if another test installed a subscriber.
        let second = init_logging(&config);
        assert!(matches!(second, Err(RuntimeError::Logging(_))));
        drop(first);
    }
}
