//! Runtime configuration structures and loaders.
use std::env;
use std::path::PathBuf;

use combat_content::ContentFactory;

/// Configuration required to bootstrap a combat world.
#[derive(Clone, Debug, Default)]
pub struct RuntimeConfig {
    /// Content directory. `None` uses the data compiled into `combat-content`.
    pub data_dir: Option<PathBuf>,
    pub logging: LoggingConfig,
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// A `.env` file in the working directory is read first, if present.
    ///
    /// Environment variables:
    /// - `COMBAT_DATA_DIR` - Content directory (default: embedded data)
    /// - `COMBAT_LOG_DIR` - Write logs to a file in this directory (default: stderr)
    /// - `COMBAT_LOG` - Filter directive (default: `info`)
    pub fn from_env() -> Self {
        // Missing .env is fine
        let _ = dotenvy::dotenv();

        let defaults = LoggingConfig::default();
        Self {
            data_dir: read_path("COMBAT_DATA_DIR"),
            logging: LoggingConfig {
                directive: env::var("COMBAT_LOG")
                    .ok()
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or(defaults.directive),
                log_dir: read_path("COMBAT_LOG_DIR"),
                file_name: defaults.file_name,
            },
        }
    }

    /// Factory reading from the configured content source.
    pub fn content_factory(&self) -> ContentFactory {
        match &self.data_dir {
            Some(dir) => ContentFactory::new(dir.clone()),
            None => ContentFactory::embedded(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub directive: String,
    /// Log to `{log_dir}/{file_name}` instead of stderr.
    pub log_dir: Option<PathBuf>,
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directive: "info".to_owned(),
            log_dir: None,
            file_name: "combat.log".to_owned(),
        }
    }
}

fn read_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
