//! `sales.toml` loading.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "sales.db"
//!
//! [business]          # optional; unset keys take their defaults
//! currency = "DZD"
//! tva_rate = 19
//!
//! [logging]
//! level = "info"
//! file = "sales.log"
//! ```

use std::io;
use std::path::{Path, PathBuf};

use sales_core::BusinessSettings;
use sales_core::db::DbConfig;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "sales.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse TOML from config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Bare level or any `EnvFilter` directive.
    pub level: String,
    /// Log file, appended to. Stderr only when unset.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DbConfig,
    /// Written to storage at startup when present.
    pub business: Option<BusinessSettings>,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_toml(
        path: &Path,
        contents: &str,
    ) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read `path`, or `sales.toml` in the working directory when no path is
    /// given. Only the implicit default file may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::from_toml(&path, &contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound && !explicit => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    /// Command-line flags win over the file.
    pub fn apply_overrides(
        &mut self,
        backend: Option<String>,
        connection_string: Option<String>,
        log_level: Option<String>,
    ) {
        if let Some(backend) = backend {
            self.database.backend = backend;
        }
        if let Some(connection_string) = connection_string {
            self.database.connection_string = connection_string;
        }
        if let Some(level) = log_level {
            self.logging.level = level;
        }
    }
}
