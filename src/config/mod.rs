pub mod profile;

pub use profile::*;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid import profile: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub import: ImportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Overrides applied on top of the import profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    pub profile_path: Option<PathBuf>,
    pub source_date_format: Option<String>,
    pub default_website_id: Option<i64>,
    pub default_stock_id: Option<i64>,
    pub default_attribute_set: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub log_skipped_rows: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Import overrides
        if let Ok(v) = env::var("IMPORT_PROFILE") {
            self.import.profile_path = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("IMPORT_SOURCE_DATE_FORMAT") {
            self.import.source_date_format = Some(v);
        }
        if let Ok(v) = env::var("IMPORT_DEFAULT_WEBSITE_ID") {
            self.import.default_website_id = v.parse().ok().or(self.import.default_website_id);
        }
        if let Ok(v) = env::var("IMPORT_DEFAULT_STOCK_ID") {
            self.import.default_stock_id = v.parse().ok().or(self.import.default_stock_id);
        }
        if let Ok(v) = env::var("IMPORT_DEFAULT_ATTRIBUTE_SET") {
            self.import.default_attribute_set = Some(v);
        }

        // Logging overrides
        if let Ok(v) = env::var("IMPORT_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = env::var("IMPORT_LOG_SKIPPED_ROWS") {
            self.logging.log_skipped_rows = v.parse().unwrap_or(self.logging.log_skipped_rows);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            import: ImportConfig::default(),
            logging: LoggingConfig {
                level: "debug".to_string(),
                log_skipped_rows: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            import: ImportConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                log_skipped_rows: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            import: ImportConfig::default(),
            logging: LoggingConfig {
                level: "warn".to_string(),
                log_skipped_rows: false,
            },
        }
    }

    /// Resolve the import profile: explicit path, else the configured one,
    /// else the built-in profile; then apply the configured overrides.
    pub fn import_profile(&self, path: Option<&Path>) -> Result<ImportProfile, ConfigError> {
        let mut profile = match path.or(self.import.profile_path.as_deref()) {
            Some(path) => ImportProfile::from_file(path)?,
            None => ImportProfile::default(),
        };

        if let Some(format) = &self.import.source_date_format {
            profile.source_date_format = format.clone();
        }
        if let Some(id) = self.import.default_website_id {
            profile.default_website_id = id;
        }
        if let Some(id) = self.import.default_stock_id {
            profile.default_stock_id = id;
        }
        if let Some(code) = &self.import.default_attribute_set {
            profile.default_attribute_set = Some(code.clone());
        }

        Ok(profile)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
