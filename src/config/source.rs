//! Where rule data comes from.

use std::path::{Path, PathBuf};

use crate::config::loader::{load_config, load_settled_config, ConfigError};
use crate::config::schema::RoutingConfig;
use crate::config::validation::validate_config;

/// Supplies persisted rule data to the orchestrating layer.
pub trait RuleSetSource: Send + Sync {
    /// Read the current rule data. An error leaves the caller's installed
    /// rule set untouched.
    fn load(&self) -> Result<RoutingConfig, ConfigError>;

    /// Human readable location, for logs and error reports.
    fn describe(&self) -> String;
}

/// Rule file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Like [`RuleSetSource::load`], but `None` while the file is missing or
    /// blank, as it is between the truncate and the write of a save.
    pub fn load_settled(&self) -> Option<Result<RoutingConfig, ConfigError>> {
        let config = match load_settled_config(&self.path) {
            Ok(Some(config)) => config,
            Ok(None) => return None,
            Err(e) => return Some(Err(e)),
        };
        self.log_issues(&config);
        Some(Ok(config))
    }

    fn log_issues(&self, config: &RoutingConfig) {
        for issue in validate_config(config) {
            tracing::warn!(path = %self.path.display(), "{}", issue);
        }
    }
}

impl RuleSetSource for FileSource {
    fn load(&self) -> Result<RoutingConfig, ConfigError> {
        let config = load_config(&self.path)?;
        self.log_issues(&config);
        Ok(config)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fixed in-memory rule data.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    config: RoutingConfig,
}

impl StaticSource {
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }
}

impl RuleSetSource for StaticSource {
    fn load(&self) -> Result<RoutingConfig, ConfigError> {
        Ok(self.config.clone())
    }

    fn describe(&self) -> String {
        "<static>".to_string()
    }
}
