//! Path management for opsdeck configuration and log files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/opsdeck/           # Config directory (platform default via `dirs`)
//! ├── config.toml              # Application configuration
//! └── logs/                    # Daily rolling logs
//!     └── opsdeck.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;
use thiserror::Error;

const APP_DIR: &str = "opsdeck";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// The platform config directory could not be determined.
    #[error("Cannot find config directory")]
    ConfigDirNotFound,
}

impl From<PathError> for opsdeck_core::OpsdeckError {
    fn from(err: PathError) -> Self {
        opsdeck_core::OpsdeckError::config(err.to_string())
    }
}

/// Resolves opsdeck paths.
///
/// By default everything lives under the platform config directory. A base
/// override replaces `<config_dir>/opsdeck` entirely, which keeps tests and
/// `--config-dir` runs away from the user's real files.
#[derive(Debug, Clone, Default)]
pub struct OpsdeckPaths {
    base: Option<PathBuf>,
}

impl OpsdeckPaths {
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// Returns the opsdeck configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}
