//! Configuration service.
//!
//! Loads [`RootConfig`] from `config.toml` and caches it. A missing file means
//! defaults; an unreadable one is logged and also falls back to defaults.

use opsdeck_core::config::RootConfig;
use opsdeck_core::{OpsdeckError, Result};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use toml::{Table, Value};
use tracing::{info, warn};

use crate::paths::OpsdeckPaths;
use crate::storage::AtomicTomlFile;

/// Loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: OpsdeckPaths,
    /// Populated lazily by `get_config`.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    pub fn new(paths: OpsdeckPaths) -> Self {
        Self {
            paths,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn paths(&self) -> &OpsdeckPaths {
        &self.paths
    }

    pub fn config_path(&self) -> Result<PathBuf> {
        Ok(self.paths.config_file()?)
    }

    /// Gets the root configuration, loading from file if not cached.
    pub fn get_config(&self) -> RootConfig {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(config) = cached.as_ref() {
                return config.clone();
            }
        }

        let loaded = self.load().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load configuration, using defaults");
            RootConfig::default()
        });

        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(loaded.clone());
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Reads the file, bypassing the cache.
    pub fn load(&self) -> Result<RootConfig> {
        let file = AtomicTomlFile::<RootConfig>::new(self.config_path()?);
        let config = file.load()?.unwrap_or_default();
        warn_on_suspicious_values(&config);
        Ok(config)
    }

    /// Writes a default `config.toml`.
    ///
    /// An existing file is kept unless `overwrite` is set. Returns the path
    /// and whether a file was written.
    pub fn init(&self, overwrite: bool) -> Result<(PathBuf, bool)> {
        let path = self.config_path()?;
        if path.exists() && !overwrite {
            return Ok((path, false));
        }

        AtomicTomlFile::new(path.clone()).save(&RootConfig::default())?;
        self.invalidate_cache();
        info!(path = %path.display(), "wrote default configuration");
        Ok((path, true))
    }

    /// Sets one dotted `key` (e.g. `deploy.tick_interval_ms`) in `config.toml`.
    ///
    /// `raw` is read as a TOML value when it parses as one and as a plain
    /// string otherwise. The key must name an existing setting and the edited
    /// file must still load as a [`RootConfig`]; nothing is written otherwise.
    /// The edit is a locked read-modify-write, so other keys in the file are
    /// preserved.
    pub fn set(&self, key: &str, raw: &str) -> Result<()> {
        let path: Vec<&str> = key.split('.').map(str::trim).collect();
        if path.iter().any(|part| part.is_empty()) {
            return Err(OpsdeckError::invalid_input(format!("malformed key '{}'", key)));
        }
        if !is_known_key(&path)? {
            return Err(OpsdeckError::invalid_input(format!("unknown setting '{}'", key)));
        }
        let value = parse_value(raw);

        let file = AtomicTomlFile::<Table>::new(self.config_path()?);
        file.update(Table::new(), |table| {
            insert_at(table, &path, value)?;
            Value::Table(table.clone())
                .try_into::<RootConfig>()
                .map_err(|e| OpsdeckError::invalid_input(format!("{} = {}: {}", key, raw, e)))?;
            Ok(())
        })?;

        self.invalidate_cache();
        info!(key, value = raw, "configuration updated");
        Ok(())
    }

    /// Renders the effective configuration as TOML.
    pub fn render(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.get_config())?)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new(OpsdeckPaths::default())
    }
}

/// Whether `path` names a setting present in the default configuration.
fn is_known_key(path: &[&str]) -> Result<bool> {
    let mut node = Value::try_from(RootConfig::default())?;
    for part in path {
        match node {
            Value::Table(mut table) => match table.remove(*part) {
                Some(child) => node = child,
                None => return Ok(false),
            },
            _ => return Ok(false),
        }
    }
    Ok(true)
}

fn parse_value(raw: &str) -> Value {
    toml::from_str::<Table>(&format!("v = {}", raw))
        .ok()
        .and_then(|mut table| table.remove("v"))
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

fn insert_at(table: &mut Table, path: &[&str], value: Value) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        return Ok(());
    };
    let mut current = table;
    for part in parents {
        let entry = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        current = match entry {
            Value::Table(child) => child,
            _ => {
                return Err(OpsdeckError::config(format!(
                    "'{}' in config.toml is not a table",
                    part
                )));
            }
        };
    }
    current.insert(last.to_string(), value);
    Ok(())
}

fn warn_on_suspicious_values(config: &RootConfig) {
    let deploy = &config.deploy;
    if !(deploy.max_increment.is_finite() && deploy.max_increment > 0.0) {
        warn!(
            max_increment = deploy.max_increment,
            "deploy.max_increment must be positive; the default will be used"
        );
    }
    if deploy.tick_interval_ms == 0 {
        warn!("deploy.tick_interval_ms is 0; ticking every millisecond");
    }
    if config.activity.capacity == 0 {
        warn!("activity.capacity is 0; keeping a single entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> ConfigService {
        ConfigService::new(OpsdeckPaths::new(Some(dir.path().to_path_buf())))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        assert_eq!(service.get_config(), RootConfig::default());
        assert!(!dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "[store]\nmax_notifications = 3\n",
        )
        .unwrap();

        let config = service(&dir).get_config();
        assert_eq!(config.store.max_notifications, 3);
        assert_eq!(config.store.seed_agents.len(), 2);
        assert_eq!(config.deploy.reset_delay_ms, 3000);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "[store\n").unwrap();
        let service = service(&dir);

        assert!(service.load().unwrap_err().is_serialization());
        assert_eq!(service.get_config(), RootConfig::default());
    }

    #[test]
    fn test_cache_until_invalidated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let service = service(&dir);
        assert_eq!(service.get_config().activity.capacity, 200);

        fs::write(&path, "[activity]\ncapacity = 7\n").unwrap();
        assert_eq!(service.get_config().activity.capacity, 200);

        service.invalidate_cache();
        assert_eq!(service.get_config().activity.capacity, 7);
    }

    #[test]
    fn test_set_edits_one_key_and_keeps_the_rest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[activity]\ncapacity = 9\n").unwrap();
        let service = service(&dir);
        assert_eq!(service.get_config().deploy.tick_interval_ms, 200);

        service.set("deploy.tick_interval_ms", "50").unwrap();
        service.set("store.theme.primaryColor", "#112233").unwrap();

        let config = service.get_config();
        assert_eq!(config.deploy.tick_interval_ms, 50);
        assert_eq!(config.store.theme.primary_color, "#112233");
        assert_eq!(config.activity.capacity, 9);
        assert!(!path.with_extension("lock").exists());
    }

    #[test]
    fn test_set_rejects_bad_input_without_writing() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        assert!(service.set("deploy.tick_rate", "5").is_err());
        assert!(service.set("deploy..tick_interval_ms", "5").is_err());
        assert!(service.set("deploy.tick_interval_ms", "soon").is_err());
        assert!(!dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let (path, written) = service.init(false).unwrap();
        assert!(written);
        assert_eq!(service.load().unwrap(), RootConfig::default());

        fs::write(&path, "[activity]\ncapacity = 9\n").unwrap();
        let (_, written) = service.init(false).unwrap();
        assert!(!written);
        assert_eq!(service.load().unwrap().activity.capacity, 9);

        let (_, written) = service.init(true).unwrap();
        assert!(written);
        assert_eq!(service.get_config(), RootConfig::default());
    }
}
