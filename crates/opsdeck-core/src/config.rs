//! Configuration records.
//!
//! Loaded from `config.toml` by the infrastructure layer. Every section and
//! field has a default so partial files are valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::agent::{Agent, default_seed_agents};
use crate::theme::ThemeConfig;

/// Default retention cap for the notification list.
pub const DEFAULT_MAX_NOTIFICATIONS: usize = 100;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RootConfig {
    pub store: StoreConfig,
    pub deploy: DeployConfig,
    pub activity: ActivityConfig,
}

/// Initial contents and limits of an [`AppStore`](crate::store::AppStore).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Oldest notifications beyond this count are evicted. 0 disables the cap.
    pub max_notifications: usize,
    /// Agents present when the store is created.
    pub seed_agents: Vec<Agent>,
    /// Theme the store starts with.
    pub theme: ThemeConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_notifications: DEFAULT_MAX_NOTIFICATIONS,
            seed_agents: default_seed_agents(),
            theme: ThemeConfig::default(),
        }
    }
}

impl StoreConfig {
    /// A config with no seed agents, useful for tests and empty dashboards.
    pub fn empty() -> Self {
        Self {
            seed_agents: Vec::new(),
            ..Self::default()
        }
    }
}

/// Timing of the simulated deploy.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DeployConfig {
    /// Interval between progress ticks.
    pub tick_interval_ms: u64,
    /// Upper bound (exclusive) of the random per-tick increment.
    pub max_increment: f64,
    /// How long `Success` is shown before returning to `Idle`.
    pub reset_delay_ms: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            max_increment: 15.0,
            reset_delay_ms: 3000,
        }
    }
}

impl DeployConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ActivityConfig {
    /// Number of activity entries kept in memory.
    pub capacity: usize,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self { capacity: 200 }
    }
}
