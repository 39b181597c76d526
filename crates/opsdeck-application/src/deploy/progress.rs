use async_trait::async_trait;
use opsdeck_core::config::DeployConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};

/// Supplies progress increments to a running deploy.
///
/// The simulated source ticks on a timer; a real deployment backend can
/// implement the same trait and report actual progress.
#[async_trait]
pub trait ProgressSource: Send {
    /// Waits for the next increment. `None` means the source has ended.
    async fn next_increment(&mut self) -> Option<f64>;
}

/// Timer-driven source yielding a uniform random increment per tick.
pub struct SimulatedProgress {
    period: Duration,
    interval: Option<Interval>,
    max_increment: f64,
    rng: StdRng,
}

impl SimulatedProgress {
    /// A non-positive or non-finite `max_increment` falls back to the default.
    pub fn new(period: Duration, max_increment: f64) -> Self {
        Self::with_rng(period, max_increment, StdRng::from_entropy())
    }

    pub fn from_config(config: &DeployConfig) -> Self {
        Self::new(config.tick_interval(), config.max_increment)
    }

    /// Deterministic variant for reproducible runs.
    pub fn seeded(period: Duration, max_increment: f64, seed: u64) -> Self {
        Self::with_rng(period, max_increment, StdRng::seed_from_u64(seed))
    }

    fn with_rng(period: Duration, max_increment: f64, rng: StdRng) -> Self {
        let max_increment = if max_increment.is_finite() && max_increment > 0.0 {
            max_increment
        } else {
            DeployConfig::default().max_increment
        };
        Self {
            period,
            interval: None,
            max_increment,
            rng,
        }
    }
}

#[async_trait]
impl ProgressSource for SimulatedProgress {
    async fn next_increment(&mut self) -> Option<f64> {
        // Created lazily so construction does not need a runtime.
        let period = self.period;
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        interval.tick().await;
        Some(self.rng.gen_range(0.0..self.max_increment))
    }
}

/// Source replaying a fixed list of increments, then ending.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProgress {
    steps: VecDeque<f64>,
}

impl ScriptedProgress {
    pub fn new(steps: impl IntoIterator<Item = f64>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }
}

#[async_trait]
impl ProgressSource for ScriptedProgress {
    async fn next_increment(&mut self) -> Option<f64> {
        tokio::task::yield_now().await;
        self.steps.pop_front()
    }
}
