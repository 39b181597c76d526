use opsdeck_core::config::DeployConfig;
use opsdeck_core::deploy::{DeployPhase, DeployStatus, DeployWorkflow};
use opsdeck_core::notification::NewNotification;
use opsdeck_core::store::StoreAction;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ProgressSource;
use crate::shared_store::SharedStore;

struct RunnerState {
    workflow: DeployWorkflow,
    /// Cancellation handle of the in-flight run, if any.
    in_flight: Option<CancellationToken>,
}

/// Drives a [`DeployWorkflow`] from a [`ProgressSource`].
///
/// At most one run is in flight per runner: the idle guard is checked and the
/// workflow moved to `Deploying` under the same lock, before any task is
/// spawned.
pub struct DeployRunner {
    state: Arc<Mutex<RunnerState>>,
    status: Arc<watch::Sender<DeployStatus>>,
    reset_delay: Duration,
    store: Option<SharedStore>,
}

impl DeployRunner {
    pub fn new(config: &DeployConfig) -> Self {
        let (status, _) = watch::channel(DeployStatus::default());
        Self {
            state: Arc::new(Mutex::new(RunnerState {
                workflow: DeployWorkflow::new(),
                in_flight: None,
            })),
            status: Arc::new(status),
            reset_delay: config.reset_delay(),
            store: None,
        }
    }

    /// Posts a success notification to `store` whenever a deploy completes.
    pub fn with_store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn status(&self) -> DeployStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<DeployStatus> {
        self.status.subscribe()
    }

    /// Starts a deploy fed by `source`.
    ///
    /// Returns `None` without side effects when a deploy is already running or
    /// still showing success. Must be called from within a Tokio runtime.
    pub fn trigger<S>(&self, source: S) -> Option<JoinHandle<()>>
    where
        S: ProgressSource + 'static,
    {
        let cancel = CancellationToken::new();
        {
            let mut state = lock(&self.state);
            if !state.workflow.trigger() {
                debug!(phase = %state.workflow.phase(), "deploy trigger ignored");
                return None;
            }
            state.in_flight = Some(cancel.clone());
            self.status.send_replace(state.workflow.status());
        }
        info!("deploy started");

        let run = DeployRun {
            state: Arc::clone(&self.state),
            status: Arc::clone(&self.status),
            reset_delay: self.reset_delay,
            store: self.store.clone(),
            cancel,
        };
        Some(tokio::spawn(run.run(source)))
    }

    /// Cancels the in-flight run, if any.
    ///
    /// A run still deploying aborts back to idle; a run showing success
    /// resets immediately.
    pub fn cancel(&self) {
        if let Some(token) = lock(&self.state).in_flight.as_ref() {
            token.cancel();
        }
    }
}

struct DeployRun {
    state: Arc<Mutex<RunnerState>>,
    status: Arc<watch::Sender<DeployStatus>>,
    reset_delay: Duration,
    store: Option<SharedStore>,
    cancel: CancellationToken,
}

impl DeployRun {
    async fn run<S: ProgressSource>(self, mut source: S) {
        loop {
            let next = tokio::select! {
                _ = self.cancel.cancelled() => {
                    self.abort("cancelled");
                    return;
                }
                next = source.next_increment() => next,
            };
            let Some(increment) = next else {
                self.abort("progress source ended early");
                return;
            };

            let phase = {
                let mut state = lock(&self.state);
                let phase = state.workflow.advance(increment);
                self.status.send_replace(state.workflow.status());
                phase
            };
            if phase == DeployPhase::Success {
                break;
            }
        }

        info!("deploy succeeded");
        if let Some(store) = &self.store {
            store
                .dispatch(StoreAction::AddNotification {
                    notification: NewNotification::success(
                        "Deployment complete",
                        "Your changes are live.",
                    ),
                })
                .await;
        }

        tokio::select! {
            _ = self.cancel.cancelled() => debug!("success display cut short"),
            _ = tokio::time::sleep(self.reset_delay) => {}
        }

        let mut state = lock(&self.state);
        state.workflow.reset();
        state.in_flight = None;
        self.status.send_replace(state.workflow.status());
        debug!("deploy workflow back to idle");
    }

    fn abort(&self, reason: &str) {
        let mut state = lock(&self.state);
        let progress = state.workflow.progress();
        if state.workflow.abort() {
            warn!(reason, progress, "deploy aborted");
        }
        state.in_flight = None;
        self.status.send_replace(state.workflow.status());
    }
}

fn lock(state: &Mutex<RunnerState>) -> MutexGuard<'_, RunnerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::ScriptedProgress;

    fn fast_config() -> DeployConfig {
        DeployConfig {
            tick_interval_ms: 1,
            max_increment: 15.0,
            reset_delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_runs_to_idle() {
        let runner = DeployRunner::new(&fast_config());
        let handle = runner
            .trigger(ScriptedProgress::new([60.0, 60.0]))
            .expect("runner should be idle");
        handle.await.unwrap();

        assert_eq!(runner.status(), DeployStatus::default());
    }

    #[tokio::test]
    async fn test_second_trigger_rejected() {
        let runner = DeployRunner::new(&fast_config());
        let first = runner.trigger(ScriptedProgress::new([50.0, 50.0]));
        let second = runner.trigger(ScriptedProgress::new([100.0]));

        assert!(first.is_some());
        assert!(second.is_none());
        first.unwrap().await.unwrap();
        assert!(runner.trigger(ScriptedProgress::new([100.0])).is_some());
    }

    #[tokio::test]
    async fn test_source_ending_early_aborts() {
        let runner = DeployRunner::new(&fast_config());
        let handle = runner.trigger(ScriptedProgress::new([10.0])).unwrap();
        handle.await.unwrap();
        assert_eq!(runner.status().phase, DeployPhase::Idle);
        assert_eq!(runner.status().progress, 0.0);
    }
}
