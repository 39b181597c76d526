use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress value at which a deploy is complete.
pub const PROGRESS_COMPLETE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeployPhase {
    #[default]
    Idle,
    Deploying,
    Success,
}

impl fmt::Display for DeployPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployPhase::Idle => f.write_str("idle"),
            DeployPhase::Deploying => f.write_str("deploying"),
            DeployPhase::Success => f.write_str("success"),
        }
    }
}

/// Observable state of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DeployStatus {
    pub phase: DeployPhase,
    /// 0.0 ..= 100.0
    pub progress: f64,
}

/// Guarded three-state deploy machine.
///
/// Invalid transitions are no-ops that return `false`.
#[derive(Debug, Clone, Default)]
pub struct DeployWorkflow {
    phase: DeployPhase,
    progress: f64,
}

impl DeployWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DeployPhase {
        self.phase
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn status(&self) -> DeployStatus {
        DeployStatus {
            phase: self.phase,
            progress: self.progress,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == DeployPhase::Idle
    }

    /// `Idle -> Deploying`.
    pub fn trigger(&mut self) -> bool {
        if self.phase != DeployPhase::Idle {
            return false;
        }
        self.phase = DeployPhase::Deploying;
        self.progress = 0.0;
        true
    }

    /// Adds `increment` to the progress while deploying.
    ///
    /// Negative or non-finite increments count as zero. Reaching
    /// [`PROGRESS_COMPLETE`] clamps the progress and moves to `Success`.
    /// Returns the phase after the step.
    pub fn advance(&mut self, increment: f64) -> DeployPhase {
        if self.phase != DeployPhase::Deploying {
            return self.phase;
        }
        let step = if increment.is_finite() && increment > 0.0 {
            increment
        } else {
            0.0
        };
        self.progress += step;
        if self.progress >= PROGRESS_COMPLETE {
            self.progress = PROGRESS_COMPLETE;
            self.phase = DeployPhase::Success;
        }
        self.phase
    }

    /// `Success -> Idle`, progress back to zero.
    pub fn reset(&mut self) -> bool {
        if self.phase != DeployPhase::Success {
            return false;
        }
        self.phase = DeployPhase::Idle;
        self.progress = 0.0;
        true
    }

    /// `Deploying -> Idle`, used when the driving task goes away mid-flight.
    pub fn abort(&mut self) -> bool {
        if self.phase != DeployPhase::Deploying {
            return false;
        }
        self.phase = DeployPhase::Idle;
        self.progress = 0.0;
        true
    }
}
