//! Deploy workflow state machine.
//!
//! `Idle -> Deploying -> Success -> Idle`, every transition guarded. The
//! machine is pure; timers and progress sources live in the application layer.

mod workflow;

pub use workflow::{DeployPhase, DeployStatus, DeployWorkflow, PROGRESS_COMPLETE};
