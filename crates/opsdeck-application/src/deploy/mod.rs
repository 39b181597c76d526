//! Deploy workflow execution.
//!
//! - `progress`: [`ProgressSource`] and its simulated / scripted implementations
//! - `runner`: [`DeployRunner`], which drives a `DeployWorkflow` from a source

mod progress;
mod runner;

pub use progress::{ProgressSource, ScriptedProgress, SimulatedProgress};
pub use runner::DeployRunner;
