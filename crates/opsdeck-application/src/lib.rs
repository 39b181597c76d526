pub mod activity;
pub mod deploy;
pub mod shared_store;

pub use activity::{ActivityEvent, ActivityLayer, ActivityLog};
pub use deploy::{DeployRunner, ProgressSource, ScriptedProgress, SimulatedProgress};
pub use shared_store::SharedStore;
