//! Agent domain module.
//!
//! Agents are added and status-toggled; the store never removes them.

mod model;

pub use model::{Agent, AgentStatus, NewAgent, default_seed_agents};
