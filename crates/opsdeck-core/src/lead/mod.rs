//! Lead records captured by the marketing side of the dashboard.
//!
//! Data shape only; no store actions operate on leads.

mod model;

pub use model::{Lead, LeadSource, LeadStatus};
