//! Opsdeck core: dashboard domain models and the application state store.
//!
//! Presentation code reads [`store::StoreSnapshot`]s and routes every
//! mutation through [`store::AppStore`] actions.

pub mod agent;
pub mod config;
pub mod deploy;
pub mod error;
pub mod id;
pub mod lead;
pub mod notification;
pub mod session;
pub mod store;
pub mod theme;
pub mod training;

// Re-export common types
pub use error::{OpsdeckError, Result};
pub use store::{AppStore, StoreAction, StoreSnapshot};
