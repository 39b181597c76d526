//! The application state store.
//!
//! - `app_store`: [`AppStore`], the single owner of dashboard state and its actions
//! - `action`: [`StoreAction`], serializable intents dispatched into the store
//! - `snapshot`: [`StoreSnapshot`], owned read-only copies handed to consumers

mod action;
mod app_store;
mod snapshot;

pub use action::{ActionOutcome, StoreAction};
pub use app_store::AppStore;
pub use snapshot::StoreSnapshot;
