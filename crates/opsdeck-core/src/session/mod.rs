//! Session domain module.
//!
//! Holds the signed-in user and the derived authentication flag.

mod model;

pub use model::{Session, User};
