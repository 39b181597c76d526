//! Filesystem-facing pieces of opsdeck: directory layout and configuration.

pub mod config_service;
pub mod paths;
pub mod storage;

pub use config_service::ConfigService;
pub use paths::{OpsdeckPaths, PathError};
pub use storage::AtomicTomlFile;
