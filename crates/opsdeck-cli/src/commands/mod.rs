pub mod config;
pub mod deploy;
pub mod shell;
pub mod snapshot;
