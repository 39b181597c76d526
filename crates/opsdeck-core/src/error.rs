//! Error type for the fallible edges around the store.
//!
//! Store actions never fail. Errors come from configuration files, path
//! resolution and parsing user input into actions.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpsdeckError {
    /// File system failure, with the io error kind folded into the message.
    #[error("IO error: {message}")]
    Io { message: String },

    /// A TOML or JSON document could not be read or written.
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: &'static str,
        message: String,
    },

    /// Configuration could not be located or is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input that could not be turned into a store action or config value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl OpsdeckError {
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

impl From<std::io::Error> for OpsdeckError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for OpsdeckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON",
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for OpsdeckError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML",
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for OpsdeckError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML",
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OpsdeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_error() {
        let parse_err = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let err: OpsdeckError = parse_err.into();
        assert!(err.is_serialization());
        assert!(err.to_string().starts_with("Serialization error: TOML"));
    }

    #[test]
    fn test_from_json_error() {
        let err: OpsdeckError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, OpsdeckError::Serialization { format: "JSON", .. }));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: OpsdeckError = io.into();
        assert!(matches!(err, OpsdeckError::Io { .. }));
        assert!(err.to_string().contains("NotFound"));
    }
}
