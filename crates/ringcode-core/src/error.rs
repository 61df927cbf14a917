//! Error types for the ringcode engine
//!
//! None of these errors ever leave the call state reactor: registry and tone
//! device failures are logged there and degrade to silence. They are returned
//! by the boundary traits and by the configuration/registry loading helpers.

use thiserror::Error;

/// Result type for ringcode operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the ringcode engine
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A configuration value is outside its permitted range
    #[error("Invalid value {value} for '{field}': {reason}")]
    InvalidConfigValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The assignment registry could not be read
    #[error("Assignment registry unavailable: {message}")]
    RegistryUnavailable { message: String },

    /// No assignment record with the given id
    #[error("Assignment not found: {id}")]
    AssignmentNotFound { id: u64 },

    /// The tone device could not produce a tone
    #[error("Tone device error: {message}")]
    ToneDevice { message: String },

    /// Underlying I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML or JSON input
    #[error("Parse error: {message}")]
    Parse { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an out-of-range configuration value error
    pub fn invalid_value(
        field: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfigValue {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a registry unavailable error
    pub fn registry(message: impl Into<String>) -> Self {
        Self::RegistryUnavailable {
            message: message.into(),
        }
    }

    /// Create a tone device error
    pub fn tone_device(message: impl Into<String>) -> Self {
        Self::ToneDevice {
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
        }
    }
}
