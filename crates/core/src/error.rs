//! Error types for the weather domain

use thiserror::Error;

/// Startup configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Coarse failure category reported by the weather client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Provider unreachable or answered with a non-2xx status
    NetworkError,
    /// Provider answered 2xx but the body could not be used
    MalformedResponse,
}

/// A weather fetch that produced no usable payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeatherFailure {
    #[error("weather provider request failed: {0}")]
    Network(String),

    #[error("weather provider returned status {0}")]
    Status(u16),

    #[error("weather provider returned an unreadable body: {0}")]
    Decode(String),
}

impl WeatherFailure {
    pub const fn reason(&self) -> FailureReason {
        match self {
            Self::Network(_) | Self::Status(_) => FailureReason::NetworkError,
            Self::Decode(_) => FailureReason::MalformedResponse,
        }
    }
}

/// A required field that could not be located in a provider payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing or invalid field `{0}` in weather payload")]
pub struct MissingField(pub &'static str);
