//! Weatherbot Core - Domain logic and models
//!
//! This crate contains the pure weather domain: configuration, the provider
//! payload model, the message formatter and error types. It performs no I/O.

pub mod config;
pub mod error;
pub mod formatter;
pub mod models;
pub mod timezone;

pub use config::CoreConfig;
pub use error::{ConfigError, FailureReason, MissingField, WeatherFailure};
pub use formatter::{FETCH_FAILED_MESSAGE, PROCESSING_FAILED_MESSAGE, format_weather, format_weather_at};
pub use models::{Units, WeatherQuery, WeatherReport, WeatherResult};
pub use timezone::{DisplayZone, parse_timezone};
