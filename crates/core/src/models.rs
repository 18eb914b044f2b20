//! Weather domain models
//!
//! `WeatherReport` is the provider payload exactly as received. It becomes a
//! `WeatherResult` only once every required field has been located.

use chrono::{DateTime, Utc};
use serde_json::{Number, Value};

use crate::error::MissingField;

/// Measurement system requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Metric,
}

impl Units {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
        }
    }
}

/// A single current-weather request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub city: String,
    pub units: Units,
    pub language: String,
}

impl WeatherQuery {
    pub fn new(city: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            units: Units::Metric,
            language: language.into(),
        }
    }

    /// Query parameters for the provider, without the API key
    pub fn params(&self) -> [(&'static str, &str); 3] {
        [
            ("q", self.city.as_str()),
            ("units", self.units.as_str()),
            ("lang", self.language.as_str()),
        ]
    }
}

/// Raw current-weather payload
///
/// Nothing is validated here: a report with missing fields is still a report.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport(Value);

impl WeatherReport {
    pub const fn new(payload: Value) -> Self {
        Self(payload)
    }

    pub const fn payload(&self) -> &Value {
        &self.0
    }

    fn field<'a, T>(
        &'a self,
        name: &'static str,
        pointer: &str,
        read: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, MissingField> {
        self.0.pointer(pointer).and_then(read).ok_or(MissingField(name))
    }

    /// Whether the payload carries a non-null value at `pointer`
    fn has(&self, pointer: &str) -> bool {
        self.0.pointer(pointer).is_some_and(|value| !value.is_null())
    }
}

/// Fully populated weather observation
///
/// Humidity and pressure keep the provider's number as sent, so `1017` and
/// `1017.0` are both accepted and rendered unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherResult {
    pub city_name: String,
    pub description: String,
    pub temperature_celsius: f64,
    pub humidity_percent: Number,
    pub pressure_hpa: Number,
    pub wind_speed_mps: f64,
    pub sunset: DateTime<Utc>,
}

impl TryFrom<&WeatherReport> for WeatherResult {
    type Error = MissingField;

    fn try_from(report: &WeatherReport) -> Result<Self, Self::Error> {
        // Ground-level pressure wins whenever the provider sends it
        let pressure_hpa = if report.has("/main/grnd_level") {
            report.field("main.grnd_level", "/main/grnd_level", Value::as_number)?
        } else {
            report.field("main.pressure", "/main/pressure", Value::as_number)?
        }
        .clone();

        let sunset = report.field("sys.sunset", "/sys/sunset", Value::as_i64)?;

        Ok(Self {
            city_name: report.field("name", "/name", Value::as_str)?.to_string(),
            description: report
                .field("weather[0].description", "/weather/0/description", Value::as_str)?
                .to_string(),
            temperature_celsius: report.field("main.temp", "/main/temp", Value::as_f64)?,
            humidity_percent: report
                .field("main.humidity", "/main/humidity", Value::as_number)?
                .clone(),
            pressure_hpa,
            wind_speed_mps: report.field("wind.speed", "/wind/speed", Value::as_f64)?,
            sunset: DateTime::from_timestamp(sunset, 0).ok_or(MissingField("sys.sunset"))?,
        })
    }
}
