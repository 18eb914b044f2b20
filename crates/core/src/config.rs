//! Shared configuration logic
//!
//! Handles loading of the environment variables every service needs.

use crate::error::ConfigError;
use crate::timezone::{DisplayZone, parse_timezone};
use url::Url;

/// City used when a command does not name one
pub const DEFAULT_CITY: &str = "Saint Petersburg";

/// Language requested from the weather provider
pub const DEFAULT_WEATHER_LANG: &str = "ru";

/// OpenWeather "current weather" endpoint
pub const DEFAULT_WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Common configuration used across services
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Telegram bot token
    pub telegram_token: String,

    /// OpenWeather API key
    pub weather_api_key: String,

    /// City reported by /start and /weather
    pub default_city: String,

    /// Provider language for weather descriptions (`lang` query parameter)
    pub weather_lang: String,

    /// Current-weather endpoint
    pub weather_api_url: Url,

    /// Timezone used to render sunset and update times
    pub display_zone: DisplayZone,
}

impl CoreConfig {
    /// Build configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let weather_api_url = optional(&lookup, "WEATHER_API_URL")
            .unwrap_or_else(|| DEFAULT_WEATHER_API_URL.to_string());
        let weather_api_url = Url::parse(&weather_api_url).map_err(|e| ConfigError::InvalidValue {
            var: "WEATHER_API_URL".to_string(),
            reason: e.to_string(),
        })?;

        let display_zone = match optional(&lookup, "DISPLAY_TIMEZONE") {
            Some(name) => DisplayZone::Named(parse_timezone(&name).map_err(|_| {
                ConfigError::InvalidValue {
                    var: "DISPLAY_TIMEZONE".to_string(),
                    reason: format!("unknown timezone '{name}'"),
                }
            })?),
            None => DisplayZone::Local,
        };

        Ok(Self {
            telegram_token: required(&lookup, "TELEGRAM_TOKEN")?,
            weather_api_key: required(&lookup, "API_KEY")?,
            default_city: optional(&lookup, "DEFAULT_CITY").unwrap_or_else(|| DEFAULT_CITY.into()),
            weather_lang: optional(&lookup, "WEATHER_LANG")
                .unwrap_or_else(|| DEFAULT_WEATHER_LANG.into()),
            weather_api_url,
            display_zone,
        })
    }
}

/// Read a variable, treating blank values as unset
pub fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read a variable that must be present and non-blank
pub fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn load(pairs: &[(&str, &str)]) -> Result<CoreConfig, ConfigError> {
        let map = vars(pairs);
        CoreConfig::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn test_core_config_defaults() {
        let config = load(&[("TELEGRAM_TOKEN", "123:abc"), ("API_KEY", "key")]).unwrap();

        assert_eq!(config.telegram_token, "123:abc");
        assert_eq!(config.weather_api_key, "key");
        assert_eq!(config.default_city, "Saint Petersburg");
        assert_eq!(config.weather_lang, "ru");
        assert_eq!(config.weather_api_url.as_str(), DEFAULT_WEATHER_API_URL);
        assert_eq!(config.display_zone, DisplayZone::Local);
    }

    #[test]
    fn test_core_config_overrides() {
        let config = load(&[
            ("TELEGRAM_TOKEN", "123:abc"),
            ("API_KEY", "key"),
            ("DEFAULT_CITY", "Moscow"),
            ("WEATHER_LANG", "en"),
            ("WEATHER_API_URL", "http://127.0.0.1:9999/weather"),
            ("DISPLAY_TIMEZONE", "Europe/Moscow"),
        ])
        .unwrap();

        assert_eq!(config.default_city, "Moscow");
        assert_eq!(config.weather_lang, "en");
        assert_eq!(config.weather_api_url.as_str(), "http://127.0.0.1:9999/weather");
        assert_eq!(
            config.display_zone,
            DisplayZone::Named(chrono_tz::Europe::Moscow)
        );
    }

    #[test]
    fn test_missing_token_is_named() {
        let err = load(&[("API_KEY", "key")]).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar("TELEGRAM_TOKEN".to_string()));
        assert!(err.to_string().contains("TELEGRAM_TOKEN"));
    }

    #[test]
    fn test_missing_api_key_is_named() {
        let err = load(&[("TELEGRAM_TOKEN", "123:abc")]).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar("API_KEY".to_string()));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let err = load(&[("TELEGRAM_TOKEN", "   "), ("API_KEY", "key")]).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar("TELEGRAM_TOKEN".to_string()));
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let err = load(&[
            ("TELEGRAM_TOKEN", "123:abc"),
            ("API_KEY", "key"),
            ("DISPLAY_TIMEZONE", "Mars/Olympus"),
        ])
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "DISPLAY_TIMEZONE"));
    }

    #[test]
    fn test_invalid_api_url_rejected() {
        let err = load(&[
            ("TELEGRAM_TOKEN", "123:abc"),
            ("API_KEY", "key"),
            ("WEATHER_API_URL", "not a url"),
        ])
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "WEATHER_API_URL"));
    }
}
