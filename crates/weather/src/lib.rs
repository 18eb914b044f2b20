//! Weatherbot Weather - OpenWeather client
//!
//! Fetches current weather for a city. Failures are logged here and handed
//! back as values; nothing in this crate panics or retries.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;
use weatherbot_core::{CoreConfig, WeatherFailure, WeatherQuery, WeatherReport};

/// Anything that can answer "what is the weather in this city right now"
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch current weather, falling back to the default city when `city`
    /// is `None` or blank
    async fn fetch(&self, city: Option<&str>) -> Result<WeatherReport, WeatherFailure>;
}

/// OpenWeather "current weather" client
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    default_city: String,
    language: String,
}

impl OpenWeatherClient {
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        default_city: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            api_key: api_key.into(),
            default_city: default_city.into(),
            language: language.into(),
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(
            config.weather_api_url.clone(),
            config.weather_api_key.clone(),
            config.default_city.clone(),
            config.weather_lang.clone(),
        )
    }

    /// Build the query for a requested city
    pub fn query(&self, city: Option<&str>) -> WeatherQuery {
        let city = city
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.default_city.as_str());
        WeatherQuery::new(city, self.language.as_str())
    }

    async fn request(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherFailure> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .extend_pairs(query.params())
            .append_pair("appid", &self.api_key);

        let res = self
            .http
            .get(url)
            .send()
            .await
            // The request URL carries the API key
            .map_err(|e| WeatherFailure::Network(e.without_url().to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(WeatherFailure::Status(status.as_u16()));
        }

        let body = res
            .text()
            .await
            .map_err(|e| WeatherFailure::Network(e.without_url().to_string()))?;

        match serde_json::from_str::<Value>(&body) {
            Ok(payload) if payload.is_object() => Ok(WeatherReport::new(payload)),
            Ok(_) => Err(WeatherFailure::Decode("expected a JSON object".to_string())),
            Err(e) => Err(WeatherFailure::Decode(e.to_string())),
        }
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch(&self, city: Option<&str>) -> Result<WeatherReport, WeatherFailure> {
        let query = self.query(city);
        tracing::debug!(city = %query.city, lang = %query.language, "Requesting current weather");

        let result = self.request(&query).await;
        if let Err(e) = &result {
            tracing::error!(city = %query.city, reason = ?e.reason(), "Weather request failed: {}", e);
        }
        result
    }
}
