use std::env;
use std::net::{IpAddr, SocketAddr};

use bot::{Transport, WebhookSettings};
use url::Url;
use weatherbot_core::config::{CoreConfig, optional};
use weatherbot_core::ConfigError;

#[derive(Debug, Clone)]
pub struct UnifiedConfig {
    pub core: CoreConfig,
    pub server: ServerConfig,
    pub webhook: Option<WebhookConfig>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub health_port: u16,
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub public_url: Url,
    pub secret: Option<String>,
}

impl UnifiedConfig {
    /// Read the process environment; `.env` is loaded by `main` beforehand
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let core = CoreConfig::from_vars(&lookup)?;

        let webhook = match optional(&lookup, "WEBHOOK_URL") {
            Some(raw) => Some(WebhookConfig {
                public_url: parse_public_url(&raw)?,
                secret: optional(&lookup, "WEBHOOK_SECRET")
                    .map(validate_secret)
                    .transpose()?,
            }),
            None => None,
        };

        Ok(Self {
            core,
            server: ServerConfig {
                host: parse_var(&lookup, "HOST", "0.0.0.0")?,
                port: parse_var(&lookup, "PORT", "5000")?,
                health_port: parse_var(&lookup, "HEALTH_PORT", "8080")?,
            },
            webhook,
        })
    }

    pub const fn health_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.health_port)
    }

    pub fn to_transport(&self) -> Transport {
        self.webhook
            .as_ref()
            .map_or(Transport::Polling, |webhook| {
                Transport::Webhook(WebhookSettings {
                    address: SocketAddr::new(self.server.host, self.server.port),
                    public_url: webhook.public_url.clone(),
                    secret: webhook.secret.clone(),
                })
            })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional(lookup, key)
        .unwrap_or_else(|| default.to_string())
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            var: key.to_string(),
            reason: e.to_string(),
        })
}

fn parse_public_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        var: "WEBHOOK_URL".to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "https" {
        return Err(invalid("Telegram only delivers webhooks over https".to_string()));
    }
    Ok(url)
}

/// Telegram accepts 1-256 characters from `A-Z`, `a-z`, `0-9`, `_` and `-`
fn validate_secret(secret: String) -> Result<String, ConfigError> {
    let valid_chars = secret
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

    if valid_chars && secret.len() <= 256 {
        Ok(secret)
    } else {
        Err(ConfigError::InvalidValue {
            var: "WEBHOOK_SECRET".to_string(),
            reason: "expected 1-256 characters of A-Z, a-z, 0-9, _ or -".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<UnifiedConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        UnifiedConfig::from_vars(|key| map.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [("TELEGRAM_TOKEN", "123:abc"), ("API_KEY", "key")];

    #[test]
    fn test_polling_defaults() {
        let config = load(&REQUIRED).unwrap();

        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.health_port, 8080);
        assert!(config.webhook.is_none());
        assert!(matches!(config.to_transport(), Transport::Polling));
        assert_eq!(config.health_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_webhook_mode() {
        let config = load(&[
            REQUIRED[0],
            REQUIRED[1],
            ("WEBHOOK_URL", "https://bot.example.com"),
            ("WEBHOOK_SECRET", "s3cret_value-1"),
            ("PORT", "8443"),
        ])
        .unwrap();

        let Transport::Webhook(settings) = config.to_transport() else {
            panic!("expected webhook transport");
        };
        assert_eq!(settings.address.port(), 8443);
        assert_eq!(settings.public_url.host_str(), Some("bot.example.com"));
        assert_eq!(settings.secret.as_deref(), Some("s3cret_value-1"));
    }

    #[test]
    fn test_missing_token_stops_startup() {
        let err = load(&[("API_KEY", "key")]).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_TOKEN"));
    }

    #[test]
    fn test_missing_api_key_stops_startup() {
        let err = load(&[("TELEGRAM_TOKEN", "123:abc")]).unwrap_err();
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[REQUIRED[0], REQUIRED[1], ("PORT", "invalid")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "PORT"));
    }

    #[test]
    fn test_webhook_requires_https() {
        let err = load(&[REQUIRED[0], REQUIRED[1], ("WEBHOOK_URL", "http://bot.example.com")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "WEBHOOK_URL"));
    }

    #[test]
    fn test_invalid_webhook_secret() {
        let err = load(&[
            REQUIRED[0],
            REQUIRED[1],
            ("WEBHOOK_URL", "https://bot.example.com"),
            ("WEBHOOK_SECRET", "has spaces!"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "WEBHOOK_SECRET"));
    }
}
