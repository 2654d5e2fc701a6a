//! Configuration loading from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

const DEFAULT_SWOP_BASE_URL: &str = "https://swop.cx/rest";

/// InfluxDB connection settings. Present only when every value is set.
#[derive(Debug, Clone, PartialEq)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub swop_base_url: String,
    pub swop_api_key: String,
    pub swop_timeout: Duration,
    pub rate_cache_ttl: Duration,
    pub influx: Option<InfluxConfig>,
    pub app_secret: Option<String>,
    pub session_idle: Duration,
    pub rate_limit_per_minute: u32,
    pub cors_allowed_origin: Option<String>,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = parse_or(&get, "PORT", 3000u16)?;
        let swop_base_url = get("SWOP_BASE_URL").unwrap_or_else(|| DEFAULT_SWOP_BASE_URL.into());
        let swop_api_key = get("SWOP_API_KEY")
            .ok_or_else(|| anyhow::anyhow!("SWOP_API_KEY environment variable is required"))?;
        let swop_timeout = Duration::from_millis(parse_or(&get, "SWOP_TIMEOUT_MS", 3000u64)?);
        let rate_cache_ttl = Duration::from_secs(parse_or(&get, "RATE_CACHE_TTL", 3600u64)?);

        let influx = match (
            get("INFLUX_URL"),
            get("INFLUX_TOKEN"),
            get("INFLUX_ORG"),
            get("INFLUX_BUCKET"),
        ) {
            (Some(url), Some(token), Some(org), Some(bucket)) => Some(InfluxConfig {
                url,
                token,
                org,
                bucket,
            }),
            _ => None,
        };

        Ok(Self {
            port,
            swop_base_url,
            swop_api_key,
            swop_timeout,
            rate_cache_ttl,
            influx,
            app_secret: get("APP_SECRET"),
            session_idle: Duration::from_secs(parse_or(&get, "SESSION_IDLE_SECONDS", 1440u64)?),
            rate_limit_per_minute: parse_or(&get, "RATE_LIMIT_PER_MINUTE", 100u32)?,
            cors_allowed_origin: get("CORS_ALLOWED_ORIGIN"),
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} must be a non-negative integer, got {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("SWOP_API_KEY", "k")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.swop_base_url, "https://swop.cx/rest");
        assert_eq!(config.swop_api_key, "k");
        assert_eq!(config.swop_timeout, Duration::from_secs(3));
        assert_eq!(config.rate_cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.session_idle, Duration::from_secs(1440));
        assert_eq!(config.rate_limit_per_minute, 100);
        assert!(config.influx.is_none());
        assert!(config.app_secret.is_none());
        assert!(config.cors_allowed_origin.is_none());
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_api_key_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("SWOP_API_KEY"));

        let err = load(&[("SWOP_API_KEY", "   ")]).unwrap_err();
        assert!(err.to_string().contains("SWOP_API_KEY"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SWOP_API_KEY", "k"),
            ("PORT", "8080"),
            ("SWOP_BASE_URL", "http://localhost:9000"),
            ("SWOP_TIMEOUT_MS", "250"),
            ("RATE_CACHE_TTL", "60"),
            ("SESSION_IDLE_SECONDS", "30"),
            ("RATE_LIMIT_PER_MINUTE", "5"),
            ("APP_SECRET", "s3cret"),
            ("CORS_ALLOWED_ORIGIN", "http://localhost:5173"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.swop_base_url, "http://localhost:9000");
        assert_eq!(config.swop_timeout, Duration::from_millis(250));
        assert_eq!(config.rate_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.session_idle, Duration::from_secs(30));
        assert_eq!(config.rate_limit_per_minute, 5);
        assert_eq!(config.app_secret.as_deref(), Some("s3cret"));
        assert_eq!(
            config.cors_allowed_origin.as_deref(),
            Some("http://localhost:5173")
        );
    }

    #[test]
    fn test_invalid_number_names_variable() {
        let err = load(&[("SWOP_API_KEY", "k"), ("RATE_CACHE_TTL", "soon")]).unwrap_err();
        assert!(err.to_string().contains("RATE_CACHE_TTL"));

        let err = load(&[("SWOP_API_KEY", "k"), ("PORT", "-1")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_influx_needs_every_value() {
        let partial = load(&[
            ("SWOP_API_KEY", "k"),
            ("INFLUX_URL", "http://influx:8086"),
            ("INFLUX_TOKEN", "t"),
            ("INFLUX_ORG", "o"),
        ])
        .unwrap();
        assert!(partial.influx.is_none());

        let full = load(&[
            ("SWOP_API_KEY", "k"),
            ("INFLUX_URL", "http://influx:8086"),
            ("INFLUX_TOKEN", "t"),
            ("INFLUX_ORG", "o"),
            ("INFLUX_BUCKET", "b"),
        ])
        .unwrap();
        assert_eq!(
            full.influx,
            Some(InfluxConfig {
                url: "http://influx:8086".into(),
                token: "t".into(),
                org: "o".into(),
                bucket: "b".into(),
            })
        );
    }
}
