use std::time::Duration;

use crate::domain::Error;

pub const DEFAULT_ENDPOINT: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6379;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Redis,
    Memory,
}

/// Knobs the gateway applies around every store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayOptions {
    pub op_timeout: Duration,
    pub read_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            op_timeout: Duration::from_millis(250),
            read_retries: 2,
            retry_backoff: Duration::from_millis(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: Backend,
    pub endpoint: String,
    pub port: u16,
    pub gateway: GatewayOptions,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Redis,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            port: DEFAULT_PORT,
            gateway: GatewayOptions::default(),
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; unset or blank variables
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(backend) = var("STORE_BACKEND") {
            config.backend = match backend.trim().to_ascii_lowercase().as_str() {
                "redis" => Backend::Redis,
                "memory" => Backend::Memory,
                other => {
                    return Err(Error::Config(format!("unknown STORE_BACKEND {other:?}")));
                }
            };
        }
        if let Some(endpoint) = var("ENDPOINT") {
            config.endpoint = endpoint.trim().to_string();
        }
        if let Some(port) = var("PORT") {
            config.port = parse_number("PORT", &port)?;
        }
        if let Some(ms) = var("STORE_TIMEOUT_MS") {
            config.gateway.op_timeout = Duration::from_millis(parse_number("STORE_TIMEOUT_MS", &ms)?);
        }
        if let Some(retries) = var("STORE_READ_RETRIES") {
            config.gateway.read_retries = parse_number("STORE_READ_RETRIES", &retries)?;
        }
        if let Some(ms) = var("STORE_RETRY_BACKOFF_MS") {
            config.gateway.retry_backoff =
                Duration::from_millis(parse_number("STORE_RETRY_BACKOFF_MS", &ms)?);
        }

        Ok(config)
    }

    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.endpoint, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, Error> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{name} must be a number, got {raw:?}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = StoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.redis_url(), "redis://127.0.0.1:6379/");
    }

    #[test]
    fn reads_endpoint_port_and_tuning() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("ENDPOINT", "cache.internal"),
            ("PORT", "7000"),
            ("STORE_BACKEND", "Memory"),
            ("STORE_TIMEOUT_MS", "40"),
            ("STORE_READ_RETRIES", "0"),
        ]))
        .unwrap();

        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.redis_url(), "redis://cache.internal:7000/");
        assert_eq!(config.gateway.op_timeout, Duration::from_millis(40));
        assert_eq!(config.gateway.read_retries, 0);
    }

    #[test]
    fn blank_port_keeps_default() {
        let config = StoreConfig::from_lookup(lookup_from(&[("PORT", "")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            StoreConfig::from_lookup(lookup_from(&[("PORT", "http")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            StoreConfig::from_lookup(lookup_from(&[("STORE_BACKEND", "etcd")])),
            Err(Error::Config(_))
        ));
    }
}
