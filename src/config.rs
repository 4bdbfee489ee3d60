use std::net::IpAddr;
use std::time::Duration;

use crate::error::Error;

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub http_timeout: Duration,
    pub max_count: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host: IpAddr = env_or("FORMRUNNER_HOST", "127.0.0.1")
            .parse()
            .map_err(|e| Error::Config(format!("Invalid FORMRUNNER_HOST: {e}")))?;

        let port: u16 = env_or("FORMRUNNER_PORT", "5050")
            .parse()
            .map_err(|e| Error::Config(format!("Invalid FORMRUNNER_PORT: {e}")))?;

        let log_level = env_or("FORMRUNNER_LOG_LEVEL", "info");

        let timeout_secs: u64 = env_or(
            "FORMRUNNER_HTTP_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse()
        .map_err(|e| Error::Config(format!("Invalid FORMRUNNER_HTTP_TIMEOUT_SECS: {e}")))?;
        if timeout_secs == 0 {
            return Err(Error::Config(
                "FORMRUNNER_HTTP_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        let max_count: u32 = env_or("FORMRUNNER_MAX_COUNT", "10000")
            .parse()
            .map_err(|e| Error::Config(format!("Invalid FORMRUNNER_MAX_COUNT: {e}")))?;

        Ok(Config {
            host,
            port,
            log_level,
            http_timeout: Duration::from_secs(timeout_secs),
            max_count,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 5050,
            log_level: "info".to_string(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_count: 10_000,
        }
    }
}
