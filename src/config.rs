use crate::store::StoreConfig;
use std::{env, time::Duration};
use thiserror::Error;

pub const DEFAULT_STORE_URL: &str = "https://graphql.fauna.com/graphql";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub ingest_key: String,
    pub store: StoreConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match value("PORT") {
            Some(raw) => parse_number("PORT", &raw)?,
            None => DEFAULT_PORT,
        };
        let timeout_secs = match value("STORE_TIMEOUT_SECS") {
            Some(raw) => match parse_number::<u64>("STORE_TIMEOUT_SECS", &raw)? {
                0 => {
                    return Err(ConfigError::Invalid {
                        key: "STORE_TIMEOUT_SECS",
                        value: raw,
                    });
                }
                secs => secs,
            },
            None => DEFAULT_STORE_TIMEOUT_SECS,
        };

        let ingest_key = value("INGEST_KEY").ok_or(ConfigError::Missing("INGEST_KEY"))?;
        let api_key = value("STORE_KEY")
            .or_else(|| value("FAUNA_KEY"))
            .ok_or(ConfigError::Missing("STORE_KEY"))?;
        let endpoint = value("STORE_URL").unwrap_or_else(|| DEFAULT_STORE_URL.to_string());

        Ok(Self {
            port,
            ingest_key,
            store: StoreConfig {
                endpoint,
                api_key,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}
