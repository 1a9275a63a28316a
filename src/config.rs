// src/config.rs
use std::time::Duration;

use thiserror::Error;

use crate::services::provider::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL, GeminiConfig};

pub const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 120;
const DEFAULT_ORIGINS: &str =
    "https://e-book-for-me.web.app,http://localhost:3000,http://127.0.0.1:5500";
const DEFAULT_METHODS: &str = "GET,POST,OPTIONS";
const DEFAULT_HEADERS: &str = "*";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is invalid: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Either any value, or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowList {
    Any,
    List(Vec<String>),
}

impl AllowList {
    fn parse(raw: &str) -> Self {
        let items: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if items.iter().any(|s| s == "*") {
            AllowList::Any
        } else {
            AllowList::List(items)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: AllowList,
    pub allow_credentials: bool,
    pub allowed_methods: AllowList,
    pub allowed_headers: AllowList,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: AllowList::parse(DEFAULT_ORIGINS),
            allow_credentials: true,
            allowed_methods: AllowList::parse(DEFAULT_METHODS),
            allowed_headers: AllowList::parse(DEFAULT_HEADERS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// `None` when `GEMINI_API_KEY` is absent.
    pub gemini: Option<GeminiConfig>,
    pub cors: CorsConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let connect_timeout_secs =
            secs(&get, "GEMINI_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?;
        let read_timeout_secs = secs(&get, "GEMINI_READ_TIMEOUT_SECS", DEFAULT_READ_TIMEOUT_SECS)?;

        let gemini = get("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_key,
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: get("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            read_timeout: Duration::from_secs(read_timeout_secs),
        });

        let allow_credentials = match get("CORS_ALLOW_CREDENTIALS") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
                key: "CORS_ALLOW_CREDENTIALS",
                value: raw,
            })?,
            None => true,
        };

        let cors = CorsConfig {
            allowed_origins: AllowList::parse(
                &get("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ORIGINS.to_string()),
            ),
            allow_credentials,
            allowed_methods: AllowList::parse(
                &get("CORS_ALLOWED_METHODS").unwrap_or_else(|| DEFAULT_METHODS.to_string()),
            ),
            allowed_headers: AllowList::parse(
                &get("CORS_ALLOWED_HEADERS").unwrap_or_else(|| DEFAULT_HEADERS.to_string()),
            ),
        };

        Ok(Self { port, gemini, cors })
    }
}

fn secs<G>(get: &G, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
