use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_TMDB_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_API_BASE: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gateway settings sourced from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider credential. `None` keeps the gateway running; provider calls then fail.
    pub tmdb_api_key: Option<String>,
    pub port: u16,
    pub cors_origin: String,
    pub tmdb_base: String,
    /// `None` leaves outbound calls on the transport default.
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match non_empty("TMDB_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().with_context(|| {
                format!("TMDB_TIMEOUT_SECS must be a whole number, got '{}'", raw)
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            tmdb_api_key: non_empty("TMDB_API_KEY"),
            port,
            cors_origin: non_empty("CORS_ORIGIN")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            tmdb_base: non_empty("TMDB_BASE_URL")
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_TMDB_BASE.to_string()),
            request_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        })
    }
}

/// Base URL of the gateway as seen by the frontend client.
pub fn api_base_from_env() -> String {
    env::var("MARQUEE_API_BASE")
        .ok()
        .map(|b| b.trim().trim_end_matches('/').to_string())
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}
