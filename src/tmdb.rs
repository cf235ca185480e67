use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;

const LOCALE: &str = "en-US";

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("TMDB error {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("TMDB_API_KEY is not configured")]
    Config,
    #[error("TMDB request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// Outbound access to the metadata provider. Handlers depend on this trait so tests
/// can swap in a fake provider.
#[async_trait]
pub trait TmdbApi: Send + Sync {
    /// GET `path` with `params` merged over the credential and locale. Parameters with an
    /// empty value are left out. Non-JSON bodies come back as a JSON string.
    async fn call(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, ProxyError>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base: String,
    api_key: Option<String>,
}

impl TmdbClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let user_agent = format!("marquee/{}", env!("CARGO_PKG_VERSION"));
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build TMDB HTTP client")?;
        Ok(Self::with_client(
            client,
            &config.tmdb_base,
            config.tmdb_api_key.clone(),
        ))
    }

    pub fn with_client(client: Client, base: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn call(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, ProxyError> {
        let api_key = self.api_key.as_deref().ok_or(ProxyError::Config)?;
        let url = format!("{}{}", self.base, path);
        debug!(path = %path, "TMDB request");

        let res = self
            .client
            .get(&url)
            .query(&build_query(api_key, params))
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

/// Credential and locale first, then caller params. A caller param replaces a fixed one
/// of the same name; empty values are dropped.
pub fn build_query(api_key: &str, params: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut query: Vec<(String, String)> = vec![
        ("api_key".to_string(), api_key.to_string()),
        ("language".to_string(), LOCALE.to_string()),
    ];
    for (name, value) in params {
        if value.is_empty() {
            continue;
        }
        match query.iter_mut().find(|(existing, _)| existing == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => query.push((name.to_string(), value.to_string())),
        }
    }
    query
}

/// Path segment for a caller-supplied movie id.
pub fn movie_path(id: &str, suffix: &str) -> String {
    format!("/movie/{}{}", urlencoding::encode(id), suffix)
}
