//! HTTP client the frontend uses to talk to the gateway.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config;
use crate::models::{HomeBundle, SearchResults, TrailerKey};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{what} failed: {status}")]
    Status { what: &'static str, status: u16 },
    #[error("{0}")]
    Network(#[from] reqwest::Error),
}

#[async_trait]
pub trait GatewayApi: Send + Sync {
    async fn get_home(&self) -> Result<HomeBundle, ClientError>;
    async fn search_movies(&self, query: &str) -> Result<SearchResults, ClientError>;
    async fn get_trailer(&self, movie_id: i64) -> Result<TrailerKey, ClientError>;
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base: String,
}

impl GatewayClient {
    pub fn from_env() -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build gateway HTTP client")?;
        Ok(Self::new(client, &config::api_base_from_env()))
    }

    pub fn new(client: Client, base: &str) -> Self {
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        what: &'static str,
        path: &str,
    ) -> Result<T, ClientError> {
        let res = self
            .client
            .get(format!("{}{}", self.base, path))
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                what,
                status: status.as_u16(),
            });
        }
        Ok(res.json().await?)
    }
}

#[async_trait]
impl GatewayApi for GatewayClient {
    async fn get_home(&self) -> Result<HomeBundle, ClientError> {
        self.get_json("Home", "/api/home").await
    }

    async fn search_movies(&self, query: &str) -> Result<SearchResults, ClientError> {
        let path = format!("/api/search?q={}", urlencoding::encode(query));
        self.get_json("Search", &path).await
    }

    async fn get_trailer(&self, movie_id: i64) -> Result<TrailerKey, ClientError> {
        let path = format!("/api/movie/{}/trailer", movie_id);
        self.get_json("Trailer", &path).await
    }
}
