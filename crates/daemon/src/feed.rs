//! Upstream feed client.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use stockwatch_core::model::{
    InventoryDocument, InventorySnapshot, Resource, WeatherDocument, WeatherSnapshot,
};
use stockwatch_core::weather::normalize_document;

use crate::error::FetchError;

/// Source of fresh snapshots. One request per call, no retries.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_inventory(&self) -> Result<InventorySnapshot, FetchError>;
    async fn fetch_weather(&self) -> Result<WeatherSnapshot, FetchError>;
}

/// HTTP client for the game-status API.
#[derive(Clone)]
pub struct FeedClient {
    http: Client,
    base_url: String,
}

impl FeedClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn url(&self, resource: Resource) -> String {
        format!("{}/{}", self.base_url, resource.path())
    }

    /// Fetch and decode one resource document.
    pub async fn fetch<T: DeserializeOwned>(&self, resource: Resource) -> Result<T, FetchError> {
        let resp = self
            .http
            .get(self.url(resource))
            .send()
            .await
            .map_err(|e| FetchError::Network {
                resource,
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                resource,
                code: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|e| FetchError::Network {
            resource,
            reason: e.to_string(),
        })?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Parse {
            resource,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_inventory(&self) -> Result<InventorySnapshot, FetchError> {
        let doc: InventoryDocument = self.fetch(Resource::Inventory).await?;
        Ok(InventorySnapshot::from(doc))
    }

    async fn fetch_weather(&self) -> Result<WeatherSnapshot, FetchError> {
        let doc: WeatherDocument = self.fetch(Resource::Weather).await?;
        Ok(normalize_document(&doc))
    }
}
