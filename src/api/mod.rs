use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::AppConfig;
use crate::internal::models::Item;

pub const HN_API_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0/";

/// Any failure talking to the content API. None of these are retried.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only view of the content API consumed by the fetch layer.
pub trait ContentApi {
    /// Ranked ids of the current top stories.
    fn get_top_stories(&self) -> impl Future<Output = Result<Vec<u32>, TransportError>> + Send;

    /// A single item, without `children` populated.
    fn get_item(&self, id: u32) -> impl Future<Output = Result<Item, TransportError>> + Send;
}

/// HTTP client for the Hacker News Firebase API.
///
/// Each request carries the configured timeout; running past it is reported as a
/// regular [`TransportError::Request`].
#[derive(Clone)]
pub struct ApiService {
    client: Client,
    base_url: String,
}

impl ApiService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url.into()),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, id: u32) -> String {
        format!("{}item/{}.json", self.base_url, id)
    }

    fn top_stories_url(&self) -> String {
        format!("{}topstories.json", self.base_url)
    }

    /// GET `url` and decode the JSON body into `T`.
    async fn get_json<T>(&self, url: String) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
    {
        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(source) => {
                tracing::debug!(%url, error = %source, "request failed");
                return Err(TransportError::Request { url, source });
            }
        };

        let status = resp.status();
        tracing::debug!(%url, status = status.as_u16(), "request returned");
        if !status.is_success() {
            return Err(TransportError::Status { url, status });
        }

        let body = match resp.bytes().await {
            Ok(body) => body,
            Err(source) => return Err(TransportError::Request { url, source }),
        };
        serde_json::from_slice(&body).map_err(|source| TransportError::Decode { url, source })
    }
}

impl ContentApi for ApiService {
    async fn get_top_stories(&self) -> Result<Vec<u32>, TransportError> {
        self.get_json(self.top_stories_url()).await
    }

    async fn get_item(&self, id: u32) -> Result<Item, TransportError> {
        self.get_json(self.item_url(id)).await
    }
}

fn normalize_base_url(mut base_url: String) -> String {
    if !base_url.ends_with('/') {
        base_url.push('/');
    }
    base_url
}
