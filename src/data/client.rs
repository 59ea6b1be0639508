//! PokeAPI client
//!
//! This module fetches location areas and Pokemon from PokeAPI. Every request is
//! looked up in the response cache first, keyed by its full URL, and successful
//! responses are stored back as raw bytes before being decoded.

use bytes::Bytes;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use super::{LocationArea, LocationAreaPage, Pokemon};
use crate::cache::Cache;

/// Base URL for the PokeAPI v2 endpoints
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Number of location areas shown per page
const PAGE_SIZE: u32 = 20;

/// Errors that can occur when fetching from PokeAPI
#[derive(Debug, Error)]
pub enum PokeApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The resource does not exist
    #[error("Not found: {url}")]
    NotFound { url: String },

    /// Any other non-success status
    #[error("Unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },

    /// A name that cannot stand as a single path segment
    #[error("Invalid name: '{0}'")]
    InvalidName(String),

    /// The configured base URL cannot have resource paths appended
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Client for fetching PokeAPI resources through the response cache
#[derive(Debug)]
pub struct PokeApiClient {
    client: Client,
    base_url: String,
    cache: Cache,
}

impl PokeApiClient {
    /// Creates a client for the public PokeAPI
    pub fn new(cache: Cache) -> Self {
        Self::with_base_url(cache, DEFAULT_BASE_URL)
    }

    /// Creates a client for a custom base URL (mirrors, tests)
    pub fn with_base_url(cache: Cache, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            cache,
        }
    }

    /// The response cache backing this client
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Consumes the client, handing back its cache so it can be shut down
    pub fn into_cache(self) -> Cache {
        self.cache
    }

    /// URL of the first page of location areas
    pub fn first_page_url(&self) -> String {
        format!(
            "{}/location-area/?offset=0&limit={}",
            self.base_url, PAGE_SIZE
        )
    }

    /// Fetches a page of location areas
    ///
    /// # Arguments
    /// * `page_url` - A `next`/`previous` URL from an earlier page, or `None`
    ///   for the first page
    pub async fn location_areas(
        &self,
        page_url: Option<&str>,
    ) -> Result<LocationAreaPage, PokeApiError> {
        match page_url {
            Some(url) => self.fetch_json(url).await,
            None => self.fetch_json(&self.first_page_url()).await,
        }
    }

    /// Fetches a location area by name or id
    pub async fn location_area(&self, name: &str) -> Result<LocationArea, PokeApiError> {
        let url = self.resource_url("location-area", name)?;
        self.fetch_json(&url).await
    }

    /// Fetches a Pokemon by name or id
    pub async fn pokemon(&self, name: &str) -> Result<Pokemon, PokeApiError> {
        let url = self.resource_url("pokemon", &name.to_lowercase())?;
        self.fetch_json(&url).await
    }

    /// Builds `{base_url}/{collection}/{name}` with `name` kept as one
    /// percent-encoded segment, so `/`, `?` and `#` can't reach another endpoint
    fn resource_url(&self, collection: &str, name: &str) -> Result<String, PokeApiError> {
        if name.is_empty() || name == "." || name == ".." {
            return Err(PokeApiError::InvalidName(name.to_string()));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PokeApiError::InvalidBaseUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| PokeApiError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(collection)
            .push(name);
        Ok(url.into())
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, PokeApiError> {
        let body = self.fetch(url).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Returns the raw body for `url`, from the cache when present
    ///
    /// Only 2xx responses are added to the cache.
    pub async fn fetch(&self, url: &str) -> Result<Bytes, PokeApiError> {
        if let Some(body) = self.cache.get(url) {
            debug!(url, "Cache hit");
            return Ok(body);
        }

        debug!(url, "Cache miss, fetching");
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(PokeApiError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            warn!(url, %status, "Request failed");
            return Err(PokeApiError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        self.cache.add(url, body.clone());
        Ok(body)
    }
}
