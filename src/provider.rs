//! Image providers and concurrent deck fetching
//!
//! A provider never fails outward: any problem fetching slot `i` resolves to
//! the provider's fallback reference so the deck is always fully populated.

use chrono::Utc;
use futures::future::join_all;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str = "https://cataas.com/cat";
pub const DEFAULT_FALLBACK_URL: &str = "https://cataas.com/cat";

/// How long a single image probe may take before falling back
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Image reference for one deck slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub id: usize,
    pub image_ref: String,
}

pub trait ImageProvider: Send + Sync {
    /// Fetches a unique image for slot `index`, or the fallback on failure.
    fn fetch_unique(&self, index: usize) -> impl Future<Output = FetchedImage> + Send;
}

/// Fetches `count` images concurrently and returns them ordered by slot.
pub async fn fetch_images<P: ImageProvider>(provider: &P, count: usize) -> Vec<FetchedImage> {
    let mut images = join_all((0..count).map(|index| provider.fetch_unique(index))).await;
    images.sort_by_key(|image| image.id);

    tracing::info!(count = images.len(), "images fetched");
    images
}

/// Fetches images over HTTP with a per-slot cache-busting query
#[derive(Debug, Clone)]
pub struct HttpImageProvider {
    client: reqwest::Client,
    source_url: String,
    fallback_url: String,
    timeout: Duration,
}

impl HttpImageProvider {
    pub fn new(source_url: impl Into<String>, fallback_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            source_url: source_url.into(),
            fallback_url: fallback_url.into(),
            timeout: FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Source URL made unique per slot by appending a millisecond timestamp
    pub fn unique_url(&self, index: usize) -> String {
        let stamp = Utc::now().timestamp_millis() + index as i64;
        let separator = if self.source_url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.source_url, separator, stamp)
    }

    /// Checks that `url` serves an image
    async fn probe(&self, url: &str) -> Result<(), String> {
        let request = self.client.get(url).send();
        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| "request timed out".to_string())?
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("unexpected status {}", response.status()));
        }

        let is_image = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("image/"));
        if !is_image {
            return Err("response is not an image".to_string());
        }

        Ok(())
    }
}

impl Default for HttpImageProvider {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_URL, DEFAULT_FALLBACK_URL)
    }
}

impl ImageProvider for HttpImageProvider {
    fn fetch_unique(&self, index: usize) -> impl Future<Output = FetchedImage> + Send {
        async move {
            let url = self.unique_url(index);
            let image_ref = match self.probe(&url).await {
                Ok(()) => url,
                Err(reason) => {
                    tracing::warn!(index, %url, %reason, "image fetch failed, using fallback");
                    self.fallback_url.clone()
                }
            };

            FetchedImage {
                id: index,
                image_ref,
            }
        }
    }
}

/// Offline provider producing distinct placeholder references
#[derive(Debug, Clone, Default)]
pub struct PlaceholderProvider;

impl ImageProvider for PlaceholderProvider {
    fn fetch_unique(&self, index: usize) -> impl Future<Output = FetchedImage> + Send {
        std::future::ready(FetchedImage {
            id: index,
            image_ref: format!("placeholder://cat/{}", index),
        })
    }
}
