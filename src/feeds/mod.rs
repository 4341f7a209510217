pub mod apod;
pub mod picture;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub use apod::{ApodEntry, ApodState};
pub use picture::{PictureState, PixelGrid};

#[derive(Debug, Clone)]
pub enum FeedData {
    Loading,
    Apod(ApodState),
    Picture(PictureState),
}

/// Network access for the APOD tab.
///
/// Implementations perform exactly one request per call: no retry, no
/// timeout, no caching, no logging.
#[async_trait]
pub trait ApodFetcher: Send + Sync {
    /// GETs `base_url` followed directly by `credential` and returns the
    /// parsed JSON body without looking at its shape. Transport failures and
    /// non-JSON bodies are errors; an API error object is ordinary data.
    async fn fetch(&self, base_url: &str, credential: &str) -> Result<Value>;

    /// Downloads the raw bytes behind an image URL.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}
