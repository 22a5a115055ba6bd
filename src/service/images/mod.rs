use std::sync::Arc;

use image::DynamicImage;
use reqwest::{Client, StatusCode};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::service::caching::ImageCache;

pub mod thumbnail;

pub use thumbnail::{fit_thumbnail, THUMBNAIL_SIZE};

#[derive(Debug, thiserror::Error)]
enum ImageFetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("status {0}")]
    Status(StatusCode),
    #[error("decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("decode task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Loads images through a shared [`ImageCache`], downloading on a miss.
///
/// Failures are never surfaced: they resolve to `None` and are only logged.
#[derive(Clone)]
pub struct ImageLoader {
    http: Client,
    cache: Arc<ImageCache>,
}

impl ImageLoader {
    pub fn new(http: Client, cache: Arc<ImageCache>) -> Self {
        Self { http, cache }
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    /// Resolve `url` to an image, reporting through callbacks.
    ///
    /// `on_placeholder` runs first, on the calling thread. `on_result` runs
    /// exactly once afterwards: inline for an invalid URL or a cache hit,
    /// otherwise from the spawned download task whose handle is returned.
    /// Callers must check that the requesting context still wants `url`
    /// before applying the result.
    pub fn load<P, R>(&self, url: &str, on_placeholder: P, on_result: R) -> Option<JoinHandle<()>>
    where
        P: FnOnce(),
        R: FnOnce(Option<Arc<DynamicImage>>) + Send + 'static,
    {
        on_placeholder();

        let Ok(parsed) = Url::parse(url) else {
            debug!("Skipping image load for invalid url {:?}", url);
            on_result(None);
            return None;
        };

        if let Some(image) = self.cache.get(url) {
            debug!("Image cache hit for {}", url);
            on_result(Some(image));
            return None;
        }

        debug!("Image cache miss for {}", url);
        let loader = self.clone();
        let key = url.to_string();
        Some(tokio::spawn(async move {
            let image = loader.download_and_store(key, parsed).await;
            on_result(image);
        }))
    }

    /// Awaitable variant of [`ImageLoader::load`] without placeholder reporting.
    pub async fn fetch(&self, url: &str) -> Option<Arc<DynamicImage>> {
        let parsed = Url::parse(url).ok()?;
        if let Some(image) = self.cache.get(url) {
            return Some(image);
        }
        self.download_and_store(url.to_string(), parsed).await
    }

    async fn download_and_store(&self, key: String, url: Url) -> Option<Arc<DynamicImage>> {
        match self.download(url).await {
            Ok(image) => {
                let image = Arc::new(image);
                self.cache.put(key, image.clone());
                Some(image)
            }
            Err(e) => {
                warn!("Image load for {} failed: {}", key, e);
                None
            }
        }
    }

    async fn download(&self, url: Url) -> Result<DynamicImage, ImageFetchError> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ImageFetchError::Status(status));
        }

        let bytes = resp.bytes().await?;
        let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await??;
        Ok(image)
    }
}
