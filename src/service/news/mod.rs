use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::NewsConfig;
use crate::models::Article;

pub mod feed;

pub use feed::{parse_feed, FeedError};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid request url: {0}")]
    InvalidRequest(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("news api returned status {0}")]
    Status(StatusCode),
    #[error("news api returned an empty body")]
    NoData,
    #[error(transparent)]
    Decode(#[from] FeedError),
}

/// Which page of which rubric to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedQuery {
    pub rubric_id: i64,
    pub page_size: u32,
    pub page_index: u32,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            rubric_id: 4,
            page_size: 8,
            page_index: 1,
        }
    }
}

pub struct NewsClient {
    http: Client,
    api_url: String,
}

impl NewsClient {
    /// Build a client with its own HTTP connection pool.
    pub fn new(config: &NewsConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, config.api_url.clone()))
    }

    pub fn with_client(http: Client, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
        }
    }

    /// The underlying HTTP client, shareable with the image loader.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Endpoint URL with `rubricId`, `pageSize` and `pageIndex` appended.
    pub fn request_url(&self, query: FeedQuery) -> Result<Url, FetchError> {
        let url = Url::parse_with_params(
            &self.api_url,
            &[
                ("rubricId", query.rubric_id.to_string()),
                ("pageSize", query.page_size.to_string()),
                ("pageIndex", query.page_index.to_string()),
            ],
        )?;
        Ok(url)
    }

    /// Fetch one feed page. Either every record decodes or the call fails.
    pub async fn fetch_feed(&self, query: FeedQuery) -> Result<Vec<Article>, FetchError> {
        let url = self.request_url(query)?;
        info!("Fetching news feed from {}", url);

        let resp = self.http.get(url).send().await.map_err(|e| {
            warn!("News feed request failed: {}", e);
            FetchError::Transport(e)
        })?;

        let status = resp.status();
        debug!("News feed responded with status {}", status);
        if !status.is_success() {
            warn!("News feed returned error status {}", status);
            return Err(FetchError::Status(status));
        }

        let body = resp.bytes().await.map_err(|e| {
            warn!("Failed to read news feed body: {}", e);
            FetchError::Transport(e)
        })?;
        if body.is_empty() {
            warn!("News feed body was empty");
            return Err(FetchError::NoData);
        }

        let articles = parse_feed(&body).map_err(|e| {
            let preview = String::from_utf8_lossy(&body[..body.len().min(500)]);
            warn!("Failed to decode news feed: {}; body preview: {}", e, preview);
            FetchError::Decode(e)
        })?;

        info!("Decoded {} articles", articles.len());
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url_carries_query() {
        let client = NewsClient::with_client(Client::new(), "https://example.com/api/Section");
        let url = client.request_url(FeedQuery::default()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/api/Section?rubricId=4&pageSize=8&pageIndex=1"
        );
    }

    #[test]
    fn request_url_rejects_bad_endpoint() {
        let client = NewsClient::with_client(Client::new(), "not an endpoint");
        assert!(matches!(
            client.request_url(FeedQuery::default()),
            Err(FetchError::InvalidRequest(_))
        ));
    }
}
