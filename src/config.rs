use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::service::news::FeedQuery;

pub const DEFAULT_API_URL: &str = "https://news.myseldon.com/api/Section";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be an integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Runtime settings for the news client, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsConfig {
    pub api_url: String,
    pub query: FeedQuery,
    /// `None` keeps the HTTP client's own timeout behaviour.
    pub request_timeout: Option<Duration>,
    /// Where the binary writes row thumbnails, if anywhere.
    pub thumbnail_dir: Option<PathBuf>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            query: FeedQuery::default(),
            request_timeout: None,
            thumbnail_dir: None,
        }
    }
}

impl NewsConfig {
    /// Build the config from `NEWS_*` variables. Call `dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_url = read("NEWS_API_URL").unwrap_or(defaults.api_url);
        let query = FeedQuery {
            rubric_id: parse_or(
                read("NEWS_RUBRIC_ID"),
                "NEWS_RUBRIC_ID",
                defaults.query.rubric_id,
            )?,
            page_size: parse_or(
                read("NEWS_PAGE_SIZE"),
                "NEWS_PAGE_SIZE",
                defaults.query.page_size,
            )?,
            page_index: parse_or(
                read("NEWS_PAGE_INDEX"),
                "NEWS_PAGE_INDEX",
                defaults.query.page_index,
            )?,
        };
        let request_timeout = read("NEWS_HTTP_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::InvalidNumber {
                        key: "NEWS_HTTP_TIMEOUT_SECS",
                        value: raw,
                    })
            })
            .transpose()?;
        let thumbnail_dir = read("NEWS_THUMBNAIL_DIR").map(PathBuf::from);

        Ok(Self {
            api_url,
            query,
            request_timeout,
            thumbnail_dir,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        None => Ok(default),
    }
}
