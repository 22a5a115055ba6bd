use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::models::Article;
use crate::service::news::{FeedQuery, FetchError, NewsClient};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("article index {index} out of range for {len} articles")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug, Default)]
struct Snapshot {
    articles: Arc<Vec<Article>>,
    fetched_at: Option<DateTime<Utc>>,
}

/// Last fetched feed page. Replaced wholesale, never edited in place, so a
/// reader holds either the old list or the new one.
#[derive(Debug, Default)]
pub struct ArticleStore {
    snapshot: RwLock<Snapshot>,
}

impl ArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, articles: Vec<Article>) {
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        *snapshot = Snapshot {
            articles: Arc::new(articles),
            fetched_at: Some(Utc::now()),
        };
    }

    pub fn all(&self) -> Arc<Vec<Article>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .articles
            .clone()
    }

    pub fn by_index(&self, index: usize) -> Result<Article, StoreError> {
        let articles = self.all();
        articles.get(index).cloned().ok_or(StoreError::OutOfRange {
            index,
            len: articles.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.all().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// When the current snapshot was stored; `None` before the first replace.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .fetched_at
    }

    /// Fetch a page and replace the snapshot. On error the old snapshot stays.
    pub async fn refresh(&self, client: &NewsClient, query: FeedQuery) -> Result<usize, FetchError> {
        let articles = client.fetch_feed(query).await?;
        let count = articles.len();
        self.replace(articles);
        info!("Article store now holds {} articles", count);
        Ok(count)
    }
}
