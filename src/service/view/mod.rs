use std::sync::Arc;

use image::{DynamicImage, GenericImageView, RgbaImage};
use thiserror::Error;
use url::Url;

use crate::models::Article;
use crate::service::images::{fit_thumbnail, THUMBNAIL_SIZE};
use crate::service::news::FetchError;

pub mod feed;

pub use feed::{FeedScreen, ImageEvent};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    #[error("Article link is unavailable for sharing.")]
    LinkUnavailable,
}

/// Link handed to the share action.
pub fn share_link(article: &Article) -> Result<Url, ShareError> {
    article.full_article_url().ok_or(ShareError::LinkUnavailable)
}

/// Single user-visible line for any feed failure.
pub fn feed_error_message(err: &FetchError) -> String {
    format!("Failed to load news: {err}")
}

#[derive(Debug, Clone, Default)]
pub enum SlotState {
    #[default]
    Empty,
    Loading,
    Loaded(Arc<DynamicImage>),
    Unavailable,
}

/// Identifies one binding of an [`ImageSlot`] to a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotToken {
    generation: u64,
    url: String,
}

impl SlotToken {
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Image area of a reusable row. Results are applied only if the token they
/// were requested with is still the slot's current binding.
#[derive(Debug, Default)]
pub struct ImageSlot {
    generation: u64,
    url: String,
    state: SlotState,
}

impl ImageSlot {
    /// Point the slot at a new URL, invalidating every earlier token.
    pub fn bind(&mut self, url: &str) -> SlotToken {
        self.generation += 1;
        self.url = url.to_string();
        self.state = SlotState::Empty;
        SlotToken {
            generation: self.generation,
            url: self.url.clone(),
        }
    }

    pub fn is_current(&self, token: &SlotToken) -> bool {
        token.generation == self.generation && token.url == self.url
    }

    pub fn show_placeholder(&mut self, token: &SlotToken) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.state = SlotState::Loading;
        true
    }

    /// Returns `false` when the result is stale and was dropped.
    pub fn apply(&mut self, token: &SlotToken, image: Option<Arc<DynamicImage>>) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.state = match image {
            Some(image) => SlotState::Loaded(image),
            None => SlotState::Unavailable,
        };
        true
    }

    pub fn state(&self) -> &SlotState {
        &self.state
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Default)]
pub struct ArticleRow {
    pub article_id: i64,
    pub title: String,
    pub description: String,
    pub image: ImageSlot,
}

impl ArticleRow {
    /// Reuse this row for `article`; returns the token for its image load.
    pub fn configure(&mut self, article: &Article) -> SlotToken {
        self.article_id = article.id;
        self.title = article.title.clone();
        self.description = article.description.clone();
        self.image.bind(&article.image_url)
    }

    pub fn thumbnail(&self) -> Option<RgbaImage> {
        match self.image.state() {
            SlotState::Loaded(image) => Some(fit_thumbnail(image, THUMBNAIL_SIZE)),
            _ => None,
        }
    }

    pub fn render(&self) -> String {
        let marker = match self.image.state() {
            SlotState::Empty => "[     ]".to_string(),
            SlotState::Loading => "[ ... ]".to_string(),
            SlotState::Loaded(image) => {
                let (w, h) = image.dimensions();
                format!("[{w}x{h}]")
            }
            SlotState::Unavailable => "[  -  ]".to_string(),
        };
        format!("{} {} — {}", marker, self.title, self.description)
    }
}

/// Everything the detail screen shows for one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub title: String,
    pub body: String,
    pub image_url: String,
}

impl From<&Article> for DetailView {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            body: article.body_text().to_string(),
            image_url: article.image_url.clone(),
        }
    }
}

impl DetailView {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.title.clone(), String::new(), self.body.clone()];
        if !self.image_url.is_empty() {
            lines.push(String::new());
            lines.push(format!("Image: {}", self.image_url));
        }
        lines
    }
}
