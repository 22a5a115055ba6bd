use std::sync::Arc;

use image::DynamicImage;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::models::Article;
use crate::service::images::ImageLoader;
use crate::service::view::{ArticleRow, SlotToken};

/// An image result on its way back to the foreground task.
#[derive(Debug)]
pub struct ImageEvent {
    pub row: usize,
    pub token: SlotToken,
    pub image: Option<Arc<DynamicImage>>,
}

/// Row list for the feed. Owned by one foreground task; background image
/// loads report back through the channel returned by [`FeedScreen::new`].
pub struct FeedScreen {
    loader: ImageLoader,
    rows: Vec<ArticleRow>,
    events: UnboundedSender<ImageEvent>,
}

impl FeedScreen {
    pub fn new(loader: ImageLoader) -> (Self, UnboundedReceiver<ImageEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let screen = Self {
            loader,
            rows: Vec::new(),
            events,
        };
        (screen, rx)
    }

    /// Lay out `articles`, reusing existing rows, and start one image load
    /// per row. Every load delivers exactly one [`ImageEvent`]; returns how
    /// many were started.
    pub fn show(&mut self, articles: &[Article]) -> usize {
        let Self {
            loader,
            rows,
            events,
        } = self;

        rows.truncate(articles.len());
        rows.resize_with(articles.len(), ArticleRow::default);

        for (index, (row, article)) in rows.iter_mut().zip(articles).enumerate() {
            let token = row.configure(article);
            let reply = token.clone();
            let events = events.clone();
            loader.load(
                &article.image_url,
                || {
                    row.image.show_placeholder(&token);
                },
                move |image| {
                    // Receiver gone means the screen was torn down.
                    let _ = events.send(ImageEvent {
                        row: index,
                        token: reply,
                        image,
                    });
                },
            );
        }

        articles.len()
    }

    /// Apply a finished load if its row still shows the same image binding.
    pub fn apply(&mut self, event: ImageEvent) -> bool {
        let applied = self
            .rows
            .get_mut(event.row)
            .map(|row| row.image.apply(&event.token, event.image))
            .unwrap_or(false);
        if !applied {
            debug!(
                "Dropped stale image result for row {} ({})",
                event.row,
                event.token.url()
            );
        }
        applied
    }

    pub fn rows(&self) -> &[ArticleRow] {
        &self.rows
    }

    pub fn lines(&self) -> Vec<String> {
        self.rows.iter().map(ArticleRow::render).collect()
    }
}
