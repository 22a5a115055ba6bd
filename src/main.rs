use std::env;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use news_feed::config::NewsConfig;
use news_feed::service::caching::ImageCache;
use news_feed::service::images::ImageLoader;
use news_feed::service::news::NewsClient;
use news_feed::service::store::ArticleStore;
use news_feed::service::view::{
    feed_error_message, share_link, DetailView, FeedScreen, SlotState,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = NewsConfig::from_env()?;
    // Optional row to open, standing in for a tap on the list.
    let open_index = env::args()
        .nth(1)
        .map(|raw| raw.parse::<usize>())
        .transpose()
        .context("row index must be a non-negative integer")?;

    info!("Initializing news client for {}", config.api_url);
    let client = NewsClient::new(&config)?;
    let store = ArticleStore::new();
    let cache = Arc::new(ImageCache::new());
    let loader = ImageLoader::new(client.http().clone(), cache.clone());

    if let Err(err) = store.refresh(&client, config.query).await {
        eprintln!("❌ {}", feed_error_message(&err));
        return Ok(());
    }

    if let Some(at) = store.fetched_at() {
        info!("Feed snapshot taken at {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    let articles = store.all();
    let (mut screen, mut events) = FeedScreen::new(loader.clone());

    // All row mutations happen here, on the one foreground task.
    let mut pending = screen.show(&articles);
    while pending > 0 {
        let Some(event) = events.recv().await else {
            break;
        };
        screen.apply(event);
        pending -= 1;
    }

    let loaded = screen
        .rows()
        .iter()
        .filter(|row| matches!(row.image.state(), SlotState::Loaded(_)))
        .count();
    info!(
        "Loaded {} of {} thumbnails; {} images cached",
        loaded,
        articles.len(),
        cache.len()
    );

    println!("Latest news ({} articles)", articles.len());
    for line in screen.lines() {
        println!("• {line}");
    }

    if let Some(dir) = &config.thumbnail_dir {
        save_thumbnails(&screen, dir)?;
    }

    if let Some(index) = open_index {
        let article = match store.by_index(index) {
            Ok(article) => article,
            Err(err) => {
                eprintln!("❌ {err}");
                return Ok(());
            }
        };

        let detail = DetailView::from(&article);
        println!();
        for line in detail.lines() {
            println!("{line}");
        }
        if let Some(image) = loader.fetch(&detail.image_url).await {
            println!("Image size: {}x{}", image.width(), image.height());
        }
        match share_link(&article) {
            Ok(url) => println!("Share: {url}"),
            Err(err) => println!("❌ {err}"),
        }
    }

    Ok(())
}

fn save_thumbnails(screen: &FeedScreen, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let mut written = 0;
    for row in screen.rows() {
        if let Some(thumb) = row.thumbnail() {
            let path = dir.join(format!("{}.png", row.article_id));
            thumb
                .save(&path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            written += 1;
        }
    }
    info!("Wrote {} thumbnails to {}", written, dir.display());
    Ok(())
}
