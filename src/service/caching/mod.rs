use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use image::DynamicImage;

/// Shared decoded-image cache keyed by the literal image URL string.
///
/// Unbounded and never evicted; entries live as long as the cache. Built once
/// by the composition root and handed to every loader as `Arc<ImageCache>`.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: RwLock<HashMap<String, Arc<DynamicImage>>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<DynamicImage>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Store an image. A concurrent put for the same key may win instead.
    pub fn put(&self, key: impl Into<String>, image: Arc<DynamicImage>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), image);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn pixel(color: [u8; 4]) -> Arc<DynamicImage> {
        Arc::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            1,
            1,
            Rgba(color),
        )))
    }

    #[test]
    fn put_then_get_returns_same_image() {
        let cache = ImageCache::new();
        let image = pixel([255, 0, 0, 255]);
        cache.put("http://x/i.png", image.clone());

        let cached = cache.get("http://x/i.png").unwrap();
        assert!(Arc::ptr_eq(&cached, &image));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn keys_are_not_normalized() {
        let cache = ImageCache::new();
        cache.put("http://x/i.png", pixel([0, 0, 0, 255]));
        assert!(cache.get("http://x/i.png/").is_none());
        assert!(!cache.contains("HTTP://x/i.png"));
    }

    #[test]
    fn last_write_wins() {
        let cache = ImageCache::new();
        cache.put("k", pixel([1, 1, 1, 255]));
        let second = pixel([2, 2, 2, 255]);
        cache.put("k", second.clone());
        assert!(Arc::ptr_eq(&cache.get("k").unwrap(), &second));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_puts_to_distinct_keys() {
        let cache = Arc::new(ImageCache::new());
        let mut handles = Vec::new();
        for i in 0..32u8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache.put(format!("http://x/{i}.png"), pixel([i, i, i, 255]));
                cache.get(&format!("http://x/{i}.png")).is_some()
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(cache.len(), 32);
    }
}
