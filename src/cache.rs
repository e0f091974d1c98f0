//! Process-lifetime thumbnail cache.
//!
//! Maps photo id -> decoded thumbnail, bounded by cumulative decoded
//! size in kilobytes with strict least-recently-used eviction. `put` is
//! first-writer-wins: concurrent loads for the same id keep whichever
//! bitmap landed first, so a photo is never silently rebound to a
//! different image.

use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::GalleryConfig;
use crate::models::Bitmap;

struct CacheInner {
    entries: LruCache<String, Bitmap>,
    capacity_kb: u64,
    used_kb: u64,
}

/// Weight-bounded LRU cache of decoded thumbnails.
///
/// Shared handle: clones see the same entries.
#[derive(Clone)]
pub struct ThumbnailCache {
    inner: Arc<Mutex<CacheInner>>,
}

impl ThumbnailCache {
    /// Cache bounded to `capacity_kb` kilobytes of decoded pixels.
    pub fn new(capacity_kb: u64) -> Self {
        debug!(capacity_kb, "Initialized thumbnail cache");
        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                // Unbounded by count; the weight loop in `put` is the
                // real bound.
                entries: LruCache::unbounded(),
                capacity_kb,
                used_kb: 0,
            })),
        }
    }

    /// Cache sized from the configured heap budget (one eighth).
    pub fn with_config(config: &GalleryConfig) -> Self {
        Self::new(config.cache_capacity_kb())
    }

    /// Look up a thumbnail, refreshing its recency on a hit.
    pub fn get(&self, id: &str) -> Option<Bitmap> {
        self.inner.lock().entries.get(id).cloned()
    }

    /// Insert unless the id is already present (first-writer-wins).
    ///
    /// Evicts least-recently-used entries until the new weight fits.
    /// An entry heavier than the whole budget is not cached at all;
    /// the total weight never exceeds the capacity.
    pub fn put(&self, id: &str, bitmap: Bitmap) {
        let mut inner = self.inner.lock();
        if inner.entries.contains(id) {
            trace!(id, "Cache already holds this id, keeping first writer");
            return;
        }

        let weight = bitmap.weight_kb();
        if weight > inner.capacity_kb {
            debug!(
                id,
                weight_kb = weight,
                capacity_kb = inner.capacity_kb,
                "Thumbnail heavier than the whole cache, skipping"
            );
            return;
        }
        while inner.used_kb + weight > inner.capacity_kb {
            match inner.entries.pop_lru() {
                Some((evicted_id, evicted)) => {
                    inner.used_kb = inner.used_kb.saturating_sub(evicted.weight_kb());
                    trace!(
                        id = evicted_id.as_str(),
                        used_kb = inner.used_kb,
                        "Evicted thumbnail"
                    );
                }
                None => break,
            }
        }

        inner.entries.put(id.to_string(), bitmap);
        inner.used_kb += weight;
    }

    /// Evict everything.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.used_kb = 0;
        debug!("Cleared thumbnail cache");
    }

    /// Cumulative decoded weight currently held, in kilobytes.
    pub fn used_kb(&self) -> u64 {
        self.inner.lock().used_kb
    }

    pub fn entry_count(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn capacity_kb(&self) -> u64 {
        self.inner.lock().capacity_kb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 64x64 RGBA = 16 KB.
    fn thumb(shade: u8) -> Bitmap {
        Bitmap::solid(64, 64, [shade, shade, shade, 255])
    }

    #[test]
    fn test_get_after_put_returns_same_bitmap() {
        let cache = ThumbnailCache::new(64);
        let bmp = thumb(1);
        cache.put("a", bmp.clone());

        let hit = cache.get("a").unwrap();
        assert!(hit.same_allocation(&bmp));
        assert_eq!(cache.used_kb(), 16);
    }

    #[test]
    fn test_put_is_first_writer_wins() {
        let cache = ThumbnailCache::new(64);
        let first = thumb(1);
        let second = thumb(2);

        cache.put("a", first.clone());
        cache.put("a", second);

        assert!(cache.get("a").unwrap().same_allocation(&first));
        assert_eq!(cache.entry_count(), 1);
        assert_eq!(cache.used_kb(), 16);
    }

    #[test]
    fn test_lru_eviction_by_weight() {
        // Room for exactly three 16 KB thumbnails.
        let cache = ThumbnailCache::new(48);
        cache.put("a", thumb(1));
        cache.put("b", thumb(2));
        cache.put("c", thumb(3));
        assert_eq!(cache.used_kb(), 48);

        cache.put("d", thumb(4));
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("d").is_some());
        assert_eq!(cache.used_kb(), 48);
    }

    #[test]
    fn test_get_refreshes_recency() {
        let cache = ThumbnailCache::new(32);
        cache.put("a", thumb(1));
        cache.put("b", thumb(2));

        // Touch "a" so "b" becomes the eviction candidate.
        cache.get("a");
        cache.put("c", thumb(3));

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn test_clear_empties_weight() {
        let cache = ThumbnailCache::new(64);
        cache.put("a", thumb(1));
        cache.put("b", thumb(2));

        cache.clear();
        assert_eq!(cache.used_kb(), 0);
        assert_eq!(cache.entry_count(), 0);
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_oversized_entry_is_rejected() {
        let cache = ThumbnailCache::new(8);
        cache.put("big", thumb(1)); // 16 KB into an 8 KB budget
        assert_eq!(cache.entry_count(), 0);
        assert!(cache.get("big").is_none());
        assert_eq!(cache.used_kb(), 0);
    }

    #[test]
    fn test_oversized_entry_leaves_existing_entries_alone() {
        let cache = ThumbnailCache::new(24);
        cache.put("small", Bitmap::solid(32, 32, [1, 1, 1, 255])); // 4 KB
        cache.put("big", thumb(2)); // 16 KB, fits alongside
        cache.put("huge", Bitmap::solid(128, 64, [3, 3, 3, 255])); // 32 KB

        assert!(cache.get("small").is_some());
        assert!(cache.get("big").is_some());
        assert!(cache.get("huge").is_none());
        assert_eq!(cache.used_kb(), 20);
    }

    #[test]
    fn test_weight_stays_within_capacity() {
        let cache = ThumbnailCache::new(40);
        for i in 0..16 {
            cache.put(&format!("p{i}"), thumb(i as u8));
            assert!(cache.used_kb() <= cache.capacity_kb());
        }
    }

    #[test]
    fn test_many_small_entries_keep_weight_exact() {
        // Enough distinct 1 KB entries to trip any hidden count bound;
        // with room to spare, every one must survive and be accounted.
        let cache = ThumbnailCache::new(100_000);
        let tiny = Bitmap::solid(16, 16, [7, 7, 7, 255]); // 1 KB
        for i in 0..70_000u32 {
            cache.put(&format!("p{i}"), tiny.clone());
        }
        assert_eq!(cache.entry_count(), 70_000);
        assert_eq!(cache.used_kb(), 70_000);
        assert!(cache.get("p0").is_some());
    }

    #[test]
    fn test_shared_handle() {
        let cache = ThumbnailCache::new(64);
        let other = cache.clone();
        cache.put("a", thumb(1));
        assert!(other.get("a").is_some());
    }
}
