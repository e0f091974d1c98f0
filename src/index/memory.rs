//! In-memory media index for tests and demos.
//!
//! Fully deterministic stand-in for a platform media catalog: entries
//! and encoded blobs are programmed up front, listing failures can be
//! injected, and an open-gate lets a test hold a decode in flight while
//! it probes single-flight behavior.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use image::RgbaImage;
use parking_lot::{Condvar, Mutex};

use crate::error::IndexError;
use crate::index::MediaIndex;
use crate::models::IndexEntry;

#[derive(Default)]
struct Store {
    entries: Vec<IndexEntry>,
    blobs: HashMap<String, Vec<u8>>,
}

/// A programmable media index held entirely in memory.
///
/// Entries are listed in insertion order; callers are responsible for
/// inserting newest-first, matching the contract of [`MediaIndex`].
#[derive(Default)]
pub struct InMemoryMediaIndex {
    store: Mutex<Store>,
    list_calls: AtomicUsize,
    open_calls: AtomicUsize,
    fail_listing: AtomicBool,
    gate_closed: Mutex<bool>,
    gate_cvar: Condvar,
}

impl InMemoryMediaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry with pre-encoded bytes.
    pub fn insert(&self, entry: IndexEntry, bytes: Vec<u8>) {
        let mut store = self.store.lock();
        store.blobs.insert(entry.id.clone(), bytes);
        store.entries.push(entry);
    }

    /// Register an entry whose bytes are the given image encoded as PNG.
    pub fn insert_image(&self, entry: IndexEntry, pixels: &RgbaImage) {
        let mut bytes = Vec::new();
        pixels
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("encoding fixture PNG");
        self.insert(entry, bytes);
    }

    /// Drop all entries and blobs.
    pub fn clear(&self) {
        let mut store = self.store.lock();
        store.entries.clear();
        store.blobs.clear();
    }

    /// When set, `list_entries` fails until cleared.
    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    /// Close the open-gate: subsequent `open_bytes` calls block until
    /// [`release_opens`](Self::release_opens).
    pub fn hold_opens(&self) {
        *self.gate_closed.lock() = true;
    }

    /// Re-open the gate and wake blocked `open_bytes` calls.
    pub fn release_opens(&self) {
        *self.gate_closed.lock() = false;
        self.gate_cvar.notify_all();
    }

    /// Number of `list_entries` calls observed.
    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `open_bytes` calls observed (counted before the gate,
    /// so a held call is already visible).
    pub fn open_count(&self) -> usize {
        self.open_calls.load(Ordering::SeqCst)
    }
}

impl MediaIndex for InMemoryMediaIndex {
    fn list_entries(&self) -> Result<Vec<IndexEntry>, IndexError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(IndexError::Unavailable("injected failure".to_string()));
        }
        Ok(self.store.lock().entries.clone())
    }

    fn open_bytes(&self, id: &str) -> Result<Vec<u8>, IndexError> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);

        let mut closed = self.gate_closed.lock();
        while *closed {
            self.gate_cvar.wait(&mut closed);
        }
        drop(closed);

        self.store
            .lock()
            .blobs
            .get(id)
            .cloned()
            .ok_or_else(|| IndexError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Orientation;

    fn entry(id: &str, w: u32, h: u32) -> IndexEntry {
        IndexEntry {
            id: id.to_string(),
            width: w,
            height: h,
            orientation: Orientation::Deg0,
        }
    }

    #[test]
    fn test_lists_in_insertion_order() {
        let index = InMemoryMediaIndex::new();
        index.insert(entry("newest", 4, 4), vec![1]);
        index.insert(entry("older", 4, 4), vec![2]);

        let ids: Vec<String> = index
            .list_entries()
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["newest", "older"]);
        assert_eq!(index.list_count(), 1);
    }

    #[test]
    fn test_open_bytes_and_counting() {
        let index = InMemoryMediaIndex::new();
        index.insert(entry("a", 4, 4), vec![9, 8, 7]);

        assert_eq!(index.open_bytes("a").unwrap(), vec![9, 8, 7]);
        assert!(matches!(
            index.open_bytes("missing"),
            Err(IndexError::NotFound(_))
        ));
        assert_eq!(index.open_count(), 2);
    }

    #[test]
    fn test_injected_listing_failure() {
        let index = InMemoryMediaIndex::new();
        index.fail_listing(true);
        assert!(index.list_entries().is_err());
        index.fail_listing(false);
        assert!(index.list_entries().is_ok());
    }

    #[test]
    fn test_gate_blocks_until_released() {
        use std::sync::Arc;
        use std::time::Duration;

        let index = Arc::new(InMemoryMediaIndex::new());
        index.insert(entry("a", 4, 4), vec![1]);
        index.hold_opens();

        let worker = {
            let index = Arc::clone(&index);
            std::thread::spawn(move || index.open_bytes("a").unwrap())
        };

        // The open is counted but must not complete while held.
        while index.open_count() == 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(!worker.is_finished());

        index.release_opens();
        assert_eq!(worker.join().unwrap(), vec![1]);
    }

    #[test]
    fn test_insert_image_encodes_decodable_png() {
        let index = InMemoryMediaIndex::new();
        let pixels = RgbaImage::from_pixel(6, 3, image::Rgba([1, 2, 3, 255]));
        index.insert_image(entry("img", 6, 3), &pixels);

        let bytes = index.open_bytes("img").unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (6, 3));
    }
}
