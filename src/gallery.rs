//! Grid screen state holder.
//!
//! Owns the observable photo list for the gallery screen. All mutations
//! funnel through one `watch` sender, so the list has a single logical
//! writer even though thumbnail decodes complete concurrently in any
//! order; the per-id merge is commutative and idempotent, so completion
//! order does not matter.
//!
//! Presentation-layer callbacks map onto this type directly:
//! permission result -> [`GalleryState::set_permission_granted`],
//! refresh gesture -> [`GalleryState::refresh_photos`],
//! thumbnail scrolled into view -> [`GalleryState::load_thumbnail`].

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::cache::ThumbnailCache;
use crate::gateway::MediaGateway;
use crate::models::{Bitmap, Photo};

/// Everything the grid screen renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GallerySnapshot {
    pub permission_granted: bool,
    pub loading: bool,
    pub photos: Vec<Photo>,
}

/// What the grid screen should show, in fixed priority order:
/// permission first, loading second, emptiness third.
#[derive(Debug, PartialEq)]
pub enum GalleryPhase<'a> {
    NoPermission,
    Loading,
    Empty,
    Grid(&'a [Photo]),
}

impl GallerySnapshot {
    pub fn phase(&self) -> GalleryPhase<'_> {
        if !self.permission_granted {
            GalleryPhase::NoPermission
        } else if self.loading {
            GalleryPhase::Loading
        } else if self.photos.is_empty() {
            GalleryPhase::Empty
        } else {
            GalleryPhase::Grid(&self.photos)
        }
    }
}

struct GalleryInner {
    gateway: MediaGateway,
    cache: ThumbnailCache,
    snapshot_tx: watch::Sender<GallerySnapshot>,
    /// Ids with a thumbnail decode currently in flight (single-flight).
    pending: Mutex<HashSet<String>>,
}

impl GalleryInner {
    fn set_loading(&self, loading: bool) {
        self.snapshot_tx.send_modify(|snap| snap.loading = loading);
    }

    /// Attach a thumbnail to the photo with this id, in place. A no-op
    /// when the id is no longer in the current list.
    fn merge_thumbnail(&self, id: &str, bitmap: Bitmap) {
        self.snapshot_tx.send_modify(|snap| {
            match snap.photos.iter_mut().find(|p| p.id == id) {
                Some(photo) => photo.thumbnail = Some(bitmap),
                None => trace!(id, "Thumbnail arrived for a photo no longer listed"),
            }
        });
    }
}

/// State holder for the gallery grid screen.
///
/// Not `Clone`: one screen, one owner. Dropping it clears the cache and
/// causes in-flight decode results to be discarded.
pub struct GalleryState {
    inner: Arc<GalleryInner>,
}

impl GalleryState {
    pub fn new(gateway: MediaGateway, cache: ThumbnailCache) -> Self {
        let (snapshot_tx, _) = watch::channel(GallerySnapshot::default());
        Self {
            inner: Arc::new(GalleryInner {
                gateway,
                cache,
                snapshot_tx,
                pending: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Current state, cloned out of the channel.
    pub fn snapshot(&self) -> GallerySnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Observe state changes; the receiver always sees the latest value.
    pub fn subscribe(&self) -> watch::Receiver<GallerySnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    pub fn cache(&self) -> &ThumbnailCache {
        &self.inner.cache
    }

    /// Number of thumbnail decodes currently in flight.
    pub fn pending_thumbnails(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Record the permission result. The first false -> true transition
    /// triggers an initial load; repeated grants do not.
    pub async fn set_permission_granted(&self, granted: bool) {
        let mut first_grant = false;
        self.inner.snapshot_tx.send_modify(|snap| {
            first_grant = granted && !snap.permission_granted;
            snap.permission_granted = granted;
        });
        if first_grant {
            debug!("Permission granted, loading photos");
            self.load_photos().await;
        }
    }

    /// Fetch the metadata list and merge it into the current one.
    ///
    /// An existing entry that already carries a thumbnail survives the
    /// refetch; fresh entries pick up a cache hit when one exists. On a
    /// fetch failure the list is cleared entirely (long-standing
    /// behavior, kept as-is).
    pub async fn load_photos(&self) {
        if !self.snapshot().permission_granted {
            trace!("load_photos without permission, ignoring");
            return;
        }

        self.inner.set_loading(true);
        match self.inner.gateway.list_photos().await {
            Ok(list) => {
                let cache = self.inner.cache.clone();
                self.inner.snapshot_tx.send_modify(move |snap| {
                    let merged = list
                        .into_iter()
                        .map(|mut photo| {
                            match snap.photos.iter().find(|p| p.id == photo.id) {
                                Some(existing) if existing.has_thumbnail() => existing.clone(),
                                _ => {
                                    if let Some(bitmap) = cache.get(&photo.id) {
                                        photo.thumbnail = Some(bitmap);
                                    }
                                    photo
                                }
                            }
                        })
                        .collect();
                    snap.photos = merged;
                });
            }
            Err(e) => {
                warn!(error = %e, "Photo listing failed, clearing gallery");
                self.inner.snapshot_tx.send_modify(|snap| snap.photos.clear());
            }
        }
        self.inner.set_loading(false);
    }

    /// Drop every cached and attached image, then refetch metadata from
    /// scratch. No merge: thumbnails are deliberately re-decoded. A
    /// fetch failure leaves the cleared list in place.
    pub async fn refresh_photos(&self) {
        self.inner.set_loading(true);
        self.inner.cache.clear();
        self.inner.snapshot_tx.send_modify(|snap| {
            for photo in &mut snap.photos {
                *photo = photo.without_images();
            }
        });

        match self.inner.gateway.list_photos().await {
            Ok(list) => {
                self.inner.snapshot_tx.send_modify(|snap| snap.photos = list);
            }
            Err(e) => {
                warn!(error = %e, "Refresh fetch failed, keeping cleared list");
            }
        }
        self.inner.set_loading(false);
    }

    /// Ensure a thumbnail for this photo is loaded or loading.
    ///
    /// Cheap paths resolve inline: a photo that already has a thumbnail
    /// is left alone, and a cache hit merges immediately. Otherwise at
    /// most one decode per id is in flight at a time; the spawned task
    /// is returned for callers that want to await it, `None` means no
    /// work was issued.
    pub fn load_thumbnail(&self, photo: &Photo) -> Option<JoinHandle<()>> {
        if photo.has_thumbnail() {
            return None;
        }

        if let Some(bitmap) = self.inner.cache.get(&photo.id) {
            self.inner.merge_thumbnail(&photo.id, bitmap);
            return None;
        }

        if !self.inner.pending.lock().insert(photo.id.clone()) {
            trace!(id = photo.id.as_str(), "Thumbnail decode already in flight");
            return None;
        }

        let gateway = self.inner.gateway.clone();
        let weak = Arc::downgrade(&self.inner);
        let photo = photo.clone();
        Some(tokio::spawn(async move {
            let result = gateway.decode_thumbnail(&photo).await;

            // The screen may have been torn down while decoding; a
            // result nobody owns is dropped on the floor.
            let Some(inner) = weak.upgrade() else {
                trace!(id = photo.id.as_str(), "Gallery gone, discarding thumbnail");
                return;
            };
            match result {
                Ok(bitmap) => {
                    inner.cache.put(&photo.id, bitmap.clone());
                    inner.merge_thumbnail(&photo.id, bitmap);
                }
                Err(e) => {
                    warn!(id = photo.id.as_str(), error = %e, "Thumbnail decode failed");
                }
            }
            inner.pending.lock().remove(&photo.id);
        }))
    }
}

impl Drop for GalleryState {
    fn drop(&mut self) {
        self.inner.cache.clear();
    }
}
