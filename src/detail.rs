//! Single-photo detail screen state holder.
//!
//! Driven once at construction: fetch the metadata list, find the
//! requested id, publish the metadata-only photo immediately, then
//! attach the full-resolution image when the decode lands. The list
//! refetch (instead of a by-id lookup) matches the grid's data path on
//! purpose; see DESIGN.md.

use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tracing::{trace, warn};

use crate::gateway::MediaGateway;
use crate::models::Photo;

/// Everything the detail screen renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailSnapshot {
    pub loading: bool,
    pub photo: Option<Photo>,
}

/// What the detail screen should show.
#[derive(Debug, PartialEq)]
pub enum DetailPhase<'a> {
    Loading,
    Loaded(&'a Photo),
    NotFound,
}

impl DetailSnapshot {
    pub fn phase(&self) -> DetailPhase<'_> {
        if self.loading {
            DetailPhase::Loading
        } else {
            match &self.photo {
                Some(photo) => DetailPhase::Loaded(photo),
                None => DetailPhase::NotFound,
            }
        }
    }
}

struct DetailInner {
    snapshot_tx: watch::Sender<DetailSnapshot>,
}

/// State holder for one detail screen instance.
///
/// Loads exactly once; dropping it abandons an in-flight load silently.
pub struct DetailState {
    inner: Arc<DetailInner>,
}

impl DetailState {
    /// Open the detail view for `photo_id` and start loading.
    pub fn open(gateway: MediaGateway, photo_id: impl Into<String>) -> Self {
        let (snapshot_tx, _) = watch::channel(DetailSnapshot {
            loading: true,
            photo: None,
        });
        let inner = Arc::new(DetailInner { snapshot_tx });

        let photo_id = photo_id.into();
        let weak = Arc::downgrade(&inner);
        tokio::spawn(load_photo(gateway, photo_id, weak));

        Self { inner }
    }

    pub fn snapshot(&self) -> DetailSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Wait until the one-shot load has finished (loading == false).
    pub async fn settled(&self) -> DetailSnapshot {
        let mut rx = self.subscribe();
        loop {
            let snap = rx.borrow_and_update().clone();
            if !snap.loading {
                return snap;
            }
            if rx.changed().await.is_err() {
                return snap;
            }
        }
    }
}

/// The one-shot load driving a detail screen.
///
/// Every failure degrades to the safest visible state: a listing
/// failure or missing id ends as NotFound, a full-image decode failure
/// leaves the metadata-only photo in place. The loading flag always
/// ends false.
async fn load_photo(gateway: MediaGateway, photo_id: String, weak: Weak<DetailInner>) {
    let listing = gateway.list_photos().await;

    let target = match listing {
        Ok(photos) => photos.into_iter().find(|p| p.id == photo_id),
        Err(e) => {
            warn!(id = photo_id.as_str(), error = %e, "Detail listing failed");
            None
        }
    };

    let Some(photo) = target else {
        if let Some(inner) = weak.upgrade() {
            inner.snapshot_tx.send_modify(|snap| {
                snap.photo = None;
                snap.loading = false;
            });
        }
        return;
    };

    // Publish the metadata-only photo right away so the screen can
    // render dimensions and orientation while the decode runs.
    match weak.upgrade() {
        Some(inner) => inner
            .snapshot_tx
            .send_modify(|snap| snap.photo = Some(photo.clone())),
        None => {
            trace!(id = photo_id.as_str(), "Detail screen gone before metadata publish");
            return;
        }
    }

    let decoded = gateway.decode_full_image(&photo).await;

    let Some(inner) = weak.upgrade() else {
        trace!(id = photo_id.as_str(), "Detail screen gone, discarding full image");
        return;
    };
    inner.snapshot_tx.send_modify(|snap| {
        match decoded {
            Ok(bitmap) => {
                if let Some(current) = &mut snap.photo {
                    current.full_image = Some(bitmap);
                }
            }
            Err(e) => {
                warn!(id = photo_id.as_str(), error = %e, "Full image decode failed");
            }
        }
        snap.loading = false;
    });
}
