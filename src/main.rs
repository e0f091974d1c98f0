//! Demo driver: point it at a directory of images and it walks the
//! whole gallery flow - list, thumbnail every photo, open the newest
//! one in the detail view - logging as it goes.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use photogrid::{
    DetailState, FsMediaIndex, GalleryConfig, GalleryState, MediaGateway, ThumbnailCache,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("photogrid=info".parse().unwrap()),
        )
        .init();

    let root = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    info!(root, "Scanning directory as media index");

    let index = Arc::new(FsMediaIndex::new(&root));
    let gateway = MediaGateway::new(index);
    let cache = ThumbnailCache::with_config(&GalleryConfig::default());
    let gallery = GalleryState::new(gateway.clone(), cache);

    gallery.set_permission_granted(true).await;

    let photos = gallery.snapshot().photos;
    info!(count = photos.len(), "Gallery loaded");

    let handles: Vec<_> = photos
        .iter()
        .filter_map(|photo| gallery.load_thumbnail(photo))
        .collect();
    for handle in handles {
        handle.await?;
    }

    let snap = gallery.snapshot();
    let thumbed = snap.photos.iter().filter(|p| p.has_thumbnail()).count();
    info!(
        thumbed,
        total = snap.photos.len(),
        cache_kb = gallery.cache().used_kb(),
        "Thumbnails decoded"
    );

    if let Some(first) = snap.photos.first() {
        let detail = DetailState::open(gateway, first.id.clone());
        let settled = detail.settled().await;
        match settled.photo.and_then(|p| p.full_image) {
            Some(full) => info!(
                id = first.id.as_str(),
                width = full.width(),
                height = full.height(),
                "Opened detail view"
            ),
            None => info!(id = first.id.as_str(), "Detail view had no image"),
        }
    }

    Ok(())
}
