//! photogrid - a photo-gallery viewer core.
//!
//! Enumerates images from a media index, decodes downsampled
//! thumbnails and full-resolution images, caches thumbnails in a
//! size-bounded LRU, and exposes observable screen state for a grid
//! screen ([`GalleryState`]) and a single-photo detail screen
//! ([`DetailState`]). Rendering and gesture handling live in an
//! external presentation layer that observes the snapshots and calls
//! back into the state holders.

pub mod cache;
pub mod config;
pub mod detail;
pub mod error;
pub mod gallery;
pub mod gateway;
pub mod index;
pub mod models;

pub use cache::ThumbnailCache;
pub use config::GalleryConfig;
pub use detail::{DetailPhase, DetailSnapshot, DetailState};
pub use error::{GatewayError, IndexError};
pub use gallery::{GalleryPhase, GallerySnapshot, GalleryState};
pub use gateway::MediaGateway;
pub use index::{FsMediaIndex, InMemoryMediaIndex, MediaIndex};
pub use models::{Bitmap, IndexEntry, Orientation, Photo};
