//! Media gateway: metadata queries and two-pass downsampled decode.
//!
//! Wraps an injected [`MediaIndex`] with the decode pipeline:
//! 1. bounds-only probe to learn native dimensions without allocating
//!    pixel data
//! 2. power-of-two sample size against the requested target box
//! 3. pixel decode, shrink by the sample factor, orientation correction
//!
//! Everything runs on the blocking pool; callers await from async
//! context.

use std::io::Cursor;
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{ImageReader, RgbaImage};
use tracing::{debug, trace};

use crate::config::{FULL_TARGET, THUMB_TARGET};
use crate::error::GatewayError;
use crate::index::MediaIndex;
use crate::models::{Bitmap, Orientation, Photo};

/// Query/decode front door over a media index.
///
/// Cheap to clone; clones share the underlying index.
#[derive(Clone)]
pub struct MediaGateway {
    index: Arc<dyn MediaIndex>,
}

impl MediaGateway {
    pub fn new(index: Arc<dyn MediaIndex>) -> Self {
        Self { index }
    }

    /// All photos known to the index, newest first, metadata only.
    ///
    /// An empty index is an empty vec; only a failure to query at all
    /// surfaces as an error.
    pub async fn list_photos(&self) -> Result<Vec<Photo>, GatewayError> {
        let index = Arc::clone(&self.index);
        let entries = tokio::task::spawn_blocking(move || index.list_entries())
            .await
            .map_err(|_| GatewayError::TaskFailed)??;
        debug!(count = entries.len(), "Listed photos from media index");
        Ok(entries.into_iter().map(Photo::from_entry).collect())
    }

    /// Decode a grid thumbnail for the photo (100x100 target box).
    pub async fn decode_thumbnail(&self, photo: &Photo) -> Result<Bitmap, GatewayError> {
        self.decode_at(photo, THUMB_TARGET).await
    }

    /// Decode a full-resolution image for the detail view (2048x2048
    /// target box). Never cached.
    pub async fn decode_full_image(&self, photo: &Photo) -> Result<Bitmap, GatewayError> {
        self.decode_at(photo, FULL_TARGET).await
    }

    async fn decode_at(&self, photo: &Photo, target: (u32, u32)) -> Result<Bitmap, GatewayError> {
        let index = Arc::clone(&self.index);
        let id = photo.id.clone();
        let orientation = photo.orientation;
        tokio::task::spawn_blocking(move || decode_blocking(index.as_ref(), &id, orientation, target))
            .await
            .map_err(|_| GatewayError::TaskFailed)?
    }
}

fn decode_blocking(
    index: &dyn MediaIndex,
    id: &str,
    orientation: Orientation,
    target: (u32, u32),
) -> Result<Bitmap, GatewayError> {
    let bytes = index.open_bytes(id)?;

    // Pass 1: header-only probe, no pixel allocation.
    let (native_w, native_h) = ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()?
        .into_dimensions()?;

    let factor = sample_size(native_w, native_h, target.0, target.1);
    trace!(id, native_w, native_h, factor, "Probed image bounds");

    // Pass 2: pixel decode, shrunk by the sample factor.
    let decoded = image::load_from_memory(&bytes)?.to_rgba8();
    let sampled = if factor > 1 {
        let w = (decoded.width() / factor).max(1);
        let h = (decoded.height() / factor).max(1);
        // Nearest keeps the every-Nth-pixel semantics of a subsampled
        // decode rather than blending.
        imageops::resize(&decoded, w, h, FilterType::Nearest)
    } else {
        decoded
    };

    let oriented = rotate_if_needed(sampled, orientation);
    Ok(Bitmap::new(oriented))
}

/// Largest power-of-two divisor such that both halved native dimensions,
/// divided by it, stay at or above the target.
///
/// The loop divides the *original* halves each iteration, so the result
/// matches the classic halving computation exactly: 4000x3000 against
/// 100x100 gives 16, 800x600 gives 4, and anything already inside the
/// target box gives 1.
pub fn sample_size(width: u32, height: u32, req_width: u32, req_height: u32) -> u32 {
    if req_width == 0 || req_height == 0 {
        return 1;
    }

    let mut factor = 1;
    if height > req_height || width > req_width {
        let half_width = width / 2;
        let half_height = height / 2;

        while half_height / factor >= req_height && half_width / factor >= req_width {
            factor *= 2;
        }
    }
    factor
}

/// Rotate clockwise by the capture orientation; identity passes the
/// buffer through untouched.
fn rotate_if_needed(pixels: RgbaImage, orientation: Orientation) -> RgbaImage {
    match orientation {
        Orientation::Deg0 => pixels,
        Orientation::Deg90 => imageops::rotate90(&pixels),
        Orientation::Deg180 => imageops::rotate180(&pixels),
        Orientation::Deg270 => imageops::rotate270(&pixels),
    }
}
