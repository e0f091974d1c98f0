//! Decoded bitmap shared between cache and screen snapshots.
//!
//! Pixels sit behind an `Arc` so a cache hit and the photo list can hold
//! the same allocation; cloning a `Bitmap` never copies pixel data.

use std::fmt;
use std::sync::Arc;

use image::RgbaImage;

/// Estimated bytes per pixel for RGBA bitmaps.
const BYTES_PER_PIXEL: usize = 4;

/// An immutable decoded image in RGBA form.
#[derive(Clone)]
pub struct Bitmap {
    pixels: Arc<RgbaImage>,
}

impl Bitmap {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    /// Uniform-color bitmap, handy for fixtures.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::new(RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Decoded size in bytes.
    pub fn byte_count(&self) -> usize {
        (self.width() as usize) * (self.height() as usize) * BYTES_PER_PIXEL
    }

    /// Cache weight in kilobytes. Never zero, so even tiny bitmaps
    /// count against the cache budget.
    pub fn weight_kb(&self) -> u64 {
        ((self.byte_count() / 1024) as u64).max(1)
    }

    /// True when both bitmaps share the same allocation.
    pub fn same_allocation(&self, other: &Bitmap) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
            || (self.pixels.dimensions() == other.pixels.dimensions()
                && self.pixels.as_raw() == other.pixels.as_raw())
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("bytes", &self.byte_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_count_and_weight() {
        let bmp = Bitmap::solid(100, 100, [0, 0, 0, 255]);
        assert_eq!(bmp.byte_count(), 100 * 100 * 4);
        assert_eq!(bmp.weight_kb(), (100 * 100 * 4 / 1024) as u64);
    }

    #[test]
    fn test_weight_never_zero() {
        let bmp = Bitmap::solid(1, 1, [0, 0, 0, 255]);
        assert_eq!(bmp.weight_kb(), 1);
    }

    #[test]
    fn test_clone_shares_pixels() {
        let bmp = Bitmap::solid(4, 4, [9, 9, 9, 255]);
        let copy = bmp.clone();
        assert!(bmp.same_allocation(&copy));
        assert_eq!(bmp, copy);
    }

    #[test]
    fn test_equality_by_content() {
        let a = Bitmap::solid(2, 2, [1, 2, 3, 255]);
        let b = Bitmap::solid(2, 2, [1, 2, 3, 255]);
        let c = Bitmap::solid(2, 2, [4, 5, 6, 255]);
        assert!(!a.same_allocation(&b));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
