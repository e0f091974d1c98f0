//! Configuration for the gallery core.
//!
//! Mirrors the original sizing rule: the thumbnail cache gets one eighth
//! of the process heap budget, measured in kilobytes. Rust has no
//! runtime-queryable heap ceiling, so the budget is an explicit knob
//! with a conservative default.

/// Default heap budget in kilobytes (256 MB).
const DEFAULT_HEAP_BUDGET_KB: u64 = 256 * 1024;

/// Fraction of the heap budget given to the thumbnail cache.
const CACHE_FRACTION: u64 = 8;

/// Minimum thumbnail cache capacity in kilobytes.
const MIN_CACHE_KB: u64 = 4 * 1024;

/// Maximum thumbnail cache capacity in kilobytes.
const MAX_CACHE_KB: u64 = 512 * 1024;

/// Target bounding box for grid thumbnails in pixels.
pub const THUMB_TARGET: (u32, u32) = (100, 100);

/// Target bounding box for the detail view's full-resolution decode.
pub const FULL_TARGET: (u32, u32) = (2048, 2048);

/// Tunables for cache sizing.
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// Assumed process heap budget in kilobytes.
    pub heap_budget_kb: u64,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            heap_budget_kb: DEFAULT_HEAP_BUDGET_KB,
        }
    }
}

impl GalleryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heap_budget_kb(mut self, kb: u64) -> Self {
        self.heap_budget_kb = kb;
        self
    }

    /// Thumbnail cache capacity: one eighth of the heap budget, clamped
    /// to keep pathological budgets from producing a useless or
    /// unbounded cache.
    pub fn cache_capacity_kb(&self) -> u64 {
        (self.heap_budget_kb / CACHE_FRACTION).clamp(MIN_CACHE_KB, MAX_CACHE_KB)
    }
}
