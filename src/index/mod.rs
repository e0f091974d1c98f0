//! The media index capability.
//!
//! The gallery core never touches storage directly; it goes through the
//! narrow [`MediaIndex`] interface, injected at construction. Two
//! implementations ship with the crate:
//! - [`FsMediaIndex`] - a directory-backed index for real use
//! - [`InMemoryMediaIndex`] - a deterministic fake for tests and demos

pub mod fs;
pub mod memory;

pub use fs::FsMediaIndex;
pub use memory::InMemoryMediaIndex;

use crate::error::IndexError;
use crate::models::IndexEntry;

/// Read-only view of a platform media catalog.
///
/// Implementations must be cheap to call concurrently; both methods run
/// on the blocking pool and may perform I/O.
pub trait MediaIndex: Send + Sync {
    /// All image entries, sorted by insertion time descending (newest
    /// first). An index with no images returns an empty vec, not an
    /// error.
    fn list_entries(&self) -> Result<Vec<IndexEntry>, IndexError>;

    /// Raw encoded bytes for one item, keyed by its stable id.
    fn open_bytes(&self, id: &str) -> Result<Vec<u8>, IndexError>;
}
