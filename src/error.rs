//! Error types for the media index and decode pipeline.
//!
//! The original behavior this crate reproduces collapses every failure
//! into "no results" or "no image" at the screen level. The collapse
//! still happens, but it happens in the state holders on purpose; the
//! index and gateway report what actually went wrong.

use thiserror::Error;

/// Failures raised by a [`MediaIndex`](crate::index::MediaIndex)
/// implementation.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The index could not be queried at all (e.g. root unreadable).
    #[error("media index unavailable: {0}")]
    Unavailable(String),

    /// No item with this id exists in the index.
    #[error("no media item with id {0:?}")]
    NotFound(String),

    #[error("media index I/O error")]
    Io(#[from] std::io::Error),
}

/// Failures raised by the [`MediaGateway`](crate::gateway::MediaGateway)
/// query/decode paths.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Index(#[from] IndexError),

    /// The bounds probe or pixel decode rejected the byte stream.
    #[error("image decode failed")]
    Decode(#[from] image::ImageError),

    /// The in-memory byte stream could not be probed.
    #[error("image probe failed")]
    Probe(#[from] std::io::Error),

    /// The blocking decode task was cancelled or panicked.
    #[error("decode task failed")]
    TaskFailed,
}
