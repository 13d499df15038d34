//! Error types for region operations.

use std::io;

/// Error type for region operations.
///
/// IO and cursor-query timeouts inside the render path are absorbed (the
/// region degrades to a no-op rather than failing the host); this type covers
/// the faults that are surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    /// A 1-based line number of zero was passed to a line operation.
    #[error("line numbers start at 1, got {0}")]
    LineOutOfRange(usize),

    /// The region was destroyed and can no longer be mutated.
    #[error("region has been destroyed")]
    Destroyed,

    /// IO error from an explicit lifecycle operation (creation, destroy).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias for region operations.
pub type Result<T> = std::result::Result<T, RegionError>;
