//! Error types for the sources crate.

use std::path::PathBuf;
use thiserror::Error;

/// A collector could not produce any records this cycle.
///
/// Individual unreadable entries are skipped by the collectors themselves;
/// this error means the source as a whole is unavailable.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The configured location does not exist
    #[error("card source not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The configured location exists but is not a directory
    #[error("card source is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// I/O error while listing the source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed
    #[error("failed to walk card directory: {0}")]
    Walk(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, SourceError>;
