//! Core trait for card sources.

use crate::error::Result;

/// Supplies the ordered list of raw card records on demand.
///
/// ## Design Note
/// - Calls are synchronous; the refresher runs them on the blocking pool, so
///   implementations may do file or network I/O directly
/// - `Send + Sync` lets one collector be shared with the background worker
/// - Returning an empty list is not an error
pub trait SourceCollector: Send + Sync {
    /// Returns the name of this source (for logging/debugging)
    fn name(&self) -> &str;

    /// Fetch every raw record currently available, in a stable order.
    fn fetch_raw_records(&self) -> Result<Vec<String>>;
}
