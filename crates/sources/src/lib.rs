//! # Sources Crate
//!
//! This crate implements the places raw vCard records come from.
//!
//! ## Components
//!
//! ### SourceCollector
//! The trait the refresher calls once per cycle to get the current, ordered
//! list of raw records.
//!
//! ### Directory Source
//! Reads `*.vcf` files from a folder (optionally recursive) and splits
//! multi-card files into one record per card.
//!
//! ### Static Source
//! Serves records held in memory; useful for embedding and tests.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{DirectoryCollector, SourceCollector};
//!
//! let collector = DirectoryCollector::new("/srv/cards").with_recursive(true);
//! let records = collector.fetch_raw_records()?;
//! ```

// Public modules
pub mod directory;
pub mod error;
pub mod in_memory;
pub mod traits;

// Re-export commonly used types
pub use directory::DirectoryCollector;
pub use error::{Result, SourceError};
pub use in_memory::StaticCollector;
pub use traits::SourceCollector;
