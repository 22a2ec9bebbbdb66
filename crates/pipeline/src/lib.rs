//! Pipeline for qualifying parsed contacts before publication.
//!
//! This crate provides:
//! - `qualifies`, the publication rule as one pure predicate
//! - ContactFilter trait and one filter per clause of that rule
//! - FilterPipeline for composing filters
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterPipeline, qualifies};
//!
//! let pipeline = FilterPipeline::qualification("Family");
//! let published = pipeline.apply(parsed_contacts);
//!
//! assert!(published.iter().all(|c| qualifies(c, "Family")));
//! ```

pub mod filter_pipeline;
pub mod filters;
pub mod qualification;
pub mod traits;

// Re-export main types
pub use filter_pipeline::FilterPipeline;
pub use qualification::qualifies;
pub use traits::ContactFilter;
