//! Refresher crate for the cardbook contact publisher.
//!
//! This crate contains the scheduler that periodically fetches raw cards,
//! parses and qualifies them, and publishes the result for readers.
//!
//! ## Example Usage
//! ```ignore
//! use std::sync::Arc;
//! use contacts::CardParser;
//! use refresher::{RefreshConfig, RefreshScheduler};
//! use sources::DirectoryCollector;
//!
//! let scheduler = RefreshScheduler::new(
//!     Arc::new(DirectoryCollector::new("/srv/cards")),
//!     Arc::new(CardParser::new()),
//! );
//! scheduler.start(RefreshConfig::from_hours(6, "Family"))?;
//!
//! // Any task, any time:
//! let contacts = scheduler.current_contacts();
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod scheduler;
pub mod status;

pub use config::RefreshConfig;
pub use diagnostics::{Diagnostics, ParseDiagnostic};
pub use error::{ConfigError, SchedulerError};
pub use scheduler::{ContactSet, RefreshScheduler};
pub use status::{CycleOutcome, CycleReport, RefreshStatus, SchedulerState};
