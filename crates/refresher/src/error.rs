//! Error types for the refresher crate.
//!
//! Only `start()` can fail. Everything that goes wrong inside a cycle is
//! logged and recorded in diagnostics or status instead of being returned.

use thiserror::Error;

/// The supplied refresh configuration is unusable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The refresh interval must be positive
    #[error("refresh interval must be greater than zero")]
    ZeroInterval,
}

/// `RefreshScheduler::start` refused to start
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("invalid refresh configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("scheduler is already running")]
    AlreadyStarted,

    /// Stop is terminal; a stopped scheduler cannot be restarted
    #[error("scheduler has been stopped")]
    Stopped,

    /// `start` was called outside a Tokio runtime
    #[error("no Tokio runtime available to run the refresh worker")]
    NoRuntime,
}
