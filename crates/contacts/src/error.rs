//! Error types for the contacts crate.
//!
//! A `ParseError` always describes a single raw record. Callers that process
//! batches are expected to log it and move on to the next record.

use thiserror::Error;

/// Errors that can occur while turning raw vCard text into a `Contact`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The first non-blank line is not `BEGIN:VCARD`
    #[error("record does not start with BEGIN:VCARD")]
    MissingBegin,

    /// `BEGIN:VCARD` was found but the card is never closed
    #[error("record has no matching END:VCARD")]
    MissingEnd,

    /// A content line could not be split into name, parameters and value
    ///
    /// `line` is 1-based and counts unfolded (logical) lines.
    #[error("malformed content line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    /// A property the grammar requires is absent
    #[error("missing mandatory property {0}")]
    MissingField(&'static str),

    /// BDAY is present but not a date we understand
    #[error("invalid BDAY value: {0}")]
    InvalidBirthday(String),

    /// Inline PHOTO data could not be decoded
    #[error("invalid PHOTO data: {0}")]
    InvalidPhoto(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ParseError>;
