//! # Contacts Crate
//!
//! Turns raw vCard text into structured contacts.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Contact, PhoneNumber, Email, Photo, Fingerprint)
//! - **grammar**: Content-line level vCard syntax (unfolding, parameters, escaping)
//! - **parser**: `CardParser` and multi-card splitting
//! - **error**: `ParseError`
//!
//! ## Example Usage
//!
//! ```
//! use contacts::CardParser;
//!
//! let parser = CardParser::new();
//! let contact = parser
//!     .parse("BEGIN:VCARD\nVERSION:3.0\nN:Doe;Jane;;;\nTEL:555-0100\nEND:VCARD\n")
//!     .unwrap();
//!
//! assert_eq!(contact.full_name(), "Jane Doe");
//! assert_eq!(contact.phone_numbers[0].number, "555-0100");
//! ```

// Public modules
pub mod error;
pub mod grammar;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{ParseError, Result};
pub use parser::{CardParser, split_records};
pub use types::{Contact, Email, Fingerprint, PHOTO_MEDIA_TYPE, PhoneNumber, Photo};
