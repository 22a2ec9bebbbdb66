//! Core domain types for parsed contact cards.
//!
//! A `Contact` is built once by the parser from one raw vCard record and is
//! never modified afterwards; the refresher shares published contacts behind
//! an `Arc<[Contact]>`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;

/// Media type attached to every decoded photo. The card's own type hint is
/// not trusted.
pub const PHOTO_MEDIA_TYPE: &str = "application/octet-stream";

// =============================================================================
// Identity
// =============================================================================

/// Stable identifier derived from the raw record text.
///
/// Two records with byte-identical text always share a fingerprint, whatever
/// the parser makes of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// SHA-256 of the raw text, lower-case hex.
    pub fn of(raw: &str) -> Self {
        let digest = Sha256::digest(raw.as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, enough to tell records apart in logs.
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Contact entries
// =============================================================================

/// A TEL entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    /// Parameter descriptions joined with ", " (e.g. "HOME, CELL"), or empty
    pub kind: String,
    /// Stored verbatim, no format validation
    pub number: String,
}

/// An EMAIL entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// Same joining rule as `PhoneNumber::kind`
    pub kind: String,
    pub address: String,
}

/// Embedded picture, kept as an opaque blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Photo {
    #[serde(serialize_with = "serialize_base64")]
    pub data: Vec<u8>,
    pub media_type: String,
}

impl Photo {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            media_type: PHOTO_MEDIA_TYPE.to_string(),
        }
    }
}

fn serialize_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(data))
}

// =============================================================================
// Contact
// =============================================================================

/// One parsed contact card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    fingerprint: Fingerprint,
    pub given_name: String,
    pub family_name: String,
    pub birthday: Option<NaiveDate>,
    pub phone_numbers: Vec<PhoneNumber>,
    pub emails: Vec<Email>,
    /// Ordered set so that output is deterministic
    pub categories: BTreeSet<String>,
    pub photo: Option<Photo>,
}

impl Contact {
    /// Create a contact with only a name; everything else starts empty.
    pub fn new(
        fingerprint: Fingerprint,
        given_name: impl Into<String>,
        family_name: impl Into<String>,
    ) -> Self {
        Self {
            fingerprint,
            given_name: given_name.into(),
            family_name: family_name.into(),
            birthday: None,
            phone_numbers: Vec::new(),
            emails: Vec::new(),
            categories: BTreeSet::new(),
            photo: None,
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Given and family name separated by a space, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
            .trim()
            .to_string()
    }

    pub fn has_full_name(&self) -> bool {
        !self.full_name().is_empty()
    }

    pub fn has_birthday(&self) -> bool {
        self.birthday.is_some()
    }

    pub fn has_emails(&self) -> bool {
        !self.emails.is_empty()
    }

    pub fn has_phone_numbers(&self) -> bool {
        !self.phone_numbers.is_empty()
    }

    /// Exact, case-sensitive category membership.
    pub fn of_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }
}
