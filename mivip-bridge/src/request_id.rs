//! Request identifier normalisation and validation.
//!
//! Identifiers reach the bridge two ways: typed (or pasted) by a user, or
//! embedded in a scanned QR payload such as a deep link. [`RequestId::parse`]
//! handles the first, [`RequestId::extract`] the second.
//!
//! The canonical form is the trimmed, lowercase `8-4-4-4-12` hyphenated UUID.
//! Only canonical identifiers are ever used as registry keys.

use crate::errors::BridgeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a hyphenated UUID.
const UUID_LEN: usize = 36;

/// Positions of the hyphens in a hyphenated UUID.
const HYPHENS: [usize; 4] = [8, 13, 18, 23];

/// A canonical (trimmed, lowercase) verification request identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequestId(String);

impl RequestId {
    /// Parse a raw identifier.
    ///
    /// Surrounding whitespace is trimmed and hex digits are lowercased; the
    /// result must match the UUID grammar in full.
    pub fn parse(raw: &str) -> Result<Self, BridgeError> {
        let normalized = raw.trim().to_lowercase();
        if matches_uuid_grammar(normalized.as_bytes()) && revalidate(&normalized) {
            return Ok(Self(normalized));
        }
        Err(BridgeError::InvalidIdentifier(raw.to_string()))
    }

    /// Extract an identifier from a raw value or a longer payload.
    ///
    /// Tries [`RequestId::parse`] first. Failing that, the leftmost substring
    /// that matches the UUID grammar is taken and validated again as a full
    /// UUID before it is accepted.
    pub fn extract(payload: &str) -> Result<Self, BridgeError> {
        if let Ok(id) = Self::parse(payload) {
            return Ok(id);
        }

        find_uuid_substring(payload)
            .and_then(|candidate| Self::parse(candidate).ok())
            .ok_or_else(|| BridgeError::InvalidIdentifier(payload.to_string()))
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the canonical string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for RequestId {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RequestId {
    type Error = BridgeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RequestId> for String {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

/// Check that `bytes` is exactly one hyphenated UUID (either case).
fn matches_uuid_grammar(bytes: &[u8]) -> bool {
    bytes.len() == UUID_LEN
        && bytes.iter().enumerate().all(|(i, b)| {
            if HYPHENS.contains(&i) {
                *b == b'-'
            } else {
                b.is_ascii_hexdigit()
            }
        })
}

/// Full UUID validation, independent of the grammar scan.
fn revalidate(candidate: &str) -> bool {
    uuid::Uuid::try_parse(candidate)
        .map(|uuid| uuid.hyphenated().to_string() == candidate)
        .unwrap_or(false)
}

/// Leftmost substring of `haystack` matching the UUID grammar.
fn find_uuid_substring(haystack: &str) -> Option<&str> {
    let bytes = haystack.as_bytes();
    if bytes.len() < UUID_LEN {
        return None;
    }
    (0..=bytes.len() - UUID_LEN)
        .find(|&start| matches_uuid_grammar(&bytes[start..start + UUID_LEN]))
        // The window is pure ASCII, so both ends are char boundaries.
        .and_then(|start| haystack.get(start..start + UUID_LEN))
}

/// Quick check for payloads that carry a request identifier.
pub fn looks_like_request_payload(payload: &str) -> bool {
    RequestId::extract(payload).is_ok()
}
