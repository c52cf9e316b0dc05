//! Location key type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid location key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid location key: {reason}")]
pub struct InvalidLocationKey {
    reason: &'static str,
}

/// A normalized identifier for a named place (e.g. `BERGAMO`).
///
/// Keys are uppercased at construction, so `bergamo` and `BERGAMO` name the
/// same cache slot. A key never contains `-`: that character is the
/// separator in composite `START-END` route cache keys, and keeping it out
/// of the halves makes those keys unambiguous to split.
///
/// # Examples
///
/// ```
/// use ride_planner::domain::LocationKey;
///
/// let key = LocationKey::parse("Dalmine").unwrap();
/// assert_eq!(key.as_str(), "DALMINE");
///
/// // The composite-key separator is rejected
/// assert!(LocationKey::parse("A-B").is_err());
///
/// // Empty input is rejected
/// assert!(LocationKey::parse("  ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationKey(String);

impl LocationKey {
    /// Parse and normalize a location key.
    ///
    /// The input is trimmed and uppercased. Empty input, the reserved `-`
    /// separator, and control characters are rejected.
    pub fn parse(s: &str) -> Result<Self, InvalidLocationKey> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidLocationKey {
                reason: "must not be empty",
            });
        }

        if trimmed.contains('-') {
            return Err(InvalidLocationKey {
                reason: "must not contain '-' (reserved as the route key separator)",
            });
        }

        if trimmed.chars().any(char::is_control) {
            return Err(InvalidLocationKey {
                reason: "must not contain control characters",
            });
        }

        Ok(LocationKey(trimmed.to_uppercase()))
    }

    /// Returns the normalized key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocationKey({})", self.0)
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LocationKey {
    type Error = InvalidLocationKey;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        LocationKey::parse(&s)
    }
}

impl From<LocationKey> for String {
    fn from(key: LocationKey) -> Self {
        key.0
    }
}
