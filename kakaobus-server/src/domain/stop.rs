//! Bus stop identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Longest stop identifier we accept.
const MAX_LEN: usize = 64;

/// Error returned when parsing an invalid stop identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id: {reason}")]
pub struct InvalidStopId {
    reason: &'static str,
}

/// An opaque KakaoMap bus stop identifier (e.g. `BS219565` or `11110051`).
///
/// The identifier is treated as opaque: we only guarantee it is non-empty,
/// bounded in length and made of URL-safe characters, so that it can be
/// used both as a query parameter and as a unique key.
///
/// # Examples
///
/// ```
/// use kakaobus_server::domain::StopId;
///
/// let id = StopId::parse(" BS219565 ").unwrap();
/// assert_eq!(id.as_str(), "BS219565");
///
/// assert!(StopId::parse("").is_err());
/// assert!(StopId::parse("12 34").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StopId(String);

impl StopId {
    /// Parse a stop identifier, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        let s = s.trim();

        if s.is_empty() {
            return Err(InvalidStopId {
                reason: "must not be empty",
            });
        }

        if s.len() > MAX_LEN {
            return Err(InvalidStopId {
                reason: "must be at most 64 characters",
            });
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(InvalidStopId {
                reason: "must contain only ASCII letters, digits, '-' or '_'",
            });
        }

        Ok(StopId(s.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StopId {
    type Error = InvalidStopId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StopId::parse(&value)
    }
}

impl From<StopId> for String {
    fn from(id: StopId) -> Self {
        id.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
