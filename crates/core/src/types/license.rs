//! License key type and status.
//!
//! License keys are issued once per purchased line item at order completion
//! and are immutable afterwards. The wire format is
//! `DV-LCN-XXXXXXXX-XXXXXXXX` with two 8-character uppercase base36 segments.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix shared by every license key.
const KEY_PREFIX: &str = "DV-LCN-";

/// Length of each base36 segment.
const SEGMENT_LEN: usize = 8;

/// Error validating a license key.
#[derive(Debug, Error)]
pub enum LicenseKeyError {
    #[error("license key does not start with {KEY_PREFIX}: {0}")]
    BadPrefix(String),
    #[error("license key has malformed segments: {0}")]
    BadSegments(String),
}

/// A validated license key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LicenseKey(String);

impl LicenseKey {
    /// Parse and validate a license key.
    ///
    /// # Errors
    ///
    /// Returns `LicenseKeyError` if the prefix or segment format is wrong.
    pub fn parse(value: impl Into<String>) -> Result<Self, LicenseKeyError> {
        let value = value.into();
        let Some(rest) = value.strip_prefix(KEY_PREFIX) else {
            return Err(LicenseKeyError::BadPrefix(value));
        };
        let Some((first, second)) = rest.split_once('-') else {
            return Err(LicenseKeyError::BadSegments(value));
        };
        if !is_base36_segment(first) || !is_base36_segment(second) {
            return Err(LicenseKeyError::BadSegments(value));
        }
        Ok(Self(value))
    }

    /// Build a key from two already-generated base36 segments.
    ///
    /// # Errors
    ///
    /// Returns `LicenseKeyError` if either segment is malformed.
    pub fn from_segments(first: &str, second: &str) -> Result<Self, LicenseKeyError> {
        Self::parse(format!("{KEY_PREFIX}{first}-{second}"))
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_base36_segment(segment: &str) -> bool {
    segment.len() == SEGMENT_LEN
        && segment
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
}

impl TryFrom<String> for LicenseKey {
    type Error = LicenseKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<LicenseKey> for String {
    fn from(key: LicenseKey) -> Self {
        key.0
    }
}

impl std::fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of an issued license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    /// Issued and usable. Every freshly generated license starts here.
    #[default]
    Active,
    /// Withdrawn after issuance (refund, abuse). Not currently reachable
    /// through the storefront pipeline.
    Revoked,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let key = LicenseKey::parse("DV-LCN-AB12CD34-EF56GH78").unwrap();
        assert_eq!(key.as_str(), "DV-LCN-AB12CD34-EF56GH78");
    }

    #[test]
    fn test_parse_rejects_bad_prefix() {
        assert!(matches!(
            LicenseKey::parse("XX-LCN-AB12CD34-EF56GH78"),
            Err(LicenseKeyError::BadPrefix(_))
        ));
    }

    #[test]
    fn test_parse_rejects_lowercase() {
        assert!(matches!(
            LicenseKey::parse("DV-LCN-ab12cd34-ef56gh78"),
            Err(LicenseKeyError::BadSegments(_))
        ));
    }

    #[test]
    fn test_parse_rejects_short_segment() {
        assert!(matches!(
            LicenseKey::parse("DV-LCN-AB12-EF56GH78"),
            Err(LicenseKeyError::BadSegments(_))
        ));
    }

    #[test]
    fn test_from_segments() {
        let key = LicenseKey::from_segments("AAAAAAAA", "00000000").unwrap();
        assert_eq!(key.to_string(), "DV-LCN-AAAAAAAA-00000000");
        assert!(LicenseKey::from_segments("AAA", "00000000").is_err());
    }

    #[test]
    fn test_status_default_active() {
        assert_eq!(LicenseStatus::default(), LicenseStatus::Active);
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&LicenseStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
    }
}
