//! Order reference numbers.
//!
//! References look like `DV-482913`: the `DV-` prefix followed by six
//! digits. They are generated client-side at order completion; collision
//! probability is accepted for this non-adversarial flow, and the validated
//! newtype keeps the door open for server-issued identifiers later.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const REFERENCE_PREFIX: &str = "DV-";
const DIGIT_COUNT: usize = 6;

/// Error validating an order reference.
#[derive(Debug, Error)]
pub enum OrderReferenceError {
    #[error("order reference does not start with {REFERENCE_PREFIX}: {0}")]
    BadPrefix(String),
    #[error("order reference must have exactly {DIGIT_COUNT} digits: {0}")]
    BadDigits(String),
}

/// A validated order reference number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderReference(String);

impl OrderReference {
    /// Parse and validate an order reference.
    ///
    /// # Errors
    ///
    /// Returns `OrderReferenceError` if the prefix or digit format is wrong.
    pub fn parse(value: impl Into<String>) -> Result<Self, OrderReferenceError> {
        let value = value.into();
        let Some(digits) = value.strip_prefix(REFERENCE_PREFIX) else {
            return Err(OrderReferenceError::BadPrefix(value));
        };
        if digits.len() != DIGIT_COUNT || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(OrderReferenceError::BadDigits(value));
        }
        Ok(Self(value))
    }

    /// Build a reference from a raw number, zero-padded to six digits.
    ///
    /// Numbers wider than six digits are rejected rather than truncated.
    ///
    /// # Errors
    ///
    /// Returns `OrderReferenceError` if `number` does not fit in six digits.
    pub fn from_number(number: u32) -> Result<Self, OrderReferenceError> {
        Self::parse(format!("{REFERENCE_PREFIX}{number:06}"))
    }

    /// Get the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OrderReference {
    type Error = OrderReferenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<OrderReference> for String {
    fn from(reference: OrderReference) -> Self {
        reference.0
    }
}

impl std::fmt::Display for OrderReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let reference = OrderReference::parse("DV-482913").unwrap();
        assert_eq!(reference.as_str(), "DV-482913");
    }

    #[test]
    fn test_from_number_pads() {
        let reference = OrderReference::from_number(42).unwrap();
        assert_eq!(reference.as_str(), "DV-000042");
    }

    #[test]
    fn test_from_number_rejects_wide() {
        assert!(OrderReference::from_number(1_000_000).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_prefix() {
        assert!(matches!(
            OrderReference::parse("XX-482913"),
            Err(OrderReferenceError::BadPrefix(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        assert!(matches!(
            OrderReference::parse("DV-48291A"),
            Err(OrderReferenceError::BadDigits(_))
        ));
    }
}
