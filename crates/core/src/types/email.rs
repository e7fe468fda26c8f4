//! Validated email address type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error validating an email address.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email address is empty")]
    Empty,
    #[error("email address is missing '@': {0}")]
    MissingAtSign(String),
    #[error("email address has an empty local part or domain: {0}")]
    MissingPart(String),
}

/// A syntactically plausible email address.
///
/// Validation is intentionally shallow (presence of a local part and a
/// domain); deliverability is the session service's problem, not ours.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Parse and validate an email address.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the address is empty, has no `@`, or has an
    /// empty local part or domain.
    pub fn parse(value: impl Into<String>) -> Result<Self, EmailError> {
        let value = value.into();
        if value.is_empty() {
            return Err(EmailError::Empty);
        }
        let Some((local, domain)) = value.split_once('@') else {
            return Err(EmailError::MissingAtSign(value));
        };
        if local.is_empty() || domain.is_empty() {
            return Err(EmailError::MissingPart(value));
        }
        Ok(Self(value))
    }

    /// Get the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
