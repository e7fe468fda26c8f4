//! Unified storefront error handling.
//!
//! Provides the `StoreError` taxonomy shared by the cart and checkout
//! components, and the `Notice` type the presentation layer renders as a
//! toast. Remote-call failures are converted at the component boundary;
//! nothing in this crate is allowed to take the page down.

use thiserror::Error;

use crate::market::MarketError;

/// Storefront-level error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No authenticated user. Triggers a login redirect, never a toast.
    #[error("authentication required")]
    AuthRequired,

    /// A required checkout field is missing. Recoverable; user input is
    /// preserved.
    #[error("{0}")]
    Validation(String),

    /// Checkout was attempted with zero line items.
    #[error("Your cart is empty")]
    EmptyCart,

    /// A remote call failed. Optimistic cart mutations roll back.
    #[error("network error: {0}")]
    Network(MarketError),
}

impl From<MarketError> for StoreError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::AuthRequired => Self::AuthRequired,
            other => Self::Network(other),
        }
    }
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A user-visible notification (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    /// Create a success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Create an error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl StoreError {
    /// Convert to a toast, if this error is one the user should see.
    ///
    /// `AuthRequired` returns `None` because its surface is a redirect to
    /// the login page, not a notification.
    #[must_use]
    pub fn to_notice(&self) -> Option<Notice> {
        match self {
            Self::AuthRequired => None,
            Self::Validation(message) => Some(Notice::error(message.clone())),
            Self::EmptyCart => Some(Notice::error("Your cart is empty")),
            Self::Network(err) => {
                tracing::warn!(error = %err, "remote call failed");
                Some(Notice::error("Something went wrong. Please try again."))
            }
        }
    }
}
