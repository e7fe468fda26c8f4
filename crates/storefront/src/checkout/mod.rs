//! Checkout.
//!
//! Orchestrates the review / payment-selection / authorization /
//! completion lifecycle for a set of line items. The lifecycle is an
//! explicit state machine ([`CheckoutFlow`]) with one authoritative status
//! field - there is no flag combination in which a checkout is both
//! processing and completed.
//!
//! Payment providers sit behind the [`PaymentGateway`] trait; the shipped
//! implementation is [`SimulatedGateway`], which settles every
//! authorization after a fixed delay. Real rails are out of scope.

pub mod gateway;
pub mod machine;
pub mod payment;

pub use gateway::{
    Authorization, AuthorizationRequest, GatewayError, PaymentGateway, SimulatedGateway,
};
pub use machine::{CheckoutFlow, CheckoutStatus};
pub use payment::{ContactFields, FieldRequirement, PaymentInstrument, PaymentMethod};

use thiserror::Error;

use crate::error::Notice;
use crate::market::MarketError;

/// Errors surfaced by the checkout machine.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout attempted with zero line items; no transition happens.
    #[error("Your cart is empty")]
    EmptyCart,

    /// A required field for the selected payment method is missing.
    #[error("{0}")]
    Validation(String),

    /// An authorization is already in flight; re-submission is disabled.
    #[error("a payment authorization is already in progress")]
    SubmissionInFlight,

    /// The gateway declined or could not be reached.
    #[error("payment authorization failed: {0}")]
    AuthorizationFailed(String),

    /// The gateway did not answer within the configured deadline.
    #[error("payment authorization timed out")]
    TimedOut,

    /// Resolving line items through the catalog failed.
    #[error(transparent)]
    Market(#[from] MarketError),
}

impl CheckoutError {
    /// Convert to a toast for the checkout page.
    #[must_use]
    pub fn to_notice(&self) -> Notice {
        match self {
            Self::EmptyCart | Self::Validation(_) => Notice::error(self.to_string()),
            Self::SubmissionInFlight => Notice::error("Payment is already being processed"),
            Self::AuthorizationFailed(_) | Self::TimedOut => {
                Notice::error("Payment failed. Please try again.")
            }
            Self::Market(err) => {
                tracing::warn!(error = %err, "checkout remote call failed");
                Notice::error("Something went wrong. Please try again.")
            }
        }
    }
}
