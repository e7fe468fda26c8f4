//! Payment gateway abstraction.
//!
//! Real payment rails sit behind [`PaymentGateway`] so the checkout
//! machine can be exercised against scripted outcomes. The shipped
//! implementation, [`SimulatedGateway`], approves every authorization
//! after a fixed settle delay.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use digivault_core::Price;

use super::payment::PaymentInstrument;

/// One authorization attempt handed to a gateway.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Unique per attempt; retries get a fresh id.
    pub attempt_id: Uuid,
    /// Stable for the life of one checkout flow.
    pub session_id: Uuid,
    pub instrument: PaymentInstrument,
    pub amount: Price,
}

/// A successful authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    /// The gateway's transaction identifier.
    pub transaction_id: Uuid,
}

/// Gateway-side failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The rail rejected the payment.
    #[error("payment declined: {0}")]
    Declined(String),

    /// The rail could not be reached or errored out.
    #[error("payment gateway unreachable: {0}")]
    Unreachable(String),
}

/// A payment rail capable of authorizing a charge.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Authorize the given amount against the instrument.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the rail declines or cannot be
    /// reached. Cancellation (dropping the future) must leave no charge.
    async fn authorize(&self, request: AuthorizationRequest) -> Result<Authorization, GatewayError>;
}

/// Gateway that settles every authorization after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    settle_delay: Duration,
}

impl SimulatedGateway {
    /// Default settle delay, matching typical wallet confirmation latency.
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(2500);

    #[must_use]
    pub const fn new(settle_delay: Duration) -> Self {
        Self { settle_delay }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SETTLE_DELAY)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn authorize(&self, request: AuthorizationRequest) -> Result<Authorization, GatewayError> {
        tracing::debug!(
            attempt_id = %request.attempt_id,
            amount = %request.amount,
            "simulating settlement"
        );
        tokio::time::sleep(self.settle_delay).await;
        Ok(Authorization {
            transaction_id: Uuid::new_v4(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::checkout::payment::PaymentMethod;

    fn request() -> AuthorizationRequest {
        AuthorizationRequest {
            attempt_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            instrument: PaymentInstrument::Wallet {
                method: PaymentMethod::JazzCash,
                phone_number: "03001234567".to_string(),
            },
            amount: Price::from_cents(4900),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_gateway_settles_after_delay() {
        let gateway = SimulatedGateway::default();
        let start = tokio::time::Instant::now();
        let auth = gateway.authorize(request()).await.unwrap();
        assert_eq!(start.elapsed(), SimulatedGateway::DEFAULT_SETTLE_DELAY);
        assert_ne!(auth.transaction_id, Uuid::nil());
    }
}
