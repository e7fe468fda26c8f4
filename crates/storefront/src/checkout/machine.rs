//! The checkout state machine.
//!
//! A [`CheckoutFlow`] owns one checkout session from entry to completion.
//! Its status field is the single source of truth for where the session
//! is in the lifecycle:
//!
//! ```text
//! Idle -> Reviewing -> Validating -> Processing -> Completed
//!             ^            |             |
//!             +------------+-------------+--> Failed --(edit/retry)--> ...
//! ```
//!
//! Completion is terminal and idempotent: once an order has been issued,
//! further `authorize` calls return the same order without touching the
//! gateway. Failure is not terminal; editing a field or retrying moves
//! the session back through validation.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use digivault_core::{Price, ProductId};

use crate::cart::CartStore;
use crate::error::Notice;
use crate::market::{CartItem, Catalog};
use crate::orders::{Order, issue_order};

use super::gateway::{AuthorizationRequest, PaymentGateway};
use super::payment::{ContactFields, PaymentMethod};
use super::CheckoutError;

/// Where a checkout session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutStatus {
    /// No session entered yet.
    #[default]
    Idle,
    /// Line items and payment form shown; accepting edits.
    Reviewing,
    /// Submitted; fields being checked against the selected method.
    Validating,
    /// An authorization is in flight. Re-submission is rejected.
    Processing,
    /// Order issued. Terminal.
    Completed,
    /// The last authorization was declined or timed out. Retryable.
    Failed,
}

/// One checkout session.
///
/// Entered either from the cart (purchased items are cleared from the
/// cart on completion) or directly with product ids (the cart is left
/// alone).
pub struct CheckoutFlow {
    id: Uuid,
    line_items: Vec<CartItem>,
    selected: PaymentMethod,
    fields: ContactFields,
    status: CheckoutStatus,
    order: Option<Order>,
    cart: Option<CartStore>,
}

impl std::fmt::Debug for CheckoutFlow {
    // Manual impl: the cart store handle is not Debug, and the payment
    // fields must not end up in logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutFlow")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("selected", &self.selected)
            .field("line_items", &self.line_items.len())
            .field("from_cart", &self.cart.is_some())
            .finish_non_exhaustive()
    }
}

impl CheckoutFlow {
    /// Enter checkout with the cart's current line items.
    pub async fn enter_from_cart(cart: &CartStore) -> Self {
        Self::enter(cart.items().await, Some(cart.clone()))
    }

    /// Enter checkout directly with product ids, resolving each through
    /// the catalog. Used by the buy-now path.
    ///
    /// # Errors
    ///
    /// Propagates the first catalog failure; no partial session is kept.
    pub async fn enter_direct(
        product_ids: &[ProductId],
        catalog: &dyn Catalog,
    ) -> Result<Self, CheckoutError> {
        let mut line_items = Vec::with_capacity(product_ids.len());
        for &product_id in product_ids {
            let product = catalog.product(product_id).await?;
            line_items.push(CartItem {
                product_id,
                product,
            });
        }
        Ok(Self::enter(line_items, None))
    }

    fn enter(line_items: Vec<CartItem>, cart: Option<CartStore>) -> Self {
        Self {
            id: Uuid::new_v4(),
            line_items,
            selected: PaymentMethod::default_method(),
            fields: ContactFields::default(),
            status: CheckoutStatus::Reviewing,
            order: None,
            cart,
        }
    }

    /// Stable identifier for this session.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn status(&self) -> CheckoutStatus {
        self.status
    }

    /// Line items under checkout.
    #[must_use]
    pub fn line_items(&self) -> &[CartItem] {
        &self.line_items
    }

    /// The currently selected payment method.
    #[must_use]
    pub const fn selected_method(&self) -> PaymentMethod {
        self.selected
    }

    /// The payment form contents.
    #[must_use]
    pub const fn fields(&self) -> &ContactFields {
        &self.fields
    }

    /// The issued order, once completed.
    #[must_use]
    pub const fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Order total, computed fresh from the line items.
    #[must_use]
    pub fn total(&self) -> Price {
        self.line_items.iter().map(|item| item.product.price).sum()
    }

    /// Select a payment method. All typed fields are retained.
    pub fn select_method(&mut self, method: PaymentMethod) {
        self.selected = method;
        self.recover_from_failure();
    }

    /// Edit the payment form. Editing after a failure re-arms the session.
    pub fn edit_fields(&mut self, edit: impl FnOnce(&mut ContactFields)) {
        edit(&mut self.fields);
        self.recover_from_failure();
    }

    fn recover_from_failure(&mut self) {
        if self.status == CheckoutStatus::Failed {
            self.status = CheckoutStatus::Reviewing;
        }
    }

    /// Submit the session for authorization.
    ///
    /// Validates the payment fields, authorizes through the gateway
    /// (bounded by `deadline`), and on success issues the order and, for
    /// cart-entered sessions, clears the purchased items from the cart.
    ///
    /// Calling this on a completed session returns the existing order
    /// without contacting the gateway. No session ever yields two orders.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] if there are no line items
    /// - [`CheckoutError::SubmissionInFlight`] if already authorizing
    /// - [`CheckoutError::Validation`] if required fields are missing;
    ///   the session returns to reviewing with fields intact
    /// - [`CheckoutError::AuthorizationFailed`] or
    ///   [`CheckoutError::TimedOut`] on gateway failure; the session is
    ///   failed but retryable
    #[instrument(skip(self, gateway), fields(checkout_id = %self.id))]
    pub async fn authorize(
        &mut self,
        gateway: &dyn PaymentGateway,
        deadline: Duration,
    ) -> Result<Order, CheckoutError> {
        if self.status == CheckoutStatus::Completed {
            if let Some(order) = &self.order {
                info!(reference = %order.reference, "already completed, returning existing order");
                return Ok(order.clone());
            }
        }
        if matches!(
            self.status,
            CheckoutStatus::Validating | CheckoutStatus::Processing
        ) {
            return Err(CheckoutError::SubmissionInFlight);
        }
        if self.line_items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        self.status = CheckoutStatus::Validating;
        let instrument = match self.fields.instrument_for(self.selected) {
            Ok(instrument) => instrument,
            Err(err) => {
                self.status = CheckoutStatus::Reviewing;
                return Err(err);
            }
        };

        self.status = CheckoutStatus::Processing;
        let request = AuthorizationRequest {
            attempt_id: Uuid::new_v4(),
            session_id: self.id,
            instrument,
            amount: self.total(),
        };

        match timeout(deadline, gateway.authorize(request)).await {
            Ok(Ok(authorization)) => {
                let order = issue_order(&self.line_items);
                info!(
                    reference = %order.reference,
                    transaction_id = %authorization.transaction_id,
                    items = order.items.len(),
                    "checkout completed"
                );

                if let Some(cart) = &self.cart {
                    let purchased: Vec<ProductId> = self
                        .line_items
                        .iter()
                        .map(|item| item.product_id)
                        .collect();
                    cart.clear_purchased(&purchased).await;
                }

                self.order = Some(order.clone());
                self.status = CheckoutStatus::Completed;
                Ok(order)
            }
            Ok(Err(err)) => {
                warn!(error = %err, "authorization failed");
                self.status = CheckoutStatus::Failed;
                Err(CheckoutError::AuthorizationFailed(err.to_string()))
            }
            Err(_elapsed) => {
                warn!(deadline_secs = deadline.as_secs(), "authorization timed out");
                self.status = CheckoutStatus::Failed;
                Err(CheckoutError::TimedOut)
            }
        }
    }

    /// Apply an external cancellation signal, e.g. the user navigating
    /// away mid-processing or landing back on checkout with a canceled
    /// payment marker in the URL.
    ///
    /// Returns the notice to show. A completed session ignores the
    /// signal; the order stands. No order is issued and the session can
    /// be resubmitted.
    pub fn external_cancel(&mut self) -> Option<Notice> {
        match self.status {
            CheckoutStatus::Idle | CheckoutStatus::Completed => None,
            _ => {
                self.status = CheckoutStatus::Reviewing;
                Some(Notice::error("Payment was canceled. Please try again."))
            }
        }
    }
}
