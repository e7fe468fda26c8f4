//! Cart store.
//!
//! Holds the authoritative cart for the current user and exposes optimistic
//! add/remove mutations. Every view of the cart (count badge, cart page,
//! checkout summary) reads through the same store, so an optimistic write
//! or its rollback is immediately visible everywhere - there is no torn
//! intermediate state a reader can observe.
//!
//! Mutations are a transaction of three steps: apply the optimistic change,
//! issue the remote request, then reconcile with the server item or replay
//! the pre-mutation snapshot. The whole transaction runs under one async
//! mutex, which also gives the ordering guarantee: mutations are applied in
//! the order the user issued them, never reordered or coalesced.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{instrument, warn};

use digivault_core::{Price, ProductId};

use crate::error::{Result, StoreError};
use crate::market::{Cart, CartBackend, CartItem, ProductSnapshot};

/// Immutable view of the cart published to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    /// Line items in insertion order.
    pub items: Vec<CartItem>,
    /// Bumped on every visible change, including rollbacks.
    pub revision: u64,
}

impl CartSnapshot {
    /// Number of line items (the count badge).
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of line item prices, computed fresh from current snapshots.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(|item| item.product.price).sum()
    }
}

struct CartState {
    items: Vec<CartItem>,
    revision: u64,
}

struct CartStoreInner {
    backend: Arc<dyn CartBackend>,
    state: Mutex<CartState>,
    publish: watch::Sender<CartSnapshot>,
}

/// The single owned cart store all views read through.
///
/// Cheaply cloneable; clones share state and subscribers.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

impl CartStore {
    /// Create a store backed by the given remote cart.
    #[must_use]
    pub fn new(backend: Arc<dyn CartBackend>) -> Self {
        let (publish, _) = watch::channel(CartSnapshot::default());
        Self {
            inner: Arc::new(CartStoreInner {
                backend,
                state: Mutex::new(CartState {
                    items: Vec::new(),
                    revision: 0,
                }),
                publish,
            }),
        }
    }

    /// Subscribe to cart changes.
    ///
    /// The receiver yields a fresh [`CartSnapshot`] after every visible
    /// mutation, reconciliation, or rollback.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.inner.publish.subscribe()
    }

    /// Current line items.
    pub async fn items(&self) -> Vec<CartItem> {
        self.inner.state.lock().await.items.clone()
    }

    /// Number of line items.
    pub async fn item_count(&self) -> usize {
        self.inner.state.lock().await.items.len()
    }

    /// Sum of line item prices, computed fresh on every call.
    pub async fn subtotal(&self) -> Price {
        self.inner
            .state
            .lock()
            .await
            .items
            .iter()
            .map(|item| item.product.price)
            .sum()
    }

    /// Checkout target for the current items:
    /// `/checkout?products=<comma-separated ids>`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyCart`] if there is nothing to check out.
    pub async fn checkout_target(&self) -> Result<String> {
        let state = self.inner.state.lock().await;
        if state.items.is_empty() {
            return Err(StoreError::EmptyCart);
        }
        let ids = state
            .items
            .iter()
            .map(|item| item.product_id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        Ok(format!("/checkout?products={ids}"))
    }

    /// Load the authoritative cart, replacing local state.
    ///
    /// Holds the mutation lock across the remote call like `add`/`remove`
    /// do, so a concurrent mutation cannot land between reading the server
    /// cart and replacing local state.
    ///
    /// # Errors
    ///
    /// Propagates backend failures; the caller keeps showing its loading
    /// skeleton until this resolves. No internal retry.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Cart> {
        let mut state = self.inner.state.lock().await;
        let cart = self.inner.backend.fetch_cart().await?;
        state.items = cart.items.clone();
        publish(&self.inner.publish, &mut state);
        Ok(cart)
    }

    /// Optimistically add a product.
    ///
    /// Inserts a placeholder line item, then reconciles it with the
    /// authoritative item from the server. On failure the insert is rolled
    /// back. Adding a product that is already present is a no-op, so
    /// repeated adds converge to a single line item.
    ///
    /// # Errors
    ///
    /// Returns the backend error after rolling back the optimistic insert.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: ProductId) -> Result<()> {
        // One mutation at a time: the lock spans optimistic apply, remote
        // call, and reconcile-or-rollback.
        let mut state = self.inner.state.lock().await;

        if state.items.iter().any(|item| item.product_id == product_id) {
            return Ok(());
        }

        state.items.push(CartItem {
            product_id,
            product: ProductSnapshot::placeholder(product_id),
        });
        publish(&self.inner.publish, &mut state);

        match self.inner.backend.add_item(product_id).await {
            Ok(item) => {
                reconcile(&mut state.items, item);
                publish(&self.inner.publish, &mut state);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "add failed, rolling back optimistic insert");
                state.items.retain(|item| item.product_id != product_id);
                publish(&self.inner.publish, &mut state);
                Err(err.into())
            }
        }
    }

    /// Optimistically remove a product.
    ///
    /// Deletes the line item locally, then issues the remote remove. On
    /// failure the item is re-inserted at its old position. Removing an
    /// absent product is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns the backend error after rolling back the optimistic delete.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: ProductId) -> Result<()> {
        let mut state = self.inner.state.lock().await;

        let Some(position) = state
            .items
            .iter()
            .position(|item| item.product_id == product_id)
        else {
            return Ok(());
        };
        let removed = state.items.remove(position);
        publish(&self.inner.publish, &mut state);

        match self.inner.backend.remove_item(product_id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(error = %err, "remove failed, restoring line item");
                let position = position.min(state.items.len());
                state.items.insert(position, removed);
                publish(&self.inner.publish, &mut state);
                Err(err.into())
            }
        }
    }

    /// Drop purchased items after a completed order.
    ///
    /// Local removal is unconditional; the remote removes are best-effort
    /// because the purchase has already completed and a stale line item is
    /// preferable to un-completing an order. Failures are logged.
    #[instrument(skip(self, product_ids))]
    pub async fn clear_purchased(&self, product_ids: &[ProductId]) {
        let mut state = self.inner.state.lock().await;
        state
            .items
            .retain(|item| !product_ids.contains(&item.product_id));
        publish(&self.inner.publish, &mut state);
        drop(state);

        for &product_id in product_ids {
            if let Err(err) = self.inner.backend.remove_item(product_id).await {
                warn!(%product_id, error = %err, "failed to clear purchased item remotely");
            }
        }
    }
}

/// Replace the placeholder (or stale copy) matching the server item.
fn reconcile(items: &mut [CartItem], authoritative: CartItem) {
    if let Some(slot) = items
        .iter_mut()
        .find(|item| item.product_id == authoritative.product_id)
    {
        *slot = authoritative;
    }
}

/// Bump the revision and publish the new snapshot.
fn publish(sender: &watch::Sender<CartSnapshot>, state: &mut CartState) {
    state.revision += 1;
    // send() only fails with no receivers; the store itself outlives them.
    let _ = sender.send(CartSnapshot {
        items: state.items.clone(),
        revision: state.revision,
    });
}
