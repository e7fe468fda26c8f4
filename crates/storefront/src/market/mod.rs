//! Marketplace API collaborators.
//!
//! # Architecture
//!
//! - The marketplace backend is the source of truth - NO local sync, direct
//!   API calls over its REST surface
//! - Collaborators are traits ([`Catalog`], [`CartBackend`], [`Sessions`])
//!   so the cart store and checkout machine can be tested against in-memory
//!   fakes
//! - [`MarketClient`] is the production implementation of all three, with
//!   in-memory caching via `moka` for product snapshots
//!
//! # REST surface
//!
//! - `GET  /session` - current user and resolution state
//! - `GET  /products/{id}` - product snapshot
//! - `GET  /products/{id}/reviews` - reviews for a product
//! - `POST /products/{id}/reviews` - create a review
//! - `GET  /cart` - the authenticated user's cart
//! - `POST /cart/items` - add an item (idempotent upsert on productId)
//! - `DELETE /cart/items/{productId}` - remove an item

mod client;
pub mod types;

pub use client::MarketClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use digivault_core::ProductId;

use crate::session::SessionState;

/// Errors that can occur when talking to the marketplace API.
#[derive(Debug, Error)]
pub enum MarketError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bearer token missing, expired, or rejected.
    #[error("Authentication required")]
    AuthRequired,

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The API rejected the request (non-success status with a message).
    #[error("API error: {0}")]
    Api(String),
}

/// Read access to products and reviews.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch a product snapshot.
    async fn product(&self, id: ProductId) -> Result<ProductSnapshot, MarketError>;

    /// List reviews for a product.
    async fn reviews(&self, product_id: ProductId) -> Result<Vec<Review>, MarketError>;

    /// Create a review, returning the stored copy.
    ///
    /// Plain create-and-refetch; the pipeline has no invariants here.
    async fn submit_review(
        &self,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<Review, MarketError>;
}

/// The remote cart the store reconciles against.
#[async_trait]
pub trait CartBackend: Send + Sync {
    /// Load the authoritative cart for the current user.
    async fn fetch_cart(&self) -> Result<Cart, MarketError>;

    /// Add a product, returning the authoritative line item.
    ///
    /// Must behave as an idempotent upsert on `product_id`.
    async fn add_item(&self, product_id: ProductId) -> Result<CartItem, MarketError>;

    /// Remove a product. Removing an absent product is not an error.
    async fn remove_item(&self, product_id: ProductId) -> Result<(), MarketError>;
}

/// The session service.
#[async_trait]
pub trait Sessions: Send + Sync {
    /// Observe the current session state.
    async fn session(&self) -> Result<SessionState, MarketError>;
}
