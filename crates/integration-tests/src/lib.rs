//! Shared fakes for the DigiVault integration tests.
//!
//! The storefront pipeline talks to two external parties: the marketplace
//! API (catalog, cart, session) and a payment gateway. Both are traits, so
//! the tests here wire the real components against in-memory stand-ins:
//!
//! - [`InMemoryMarket`] holds a product table and a server-side cart in
//!   hash maps, with scriptable per-call failures
//! - [`RecordingGateway`] records every authorization attempt and plays
//!   back a scripted sequence of outcomes

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use digivault_core::{Price, ProductId, ReviewId};
use digivault_storefront::checkout::{
    Authorization, AuthorizationRequest, GatewayError, PaymentGateway,
};
use digivault_storefront::market::{
    Cart, CartBackend, CartItem, Catalog, MarketError, ProductSnapshot, Review,
};

/// Build a product snapshot with the given id and price in cents.
#[must_use]
pub fn product(id: i32, title: &str, cents: i64) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::new(id),
        title: title.to_string(),
        price: Price::from_cents(cents),
        images: vec![format!("https://cdn.digivault.test/{id}.png")],
        category: Some("ui-kits".to_string()),
        vendor: None,
    }
}

/// In-memory marketplace: catalog plus remote cart.
///
/// Mutations go through a std mutex; nothing here holds a lock across an
/// await point.
pub struct InMemoryMarket {
    products: Mutex<HashMap<ProductId, ProductSnapshot>>,
    cart: Mutex<Vec<CartItem>>,
    reviews: Mutex<Vec<Review>>,
    /// Number of upcoming mutations that should fail.
    failures: AtomicUsize,
}

impl InMemoryMarket {
    #[must_use]
    pub fn new(products: Vec<ProductSnapshot>) -> Self {
        Self {
            products: Mutex::new(products.into_iter().map(|p| (p.id, p)).collect()),
            cart: Mutex::new(Vec::new()),
            reviews: Mutex::new(Vec::new()),
            failures: AtomicUsize::new(0),
        }
    }

    /// Fail the next `count` cart mutations with an API error.
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    fn take_failure(&self) -> bool {
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Product ids currently in the server-side cart.
    #[must_use]
    pub fn server_cart_ids(&self) -> Vec<ProductId> {
        self.cart
            .lock()
            .expect("cart lock")
            .iter()
            .map(|item| item.product_id)
            .collect()
    }

    /// Change a product's price, in the catalog and in any cart line
    /// already holding it.
    pub fn set_price(&self, product_id: ProductId, cents: i64) {
        let price = Price::from_cents(cents);
        if let Some(product) = self
            .products
            .lock()
            .expect("products lock")
            .get_mut(&product_id)
        {
            product.price = price;
        }
        for item in self
            .cart
            .lock()
            .expect("cart lock")
            .iter_mut()
            .filter(|item| item.product_id == product_id)
        {
            item.product.price = price;
        }
    }

    /// Seed the server-side cart directly, as if from a previous session.
    pub fn seed_cart(&self, product_ids: &[ProductId]) {
        let products = self.products.lock().expect("products lock");
        let mut cart = self.cart.lock().expect("cart lock");
        for &product_id in product_ids {
            if let Some(product) = products.get(&product_id) {
                cart.push(CartItem {
                    product_id,
                    product: product.clone(),
                });
            }
        }
    }
}

#[async_trait]
impl Catalog for InMemoryMarket {
    async fn product(&self, id: ProductId) -> Result<ProductSnapshot, MarketError> {
        self.products
            .lock()
            .expect("products lock")
            .get(&id)
            .cloned()
            .ok_or_else(|| MarketError::NotFound(id.to_string()))
    }

    async fn reviews(&self, product_id: ProductId) -> Result<Vec<Review>, MarketError> {
        Ok(self
            .reviews
            .lock()
            .expect("reviews lock")
            .iter()
            .filter(|review| review.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn submit_review(
        &self,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<Review, MarketError> {
        let mut reviews = self.reviews.lock().expect("reviews lock");
        let review = Review {
            id: ReviewId::new(i32::try_from(reviews.len()).unwrap_or(i32::MAX) + 1),
            product_id,
            rating,
            comment: comment.to_string(),
            created_at: chrono::Utc::now(),
        };
        reviews.push(review.clone());
        Ok(review)
    }
}

#[async_trait]
impl CartBackend for InMemoryMarket {
    async fn fetch_cart(&self) -> Result<Cart, MarketError> {
        Ok(Cart {
            items: self.cart.lock().expect("cart lock").clone(),
        })
    }

    async fn add_item(&self, product_id: ProductId) -> Result<CartItem, MarketError> {
        if self.take_failure() {
            return Err(MarketError::Api("scripted failure".to_string()));
        }
        let product = self
            .products
            .lock()
            .expect("products lock")
            .get(&product_id)
            .cloned()
            .ok_or_else(|| MarketError::NotFound(product_id.to_string()))?;
        let item = CartItem {
            product_id,
            product,
        };

        let mut cart = self.cart.lock().expect("cart lock");
        // Idempotent upsert on product_id
        if !cart.iter().any(|existing| existing.product_id == product_id) {
            cart.push(item.clone());
        }
        Ok(item)
    }

    async fn remove_item(&self, product_id: ProductId) -> Result<(), MarketError> {
        if self.take_failure() {
            return Err(MarketError::Api("scripted failure".to_string()));
        }
        self.cart
            .lock()
            .expect("cart lock")
            .retain(|item| item.product_id != product_id);
        Ok(())
    }
}

/// One scripted gateway outcome.
#[derive(Debug, Clone)]
pub enum GatewayOutcome {
    Approve,
    Decline(&'static str),
    /// Never answer; used with a paused clock to exercise the deadline.
    Hang,
}

/// Gateway that records attempts and plays back scripted outcomes.
///
/// When the script runs out, remaining attempts are approved.
pub struct RecordingGateway {
    script: Mutex<Vec<GatewayOutcome>>,
    attempts: Mutex<Vec<AuthorizationRequest>>,
}

impl RecordingGateway {
    #[must_use]
    pub fn approving() -> Self {
        Self::scripted(Vec::new())
    }

    #[must_use]
    pub fn scripted(script: Vec<GatewayOutcome>) -> Self {
        Self {
            script: Mutex::new(script),
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Every authorization request received, in order.
    #[must_use]
    pub fn attempts(&self) -> Vec<AuthorizationRequest> {
        self.attempts.lock().expect("attempts lock").clone()
    }

    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().expect("attempts lock").len()
    }

    fn next_outcome(&self) -> GatewayOutcome {
        let mut script = self.script.lock().expect("script lock");
        if script.is_empty() {
            GatewayOutcome::Approve
        } else {
            script.remove(0)
        }
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn authorize(
        &self,
        request: AuthorizationRequest,
    ) -> Result<Authorization, GatewayError> {
        self.attempts.lock().expect("attempts lock").push(request);
        match self.next_outcome() {
            GatewayOutcome::Approve => Ok(Authorization {
                transaction_id: uuid::Uuid::new_v4(),
            }),
            GatewayOutcome::Decline(reason) => Err(GatewayError::Declined(reason.to_string())),
            GatewayOutcome::Hang => {
                std::future::pending::<()>().await;
                unreachable!("pending future never resolves")
            }
        }
    }
}
