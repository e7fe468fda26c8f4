//! Marketplace API client implementation.
//!
//! Uses `reqwest` against the REST surface described in the module docs.
//! Product snapshots are cached with `moka` (TTL from configuration); cart
//! and session endpoints are never cached - they are mutable state.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use digivault_core::ProductId;

use crate::config::StorefrontConfig;
use crate::market::types::{
    AddItemRequest, Cart, CartEnvelope, CartItem, CreateReviewRequest, ProductSnapshot, Review,
};
use crate::market::{CartBackend, Catalog, MarketError, Sessions};
use crate::models::CurrentUser;
use crate::session::SessionState;

/// Envelope around `GET /session`.
#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    user: Option<CurrentUser>,
}

/// Client for the marketplace API.
///
/// Cheaply cloneable; implements [`Catalog`], [`CartBackend`], and
/// [`Sessions`].
#[derive(Clone)]
pub struct MarketClient {
    inner: Arc<MarketClientInner>,
}

struct MarketClientInner {
    client: reqwest::Client,
    base_url: String,
    token: SecretString,
    products: Cache<ProductId, ProductSnapshot>,
}

impl MarketClient {
    /// Create a new marketplace API client.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.product_cache_ttl)
            .build();

        let base_url = config.api_base_url.as_str().trim_end_matches('/').to_string();

        Self {
            inner: Arc::new(MarketClientInner {
                client: reqwest::Client::new(),
                base_url,
                token: config.api_token.clone(),
                products,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Execute a request and decode the JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<T, MarketError> {
        let response = request
            .bearer_auth(self.inner.token.expose_secret())
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MarketError::AuthRequired);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketError::NotFound(context.to_string()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(MarketError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                context,
                body = %response_text.chars().take(500).collect::<String>(),
                "marketplace API returned non-success status"
            );
            return Err(MarketError::Api(format!(
                "HTTP {status}: {}",
                response_text.chars().take(200).collect::<String>()
            )));
        }

        match serde_json::from_str(&response_text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    context,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "failed to parse marketplace API response"
                );
                Err(MarketError::Parse(e))
            }
        }
    }

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, id: ProductId) {
        self.inner.products.invalidate(&id).await;
    }

    /// Invalidate all cached products.
    pub async fn invalidate_all(&self) {
        self.inner.products.invalidate_all();
        self.inner.products.run_pending_tasks().await;
    }
}

#[async_trait]
impl Catalog for MarketClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<ProductSnapshot, MarketError> {
        if let Some(product) = self.inner.products.get(&id).await {
            debug!("cache hit for product");
            return Ok(product);
        }

        let product: ProductSnapshot = self
            .execute(
                self.inner.client.get(self.endpoint(&format!("/products/{id}"))),
                &format!("product {id}"),
            )
            .await?;

        self.inner.products.insert(id, product.clone()).await;

        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn reviews(&self, product_id: ProductId) -> Result<Vec<Review>, MarketError> {
        self.execute(
            self.inner
                .client
                .get(self.endpoint(&format!("/products/{product_id}/reviews"))),
            &format!("reviews for product {product_id}"),
        )
        .await
    }

    #[instrument(skip(self, comment), fields(product_id = %product_id))]
    async fn submit_review(
        &self,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<Review, MarketError> {
        self.execute(
            self.inner
                .client
                .post(self.endpoint(&format!("/products/{product_id}/reviews")))
                .json(&CreateReviewRequest {
                    rating,
                    comment: comment.to_string(),
                }),
            &format!("review for product {product_id}"),
        )
        .await
    }
}

#[async_trait]
impl CartBackend for MarketClient {
    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<Cart, MarketError> {
        let envelope: CartEnvelope = self
            .execute(self.inner.client.get(self.endpoint("/cart")), "cart")
            .await?;
        Ok(envelope.cart)
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn add_item(&self, product_id: ProductId) -> Result<CartItem, MarketError> {
        self.execute(
            self.inner
                .client
                .post(self.endpoint("/cart/items"))
                .json(&AddItemRequest { product_id }),
            &format!("add product {product_id} to cart"),
        )
        .await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn remove_item(&self, product_id: ProductId) -> Result<(), MarketError> {
        // The delete endpoint returns a small success document; decoding it
        // as a generic value keeps the trait surface minimal.
        let _: serde_json::Value = self
            .execute(
                self.inner
                    .client
                    .delete(self.endpoint(&format!("/cart/items/{product_id}"))),
                &format!("remove product {product_id} from cart"),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Sessions for MarketClient {
    #[instrument(skip(self))]
    async fn session(&self) -> Result<SessionState, MarketError> {
        let envelope: SessionEnvelope = self
            .execute(self.inner.client.get(self.endpoint("/session")), "session")
            .await?;
        Ok(SessionState::resolved(envelope.user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_client() -> MarketClient {
        let config = StorefrontConfig {
            api_base_url: url::Url::parse("https://api.digivault.test/").unwrap(),
            api_token: SecretString::from("tok_test"),
            authorize_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_millis(2500),
            product_cache_ttl: Duration::from_secs(300),
        };
        MarketClient::new(&config)
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = test_client();
        assert_eq!(
            client.endpoint("/cart/items/12"),
            "https://api.digivault.test/cart/items/12"
        );
    }

    #[test]
    fn test_session_envelope_decodes_null_user() {
        let envelope: SessionEnvelope = serde_json::from_str("{\"user\":null}").unwrap();
        assert!(envelope.user.is_none());
    }
}
