//! Wire types for the marketplace API.
//!
//! Field names follow the API's camelCase JSON. `ProductSnapshot` doubles
//! as the optimistic placeholder the cart store inserts before the server
//! answers an add; placeholders are reconciled or rolled back, never kept.

use serde::{Deserialize, Serialize};

use digivault_core::{Price, ProductId, ReviewId, VendorId};

/// A product as the catalog returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Vendor>,
}

impl ProductSnapshot {
    /// Placeholder snapshot for an optimistic cart insert.
    ///
    /// Holds only the ID; the server's add response supplies the real data.
    #[must_use]
    pub fn placeholder(id: ProductId) -> Self {
        Self {
            id,
            title: String::new(),
            price: Price::ZERO,
            images: Vec::new(),
            category: None,
            vendor: None,
        }
    }

    /// True if this snapshot is an unreconciled placeholder.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.title.is_empty()
    }
}

/// The vendor behind a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: VendorId,
    pub store_name: String,
}

/// A product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    /// Star rating, 1-5.
    pub rating: u8,
    pub comment: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// One line in a cart. Unique by `product_id`; the domain has no quantity
/// concept, so re-adding an existing product is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub product: ProductSnapshot,
}

/// The authenticated user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

/// Envelope around `GET /cart`.
#[derive(Debug, Deserialize)]
pub(crate) struct CartEnvelope {
    pub cart: Cart,
}

/// Body for `POST /cart/items`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddItemRequest {
    pub product_id: ProductId,
}

/// Body for `POST /products/{id}/reviews`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateReviewRequest {
    pub rating: u8,
    pub comment: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_item_wire_format() {
        let json = serde_json::json!({
            "productId": 12,
            "product": {
                "id": 12,
                "title": "Icon Pack",
                "price": 20.00,
                "images": ["https://cdn.digivault.test/12.png"],
                "category": "ui-kits",
                "vendor": { "id": 3, "storeName": "Premium Creator" }
            }
        });

        let item: CartItem = serde_json::from_value(json).unwrap();
        assert_eq!(item.product_id, ProductId::new(12));
        assert_eq!(item.product.title, "Icon Pack");
        assert_eq!(item.product.price, Price::from_cents(2000));
        assert_eq!(
            item.product.vendor.as_ref().unwrap().store_name,
            "Premium Creator"
        );
    }

    #[test]
    fn test_product_optional_fields_default() {
        let json = serde_json::json!({ "id": 5, "title": "Font", "price": 9.5 });
        let product: ProductSnapshot = serde_json::from_value(json).unwrap();
        assert!(product.images.is_empty());
        assert!(product.vendor.is_none());
        assert!(!product.is_placeholder());
    }

    #[test]
    fn test_placeholder_detection() {
        let placeholder = ProductSnapshot::placeholder(ProductId::new(9));
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.price, Price::ZERO);
    }

    #[test]
    fn test_add_item_request_camel_case() {
        let body = AddItemRequest {
            product_id: ProductId::new(7),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "productId": 7 }));
    }
}
