//! Order synthesis and license issuance.
//!
//! On a successful authorization the checkout machine calls [`issue_order`]
//! exactly once per checkout session: one license per line item, a fresh
//! reference number, and the total of the line items in force at that
//! moment. Licenses are immutable after issuance.
//!
//! Identifiers are generated client-side from a non-cryptographic RNG;
//! acceptable for this non-adversarial flow, and the validated core types
//! leave an upgrade path to server-issued IDs.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use digivault_core::{LicenseKey, LicenseStatus, OrderReference, Price, ProductId};

use crate::market::{CartItem, ProductSnapshot};

/// An issued license for one purchased line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub key: LicenseKey,
    pub status: LicenseStatus,
    pub product_id: ProductId,
}

/// One purchased line item with its license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: ProductSnapshot,
    pub license: License,
}

/// A completed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub reference: OrderReference,
    pub items: Vec<OrderItem>,
    pub total: Price,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// The receipt view handed to the orders page and confirmation email.
    #[must_use]
    pub fn receipt(&self) -> OrderReceipt {
        OrderReceipt {
            reference_number: self.reference.clone(),
            items: self
                .items
                .iter()
                .map(|item| ReceiptItem {
                    product_id: item.product.id,
                    title: item.product.title.clone(),
                    license_key: item.license.key.clone(),
                })
                .collect(),
            total: self.total,
            created_at: self.created_at,
        }
    }
}

/// Serialized order shape returned to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub reference_number: OrderReference,
    pub items: Vec<ReceiptItem>,
    pub total: Price,
    pub created_at: DateTime<Utc>,
}

/// One line in a receipt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub product_id: ProductId,
    pub title: String,
    pub license_key: LicenseKey,
}

/// Turn authorized line items into an order with one license each.
///
/// The total is recomputed here from the line items passed in, so it always
/// reflects the prices in force at authorization time.
#[must_use]
pub fn issue_order(line_items: &[CartItem]) -> Order {
    let mut rng = rand::rng();

    let items = line_items
        .iter()
        .map(|line| OrderItem {
            product: line.product.clone(),
            license: License {
                key: generate_license_key(&mut rng),
                status: LicenseStatus::Active,
                product_id: line.product_id,
            },
        })
        .collect();

    Order {
        reference: generate_reference(&mut rng),
        items,
        total: line_items.iter().map(|line| line.product.price).sum(),
        created_at: Utc::now(),
    }
}

/// Generate a `DV-LCN-XXXXXXXX-XXXXXXXX` key (uppercase base36 segments).
fn generate_license_key<R: Rng>(rng: &mut R) -> LicenseKey {
    let first = base36_segment(rng);
    let second = base36_segment(rng);
    // Generated segments always satisfy the format the parser enforces.
    LicenseKey::from_segments(&first, &second)
        .unwrap_or_else(|_| unreachable!("generated segments are valid base36"))
}

fn base36_segment<R: Rng>(rng: &mut R) -> String {
    (0..8)
        .map(|_| {
            let digit = rng.random_range(0..36u32);
            char::from_digit(digit, 36)
                .map_or('0', |c| c.to_ascii_uppercase())
        })
        .collect()
}

/// Generate a `DV-` reference with six random digits.
fn generate_reference<R: Rng>(rng: &mut R) -> OrderReference {
    let number = rng.random_range(0..1_000_000u32);
    OrderReference::from_number(number)
        .unwrap_or_else(|_| unreachable!("six-digit numbers are valid references"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use digivault_core::Price;

    fn line(id: i32, cents: i64) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            product: ProductSnapshot {
                id: ProductId::new(id),
                title: format!("Product {id}"),
                price: Price::from_cents(cents),
                images: Vec::new(),
                category: None,
                vendor: None,
            },
        }
    }

    #[test]
    fn test_one_license_per_item() {
        let order = issue_order(&[line(1, 2000), line(2, 2900)]);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total, Price::from_cents(4900));
        assert_eq!(order.items[0].license.status, LicenseStatus::Active);
    }

    #[test]
    fn test_license_keys_distinct_and_well_formed() {
        let order = issue_order(&[line(1, 2000), line(2, 2900)]);
        let first = &order.items[0].license.key;
        let second = &order.items[1].license.key;
        assert_ne!(first, second);
        // Round-trips through the validating parser
        assert!(LicenseKey::parse(first.as_str()).is_ok());
    }

    #[test]
    fn test_references_distinct_across_orders() {
        let a = issue_order(&[line(1, 2000)]);
        let b = issue_order(&[line(1, 2000)]);
        // Not guaranteed in theory, but a collision here is a one-in-a-million
        // flake and worth the signal.
        assert_ne!(a.reference, b.reference);
    }

    #[test]
    fn test_empty_order() {
        let order = issue_order(&[]);
        assert!(order.items.is_empty());
        assert_eq!(order.total, Price::ZERO);
    }

    #[test]
    fn test_receipt_wire_shape() {
        let order = issue_order(&[line(12, 4900)]);
        let json = serde_json::to_value(order.receipt()).unwrap();

        assert!(json["referenceNumber"].as_str().unwrap().starts_with("DV-"));
        assert_eq!(json["items"][0]["productId"], 12);
        assert_eq!(json["items"][0]["title"], "Product 12");
        assert!(
            json["items"][0]["licenseKey"]
                .as_str()
                .unwrap()
                .starts_with("DV-LCN-")
        );
        assert!(json["total"].is_number());
        assert!(json["createdAt"].is_string());
    }
}
