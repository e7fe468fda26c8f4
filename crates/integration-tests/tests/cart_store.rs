//! Integration tests for the cart store against the in-memory market.
//!
//! Exercises the optimistic mutation pipeline end to end: local apply,
//! remote call, reconcile or rollback, and what subscribers observe.

use std::sync::Arc;

use digivault_core::{Price, ProductId};
use digivault_integration_tests::{InMemoryMarket, product};
use digivault_storefront::cart::CartStore;
use digivault_storefront::error::StoreError;

fn market() -> Arc<InMemoryMarket> {
    Arc::new(InMemoryMarket::new(vec![
        product(1, "Icon Pack", 2000),
        product(2, "Font Bundle", 2900),
        product(3, "UI Kit", 4500),
    ]))
}

// =============================================================================
// Fetch
// =============================================================================

#[tokio::test]
async fn test_fetch_loads_server_cart() {
    let market = market();
    market.seed_cart(&[ProductId::new(1), ProductId::new(3)]);
    let store = CartStore::new(market.clone());

    let cart = store.fetch().await.expect("fetch");
    assert_eq!(cart.items.len(), 2);
    assert_eq!(store.item_count().await, 2);
    assert_eq!(store.subtotal().await, Price::from_cents(6500));
}

// =============================================================================
// Optimistic add / remove
// =============================================================================

#[tokio::test]
async fn test_add_updates_local_and_remote() {
    let market = market();
    let store = CartStore::new(market.clone());

    store.add(ProductId::new(1)).await.expect("add");
    store.add(ProductId::new(2)).await.expect("add");

    assert_eq!(store.item_count().await, 2);
    assert_eq!(
        market.server_cart_ids(),
        vec![ProductId::new(1), ProductId::new(2)]
    );
}

#[tokio::test]
async fn test_failed_add_leaves_both_sides_clean() {
    let market = market();
    let store = CartStore::new(market.clone());

    market.fail_next(1);
    let err = store.add(ProductId::new(1)).await.expect_err("scripted");
    assert!(matches!(err, StoreError::Network(_)));

    assert_eq!(store.item_count().await, 0);
    assert!(market.server_cart_ids().is_empty());
}

#[tokio::test]
async fn test_remove_then_failed_remove_restores_order() {
    let market = market();
    let store = CartStore::new(market.clone());
    for id in [1, 2, 3] {
        store.add(ProductId::new(id)).await.expect("add");
    }

    store.remove(ProductId::new(2)).await.expect("remove");
    assert_eq!(
        market.server_cart_ids(),
        vec![ProductId::new(1), ProductId::new(3)]
    );

    market.fail_next(1);
    let _ = store.remove(ProductId::new(1)).await.expect_err("scripted");

    // The failed remove rolled back into its original position.
    let ids: Vec<ProductId> = store
        .items()
        .await
        .into_iter()
        .map(|item| item.product_id)
        .collect();
    assert_eq!(ids, vec![ProductId::new(1), ProductId::new(3)]);
}

#[tokio::test]
async fn test_mutations_apply_in_issue_order() {
    let market = market();
    let store = CartStore::new(market.clone());

    // Issue several mutations concurrently from clones of the store; the
    // internal mutex serializes them in acquisition order, and the end
    // state must reflect all of them.
    let handles: Vec<_> = [1, 2, 3]
        .into_iter()
        .map(|id| {
            let store = store.clone();
            tokio::spawn(async move { store.add(ProductId::new(id)).await })
        })
        .collect();
    for handle in handles {
        handle.await.expect("join").expect("add");
    }

    assert_eq!(store.item_count().await, 3);
    assert_eq!(market.server_cart_ids().len(), 3);
}

#[tokio::test]
async fn test_subtotal_reflects_price_change_on_refetch() {
    let market = market();
    let store = CartStore::new(market.clone());
    store.add(ProductId::new(1)).await.expect("add");
    store.add(ProductId::new(2)).await.expect("add");
    assert_eq!(store.subtotal().await, Price::from_cents(4900));

    // The vendor reprices product 1 while it sits in the cart.
    market.set_price(ProductId::new(1), 2500);
    store.fetch().await.expect("fetch");

    assert_eq!(store.subtotal().await, Price::from_cents(5400));
    assert_eq!(store.item_count().await, 2);
}

// =============================================================================
// Subscriptions
// =============================================================================

#[tokio::test]
async fn test_subscribers_converge_after_rollback() {
    let market = market();
    let store = CartStore::new(market.clone());
    let rx = store.subscribe();

    store.add(ProductId::new(1)).await.expect("add");
    market.fail_next(1);
    let _ = store.add(ProductId::new(2)).await;

    let snapshot = rx.borrow().clone();
    assert_eq!(snapshot.item_count(), 1);
    assert_eq!(snapshot.subtotal(), Price::from_cents(2000));
    // add(1): insert + reconcile; add(2): insert + rollback
    assert_eq!(snapshot.revision, 4);
}
