//! Stock reconciliation against a steerable mock sheets server, one test
//! per rung of the fallback ladder.

use std::sync::{Arc, Mutex};

use kukoro_core::{DecrementStatus, ProductKey};
use kukoro_storefront::stock::StockObserver;

use kukoro_integration_tests::{BulkMode, Harness};

#[tokio::test]
async fn test_bulk_decrement_applies_server_stock() {
    let h = Harness::new("bulk-ok").await;
    h.sheets.seed("comics", "1", 10);

    let outcome = h
        .stock
        .decrement_stock(&ProductKey::new("comics", "1"), 3)
        .await;

    assert_eq!(outcome.status, DecrementStatus::Applied);
    assert_eq!(outcome.new_stock, Some(7));
    assert_eq!(h.sheets.stock_of("comics", "1"), Some(7));
}

#[tokio::test]
async fn test_generic_ack_triggers_read_back() {
    let h = Harness::new("ack-no-stock").await;
    h.sheets.seed("comics", "1", 10);
    h.sheets.set_mode("comics", BulkMode::AckWithoutStock);

    let outcome = h
        .stock
        .decrement_stock(&ProductKey::new("comics", "1"), 4)
        .await;

    // The ack carried no number; the accepted value must come from a
    // fresh read of the sheet, not from guessing.
    assert_eq!(outcome.status, DecrementStatus::Applied);
    assert_eq!(outcome.new_stock, Some(6));
}

#[tokio::test]
async fn test_unsupported_deployment_uses_read_then_set() {
    let h = Harness::new("unsupported").await;
    h.sheets.seed("comics", "1", 5);
    h.sheets.set_mode("comics", BulkMode::Unsupported);

    let outcome = h
        .stock
        .decrement_stock(&ProductKey::new("comics", "1"), 2)
        .await;

    assert_eq!(outcome.status, DecrementStatus::Applied);
    assert_eq!(outcome.new_stock, Some(3));
    assert_eq!(h.sheets.stock_of("comics", "1"), Some(3));
    assert_eq!(
        h.sheets.set_calls(),
        vec![("comics".to_string(), "1".to_string(), 3)]
    );
}

#[tokio::test]
async fn test_read_then_set_clamps_at_zero() {
    let h = Harness::new("clamp-zero").await;
    h.sheets.seed("comics", "1", 1);
    h.sheets.set_mode("comics", BulkMode::Unsupported);

    let outcome = h
        .stock
        .decrement_stock(&ProductKey::new("comics", "1"), 3)
        .await;

    // Requesting more than the sheet holds writes an absolute zero,
    // never a negative value.
    assert_eq!(outcome.status, DecrementStatus::Applied);
    assert_eq!(outcome.new_stock, Some(0));
    assert_eq!(
        h.sheets.set_calls(),
        vec![("comics".to_string(), "1".to_string(), 0)]
    );
}

#[tokio::test]
async fn test_per_unit_fallback_full_success() {
    let h = Harness::new("per-unit-full").await;
    h.sheets.seed("comics", "1", 10);
    h.sheets.set_mode("comics", BulkMode::RejectBulk);

    let outcome = h
        .stock
        .decrement_stock(&ProductKey::new("comics", "1"), 3)
        .await;

    assert_eq!(outcome.status, DecrementStatus::Applied);
    // Accepted value is the authoritative re-read, which must agree with
    // the server after three unit decrements.
    assert_eq!(outcome.new_stock, Some(7));
    assert_eq!(h.sheets.stock_of("comics", "1"), Some(7));
}

#[tokio::test]
async fn test_per_unit_fallback_partial_reports_applied_count() {
    let h = Harness::new("per-unit-partial").await;
    h.sheets.seed("comics", "1", 10);
    h.sheets.set_mode("comics", BulkMode::RejectBulk);
    *h.sheets.unit_budget.lock().unwrap() = Some(2);

    let outcome = h
        .stock
        .decrement_stock(&ProductKey::new("comics", "1"), 5)
        .await;

    assert_eq!(outcome.status, DecrementStatus::Partial { applied: 2 });
    assert!(!outcome.is_success());
    assert_eq!(outcome.new_stock, Some(8));
    assert!(outcome.reason.is_some());
}

#[tokio::test]
async fn test_per_unit_all_failed_falls_back_to_read_then_set() {
    let h = Harness::new("per-unit-none").await;
    h.sheets.seed("comics", "1", 10);
    h.sheets.set_mode("comics", BulkMode::Reject);

    let outcome = h
        .stock
        .decrement_stock(&ProductKey::new("comics", "1"), 2)
        .await;

    assert_eq!(outcome.status, DecrementStatus::Applied);
    assert_eq!(outcome.new_stock, Some(8));
    assert_eq!(
        h.sheets.set_calls(),
        vec![("comics".to_string(), "1".to_string(), 8)]
    );
}

#[tokio::test]
async fn test_total_exhaustion_reports_failure() {
    let h = Harness::new("exhausted").await;
    h.sheets.seed("comics", "1", 10);
    h.sheets.set_mode("comics", BulkMode::Reject);
    h.sheets
        .reads_fail
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let outcome = h
        .stock
        .decrement_stock(&ProductKey::new("comics", "1"), 2)
        .await;

    assert_eq!(outcome.status, DecrementStatus::Failed);
    assert!(outcome.reason.is_some());
    assert_eq!(outcome.new_stock, None);
}

#[tokio::test]
async fn test_failing_set_reports_failure() {
    let h = Harness::new("set-fails").await;
    h.sheets.seed("comics", "1", 5);
    h.sheets.set_mode("comics", BulkMode::Unsupported);
    h.sheets
        .set_fails
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let outcome = h
        .stock
        .decrement_stock(&ProductKey::new("comics", "1"), 2)
        .await;

    assert_eq!(outcome.status, DecrementStatus::Failed);
    assert_eq!(h.sheets.stock_of("comics", "1"), Some(5));
}

#[tokio::test]
async fn test_zero_quantity_is_a_no_op() {
    let h = Harness::new("zero-qty").await;
    h.sheets.seed("comics", "1", 5);

    let outcome = h
        .stock
        .decrement_stock(&ProductKey::new("comics", "1"), 0)
        .await;

    assert_eq!(outcome.status, DecrementStatus::Applied);
    assert!(h.sheets.mutations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_available_subtracts_cart_reservation() {
    let h = Harness::new("available").await;
    h.sheets.seed("comics", "1", 5);
    h.add_to_cart("comics", "1", 2).await;

    let key = ProductKey::new("comics", "1");
    assert_eq!(h.stock.available(&key).await, Some(3));

    // Over-reservation floors at zero instead of going negative.
    h.add_to_cart("comics", "1", 10).await;
    assert_eq!(h.stock.available(&key).await, Some(0));
}

#[tokio::test]
async fn test_warm_up_caches_every_category() {
    let h = Harness::new("warm-up").await;
    h.sheets.seed("comics", "1", 4);
    h.sheets.seed("games", "9", 2);

    let categories = h.catalog.warm().await.expect("warm");
    assert_eq!(categories, 2);

    // Warmed entries serve without touching the server again.
    h.sheets
        .reads_fail
        .store(true, std::sync::atomic::Ordering::SeqCst);
    assert_eq!(
        h.stock.available(&ProductKey::new("comics", "1")).await,
        Some(4)
    );
    assert_eq!(
        h.stock.available(&ProductKey::new("games", "9")).await,
        Some(2)
    );
}

#[tokio::test]
async fn test_authoritative_read_is_stable_without_mutation() {
    let h = Harness::new("read-stable").await;
    h.sheets.seed("comics", "1", 9);
    let key = ProductKey::new("comics", "1");

    let first = h.stock.fetch_authoritative_stock(&key).await;
    let second = h.stock.fetch_authoritative_stock(&key).await;
    assert_eq!(first, Some(9));
    assert_eq!(second, first);
}

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<(ProductKey, u32)>>,
}

impl StockObserver for Recorder {
    fn stock_changed(&self, key: &ProductKey, new_stock: u32) {
        self.seen.lock().unwrap().push((key.clone(), new_stock));
    }
}

#[tokio::test]
async fn test_observers_see_accepted_stock() {
    let h = Harness::new("observer").await;
    h.sheets.seed("comics", "1", 10);
    let recorder = Arc::new(Recorder::default());
    h.stock
        .register_observer(Arc::clone(&recorder) as Arc<dyn StockObserver>);

    h.stock
        .decrement_stock(&ProductKey::new("comics", "1"), 3)
        .await;

    let seen = recorder.seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[(ProductKey::new("comics", "1"), 7)]);
}

#[tokio::test]
async fn test_catalog_follows_accepted_stock() {
    let h = Harness::new("catalog-follow").await;
    h.sheets.seed("comics", "1", 10);
    let key = ProductKey::new("comics", "1");

    // Warm the cache, then decrement behind it.
    assert_eq!(h.stock.available(&key).await, Some(10));
    h.stock.decrement_stock(&key, 4).await;

    // The cached entry was rewritten in place; no TTL expiry needed.
    assert_eq!(h.stock.available(&key).await, Some(6));
}
