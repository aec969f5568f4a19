//! Admin clients against the mock servers: order status lifecycle and
//! stock corrections.

use std::sync::Arc;

use rust_decimal::Decimal;

use kukoro_admin::rtdb::{RtdbAdminClient, RtdbAdminError};
use kukoro_admin::sheets::{SheetsAdminClient, SheetsAdminError};
use kukoro_core::{CartLineItem, CustomerInfo, Order, OrderStatus, ProductKey};

use kukoro_integration_tests::{RtdbState, SheetsState, rtdb_router, sheets_router, spawn};

async fn rtdb_client() -> (Arc<RtdbState>, RtdbAdminClient) {
    let state = Arc::new(RtdbState::default());
    let url = spawn(rtdb_router(Arc::clone(&state))).await;
    (state, RtdbAdminClient::new(url, None))
}

fn seeded_order(status: OrderStatus) -> serde_json::Value {
    let mut item = CartLineItem::new(
        ProductKey::new("comics", "1"),
        "Item 1".to_string(),
        Decimal::from(10),
    );
    item.quantity = 2;
    let mut order = Order::from_items(
        &[item],
        CustomerInfo {
            name: "Ana Test".to_string(),
            phone: "+54 11 5555-0000".to_string(),
            ..CustomerInfo::default()
        },
        false,
    );
    order.status = status;
    serde_json::to_value(&order).expect("serialize order")
}

#[tokio::test]
async fn test_status_transition_patches_stored_order() {
    let (state, client) = rtdb_client().await;
    state
        .orders
        .lock()
        .unwrap()
        .push(("-SEED0".to_string(), seeded_order(OrderStatus::Pending)));

    let updated = client
        .set_order_status("-SEED0", OrderStatus::Shipped)
        .await
        .expect("transition");
    assert_eq!(updated.status, OrderStatus::Shipped);

    // The stored record was patched, not replaced. Scope the lock guard so
    // it drops before the next request; the mock server shares this mutex on
    // the same runtime.
    {
        let stored = &state.orders.lock().unwrap()[0].1;
        assert_eq!(stored["status"], "shipped");
        assert_eq!(stored["total"], "20");
    }

    let fetched = client.get_order("-SEED0").await.expect("fetch");
    assert_eq!(fetched.status, OrderStatus::Shipped);
}

#[tokio::test]
async fn test_terminal_status_rejects_transition() {
    let (state, client) = rtdb_client().await;
    state
        .orders
        .lock()
        .unwrap()
        .push(("-SEED0".to_string(), seeded_order(OrderStatus::Delivered)));

    let err = client
        .set_order_status("-SEED0", OrderStatus::Pending)
        .await
        .expect_err("must reject");
    assert!(matches!(err, RtdbAdminError::InvalidTransition(_)));

    // Untouched.
    assert_eq!(state.orders.lock().unwrap()[0].1["status"], "delivered");
}

#[tokio::test]
async fn test_missing_order_is_not_found() {
    let (_state, client) = rtdb_client().await;
    let err = client.get_order("-NOPE").await.expect_err("must fail");
    assert!(matches!(err, RtdbAdminError::NotFound(_)));
}

#[tokio::test]
async fn test_list_orders_filters_by_nothing_when_empty() {
    let (_state, client) = rtdb_client().await;
    let orders = client.list_orders().await.expect("list");
    assert!(orders.is_empty());
}

#[tokio::test]
async fn test_stock_correction_writes_absolute_value() {
    let state = Arc::new(SheetsState::default());
    let url = spawn(sheets_router(Arc::clone(&state))).await;
    let client = SheetsAdminClient::new(url, None);
    state.seed("comics", "1", 2);

    client
        .set_stock(&ProductKey::new("comics", "1"), 40)
        .await
        .expect("set stock");
    assert_eq!(state.stock_of("comics", "1"), Some(40));
}

#[tokio::test]
async fn test_rejected_mutation_surfaces_reason() {
    let state = Arc::new(SheetsState::default());
    let url = spawn(sheets_router(Arc::clone(&state))).await;
    let client = SheetsAdminClient::new(url, None);

    // The mock has no `add` action; the envelope comes back without
    // `ok: true` and the client must refuse to call that success.
    let err = client
        .add("comics", serde_json::Map::new())
        .await
        .expect_err("must reject");
    assert!(matches!(err, SheetsAdminError::Rejected(_)));
}
