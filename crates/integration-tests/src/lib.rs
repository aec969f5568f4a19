//! Test support: in-process mock servers and a wired-up storefront.
//!
//! The sheets product API and the realtime database are replaced by small
//! axum servers on ephemeral ports. Their behavior is steerable per test
//! (per-category bulk-decrement modes, unit-call budgets, forced read/set
//! failures) and every mutation they receive is recorded for assertions.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)] // test support code

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use url::Url;

use kukoro_core::{CartLineItem, CustomerInfo, ProductKey};
use kukoro_storefront::cart::CartStore;
use kukoro_storefront::catalog::Catalog;
use kukoro_storefront::checkout::CheckoutService;
use kukoro_storefront::rtdb::RtdbClient;
use kukoro_storefront::sheets::SheetsClient;
use kukoro_storefront::stock::StockService;

// ============================================================================
// Mock sheets API
// ============================================================================

/// How the mock answers `decrement` actions for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkMode {
    /// Decrement and answer `{"ok": true, "newStock": n}`.
    #[default]
    Honor,
    /// Decrement but answer a bare `{"ok": true}` (generic ack).
    AckWithoutStock,
    /// Answer `{"ok": false, "message": "decrement is not supported"}`.
    Unsupported,
    /// Answer 500 for every decrement, bulk and unit alike.
    Reject,
    /// Answer 500 for bulk (`qty > 1`) but honor unit calls, subject to
    /// the unit budget.
    RejectBulk,
}

/// Shared, steerable state behind the mock sheets server.
#[derive(Default)]
pub struct SheetsState {
    /// (category, row) -> stock.
    pub stock: Mutex<BTreeMap<(String, String), u32>>,
    /// Per-category decrement behavior; absent means [`BulkMode::Honor`].
    pub bulk_modes: Mutex<HashMap<String, BulkMode>>,
    /// In [`BulkMode::RejectBulk`], how many unit calls may still succeed.
    /// `None` means unlimited.
    pub unit_budget: Mutex<Option<u32>>,
    /// Force 500 on every read.
    pub reads_fail: AtomicBool,
    /// Force 500 on every `set`.
    pub set_fails: AtomicBool,
    /// Every mutation body received, in order.
    pub mutations: Mutex<Vec<Value>>,
}

impl SheetsState {
    pub fn seed(&self, category: &str, row: &str, stock: u32) {
        self.stock
            .lock()
            .unwrap()
            .insert((category.to_string(), row.to_string()), stock);
    }

    pub fn set_mode(&self, category: &str, mode: BulkMode) {
        self.bulk_modes
            .lock()
            .unwrap()
            .insert(category.to_string(), mode);
    }

    pub fn stock_of(&self, category: &str, row: &str) -> Option<u32> {
        self.stock
            .lock()
            .unwrap()
            .get(&(category.to_string(), row.to_string()))
            .copied()
    }

    /// Recorded `set` actions as (category, row, value).
    pub fn set_calls(&self) -> Vec<(String, String, u32)> {
        self.mutations
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m["action"] == "set")
            .map(|m| {
                (
                    m["sheetKey"].as_str().unwrap_or_default().to_string(),
                    scalar(&m["row"]),
                    u32::try_from(m["value"].as_u64().unwrap_or(0)).unwrap_or(0),
                )
            })
            .collect()
    }
}

/// Build the mock sheets router.
pub fn sheets_router(state: Arc<SheetsState>) -> Router {
    Router::new()
        .route("/", get(sheets_get).post(sheets_post))
        .with_state(state)
}

async fn sheets_get(
    State(state): State<Arc<SheetsState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if state.reads_fail.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "reads disabled").into_response();
    }
    let stock = state.stock.lock().unwrap();
    if let Some(category) = params.get("sheetKey") {
        let products: Vec<Value> = stock
            .iter()
            .filter(|((cat, _), _)| cat == category)
            .map(|((_, row), count)| product_row(row, *count))
            .collect();
        return Json(json!({ "products": products })).into_response();
    }
    if params.contains_key("all") {
        let mut sheets: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        for ((cat, row), count) in stock.iter() {
            sheets.entry(cat.clone()).or_default().push(product_row(row, *count));
        }
        return Json(json!({ "sheets": sheets })).into_response();
    }
    (StatusCode::BAD_REQUEST, "missing sheetKey").into_response()
}

/// Row ids arrive as strings or numbers; normalize for map keys.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn product_row(row: &str, stock: u32) -> Value {
    json!({
        "row": row,
        "data": {
            "Nombre": format!("Item {row}"),
            "Precio": "10",
            "Stock": stock,
        }
    })
}

async fn sheets_post(State(state): State<Arc<SheetsState>>, Json(body): Json<Value>) -> Response {
    state.mutations.lock().unwrap().push(body.clone());
    let category = body["sheetKey"].as_str().unwrap_or_default().to_string();
    let row = scalar(&body["row"]);

    match body["action"].as_str() {
        Some("decrement") => {
            let qty = match &body["qty"] {
                Value::Number(n) => u32::try_from(n.as_u64().unwrap_or(1)).unwrap_or(1),
                Value::String(s) => s.parse().unwrap_or(1),
                _ => 1,
            };
            let mode = state
                .bulk_modes
                .lock()
                .unwrap()
                .get(&category)
                .copied()
                .unwrap_or_default();
            match mode {
                BulkMode::Honor => apply_decrement(&state, &category, &row, qty, true),
                BulkMode::AckWithoutStock => apply_decrement(&state, &category, &row, qty, false),
                BulkMode::Unsupported => {
                    Json(json!({"ok": false, "message": "decrement is not supported"}))
                        .into_response()
                }
                BulkMode::Reject => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "decrement exploded").into_response()
                }
                BulkMode::RejectBulk => {
                    if qty > 1 {
                        return (StatusCode::INTERNAL_SERVER_ERROR, "bulk exploded")
                            .into_response();
                    }
                    let mut budget = state.unit_budget.lock().unwrap();
                    match budget.as_mut() {
                        Some(0) => {
                            (StatusCode::INTERNAL_SERVER_ERROR, "unit budget spent")
                                .into_response()
                        }
                        Some(n) => {
                            *n -= 1;
                            drop(budget);
                            apply_decrement(&state, &category, &row, 1, true)
                        }
                        None => {
                            drop(budget);
                            apply_decrement(&state, &category, &row, 1, true)
                        }
                    }
                }
            }
        }
        Some("set") => {
            if state.set_fails.load(Ordering::SeqCst) {
                return (StatusCode::INTERNAL_SERVER_ERROR, "set exploded").into_response();
            }
            let value = u32::try_from(body["value"].as_u64().unwrap_or(0)).unwrap_or(0);
            state
                .stock
                .lock()
                .unwrap()
                .insert((category, row), value);
            Json(json!({"ok": true})).into_response()
        }
        _ => Json(json!({"ok": false, "message": "unknown action"})).into_response(),
    }
}

fn apply_decrement(
    state: &SheetsState,
    category: &str,
    row: &str,
    qty: u32,
    report_stock: bool,
) -> Response {
    let mut stock = state.stock.lock().unwrap();
    let Some(count) = stock.get_mut(&(category.to_string(), row.to_string())) else {
        return Json(json!({"error": "row not found"})).into_response();
    };
    *count = count.saturating_sub(qty);
    if report_stock {
        Json(json!({"ok": true, "newStock": *count})).into_response()
    } else {
        Json(json!({"ok": true})).into_response()
    }
}

// ============================================================================
// Mock realtime database
// ============================================================================

/// Shared, steerable state behind the mock realtime database.
#[derive(Default)]
pub struct RtdbState {
    /// Pushed orders as (push key, body), in order.
    pub orders: Mutex<Vec<(String, Value)>>,
    /// `PUT` writes under `/users/...` as (path, body).
    pub user_puts: Mutex<Vec<(String, Value)>>,
    /// Pushed reviews as (path, body).
    pub reviews: Mutex<Vec<(String, Value)>>,
    /// Pushed cancellation requests as (push key, body).
    pub cancellations: Mutex<Vec<(String, Value)>>,
    /// Force 500 on every write.
    pub fail_writes: AtomicBool,
    counter: AtomicUsize,
}

impl RtdbState {
    fn next_key(&self) -> String {
        format!("-MOCK{}", self.counter.fetch_add(1, Ordering::SeqCst))
    }
}

/// Build the mock realtime database router.
pub fn rtdb_router(state: Arc<RtdbState>) -> Router {
    Router::new().fallback(rtdb_fallback).with_state(state)
}

async fn rtdb_fallback(State(state): State<Arc<RtdbState>>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    if method != Method::GET && state.fail_writes.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "writes disabled").into_response();
    }

    let push = |collection: &Mutex<Vec<(String, Value)>>, entry_key: String| {
        collection.lock().unwrap().push((entry_key, body.clone()));
    };

    if method == Method::POST && path == "/orders.json" {
        let key = state.next_key();
        push(&state.orders, key.clone());
        return Json(json!({ "name": key })).into_response();
    }
    if method == Method::POST && path == "/cancellations.json" {
        let key = state.next_key();
        push(&state.cancellations, key.clone());
        return Json(json!({ "name": key })).into_response();
    }
    if method == Method::POST && path.starts_with("/reviews/") {
        let key = state.next_key();
        push(&state.reviews, path.clone());
        return Json(json!({ "name": key })).into_response();
    }
    if method == Method::PUT && path.starts_with("/users/") {
        push(&state.user_puts, path.clone());
        return StatusCode::OK.into_response();
    }
    if method == Method::GET && path == "/orders.json" {
        let orders = state.orders.lock().unwrap();
        let map: serde_json::Map<String, Value> = orders
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        return Json(Value::Object(map)).into_response();
    }
    if let Some(id) = path
        .strip_prefix("/orders/")
        .and_then(|rest| rest.strip_suffix(".json"))
    {
        if method == Method::GET {
            let orders = state.orders.lock().unwrap();
            return orders.iter().find(|(key, _)| key.as_str() == id).map_or_else(
                || Json(Value::Null).into_response(),
                |(_, value)| Json(value.clone()).into_response(),
            );
        }
        if method == Method::PATCH {
            let mut orders = state.orders.lock().unwrap();
            if let Some((_, stored)) = orders.iter_mut().find(|(key, _)| key.as_str() == id)
                && let (Some(stored), Some(patch)) = (stored.as_object_mut(), body.as_object())
            {
                for (field, value) in patch {
                    stored.insert(field.clone(), value.clone());
                }
            }
            return Json(body).into_response();
        }
    }
    if method == Method::PATCH {
        return Json(body).into_response();
    }
    (StatusCode::NOT_FOUND, "no such path").into_response()
}

// ============================================================================
// Harness
// ============================================================================

/// Spawn a router on an ephemeral port and return its base URL.
pub async fn spawn(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server");
    });
    Url::parse(&format!("http://{addr}/")).expect("mock base url")
}

static CART_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn temp_cart_path(test_name: &str) -> PathBuf {
    let n = CART_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "kukoro-it-{test_name}-{}-{n}.json",
        std::process::id()
    ))
}

/// A storefront wired against fresh mock servers, with an empty cart.
pub struct Harness {
    pub sheets: Arc<SheetsState>,
    pub rtdb: Arc<RtdbState>,
    pub sheets_url: Url,
    pub rtdb_url: Url,
    pub cart: Arc<CartStore>,
    pub catalog: Catalog,
    pub stock: Arc<StockService>,
    pub checkout: CheckoutService,
    pub cart_path: PathBuf,
}

impl Harness {
    pub async fn new(test_name: &str) -> Self {
        let sheets = Arc::new(SheetsState::default());
        let rtdb = Arc::new(RtdbState::default());
        let sheets_url = spawn(sheets_router(Arc::clone(&sheets))).await;
        let rtdb_url = spawn(rtdb_router(Arc::clone(&rtdb))).await;

        let client = SheetsClient::new(sheets_url.clone(), None);
        let catalog = Catalog::new(client.clone(), 300);
        let cart_path = temp_cart_path(test_name);
        let _ = std::fs::remove_file(&cart_path);
        let cart = Arc::new(CartStore::open(cart_path.clone()));
        let stock = Arc::new(StockService::new(
            client,
            catalog.clone(),
            Arc::clone(&cart),
        ));
        let rtdb_client = RtdbClient::new(rtdb_url.clone(), None);
        let checkout = CheckoutService::new(Arc::clone(&stock), Arc::clone(&cart), rtdb_client);

        Self {
            sheets,
            rtdb,
            sheets_url,
            rtdb_url,
            cart,
            catalog,
            stock,
            checkout,
            cart_path,
        }
    }

    /// Put a product in the shopper's cart, snapshotting it from the
    /// catalog the way the cart route does.
    pub async fn add_to_cart(&self, category: &str, row: &str, quantity: u32) {
        let key = ProductKey::new(category, row);
        let product = self
            .catalog
            .product(&key)
            .await
            .expect("catalog read")
            .expect("seeded product");
        let mut item = CartLineItem::new(
            key,
            product.name,
            product.price.expect("seeded products have prices"),
        );
        item.quantity = quantity;
        self.cart.add(item);
    }
}

/// A throwaway shopper for order writes.
#[must_use]
pub fn customer() -> CustomerInfo {
    CustomerInfo {
        name: "Ana Test".to_string(),
        phone: "+54 11 5555-0000".to_string(),
        email: Some("ana@example.com".to_string()),
        address: None,
        user_id: None,
    }
}
