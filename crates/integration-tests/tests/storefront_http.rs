//! The storefront HTTP surface end to end: real router, real client,
//! mock sheets and database behind it.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::StatusCode;
use serde_json::{Value, json};
use url::Url;

use kukoro_storefront::config::StorefrontConfig;
use kukoro_storefront::routes::router;
use kukoro_storefront::state::AppState;

use kukoro_integration_tests::{RtdbState, SheetsState, rtdb_router, sheets_router, spawn};

static CART_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct Server {
    sheets: Arc<SheetsState>,
    rtdb: Arc<RtdbState>,
    base: Url,
    http: reqwest::Client,
}

impl Server {
    async fn start(test_name: &str) -> Self {
        let sheets = Arc::new(SheetsState::default());
        let rtdb = Arc::new(RtdbState::default());
        let sheets_url = spawn(sheets_router(Arc::clone(&sheets))).await;
        let rtdb_url = spawn(rtdb_router(Arc::clone(&rtdb))).await;

        let cart_path = std::env::temp_dir().join(format!(
            "kukoro-http-{test_name}-{}-{}.json",
            std::process::id(),
            CART_COUNTER.fetch_add(1, Ordering::SeqCst),
        ));
        let _ = std::fs::remove_file(&cart_path);

        let vars: HashMap<String, String> = HashMap::from([
            ("SHEETS_API_URL".to_string(), sheets_url.to_string()),
            ("RTDB_URL".to_string(), rtdb_url.to_string()),
            (
                "CART_STORE_PATH".to_string(),
                cart_path.to_string_lossy().into_owned(),
            ),
        ]);
        let config = StorefrontConfig::from_lookup(|name| vars.get(name).cloned())
            .expect("test config");
        let state = AppState::new(config);
        let base = spawn(router(state)).await;

        Self {
            sheets,
            rtdb,
            base,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> Url {
        self.base.join(path).expect("url join")
    }
}

#[tokio::test]
async fn test_health_carries_request_id() {
    let s = Server::start("health").await;
    let response = s.http.get(s.url("health")).send().await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.expect("body"), "ok");
}

#[tokio::test]
async fn test_list_products_reports_availability() {
    let s = Server::start("list").await;
    s.sheets.seed("comics", "1", 4);
    s.sheets.seed("comics", "2", 0);

    let body: Value = s
        .http
        .get(s.url("categories/comics/products"))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");

    let products = body.as_array().expect("array");
    assert_eq!(products.len(), 2);
    assert_eq!(products[0]["category"], "comics");
    assert_eq!(products[0]["row"], "1");
    assert_eq!(products[0]["name"], "Item 1");
    assert_eq!(products[0]["stock"], 4);
    assert_eq!(products[0]["available"], 4);
    assert_eq!(products[1]["available"], 0);
}

#[tokio::test]
async fn test_show_unknown_product_is_404() {
    let s = Server::start("show-404").await;
    s.sheets.seed("comics", "1", 4);
    let response = s
        .http
        .get(s.url("categories/comics/products/99"))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_to_cart_bounds_and_reservation() {
    let s = Server::start("cart-add").await;
    s.sheets.seed("comics", "1", 3);

    // Over-ask is rejected outright.
    let response = s
        .http
        .post(s.url("cart/items"))
        .json(&json!({"category": "comics", "row": "1", "quantity": 5}))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Zero is malformed.
    let response = s
        .http
        .post(s.url("cart/items"))
        .json(&json!({"category": "comics", "row": "1", "quantity": 0}))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Within bounds lands in the cart.
    let body: Value = s
        .http
        .post(s.url("cart/items"))
        .json(&json!({"category": "comics", "row": "1", "quantity": 2}))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["total"], "20");

    // The reservation shrinks displayed availability.
    let shown: Value = s
        .http
        .get(s.url("categories/comics/products/1"))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(shown["stock"], 3);
    assert_eq!(shown["available"], 1);

    // And the remaining unit is the most that can still be added.
    let response = s
        .http
        .post(s.url("cart/items"))
        .json(&json!({"category": "comics", "row": "1", "quantity": 2}))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_product_cannot_be_added() {
    let s = Server::start("cart-add-404").await;
    let response = s
        .http
        .post(s.url("cart/items"))
        .json(&json!({"category": "comics", "row": "1"}))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_quantity_zero_removes_line() {
    let s = Server::start("cart-patch").await;
    s.sheets.seed("comics", "1", 5);
    s.http
        .post(s.url("cart/items"))
        .json(&json!({"category": "comics", "row": "1", "quantity": 2}))
        .send()
        .await
        .expect("request");

    let body: Value = s
        .http
        .patch(s.url("cart/items/comics/1"))
        .json(&json!({"quantity": 0}))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body["items"].as_array().map(Vec::len), Some(0));

    // Patching a line that no longer exists is a 404.
    let response = s
        .http
        .patch(s.url("cart/items/comics/1"))
        .json(&json!({"quantity": 1}))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_over_http() {
    let s = Server::start("checkout").await;
    s.sheets.seed("comics", "1", 5);
    s.http
        .post(s.url("cart/items"))
        .json(&json!({"category": "comics", "row": "1", "quantity": 2}))
        .send()
        .await
        .expect("request");

    let body: Value = s
        .http
        .post(s.url("checkout"))
        .json(&json!({
            "customer": {"name": "Ana Test", "phone": "+54 11 5555-0000"}
        }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");

    assert_eq!(body["disposition"]["kind"], "completed");
    assert_eq!(body["successes"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["failures"].as_array().map(Vec::len), Some(0));
    assert_eq!(s.rtdb.orders.lock().unwrap().len(), 1);

    let cart: Value = s
        .http
        .get(s.url("cart"))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_checkout_empty_cart_is_400() {
    let s = Server::start("checkout-empty").await;
    let response = s
        .http
        .post(s.url("checkout"))
        .json(&json!({
            "customer": {"name": "Ana Test", "phone": "+54 11 5555-0000"}
        }))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_review_is_clamped_and_pushed() {
    let s = Server::start("review").await;
    s.sheets.seed("comics", "1", 5);

    let response = s
        .http
        .post(s.url("categories/comics/products/1/reviews"))
        .json(&json!({"author": "Ana", "rating": 9, "text": "great"}))
        .send()
        .await
        .expect("request");
    assert!(response.status().is_success());

    let reviews = s.rtdb.reviews.lock().unwrap();
    assert_eq!(reviews.len(), 1);
    let (path, body) = &reviews[0];
    assert_eq!(path, "/reviews/comics/1.json");
    assert_eq!(body["rating"], 5);
}

#[tokio::test]
async fn test_cancellation_request_is_pushed() {
    let s = Server::start("cancel").await;
    let response = s
        .http
        .post(s.url("orders/-Nabc/cancellation"))
        .json(&json!({"reason": "changed my mind", "refund_requested": true}))
        .send()
        .await
        .expect("request");
    assert!(response.status().is_success());

    let cancellations = s.rtdb.cancellations.lock().unwrap();
    assert_eq!(cancellations.len(), 1);
    let (_, body) = &cancellations[0];
    assert_eq!(body["order_id"], "-Nabc");
    assert_eq!(body["refund_requested"], true);
    assert_eq!(body["resolved"], false);
}
