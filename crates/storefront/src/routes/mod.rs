//! HTTP route handlers and router assembly.

pub mod cart;
pub mod checkout;
pub mod products;
pub mod reviews;

use axum::Router;
use axum::routing::{get, patch, post};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the storefront router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/categories/{category}/products", get(products::list))
        .route("/categories/{category}/products/{row}", get(products::show))
        .route(
            "/categories/{category}/products/{row}/reviews",
            post(reviews::create),
        )
        .route("/cart", get(cart::show).delete(cart::clear))
        .route("/cart/items", post(cart::add))
        .route(
            "/cart/items/{category}/{row}",
            patch(cart::set_quantity).delete(cart::remove),
        )
        .route("/checkout", post(checkout::create))
        .route("/orders/{order_id}/cancellation", post(checkout::cancel))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe.
async fn health() -> &'static str {
    "ok"
}
