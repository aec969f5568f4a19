//! Admin route handlers and router assembly.

pub mod cancellations;
pub mod orders;
pub mod products;
pub mod reviews;

use axum::Router;
use axum::routing::{delete, get, patch, post, put};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the admin router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/categories/{category}/products",
            get(products::list).post(products::add),
        )
        .route(
            "/categories/{category}/products/{row}",
            put(products::update).delete(products::remove),
        )
        .route(
            "/categories/{category}/products/{row}/stock",
            put(products::set_stock),
        )
        .route(
            "/categories/{category}/products/{row}/reviews",
            get(reviews::list),
        )
        .route(
            "/categories/{category}/products/{row}/reviews/{review_id}",
            delete(reviews::remove),
        )
        .route("/orders", get(orders::list))
        .route("/orders/{order_id}", get(orders::show))
        .route("/orders/{order_id}/status", patch(orders::set_status))
        .route("/cancellations", get(cancellations::list))
        .route(
            "/cancellations/{request_id}/resolve",
            post(cancellations::resolve),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe.
async fn health() -> &'static str {
    "ok"
}
