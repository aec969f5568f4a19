//! Kukoro Storefront - Shopper-facing service.
//!
//! This binary serves the storefront JSON API on port 3000.
//!
//! # Architecture
//!
//! - Axum JSON routes consumed by the UI layer
//! - Spreadsheet-backed product API as the source of truth for stock
//! - Realtime document database for orders, reviews, and cancellations
//! - File-backed local cart that survives restarts
//!
//! # Security
//!
//! This binary only has access to:
//! - The product API's read and stock-mutation actions
//! - The database paths for orders, reviews, and cancellations
//!
//! It does NOT have access to:
//! - The product API's row CRUD actions (that's the admin binary)
//! - Administrative database paths

#![cfg_attr(not(test), forbid(unsafe_code))]

use kukoro_storefront::config::StorefrontConfig;
use kukoro_storefront::routes;
use kukoro_storefront::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env if present, then configuration from the environment
    dotenvy::dotenv().ok();
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kukoro_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(config = ?config, "storefront starting");

    let addr = config.bind_addr();
    let state = AppState::new(config);

    // One all-sheets read up front so the first render of every category
    // serves from cache; failures fall back to lazy per-category loads.
    match state.catalog().warm().await {
        Ok(categories) => tracing::info!(categories, "catalog warmed"),
        Err(err) => tracing::warn!(error = %err, "catalog warm-up failed, loading lazily"),
    }

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    tracing::info!(%addr, "storefront listening");

    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
