//! Kukoro Admin - Internal administration service.
//!
//! This binary serves the admin JSON API on port 3001. It is meant to be
//! reachable only from a private network; it carries no authentication UI.
//!
//! # Capabilities
//!
//! - Product row CRUD and stock corrections via the sheets API
//! - Order status transitions (mirrored into user copies)
//! - Review moderation and cancellation-request resolution

#![cfg_attr(not(test), forbid(unsafe_code))]

use kukoro_admin::config::AdminConfig;
use kukoro_admin::routes;
use kukoro_admin::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = AdminConfig::from_env().expect("Failed to load configuration");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kukoro_admin=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(config = ?config, "admin starting");

    let addr = config.bind_addr();
    let state = AppState::new(config);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    tracing::info!(%addr, "admin listening");

    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
