//! Application state shared across admin handlers.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::rtdb::RtdbAdminClient;
use crate::sheets::SheetsAdminClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    sheets: SheetsAdminClient,
    rtdb: RtdbAdminClient,
}

impl AppState {
    /// Wire up clients from configuration.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let sheets = SheetsAdminClient::new(
            config.sheets_api_url.clone(),
            config.sheets_api_token.clone(),
        );
        let rtdb = RtdbAdminClient::new(config.rtdb_url.clone(), config.rtdb_auth_token.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                sheets,
                rtdb,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the sheets admin client.
    #[must_use]
    pub fn sheets(&self) -> &SheetsAdminClient {
        &self.inner.sheets
    }

    /// Get a reference to the database admin client.
    #[must_use]
    pub fn rtdb(&self) -> &RtdbAdminClient {
        &self.inner.rtdb
    }
}
