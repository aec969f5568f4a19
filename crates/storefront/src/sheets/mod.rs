//! Spreadsheet-backed product API client.
//!
//! # Architecture
//!
//! - Plain JSON over REST via `reqwest`; reads are `GET` with query
//!   parameters, mutations are a single `POST` dispatching on `action`
//! - The sheet is source of truth for stock - NO local sync, the catalog
//!   cache is a read-through convenience only
//! - Responses are alias-tolerant (see [`types`]); the only free-text
//!   coupling is isolated in [`classify_unsupported`]

pub mod types;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use thiserror::Error;
use tracing::debug;
use url::Url;

use kukoro_core::ProductKey;

pub use types::{AllSheetsResponse, MutationResponse, ProductsResponse, SheetRow};

/// Query parameter carrying the optional API token.
const TOKEN_PARAM: &str = "token";

/// Substrings that mark a mutation response as "operation not supported".
///
/// This is a fragile coupling to free-text server messages; it lives here,
/// and only here, so a structured error code can replace it in one place.
/// Every marker is operation-scoped on purpose: availability language like
/// "producto no disponible" means out of stock, not a missing action, and
/// must not trigger the read-then-set tier.
const UNSUPPORTED_MARKERS: &[&str] = &[
    "not supported",
    "unsupported",
    "unknown action",
    "no soportad",
    "acción desconocida",
];

/// Decide whether a server message means the requested operation is not
/// supported by this deployment.
#[must_use]
pub fn classify_unsupported(message: &str) -> bool {
    let lowered = message.to_lowercase();
    UNSUPPORTED_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// Errors that can occur when talking to the product API.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Client for the spreadsheet-backed product API.
#[derive(Clone)]
pub struct SheetsClient {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl SheetsClient {
    /// Create a new product API client.
    #[must_use]
    pub fn new(base_url: Url, token: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    /// Fetch every row of one category sheet.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or an
    /// unparseable body.
    pub async fn fetch_products(&self, category: &str) -> Result<Vec<SheetRow>, SheetsError> {
        let url = self.url(&[("sheetKey", category)]);
        debug!(category, "fetching category sheet");
        let body: ProductsResponse = self.get_json(url).await?;
        Ok(body.products)
    }

    /// Fetch every category's rows in one request.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or an
    /// unparseable body.
    pub async fn fetch_all(
        &self,
    ) -> Result<std::collections::HashMap<String, Vec<SheetRow>>, SheetsError> {
        let url = self.url(&[("all", "1")]);
        let body: AllSheetsResponse = self.get_json(url).await?;
        Ok(body.sheets)
    }

    /// Ask the server to atomically decrement `qty` units for a product.
    ///
    /// The returned envelope may signal success, failure, or (via its
    /// message text) that decrements are not supported; callers run the
    /// reconciliation ladder over it.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or an
    /// unparseable body.
    pub async fn decrement(
        &self,
        key: &ProductKey,
        qty: u32,
    ) -> Result<MutationResponse, SheetsError> {
        self.mutate(json!({
            "action": "decrement",
            "sheetKey": key.category,
            "row": key.row,
            "qty": qty,
        }))
        .await
    }

    /// Set a product's stock to an absolute value.
    ///
    /// Best-effort acceptance: any 2xx counts as success even when the body
    /// carries no structured result, because some deployments answer `set`
    /// with an empty ack.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn set_stock(&self, key: &ProductKey, value: u32) -> Result<(), SheetsError> {
        let body = json!({
            "action": "set",
            "sheetKey": key.category,
            "row": key.row,
            "value": value,
        });
        let response = self
            .client
            .post(self.url(&[]))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    /// Issue a mutation POST and parse the response envelope.
    async fn mutate(&self, body: serde_json::Value) -> Result<MutationResponse, SheetsError> {
        let response = self
            .client
            .post(self.url(&[]))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message: text.chars().take(500).collect(),
            });
        }

        serde_json::from_str(&text).map_err(|e| SheetsError::Parse(e.to_string()))
    }

    /// Build a request URL with the given query pairs plus the token.
    fn url(&self, pairs: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in pairs {
                query.append_pair(name, value);
            }
            if let Some(token) = &self.token {
                query.append_pair(TOKEN_PARAM, token.expose_secret());
            }
        }
        url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, SheetsError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| SheetsError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_unsupported_matches_known_shapes() {
        assert!(classify_unsupported("decrement is not supported"));
        assert!(classify_unsupported("Unsupported operation"));
        assert!(classify_unsupported("Unknown action: decrement"));
        assert!(classify_unsupported("operación no soportada"));
        assert!(classify_unsupported("Acción no soportada"));
        assert!(classify_unsupported("Acción desconocida: decrement"));
    }

    #[test]
    fn test_classify_unsupported_ignores_other_errors() {
        assert!(!classify_unsupported("row not found"));
        assert!(!classify_unsupported("insufficient stock"));
        assert!(!classify_unsupported(""));
    }

    #[test]
    fn test_classify_unsupported_ignores_availability_language() {
        // Out-of-stock wording must fail the item, not rewrite its stock.
        assert!(!classify_unsupported("producto no disponible"));
        assert!(!classify_unsupported("sin stock disponible"));
    }

    #[test]
    fn test_url_appends_token_after_pairs() {
        let client = SheetsClient::new(
            Url::parse("https://sheets.example.com/api").expect("url"),
            Some(SecretString::from("tok")),
        );
        let url = client.url(&[("sheetKey", "comics")]);
        assert_eq!(
            url.as_str(),
            "https://sheets.example.com/api?sheetKey=comics&token=tok"
        );
    }
}
