//! Product CRUD over the spreadsheet-backed API.
//!
//! The admin side of the sheets protocol: where the storefront only reads
//! and adjusts stock during checkout, this client manages the rows
//! themselves (`add`, `update`, `delete`) plus absolute stock corrections.
//! Mutations here demand an explicit `ok` in the response; admins want a
//! hard failure over a guessed success.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

use kukoro_core::ProductKey;

/// Errors that can occur when managing product rows.
#[derive(Debug, Error)]
pub enum SheetsAdminError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// API answered 2xx but reported a failure.
    #[error("Operation rejected: {0}")]
    Rejected(String),

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// One row of a category sheet as the admin sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRow {
    pub row: Value,
    #[serde(default)]
    pub data: serde_json::Map<String, Value>,
}

impl AdminRow {
    /// First column value whose lowercased header names the stock count
    /// (`stock` or `cantidad`).
    #[must_use]
    pub fn stock_cell(&self) -> Option<&Value> {
        self.data
            .iter()
            .find(|(header, _)| {
                let lowered = header.to_lowercase();
                lowered == "stock" || lowered == "cantidad"
            })
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    products: Vec<AdminRow>,
}

/// Envelope for admin mutations. Unlike the storefront's tolerant checkout
/// path, `ok: true` is required.
#[derive(Debug, Deserialize)]
struct AdminMutationResponse {
    #[serde(default)]
    ok: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    /// Row id assigned by an `add`.
    #[serde(default)]
    row: Option<Value>,
}

impl AdminMutationResponse {
    fn into_result(self) -> Result<Option<Value>, SheetsAdminError> {
        if self.ok == Some(true) {
            Ok(self.row)
        } else {
            let reason = self
                .error
                .or(self.message)
                .unwrap_or_else(|| "no ok flag in response".to_string());
            Err(SheetsAdminError::Rejected(reason))
        }
    }
}

/// Admin client for the spreadsheet-backed product API.
#[derive(Clone)]
pub struct SheetsAdminClient {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl SheetsAdminClient {
    /// Create a new admin client.
    #[must_use]
    pub fn new(base_url: Url, token: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    /// List every row of a category sheet.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or an
    /// unparseable body.
    pub async fn list(&self, category: &str) -> Result<Vec<AdminRow>, SheetsAdminError> {
        let url = self.url(&[("sheetKey", category)]);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SheetsAdminError::Api {
                status: status.as_u16(),
                message: text.chars().take(500).collect(),
            });
        }
        let body: ListResponse =
            serde_json::from_str(&text).map_err(|e| SheetsAdminError::Parse(e.to_string()))?;
        Ok(body.products)
    }

    /// Append a new product row. Returns the assigned row id when the
    /// server reports one.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the server rejects it.
    #[instrument(skip(self, data))]
    pub async fn add(
        &self,
        category: &str,
        data: serde_json::Map<String, Value>,
    ) -> Result<Option<String>, SheetsAdminError> {
        let row = self
            .mutate(json!({
                "action": "add",
                "sheetKey": category,
                "data": data,
            }))
            .await?;
        info!(category, "product row added");
        Ok(row.map(|value| scalar_to_string(&value)))
    }

    /// Overwrite a product row's column values.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the server rejects it.
    #[instrument(skip(self, data), fields(key = %key))]
    pub async fn update(
        &self,
        key: &ProductKey,
        data: serde_json::Map<String, Value>,
    ) -> Result<(), SheetsAdminError> {
        self.mutate(json!({
            "action": "update",
            "sheetKey": key.category,
            "row": key.row,
            "data": data,
        }))
        .await?;
        info!("product row updated");
        Ok(())
    }

    /// Delete a product row.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the server rejects it.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn delete(&self, key: &ProductKey) -> Result<(), SheetsAdminError> {
        self.mutate(json!({
            "action": "delete",
            "sheetKey": key.category,
            "row": key.row,
        }))
        .await?;
        info!("product row deleted");
        Ok(())
    }

    /// Set a product's stock to an absolute value (operator correction).
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the server rejects it.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn set_stock(&self, key: &ProductKey, value: u32) -> Result<(), SheetsAdminError> {
        self.mutate(json!({
            "action": "set",
            "sheetKey": key.category,
            "row": key.row,
            "value": value,
        }))
        .await?;
        info!(value, "stock corrected");
        Ok(())
    }

    async fn mutate(&self, body: Value) -> Result<Option<Value>, SheetsAdminError> {
        let response = self.client.post(self.url(&[])).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SheetsAdminError::Api {
                status: status.as_u16(),
                message: text.chars().take(500).collect(),
            });
        }
        let envelope: AdminMutationResponse =
            serde_json::from_str(&text).map_err(|e| SheetsAdminError::Parse(e.to_string()))?;
        envelope.into_result()
    }

    fn url(&self, pairs: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in pairs {
                query.append_pair(name, value);
            }
            if let Some(token) = &self.token {
                query.append_pair("token", token.expose_secret());
            }
        }
        url
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_requires_explicit_ok() {
        let envelope: AdminMutationResponse =
            serde_json::from_value(json!({"message": "done"})).expect("envelope");
        assert!(envelope.into_result().is_err());

        let envelope: AdminMutationResponse =
            serde_json::from_value(json!({"ok": true, "row": 7})).expect("envelope");
        let row = envelope.into_result().expect("ok").expect("row present");
        assert_eq!(scalar_to_string(&row), "7");
    }

    #[test]
    fn test_stock_cell_matches_aliases() {
        let row: AdminRow =
            serde_json::from_value(json!({"row": 1, "data": {"Cantidad": "4", "Nombre": "x"}}))
                .expect("row");
        assert_eq!(row.stock_cell(), Some(&json!("4")));

        let row: AdminRow =
            serde_json::from_value(json!({"row": 1, "data": {"Precio": "10"}})).expect("row");
        assert!(row.stock_cell().is_none());
    }

    #[test]
    fn test_rejection_prefers_error_text() {
        let envelope: AdminMutationResponse =
            serde_json::from_value(json!({"ok": false, "error": "sheet is locked"}))
                .expect("envelope");
        let err = envelope.into_result().expect_err("rejected");
        assert!(matches!(err, SheetsAdminError::Rejected(reason) if reason == "sheet is locked"));
    }
}
