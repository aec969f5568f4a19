//! Command implementations.

#![allow(clippy::print_stdout)] // a CLI's job is to print

use thiserror::Error;

use kukoro_admin::config::{AdminConfig, ConfigError};
use kukoro_admin::rtdb::{RtdbAdminClient, RtdbAdminError};
use kukoro_admin::sheets::{SheetsAdminClient, SheetsAdminError};
use kukoro_core::{OrderStatus, ProductKey};

/// Errors surfaced to the terminal.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("sheets error: {0}")]
    Sheets(#[from] SheetsAdminError),
    #[error("database error: {0}")]
    Rtdb(#[from] RtdbAdminError),
    #[error("{0}")]
    Other(String),
}

fn sheets_client() -> Result<SheetsAdminClient, CliError> {
    let config = AdminConfig::from_env()?;
    Ok(SheetsAdminClient::new(
        config.sheets_api_url,
        config.sheets_api_token,
    ))
}

fn rtdb_client() -> Result<RtdbAdminClient, CliError> {
    let config = AdminConfig::from_env()?;
    Ok(RtdbAdminClient::new(config.rtdb_url, config.rtdb_auth_token))
}

/// Print a product's current stock.
pub async fn stock_get(category: &str, row: &str) -> Result<(), CliError> {
    let rows = sheets_client()?.list(category).await?;
    let found = rows
        .iter()
        .find(|r| scalar(&r.row) == row)
        .ok_or_else(|| CliError::Other(format!("no row {row} in {category}")))?;
    let stock = found
        .stock_cell()
        .map_or_else(|| "?".to_string(), scalar);
    println!("{}: stock {stock}", ProductKey::new(category, row));
    Ok(())
}

/// Set a product's stock to an absolute value.
pub async fn stock_set(category: &str, row: &str, value: u32) -> Result<(), CliError> {
    let key = ProductKey::new(category, row);
    sheets_client()?.set_stock(&key, value).await?;
    println!("{key}: stock set to {value}");
    Ok(())
}

/// List orders, optionally filtered by status.
pub async fn orders_list(status: Option<&str>) -> Result<(), CliError> {
    let wanted: Option<OrderStatus> = status
        .map(|s| {
            serde_json::from_value(serde_json::Value::String(s.to_string()))
                .map_err(|_| CliError::Other(format!("unknown status: {s}")))
        })
        .transpose()?;

    let orders = rtdb_client()?.list_orders().await?;
    let mut shown = 0usize;
    for (id, order) in &orders {
        if wanted.is_some_and(|w| order.status != w) {
            continue;
        }
        println!(
            "{id}  {:?}  {}  {} item(s)  total {}",
            order.status,
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.items.len(),
            order.total,
        );
        shown += 1;
    }
    println!("{shown} order(s)");
    Ok(())
}

fn scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
