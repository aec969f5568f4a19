//! Kukoro CLI - Stock corrections and order inspection.
//!
//! # Usage
//!
//! ```bash
//! # Show a product's current stock
//! kukoro-cli stock get comics 12
//!
//! # Correct a product's stock to an absolute value
//! kukoro-cli stock set comics 12 5
//!
//! # List orders, optionally filtered by status
//! kukoro-cli orders list
//! kukoro-cli orders list --status pending
//! ```
//!
//! # Commands
//!
//! - `stock get` / `stock set` - Inspect and correct stock
//! - `orders list` - List orders from the realtime database

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kukoro-cli")]
#[command(author, version, about = "Kukoro CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and correct product stock
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
    /// Inspect orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum StockAction {
    /// Show a product's current stock
    Get {
        /// Category sheet key
        category: String,
        /// Row id within the category
        row: String,
    },
    /// Set a product's stock to an absolute value
    Set {
        /// Category sheet key
        category: String,
        /// Row id within the category
        row: String,
        /// New stock value
        value: u32,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders
    List {
        /// Only show orders with this status (e.g. pending, shipped)
        #[arg(short, long)]
        status: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), commands::CliError> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kukoro_cli=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Stock { action } => match action {
            StockAction::Get { category, row } => commands::stock_get(&category, &row).await,
            StockAction::Set {
                category,
                row,
                value,
            } => commands::stock_set(&category, &row, value).await,
        },
        Commands::Orders { action } => match action {
            OrdersAction::List { status } => commands::orders_list(status.as_deref()).await,
        },
    }
}
