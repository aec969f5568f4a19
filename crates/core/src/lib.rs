//! Kukoro Core - Shared types library.
//!
//! This crate provides common types used across all Kukoro components:
//! - `storefront` - Shopper-facing storefront service
//! - `admin` - Internal administration service
//! - `cli` - Command-line tools for stock and order management
//!
//! # Architecture
//!
//! The core crate contains only types and parsing helpers - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows
//! it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product keys, prices, cart line items, orders, and
//!   checkout outcomes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
