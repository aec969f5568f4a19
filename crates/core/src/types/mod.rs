//! Core types for Kukoro.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod key;
pub mod order;
pub mod outcome;
pub mod price;
pub mod review;
pub mod status;

pub use cart::CartLineItem;
pub use key::{ProductKey, ProductKeyError};
pub use order::{CustomerInfo, Order, OrderId, OrderItem};
pub use outcome::{CheckoutOutcome, DecrementStatus};
pub use price::parse_price;
pub use review::{CancellationRequest, Review};
pub use status::OrderStatus;
