//! Kukoro Admin library.
//!
//! This crate provides the admin functionality as a library, allowing it
//! to be tested and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod rtdb;
pub mod sheets;
pub mod state;
