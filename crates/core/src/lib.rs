//! Core types and configuration for the price feed system.
//!
//! This crate provides shared types used across all other crates:
//! - Transaction and daily aggregate types
//! - Fetched snapshots
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
