//! Data ingestion and normalization for the price feed system.
//!
//! This crate handles:
//! - Search request payloads
//! - Listing normalization into transactions
//! - Paginated fetching (stop on first failure)
//! - Snapshot persistence

pub mod query;
pub mod listing;
pub mod client;
pub mod store;

pub use listing::{ListingNormalizer, NormalizationStats, SkipReason};
pub use client::{fetch_snapshot, FetchOutcome, PageSource, SearchClient};
pub use store::{SnapshotInfo, SnapshotStore};
