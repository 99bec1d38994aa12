//! Price feed computation.
//!
//! This crate handles:
//! - Linear-interpolated quantiles and medians
//! - IQR outlier filtering
//! - Centered rolling mean smoothing
//! - Daily price feed aggregation
//! - Feed summary statistics

pub mod quantile;
pub mod outlier;
pub mod rolling;
pub mod aggregator;
pub mod summary;
pub mod engine;

pub use outlier::{IqrBounds, OutlierFilter};
pub use rolling::CenteredRollingMean;
pub use aggregator::PriceFeedAggregator;
pub use summary::FeedSummary;
pub use engine::{FeedEngine, FeedReport};
