//! Summary statistics over a computed price feed.

use pricefeed_core::DailyAggregate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Headline figures for a price feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedSummary {
    /// First smoothed price per square foot.
    pub initial_price_per_sqft: f64,
    /// Last smoothed price per square foot.
    pub final_price_per_sqft: f64,
    /// Percent change from first to last smoothed value.
    pub total_change_pct: f64,
    /// Mean number of non-outlier sales per row.
    pub avg_daily_transactions: f64,
    /// Number of rows in the feed.
    pub days: usize,
    /// Total non-outlier sales across all rows.
    pub total_transactions: usize,
    /// Sample standard deviation of the smoothed series (0 with fewer than two rows).
    pub smoothed_std_dev: f64,
}

impl FeedSummary {
    /// Summarize a feed. Returns `None` for an empty feed, which has no
    /// first or last value.
    pub fn from_feed(feed: &[DailyAggregate]) -> Option<Self> {
        let first = feed.first()?;
        let last = feed.last()?;

        let counts: Vec<f64> = feed.iter().map(|r| r.transaction_count as f64).collect();
        let smoothed: Vec<f64> = feed.iter().map(|r| r.smoothed_value).collect();

        let smoothed_std_dev = if smoothed.len() >= 2 {
            smoothed.iter().std_dev()
        } else {
            0.0
        };

        Some(Self {
            initial_price_per_sqft: first.smoothed_value,
            final_price_per_sqft: last.smoothed_value,
            total_change_pct: (last.smoothed_value / first.smoothed_value - 1.0) * 100.0,
            avg_daily_transactions: counts.iter().mean(),
            days: feed.len(),
            total_transactions: feed.iter().map(|r| r.transaction_count).sum(),
            smoothed_std_dev,
        })
    }
}
