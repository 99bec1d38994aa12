//! Feed computation engine.
//!
//! Runs the aggregator over a snapshot and attaches summary statistics.

use crate::{aggregator::PriceFeedAggregator, summary::FeedSummary};
use pricefeed_core::{config::FeedConfig, DailyAggregate, Result, Snapshot, Transaction};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Output of one feed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedReport {
    /// Rolling window used.
    pub window: usize,
    /// IQR multiplier used.
    pub iqr_multiplier: f64,
    /// Transactions considered.
    pub input_transactions: usize,
    /// Days that survived outlier filtering, before edge trimming.
    pub surviving_days: usize,
    /// Smoothed feed, ascending by date.
    pub series: Vec<DailyAggregate>,
    /// Headline figures; absent when the series is empty.
    pub summary: Option<FeedSummary>,
}

impl FeedReport {
    /// Whether the run produced no rows.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Feed computation engine.
pub struct FeedEngine {
    aggregator: PriceFeedAggregator,
}

impl FeedEngine {
    /// Create a new engine from feed parameters.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        if !config.is_within_recommended() {
            let (wmin, wmax) = FeedConfig::RECOMMENDED_WINDOW;
            let (mmin, mmax) = FeedConfig::RECOMMENDED_MULTIPLIER;
            warn!(
                window = config.window,
                iqr_multiplier = config.iqr_multiplier,
                "Parameters outside recommended range (window {wmin}-{wmax}, multiplier {mmin}-{mmax})"
            );
        }

        Ok(Self {
            aggregator: PriceFeedAggregator::new(config)?,
        })
    }

    /// Compute the feed for a set of transactions.
    pub fn run(&self, transactions: &[Transaction]) -> FeedReport {
        let daily = self.aggregator.daily_medians(transactions);
        let series = self.aggregator.smooth(&daily);
        let summary = FeedSummary::from_feed(&series);

        info!(
            transactions = transactions.len(),
            days = daily.len(),
            rows = series.len(),
            "Computed price feed"
        );
        if series.is_empty() {
            warn!(
                days = daily.len(),
                window = self.aggregator.window(),
                "Not enough days for a full rolling window"
            );
        }

        FeedReport {
            window: self.aggregator.window(),
            iqr_multiplier: self.aggregator.iqr_multiplier(),
            input_transactions: transactions.len(),
            surviving_days: daily.len(),
            series,
            summary,
        }
    }

    /// Compute the feed for a fetched snapshot.
    pub fn run_snapshot(&self, snapshot: &Snapshot) -> FeedReport {
        if let Some((first, last)) = snapshot.date_range() {
            info!(
                fetched_at = %snapshot.fetched_at,
                %first,
                %last,
                "Computing feed for snapshot"
            );
        }
        self.run(&snapshot.transactions)
    }

    /// The underlying aggregator.
    pub fn aggregator(&self) -> &PriceFeedAggregator {
        &self.aggregator
    }
}
