//! Core data types for the price feed system.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp in milliseconds since Unix epoch (UTC).
pub type TimestampMs = i64;

/// Convert an epoch-millisecond timestamp to a UTC datetime.
///
/// Returns `None` when the value is outside chrono's representable range.
#[inline]
pub fn ms_to_datetime(ts_ms: TimestampMs) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ts_ms).single()
}

/// A single recorded sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// When the sale was recorded.
    pub sold_at: DateTime<Utc>,
    /// Sale price in currency units.
    pub price: f64,
    /// Living area in square feet.
    pub sqft: f64,
    /// Street address, carried through untouched.
    pub address: String,
}

impl Transaction {
    /// Create a new transaction.
    pub fn new(sold_at: DateTime<Utc>, price: f64, sqft: f64, address: impl Into<String>) -> Self {
        Self {
            sold_at,
            price,
            sqft,
            address: address.into(),
        }
    }

    /// Calendar day (UTC) the sale belongs to.
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.sold_at.date_naive()
    }

    /// Price divided by living area.
    #[inline]
    pub fn price_per_sqft(&self) -> f64 {
        self.price / self.sqft
    }

    /// Whether the record has a positive price and area and a finite
    /// price per square foot.
    pub fn is_valid(&self) -> bool {
        self.price.is_finite()
            && self.price > 0.0
            && self.sqft.is_finite()
            && self.sqft > 0.0
            && self.price_per_sqft().is_finite()
    }
}

/// Median price per square foot for one calendar day, before smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyMedian {
    /// Calendar day.
    pub date: NaiveDate,
    /// Median price per square foot of the non-outlier sales.
    pub value: f64,
    /// Number of non-outlier sales.
    pub transaction_count: usize,
}

/// One row of the smoothed price feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    /// Calendar day.
    pub date: NaiveDate,
    /// Median price per square foot of the non-outlier sales.
    pub raw_value: f64,
    /// Centered rolling mean of `raw_value`.
    pub smoothed_value: f64,
    /// Number of non-outlier sales contributing to `raw_value`.
    pub transaction_count: usize,
}

/// An immutable set of transactions captured by a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the fetch completed.
    pub fetched_at: DateTime<Utc>,
    /// Valid transactions gathered by the fetch.
    pub transactions: Vec<Transaction>,
}

impl Snapshot {
    /// Create a snapshot stamped with the current time.
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            fetched_at: Utc::now(),
            transactions,
        }
    }

    /// Number of transactions in the snapshot.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the snapshot holds no transactions.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Earliest and latest sale day, if any.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.transactions.iter().map(Transaction::date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}
