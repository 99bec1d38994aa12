//! Daily price feed aggregation.
//!
//! Groups sales by calendar day, strips per-day outliers, takes the daily
//! median price per square foot and smooths the resulting series with a
//! centered rolling mean. The rolling window counts rows, so days with no
//! surviving sales are skipped rather than filled.

use crate::{outlier::OutlierFilter, quantile::median, rolling::CenteredRollingMean};
use chrono::NaiveDate;
use pricefeed_core::{config::FeedConfig, DailyAggregate, DailyMedian, Result, Transaction};
use std::collections::BTreeMap;
use tracing::debug;

/// Price feed aggregator.
#[derive(Debug, Clone, Copy)]
pub struct PriceFeedAggregator {
    filter: OutlierFilter,
    smoother: CenteredRollingMean,
}

impl PriceFeedAggregator {
    /// Create an aggregator from feed parameters.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            filter: OutlierFilter::new(config.iqr_multiplier)?,
            smoother: CenteredRollingMean::new(config.window)?,
        })
    }

    /// Rolling window size in rows.
    pub fn window(&self) -> usize {
        self.smoother.window()
    }

    /// IQR multiplier.
    pub fn iqr_multiplier(&self) -> f64 {
        self.filter.multiplier()
    }

    /// Daily medians after outlier removal, ascending by date.
    ///
    /// Invalid records (non-positive price or area) are skipped. Days whose
    /// sales are all rejected produce no row.
    pub fn daily_medians(&self, records: &[Transaction]) -> Vec<DailyMedian> {
        let mut by_date: BTreeMap<NaiveDate, Vec<&Transaction>> = BTreeMap::new();
        let mut skipped = 0usize;

        for record in records {
            if !record.is_valid() {
                skipped += 1;
                continue;
            }
            by_date.entry(record.date()).or_default().push(record);
        }

        if skipped > 0 {
            debug!(skipped, "Skipped invalid transactions");
        }

        by_date
            .into_iter()
            .filter_map(|(date, sales)| {
                let kept: Vec<f64> = self
                    .filter
                    .filter(&sales, |t| t.price_per_sqft())
                    .into_iter()
                    .map(|t| t.price_per_sqft())
                    .collect();
                let removed = sales.len() - kept.len();
                if removed > 0 {
                    debug!(%date, removed, kept = kept.len(), "Removed outliers");
                }

                let value = median(&kept)?;
                Some(DailyMedian {
                    date,
                    value,
                    transaction_count: kept.len(),
                })
            })
            .collect()
    }

    /// Smooth an ascending series of daily medians, dropping edge rows that
    /// lack a full window.
    pub fn smooth(&self, daily: &[DailyMedian]) -> Vec<DailyAggregate> {
        let raw: Vec<f64> = daily.iter().map(|d| d.value).collect();

        daily
            .iter()
            .zip(self.smoother.apply(&raw))
            .filter_map(|(d, smoothed)| {
                Some(DailyAggregate {
                    date: d.date,
                    raw_value: d.value,
                    smoothed_value: smoothed?,
                    transaction_count: d.transaction_count,
                })
            })
            .collect()
    }

    /// Full pipeline: group, filter, take medians, smooth and trim.
    pub fn aggregate(&self, records: &[Transaction]) -> Vec<DailyAggregate> {
        let daily = self.daily_medians(records);
        let feed = self.smooth(&daily);
        debug!(
            days = daily.len(),
            rows = feed.len(),
            window = self.window(),
            "Aggregated price feed"
        );
        feed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn day(n: i64) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    /// Build sales for consecutive days; each value is a price per sqft
    /// (price = value * 1000, area = 1000).
    fn make_days(days: &[&[f64]]) -> Vec<Transaction> {
        days.iter()
            .enumerate()
            .flat_map(|(i, values)| {
                values.iter().map(move |v| {
                    Transaction::new(day(i as i64), v * 1000.0, 1000.0, format!("{i} Elm St"))
                })
            })
            .collect()
    }

    fn aggregator(window: usize, iqr_multiplier: f64) -> PriceFeedAggregator {
        PriceFeedAggregator::new(&FeedConfig { window, iqr_multiplier }).unwrap()
    }

    #[test]
    fn test_five_day_scenario() {
        let records = make_days(&[
            &[10.0, 10.0, 10.0],
            &[20.0],
            &[12.0, 12.0, 12.0],
            &[8.0, 8.0, 9.0, 9.0, 100.0],
            &[15.0, 15.0],
        ]);
        let agg = aggregator(3, 1.5);

        let daily = agg.daily_medians(&records);
        let medians: Vec<f64> = daily.iter().map(|d| d.value).collect();
        assert_eq!(medians, vec![10.0, 20.0, 12.0, 8.5, 15.0]);
        assert_eq!(daily[3].transaction_count, 4);

        let feed = agg.aggregate(&records);
        assert_eq!(feed.len(), 3);
        assert_eq!(feed[0].date, day(1).date_naive());
        assert_eq!(feed[2].date, day(3).date_naive());
        assert_relative_eq!(feed[0].smoothed_value, 14.0);
        assert_relative_eq!(feed[1].smoothed_value, 13.5);
        assert_relative_eq!(feed[2].smoothed_value, 11.833333333333334, epsilon = 1e-9);
        assert_relative_eq!(feed[2].raw_value, 8.5);
    }

    #[test]
    fn test_three_sale_day_keeps_high_value() {
        // With only three sales the interpolated IQR band is wide enough
        // to keep 100 (band upper edge is 123.5).
        let records = make_days(&[&[8.0, 100.0, 9.0]]);
        let daily = aggregator(1, 1.5).daily_medians(&records);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].transaction_count, 3);
        assert_relative_eq!(daily[0].value, 9.0);
    }

    #[test]
    fn test_single_date() {
        let records = make_days(&[&[10.0, 11.0, 12.0]]);

        assert!(aggregator(3, 1.5).aggregate(&records).is_empty());

        let feed = aggregator(1, 1.5).aggregate(&records);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].raw_value, feed[0].smoothed_value);
        assert_eq!(feed[0].transaction_count, 3);
    }

    #[test]
    fn test_huge_multiplier_keeps_everything() {
        let records = make_days(&[&[1.0, 2.0, 3.0, 4.0, 50.0], &[5.0, 6.0], &[7.0, 700.0, 8.0]]);
        let daily = aggregator(1, 1000.0).daily_medians(&records);

        let counts: Vec<usize> = daily.iter().map(|d| d.transaction_count).collect();
        assert_eq!(counts, vec![5, 2, 3]);
        assert_relative_eq!(daily[0].value, 3.0);
        assert_relative_eq!(daily[1].value, 5.5);
        assert_relative_eq!(daily[2].value, 8.0);
    }

    #[test]
    fn test_fewer_days_than_window() {
        let records = make_days(&[&[10.0], &[11.0], &[12.0]]);
        assert!(aggregator(5, 1.5).aggregate(&records).is_empty());
        assert_eq!(aggregator(3, 1.5).aggregate(&records).len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregator(3, 1.5).aggregate(&[]).is_empty());
        assert!(aggregator(1, 1.5).daily_medians(&[]).is_empty());
    }

    #[test]
    fn test_window_spans_calendar_gaps() {
        // Days 0, 1 and 10: the window still treats them as neighbours.
        let records = vec![
            Transaction::new(day(0), 10_000.0, 1000.0, "a"),
            Transaction::new(day(1), 20_000.0, 1000.0, "b"),
            Transaction::new(day(10), 30_000.0, 1000.0, "c"),
        ];
        let feed = aggregator(3, 1.5).aggregate(&records);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].date, day(1).date_naive());
        assert_relative_eq!(feed[0].smoothed_value, 20.0);
    }

    #[test]
    fn test_same_day_different_times_grouped() {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 5, 0).unwrap();
        let records = vec![
            Transaction::new(base, 10_000.0, 1000.0, "a"),
            Transaction::new(base + Duration::hours(20), 12_000.0, 1000.0, "b"),
        ];
        let daily = aggregator(1, 1.5).daily_medians(&records);
        assert_eq!(daily.len(), 1);
        assert_relative_eq!(daily[0].value, 11.0);
    }

    #[test]
    fn test_invalid_records_skipped() {
        let records = vec![
            Transaction::new(day(0), 10_000.0, 1000.0, "ok"),
            Transaction::new(day(0), 10_000.0, 0.0, "no area"),
            Transaction::new(day(1), -5.0, 1000.0, "bad price"),
        ];
        let daily = aggregator(1, 1.5).daily_medians(&records);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].transaction_count, 1);
    }

    #[test]
    fn test_input_order_irrelevant() {
        let mut records = make_days(&[&[10.0, 11.0], &[20.0], &[12.0, 13.0, 14.0], &[9.0]]);
        let agg = aggregator(3, 1.5);
        let forward = agg.aggregate(&records);
        records.reverse();
        assert_eq!(agg.aggregate(&records), forward);
    }

    #[test]
    fn test_invalid_config() {
        assert!(PriceFeedAggregator::new(&FeedConfig { window: 0, iqr_multiplier: 1.5 }).is_err());
        assert!(PriceFeedAggregator::new(&FeedConfig { window: 3, iqr_multiplier: -1.0 }).is_err());
    }
}
