//! Plain-text rendering of a feed report.

use pricefeed_features::FeedReport;
use std::fmt::Write;
use thousands::Separable;

/// Format a number with thousands separators and a fixed number of decimals.
pub fn with_thousands(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value).separate_with_commas()
}

/// Render the series table followed by the summary metrics.
pub fn render(report: &FeedReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<12} {:>14} {:>16} {:>8}",
        "date", "raw $/sqft", "smoothed $/sqft", "sales"
    );
    for row in &report.series {
        let _ = writeln!(
            out,
            "{:<12} {:>14} {:>16} {:>8}",
            row.date.to_string(),
            with_thousands(row.raw_value, 2),
            with_thousands(row.smoothed_value, 2),
            row.transaction_count
        );
    }
    out.push('\n');

    match &report.summary {
        Some(summary) => {
            let _ = writeln!(
                out,
                "Initial Price/sqft:     ${}",
                with_thousands(summary.initial_price_per_sqft, 2)
            );
            let _ = writeln!(
                out,
                "Final Price/sqft:       ${}",
                with_thousands(summary.final_price_per_sqft, 2)
            );
            let _ = writeln!(
                out,
                "Total Change:           {}%",
                with_thousands(summary.total_change_pct, 2)
            );
            let _ = writeln!(
                out,
                "Avg Daily Transactions: {}",
                with_thousands(summary.avg_daily_transactions, 1)
            );
        }
        None => {
            let _ = writeln!(
                out,
                "No rows: {} day(s) survived filtering, a {}-row window needs at least {}.",
                report.surviving_days, report.window, report.window
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pricefeed_core::DailyAggregate;
    use pricefeed_features::FeedSummary;

    #[test]
    fn test_with_thousands() {
        assert_eq!(with_thousands(0.0, 2), "0.00");
        assert_eq!(with_thousands(999.999, 2), "1,000.00");
        assert_eq!(with_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(with_thousands(-2500.5, 1), "-2,500.5");
        assert_eq!(with_thousands(123.0, 0), "123");
    }

    #[test]
    fn test_render_with_summary() {
        let series = vec![DailyAggregate {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            raw_value: 1020.0,
            smoothed_value: 1010.5,
            transaction_count: 4,
        }];
        let report = FeedReport {
            window: 1,
            iqr_multiplier: 1.5,
            input_transactions: 4,
            surviving_days: 1,
            summary: FeedSummary::from_feed(&series),
            series,
        };

        let text = render(&report);
        assert!(text.contains("2024-01-02"));
        assert!(text.contains("1,010.50"));
        assert!(text.contains("Initial Price/sqft:     $1,010.50"));
        assert!(text.contains("Total Change:           0.00%"));
        assert!(text.contains("Avg Daily Transactions: 4.0"));
    }

    #[test]
    fn test_render_empty() {
        let report = FeedReport {
            window: 3,
            iqr_multiplier: 1.5,
            input_transactions: 2,
            surviving_days: 2,
            series: Vec::new(),
            summary: None,
        };

        let text = render(&report);
        assert!(text.contains("No rows"));
        assert!(!text.contains("Initial Price/sqft"));
    }
}
