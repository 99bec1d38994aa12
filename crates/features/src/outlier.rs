//! Interquartile-range outlier filtering.
//!
//! Values outside `[Q1 - m*IQR, Q3 + m*IQR]` are treated as outliers, where
//! Q1/Q3 are the linearly interpolated 25th/75th percentiles of the group.

use crate::quantile::{quantile_sorted, sorted_finite};
use pricefeed_core::{Error, Result};

/// Acceptance band computed from a group of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    /// 25th percentile.
    pub q1: f64,
    /// 75th percentile.
    pub q3: f64,
    /// Lowest accepted value.
    pub lower: f64,
    /// Highest accepted value.
    pub upper: f64,
}

impl IqrBounds {
    /// Compute the band for `values` with the given multiplier.
    ///
    /// Non-finite values are ignored. Returns `None` if no finite value remains.
    pub fn from_values(values: &[f64], multiplier: f64) -> Option<Self> {
        let sorted = sorted_finite(values);
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;

        Some(Self {
            q1,
            q3,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    /// Interquartile range.
    #[inline]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Inclusive on both ends; non-finite values are never contained.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.lower && value <= self.upper
    }
}

/// IQR outlier filter.
#[derive(Debug, Clone, Copy)]
pub struct OutlierFilter {
    multiplier: f64,
}

impl OutlierFilter {
    /// Create a filter. The multiplier must be finite and non-negative.
    pub fn new(multiplier: f64) -> Result<Self> {
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(Error::config(format!(
                "IQR multiplier must be a non-negative number, got {multiplier}"
            )));
        }
        Ok(Self { multiplier })
    }

    /// The configured multiplier.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Acceptance band for a group of values.
    pub fn bounds(&self, values: &[f64]) -> Option<IqrBounds> {
        IqrBounds::from_values(values, self.multiplier)
    }

    /// Keep the records whose `field` lies inside the band, in input order.
    pub fn filter<'a, T, F>(&self, records: &'a [T], field: F) -> Vec<&'a T>
    where
        F: Fn(&T) -> f64,
    {
        let values: Vec<f64> = records.iter().map(&field).collect();
        let Some(bounds) = self.bounds(&values) else {
            return Vec::new();
        };

        records
            .iter()
            .zip(values)
            .filter(|(_, v)| bounds.contains(*v))
            .map(|(r, _)| r)
            .collect()
    }
}
