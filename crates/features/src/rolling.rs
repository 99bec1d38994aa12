//! Centered rolling mean.
//!
//! Row `i` averages `before()` rows behind it, itself, and `after()` rows
//! ahead of it. Rows without a full window are undefined.

use pricefeed_core::{Error, Result};

/// Centered rolling mean over a fixed number of rows.
#[derive(Debug, Clone, Copy)]
pub struct CenteredRollingMean {
    window: usize,
}

impl CenteredRollingMean {
    /// Create a smoother. The window must be at least one row.
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(Error::config("rolling window must be at least 1"));
        }
        Ok(Self { window })
    }

    /// Window size in rows.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Rows taken before the center: `floor((window - 1) / 2)`.
    #[inline]
    pub fn before(&self) -> usize {
        (self.window - 1) / 2
    }

    /// Rows taken after the center: `ceil((window - 1) / 2)`.
    #[inline]
    pub fn after(&self) -> usize {
        self.window - 1 - self.before()
    }

    /// Number of defined rows for a series of `len` rows.
    pub fn defined_len(&self, len: usize) -> usize {
        len.saturating_sub(self.window - 1)
    }

    /// Mean for every row; `None` where the window would run off either end.
    pub fn apply(&self, values: &[f64]) -> Vec<Option<f64>> {
        let mut out = vec![None; values.len()];
        let n = self.window as f64;

        // windows() yields nothing when the series is shorter than the window
        for (start, slice) in values.windows(self.window).enumerate() {
            out[start + self.before()] = Some(slice.iter().sum::<f64>() / n);
        }

        out
    }
}
