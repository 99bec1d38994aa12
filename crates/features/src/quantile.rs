//! Order statistics with linear interpolation.
//!
//! For sorted values `x[0..n]` and probability `p`, the quantile sits at
//! position `h = (n - 1) * p` and is interpolated between `x[floor(h)]` and
//! `x[floor(h) + 1]`.

use ordered_float::OrderedFloat;

/// Quantile of values that are already sorted ascending.
///
/// Returns `None` for an empty slice. `q` is clamped to `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;

    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Sort a copy of `values` ascending, dropping non-finite entries.
pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_unstable_by_key(|v| OrderedFloat(*v));
    sorted
}

/// Median: the middle value, or the mean of the two middle values for an
/// even count.
pub fn median(values: &[f64]) -> Option<f64> {
    let sorted = sorted_finite(values);
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2]),
        _ => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quantile(values: &[f64], q: f64) -> Option<f64> {
        quantile_sorted(&sorted_finite(values), q)
    }

    #[test]
    fn test_empty() {
        assert!(quantile(&[], 0.25).is_none());
        assert!(median(&[]).is_none());
    }

    #[test]
    fn test_single_value() {
        assert_eq!(quantile(&[42.0], 0.25), Some(42.0));
        assert_eq!(quantile(&[42.0], 0.75), Some(42.0));
        assert_eq!(median(&[42.0]), Some(42.0));
    }

    #[test]
    fn test_linear_interpolation() {
        // Positions for n=3: q25 -> 0.5, q75 -> 1.5
        let values = [100.0, 8.0, 9.0];
        assert_relative_eq!(quantile(&values, 0.25).unwrap(), 8.5);
        assert_relative_eq!(quantile(&values, 0.75).unwrap(), 54.5);

        // n=4: q25 -> 0.75, q75 -> 2.25
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(quantile(&values, 0.25).unwrap(), 1.75);
        assert_relative_eq!(quantile(&values, 0.75).unwrap(), 3.25);
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_relative_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
        assert_relative_eq!(median(&[8.0, 9.0]).unwrap(), 8.5);
        assert_relative_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
    }

    #[test]
    fn test_even_median_is_midpoint_average() {
        // a + 0.5 * (b - a) rounds to 459.56999999999994 here
        assert_eq!(median(&[812.29, 106.85]), Some(459.57));
        assert_eq!(median(&[812.29, 106.85]), Some((106.85 + 812.29) / 2.0));
        assert_eq!(median(&[1.0, 812.29, 106.85, 900.0]), Some(459.57));
    }

    #[test]
    fn test_extremes_and_clamping() {
        let values = [5.0, 1.0, 9.0];
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(9.0));
        assert_eq!(quantile(&values, 1.5), Some(9.0));
        assert_eq!(quantile(&values, -0.5), Some(1.0));
    }

    #[test]
    fn test_non_finite_dropped() {
        let values = [f64::NAN, 2.0, f64::INFINITY, 4.0];
        assert_relative_eq!(median(&values).unwrap(), 3.0);
    }
}
