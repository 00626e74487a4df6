//! Shared statistics helpers.
//!
//! All helpers that depend on summation order expect their input sorted so
//! results do not depend on how the caller ordered the data.

use ordered_float::OrderedFloat;
use statrs::statistics::Statistics;

/// Return a sorted copy of `values` (NaN-safe total order).
pub fn sorted(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.into_iter().collect();
    out.sort_by_key(|v| OrderedFloat(*v));
    out
}

/// Arithmetic mean; 0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().mean()
}

/// Sample standard deviation (n-1 denominator); 0 for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sd = values.iter().std_dev();
    if sd.is_finite() && sd > 0.0 {
        sd
    } else {
        0.0
    }
}

/// Median of sorted values; average of the two middle values for even counts.
pub fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Quantile of sorted values with linear interpolation between ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Ordinary least squares fit `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fit a line through `(xs[i], ys[i])`.
    ///
    /// Returns `None` for mismatched or fewer than two points, or when all
    /// `xs` are equal.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        if xs.len() != ys.len() || xs.len() < 2 {
            return None;
        }

        let n = xs.len() as f64;
        let x_mean = xs.iter().sum::<f64>() / n;
        let y_mean = ys.iter().sum::<f64>() / n;

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (x, y) in xs.iter().zip(ys) {
            let dx = x - x_mean;
            sxy += dx * (y - y_mean);
            sxx += dx * dx;
        }

        if sxx <= 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: y_mean - slope * x_mean,
        })
    }

    /// Evaluate the fitted line at `x`.
    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_median_odd_even() {
        assert_relative_eq!(median_sorted(&[1.0, 2.0, 3.0]), 2.0);
        assert_relative_eq!(median_sorted(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn test_sample_std_dev() {
        // Var = ((-2)^2 + (-1)^2 + 0 + 1 + 2^2) / 4 = 2.5
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(sample_std_dev(&values), 2.5_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(sample_std_dev(&[42.0]), 0.0);
        assert_eq!(sample_std_dev(&[7.0, 7.0, 7.0]), 0.0);
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_relative_eq!(quantile_sorted(&values, 0.0), 10.0);
        assert_relative_eq!(quantile_sorted(&values, 0.5), 30.0);
        assert_relative_eq!(quantile_sorted(&values, 0.75), 40.0);
        assert_relative_eq!(quantile_sorted(&values, 0.1), 14.0, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_fit_exact_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [5.0, 7.0, 9.0, 11.0];
        let fit = LinearFit::fit(&xs, &ys).unwrap();
        assert_relative_eq!(fit.slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 5.0, epsilon = 1e-12);
        assert_relative_eq!(fit.predict(10.0), 25.0, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_fit_degenerate() {
        assert!(LinearFit::fit(&[1.0, 1.0], &[2.0, 3.0]).is_none());
        assert!(LinearFit::fit(&[1.0], &[2.0]).is_none());
    }

    #[test]
    fn test_sorted_handles_order() {
        assert_eq!(sorted(vec![3.0, 1.0, 2.0]), vec![1.0, 2.0, 3.0]);
    }
}
