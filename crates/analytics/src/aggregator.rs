//! Sample aggregation (fair price range).
//!
//! Summarizes comparable price samples into central tendency, spread, a
//! fair band around the median and a confidence interval for the mean.

use crate::stats;
use fairprice_core::config::AggregationConfig;
use fairprice_core::{ConfidenceInterval, Error, FairPriceBand, PriceRange, PriceSample, Result};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Sample aggregator.
#[derive(Debug, Clone, Default)]
pub struct SampleAggregator {
    config: AggregationConfig,
}

impl SampleAggregator {
    /// Create a new sample aggregator.
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    /// Aggregate samples at the configured confidence level.
    pub fn aggregate(&self, samples: &[PriceSample]) -> Result<PriceRange> {
        self.aggregate_with_level(samples, self.config.confidence_level)
    }

    /// Aggregate samples with an explicit confidence level in (0, 1).
    ///
    /// The result does not depend on the order of `samples`.
    pub fn aggregate_with_level(
        &self,
        samples: &[PriceSample],
        confidence_level: f64,
    ) -> Result<PriceRange> {
        if samples.is_empty() {
            return Err(Error::insufficient_data("no price samples to aggregate"));
        }
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(Error::data(format!(
                "confidence level must be in (0, 1), got {confidence_level}"
            )));
        }
        if let Some(bad) = samples.iter().find(|s| !s.price.is_finite() || s.price <= 0.0) {
            return Err(Error::data(format!(
                "sample from {} has invalid price {}",
                bad.location, bad.price
            )));
        }

        // Sorted first so every statistic is permutation invariant.
        let prices = stats::sorted(samples.iter().map(|s| s.price));
        let n = prices.len();
        let min = prices[0];
        let max = prices[n - 1];
        let average = stats::mean(&prices);
        let median = stats::median_sorted(&prices);
        let standard_deviation = stats::sample_std_dev(&prices);

        let half_width = self.config.fair_band_std_multiplier * standard_deviation;
        let fair_price_range = FairPriceBand {
            lower: (median - half_width).max(min),
            upper: (median + half_width).min(max),
            confidence: self.band_confidence(n),
        };

        let confidence_interval = if n >= self.config.min_interval_samples {
            let z = critical_value(confidence_level)?;
            let margin = z * standard_deviation / (n as f64).sqrt();
            Some(ConfidenceInterval {
                lower: average - margin,
                upper: average + margin,
                level: confidence_level,
            })
        } else {
            None
        };

        // Non-empty, so max exists.
        let last_updated = samples
            .iter()
            .map(|s| s.timestamp)
            .max()
            .ok_or_else(|| Error::insufficient_data("no price samples to aggregate"))?;

        debug!(
            sample_size = n,
            average,
            median,
            standard_deviation,
            fair_lower = fair_price_range.lower,
            fair_upper = fair_price_range.upper,
            "aggregated price samples"
        );

        Ok(PriceRange {
            min,
            max,
            average,
            median,
            standard_deviation,
            fair_price_range,
            confidence_interval,
            sample_size: n,
            last_updated,
        })
    }

    /// Fair band confidence for `n` samples: linear in `n`, capped.
    pub fn band_confidence(&self, n: usize) -> f64 {
        let raw =
            self.config.fair_confidence_base + self.config.fair_confidence_per_sample * n as f64;
        raw.min(self.config.fair_confidence_ceiling).clamp(0.0, 1.0)
    }
}

/// Two-sided standard normal critical value for `level` (1.96 at 0.95).
pub fn critical_value(level: f64) -> Result<f64> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| Error::Other(e.to_string()))?;
    Ok(normal.inverse_cdf((1.0 + level) / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use chrono::{Duration, TimeZone, Utc};
    use fairprice_core::SampleSource;

    fn make_samples(prices: &[f64]) -> Vec<PriceSample> {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PriceSample {
                price,
                location: format!("Mandi {i}"),
                source: SampleSource::Official,
                confidence: 0.8,
                timestamp: base + Duration::hours(i as i64),
            })
            .collect()
    }

    fn assert_range_invariant(range: &PriceRange, n: usize) {
        assert!(range.min <= range.fair_price_range.lower);
        assert!(range.fair_price_range.lower <= range.fair_price_range.upper);
        assert!(range.fair_price_range.upper <= range.max);
        assert!((0.0..=1.0).contains(&range.fair_price_range.confidence));
        assert_eq!(range.sample_size, n);
    }

    #[test]
    fn test_basic_statistics() {
        let aggregator = SampleAggregator::default();
        let samples = make_samples(&[2000.0, 2100.0, 2200.0, 2300.0, 2400.0]);

        let range = aggregator.aggregate(&samples).unwrap();

        assert_relative_eq!(range.average, 2200.0);
        assert_relative_eq!(range.median, 2200.0);
        assert_relative_eq!(range.min, 2000.0);
        assert_relative_eq!(range.max, 2400.0);
        // Sample std of 100-step ladder: sqrt(25000) = 158.11
        assert_abs_diff_eq!(range.standard_deviation, 158.113883, epsilon = 1e-5);
        assert_range_invariant(&range, 5);
    }

    #[test]
    fn test_fair_band_around_median() {
        let aggregator = SampleAggregator::default();
        let samples = make_samples(&[2000.0, 2100.0, 2200.0, 2300.0, 2400.0]);

        let range = aggregator.aggregate(&samples).unwrap();
        let half = 0.5 * range.standard_deviation;

        assert_abs_diff_eq!(range.fair_price_range.lower, 2200.0 - half, epsilon = 1e-9);
        assert_abs_diff_eq!(range.fair_price_range.upper, 2200.0 + half, epsilon = 1e-9);
        assert_abs_diff_eq!(range.fair_price_range.confidence, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_fair_band_clamped_to_extremes() {
        let aggregator = SampleAggregator::default();
        // One outlier inflates std beyond the median's distance to min.
        let samples = make_samples(&[1000.0, 1000.0, 1000.0, 5000.0]);

        let range = aggregator.aggregate(&samples).unwrap();

        assert_relative_eq!(range.fair_price_range.lower, 1000.0);
        assert_range_invariant(&range, 4);
    }

    #[test]
    fn test_even_count_median() {
        let aggregator = SampleAggregator::default();
        let range = aggregator
            .aggregate(&make_samples(&[2400.0, 2000.0, 2300.0, 2100.0]))
            .unwrap();
        assert_relative_eq!(range.median, 2200.0);
    }

    #[test]
    fn test_single_sample() {
        let aggregator = SampleAggregator::default();
        let range = aggregator.aggregate(&make_samples(&[1850.0])).unwrap();

        assert_eq!(range.standard_deviation, 0.0);
        assert_relative_eq!(range.fair_price_range.lower, 1850.0);
        assert_relative_eq!(range.fair_price_range.upper, 1850.0);
        assert!(range.confidence_interval.is_none());
        assert_range_invariant(&range, 1);
    }

    #[test]
    fn test_confidence_interval_95() {
        let aggregator = SampleAggregator::default();
        let samples = make_samples(&[2000.0, 2100.0, 2200.0, 2300.0, 2400.0]);

        let range = aggregator.aggregate(&samples).unwrap();
        let ci = range.confidence_interval.unwrap();
        let margin = 1.959964 * range.standard_deviation / 5.0_f64.sqrt();

        assert_relative_eq!(ci.level, 0.95);
        assert_abs_diff_eq!(ci.lower, 2200.0 - margin, epsilon = 1e-3);
        assert_abs_diff_eq!(ci.upper, 2200.0 + margin, epsilon = 1e-3);
    }

    #[test]
    fn test_no_interval_below_three_samples() {
        let aggregator = SampleAggregator::default();
        let range = aggregator.aggregate(&make_samples(&[2000.0, 2100.0])).unwrap();
        assert!(range.confidence_interval.is_none());
    }

    #[test]
    fn test_critical_values() {
        assert_abs_diff_eq!(critical_value(0.95).unwrap(), 1.96, epsilon = 1e-3);
        assert_abs_diff_eq!(critical_value(0.90).unwrap(), 1.645, epsilon = 1e-3);
        assert_abs_diff_eq!(critical_value(0.99).unwrap(), 2.576, epsilon = 1e-3);
    }

    #[test]
    fn test_permutation_invariance() {
        let aggregator = SampleAggregator::default();
        let prices = [2130.5, 1987.25, 2290.0, 2050.75, 2410.1, 2199.9, 2075.3];
        let forward = make_samples(&prices);
        let mut backward = forward.clone();
        backward.reverse();
        let mut rotated = forward.clone();
        rotated.rotate_left(3);

        let a = aggregator.aggregate(&forward).unwrap();
        assert_eq!(a, aggregator.aggregate(&backward).unwrap());
        assert_eq!(a, aggregator.aggregate(&rotated).unwrap());
    }

    #[test]
    fn test_deterministic() {
        let aggregator = SampleAggregator::default();
        let samples = make_samples(&[1510.0, 1620.0, 1480.0, 1555.0]);
        assert_eq!(
            aggregator.aggregate(&samples).unwrap(),
            aggregator.aggregate(&samples).unwrap()
        );
    }

    #[test]
    fn test_band_confidence_monotonic_and_bounded() {
        let aggregator = SampleAggregator::default();
        let mut prev = 0.0;
        for n in 1..200 {
            let c = aggregator.band_confidence(n);
            assert!(c >= prev);
            assert!((0.0..=1.0).contains(&c));
            prev = c;
        }
        assert_relative_eq!(aggregator.band_confidence(100), 0.9);
    }

    #[test]
    fn test_last_updated_is_newest_sample() {
        let aggregator = SampleAggregator::default();
        let samples = make_samples(&[2000.0, 2100.0, 2200.0]);
        let range = aggregator.aggregate(&samples).unwrap();
        assert_eq!(range.last_updated, samples[2].timestamp);
    }

    #[test]
    fn test_empty_samples() {
        let aggregator = SampleAggregator::default();
        let err = aggregator.aggregate(&[]).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_rejects_invalid_prices() {
        let aggregator = SampleAggregator::default();
        assert!(matches!(
            aggregator.aggregate(&make_samples(&[2000.0, 0.0])),
            Err(Error::Data(_))
        ));
        assert!(matches!(
            aggregator.aggregate(&make_samples(&[f64::NAN])),
            Err(Error::Data(_))
        ));
    }

    #[test]
    fn test_rejects_bad_level() {
        let aggregator = SampleAggregator::default();
        let samples = make_samples(&[2000.0, 2100.0, 2200.0]);
        assert!(aggregator.aggregate_with_level(&samples, 1.5).is_err());
        assert!(aggregator.aggregate_with_level(&samples, 0.0).is_err());
    }
}
