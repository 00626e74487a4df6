//! Configuration structures and named thresholds for the fair-price engine.
//!
//! Every decision threshold used by the engine is a `pub const` here so
//! tests can target boundary values by name. The `Default` impls are built
//! from these constants.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Confidence level for the mean interval when the caller gives none.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;
/// Half-width of the fair band in standard deviations around the median.
pub const FAIR_BAND_STD_MULTIPLIER: f64 = 0.5;
/// Fair band confidence with zero samples.
pub const FAIR_CONFIDENCE_BASE: f64 = 0.5;
/// Fair band confidence gained per sample.
pub const FAIR_CONFIDENCE_PER_SAMPLE: f64 = 0.05;
/// Upper bound on fair band confidence.
pub const FAIR_CONFIDENCE_CEILING: f64 = 0.9;
/// Minimum samples before a confidence interval is emitted.
pub const MIN_CONFIDENCE_INTERVAL_SAMPLES: usize = 3;

/// Coefficient of variation at or above which a series is `volatile`.
pub const VOLATILE_THRESHOLD: f64 = 0.15;
/// Fitted relative change across the window beyond which a series is
/// `rising` (or, negated, `falling`).
pub const TREND_SLOPE_THRESHOLD: f64 = 0.01;
/// Distinct calendar months required for a seasonal pattern.
pub const SEASONAL_MIN_MONTHS: usize = 12;
/// Quantile of monthly averages marking peak months (low months use `1 - q`).
pub const SEASONAL_PEAK_QUANTILE: f64 = 0.75;
/// Forecast horizons in days past the last point.
pub const FORECAST_WEEK_DAYS: f64 = 7.0;
pub const FORECAST_MONTH_DAYS: f64 = 30.0;

/// Deviation (percent, inclusive) still considered `fair`.
pub const VERDICT_FAIR_PCT: f64 = 5.0;
/// Deviation (percent, inclusive) separating high/low from very high/very low.
pub const VERDICT_EXTREME_PCT: f64 = 10.0;
/// Comparables needed before verification confidence is not scaled down.
pub const FULL_POWER_SAMPLES: usize = 3;
/// Half-life of comparable weights, in days behind the newest comparable.
pub const RECENCY_HALF_LIFE_DAYS: f64 = 7.0;
/// Comparables shown in a report.
pub const DISPLAY_COMPARABLE_CAP: usize = 5;

/// Absolute deviation (percent) above which direct negotiation is offered.
pub const DIRECT_NEGOTIATION_MIN_PCT: f64 = 5.0;
/// Fraction of the overcharge kept in the counter-offer.
pub const DIRECT_ANCHOR_FRACTION: f64 = 0.3;
/// Comparables needed for the market comparison approach.
pub const MARKET_COMPARISON_MIN_SAMPLES: usize = 3;
/// Deviation (percent) above which market comparison is high priority.
pub const MARKET_COMPARISON_HIGH_PCT: f64 = 10.0;

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sample aggregation configuration.
    pub aggregation: AggregationConfig,
    /// Trend analysis configuration.
    pub trend: TrendConfig,
    /// Quote verification configuration.
    pub verification: VerificationConfig,
    /// Strategy generation configuration.
    pub strategy: StrategyConfig,
    /// Orchestration configuration.
    pub service: ServiceConfig,
}

impl Config {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject inconsistent settings.
    pub fn validate(&self) -> Result<()> {
        self.aggregation.validate()?;
        self.trend.validate()?;
        self.verification.validate()?;
        self.strategy.validate()?;
        self.service.validate()
    }
}

fn check_fraction(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::config(format!("{name} must be within [0, 1], got {value}")))
    }
}

/// Sample aggregation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Default confidence level for the mean interval.
    pub confidence_level: f64,
    /// Fair band half-width in standard deviations.
    pub fair_band_std_multiplier: f64,
    /// Fair band confidence with zero samples.
    pub fair_confidence_base: f64,
    /// Fair band confidence gained per sample.
    pub fair_confidence_per_sample: f64,
    /// Upper bound on fair band confidence.
    pub fair_confidence_ceiling: f64,
    /// Minimum samples for a confidence interval.
    pub min_interval_samples: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            fair_band_std_multiplier: FAIR_BAND_STD_MULTIPLIER,
            fair_confidence_base: FAIR_CONFIDENCE_BASE,
            fair_confidence_per_sample: FAIR_CONFIDENCE_PER_SAMPLE,
            fair_confidence_ceiling: FAIR_CONFIDENCE_CEILING,
            min_interval_samples: MIN_CONFIDENCE_INTERVAL_SAMPLES,
        }
    }
}

impl AggregationConfig {
    fn validate(&self) -> Result<()> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(Error::config("aggregation.confidence_level must be in (0, 1)"));
        }
        if self.fair_band_std_multiplier < 0.0 {
            return Err(Error::config("aggregation.fair_band_std_multiplier must be >= 0"));
        }
        if self.fair_confidence_per_sample < 0.0 {
            return Err(Error::config("aggregation.fair_confidence_per_sample must be >= 0"));
        }
        check_fraction("aggregation.fair_confidence_base", self.fair_confidence_base)?;
        check_fraction("aggregation.fair_confidence_ceiling", self.fair_confidence_ceiling)
    }
}

/// Trend analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Coefficient of variation marking a volatile series.
    pub volatile_threshold: f64,
    /// Fitted relative change marking rising/falling.
    pub slope_threshold: f64,
    /// Distinct months required for a seasonal pattern.
    pub seasonal_min_months: usize,
    /// Quantile marking peak months.
    pub seasonal_peak_quantile: f64,
    /// Week horizon in days.
    pub forecast_week_days: f64,
    /// Month horizon in days.
    pub forecast_month_days: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            volatile_threshold: VOLATILE_THRESHOLD,
            slope_threshold: TREND_SLOPE_THRESHOLD,
            seasonal_min_months: SEASONAL_MIN_MONTHS,
            seasonal_peak_quantile: SEASONAL_PEAK_QUANTILE,
            forecast_week_days: FORECAST_WEEK_DAYS,
            forecast_month_days: FORECAST_MONTH_DAYS,
        }
    }
}

impl TrendConfig {
    fn validate(&self) -> Result<()> {
        if self.volatile_threshold <= 0.0 || self.slope_threshold < 0.0 {
            return Err(Error::config("trend thresholds must be positive"));
        }
        if !(0.5..=1.0).contains(&self.seasonal_peak_quantile) {
            return Err(Error::config("trend.seasonal_peak_quantile must be within [0.5, 1]"));
        }
        if self.seasonal_min_months == 0 || self.seasonal_min_months > 12 {
            return Err(Error::config("trend.seasonal_min_months must be within 1..=12"));
        }
        Ok(())
    }
}

/// Quote verification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Fair deviation bound (percent).
    pub fair_pct: f64,
    /// Extreme deviation bound (percent).
    pub extreme_pct: f64,
    /// Comparables needed before confidence is not scaled down.
    pub full_power_samples: usize,
    /// Recency half-life in days; `None` weighs all comparables equally.
    pub recency_half_life_days: Option<f64>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            fair_pct: VERDICT_FAIR_PCT,
            extreme_pct: VERDICT_EXTREME_PCT,
            full_power_samples: FULL_POWER_SAMPLES,
            recency_half_life_days: Some(RECENCY_HALF_LIFE_DAYS),
        }
    }
}

impl VerificationConfig {
    fn validate(&self) -> Result<()> {
        if self.fair_pct < 0.0 || self.extreme_pct < self.fair_pct {
            return Err(Error::config(
                "verification.fair_pct must be >= 0 and <= verification.extreme_pct",
            ));
        }
        if self.full_power_samples == 0 {
            return Err(Error::config("verification.full_power_samples must be >= 1"));
        }
        if matches!(self.recency_half_life_days, Some(h) if h <= 0.0) {
            return Err(Error::config("verification.recency_half_life_days must be > 0"));
        }
        Ok(())
    }
}

/// Strategy generation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Absolute deviation (percent) for direct negotiation.
    pub direct_min_pct: f64,
    /// Fraction of the overcharge kept in the counter-offer.
    pub direct_anchor_fraction: f64,
    /// Success rate when countering an overpriced quote.
    pub direct_overpriced_success: u8,
    /// Success rate when the quote is already under market.
    pub direct_underpriced_success: u8,
    /// Comparables needed for market comparison.
    pub market_comparison_min_samples: usize,
    /// Deviation (percent) making market comparison high priority.
    pub market_comparison_high_pct: f64,
    pub market_comparison_success: u8,
    pub timing_rising_success: u8,
    pub timing_falling_success: u8,
    pub timing_volatile_success: u8,
    pub relationship_success: u8,
    pub bundle_success: u8,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            direct_min_pct: DIRECT_NEGOTIATION_MIN_PCT,
            direct_anchor_fraction: DIRECT_ANCHOR_FRACTION,
            direct_overpriced_success: 75,
            direct_underpriced_success: 45,
            market_comparison_min_samples: MARKET_COMPARISON_MIN_SAMPLES,
            market_comparison_high_pct: MARKET_COMPARISON_HIGH_PCT,
            market_comparison_success: 65,
            timing_rising_success: 60,
            timing_falling_success: 80,
            timing_volatile_success: 55,
            relationship_success: 55,
            bundle_success: 50,
        }
    }
}

impl StrategyConfig {
    fn validate(&self) -> Result<()> {
        check_fraction("strategy.direct_anchor_fraction", self.direct_anchor_fraction)?;
        let rates = [
            self.direct_overpriced_success,
            self.direct_underpriced_success,
            self.market_comparison_success,
            self.timing_rising_success,
            self.timing_falling_success,
            self.timing_volatile_success,
            self.relationship_success,
            self.bundle_success,
        ];
        if rates.iter().any(|&r| r > 100) {
            return Err(Error::config("strategy success rates must be within 0..=100"));
        }
        Ok(())
    }
}

/// Orchestration configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Provider call attempts before giving up.
    pub max_attempts: u32,
    /// Delay before the first retry (ms), doubled per attempt.
    pub retry_base_delay_ms: u64,
    /// Cap on a single retry delay (ms).
    pub retry_max_delay_ms: u64,
    /// Freshness window for cached samples (seconds).
    pub cache_ttl_secs: u64,
    /// Comparables shown in a report.
    pub display_comparable_cap: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_base_delay_ms: 200,
            retry_max_delay_ms: 5_000,
            cache_ttl_secs: 300,
            display_comparable_cap: DISPLAY_COMPARABLE_CAP,
        }
    }
}

impl ServiceConfig {
    fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::config("service.max_attempts must be >= 1"));
        }
        Ok(())
    }
}
