//! Market statistics for the fair-price engine.
//!
//! This crate handles:
//! - Sample aggregation into a fair price range
//! - Trend classification, seasonality and short-term forecasts
//! - Shared statistics helpers (quantiles, sample std, OLS fit)

pub mod aggregator;
pub mod stats;
pub mod trend;

pub use aggregator::SampleAggregator;
pub use stats::LinearFit;
pub use trend::TrendAnalyzer;
