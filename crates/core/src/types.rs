//! Core data types for the fair-price engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Price per quintal in rupees.
pub type Price = f64;

/// Where a price sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSource {
    /// Government mandi bulletin.
    Official,
    /// Quote reported by a trader or vendor.
    Vendor,
    /// Model output from an upstream predictor.
    Predicted,
    /// Entered by hand.
    Manual,
}

/// A single comparable price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Price per quintal.
    pub price: Price,
    /// Market or mandi name.
    pub location: String,
    /// Provenance of the observation.
    pub source: SampleSource,
    /// Reliability of the observation (0-1).
    pub confidence: f64,
    /// Observation time.
    pub timestamp: DateTime<Utc>,
}

/// Band considered acceptable around the central price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairPriceBand {
    pub lower: Price,
    pub upper: Price,
    /// Confidence in the band (0-1), grows with sample size.
    pub confidence: f64,
}

impl FairPriceBand {
    /// Whether a price lies inside the band (inclusive).
    #[inline]
    pub fn contains(&self, price: Price) -> bool {
        price >= self.lower && price <= self.upper
    }
}

/// Confidence interval for the mean price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: Price,
    pub upper: Price,
    /// Coverage level (e.g., 0.95).
    pub level: f64,
}

/// Statistical summary of a set of comparable samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Price,
    pub max: Price,
    pub average: Price,
    pub median: Price,
    /// Sample standard deviation (n-1 denominator, 0 for a single sample).
    pub standard_deviation: f64,
    pub fair_price_range: FairPriceBand,
    /// Present when at least three samples were aggregated.
    pub confidence_interval: Option<ConfidenceInterval>,
    pub sample_size: usize,
    /// Timestamp of the newest sample.
    pub last_updated: DateTime<Utc>,
}

/// One point of a price time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// Window label for a trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendPeriod {
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl TrendPeriod {
    /// Short label used in queries and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            TrendPeriod::Week => "7d",
            TrendPeriod::Month => "30d",
            TrendPeriod::Quarter => "90d",
            TrendPeriod::Year => "1y",
        }
    }

    /// Nominal length of the window in days.
    pub fn days(self) -> i64 {
        match self {
            TrendPeriod::Week => 7,
            TrendPeriod::Month => 30,
            TrendPeriod::Quarter => 90,
            TrendPeriod::Year => 365,
        }
    }
}

impl std::fmt::Display for TrendPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TrendPeriod {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" => Ok(TrendPeriod::Week),
            "30d" => Ok(TrendPeriod::Month),
            "90d" => Ok(TrendPeriod::Quarter),
            "1y" => Ok(TrendPeriod::Year),
            other => Err(crate::Error::data(format!("unknown trend period: {other}"))),
        }
    }
}

/// Direction classification of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
    /// Dispersion dominates direction.
    Volatile,
}

/// Calendar months (1-12) where prices peak and bottom out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalPattern {
    pub peak_months: BTreeSet<u32>,
    pub low_months: BTreeSet<u32>,
}

/// Short-term linear extrapolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub next_week: Price,
    pub next_month: Price,
    pub confidence: f64,
}

/// Output of trend analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTrend {
    pub period: TrendPeriod,
    pub data_points: Vec<TrendPoint>,
    pub trend: TrendDirection,
    /// Coefficient of variation of prices.
    pub volatility: f64,
    /// Fitted relative price change across the window.
    pub slope_pct: f64,
    pub seasonal_pattern: Option<SeasonalPattern>,
    pub forecast: Option<Forecast>,
}

/// Signed difference between a quote and the market price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    /// quoted - market.
    pub amount: Price,
    /// amount / market * 100.
    pub percentage: f64,
}

impl Deviation {
    /// Compute the deviation of `quoted` from `market`.
    #[inline]
    pub fn between(quoted: Price, market: Price) -> Self {
        let amount = quoted - market;
        Self {
            amount,
            percentage: amount / market * 100.0,
        }
    }
}

/// Fairness classification of a quoted price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    VeryLow,
    Low,
    Fair,
    High,
    VeryHigh,
}

/// Result of checking a quote against market data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceVerification {
    pub quoted_price: Price,
    pub market_price: Price,
    pub deviation: Deviation,
    pub verdict: Verdict,
    pub confidence: f64,
    /// Full ranked list, closest to market first.
    pub comparable_markets: Vec<PriceSample>,
    pub negotiation_suggestion: String,
    pub last_updated: DateTime<Utc>,
}

impl PriceVerification {
    /// First `cap` ranked comparables.
    pub fn top_comparables(&self, cap: usize) -> &[PriceSample] {
        let end = cap.min(self.comparable_markets.len());
        &self.comparable_markets[..end]
    }

    /// Lowest and highest comparable prices, if any.
    pub fn comparable_price_bounds(&self) -> Option<(Price, Price)> {
        let mut prices = self.comparable_markets.iter().map(|s| s.price);
        let first = prices.next()?;
        Some(prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

/// Strategy priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort weight: high 3, medium 2, low 1.
    #[inline]
    pub fn weight(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// Identifier of a negotiation strategy rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    DirectNegotiation,
    MarketComparison,
    TimingBased,
    RelationshipBuilding,
    BundleDeal,
}

impl StrategyKind {
    /// Stable string id.
    pub fn id(self) -> &'static str {
        match self {
            StrategyKind::DirectNegotiation => "direct-negotiation",
            StrategyKind::MarketComparison => "market-comparison",
            StrategyKind::TimingBased => "timing-based",
            StrategyKind::RelationshipBuilding => "relationship-building",
            StrategyKind::BundleDeal => "bundle-deal",
        }
    }

    /// Human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            StrategyKind::DirectNegotiation => "Direct Price Negotiation",
            StrategyKind::MarketComparison => "Market Comparison Approach",
            StrategyKind::TimingBased => "Timing-based Strategy",
            StrategyKind::RelationshipBuilding => "Relationship Building",
            StrategyKind::BundleDeal => "Bundle Deal Strategy",
        }
    }
}

/// A ranked negotiation recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationStrategy {
    #[serde(rename = "id")]
    pub kind: StrategyKind,
    pub title: String,
    pub priority: Priority,
    pub description: String,
    pub tactics: Vec<String>,
    /// Expected success rate (0-100).
    pub success_rate: u8,
    /// Counter-offer to open with, when the rule computes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_price: Option<Price>,
}
