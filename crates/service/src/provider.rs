//! Data provider seams and in-memory implementations.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use fairprice_core::{BoxError, CommodityId, PriceSample, TrendPeriod, TrendPoint};
use std::collections::HashMap;

/// Filter for comparable price samples.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleQuery {
    pub commodity: CommodityId,
    /// Restrict to one market; `None` means all markets.
    pub location: Option<String>,
    /// Inclusive lower bound on sample time.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on sample time.
    pub to: Option<DateTime<Utc>>,
}

impl SampleQuery {
    pub fn for_commodity(commodity: CommodityId) -> Self {
        Self {
            commodity,
            location: None,
            from: None,
            to: None,
        }
    }

    /// Whether a sample passes the location and date filters.
    pub fn matches(&self, sample: &PriceSample) -> bool {
        let location_ok = self
            .location
            .as_deref()
            .map_or(true, |loc| sample.location.eq_ignore_ascii_case(loc));
        let from_ok = self.from.map_or(true, |from| sample.timestamp >= from);
        let to_ok = self.to.map_or(true, |to| sample.timestamp <= to);
        location_ok && from_ok && to_ok
    }
}

/// Request for a commodity's price series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesQuery {
    pub commodity: CommodityId,
    pub period: TrendPeriod,
}

/// Source of comparable price samples.
#[async_trait]
pub trait PriceSampleProvider: Send + Sync {
    /// Provider name used in errors and logs.
    fn name(&self) -> &str;

    /// Fetch samples matching `query`.
    async fn fetch_samples(&self, query: &SampleQuery) -> Result<Vec<PriceSample>, BoxError>;
}

/// Source of dated price series.
#[async_trait]
pub trait TrendSeriesProvider: Send + Sync {
    /// Provider name used in errors and logs.
    fn name(&self) -> &str;

    /// Fetch a series ordered by date.
    async fn fetch_series(&self, query: &SeriesQuery) -> Result<Vec<TrendPoint>, BoxError>;
}

/// Samples held in memory, keyed by commodity.
#[derive(Debug, Clone, Default)]
pub struct StaticSampleProvider {
    samples: HashMap<CommodityId, Vec<PriceSample>>,
}

impl StaticSampleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add samples for a commodity.
    pub fn insert(
        &mut self,
        commodity: CommodityId,
        samples: impl IntoIterator<Item = PriceSample>,
    ) {
        self.samples.entry(commodity).or_default().extend(samples);
    }

    pub fn with_samples(
        mut self,
        commodity: CommodityId,
        samples: impl IntoIterator<Item = PriceSample>,
    ) -> Self {
        self.insert(commodity, samples);
        self
    }
}

#[async_trait]
impl PriceSampleProvider for StaticSampleProvider {
    fn name(&self) -> &str {
        "static-samples"
    }

    async fn fetch_samples(&self, query: &SampleQuery) -> Result<Vec<PriceSample>, BoxError> {
        Ok(self
            .samples
            .get(&query.commodity)
            .map(|all| all.iter().filter(|s| query.matches(s)).cloned().collect())
            .unwrap_or_default())
    }
}

/// Series held in memory, keyed by commodity.
///
/// A fetch returns the points within `period.days()` of the latest point.
#[derive(Debug, Clone, Default)]
pub struct StaticSeriesProvider {
    series: HashMap<CommodityId, Vec<TrendPoint>>,
}

impl StaticSeriesProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the series for a commodity, sorted by date.
    pub fn insert(&mut self, commodity: CommodityId, points: impl IntoIterator<Item = TrendPoint>) {
        let mut points: Vec<TrendPoint> = points.into_iter().collect();
        points.sort_by_key(|p| p.date);
        self.series.insert(commodity, points);
    }

    pub fn with_series(
        mut self,
        commodity: CommodityId,
        points: impl IntoIterator<Item = TrendPoint>,
    ) -> Self {
        self.insert(commodity, points);
        self
    }
}

#[async_trait]
impl TrendSeriesProvider for StaticSeriesProvider {
    fn name(&self) -> &str {
        "static-series"
    }

    async fn fetch_series(&self, query: &SeriesQuery) -> Result<Vec<TrendPoint>, BoxError> {
        let Some(points) = self.series.get(&query.commodity) else {
            return Ok(Vec::new());
        };
        let Some(latest) = points.last().map(|p| p.date) else {
            return Ok(Vec::new());
        };
        let cutoff = latest - Duration::days(query.period.days());
        Ok(points.iter().filter(|p| p.date > cutoff).cloned().collect())
    }
}
