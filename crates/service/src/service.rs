//! End-to-end price check.

use crate::catalog::{Commodity, CommodityCatalog};
use crate::provider::{PriceSampleProvider, SampleQuery, SeriesQuery, TrendSeriesProvider};
use crate::retry::RetryPolicy;
use chrono::{DateTime, Utc};
use fairprice_analytics::{SampleAggregator, TrendAnalyzer};
use fairprice_core::{
    Config, Error, NegotiationStrategy, Price, PriceRange, PriceSample, PriceTrend,
    PriceVerification, Result, TrendPeriod,
};
use fairprice_negotiation::{PriceVerifier, StrategyEngine};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// A quote to check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCheckRequest {
    /// Free-text commodity name, resolved through the catalog.
    pub commodity: String,
    #[serde(default)]
    pub location: Option<String>,
    pub quoted_price: Price,
    pub period: TrendPeriod,
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

/// Everything computed for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceReport {
    pub commodity: Commodity,
    pub range: PriceRange,
    /// `None` when the series was too short to analyze.
    pub trend: Option<PriceTrend>,
    pub verification: PriceVerification,
    /// Closest comparables, capped for display.
    pub highlighted_comparables: Vec<PriceSample>,
    pub strategies: Vec<NegotiationStrategy>,
}

/// Composes providers and the analysis stages.
pub struct PriceCheckService<S, T, C> {
    samples: S,
    series: T,
    catalog: C,
    aggregator: SampleAggregator,
    analyzer: TrendAnalyzer,
    verifier: PriceVerifier,
    engine: StrategyEngine,
    retry: RetryPolicy,
    display_cap: usize,
}

impl<S, T, C> PriceCheckService<S, T, C>
where
    S: PriceSampleProvider,
    T: TrendSeriesProvider,
    C: CommodityCatalog,
{
    pub fn new(config: &Config, samples: S, series: T, catalog: C) -> Self {
        Self {
            samples,
            series,
            catalog,
            aggregator: SampleAggregator::new(config.aggregation.clone()),
            analyzer: TrendAnalyzer::new(config.trend.clone()),
            verifier: PriceVerifier::new(config.verification.clone()),
            engine: StrategyEngine::new(config.strategy.clone()),
            retry: RetryPolicy::from_config(&config.service),
            display_cap: config.service.display_comparable_cap,
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run a full check.
    ///
    /// Fails on an unknown commodity, provider errors after retries, no
    /// comparable samples, or an invalid quote. A series too short for
    /// trend analysis is not an error.
    #[instrument(
        skip(self, request),
        fields(commodity = %request.commodity, quoted_price = request.quoted_price)
    )]
    pub async fn check(&self, request: &PriceCheckRequest) -> Result<PriceReport> {
        let commodity = self
            .catalog
            .resolve(&request.commodity)
            .ok_or_else(|| Error::unknown_commodity(request.commodity.clone()))?;

        let query = SampleQuery {
            commodity: commodity.id.clone(),
            location: request.location.clone(),
            from: request.from,
            to: request.to,
        };
        let samples = self.fetch_samples(&query).await?;
        let range = self.aggregator.aggregate(&samples)?;
        let verification = self.verifier.verify(request.quoted_price, &range, &samples)?;

        let trend = self.trend_for(&commodity, request.period).await?;
        let label = commodity.name.to_lowercase();
        let strategies = self
            .engine
            .generate_for(&label, &verification, trend.as_ref());

        info!(
            commodity = %commodity.id,
            verdict = ?verification.verdict,
            percentage = verification.deviation.percentage,
            strategies = strategies.len(),
            "price check complete"
        );

        Ok(PriceReport {
            highlighted_comparables: verification.top_comparables(self.display_cap).to_vec(),
            commodity,
            range,
            trend,
            verification,
            strategies,
        })
    }

    async fn fetch_samples(&self, query: &SampleQuery) -> Result<Vec<PriceSample>> {
        let provider = &self.samples;
        self.retry
            .run(provider.name(), move || provider.fetch_samples(query))
            .await
    }

    async fn trend_for(
        &self,
        commodity: &Commodity,
        period: TrendPeriod,
    ) -> Result<Option<PriceTrend>> {
        let query = SeriesQuery {
            commodity: commodity.id.clone(),
            period,
        };
        let provider = &self.series;
        let query = &query;
        let points = self
            .retry
            .run(provider.name(), move || provider.fetch_series(query))
            .await?;

        match self.analyzer.analyze(&points, period) {
            Ok(trend) => Ok(Some(trend)),
            Err(err) if err.is_insufficient_data() => {
                warn!(
                    commodity = %commodity.id,
                    points = points.len(),
                    "series too short, skipping trend"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
