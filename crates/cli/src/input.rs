//! Request files and in-memory service wiring.

use anyhow::{Context, Result};
use fairprice_core::{Config, Price, PriceSample, TrendPeriod, TrendPoint};
use fairprice_service::{
    CachedSampleProvider, CommodityCatalog, PriceCheckRequest, PriceCheckService, StaticCatalog,
    StaticSampleProvider, StaticSeriesProvider,
};
use serde::Deserialize;
use std::path::Path;

pub type FileService = PriceCheckService<
    CachedSampleProvider<StaticSampleProvider>,
    StaticSeriesProvider,
    StaticCatalog,
>;

/// A self-contained price check: the quote plus the market data to judge it by.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestFile {
    pub commodity: String,
    #[serde(default)]
    pub location: Option<String>,
    pub quoted_price: Price,
    #[serde(default = "default_period")]
    pub period: TrendPeriod,
    #[serde(default)]
    pub samples: Vec<PriceSample>,
    #[serde(default)]
    pub trend_points: Vec<TrendPoint>,
}

fn default_period() -> TrendPeriod {
    TrendPeriod::Month
}

impl RequestFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid request file {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn request(&self) -> PriceCheckRequest {
        PriceCheckRequest {
            commodity: self.commodity.clone(),
            location: self.location.clone(),
            quoted_price: self.quoted_price,
            period: self.period,
            from: None,
            to: None,
        }
    }

    /// Build a service over the staples catalog and this file's data.
    ///
    /// Commodities outside the catalog are registered under their own name.
    /// Samples are cached for `service.cache_ttl_secs`.
    pub fn into_service(self, config: &Config) -> FileService {
        let mut catalog = StaticCatalog::indian_staples();
        let id = match catalog.resolve(&self.commodity) {
            Some(found) => found.id,
            None => catalog.insert(&self.commodity),
        };

        let samples = StaticSampleProvider::new().with_samples(id.clone(), self.samples);
        PriceCheckService::new(
            config,
            CachedSampleProvider::from_config(samples, &config.service),
            StaticSeriesProvider::new().with_series(id, self.trend_points),
            catalog,
        )
    }
}
