//! Orchestration for the fair-price engine.
//!
//! This crate handles:
//! - Async provider seams for price samples and series
//! - Retry with backoff and a sample freshness cache
//! - Commodity name resolution
//! - The end-to-end price check

pub mod cache;
pub mod catalog;
pub mod provider;
pub mod retry;
pub mod service;

pub use cache::CachedSampleProvider;
pub use catalog::{Commodity, CommodityCatalog, StaticCatalog};
pub use provider::{
    PriceSampleProvider, SampleQuery, SeriesQuery, StaticSampleProvider, StaticSeriesProvider,
    TrendSeriesProvider,
};
pub use retry::RetryPolicy;
pub use service::{PriceCheckRequest, PriceCheckService, PriceReport};
