//! Freshness cache in front of a sample provider.

use crate::provider::{PriceSampleProvider, SampleQuery};
use async_trait::async_trait;
use fairprice_core::config::ServiceConfig;
use fairprice_core::{BoxError, PriceSample};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Caches successful sample fetches per query for `ttl`.
///
/// Failures are never cached.
pub struct CachedSampleProvider<P> {
    inner: P,
    ttl: Duration,
    entries: RwLock<HashMap<SampleQuery, (Instant, Vec<PriceSample>)>>,
}

impl<P: PriceSampleProvider> CachedSampleProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cache with the configured freshness window.
    pub fn from_config(inner: P, config: &ServiceConfig) -> Self {
        Self::new(inner, Duration::from_secs(config.cache_ttl_secs))
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Drop every cached entry.
    pub async fn invalidate(&self) {
        self.entries.write().await.clear();
    }

    async fn lookup(&self, query: &SampleQuery) -> Option<Vec<PriceSample>> {
        let entries = self.entries.read().await;
        entries
            .get(query)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, samples)| samples.clone())
    }
}

#[async_trait]
impl<P: PriceSampleProvider> PriceSampleProvider for CachedSampleProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_samples(&self, query: &SampleQuery) -> Result<Vec<PriceSample>, BoxError> {
        if let Some(samples) = self.lookup(query).await {
            debug!(commodity = %query.commodity, "sample cache hit");
            return Ok(samples);
        }

        let samples = self.inner.fetch_samples(query).await?;
        let mut entries = self.entries.write().await;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        entries.insert(query.clone(), (Instant::now(), samples.clone()));
        Ok(samples)
    }
}
