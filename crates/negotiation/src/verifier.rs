//! Quote verification against an aggregated market range.

use chrono::{DateTime, Utc};
use fairprice_core::config::VerificationConfig;
use fairprice_core::{
    Deviation, Error, Price, PriceRange, PriceSample, PriceVerification, Result, Verdict,
};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use tracing::debug;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Price verifier.
#[derive(Debug, Clone, Default)]
pub struct PriceVerifier {
    config: VerificationConfig,
}

impl PriceVerifier {
    /// Create a new price verifier.
    pub fn new(config: VerificationConfig) -> Self {
        Self { config }
    }

    /// Verify a quoted price against `range.average`.
    pub fn verify(
        &self,
        quoted_price: Price,
        range: &PriceRange,
        comparable_markets: &[PriceSample],
    ) -> Result<PriceVerification> {
        if !quoted_price.is_finite() || quoted_price <= 0.0 {
            return Err(Error::invalid_price(format!(
                "quoted price must be positive, got {quoted_price}"
            )));
        }
        let market_price = range.average;
        if !market_price.is_finite() || market_price <= 0.0 {
            return Err(Error::invalid_price(format!(
                "market price must be positive, got {market_price}"
            )));
        }

        let deviation = Deviation::between(quoted_price, market_price);
        let verdict = self.classify(deviation.percentage);
        let confidence = self.confidence(comparable_markets);
        let comparable_markets = rank_comparables(market_price, comparable_markets);

        debug!(
            quoted_price,
            market_price,
            percentage = deviation.percentage,
            ?verdict,
            confidence,
            comparables = comparable_markets.len(),
            "verified quote"
        );

        Ok(PriceVerification {
            quoted_price,
            market_price,
            deviation,
            verdict,
            confidence,
            comparable_markets,
            negotiation_suggestion: suggestion(verdict, market_price),
            last_updated: range.last_updated,
        })
    }

    /// Map a signed deviation percentage to a verdict.
    ///
    /// `[-fair, fair]` is fair; `(fair, extreme]` high; above extreme very
    /// high; mirrored below zero.
    pub fn classify(&self, percentage: f64) -> Verdict {
        let fair = self.config.fair_pct;
        let extreme = self.config.extreme_pct;

        if percentage > extreme {
            Verdict::VeryHigh
        } else if percentage > fair {
            Verdict::High
        } else if percentage >= -fair {
            Verdict::Fair
        } else if percentage >= -extreme {
            Verdict::Low
        } else {
            Verdict::VeryLow
        }
    }

    /// Weighted mean of comparable confidences, scaled down below
    /// `full_power_samples` comparables. Zero without comparables.
    pub fn confidence(&self, comparables: &[PriceSample]) -> f64 {
        let Some(newest) = comparables.iter().map(|s| s.timestamp).max() else {
            return 0.0;
        };

        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for sample in comparables {
            let w = self.weight(sample.timestamp, newest);
            weighted += w * sample.confidence.clamp(0.0, 1.0);
            total_weight += w;
        }
        if total_weight <= 0.0 {
            return 0.0;
        }

        let power = (comparables.len() as f64 / self.config.full_power_samples as f64).min(1.0);
        (weighted / total_weight * power).clamp(0.0, 1.0)
    }

    fn weight(&self, at: DateTime<Utc>, newest: DateTime<Utc>) -> f64 {
        match self.config.recency_half_life_days {
            Some(half_life) => {
                let age_days = (newest - at).num_seconds() as f64 / SECONDS_PER_DAY;
                0.5_f64.powf(age_days / half_life)
            }
            None => 1.0,
        }
    }
}

/// Rank comparables closest to `market_price` first.
///
/// Ties go to higher confidence, then to the more recent sample.
pub fn rank_comparables(market_price: Price, comparables: &[PriceSample]) -> Vec<PriceSample> {
    let mut ranked = comparables.to_vec();
    ranked.sort_by(|a, b| compare_for_rank(market_price, a, b));
    ranked
}

fn compare_for_rank(market_price: Price, a: &PriceSample, b: &PriceSample) -> Ordering {
    let dist_a = OrderedFloat((a.price - market_price).abs());
    let dist_b = OrderedFloat((b.price - market_price).abs());
    dist_a
        .cmp(&dist_b)
        .then_with(|| OrderedFloat(b.confidence).cmp(&OrderedFloat(a.confidence)))
        .then_with(|| b.timestamp.cmp(&a.timestamp))
}

fn suggestion(verdict: Verdict, market_price: Price) -> String {
    match verdict {
        Verdict::VeryHigh => format!(
            "Quote is well above market. Negotiate firmly down toward ₹{market_price:.0}/quintal."
        ),
        Verdict::High => format!(
            "Quote is above market. Ask for a price closer to ₹{market_price:.0}/quintal."
        ),
        Verdict::Fair => "Price is within market range, minor negotiation only.".to_string(),
        Verdict::Low => {
            "Quote is below market, a favorable position for the buyer.".to_string()
        }
        Verdict::VeryLow => format!(
            "Quote is well below the ₹{market_price:.0}/quintal market price, a favorable \
             position for the buyer. Check quality before committing."
        ),
    }
}
