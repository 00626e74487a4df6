//! Rule-based negotiation strategy generation.
//!
//! Strategies come from a fixed, ordered table of rules. Each rule decides
//! inclusion on its own; the included strategies are then stably sorted by
//! priority weight, so equal-priority strategies keep table order.

use crate::tactics;
use fairprice_core::config::StrategyConfig;
use fairprice_core::{
    NegotiationStrategy, Price, PriceTrend, PriceVerification, Priority, StrategyKind,
    TrendDirection,
};
use std::cmp::Reverse;
use tracing::debug;

/// Commodity label used when the caller does not name one.
pub const DEFAULT_COMMODITY_LABEL: &str = "the produce";

/// Inputs every rule sees.
struct RuleInput<'a> {
    commodity: &'a str,
    verification: &'a PriceVerification,
    trend: Option<&'a PriceTrend>,
    config: &'a StrategyConfig,
}

/// One `(predicate, constructor)` pair in the rule table.
struct Rule {
    kind: StrategyKind,
    applies: fn(&RuleInput<'_>) -> bool,
    build: fn(&RuleInput<'_>) -> Terms,
}

/// What a rule decided; the engine turns it into a strategy.
struct Terms {
    priority: Priority,
    success_rate: u8,
    target_price: Option<Price>,
    description: String,
    tactics: Vec<String>,
}

/// Generation order. Also the tie-break order among equal priorities.
static RULES: [Rule; 5] = [
    Rule {
        kind: StrategyKind::DirectNegotiation,
        applies: direct_applies,
        build: direct_build,
    },
    Rule {
        kind: StrategyKind::MarketComparison,
        applies: comparison_applies,
        build: comparison_build,
    },
    Rule {
        kind: StrategyKind::TimingBased,
        applies: timing_applies,
        build: timing_build,
    },
    Rule {
        kind: StrategyKind::RelationshipBuilding,
        applies: always,
        build: relationship_build,
    },
    Rule {
        kind: StrategyKind::BundleDeal,
        applies: always,
        build: bundle_build,
    },
];

/// Negotiation strategy engine.
#[derive(Debug, Clone, Default)]
pub struct StrategyEngine {
    config: StrategyConfig,
}

impl StrategyEngine {
    /// Create a new strategy engine.
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    /// Generate ranked strategies with a neutral commodity label.
    pub fn generate(
        &self,
        verification: &PriceVerification,
        trend: Option<&PriceTrend>,
    ) -> Vec<NegotiationStrategy> {
        self.generate_for(DEFAULT_COMMODITY_LABEL, verification, trend)
    }

    /// Generate ranked strategies, naming `commodity` in the tactics.
    pub fn generate_for(
        &self,
        commodity: &str,
        verification: &PriceVerification,
        trend: Option<&PriceTrend>,
    ) -> Vec<NegotiationStrategy> {
        let input = RuleInput {
            commodity,
            verification,
            trend,
            config: &self.config,
        };

        let mut strategies: Vec<NegotiationStrategy> = RULES
            .iter()
            .filter(|rule| (rule.applies)(&input))
            .map(|rule| {
                let terms = (rule.build)(&input);
                NegotiationStrategy {
                    kind: rule.kind,
                    title: rule.kind.title().to_string(),
                    priority: terms.priority,
                    description: terms.description,
                    tactics: terms.tactics,
                    success_rate: terms.success_rate,
                    target_price: terms.target_price,
                }
            })
            .collect();

        // sort_by_key is stable.
        strategies.sort_by_key(|s| Reverse(s.priority.weight()));

        let direction = trend.map(|t| t.trend);
        let ids: Vec<&str> = strategies.iter().map(|s| s.kind.id()).collect();
        debug!(
            verdict = ?verification.verdict,
            trend = ?direction,
            strategies = ?ids,
            "generated negotiation strategies"
        );

        strategies
    }
}

fn always(_: &RuleInput<'_>) -> bool {
    true
}

fn direct_applies(input: &RuleInput<'_>) -> bool {
    input.verification.deviation.percentage.abs() > input.config.direct_min_pct
}

fn direct_build(input: &RuleInput<'_>) -> Terms {
    let v = input.verification;
    if v.deviation.percentage > 0.0 {
        let target = v.market_price
            + (v.quoted_price - v.market_price) * input.config.direct_anchor_fraction;
        let (description, tactics) = tactics::direct_overpriced(input.commodity, v, target);
        Terms {
            priority: Priority::High,
            success_rate: input.config.direct_overpriced_success,
            target_price: Some(target),
            description,
            tactics,
        }
    } else {
        let (description, tactics) = tactics::direct_underpriced(input.commodity, v);
        Terms {
            priority: Priority::High,
            success_rate: input.config.direct_underpriced_success,
            target_price: Some(v.quoted_price),
            description,
            tactics,
        }
    }
}

fn comparison_applies(input: &RuleInput<'_>) -> bool {
    input.verification.comparable_markets.len() >= input.config.market_comparison_min_samples
}

fn comparison_build(input: &RuleInput<'_>) -> Terms {
    let v = input.verification;
    let (low, high) = v
        .comparable_price_bounds()
        .unwrap_or((v.market_price, v.market_price));
    let priority = if v.deviation.percentage > input.config.market_comparison_high_pct {
        Priority::High
    } else {
        Priority::Medium
    };
    let (description, tactics) = tactics::market_comparison(input.commodity, v, low, high);
    Terms {
        priority,
        success_rate: input.config.market_comparison_success,
        target_price: None,
        description,
        tactics,
    }
}

/// Timing decision table. `None` means the rule is excluded.
///
/// | trend    | deviation % | priority | success  |
/// |----------|-------------|----------|----------|
/// | rising   | > 0         | high     | rising   |
/// | falling  | > 0         | high     | falling  |
/// | volatile | any         | medium   | volatile |
/// | other    |             | excluded |          |
fn timing_terms(input: &RuleInput<'_>) -> Option<(Priority, u8)> {
    let trend = input.trend?;
    let overpriced = input.verification.deviation.percentage > 0.0;
    match trend.trend {
        TrendDirection::Rising if overpriced => {
            Some((Priority::High, input.config.timing_rising_success))
        }
        TrendDirection::Falling if overpriced => {
            Some((Priority::High, input.config.timing_falling_success))
        }
        TrendDirection::Volatile => Some((Priority::Medium, input.config.timing_volatile_success)),
        _ => None,
    }
}

fn timing_applies(input: &RuleInput<'_>) -> bool {
    timing_terms(input).is_some()
}

fn timing_build(input: &RuleInput<'_>) -> Terms {
    let (priority, success_rate) =
        timing_terms(input).unwrap_or((Priority::Medium, input.config.timing_volatile_success));
    let direction = input.trend.map_or(TrendDirection::Volatile, |t| t.trend);
    let forecast = input.trend.and_then(|t| t.forecast.as_ref());
    let (description, tactics) = tactics::timing(input.commodity, direction, forecast);
    Terms {
        priority,
        success_rate,
        target_price: None,
        description,
        tactics,
    }
}

fn relationship_build(input: &RuleInput<'_>) -> Terms {
    let (description, tactics) = tactics::relationship(input.commodity);
    Terms {
        priority: Priority::Medium,
        success_rate: input.config.relationship_success,
        target_price: None,
        description,
        tactics,
    }
}

fn bundle_build(input: &RuleInput<'_>) -> Terms {
    let (description, tactics) = tactics::bundle(input.commodity);
    Terms {
        priority: Priority::Low,
        success_rate: input.config.bundle_success,
        target_price: None,
        description,
        tactics,
    }
}
