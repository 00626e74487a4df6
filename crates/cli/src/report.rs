//! Plain-text rendering of a price report.

use fairprice_core::{Price, PriceSample};
use fairprice_service::PriceReport;
use std::fmt;

fn rupees(price: Price) -> String {
    format!("₹{price:.0}")
}

fn comparable_line(sample: &PriceSample) -> String {
    format!(
        "  - {:<16} {:>8}  ({:?}, {})",
        sample.location,
        rupees(sample.price),
        sample.source,
        sample.timestamp.format("%Y-%m-%d"),
    )
}

/// Text layout of a report.
pub struct TextReport<'a>(pub &'a PriceReport);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let v = &report.verification;
        let range = &report.range;
        let band = &range.fair_price_range;
        let verdict = v.verdict.meta();

        writeln!(f, "{} ({})", report.commodity.name, report.commodity.id)?;
        writeln!(
            f,
            "Quote {} vs market {}: {} {} ({:+.1}%)",
            rupees(v.quoted_price),
            rupees(v.market_price),
            verdict.icon,
            verdict.label,
            v.deviation.percentage,
        )?;
        writeln!(f, "Confidence {:.0}%", v.confidence * 100.0)?;
        writeln!(f, "{}", v.negotiation_suggestion)?;

        writeln!(f, "\nMarket range ({} samples)", range.sample_size)?;
        writeln!(
            f,
            "  min {}  median {}  max {}  sd {:.1}",
            rupees(range.min),
            rupees(range.median),
            rupees(range.max),
            range.standard_deviation,
        )?;
        let placement = if band.contains(v.quoted_price) {
            "quote inside"
        } else {
            "quote outside"
        };
        writeln!(
            f,
            "  fair {} - {} ({placement})",
            rupees(band.lower),
            rupees(band.upper),
        )?;
        if let Some(ci) = &range.confidence_interval {
            writeln!(
                f,
                "  {:.0}% CI {} - {}",
                ci.level * 100.0,
                rupees(ci.lower),
                rupees(ci.upper),
            )?;
        }
        writeln!(f, "  last updated {}", range.last_updated.format("%Y-%m-%d %H:%M UTC"))?;

        match &report.trend {
            Some(trend) => {
                let meta = trend.trend.meta();
                writeln!(
                    f,
                    "\nTrend ({}): {} {}  volatility {:.1}%",
                    trend.period,
                    meta.icon,
                    meta.label,
                    trend.volatility * 100.0,
                )?;
                if let Some(forecast) = &trend.forecast {
                    writeln!(
                        f,
                        "  forecast next week {}, next month {}",
                        rupees(forecast.next_week),
                        rupees(forecast.next_month),
                    )?;
                }
            }
            None => writeln!(f, "\nTrend: not enough data")?,
        }

        if !report.highlighted_comparables.is_empty() {
            writeln!(f, "\nClosest markets")?;
            for sample in &report.highlighted_comparables {
                writeln!(f, "{}", comparable_line(sample))?;
            }
        }

        writeln!(f, "\nStrategies")?;
        for strategy in &report.strategies {
            let priority = strategy.priority.meta();
            writeln!(
                f,
                "{} [{}] {} ({}% success)",
                priority.icon, priority.label, strategy.title, strategy.success_rate,
            )?;
            writeln!(f, "  {}", strategy.description)?;
            for tactic in &strategy.tactics {
                writeln!(f, "  * {tactic}")?;
            }
        }
        Ok(())
    }
}
