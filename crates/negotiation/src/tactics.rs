//! Phrasing templates for strategy descriptions and tactics.
//!
//! Pure text. Which strategies apply, and with what priority, is decided
//! in `strategy`.

use fairprice_core::{Forecast, Price, PriceVerification, TrendDirection};

/// Format a per-quintal rupee amount.
pub fn rupees(price: Price) -> String {
    format!("₹{price:.0}/quintal")
}

pub fn direct_overpriced(
    commodity: &str,
    verification: &PriceVerification,
    target: Price,
) -> (String, Vec<String>) {
    let description = format!(
        "The quote is {:.1}% above the market price of {}. \
         Counter with {} and negotiate down from there.",
        verification.deviation.percentage,
        rupees(verification.market_price),
        rupees(target),
    );
    let tactics = vec![
        format!("Open at {} for {commodity}", rupees(target)),
        format!(
            "Cite the market average of {} as your reference",
            rupees(verification.market_price)
        ),
        format!(
            "Do not move above {} in one step",
            rupees((target + verification.quoted_price) / 2.0)
        ),
        "Be ready to walk away if the seller will not move".to_string(),
    ];
    (description, tactics)
}

pub fn direct_underpriced(
    commodity: &str,
    verification: &PriceVerification,
) -> (String, Vec<String>) {
    let description = format!(
        "The quote is {:.1}% below the market price of {}. No counter-offer is needed.",
        verification.deviation.percentage.abs(),
        rupees(verification.market_price),
    );
    let tactics = vec![
        format!(
            "Accept {} for {commodity} before the seller revisits it",
            rupees(verification.quoted_price)
        ),
        "Inspect quality and moisture before committing".to_string(),
        "Ask to lock the price in for a larger quantity".to_string(),
    ];
    (description, tactics)
}

pub fn market_comparison(
    commodity: &str,
    verification: &PriceVerification,
    low: Price,
    high: Price,
) -> (String, Vec<String>) {
    let count = verification.comparable_markets.len();
    let description = format!(
        "Use {count} comparable markets, quoting {} to {}, to anchor the negotiation.",
        rupees(low),
        rupees(high),
    );
    let mut tactics = Vec::with_capacity(3);
    if let Some(cheapest) = verification
        .comparable_markets
        .iter()
        .find(|s| s.price == low)
    {
        tactics.push(format!(
            "Point out that {} is selling {commodity} at {}",
            cheapest.location,
            rupees(low)
        ));
    }
    tactics.push(format!(
        "Show that the market average is {}",
        rupees(verification.market_price)
    ));
    tactics.push("Ask the seller to match the best nearby rate".to_string());
    (description, tactics)
}

pub fn timing(
    commodity: &str,
    direction: TrendDirection,
    forecast: Option<&Forecast>,
) -> (String, Vec<String>) {
    let (description, mut tactics) = match direction {
        TrendDirection::Rising => (
            "Prices are rising. Closing soon avoids paying more later, \
             so trade speed for a small discount."
                .to_string(),
            vec![
                format!("Offer to close the deal on {commodity} today in exchange for a discount"),
                "Avoid delaying, the next quote is likely higher".to_string(),
            ],
        ),
        TrendDirection::Falling => (
            "Prices are falling. Time is on your side, so delay or stage the purchase.".to_string(),
            vec![
                "Tell the seller you can wait for the market to settle".to_string(),
                format!("Buy only immediate needs of {commodity} now"),
            ],
        ),
        _ => (
            "Prices are volatile. Reduce exposure by splitting the purchase.".to_string(),
            vec![
                format!("Split the purchase of {commodity} into smaller lots"),
                "Agree on a price review clause for later deliveries".to_string(),
            ],
        ),
    };
    if let Some(forecast) = forecast {
        tactics.push(format!(
            "Expected next week: {}, next month: {}",
            rupees(forecast.next_week),
            rupees(forecast.next_month)
        ));
    }
    (description, tactics)
}

pub fn relationship(commodity: &str) -> (String, Vec<String>) {
    (
        "Build a long-term relationship with the seller for better prices on repeat orders."
            .to_string(),
        vec![
            format!("Propose regular purchases of {commodity} in return for a loyalty rate"),
            "Offer prompt payment terms".to_string(),
            "Ask for first call on fresh arrivals".to_string(),
        ],
    )
}

pub fn bundle(commodity: &str) -> (String, Vec<String>) {
    (
        "Combine purchases to negotiate a volume discount.".to_string(),
        vec![
            format!("Ask for a bulk rate on a larger order of {commodity}"),
            "Add other produce from the same seller to the deal".to_string(),
            "Request free transport or loading as part of the bundle".to_string(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rupees_format() {
        assert_eq!(rupees(2299.0), "₹2299/quintal");
        assert_eq!(rupees(2299.6), "₹2300/quintal");
    }

    #[test]
    fn test_timing_includes_forecast() {
        let forecast = Forecast {
            next_week: 2400.0,
            next_month: 2550.0,
            confidence: 0.9,
        };
        let (_, tactics) = timing("wheat", TrendDirection::Rising, Some(&forecast));
        assert!(tactics.last().unwrap().contains("₹2550/quintal"));

        let (_, without) = timing("wheat", TrendDirection::Rising, None);
        assert_eq!(without.len(), tactics.len() - 1);
    }

    #[test]
    fn test_commodity_threaded_into_tactics() {
        let (_, tactics) = bundle("onion");
        assert!(tactics[0].contains("onion"));
    }
}
