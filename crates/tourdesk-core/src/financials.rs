//! Tour pricing: base cost, recommended price, profit and per-person cost.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Which field the operator edited last; that field owns the selling price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    /// Selling price follows the margin slider.
    #[default]
    Margin,
    /// Selling price was typed in and is kept as-is.
    Manual,
}

impl PriceSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PriceSource::Margin => "margin",
            PriceSource::Manual => "manual",
        }
    }
}

impl std::fmt::Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceSource {
    type Err = CoreError;

    /// Accepts `margin`, or `manual`/`price` for a typed-in selling price.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "margin" => Ok(PriceSource::Margin),
            "manual" | "price" => Ok(PriceSource::Manual),
            _ => Err(CoreError::InvalidPriceSource(s.to_string())),
        }
    }
}

/// Largest amount a money column (`NUMERIC(12, 2)`) holds: 9,999,999,999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Upper bound for a profit margin, in percent.
pub const MAX_MARGIN_PERCENT: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Round `value` to cents and check it fits a money column.
///
/// # Errors
///
/// Returns [`CoreError::AmountOutOfRange`] for a negative amount or one above
/// [`MAX_AMOUNT`] after rounding.
pub fn validate_amount(field: &'static str, value: Decimal) -> Result<Decimal, CoreError> {
    let rounded = value.round_dp(2);
    if (rounded.is_sign_negative() && !rounded.is_zero()) || rounded > MAX_AMOUNT {
        return Err(CoreError::AmountOutOfRange {
            field,
            max: MAX_AMOUNT,
        });
    }
    Ok(rounded)
}

/// # Errors
///
/// Returns [`CoreError::AmountOutOfRange`] outside `0..=MAX_MARGIN_PERCENT`.
pub fn validate_margin(field: &'static str, margin: Decimal) -> Result<Decimal, CoreError> {
    let rounded = margin.round_dp(2);
    if (rounded.is_sign_negative() && !rounded.is_zero()) || rounded > MAX_MARGIN_PERCENT {
        return Err(CoreError::AmountOutOfRange {
            field,
            max: MAX_MARGIN_PERCENT,
        });
    }
    Ok(rounded)
}

/// Cost and sale price of one itinerary item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PricedLine {
    pub cost_price: Decimal,
    pub sales_price: Decimal,
}

#[must_use]
pub fn total_base_cost(lines: &[PricedLine]) -> Decimal {
    lines.iter().map(|l| l.cost_price).sum()
}

#[must_use]
pub fn total_sales_value(lines: &[PricedLine]) -> Decimal {
    lines.iter().map(|l| l.sales_price).sum()
}

/// `base × (1 + margin / 100)`.
#[must_use]
pub fn recommended_price(base: Decimal, margin_percent: Decimal) -> Decimal {
    base * (Decimal::ONE + margin_percent / Decimal::ONE_HUNDRED)
}

/// Net profit as a percentage of base cost; zero when there is no cost.
#[must_use]
pub fn actual_margin(net_profit: Decimal, base: Decimal) -> Decimal {
    if base.is_zero() {
        return Decimal::ZERO;
    }
    net_profit
        .checked_div(base)
        .map_or(Decimal::ZERO, |ratio| ratio * Decimal::ONE_HUNDRED)
}

#[must_use]
pub fn cost_per_pax(selling_price: Decimal, total_pax: i32) -> Option<Decimal> {
    if total_pax <= 0 {
        return None;
    }
    selling_price.checked_div(Decimal::from(total_pax))
}

/// Parse a form value; blank or malformed input becomes zero.
#[must_use]
pub fn coerce_decimal(raw: &str) -> Decimal {
    raw.trim().parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

#[derive(Debug, Clone, Copy)]
pub struct FinancialInputs<'a> {
    pub lines: &'a [PricedLine],
    pub margin_percent: Decimal,
    pub saved_selling_price: Option<Decimal>,
    pub price_source: PriceSource,
    pub total_pax: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinancialSummary {
    pub total_base_cost: Decimal,
    pub total_sales_value: Decimal,
    pub margin_percent: Decimal,
    pub recommended_price: Decimal,
    pub selling_price: Decimal,
    pub price_source: PriceSource,
    pub net_profit: Decimal,
    pub actual_margin: Decimal,
    pub cost_per_pax: Option<Decimal>,
}

impl FinancialSummary {
    /// Compute the pricing summary for a tour.
    ///
    /// A saved non-zero price is honored only while the price source is
    /// [`PriceSource::Manual`]; otherwise the recommendation is used and the
    /// reported source is [`PriceSource::Margin`].
    #[must_use]
    pub fn compute(inputs: &FinancialInputs<'_>) -> Self {
        let total_base_cost = total_base_cost(inputs.lines);
        let recommended = recommended_price(total_base_cost, inputs.margin_percent);

        let manual_price = match inputs.price_source {
            PriceSource::Manual => inputs.saved_selling_price.filter(|p| !p.is_zero()),
            PriceSource::Margin => None,
        };
        let (selling_price, price_source) = match manual_price {
            Some(price) => (price, PriceSource::Manual),
            None => (recommended, PriceSource::Margin),
        };

        let net_profit = selling_price - total_base_cost;

        Self {
            total_base_cost,
            total_sales_value: total_sales_value(inputs.lines),
            margin_percent: inputs.margin_percent,
            recommended_price: recommended,
            selling_price,
            price_source,
            net_profit,
            actual_margin: actual_margin(net_profit, total_base_cost),
            cost_per_pax: cost_per_pax(selling_price, inputs.total_pax),
        }
    }
}
