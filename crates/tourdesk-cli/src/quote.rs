use rust_decimal::Decimal;
use tourdesk_core::{
    validate_amount, validate_margin, CoreError, FinancialInputs, FinancialSummary, PriceSource,
    PricedLine,
};

/// Price a set of item costs the same way the server does.
///
/// # Errors
///
/// Returns [`CoreError::AmountOutOfRange`] when a cost, the margin or the
/// fixed price falls outside what a tour record can store.
pub(crate) fn build_quote(
    costs: &[Decimal],
    margin: Decimal,
    price: Option<Decimal>,
    pax: i32,
) -> Result<FinancialSummary, CoreError> {
    let lines = costs
        .iter()
        .map(|&cost| {
            validate_amount("cost", cost).map(|cost_price| PricedLine {
                cost_price,
                sales_price: Decimal::ZERO,
            })
        })
        .collect::<Result<Vec<_>, CoreError>>()?;
    let margin = validate_margin("margin", margin)?;
    let price = price.map(|p| validate_amount("price", p)).transpose()?;

    Ok(FinancialSummary::compute(&FinancialInputs {
        lines: &lines,
        margin_percent: margin,
        saved_selling_price: price,
        price_source: if price.is_some() {
            PriceSource::Manual
        } else {
            PriceSource::Margin
        },
        total_pax: pax,
    }))
}

/// # Errors
///
/// Returns an error if any input is out of range.
pub(crate) fn run_quote(
    costs: &[Decimal],
    margin: Decimal,
    price: Option<Decimal>,
    pax: i32,
) -> anyhow::Result<()> {
    let quote = build_quote(costs, margin, price, pax)?;

    println!("{:<20}{}", "base cost", quote.total_base_cost.round_dp(2));
    println!("{:<20}{}%", "margin", quote.margin_percent);
    println!("{:<20}{}", "recommended price", quote.recommended_price.round_dp(2));
    println!(
        "{:<20}{} ({})",
        "selling price",
        quote.selling_price.round_dp(2),
        quote.price_source
    );
    println!("{:<20}{}", "net profit", quote.net_profit.round_dp(2));
    println!("{:<20}{}%", "actual margin", quote.actual_margin.round_dp(2));
    match quote.cost_per_pax {
        Some(per_pax) => println!("{:<20}{}", "per person", per_pax.round_dp(2)),
        None => println!("{:<20}n/a", "per person"),
    }
    Ok(())
}
