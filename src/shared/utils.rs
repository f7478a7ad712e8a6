//! Utility functions and helpers

use rust_decimal::{Decimal, RoundingStrategy};

/// Format a price with two decimals, e.g. `1299.90`
pub fn format_price(price: Decimal) -> String {
    format!("{:.2}", price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Format a percentage with one decimal, e.g. `18.8`
pub fn format_pct(pct: Decimal) -> String {
    format!("{:.1}", pct.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

/// Percentage drop from `reference` to `current`.
///
/// `None` when the reference is not positive or the result does not fit a `Decimal`.
pub fn calculate_discount_pct(reference: Decimal, current: Decimal) -> Option<Decimal> {
    if reference <= Decimal::ZERO {
        return None;
    }
    reference
        .checked_sub(current)?
        .checked_div(reference)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Arithmetic mean, `None` for an empty slice or when the sum overflows
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum = values.iter().try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))?;
    sum.checked_div(Decimal::from(values.len()))
}
