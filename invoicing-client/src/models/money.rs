//! Currency arithmetic for line and invoice totals.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places carried by every currency amount.
pub const CURRENCY_SCALE: u32 = 2;

/// Smallest accepted unit price (0.01).
pub fn min_unit_price() -> Decimal {
    Decimal::new(1, CURRENCY_SCALE)
}

/// Largest accepted unit price: ten digits, two of them after the point.
pub fn max_unit_price() -> Decimal {
    Decimal::new(9_999_999_999, CURRENCY_SCALE)
}

/// Round to currency precision, half away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// `quantity × unit_price` at currency precision, or `None` on overflow.
pub fn line_total(quantity: u32, unit_price: Decimal) -> Option<Decimal> {
    Decimal::from(quantity)
        .checked_mul(unit_price)
        .map(round_currency)
}

/// Sum of `amounts` at currency precision, or `None` on overflow.
pub fn checked_sum<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(amount))
        .map(round_currency)
}

/// True when `amount` needs more than two decimal places.
pub fn exceeds_currency_scale(amount: Decimal) -> bool {
    amount.normalize().scale() > CURRENCY_SCALE
}

/// Format an amount with exactly two decimal places.
pub fn format_currency(amount: Decimal) -> String {
    format!("{:.2}", round_currency(amount))
}
