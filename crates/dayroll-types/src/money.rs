//! Fixed-precision monetary values.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for committed prices.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a price to [`MONEY_SCALE`] decimal places, half away from zero.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
