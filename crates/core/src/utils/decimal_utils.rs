use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::PERCENT_BASE;

/// Rounds a money amount to `scale` places, half away from zero.
pub fn round_money(amount: Decimal, scale: u32) -> Decimal {
    amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// `percent`% of `base`, rounded to `scale` places.
pub fn percent_of(base: Decimal, percent: Decimal, scale: u32) -> Decimal {
    round_money(base * percent / Decimal::from(PERCENT_BASE), scale)
}

/// Clamps a distance figure at zero.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}
