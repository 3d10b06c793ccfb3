//! Money
//!
//! Amounts are carried as [`Money`] in minor units (paise for INR). Every
//! rounding step goes through [`round_minor`], which rounds half away from
//! zero, so a value rounded here is exactly a two-decimal major amount.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};

/// Number of decimal places between major and minor units.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Round a decimal amount of minor units to a whole number of minor units.
///
/// Values outside the `i64` range saturate instead of panicking.
pub fn round_minor(value: Decimal) -> i64 {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    rounded.to_i64().unwrap_or(if rounded.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// `percent`% of `minor`, rounded to a whole minor unit.
pub fn percent_of_minor(minor: i64, percent: Decimal) -> i64 {
    Decimal::from(minor)
        .checked_mul(percent)
        .and_then(|applied| applied.checked_div(Decimal::ONE_HUNDRED))
        .map_or(0, round_minor)
}

/// Half of `minor`, rounded to a whole minor unit.
///
/// Odd amounts round away from zero, so `5` paise halves to `3`.
pub fn half_of_minor(minor: i64) -> i64 {
    round_minor(Decimal::from(minor) / Decimal::TWO)
}

/// Convert a major-unit decimal (e.g. `299.99`) to minor units.
///
/// Returns `None` when the amount does not fit in an `i64`.
pub fn minor_from_major(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|minor| minor.to_i64())
}

/// Major-unit decimal for a minor-unit amount, always with two decimals.
pub fn major_from_minor(minor: i64) -> Decimal {
    Decimal::new(minor, MINOR_UNIT_SCALE)
}

/// Major-unit decimal for a money value.
pub fn to_major(money: &Money<'_, Currency>) -> Decimal {
    major_from_minor(money.to_minor_units())
}

/// Sum minor-unit amounts, saturating on overflow.
pub fn sum_minor(amounts: impl IntoIterator<Item = i64>) -> i64 {
    amounts.into_iter().fold(0, i64::saturating_add)
}
