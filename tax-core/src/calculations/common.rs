//! Shared arithmetic for the tax calculators.

use rust_decimal::Decimal;

/// Amounts below this are treated as exhausted when walking bracket tables.
pub const INCOME_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(486.955)), dec!(486.96));
/// assert_eq!(round_half_up(dec!(-486.955)), dec!(-486.96));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns how far `value` has travelled from `start` towards `end`, as a
/// fraction of the whole distance.
///
/// The result is `(start - value) / (start - end)`: `0` at `start`, `1` at
/// `end`, and between the two when `value` is. The same helper serves both
/// the phase-in ramp (`start = 0`) and the phase-out taper, where callers
/// take `1 - fraction`. A zero-width range yields `0`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::linear_interpolation;
///
/// assert_eq!(linear_interpolation(dec!(0), dec!(10000), dec!(2500)), dec!(0.25));
/// assert_eq!(linear_interpolation(dec!(20000), dec!(10000), dec!(12500)), dec!(0.75));
/// ```
pub fn linear_interpolation(
    start: Decimal,
    end: Decimal,
    value: Decimal,
) -> Decimal {
    let width = start - end;
    if width.is_zero() {
        return Decimal::ZERO;
    }
    (start - value) / width
}
