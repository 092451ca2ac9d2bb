//! Progressive income tax over a marginal rate schedule.

use rust_decimal::Decimal;

use crate::TaxBracket;
use crate::calculations::common::INCOME_EPSILON;

/// Tax owed on `taxable_income` under an ordered bracket table.
///
/// Income fills each bracket in turn at that bracket's rate. The walk stops
/// once less than [`INCOME_EPSILON`] remains, and taxable income below that
/// threshold (including any negative amount) owes nothing.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::TaxBracket;
/// use tax_core::calculations::bracket_tax::tax_from_brackets;
///
/// let brackets = vec![
///     TaxBracket::new(Some(dec!(9700)), dec!(0.10)),
///     TaxBracket::new(Some(dec!(39475)), dec!(0.12)),
///     TaxBracket::new(None, dec!(0.22)),
/// ];
///
/// assert_eq!(tax_from_brackets(&brackets, dec!(7800)), dec!(780));
/// assert_eq!(tax_from_brackets(&brackets, dec!(20000)), dec!(2206));
/// assert_eq!(tax_from_brackets(&brackets, dec!(-500)), dec!(0));
/// ```
pub fn tax_from_brackets(
    brackets: &[TaxBracket],
    taxable_income: Decimal,
) -> Decimal {
    if taxable_income < INCOME_EPSILON {
        return Decimal::ZERO;
    }

    let mut remaining = taxable_income;
    let mut due = Decimal::ZERO;
    let mut bracket_start = Decimal::ZERO;

    for bracket in brackets {
        let in_bracket = match bracket.max_income {
            Some(bracket_end) => remaining.min(bracket_end - bracket_start),
            None => remaining,
        };

        due += bracket.tax_rate * in_bracket;
        remaining -= in_bracket;

        if remaining < INCOME_EPSILON {
            break;
        }

        if let Some(bracket_end) = bracket.max_income {
            bracket_start = bracket_end;
        }
    }

    due
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{FilingStatus, TaxTables, TaxYear};

    fn single_2019() -> &'static [TaxBracket] {
        TaxTables::builtin().brackets(TaxYear::Y2019, FilingStatus::Single)
    }

    #[test]
    fn zero_income_owes_nothing() {
        assert_eq!(tax_from_brackets(single_2019(), dec!(0)), dec!(0));
    }

    #[test]
    fn negative_income_owes_nothing() {
        assert_eq!(tax_from_brackets(single_2019(), dec!(-12200)), dec!(0));
    }

    #[test]
    fn income_below_epsilon_owes_nothing() {
        assert_eq!(tax_from_brackets(single_2019(), dec!(0.09)), dec!(0));
    }

    #[test]
    fn first_bracket_only() {
        assert_eq!(tax_from_brackets(single_2019(), dec!(7800)), dec!(780.00));
    }

    #[test]
    fn exactly_fills_first_bracket() {
        assert_eq!(tax_from_brackets(single_2019(), dec!(9700)), dec!(970.00));
    }

    #[test]
    fn spans_two_brackets() {
        // 9700 * 0.10 + (30000 - 9700) * 0.12 = 970 + 2436
        assert_eq!(tax_from_brackets(single_2019(), dec!(30000)), dec!(3406.00));
    }

    #[test]
    fn reaches_top_bracket() {
        // 970 + 3573 + 9839.5 + 18366 + 13880 + 107170 + (600000 - 510300) * 0.37
        assert_eq!(
            tax_from_brackets(single_2019(), dec!(600000)),
            dec!(186987.50)
        );
    }

    #[test]
    fn empty_table_owes_nothing() {
        assert_eq!(tax_from_brackets(&[], dec!(50000)), dec!(0));
    }
}
