//! Earned income tax credit.

use rust_decimal::Decimal;

use crate::calculations::common::linear_interpolation;
use crate::{EitcParameters, FilingStatus};

/// Credit for one filer under a parameter row.
///
/// The credit is piecewise linear in earned income:
///
/// | Income                                  | Credit                                    |
/// |-----------------------------------------|-------------------------------------------|
/// | income or AGI above phase-out complete  | 0                                         |
/// | above phase-out start                   | cap × (1 − fraction of phase-out covered) |
/// | above phase-in complete                 | cap                                       |
/// | otherwise                               | cap × fraction of phase-in covered        |
///
/// The phase-out range comes from [`EitcParameters::phase_out`], so only
/// married filers use the joint thresholds. No earned income, including a
/// negative amount, earns no credit.
pub fn earned_income_credit(
    parameters: &EitcParameters,
    filing_status: FilingStatus,
    earned_income: Decimal,
    agi: Decimal,
) -> Decimal {
    let (phase_out_start, phase_out_complete) = parameters.phase_out(filing_status);
    let cap = parameters.cap;

    if earned_income <= Decimal::ZERO
        || earned_income > phase_out_complete
        || agi > phase_out_complete
    {
        return Decimal::ZERO;
    }
    if earned_income > phase_out_start {
        let tapered = linear_interpolation(phase_out_start, phase_out_complete, earned_income);
        return (Decimal::ONE - tapered) * cap;
    }
    if earned_income > parameters.phase_in_complete {
        return cap;
    }
    linear_interpolation(Decimal::ZERO, parameters.phase_in_complete, earned_income) * cap
}
