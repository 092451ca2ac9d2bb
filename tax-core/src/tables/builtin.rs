//! Rate tables published for the 2019 and 2020 tax years.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{DependentCount, EitcParameters, FilingStatus, TaxBracket, TaxYear};

/// Marginal rates in percent, shared by every schedule in both years.
const BRACKET_RATES: [i64; 7] = [10, 12, 22, 24, 32, 35, 37];

/// Upper bounds of every bracket but the top one, which is unbounded.
type BracketBounds = [i64; 6];

const BOUNDS_SINGLE_2019: BracketBounds = [9700, 39475, 84200, 160725, 204100, 510300];
const BOUNDS_HEAD_2019: BracketBounds = [13850, 52850, 84200, 160700, 204100, 510300];
const BOUNDS_MARRIED_2019: BracketBounds = [19400, 78950, 168400, 321450, 408200, 612350];
const BOUNDS_SEPARATELY_2019: BracketBounds = [9700, 39475, 84200, 160725, 204100, 306175];

const BOUNDS_SINGLE_2020: BracketBounds = [9875, 40125, 85525, 163300, 207350, 518400];
const BOUNDS_HEAD_2020: BracketBounds = [14100, 53700, 85500, 163300, 207350, 518400];
const BOUNDS_MARRIED_2020: BracketBounds = [19750, 80250, 171050, 326600, 414700, 622050];
const BOUNDS_SEPARATELY_2020: BracketBounds = [9875, 40125, 85525, 163300, 207350, 311025];

fn build_brackets(bounds: &BracketBounds) -> Vec<TaxBracket> {
    BRACKET_RATES
        .iter()
        .enumerate()
        .map(|(i, &rate)| {
            let max_income = bounds.get(i).map(|&bound| Decimal::from(bound));
            TaxBracket::new(max_income, Decimal::new(rate, 2))
        })
        .collect()
}

pub(crate) fn brackets(
    year: TaxYear,
    filing_status: FilingStatus,
) -> Vec<TaxBracket> {
    let bounds = match (year, filing_status) {
        (TaxYear::Y2019, FilingStatus::Single) => &BOUNDS_SINGLE_2019,
        (TaxYear::Y2019, FilingStatus::HeadOfHousehold) => &BOUNDS_HEAD_2019,
        (TaxYear::Y2019, FilingStatus::Married) => &BOUNDS_MARRIED_2019,
        (TaxYear::Y2019, FilingStatus::Separately) => &BOUNDS_SEPARATELY_2019,
        (TaxYear::Y2020, FilingStatus::Single) => &BOUNDS_SINGLE_2020,
        (TaxYear::Y2020, FilingStatus::HeadOfHousehold) => &BOUNDS_HEAD_2020,
        (TaxYear::Y2020, FilingStatus::Married) => &BOUNDS_MARRIED_2020,
        (TaxYear::Y2020, FilingStatus::Separately) => &BOUNDS_SEPARATELY_2020,
    };
    build_brackets(bounds)
}

/// The schedule used when a table has no row for a year and status.
pub(crate) fn base_brackets() -> Vec<TaxBracket> {
    build_brackets(&BOUNDS_SINGLE_2019)
}

pub(crate) fn standard_deduction(
    year: TaxYear,
    filing_status: FilingStatus,
) -> Decimal {
    match (year, filing_status) {
        (TaxYear::Y2019, FilingStatus::Single | FilingStatus::Separately) => dec!(12200),
        (TaxYear::Y2019, FilingStatus::HeadOfHousehold) => dec!(18350),
        (TaxYear::Y2019, FilingStatus::Married) => dec!(24400),
        (TaxYear::Y2020, FilingStatus::Single | FilingStatus::Separately) => dec!(12400),
        (TaxYear::Y2020, FilingStatus::HeadOfHousehold) => dec!(18650),
        (TaxYear::Y2020, FilingStatus::Married) => dec!(24800),
    }
}

// 2020 phase-in thresholds repeat the 2019 figures.
pub(crate) fn eitc_parameters(
    year: TaxYear,
    dependents: DependentCount,
) -> EitcParameters {
    let (cap, phase_in_complete, start_single, complete_single, start_joint, complete_joint) =
        match (year, dependents) {
            (TaxYear::Y2019, DependentCount::None) => (529, 6920, 8650, 15570, 14450, 21370),
            (TaxYear::Y2019, DependentCount::One) => (3526, 10370, 19030, 41094, 24820, 46884),
            (TaxYear::Y2019, DependentCount::Two) => (5828, 14570, 19030, 46703, 24820, 52493),
            (TaxYear::Y2019, DependentCount::ThreeOrMore) => {
                (6557, 14570, 19030, 50162, 24820, 55592)
            }
            (TaxYear::Y2020, DependentCount::None) => (538, 6920, 8790, 15820, 14680, 21710),
            (TaxYear::Y2020, DependentCount::One) => (3584, 10370, 19330, 41756, 25220, 47646),
            (TaxYear::Y2020, DependentCount::Two) => (5920, 14570, 19330, 47440, 25220, 53300),
            (TaxYear::Y2020, DependentCount::ThreeOrMore) => {
                (6660, 14570, 19330, 50954, 25220, 56844)
            }
        };

    EitcParameters {
        cap: Decimal::from(cap),
        phase_in_complete: Decimal::from(phase_in_complete),
        phase_out_start_joint: Decimal::from(start_joint),
        phase_out_complete_joint: Decimal::from(complete_joint),
        phase_out_start_single: Decimal::from(start_single),
        phase_out_complete_single: Decimal::from(complete_single),
    }
}
