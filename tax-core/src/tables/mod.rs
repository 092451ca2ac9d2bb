//! Rate tables keyed by tax year, filing status and dependent count.
//!
//! [`TaxTables::builtin`] holds the published 2019 and 2020 figures and is
//! built once per process. Callers that load their own figures build a
//! table set with the `set_*` methods and must call
//! [`TaxTables::validate`] before handing it to a calculator.
//!
//! Lookups never fail. A missing entry falls back to a neutral value: the
//! 2019 single schedule for brackets, zero for the standard deduction and
//! [`EitcParameters::NONE`] for the credit.

mod builtin;

use std::collections::HashMap;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::{DependentCount, EitcParameters, FilingStatus, TaxBracket, TaxYear};

static BUILTIN: LazyLock<TaxTables> = LazyLock::new(TaxTables::published);
static BASE_BRACKETS: LazyLock<Vec<TaxBracket>> = LazyLock::new(builtin::base_brackets);

/// Violations of the table invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxTablesError {
    #[error("{year} {status}: bracket table is empty")]
    EmptyBracketTable { year: TaxYear, status: FilingStatus },

    #[error("{year} {status}: bracket {index} upper bound does not increase")]
    NonIncreasingBound {
        year: TaxYear,
        status: FilingStatus,
        index: usize,
    },

    #[error("{year} {status}: bracket {index} is unbounded but is not the top bracket")]
    UnboundedInnerBracket {
        year: TaxYear,
        status: FilingStatus,
        index: usize,
    },

    #[error("{year} {status}: top bracket must be unbounded")]
    BoundedTopBracket { year: TaxYear, status: FilingStatus },

    #[error("{year} {status}: tax rate must be between 0 and 1, got {rate}")]
    InvalidRate {
        year: TaxYear,
        status: FilingStatus,
        rate: Decimal,
    },

    #[error("{year} {status}: standard deduction must be non-negative, got {amount}")]
    NegativeDeduction {
        year: TaxYear,
        status: FilingStatus,
        amount: Decimal,
    },

    #[error("{year} {dependents}: EITC thresholds are out of order")]
    MisorderedEitc {
        year: TaxYear,
        dependents: DependentCount,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxTables {
    brackets: HashMap<(TaxYear, FilingStatus), Vec<TaxBracket>>,
    deductions: HashMap<(TaxYear, FilingStatus), Decimal>,
    eitc: HashMap<(TaxYear, DependentCount), EitcParameters>,
}

impl TaxTables {
    /// The published tables for every supported year.
    pub fn builtin() -> &'static TaxTables {
        &BUILTIN
    }

    /// A table set with no entries. Every lookup returns its fallback.
    pub fn empty() -> Self {
        Self::default()
    }

    fn published() -> Self {
        let mut tables = Self::empty();
        for year in TaxYear::ALL {
            for status in FilingStatus::ALL {
                tables.set_brackets(year, status, builtin::brackets(year, status));
                let deduction = builtin::standard_deduction(year, status);
                tables.set_standard_deduction(year, status, deduction);
            }
            for dependents in DependentCount::ALL {
                let parameters = builtin::eitc_parameters(year, dependents);
                tables.set_eitc_parameters(year, dependents, parameters);
            }
        }
        tables
    }

    pub fn brackets(
        &self,
        year: TaxYear,
        status: FilingStatus,
    ) -> &[TaxBracket] {
        match self.brackets.get(&(year, status)) {
            Some(brackets) => brackets.as_slice(),
            None => {
                debug!(%year, %status, "no bracket table, using base schedule");
                BASE_BRACKETS.as_slice()
            }
        }
    }

    pub fn standard_deduction(
        &self,
        year: TaxYear,
        status: FilingStatus,
    ) -> Decimal {
        self.deductions
            .get(&(year, status))
            .copied()
            .unwrap_or_else(|| {
                debug!(%year, %status, "no standard deduction, using zero");
                Decimal::ZERO
            })
    }

    pub fn eitc_parameters(
        &self,
        year: TaxYear,
        dependents: DependentCount,
    ) -> EitcParameters {
        self.eitc
            .get(&(year, dependents))
            .copied()
            .unwrap_or_else(|| {
                debug!(%year, %dependents, "no EITC parameters, credit disabled");
                EitcParameters::NONE
            })
    }

    /// Replaces the bracket table for a year and status, returning the old one.
    pub fn set_brackets(
        &mut self,
        year: TaxYear,
        status: FilingStatus,
        brackets: Vec<TaxBracket>,
    ) -> Option<Vec<TaxBracket>> {
        self.brackets.insert((year, status), brackets)
    }

    pub fn set_standard_deduction(
        &mut self,
        year: TaxYear,
        status: FilingStatus,
        amount: Decimal,
    ) -> Option<Decimal> {
        self.deductions.insert((year, status), amount)
    }

    pub fn set_eitc_parameters(
        &mut self,
        year: TaxYear,
        dependents: DependentCount,
        parameters: EitcParameters,
    ) -> Option<EitcParameters> {
        self.eitc.insert((year, dependents), parameters)
    }

    /// Checks every entry against the table invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaxTablesError`] found. Entries are visited in
    /// year, then status or dependent order so the result is deterministic.
    pub fn validate(&self) -> Result<(), TaxTablesError> {
        for year in TaxYear::ALL {
            for status in FilingStatus::ALL {
                if let Some(brackets) = self.brackets.get(&(year, status)) {
                    validate_brackets(year, status, brackets)?;
                }
                if let Some(&amount) = self.deductions.get(&(year, status)) {
                    if amount < Decimal::ZERO {
                        return Err(TaxTablesError::NegativeDeduction {
                            year,
                            status,
                            amount,
                        });
                    }
                }
            }
            for dependents in DependentCount::ALL {
                if let Some(parameters) = self.eitc.get(&(year, dependents)) {
                    if !parameters.is_well_ordered() {
                        return Err(TaxTablesError::MisorderedEitc { year, dependents });
                    }
                }
            }
        }
        Ok(())
    }
}

fn validate_brackets(
    year: TaxYear,
    status: FilingStatus,
    brackets: &[TaxBracket],
) -> Result<(), TaxTablesError> {
    let Some(top) = brackets.last() else {
        return Err(TaxTablesError::EmptyBracketTable { year, status });
    };
    if top.max_income.is_some() {
        return Err(TaxTablesError::BoundedTopBracket { year, status });
    }

    let mut previous = Decimal::ZERO;
    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.tax_rate < Decimal::ZERO || bracket.tax_rate > Decimal::ONE {
            return Err(TaxTablesError::InvalidRate {
                year,
                status,
                rate: bracket.tax_rate,
            });
        }
        match bracket.max_income {
            Some(bound) if bound <= previous => {
                return Err(TaxTablesError::NonIncreasingBound {
                    year,
                    status,
                    index,
                });
            }
            Some(bound) => previous = bound,
            None if index + 1 < brackets.len() => {
                return Err(TaxTablesError::UnboundedInnerBracket {
                    year,
                    status,
                    index,
                });
            }
            None => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn two_brackets() -> Vec<TaxBracket> {
        vec![
            TaxBracket::new(Some(dec!(10000)), dec!(0.10)),
            TaxBracket::new(None, dec!(0.20)),
        ]
    }

    #[test]
    fn builtin_tables_are_valid() {
        assert_eq!(TaxTables::builtin().validate(), Ok(()));
    }

    #[test]
    fn builtin_tables_cover_every_key() {
        let tables = TaxTables::builtin();

        for year in TaxYear::ALL {
            for status in FilingStatus::ALL {
                assert_eq!(tables.brackets(year, status).len(), 7);
                assert!(tables.standard_deduction(year, status) > Decimal::ZERO);
            }
            for dependents in DependentCount::ALL {
                assert!(tables.eitc_parameters(year, dependents).cap > Decimal::ZERO);
            }
        }
    }

    #[test]
    fn empty_tables_fall_back_to_neutral_values() {
        let tables = TaxTables::empty();

        assert_eq!(
            tables.brackets(TaxYear::Y2020, FilingStatus::Married),
            TaxTables::builtin().brackets(TaxYear::Y2019, FilingStatus::Single)
        );
        assert_eq!(
            tables.standard_deduction(TaxYear::Y2020, FilingStatus::Married),
            Decimal::ZERO
        );
        assert_eq!(
            tables.eitc_parameters(TaxYear::Y2020, DependentCount::Two),
            EitcParameters::NONE
        );
    }

    #[test]
    fn set_brackets_returns_previous_table() {
        let mut tables = TaxTables::empty();

        assert_eq!(
            tables.set_brackets(TaxYear::Y2019, FilingStatus::Single, two_brackets()),
            None
        );
        assert_eq!(
            tables.set_brackets(TaxYear::Y2019, FilingStatus::Single, two_brackets()),
            Some(two_brackets())
        );
    }

    #[test]
    fn validate_rejects_empty_bracket_table() {
        let mut tables = TaxTables::empty();
        tables.set_brackets(TaxYear::Y2019, FilingStatus::Single, vec![]);

        assert_eq!(
            tables.validate(),
            Err(TaxTablesError::EmptyBracketTable {
                year: TaxYear::Y2019,
                status: FilingStatus::Single,
            })
        );
    }

    #[test]
    fn validate_rejects_bounded_top_bracket() {
        let mut tables = TaxTables::empty();
        tables.set_brackets(
            TaxYear::Y2019,
            FilingStatus::Married,
            vec![TaxBracket::new(Some(dec!(10000)), dec!(0.10))],
        );

        assert_eq!(
            tables.validate(),
            Err(TaxTablesError::BoundedTopBracket {
                year: TaxYear::Y2019,
                status: FilingStatus::Married,
            })
        );
    }

    #[test]
    fn validate_rejects_non_increasing_bounds() {
        let mut tables = TaxTables::empty();
        tables.set_brackets(
            TaxYear::Y2020,
            FilingStatus::Single,
            vec![
                TaxBracket::new(Some(dec!(10000)), dec!(0.10)),
                TaxBracket::new(Some(dec!(10000)), dec!(0.12)),
                TaxBracket::new(None, dec!(0.22)),
            ],
        );

        assert_eq!(
            tables.validate(),
            Err(TaxTablesError::NonIncreasingBound {
                year: TaxYear::Y2020,
                status: FilingStatus::Single,
                index: 1,
            })
        );
    }

    #[test]
    fn validate_rejects_unbounded_inner_bracket() {
        let mut tables = TaxTables::empty();
        tables.set_brackets(
            TaxYear::Y2020,
            FilingStatus::Single,
            vec![
                TaxBracket::new(None, dec!(0.10)),
                TaxBracket::new(None, dec!(0.12)),
            ],
        );

        assert_eq!(
            tables.validate(),
            Err(TaxTablesError::UnboundedInnerBracket {
                year: TaxYear::Y2020,
                status: FilingStatus::Single,
                index: 0,
            })
        );
    }

    #[test]
    fn validate_rejects_rate_above_one() {
        let mut tables = TaxTables::empty();
        tables.set_brackets(
            TaxYear::Y2019,
            FilingStatus::Separately,
            vec![TaxBracket::new(None, dec!(1.5))],
        );

        assert_eq!(
            tables.validate(),
            Err(TaxTablesError::InvalidRate {
                year: TaxYear::Y2019,
                status: FilingStatus::Separately,
                rate: dec!(1.5),
            })
        );
    }

    #[test]
    fn validate_rejects_negative_deduction() {
        let mut tables = TaxTables::empty();
        tables.set_standard_deduction(TaxYear::Y2019, FilingStatus::Single, dec!(-1));

        assert_eq!(
            tables.validate(),
            Err(TaxTablesError::NegativeDeduction {
                year: TaxYear::Y2019,
                status: FilingStatus::Single,
                amount: dec!(-1),
            })
        );
    }

    #[test]
    fn validate_rejects_misordered_eitc() {
        let mut tables = TaxTables::empty();
        let mut parameters =
            TaxTables::builtin().eitc_parameters(TaxYear::Y2019, DependentCount::One);
        parameters.phase_out_complete_joint = dec!(100);
        tables.set_eitc_parameters(TaxYear::Y2019, DependentCount::One, parameters);

        assert_eq!(
            tables.validate(),
            Err(TaxTablesError::MisorderedEitc {
                year: TaxYear::Y2019,
                dependents: DependentCount::One,
            })
        );
    }
}
