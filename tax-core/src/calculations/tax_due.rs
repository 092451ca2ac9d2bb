//! Net federal income tax for a two-earner household.
//!
//! # Household Model
//!
//! The household has a combined earned income and an income split: the
//! share of that income earned by the lower-earning partner, between 0
//! (one earner) and 0.5 (equal earners).
//!
//! | Filing status       | Returns | Bracket tax                      | EITC |
//! |---------------------|---------|----------------------------------|------|
//! | Married             | one     | on combined − deduction          | once on combined income |
//! | Single / Separately | two     | on each share − deduction, summed| none |
//! | Head of Household   | two     | on each share − deduction, summed| one partner claims with the dependents, the other as childless single; the larger total wins |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{DependentCount, FilingStatus, TaxCalculator, TaxSettings, TaxTables, TaxYear};
//!
//! let calculator = TaxCalculator::new(TaxTables::builtin());
//! let single = TaxSettings::new(FilingStatus::Single, DependentCount::None, TaxYear::Y2019);
//!
//! // One earner with $20,000: (20000 - 12200) * 10%
//! assert_eq!(calculator.tax_due(single, dec!(20000), dec!(0)), dec!(780));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::calculations::bracket_tax::tax_from_brackets;
use crate::calculations::eitc::earned_income_credit;
use crate::{DependentCount, FilingStatus, TaxSettings, TaxTables, TaxYear};

/// The parts of a household's net tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Bracket tax summed over every return the household files.
    pub bracket_tax: Decimal,

    /// Refundable earned income credit claimed by the household.
    pub earned_income_credit: Decimal,

    /// `bracket_tax - earned_income_credit`. Negative means a net refund.
    pub net_tax: Decimal,
}

/// Calculator over a set of rate tables.
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    tables: &'a TaxTables,
    include_eitc: bool,
}

impl<'a> TaxCalculator<'a> {
    /// Creates a calculator that applies the earned income credit.
    pub fn new(tables: &'a TaxTables) -> Self {
        Self {
            tables,
            include_eitc: true,
        }
    }

    /// Turns the earned income credit on or off. With it off every
    /// household's credit is zero.
    pub fn with_eitc(
        mut self,
        include_eitc: bool,
    ) -> Self {
        self.include_eitc = include_eitc;
        self
    }

    pub fn includes_eitc(&self) -> bool {
        self.include_eitc
    }

    pub fn standard_deduction(
        &self,
        filing_status: FilingStatus,
        year: TaxYear,
    ) -> Decimal {
        self.tables.standard_deduction(year, filing_status)
    }

    /// Bracket tax on an adjusted gross income (income already reduced by
    /// the standard deduction). Never negative.
    pub fn tax_owed(
        &self,
        filing_status: FilingStatus,
        adjusted_gross_income: Decimal,
        year: TaxYear,
    ) -> Decimal {
        tax_from_brackets(
            self.tables.brackets(year, filing_status),
            adjusted_gross_income,
        )
    }

    /// Earned income credit for one filer. Never negative.
    pub fn eitc(
        &self,
        filing_status: FilingStatus,
        earned_income: Decimal,
        agi: Decimal,
        dependents: DependentCount,
        year: TaxYear,
    ) -> Decimal {
        let parameters = self.tables.eitc_parameters(year, dependents);
        earned_income_credit(&parameters, filing_status, earned_income, agi)
    }

    /// Net tax for a household: bracket tax minus the earned income credit.
    ///
    /// `split` is the lower earner's share of `combined_income` and is
    /// ignored for married couples.
    pub fn tax_due(
        &self,
        settings: TaxSettings,
        combined_income: Decimal,
        split: Decimal,
    ) -> Decimal {
        self.tax_breakdown(settings, combined_income, split).net_tax
    }

    pub fn tax_breakdown(
        &self,
        settings: TaxSettings,
        combined_income: Decimal,
        split: Decimal,
    ) -> TaxBreakdown {
        let TaxSettings {
            filing_status,
            dependents,
            year,
        } = settings;
        let deduction = self.standard_deduction(filing_status, year);

        let (bracket_tax, credit) = if filing_status.is_joint() {
            let agi = combined_income - deduction;
            let tax = self.tax_owed(filing_status, agi, year);
            let credit = self.eitc(filing_status, combined_income, agi, dependents, year);
            (tax, credit)
        } else {
            let lower = combined_income * split;
            let higher = combined_income - lower;
            let tax = self.tax_owed(filing_status, lower - deduction, year)
                + self.tax_owed(filing_status, higher - deduction, year);
            let credit = match filing_status {
                FilingStatus::HeadOfHousehold => {
                    self.head_of_household_credit(lower, higher, deduction, dependents, year)
                }
                _ => Decimal::ZERO,
            };
            (tax, credit)
        };

        let credit = if self.include_eitc {
            credit
        } else {
            Decimal::ZERO
        };

        trace!(
            %settings,
            %combined_income,
            %split,
            %bracket_tax,
            %credit,
            "household tax"
        );

        TaxBreakdown {
            bracket_tax,
            earned_income_credit: credit,
            net_tax: bracket_tax - credit,
        }
    }

    /// The parents choose which of them claims the dependents. The claimant
    /// files as head of household (as single when there are no dependents);
    /// the other partner claims the childless single credit. Both
    /// assignments are tried and the larger total is returned.
    fn head_of_household_credit(
        &self,
        lower: Decimal,
        higher: Decimal,
        deduction: Decimal,
        dependents: DependentCount,
        year: TaxYear,
    ) -> Decimal {
        let claimant_status = match dependents {
            DependentCount::None => FilingStatus::Single,
            _ => FilingStatus::HeadOfHousehold,
        };
        let claim = |claimant: Decimal, other: Decimal| {
            self.eitc(claimant_status, claimant, claimant - deduction, dependents, year)
                + self.eitc(
                    FilingStatus::Single,
                    other,
                    other - deduction,
                    DependentCount::None,
                    year,
                )
        };

        let lower_claims = claim(lower, higher);
        let higher_claims = claim(higher, lower);
        if higher_claims > lower_claims {
            higher_claims
        } else {
            lower_claims
        }
    }
}
