//! Comparison grid between two tax settings.
//!
//! The grid has one row per combined income bucket and one column per
//! income split bucket. Each cell holds `tax_due(baseline) -
//! tax_due(comparison)` at that point, so a positive delta means the
//! baseline pays more.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{
//!     ComparisonGrid, DependentCount, DisplayMode, FilingStatus, GridConfig, TaxCalculator,
//!     TaxSettings, TaxTables, TaxYear,
//! };
//!
//! let calculator = TaxCalculator::new(TaxTables::builtin());
//! let single = TaxSettings::new(FilingStatus::Single, DependentCount::None, TaxYear::Y2019);
//! let married = TaxSettings::new(FilingStatus::Married, DependentCount::None, TaxYear::Y2019);
//!
//! let grid = ComparisonGrid::build(
//!     &calculator,
//!     single,
//!     married,
//!     DisplayMode::Percentage,
//!     &GridConfig::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(grid.incomes().len(), 51);
//! assert_eq!(grid.split_fractions().len(), 51);
//! assert_eq!(grid.cell(0, 0).map(|c| c.delta), Some(dec!(0)));
//! ```

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::TaxSettings;
use crate::calculations::TaxCalculator;
use crate::calculations::common::round_half_up;

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;
const ONE_THOUSAND: Decimal = Decimal::ONE_THOUSAND;

/// Errors for grid resolutions that cannot produce a grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridConfigError {
    #[error("income step must be positive, got {0}")]
    InvalidIncomeStep(Decimal),

    #[error("income step count must be at least 1, got {0}")]
    TooFewIncomeSteps(usize),

    #[error("split step count must be at least 2, got {0}")]
    TooFewSplitSteps(usize),

    #[error("{steps} income steps of {step} exceed the representable income range")]
    IncomeRangeOverflow { step: Decimal, steps: usize },
}

/// Errors looking up cells in a built grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("cell ({row}, {column}) is outside the {rows}x{columns} grid")]
    CellOutOfRange {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },
}

/// How cell deltas are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Dollar difference in thousands.
    Absolute,

    /// Difference as a percentage of combined income.
    #[default]
    Percentage,
}

impl fmt::Display for DisplayMode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Absolute => f.write_str("$k"),
            Self::Percentage => f.write_str("%"),
        }
    }
}

/// Grid resolution.
///
/// Incomes run from zero in `income_step` increments for `income_steps`
/// buckets. Split fractions run evenly from 0 to 0.5 over `split_steps`
/// buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub income_step: Decimal,
    pub income_steps: usize,
    pub split_steps: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            income_step: Decimal::from(5000),
            income_steps: 51,
            split_steps: 51,
        }
    }
}

impl GridConfig {
    /// # Errors
    ///
    /// Returns [`GridConfigError`] if the income step is not positive, there
    /// are no income buckets, the top income bucket cannot be represented,
    /// or there are fewer than two split buckets.
    pub fn validate(&self) -> Result<(), GridConfigError> {
        if self.income_step <= Decimal::ZERO {
            return Err(GridConfigError::InvalidIncomeStep(self.income_step));
        }
        if self.income_steps < 1 {
            return Err(GridConfigError::TooFewIncomeSteps(self.income_steps));
        }
        // Percentage deltas scale by 100 before dividing by income.
        let top_income = self
            .income_step
            .checked_mul(Decimal::from(self.income_steps - 1))
            .and_then(|income| income.checked_mul(ONE_HUNDRED));
        if top_income.is_none() {
            return Err(GridConfigError::IncomeRangeOverflow {
                step: self.income_step,
                steps: self.income_steps,
            });
        }
        if self.split_steps < 2 {
            return Err(GridConfigError::TooFewSplitSteps(self.split_steps));
        }
        Ok(())
    }

    pub fn incomes(&self) -> Vec<Decimal> {
        (0..self.income_steps)
            .map(|i| Decimal::from(i) * self.income_step)
            .collect()
    }

    /// Split fractions from 0 to 0.5 inclusive. Requires `split_steps >= 2`.
    pub fn split_fractions(&self) -> Vec<Decimal> {
        let last = Decimal::from(self.split_steps.saturating_sub(1).max(1));
        (0..self.split_steps)
            .map(|i| Decimal::from(i) * Decimal::new(5, 1) / last)
            .collect()
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    /// Combined income bucket index.
    pub row: usize,

    /// Income split bucket index.
    pub column: usize,

    pub combined_income: Decimal,
    pub split_fraction: Decimal,

    /// Baseline tax minus comparison tax, in the grid's [`DisplayMode`].
    pub delta: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonGrid {
    baseline: TaxSettings,
    comparison: TaxSettings,
    mode: DisplayMode,
    incomes: Vec<Decimal>,
    split_fractions: Vec<Decimal>,
    cells: Vec<Vec<GridCell>>,
}

impl ComparisonGrid {
    /// Evaluates both settings at every (income, split) point.
    ///
    /// Each side is computed with its own tax year. In percentage mode a
    /// zero combined income yields a 0% delta.
    ///
    /// # Errors
    ///
    /// Returns [`GridConfigError`] if `config` fails validation.
    pub fn build(
        calculator: &TaxCalculator<'_>,
        baseline: TaxSettings,
        comparison: TaxSettings,
        mode: DisplayMode,
        config: &GridConfig,
    ) -> Result<Self, GridConfigError> {
        config.validate()?;

        let incomes = config.incomes();
        let split_fractions = config.split_fractions();

        let cells = incomes
            .iter()
            .enumerate()
            .map(|(row, &combined_income)| {
                split_fractions
                    .iter()
                    .enumerate()
                    .map(|(column, &split_fraction)| {
                        let baseline_tax =
                            calculator.tax_due(baseline, combined_income, split_fraction);
                        let comparison_tax =
                            calculator.tax_due(comparison, combined_income, split_fraction);
                        GridCell {
                            row,
                            column,
                            combined_income,
                            split_fraction,
                            delta: scale_delta(baseline_tax - comparison_tax, combined_income, mode),
                        }
                    })
                    .collect()
            })
            .collect();

        debug!(
            %baseline,
            %comparison,
            %mode,
            eitc = calculator.includes_eitc(),
            rows = incomes.len(),
            columns = split_fractions.len(),
            "built comparison grid"
        );

        Ok(Self {
            baseline,
            comparison,
            mode,
            incomes,
            split_fractions,
            cells,
        })
    }

    pub fn baseline(&self) -> TaxSettings {
        self.baseline
    }

    pub fn comparison(&self) -> TaxSettings {
        self.comparison
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn incomes(&self) -> &[Decimal] {
        &self.incomes
    }

    pub fn split_fractions(&self) -> &[Decimal] {
        &self.split_fractions
    }

    pub fn rows(&self) -> &[Vec<GridCell>] {
        &self.cells
    }

    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter().flatten()
    }

    pub fn cell(
        &self,
        row: usize,
        column: usize,
    ) -> Option<&GridCell> {
        self.cells.get(row).and_then(|cells| cells.get(column))
    }

    /// Largest delta magnitude; the bound for a symmetric colour scale.
    pub fn max_abs_delta(&self) -> Decimal {
        self.cells()
            .map(|cell| cell.delta.abs())
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    /// Describes a cell in one sentence, e.g.
    /// `At a combined income of $50000 with 25.0% share the change in taxes is 1.2%.`
    ///
    /// # Errors
    ///
    /// Returns [`GridError::CellOutOfRange`] for an index outside the grid.
    pub fn describe_cell(
        &self,
        row: usize,
        column: usize,
    ) -> Result<String, GridError> {
        let cell = self.cell(row, column).ok_or(GridError::CellOutOfRange {
            row,
            column,
            rows: self.incomes.len(),
            columns: self.split_fractions.len(),
        })?;

        let share = (cell.split_fraction * ONE_HUNDRED).round_dp(1);
        let delta = match self.mode {
            DisplayMode::Absolute => format!("{:.2} $k", round_half_up(cell.delta)),
            DisplayMode::Percentage => format!("{:.1}%", cell.delta.round_dp(1)),
        };

        Ok(format!(
            "At a combined income of ${} with {:.1}% share the change in taxes is {}.",
            cell.combined_income.normalize(),
            share,
            delta
        ))
    }
}

fn scale_delta(
    delta: Decimal,
    combined_income: Decimal,
    mode: DisplayMode,
) -> Decimal {
    match mode {
        DisplayMode::Absolute => delta / ONE_THOUSAND,
        DisplayMode::Percentage if combined_income.is_zero() => Decimal::ZERO,
        DisplayMode::Percentage => ONE_HUNDRED * delta / combined_income,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{DependentCount, FilingStatus, TaxTables, TaxYear};

    fn single() -> TaxSettings {
        TaxSettings::new(FilingStatus::Single, DependentCount::None, TaxYear::Y2019)
    }

    fn married() -> TaxSettings {
        TaxSettings::new(FilingStatus::Married, DependentCount::None, TaxYear::Y2019)
    }

    fn build(
        mode: DisplayMode,
        config: &GridConfig,
    ) -> ComparisonGrid {
        let calculator = TaxCalculator::new(TaxTables::builtin());
        ComparisonGrid::build(&calculator, single(), married(), mode, config).unwrap()
    }

    fn small_config() -> GridConfig {
        GridConfig {
            income_step: dec!(10000),
            income_steps: 3,
            split_steps: 3,
        }
    }

    // =========================================================================
    // GridConfig tests
    // =========================================================================

    #[test]
    fn default_config_matches_heatmap_resolution() {
        let config = GridConfig::default();

        assert_eq!(config.validate(), Ok(()));
        let incomes = config.incomes();
        assert_eq!(incomes.len(), 51);
        assert_eq!(incomes[1], dec!(5000));
        assert_eq!(incomes[50], dec!(250000));

        let splits = config.split_fractions();
        assert_eq!(splits.len(), 51);
        assert_eq!(splits[0], dec!(0));
        assert_eq!(splits[1], dec!(0.01));
        assert_eq!(splits[50], dec!(0.5));
    }

    #[test]
    fn config_rejects_non_positive_step() {
        let config = GridConfig {
            income_step: dec!(0),
            ..GridConfig::default()
        };

        assert_eq!(
            config.validate(),
            Err(GridConfigError::InvalidIncomeStep(dec!(0)))
        );
    }

    #[test]
    fn config_rejects_single_split_step() {
        let config = GridConfig {
            split_steps: 1,
            ..GridConfig::default()
        };

        assert_eq!(config.validate(), Err(GridConfigError::TooFewSplitSteps(1)));
    }

    #[test]
    fn config_rejects_zero_income_steps() {
        let config = GridConfig {
            income_steps: 0,
            ..GridConfig::default()
        };

        assert_eq!(config.validate(), Err(GridConfigError::TooFewIncomeSteps(0)));
    }

    #[test]
    fn config_rejects_unrepresentable_income_range() {
        let config = GridConfig {
            income_step: Decimal::MAX,
            income_steps: 3,
            split_steps: 2,
        };

        assert_eq!(
            config.validate(),
            Err(GridConfigError::IncomeRangeOverflow {
                step: Decimal::MAX,
                steps: 3,
            })
        );
    }

    #[test]
    fn config_accepts_one_bucket_of_any_step() {
        let config = GridConfig {
            income_step: Decimal::MAX,
            income_steps: 1,
            split_steps: 2,
        };

        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.incomes(), vec![dec!(0)]);
    }

    #[test]
    fn build_rejects_overflowing_step_without_panicking() {
        let calculator = TaxCalculator::new(TaxTables::builtin());
        let config = GridConfig {
            income_step: Decimal::MAX,
            ..GridConfig::default()
        };

        let result = ComparisonGrid::build(
            &calculator,
            single(),
            married(),
            DisplayMode::Percentage,
            &config,
        );

        assert!(matches!(
            result,
            Err(GridConfigError::IncomeRangeOverflow { steps: 51, .. })
        ));
    }

    // =========================================================================
    // build tests
    // =========================================================================

    #[test]
    fn build_indexes_cells_by_income_then_split() {
        let grid = build(DisplayMode::Absolute, &small_config());

        assert_eq!(grid.baseline(), single());
        assert_eq!(grid.comparison(), married());
        assert_eq!(grid.rows().len(), 3);
        assert_eq!(grid.cells().count(), 9);
        let cell = grid.cell(2, 1).unwrap();
        assert_eq!(cell.row, 2);
        assert_eq!(cell.column, 1);
        assert_eq!(cell.combined_income, dec!(20000));
        assert_eq!(cell.split_fraction, dec!(0.25));
    }

    #[test]
    fn percentage_mode_is_zero_at_zero_income() {
        let grid = build(DisplayMode::Percentage, &GridConfig::default());

        for column in 0..grid.split_fractions().len() {
            assert_eq!(grid.cell(0, column).unwrap().delta, dec!(0));
        }
    }

    #[test]
    fn absolute_mode_reports_thousands() {
        let grid = build(DisplayMode::Absolute, &small_config());
        let cell = grid.cell(2, 0).unwrap();

        // Single owes 780; married owes nothing and collects a partial credit.
        let calculator = TaxCalculator::new(TaxTables::builtin());
        let expected = (calculator.tax_due(single(), dec!(20000), dec!(0))
            - calculator.tax_due(married(), dec!(20000), dec!(0)))
            / dec!(1000);
        assert_eq!(cell.delta, expected);
    }

    #[test]
    fn percentage_mode_scales_by_income() {
        let absolute = build(DisplayMode::Absolute, &small_config());
        let percentage = build(DisplayMode::Percentage, &small_config());

        let dollars = absolute.cell(1, 2).unwrap().delta * dec!(1000);
        assert_eq!(
            percentage.cell(1, 2).unwrap().delta,
            dec!(100) * dollars / dec!(10000)
        );
    }

    #[test]
    fn identical_settings_produce_zero_grid() {
        let calculator = TaxCalculator::new(TaxTables::builtin());
        let grid = ComparisonGrid::build(
            &calculator,
            married(),
            married(),
            DisplayMode::Absolute,
            &GridConfig::default(),
        )
        .unwrap();

        assert_eq!(grid.max_abs_delta(), dec!(0));
    }

    #[test]
    fn each_side_uses_its_own_year() {
        let calculator = TaxCalculator::new(TaxTables::builtin());
        let single_2020 = TaxSettings::new(FilingStatus::Single, DependentCount::None, TaxYear::Y2020);
        let grid = ComparisonGrid::build(
            &calculator,
            single(),
            single_2020,
            DisplayMode::Absolute,
            &small_config(),
        )
        .unwrap();

        // 2019: (20000 - 12200) * 10% = 780; 2020: (20000 - 12400) * 10% = 760
        assert_eq!(grid.cell(2, 0).unwrap().delta, dec!(0.02));
    }

    #[test]
    fn build_rejects_invalid_config() {
        let calculator = TaxCalculator::new(TaxTables::builtin());
        let config = GridConfig {
            split_steps: 0,
            ..GridConfig::default()
        };

        let result = ComparisonGrid::build(
            &calculator,
            single(),
            married(),
            DisplayMode::Absolute,
            &config,
        );

        assert_eq!(result, Err(GridConfigError::TooFewSplitSteps(0)));
    }

    #[test]
    fn max_abs_delta_finds_largest_magnitude() {
        let grid = build(DisplayMode::Absolute, &GridConfig::default());
        let largest = grid
            .cells()
            .map(|c| c.delta.abs())
            .fold(dec!(0), Decimal::max);

        assert_eq!(grid.max_abs_delta(), largest);
        assert!(largest > dec!(0));
    }

    // =========================================================================
    // describe_cell tests
    // =========================================================================

    #[test]
    fn describe_cell_in_percentage_mode() {
        let grid = build(DisplayMode::Percentage, &small_config());

        assert_eq!(
            grid.describe_cell(0, 1).unwrap(),
            "At a combined income of $0 with 25.0% share the change in taxes is 0.0%."
        );
    }

    #[test]
    fn describe_cell_in_absolute_mode() {
        let calculator = TaxCalculator::new(TaxTables::builtin());
        let single_2020 = TaxSettings::new(FilingStatus::Single, DependentCount::None, TaxYear::Y2020);
        let grid = ComparisonGrid::build(
            &calculator,
            single(),
            single_2020,
            DisplayMode::Absolute,
            &small_config(),
        )
        .unwrap();

        assert_eq!(
            grid.describe_cell(2, 0).unwrap(),
            "At a combined income of $20000 with 0.0% share the change in taxes is 0.02 $k."
        );
    }

    #[test]
    fn describe_cell_out_of_range() {
        let grid = build(DisplayMode::Percentage, &small_config());

        assert_eq!(
            grid.describe_cell(3, 0),
            Err(GridError::CellOutOfRange {
                row: 3,
                column: 0,
                rows: 3,
                columns: 3,
            })
        );
    }
}
