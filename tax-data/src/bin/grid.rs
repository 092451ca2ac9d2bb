use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tax_core::calculations::common::round_half_up;
use tax_core::{ComparisonGrid, DisplayMode, GridConfig, TaxCalculator, TaxSettings, TaxTables};
use tax_data::{GridExporter, TableLoader, logging};
use tracing::{debug, info};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Compare federal income tax between two filing situations.
///
/// Settings are written as STATUS:DEPENDENTS:YEAR, for example `S:0:2019`
/// or `MFJ:2:2020`. Status codes are S, HOH, MFJ and MFS; dependents are
/// 0, 1, 2 or 3+.
#[derive(Debug, Parser)]
#[command(name = "tax-grid", version, about, long_about = None)]
struct Cli {
    /// Log level or EnvFilter directive (overrides RUST_LOG).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Directory with brackets.csv, deductions.csv and/or eitc.csv that
    /// replace the built-in tables.
    #[arg(long, global = true)]
    tables: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the full comparison grid as CSV.
    Grid {
        #[command(flatten)]
        comparison: ComparisonArgs,

        /// Output file (stdout when omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Describe one cell of the comparison grid.
    Cell {
        #[command(flatten)]
        comparison: ComparisonArgs,

        /// Combined income bucket index.
        #[arg(long)]
        row: usize,

        /// Income split bucket index.
        #[arg(long)]
        column: usize,
    },

    /// Show the tax breakdown for a single household.
    Tax {
        /// Household settings.
        #[arg(long, default_value = "S:0:2019")]
        settings: TaxSettings,

        /// Combined household income.
        #[arg(long, value_parser = parse_income)]
        income: Decimal,

        /// Lower earner's share of the income (0 to 0.5).
        #[arg(long, default_value = "0", value_parser = parse_split)]
        split: Decimal,

        /// Leave out the earned income tax credit.
        #[arg(long, default_value_t = false)]
        no_eitc: bool,
    },
}

#[derive(Debug, Args)]
struct ComparisonArgs {
    /// Baseline settings.
    #[arg(long, default_value = "S:0:2019")]
    baseline: TaxSettings,

    /// Comparison settings.
    #[arg(long, default_value = "MFJ:0:2019")]
    comparison: TaxSettings,

    /// Report deltas in $k instead of percent of income.
    #[arg(long, default_value_t = false)]
    absolute: bool,

    /// Leave out the earned income tax credit.
    #[arg(long, default_value_t = false)]
    no_eitc: bool,

    /// Combined income step between rows.
    #[arg(long, default_value = "5000")]
    income_step: Decimal,

    /// Number of income rows.
    #[arg(long, default_value_t = 51)]
    income_steps: usize,

    /// Number of split columns between 0 and 0.5.
    #[arg(long, default_value_t = 51)]
    split_steps: usize,
}

impl ComparisonArgs {
    fn mode(&self) -> DisplayMode {
        if self.absolute {
            DisplayMode::Absolute
        } else {
            DisplayMode::Percentage
        }
    }

    fn grid_config(&self) -> GridConfig {
        GridConfig {
            income_step: self.income_step,
            income_steps: self.income_steps,
            split_steps: self.split_steps,
        }
    }

    fn build(
        &self,
        tables: &TaxTables,
    ) -> Result<ComparisonGrid> {
        let calculator = TaxCalculator::new(tables).with_eitc(!self.no_eitc);
        ComparisonGrid::build(
            &calculator,
            self.baseline,
            self.comparison,
            self.mode(),
            &self.grid_config(),
        )
        .context("invalid grid resolution")
    }
}

fn parse_income(s: &str) -> Result<Decimal, String> {
    let income: Decimal = s.parse().map_err(|e| format!("{e}"))?;
    if income < Decimal::ZERO {
        return Err(format!("income must not be negative, got {income}"));
    }
    Ok(income)
}

fn parse_split(s: &str) -> Result<Decimal, String> {
    let split: Decimal = s.parse().map_err(|e| format!("{e}"))?;
    if split < Decimal::ZERO || split > Decimal::new(5, 1) {
        return Err(format!("split must be between 0 and 0.5, got {split}"));
    }
    Ok(split)
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.as_deref(), cli.log_file.as_deref())?;

    let tables = match &cli.tables {
        Some(dir) => {
            debug!(dir = %dir.display(), "loading tables");
            TableLoader::load_dir(dir)
                .with_context(|| format!("Failed to load tables from: {}", dir.display()))?
        }
        None => TaxTables::builtin().clone(),
    };

    match cli.command {
        Command::Grid { comparison, output } => {
            let grid = comparison.build(&tables)?;
            let written = match &output {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("Failed to create: {}", path.display()))?;
                    GridExporter::write_csv(&grid, BufWriter::new(file))
                }
                None => GridExporter::write_csv(&grid, io::stdout().lock()),
            }
            .context("Failed to write grid")?;

            info!(
                baseline = %grid.baseline(),
                comparison = %grid.comparison(),
                cells = written,
                max_abs_delta = %round_half_up(grid.max_abs_delta()),
                mode = %grid.mode(),
                "wrote comparison grid"
            );
        }
        Command::Cell {
            comparison,
            row,
            column,
        } => {
            let grid = comparison.build(&tables)?;
            println!("{}", grid.describe_cell(row, column)?);
        }
        Command::Tax {
            settings,
            income,
            split,
            no_eitc,
        } => {
            let calculator = TaxCalculator::new(&tables).with_eitc(!no_eitc);
            let breakdown = calculator.tax_breakdown(settings, income, split);

            println!("{} {} ({})", settings.filing_status, settings.year, settings.dependents);
            println!("  bracket tax:          {:>12.2}", round_half_up(breakdown.bracket_tax));
            println!(
                "  earned income credit: {:>12.2}",
                round_half_up(breakdown.earned_income_credit)
            );
            println!("  net tax:              {:>12.2}", round_half_up(breakdown.net_tax));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("tax-grid").chain(args.iter().copied()))
    }

    #[test]
    fn tax_accepts_split_range_bounds() {
        for split in ["0", "0.25", "0.5"] {
            let cli = parse(&["tax", "--income", "40000", "--split", split]).unwrap();
            let Command::Tax { income, .. } = cli.command else {
                panic!("expected tax subcommand");
            };
            assert_eq!(income, dec!(40000));
        }
    }

    #[test]
    fn tax_rejects_split_outside_range() {
        for split in ["--split=-0.1", "--split=0.51", "--split=1"] {
            assert!(parse(&["tax", "--income", "40000", split]).is_err(), "{split}");
        }
    }

    #[test]
    fn tax_rejects_negative_income() {
        assert!(parse(&["tax", "--income=-5000"]).is_err());
        assert!(parse(&["tax", "--income", "0"]).is_ok());
    }

    #[test]
    fn grid_reports_overflowing_income_step() {
        let cli = parse(&["grid", "--income-step", "79228162514264337593543950335"]).unwrap();
        let Command::Grid { comparison, .. } = cli.command else {
            panic!("expected grid subcommand");
        };

        assert!(comparison.build(TaxTables::builtin()).is_err());
    }
}
