//! CSV loader for replacement rate tables.
//!
//! ## CSV Formats
//!
//! Headers are matched by name; column order does not matter.
//!
//! ### Brackets (`brackets.csv`)
//!
//! | Column       | Type    | Notes                                       |
//! |--------------|---------|---------------------------------------------|
//! | `tax_year`   | integer | `2019` or `2020`                            |
//! | `schedule`   | string  | IRS schedule code: `X`, `Y-1`, `Y-2`, `Z`   |
//! | `max_income` | decimal | Bracket upper bound; empty for the top row  |
//! | `rate`       | decimal | Marginal rate, e.g. `0.10`                  |
//!
//! Rows for one (year, schedule) must be in ascending order.
//!
//! ### Standard deductions (`deductions.csv`)
//!
//! `tax_year,filing_status,amount` with status codes `S`, `HOH`, `MFJ`, `MFS`.
//!
//! ### Earned income credit (`eitc.csv`)
//!
//! `tax_year,dependents,cap,phase_in_complete,phase_out_start_joint,`
//! `phase_out_complete_joint,phase_out_start_single,phase_out_complete_single`
//! with dependent codes `0`, `1`, `2`, `3+`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tax_core::{
    DependentCount, EitcParameters, FilingStatus, TaxBracket, TaxTables, TaxTablesError, TaxYear,
};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const BRACKETS_FILE: &str = "brackets.csv";
pub const DEDUCTIONS_FILE: &str = "deductions.csv";
pub const EITC_FILE: &str = "eitc.csv";

/// Errors that can occur when loading rate tables.
#[derive(Debug, Error)]
pub enum TableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid filing status: {0}")]
    InvalidFilingStatus(String),

    #[error("Invalid dependent count: {0}")]
    InvalidDependents(String),

    #[error("Tax year {0} is not supported")]
    UnsupportedTaxYear(i32),

    #[error("Failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Loaded tables are invalid: {0}")]
    InvalidTables(#[from] TaxTablesError),
}

impl From<csv::Error> for TableLoaderError {
    fn from(err: csv::Error) -> Self {
        TableLoaderError::CsvParse(err.to_string())
    }
}

/// Maps IRS schedule codes to filing statuses.
///
/// - Schedule X → Single
/// - Schedule Y-1 → Married filing jointly
/// - Schedule Y-2 → Married filing separately
/// - Schedule Z → Head of household
fn schedule_to_filing_status(schedule: &str) -> Result<FilingStatus, TableLoaderError> {
    match schedule {
        "X" => Ok(FilingStatus::Single),
        "Y-1" => Ok(FilingStatus::Married),
        "Y-2" => Ok(FilingStatus::Separately),
        "Z" => Ok(FilingStatus::HeadOfHousehold),
        _ => Err(TableLoaderError::InvalidSchedule(schedule.to_string())),
    }
}

fn tax_year(year: i32) -> Result<TaxYear, TableLoaderError> {
    TaxYear::from_year(year).ok_or(TableLoaderError::UnsupportedTaxYear(year))
}

/// A single row of the brackets CSV file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub schedule: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

/// A single row of the standard deductions CSV file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeductionRecord {
    pub tax_year: i32,
    pub filing_status: String,
    pub amount: Decimal,
}

/// A single row of the earned income credit CSV file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EitcRecord {
    pub tax_year: i32,
    pub dependents: String,
    pub cap: Decimal,
    pub phase_in_complete: Decimal,
    pub phase_out_start_joint: Decimal,
    pub phase_out_complete_joint: Decimal,
    pub phase_out_start_single: Decimal,
    pub phase_out_complete_single: Decimal,
}

impl EitcRecord {
    fn parameters(&self) -> EitcParameters {
        EitcParameters {
            cap: self.cap,
            phase_in_complete: self.phase_in_complete,
            phase_out_start_joint: self.phase_out_start_joint,
            phase_out_complete_joint: self.phase_out_complete_joint,
            phase_out_start_single: self.phase_out_start_single,
            phase_out_complete_single: self.phase_out_complete_single,
        }
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for rate tables from CSV files.
///
/// Loading starts from [`TaxTables::builtin`] and replaces only the groups
/// present in the files, so a file carrying just the 2020 Schedule X rows
/// leaves every other schedule as published.
pub struct TableLoader;

impl TableLoader {
    fn parse<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>, TableLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: T = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Parse bracket records from a CSV reader.
    pub fn parse_brackets<R: Read>(reader: R) -> Result<Vec<BracketRecord>, TableLoaderError> {
        Self::parse(reader)
    }

    /// Parse standard deduction records from a CSV reader.
    pub fn parse_deductions<R: Read>(
        reader: R
    ) -> Result<Vec<DeductionRecord>, TableLoaderError> {
        Self::parse(reader)
    }

    /// Parse earned income credit records from a CSV reader.
    pub fn parse_eitc<R: Read>(reader: R) -> Result<Vec<EitcRecord>, TableLoaderError> {
        Self::parse(reader)
    }

    /// Replace bracket tables with the given records.
    ///
    /// Records are grouped by (tax_year, schedule). Each group replaces the
    /// whole table for that year and filing status, keeping the row order
    /// of the file. Returns the number of rows applied.
    pub fn apply_brackets(
        tables: &mut TaxTables,
        records: &[BracketRecord],
    ) -> Result<usize, TableLoaderError> {
        let mut groups: BTreeMap<(i32, &str), Vec<&BracketRecord>> = BTreeMap::new();
        for record in records {
            groups
                .entry((record.tax_year, record.schedule.as_str()))
                .or_default()
                .push(record);
        }

        let mut applied = 0;
        for ((year, schedule), group_records) in groups {
            let year = tax_year(year)?;
            let status = schedule_to_filing_status(schedule)?;

            let brackets: Vec<TaxBracket> = group_records
                .iter()
                .map(|record| TaxBracket::new(record.max_income, record.rate))
                .collect();
            applied += brackets.len();

            if tables.set_brackets(year, status, brackets).is_some() {
                warn!(%year, schedule, %status, "replaced bracket table");
            }
        }

        Ok(applied)
    }

    /// Replace standard deductions. Returns the number of rows applied.
    pub fn apply_deductions(
        tables: &mut TaxTables,
        records: &[DeductionRecord],
    ) -> Result<usize, TableLoaderError> {
        for record in records {
            let year = tax_year(record.tax_year)?;
            let status = FilingStatus::parse(&record.filing_status)
                .ok_or_else(|| TableLoaderError::InvalidFilingStatus(record.filing_status.clone()))?;

            if tables
                .set_standard_deduction(year, status, record.amount)
                .is_some()
            {
                warn!(%year, %status, amount = %record.amount, "replaced standard deduction");
            }
        }

        Ok(records.len())
    }

    /// Replace earned income credit rows. Returns the number of rows applied.
    pub fn apply_eitc(
        tables: &mut TaxTables,
        records: &[EitcRecord],
    ) -> Result<usize, TableLoaderError> {
        for record in records {
            let year = tax_year(record.tax_year)?;
            let dependents = DependentCount::parse(&record.dependents)
                .ok_or_else(|| TableLoaderError::InvalidDependents(record.dependents.clone()))?;

            if tables
                .set_eitc_parameters(year, dependents, record.parameters())
                .is_some()
            {
                warn!(%year, %dependents, "replaced EITC parameters");
            }
        }

        Ok(records.len())
    }

    /// Load every table file present in `dir` on top of the built-in tables
    /// and validate the result.
    ///
    /// Missing files are skipped. The directory may hold any subset of
    /// [`BRACKETS_FILE`], [`DEDUCTIONS_FILE`] and [`EITC_FILE`].
    pub fn load_dir(dir: &Path) -> Result<TaxTables, TableLoaderError> {
        let mut tables = TaxTables::builtin().clone();

        if let Some(file) = open_if_present(&dir.join(BRACKETS_FILE))? {
            let records = Self::parse_brackets(file)?;
            let applied = Self::apply_brackets(&mut tables, &records)?;
            info!(applied, "loaded bracket rows");
        }

        if let Some(file) = open_if_present(&dir.join(DEDUCTIONS_FILE))? {
            let records = Self::parse_deductions(file)?;
            let applied = Self::apply_deductions(&mut tables, &records)?;
            info!(applied, "loaded standard deduction rows");
        }

        if let Some(file) = open_if_present(&dir.join(EITC_FILE))? {
            let records = Self::parse_eitc(file)?;
            let applied = Self::apply_eitc(&mut tables, &records)?;
            info!(applied, "loaded EITC rows");
        }

        tables.validate()?;
        Ok(tables)
    }
}

fn open_if_present(path: &Path) -> Result<Option<File>, TableLoaderError> {
    if !path.exists() {
        debug!(path = %path.display(), "table file not present, keeping built-in values");
        return Ok(None);
    }
    File::open(path)
        .map(Some)
        .map_err(|source| TableLoaderError::Io {
            path: path.to_path_buf(),
            source,
        })
}
