use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DependentCount, FilingStatus, TaxYear};

/// Errors produced when parsing a `STATUS:DEPENDENTS:YEAR` settings string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseSettingsError {
    #[error("expected STATUS:DEPENDENTS:YEAR, got '{0}'")]
    Malformed(String),

    #[error("unrecognised filing status '{0}' (expected S, HOH, MFJ or MFS)")]
    FilingStatus(String),

    #[error("unrecognised dependent count '{0}' (expected 0, 1, 2 or 3+)")]
    Dependents(String),

    #[error("unsupported tax year '{0}' (expected 2019 or 2020)")]
    TaxYear(String),
}

/// One side of a two-way comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxSettings {
    pub filing_status: FilingStatus,
    pub dependents: DependentCount,
    pub year: TaxYear,
}

impl TaxSettings {
    pub fn new(
        filing_status: FilingStatus,
        dependents: DependentCount,
        year: TaxYear,
    ) -> Self {
        Self {
            filing_status,
            dependents,
            year,
        }
    }
}

impl fmt::Display for TaxSettings {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.filing_status.as_str(),
            self.dependents.as_str(),
            self.year
        )
    }
}

impl FromStr for TaxSettings {
    type Err = ParseSettingsError;

    /// Parses `S:0:2019`-style strings, the same form [`Display`](fmt::Display) writes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let [status, dependents, year] = parts.as_slice() else {
            return Err(ParseSettingsError::Malformed(s.to_string()));
        };

        let filing_status = FilingStatus::parse(status)
            .ok_or_else(|| ParseSettingsError::FilingStatus(status.to_string()))?;
        let dependents = DependentCount::parse(dependents)
            .ok_or_else(|| ParseSettingsError::Dependents(dependents.to_string()))?;
        let year = year
            .parse::<i32>()
            .ok()
            .and_then(TaxYear::from_year)
            .ok_or_else(|| ParseSettingsError::TaxYear(year.to_string()))?;

        Ok(Self::new(filing_status, dependents, year))
    }
}
