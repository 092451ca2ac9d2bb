//! CSV export for comparison grids.
//!
//! One line per cell with the columns
//! `row,column,combined_income,split_fraction,delta`. Deltas are rounded
//! half-up to two decimals in the grid's display mode.

use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;
use tax_core::ComparisonGrid;
use tax_core::calculations::common::round_half_up;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct GridRow {
    row: usize,
    column: usize,
    combined_income: Decimal,
    split_fraction: Decimal,
    delta: Decimal,
}

pub struct GridExporter;

impl GridExporter {
    /// Writes every cell of `grid` as CSV, header first. Returns the number
    /// of cells written.
    pub fn write_csv<W: Write>(
        grid: &ComparisonGrid,
        writer: W,
    ) -> Result<usize, ExportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let mut written = 0;

        for cell in grid.cells() {
            csv_writer.serialize(GridRow {
                row: cell.row,
                column: cell.column,
                combined_income: cell.combined_income.normalize(),
                split_fraction: cell.split_fraction.normalize(),
                delta: round_half_up(cell.delta),
            })?;
            written += 1;
        }

        csv_writer.flush()?;
        Ok(written)
    }
}
