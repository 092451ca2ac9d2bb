//! Federal income tax arithmetic for comparing married and unmarried
//! two-earner households.
//!
//! The crate is split into three layers:
//!
//! - [`models`]: filing statuses, dependent counts, tax years and the rate
//!   table row types.
//! - [`tables`]: the immutable rate tables for each supported tax year.
//! - [`calculations`]: bracket tax, the earned income tax credit, the
//!   per-household combination and the comparison grid.

pub mod calculations;
pub mod models;
pub mod tables;

pub use calculations::{
    ComparisonGrid, DisplayMode, GridCell, GridConfig, GridConfigError, GridError, TaxBreakdown,
    TaxCalculator,
};
pub use models::*;
pub use tables::{TaxTables, TaxTablesError};
