//! Table and grid I/O for `tax-core`.
//!
//! - [`loader`]: replacement rate tables from CSV.
//! - [`export`]: comparison grids to CSV.
//! - [`logging`]: subscriber setup for the `tax-grid` binary.

pub mod export;
pub mod loader;
pub mod logging;

pub use export::{ExportError, GridExporter};
pub use loader::{BracketRecord, DeductionRecord, EitcRecord, TableLoader, TableLoaderError};
