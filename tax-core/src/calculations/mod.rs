//! Tax calculations for married and unmarried two-earner households.
//!
//! This module provides bracket tax, the earned income tax credit, the
//! household combination of both, and the comparison grid built on top.

pub mod bracket_tax;
pub mod common;
pub mod comparison;
pub mod eitc;
pub mod tax_due;

pub use comparison::{ComparisonGrid, DisplayMode, GridCell, GridConfig, GridConfigError, GridError};
pub use tax_due::{TaxBreakdown, TaxCalculator};
