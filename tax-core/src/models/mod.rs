mod dependents;
mod eitc_parameters;
mod filing_status;
mod tax_bracket;
mod tax_settings;
mod tax_year;

pub use dependents::DependentCount;
pub use eitc_parameters::EitcParameters;
pub use filing_status::FilingStatus;
pub use tax_bracket::TaxBracket;
pub use tax_settings::{ParseSettingsError, TaxSettings};
pub use tax_year::TaxYear;
