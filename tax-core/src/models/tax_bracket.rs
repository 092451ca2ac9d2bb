use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a marginal rate schedule.
///
/// Brackets are stored in ascending order; each bracket starts where the
/// previous one ends. The top bracket has no upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        max_income: Option<Decimal>,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            max_income,
            tax_rate,
        }
    }
}
