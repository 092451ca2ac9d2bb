use std::fmt;

use serde::{Deserialize, Serialize};

/// A tax year with built-in rate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaxYear {
    Y2019,
    Y2020,
}

impl TaxYear {
    pub const ALL: [TaxYear; 2] = [Self::Y2019, Self::Y2020];

    pub fn from_year(year: i32) -> Option<Self> {
        match year {
            2019 => Some(Self::Y2019),
            2020 => Some(Self::Y2020),
            _ => None,
        }
    }

    pub fn year(&self) -> i32 {
        match self {
            Self::Y2019 => 2019,
            Self::Y2020 => 2020,
        }
    }
}

impl fmt::Display for TaxYear {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.year())
    }
}
