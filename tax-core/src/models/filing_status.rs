use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingStatus {
    Single,
    HeadOfHousehold,
    Married,
    Separately,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 4] = [
        Self::Single,
        Self::HeadOfHousehold,
        Self::Married,
        Self::Separately,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::HeadOfHousehold => "HOH",
            Self::Married => "MFJ",
            Self::Separately => "MFS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "S" => Some(Self::Single),
            "HOH" => Some(Self::HeadOfHousehold),
            "MFJ" => Some(Self::Married),
            "MFS" => Some(Self::Separately),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::HeadOfHousehold => "Head of Household",
            Self::Married => "Married",
            Self::Separately => "Filing Separately",
        }
    }

    /// Married couples file one joint return; every other status files two.
    pub fn is_joint(&self) -> bool {
        matches!(self, Self::Married)
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}
