use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of qualifying children, which selects the EITC parameter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependentCount {
    None,
    One,
    Two,
    ThreeOrMore,
}

impl DependentCount {
    pub const ALL: [DependentCount; 4] = [Self::None, Self::One, Self::Two, Self::ThreeOrMore];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "0",
            Self::One => "1",
            Self::Two => "2",
            Self::ThreeOrMore => "3+",
        }
    }

    /// Parses a dependent code. Any count of three or more maps to
    /// [`DependentCount::ThreeOrMore`].
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "0" => Some(Self::None),
            "1" => Some(Self::One),
            "2" => Some(Self::Two),
            "3+" => Some(Self::ThreeOrMore),
            other => match other.parse::<u32>() {
                Ok(n) if n >= 3 => Some(Self::ThreeOrMore),
                _ => None,
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "No Children",
            Self::One => "One Child",
            Self::Two => "Two Children",
            Self::ThreeOrMore => "Three or More Children",
        }
    }
}

impl fmt::Display for DependentCount {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}
