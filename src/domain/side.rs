//! Binary side of a market: the position a stake backs, or the outcome a
//! market resolves to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// YES or NO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }

    /// Lowercase name, as persisted.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    /// Parse an outcome submitted by a resolver.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOutcome`] for anything but yes/no.
    pub fn parse_outcome(value: &str) -> Result<Self, DomainError> {
        parse(value).ok_or_else(|| DomainError::InvalidOutcome {
            value: value.to_string(),
        })
    }
}

fn parse(value: &str) -> Option<Side> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" => Some(Side::Yes),
        "no" | "n" => Some(Side::No),
        _ => None,
    }
}

impl FromStr for Side {
    type Err = DomainError;

    /// Parse a stake position.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s).ok_or_else(|| DomainError::InvalidPosition {
            value: s.to_string(),
        })
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
