//! Sex of a user, stored as a small integer code

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sex of a user. The numeric codes are part of the public API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Numeric code used by storage and the API (male = 0, female = 1)
    #[inline]
    pub fn code(self) -> i16 {
        match self {
            Self::Male => 0,
            Self::Female => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl TryFrom<i16> for Sex {
    type Error = SexParseError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Male),
            1 => Ok(Self::Female),
            other => Err(SexParseError(i64::from(other))),
        }
    }
}

impl TryFrom<i64> for Sex {
    type Error = SexParseError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        i16::try_from(code)
            .map_err(|_| SexParseError(code))
            .and_then(Self::try_from)
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for a sex code outside {0, 1}
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sex must be 0 (male) or 1 (female), got {0}")]
pub struct SexParseError(pub i64);
