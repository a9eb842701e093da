//! Filter for listing segments by soft-delete state

use std::fmt;
use std::str::FromStr;

/// Which segments a listing should return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentFilter {
    /// Only segments that are not soft-deleted
    Alive,
    /// Only soft-deleted segments
    Deleted,
    /// Every segment regardless of state
    #[default]
    Both,
}

impl SegmentFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alive => "alive",
            Self::Deleted => "deleted",
            Self::Both => "both",
        }
    }

    /// Whether a segment with the given deletion flag passes the filter
    #[inline]
    pub fn matches(self, is_deleted: bool) -> bool {
        match self {
            Self::Alive => !is_deleted,
            Self::Deleted => is_deleted,
            Self::Both => true,
        }
    }
}

impl FromStr for SegmentFilter {
    type Err = SegmentFilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alive" => Ok(Self::Alive),
            "deleted" => Ok(Self::Deleted),
            "both" => Ok(Self::Both),
            other => Err(SegmentFilterParseError(other.to_string())),
        }
    }
}

impl fmt::Display for SegmentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown segment type '{0}', expected one of: alive, deleted, both")]
pub struct SegmentFilterParseError(pub String);
