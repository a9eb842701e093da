//! Value objects - immutable types that represent domain concepts

mod segment_filter;
mod sex;
mod timestamp;

pub use segment_filter::{SegmentFilter, SegmentFilterParseError};
pub use sex::{Sex, SexParseError};
pub use timestamp::{format_timestamp, parse_timestamp, TIMESTAMP_FORMAT};
