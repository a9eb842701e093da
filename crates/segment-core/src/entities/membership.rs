//! Membership records - the interval a user spent in a segment

use chrono::{DateTime, Utc};

/// One `[start_date, end_date)` interval during which a user belonged to a segment.
///
/// `end_date = None` means the membership is open. A record whose `end_date`
/// lies in the future is still active until that instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub id: i64,
    pub user_id: i64,
    pub segment_id: i64,
    /// Denormalized for reporting
    pub segment_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Membership {
    /// Whether the user is in the segment at `now`
    #[inline]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.end_date.is_none_or(|end| end > now)
    }
}

/// A membership about to be inserted for some user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembership {
    pub segment_id: i64,
    pub segment_name: String,
    pub end_date: Option<DateTime<Utc>>,
}
