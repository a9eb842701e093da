//! Membership model -> entity mapper

use segment_core::entities::Membership;

use crate::models::MembershipModel;

impl From<MembershipModel> for Membership {
    fn from(model: MembershipModel) -> Self {
        Membership {
            id: model.id,
            user_id: model.user_id,
            segment_id: model.segment_id,
            segment_name: model.segment_name,
            start_date: model.start_date,
            end_date: model.end_date,
        }
    }
}
