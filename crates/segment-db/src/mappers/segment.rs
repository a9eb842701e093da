//! Segment model -> entity mapper

use segment_core::entities::Segment;

use crate::models::SegmentModel;

impl From<SegmentModel> for Segment {
    fn from(model: SegmentModel) -> Self {
        Segment {
            id: model.id,
            name: model.name,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
        }
    }
}
