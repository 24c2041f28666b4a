//! Low-level building blocks for custom post-processing pipelines.
//!
//! These expose per-row decoding, threshold validation and the overlap
//! measures behind suppression.
//! Most users should prefer [`PostProcessor`](crate::PostProcessor).

pub use crate::candidate::nms::nms_keep_flags;
pub use crate::candidate::overlap::{inclusive_area, intersection_area, iou, own_area_overlap};
pub use crate::candidate::retain_top_scoring;
pub use crate::decode::{
    decode_row, validate_threshold, CLASS_OFFSET, EXPORTED_ROW_STRIDE, OBJECTNESS_INDEX,
};
