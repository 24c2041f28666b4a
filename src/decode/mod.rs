//! Decoding raw detector rows into candidate boxes.
//!
//! Two row layouts are supported:
//!
//! - dense rows `[cx, cy, w, h, objectness, class_0 .. class_{N-1}]`, decoded
//!   by [`decode`];
//! - rows from models exported with suppression built in,
//!   `[cx, cy, w, h, class_id, score]`, decoded by [`decode_exported`].
//!
//! Boxes are converted from center form to corner form and left unrounded.
//! Rows are decoded across all batch entries in buffer order; use
//! [`RawOutputView::batch`] to decode one image at a time.

use crate::candidate::{BoundingBox, CandidateBox};
use crate::tensor::RawOutputView;
use crate::trace::{trace_event, trace_span};
use crate::util::math::{argmax, finite_or_neg_inf, is_unit_interval};
use crate::util::{DetPostError, DetPostResult};

#[cfg(feature = "rayon")]
pub mod rayon;

/// Offset of the objectness value in a dense row.
pub const OBJECTNESS_INDEX: usize = 4;
/// Offset of the first class score in a dense row.
pub const CLASS_OFFSET: usize = 5;
/// Row width of an exported-suppression model: box, class id, score.
pub const EXPORTED_ROW_STRIDE: usize = 6;

/// How a candidate's ranking score is derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScoreMode {
    /// `objectness * class_probability`.
    #[default]
    ObjectnessTimesClass,
    /// `class_probability` alone.
    ClassOnly,
}

impl ScoreMode {
    #[inline]
    pub fn combine(self, objectness: f32, class_probability: f32) -> f32 {
        match self {
            ScoreMode::ObjectnessTimesClass => objectness * class_probability,
            ScoreMode::ClassOnly => class_probability,
        }
    }
}

/// Thresholds and scoring policy for [`decode`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodeParams {
    /// Minimum objectness for a row to be kept.
    pub confidence_threshold: f32,
    /// Minimum best-class probability for a row to be kept.
    pub class_threshold: f32,
    pub score_mode: ScoreMode,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            class_threshold: 0.45,
            score_mode: ScoreMode::default(),
        }
    }
}

impl DecodeParams {
    /// Checks that both thresholds lie in `[0, 1]`.
    pub fn validate(&self) -> DetPostResult<()> {
        validate_threshold("confidence_threshold", self.confidence_threshold)?;
        validate_threshold("class_threshold", self.class_threshold)
    }
}

/// Decodes dense rows, keeping those that pass both thresholds.
///
/// A row is kept only when its objectness reaches `confidence_threshold` and
/// its best class probability reaches `class_threshold`. Non-finite scores
/// fail both tests, and rows with a non-finite box are dropped. An empty
/// tensor decodes to an empty vector.
pub fn decode(raw: RawOutputView<'_>, params: DecodeParams) -> DetPostResult<Vec<CandidateBox>> {
    params.validate()?;
    let _span = trace_span!("decode", rows = raw.total_rows()).entered();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    check_dense_stride(raw.row_stride())?;

    let candidates: Vec<CandidateBox> = raw
        .rows()
        .filter_map(|row| decode_row(row, &params))
        .collect();

    trace_event!("decode_done", candidates = candidates.len());
    Ok(candidates)
}

/// Decodes a single dense row.
///
/// The row must hold at least one class score.
#[inline]
pub fn decode_row(row: &[f32], params: &DecodeParams) -> Option<CandidateBox> {
    let objectness = finite_or_neg_inf(*row.get(OBJECTNESS_INDEX)?);
    if objectness < params.confidence_threshold {
        return None;
    }
    let (class_id, class_probability) = argmax(row.get(CLASS_OFFSET..)?)?;
    if class_probability < params.class_threshold {
        return None;
    }
    let bounding = BoundingBox::from_center(row[0], row[1], row[2], row[3]);
    if !bounding.is_finite() {
        return None;
    }
    Some(CandidateBox {
        class_id: class_id as u32,
        confidence: objectness,
        class_probability,
        score: params.score_mode.combine(objectness, class_probability),
        bounding,
    })
}

/// Decodes `[cx, cy, w, h, class_id, score]` rows from exported-suppression models.
///
/// The score doubles as confidence and class probability. Rows with a
/// negative or non-finite class id are dropped.
pub fn decode_exported(
    raw: RawOutputView<'_>,
    score_threshold: f32,
) -> DetPostResult<Vec<CandidateBox>> {
    validate_threshold("score_threshold", score_threshold)?;
    let _span = trace_span!("decode_exported", rows = raw.total_rows()).entered();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    if raw.row_stride() < EXPORTED_ROW_STRIDE {
        return Err(DetPostError::InvalidShape {
            reason: "exported rows need a box, a class id and a score",
        });
    }

    let mut candidates = Vec::new();
    for row in raw.rows() {
        let score = finite_or_neg_inf(row[5]);
        if score < score_threshold {
            continue;
        }
        let class_id = row[4];
        if !class_id.is_finite() || class_id < 0.0 {
            continue;
        }
        let bounding = BoundingBox::from_center(row[0], row[1], row[2], row[3]);
        if !bounding.is_finite() {
            continue;
        }
        candidates.push(CandidateBox {
            class_id: class_id.round() as u32,
            confidence: score,
            class_probability: score,
            score,
            bounding,
        });
    }

    trace_event!("decode_done", candidates = candidates.len());
    Ok(candidates)
}

pub(crate) fn check_dense_stride(stride: usize) -> DetPostResult<()> {
    if stride <= CLASS_OFFSET {
        return Err(DetPostError::InvalidShape {
            reason: "dense rows need a box, objectness and at least one class score",
        });
    }
    Ok(())
}

/// Rejects a threshold that is non-finite or outside `[0, 1]`.
pub fn validate_threshold(name: &'static str, value: f32) -> DetPostResult<()> {
    if !is_unit_interval(value) {
        return Err(DetPostError::InvalidThreshold { name, value });
    }
    Ok(())
}
