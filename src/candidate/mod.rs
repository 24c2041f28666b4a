//! Candidate detections and their suppression.
//!
//! Includes the box types shared by every stage, overlap measures and greedy
//! non-maximum suppression.

pub(crate) mod nms;
pub(crate) mod overlap;

use crate::util::math::score_cmp_asc;

/// Axis-aligned box in corner form: `(x, y)` is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Converts a center-form `(cx, cy, w, h)` box to corner form.
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            x: cx - 0.5 * w,
            y: cy - 0.5 * h,
            w,
            h,
        }
    }

    /// Right edge, `x + w`.
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge, `y + h`.
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }

    /// Returns `[x, y, w, h]`.
    pub fn to_array(&self) -> [f32; 4] {
        [self.x, self.y, self.w, self.h]
    }
}

/// A decoded row that passed both thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CandidateBox {
    /// Index of the best-scoring class.
    pub class_id: u32,
    /// Objectness reported by the model.
    pub confidence: f32,
    /// Probability of `class_id`.
    pub class_probability: f32,
    /// Ranking score used by suppression, see [`ScoreMode`](crate::ScoreMode).
    pub score: f32,
    /// Box in model-input pixel space.
    pub bounding: BoundingBox,
}

/// Keeps the `limit` highest-scoring candidates, preserving input order.
///
/// Equal scores favour the candidate that appears later, matching the
/// suppression tie-break.
pub fn retain_top_scoring(candidates: Vec<CandidateBox>, limit: usize) -> Vec<CandidateBox> {
    if candidates.len() <= limit {
        return candidates;
    }
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| score_cmp_asc(candidates[a].score, candidates[b].score));

    let mut keep = vec![false; candidates.len()];
    for &idx in order.iter().rev().take(limit) {
        keep[idx] = true;
    }
    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(candidate, kept)| kept.then_some(candidate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{retain_top_scoring, BoundingBox, CandidateBox};

    fn candidate(score: f32) -> CandidateBox {
        CandidateBox {
            class_id: 0,
            confidence: score,
            class_probability: score,
            score,
            bounding: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
        }
    }

    #[test]
    fn from_center_moves_origin_to_top_left() {
        let bbox = BoundingBox::from_center(50.0, 40.0, 20.0, 10.0);
        assert_eq!(bbox, BoundingBox::new(40.0, 35.0, 20.0, 10.0));
        assert_eq!(bbox.right(), 60.0);
        assert_eq!(bbox.bottom(), 45.0);
    }

    #[test]
    fn retain_top_scoring_keeps_input_order() {
        let kept = retain_top_scoring(
            vec![candidate(0.3), candidate(0.9), candidate(0.1), candidate(0.6)],
            2,
        );
        let scores: Vec<f32> = kept.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![0.9, 0.6]);
    }

    #[test]
    fn retain_top_scoring_prefers_later_on_ties() {
        let mut first = candidate(0.5);
        first.class_id = 1;
        let mut second = candidate(0.5);
        second.class_id = 2;
        let kept = retain_top_scoring(vec![first, second], 1);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].class_id, 2);
    }
}
