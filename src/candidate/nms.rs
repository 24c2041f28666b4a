//! Greedy non-maximum suppression for candidate boxes.
//!
//! Candidates are stably sorted by ascending score and picked from the tail.
//! Each pick suppresses every remaining candidate whose overlap with it exceeds
//! the threshold. Equal scores resolve in favour of the candidate that appears
//! later in the input. Kept candidates are returned in input order, so running
//! suppression again with the same threshold returns the same sequence.

use crate::candidate::overlap::{iou, own_area_overlap};
use crate::candidate::{BoundingBox, CandidateBox};
use crate::trace::{trace_event, trace_span};
use crate::util::math::score_cmp_asc;

/// Overlap measure compared against the suppression threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverlapMode {
    /// Intersection over the remaining candidate's own inclusive area.
    #[default]
    OwnArea,
    /// Symmetric intersection over union, with inclusive areas.
    Iou,
}

impl OverlapMode {
    /// Measures how much `candidate` is covered by the already picked box.
    #[inline]
    pub fn measure(self, candidate: &BoundingBox, picked: &BoundingBox) -> f32 {
        match self {
            OverlapMode::OwnArea => own_area_overlap(candidate, picked),
            OverlapMode::Iou => iou(candidate, picked),
        }
    }
}

/// Whether suppression compares boxes across classes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NmsScope {
    /// Any box may suppress any other box.
    #[default]
    ClassAgnostic,
    /// Boxes only suppress boxes with the same `class_id`.
    PerClass,
}

/// Class-agnostic suppression with the own-area overlap measure.
pub fn suppress(candidates: Vec<CandidateBox>, overlap_threshold: f32) -> Vec<CandidateBox> {
    suppress_with(
        candidates,
        overlap_threshold,
        OverlapMode::OwnArea,
        NmsScope::ClassAgnostic,
    )
}

/// Suppression with an explicit overlap measure and scope.
pub fn suppress_with(
    candidates: Vec<CandidateBox>,
    overlap_threshold: f32,
    mode: OverlapMode,
    scope: NmsScope,
) -> Vec<CandidateBox> {
    let _span = trace_span!("suppress", candidates = candidates.len()).entered();

    let keep = nms_keep_flags(&candidates, overlap_threshold, mode, scope);
    let total = candidates.len();
    let kept: Vec<CandidateBox> = candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(candidate, kept)| kept.then_some(candidate))
        .collect();

    trace_event!(
        "suppress_done",
        kept = kept.len(),
        suppressed = total - kept.len()
    );
    kept
}

/// Returns one flag per candidate, `true` when it survives suppression.
pub fn nms_keep_flags(
    candidates: &[CandidateBox],
    overlap_threshold: f32,
    mode: OverlapMode,
    scope: NmsScope,
) -> Vec<bool> {
    let mut keep = vec![false; candidates.len()];
    match scope {
        NmsScope::ClassAgnostic => {
            let members: Vec<usize> = (0..candidates.len()).collect();
            greedy_pick(candidates, members, overlap_threshold, mode, &mut keep);
        }
        NmsScope::PerClass => {
            let mut class_ids: Vec<u32> = candidates.iter().map(|c| c.class_id).collect();
            class_ids.sort_unstable();
            class_ids.dedup();
            for class_id in class_ids {
                let members: Vec<usize> = candidates
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.class_id == class_id)
                    .map(|(idx, _)| idx)
                    .collect();
                greedy_pick(candidates, members, overlap_threshold, mode, &mut keep);
            }
        }
    }
    keep
}

fn greedy_pick(
    candidates: &[CandidateBox],
    mut order: Vec<usize>,
    overlap_threshold: f32,
    mode: OverlapMode,
    keep: &mut [bool],
) {
    if order.is_empty() {
        return;
    }
    // Stable: equal scores stay in input order, so the later one is picked first.
    order.sort_by(|&a, &b| score_cmp_asc(candidates[a].score, candidates[b].score));

    let mut removed = vec![false; order.len()];
    for pos in (0..order.len()).rev() {
        if removed[pos] {
            continue;
        }
        let picked = &candidates[order[pos]].bounding;
        keep[order[pos]] = true;

        for other in 0..pos {
            if removed[other] {
                continue;
            }
            let bbox = &candidates[order[other]].bounding;
            if mode.measure(bbox, picked) > overlap_threshold {
                removed[other] = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{suppress, suppress_with, NmsScope, OverlapMode};
    use crate::candidate::{BoundingBox, CandidateBox};

    fn boxed(class_id: u32, score: f32, x: f32, y: f32, w: f32, h: f32) -> CandidateBox {
        CandidateBox {
            class_id,
            confidence: score,
            class_probability: score,
            score,
            bounding: BoundingBox::new(x, y, w, h),
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(suppress(Vec::new(), 0.5).is_empty());
    }

    #[test]
    fn single_candidate_is_always_kept() {
        let only = boxed(0, 0.1, 0.0, 0.0, 5.0, 5.0);
        assert_eq!(suppress(vec![only], 0.0), vec![only]);
    }

    #[test]
    fn small_box_inside_large_box_is_suppressed_only_by_own_area() {
        let large = boxed(0, 0.9, 0.0, 0.0, 99.0, 99.0);
        let small = boxed(0, 0.5, 40.0, 40.0, 9.0, 9.0);

        let own = suppress(vec![large, small], 0.5);
        assert_eq!(own, vec![large]);

        let symmetric = suppress_with(
            vec![large, small],
            0.5,
            OverlapMode::Iou,
            NmsScope::ClassAgnostic,
        );
        assert_eq!(symmetric, vec![large, small]);
    }

    #[test]
    fn lower_score_does_not_suppress_higher_score() {
        // The small box scores higher, so it is picked first and the large box
        // barely overlaps it relative to its own area.
        let large = boxed(0, 0.4, 0.0, 0.0, 99.0, 99.0);
        let small = boxed(0, 0.8, 40.0, 40.0, 9.0, 9.0);
        assert_eq!(suppress(vec![large, small], 0.5), vec![large, small]);
    }

    #[test]
    fn nan_scores_rank_below_everything() {
        let nan = boxed(0, f32::NAN, 0.0, 0.0, 10.0, 10.0);
        let low = boxed(0, 0.01, 0.0, 0.0, 10.0, 10.0);
        let kept = suppress(vec![nan, low], 0.5);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 0.01);
    }
}
