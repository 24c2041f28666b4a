//! End-to-end post-processing: decode, suppress, rescale.
//!
//! `PostProcessor` validates its configuration once and then runs the three
//! stages as pure functions of each call's inputs. It keeps no state between
//! calls, so a caller may drop a frame half way and reuse the processor.

use crate::candidate::nms::{suppress_with, NmsScope, OverlapMode};
use crate::candidate::{retain_top_scoring, CandidateBox};
use crate::decode::{decode, decode_exported, validate_threshold, DecodeParams, ScoreMode};
use crate::rescale::{rescale, LetterboxRatios, SelectedBox};
use crate::tensor::RawOutputView;
use crate::trace::{trace_event, trace_span};
use crate::util::{DetPostError, DetPostResult};

mod detector;

pub use detector::{DetectError, Detector, InferenceEngine};

/// Configuration for [`PostProcessor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostprocessConfig {
    /// Minimum objectness, in `[0, 1]`.
    pub confidence_threshold: f32,
    /// Minimum best-class probability, in `[0, 1]`.
    pub class_threshold: f32,
    /// Overlap above which a lower-ranked box is suppressed, in `[0, 1]`.
    pub overlap_threshold: f32,
    pub score_mode: ScoreMode,
    pub overlap_mode: OverlapMode,
    pub scope: NmsScope,
    /// Upper bound on boxes returned per image, highest scores first.
    pub max_detections: Option<usize>,
    /// Decode rows in parallel (requires the `rayon` feature; ignored otherwise).
    pub parallel: bool,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            class_threshold: 0.45,
            overlap_threshold: 0.45,
            score_mode: ScoreMode::default(),
            overlap_mode: OverlapMode::default(),
            scope: NmsScope::default(),
            max_detections: None,
            parallel: false,
        }
    }
}

impl PostprocessConfig {
    /// Checks every threshold lies in `[0, 1]`.
    pub fn validate(&self) -> DetPostResult<()> {
        self.decode_params().validate()?;
        validate_threshold("overlap_threshold", self.overlap_threshold)
    }

    /// Decoder parameters derived from this configuration.
    pub fn decode_params(&self) -> DecodeParams {
        DecodeParams {
            confidence_threshold: self.confidence_threshold,
            class_threshold: self.class_threshold,
            score_mode: self.score_mode,
        }
    }
}

/// Runs decode, suppression and rescaling with a fixed configuration.
#[derive(Clone, Debug)]
pub struct PostProcessor {
    cfg: PostprocessConfig,
}

impl PostProcessor {
    /// Creates a processor, rejecting invalid thresholds up front.
    pub fn new(cfg: PostprocessConfig) -> DetPostResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &PostprocessConfig {
        &self.cfg
    }

    /// Post-processes dense detector rows.
    ///
    /// All rows of `raw` are treated as one image; see [`run_batch`](Self::run_batch)
    /// for multi-image tensors.
    pub fn run(
        &self,
        raw: RawOutputView<'_>,
        ratios: LetterboxRatios,
    ) -> DetPostResult<Vec<SelectedBox>> {
        let _span = trace_span!("postprocess", rows = raw.total_rows()).entered();

        let candidates = self.decode_candidates(raw)?;
        let kept = suppress_with(
            candidates,
            self.cfg.overlap_threshold,
            self.cfg.overlap_mode,
            self.cfg.scope,
        );
        Ok(self.finish(kept, ratios))
    }

    /// Post-processes each batch entry with its own letterbox ratios.
    pub fn run_batch(
        &self,
        raw: RawOutputView<'_>,
        ratios: &[LetterboxRatios],
    ) -> DetPostResult<Vec<Vec<SelectedBox>>> {
        if ratios.len() != raw.batch_size() {
            return Err(DetPostError::InvalidShape {
                reason: "one letterbox ratio pair is required per batch entry",
            });
        }
        ratios
            .iter()
            .enumerate()
            .map(|(idx, &entry_ratios)| self.run(raw.batch(idx)?, entry_ratios))
            .collect()
    }

    /// Post-processes rows from a model with suppression built into its graph.
    ///
    /// Rows are `[cx, cy, w, h, class_id, score]`; `confidence_threshold` is
    /// applied to the score and no further suppression is run.
    pub fn run_exported(
        &self,
        raw: RawOutputView<'_>,
        ratios: LetterboxRatios,
    ) -> DetPostResult<Vec<SelectedBox>> {
        let _span = trace_span!("postprocess_exported", rows = raw.total_rows()).entered();

        let candidates = decode_exported(raw, self.cfg.confidence_threshold)?;
        Ok(self.finish(candidates, ratios))
    }

    fn decode_candidates(&self, raw: RawOutputView<'_>) -> DetPostResult<Vec<CandidateBox>> {
        let params = self.cfg.decode_params();
        #[cfg(feature = "rayon")]
        {
            if self.cfg.parallel {
                return crate::decode::rayon::decode_par(raw, params);
            }
        }
        decode(raw, params)
    }

    fn finish(&self, kept: Vec<CandidateBox>, ratios: LetterboxRatios) -> Vec<SelectedBox> {
        let kept = match self.cfg.max_detections {
            Some(limit) => retain_top_scoring(kept, limit),
            None => kept,
        };
        let selected = rescale(kept, ratios);
        trace_event!("postprocess_done", selected = selected.len());
        selected
    }
}
