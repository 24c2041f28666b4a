//! Mapping boxes from model-input space back to the original image.
//!
//! Upstream preprocessing pads a `width x height` image onto a square canvas of
//! side `max(width, height)`. The ratios `max/width` and `max/height` undo that
//! padding. Scaled coordinates are floored, which is what renderers rasterize.

use crate::candidate::{BoundingBox, CandidateBox};
use crate::trace::{trace_event, trace_span};
use crate::util::{DetPostError, DetPostResult};

/// Per-axis scale factors produced by letterbox preprocessing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LetterboxRatios {
    x_ratio: f32,
    y_ratio: f32,
}

impl LetterboxRatios {
    /// Ratios for an image that was not padded.
    pub const IDENTITY: Self = Self {
        x_ratio: 1.0,
        y_ratio: 1.0,
    };

    /// Creates ratios, rejecting non-finite or non-positive values.
    pub fn new(x_ratio: f32, y_ratio: f32) -> DetPostResult<Self> {
        validate_ratio("x_ratio", x_ratio)?;
        validate_ratio("y_ratio", y_ratio)?;
        Ok(Self { x_ratio, y_ratio })
    }

    /// Ratios for padding a `width x height` image to a square canvas.
    pub fn from_dims(width: usize, height: usize) -> DetPostResult<Self> {
        if width == 0 || height == 0 {
            return Err(DetPostError::InvalidShape {
                reason: "image dimensions must be non-zero",
            });
        }
        let max_size = width.max(height) as f32;
        Self::new(max_size / width as f32, max_size / height as f32)
    }

    pub fn x_ratio(&self) -> f32 {
        self.x_ratio
    }

    pub fn y_ratio(&self) -> f32 {
        self.y_ratio
    }

    /// Returns true when both ratios are exactly one.
    pub fn is_identity(&self) -> bool {
        self.x_ratio == 1.0 && self.y_ratio == 1.0
    }
}

impl Default for LetterboxRatios {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A suppression survivor with its box in original-image space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectedBox {
    pub class_id: u32,
    /// Objectness reported by the model.
    pub confidence: f32,
    /// Probability of `class_id`; this is what renderers display.
    pub probability: f32,
    pub score: f32,
    pub bounding: BoundingBox,
}

impl From<CandidateBox> for SelectedBox {
    fn from(candidate: CandidateBox) -> Self {
        Self {
            class_id: candidate.class_id,
            confidence: candidate.confidence,
            probability: candidate.class_probability,
            score: candidate.score,
            bounding: candidate.bounding,
        }
    }
}

/// Scales and floors every box; identity ratios leave coordinates untouched.
pub fn rescale(boxes: Vec<CandidateBox>, ratios: LetterboxRatios) -> Vec<SelectedBox> {
    let _span = trace_span!("rescale", boxes = boxes.len()).entered();

    let identity = ratios.is_identity();
    let selected: Vec<SelectedBox> = boxes
        .into_iter()
        .map(|candidate| {
            let mut selected = SelectedBox::from(candidate);
            if !identity {
                selected.bounding = scale_floor(&candidate.bounding, ratios);
            }
            selected
        })
        .collect();

    trace_event!("rescale_done", boxes = selected.len());
    selected
}

#[inline]
fn scale_floor(bbox: &BoundingBox, ratios: LetterboxRatios) -> BoundingBox {
    BoundingBox {
        x: (bbox.x * ratios.x_ratio).floor(),
        y: (bbox.y * ratios.y_ratio).floor(),
        w: (bbox.w * ratios.x_ratio).floor(),
        h: (bbox.h * ratios.y_ratio).floor(),
    }
}

fn validate_ratio(name: &'static str, value: f32) -> DetPostResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DetPostError::InvalidRatio { name, value });
    }
    Ok(())
}
