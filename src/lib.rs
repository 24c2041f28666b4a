//! detpost turns raw object-detector output into renderable boxes.
//!
//! The pipeline has three pure stages:
//!
//! 1. [`decode`] reads `[cx, cy, w, h, objectness, class scores..]` rows and
//!    keeps those passing both the objectness and class thresholds;
//! 2. [`suppress`] runs greedy non-maximum suppression;
//! 3. [`rescale`] maps boxes back through letterbox padding.
//!
//! [`PostProcessor`] chains them behind a validated [`PostprocessConfig`], and
//! [`Detector`] adds an injected [`InferenceEngine`] in front. Row decoding can
//! run in parallel with the `rayon` feature.

mod candidate;
pub mod decode;
#[cfg(feature = "image-io")]
pub mod io;
pub mod labels;
pub mod lowlevel;
pub mod pipeline;
pub mod rescale;
pub mod tensor;
mod trace;
pub mod util;

pub use candidate::nms::{suppress, suppress_with, NmsScope, OverlapMode};
pub use candidate::{BoundingBox, CandidateBox};
pub use decode::{decode, decode_exported, DecodeParams, ScoreMode};
pub use labels::{Label, Labels, RenderBox};
pub use pipeline::{
    DetectError, Detector, InferenceEngine, PostProcessor, PostprocessConfig,
};
pub use rescale::{rescale, LetterboxRatios, SelectedBox};
pub use tensor::{RawOutput, RawOutputView};
pub use util::{DetPostError, DetPostResult};

#[cfg(feature = "rayon")]
pub use decode::rayon::decode_par;
