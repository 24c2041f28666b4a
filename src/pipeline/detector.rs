//! Inference seam: runs an injected engine, then post-processes its output.

use thiserror::Error;

use crate::labels::{Labels, RenderBox};
use crate::pipeline::PostProcessor;
use crate::rescale::{LetterboxRatios, SelectedBox};
use crate::tensor::RawOutput;
use crate::util::DetPostError;

/// An inference backend producing a raw `[batch, rows, stride]` tensor.
///
/// Model loading, preprocessing and execution all live behind this trait.
pub trait InferenceEngine {
    /// Preprocessed model input, e.g. a normalized image blob.
    type Input: ?Sized;
    type Error: std::error::Error + 'static;

    fn infer(&self, input: &Self::Input) -> Result<RawOutput, Self::Error>;
}

/// Failure of a [`Detector`] call.
#[derive(Debug, Error)]
pub enum DetectError<E: std::error::Error + 'static> {
    #[error("inference failed: {0}")]
    Inference(#[source] E),
    #[error(transparent)]
    Postprocess(#[from] DetPostError),
}

/// An inference engine paired with a post-processor and a label table.
pub struct Detector<E> {
    engine: E,
    processor: PostProcessor,
    labels: Labels,
}

impl<E: InferenceEngine> Detector<E> {
    pub fn new(engine: E, processor: PostProcessor) -> Self {
        Self {
            engine,
            processor,
            labels: Labels::coco(),
        }
    }

    /// Replaces the default COCO label table.
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn processor(&self) -> &PostProcessor {
        &self.processor
    }

    /// Runs inference on one preprocessed input and post-processes the result.
    pub fn detect(
        &self,
        input: &E::Input,
        ratios: LetterboxRatios,
    ) -> Result<Vec<SelectedBox>, DetectError<E::Error>> {
        let raw = self.engine.infer(input).map_err(DetectError::Inference)?;
        Ok(self.processor.run(raw.view(), ratios)?)
    }

    /// Like [`detect`](Self::detect), returning renderer records.
    pub fn detect_render(
        &self,
        input: &E::Input,
        ratios: LetterboxRatios,
    ) -> Result<Vec<RenderBox>, DetectError<E::Error>> {
        let selected = self.detect(input, ratios)?;
        Ok(selected
            .iter()
            .map(|selected| selected.to_render(&self.labels))
            .collect())
    }
}
