//! Python bindings for the detpost post-processing library.
//!
//! This module exposes the decode, suppress and rescale pipeline to Python
//! via PyO3, taking detector outputs as numpy arrays.

use numpy::{PyReadonlyArray1, PyReadonlyArray2, PyReadonlyArray3, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use detpost::lowlevel::{nms_keep_flags, validate_threshold};
use detpost::{
    BoundingBox, CandidateBox, DetPostError, Labels, LetterboxRatios, NmsScope,
    OverlapMode as RustOverlapMode, PostProcessor, PostprocessConfig as RustPostprocessConfig,
    RawOutputView, ScoreMode as RustScoreMode, SelectedBox,
};

/// Convert a DetPostError to a Python exception.
fn to_py_err(err: DetPostError) -> PyErr {
    match err {
        DetPostError::ImageIo { .. } => PyRuntimeError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn parse_score_mode(value: &str) -> PyResult<RustScoreMode> {
    match value.to_lowercase().as_str() {
        "objectness_times_class" => Ok(RustScoreMode::ObjectnessTimesClass),
        "class_only" => Ok(RustScoreMode::ClassOnly),
        _ => Err(PyValueError::new_err(
            "score_mode must be 'objectness_times_class' or 'class_only'",
        )),
    }
}

fn parse_overlap_mode(value: &str) -> PyResult<RustOverlapMode> {
    match value.to_lowercase().as_str() {
        "own_area" => Ok(RustOverlapMode::OwnArea),
        "iou" => Ok(RustOverlapMode::Iou),
        _ => Err(PyValueError::new_err("overlap_mode must be 'own_area' or 'iou'")),
    }
}

/// A detection in original-image pixels.
#[pyclass]
#[derive(Clone)]
pub struct Detection {
    /// Class name, or the class id as text when no name is known.
    #[pyo3(get)]
    pub label: String,
    #[pyo3(get)]
    pub class_id: u32,
    /// Probability of the predicted class.
    #[pyo3(get)]
    pub probability: f32,
    /// Ranking score used by suppression.
    #[pyo3(get)]
    pub score: f32,
    /// `(x, y, w, h)` with `(x, y)` the top-left corner.
    #[pyo3(get)]
    pub bounding: (f32, f32, f32, f32),
}

#[pymethods]
impl Detection {
    fn __repr__(&self) -> String {
        let (x, y, w, h) = self.bounding;
        format!(
            "Detection(label='{}', probability={:.3}, bounding=({}, {}, {}, {}))",
            self.label, self.probability, x, y, w, h
        )
    }
}

impl Detection {
    fn from_selected(selected: &SelectedBox, labels: &Labels) -> Self {
        let render = selected.to_render(labels);
        let [x, y, w, h] = render.bounding;
        Self {
            label: render.label.to_string(),
            class_id: selected.class_id,
            probability: render.probability,
            score: selected.score,
            bounding: (x, y, w, h),
        }
    }
}

/// Configuration for post-processing.
#[pyclass]
#[derive(Clone)]
pub struct PostprocessConfig {
    inner: RustPostprocessConfig,
}

#[pymethods]
impl PostprocessConfig {
    /// Create a new PostprocessConfig.
    ///
    /// Args:
    ///     confidence_threshold: Minimum objectness (default: 0.25)
    ///     class_threshold: Minimum class probability (default: 0.45)
    ///     overlap_threshold: Suppression overlap threshold (default: 0.45)
    ///     score_mode: "objectness_times_class" or "class_only"
    ///     overlap_mode: "own_area" or "iou" (default: "own_area")
    ///     per_class: Suppress only within a class (default: False)
    ///     max_detections: Optional cap on returned boxes
    ///     parallel: Decode rows in parallel (default: False)
    #[new]
    #[pyo3(signature = (
        confidence_threshold = 0.25,
        class_threshold = 0.45,
        overlap_threshold = 0.45,
        score_mode = "objectness_times_class",
        overlap_mode = "own_area",
        per_class = false,
        max_detections = None,
        parallel = false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        confidence_threshold: f32,
        class_threshold: f32,
        overlap_threshold: f32,
        score_mode: &str,
        overlap_mode: &str,
        per_class: bool,
        max_detections: Option<usize>,
        parallel: bool,
    ) -> PyResult<Self> {
        let inner = RustPostprocessConfig {
            confidence_threshold,
            class_threshold,
            overlap_threshold,
            score_mode: parse_score_mode(score_mode)?,
            overlap_mode: parse_overlap_mode(overlap_mode)?,
            scope: if per_class {
                NmsScope::PerClass
            } else {
                NmsScope::ClassAgnostic
            },
            max_detections,
            parallel,
        };
        inner.validate().map_err(to_py_err)?;
        Ok(Self { inner })
    }

    fn __repr__(&self) -> String {
        format!(
            "PostprocessConfig(confidence_threshold={}, class_threshold={}, overlap_threshold={})",
            self.inner.confidence_threshold,
            self.inner.class_threshold,
            self.inner.overlap_threshold
        )
    }
}

/// Post-process a `[batch, rows, stride]` float32 detector output.
///
/// All rows are treated as one image.
///
/// Args:
///     output: 3D float32 numpy array
///     config: PostprocessConfig (default: PostprocessConfig())
///     x_ratio: Horizontal letterbox ratio (default: 1.0)
///     y_ratio: Vertical letterbox ratio (default: 1.0)
///     labels: Optional list of class names (default: COCO)
///     exported: Rows are [cx, cy, w, h, class_id, score] (default: False)
#[pyfunction]
#[pyo3(signature = (output, config = None, x_ratio = 1.0, y_ratio = 1.0, labels = None, exported = false))]
fn postprocess(
    output: PyReadonlyArray3<'_, f32>,
    config: Option<PostprocessConfig>,
    x_ratio: f32,
    y_ratio: f32,
    labels: Option<Vec<String>>,
    exported: bool,
) -> PyResult<Vec<Detection>> {
    let cfg = config.map(|c| c.inner).unwrap_or_default();
    let processor = PostProcessor::new(cfg).map_err(to_py_err)?;
    let ratios = LetterboxRatios::new(x_ratio, y_ratio).map_err(to_py_err)?;
    let labels = labels.map(Labels::new).unwrap_or_else(Labels::coco);

    let dims = output.shape().to_vec();
    let data = output.as_slice()?;
    let view = RawOutputView::new(data, &dims).map_err(to_py_err)?;

    let selected = if exported {
        processor.run_exported(view, ratios)
    } else {
        processor.run(view, ratios)
    }
    .map_err(to_py_err)?;

    Ok(selected
        .iter()
        .map(|selected| Detection::from_selected(selected, &labels))
        .collect())
}

/// Letterbox ratios `(max/width, max/height)` for an image size.
#[pyfunction]
fn letterbox_ratios(width: usize, height: usize) -> PyResult<(f32, f32)> {
    let ratios = LetterboxRatios::from_dims(width, height).map_err(to_py_err)?;
    Ok((ratios.x_ratio(), ratios.y_ratio()))
}

/// Run suppression over corner-form boxes and return the kept indices.
///
/// Args:
///     boxes: Nx4 float32 array of (x, y, w, h)
///     scores: N float32 array
///     overlap_threshold: Suppression threshold in [0, 1]
///     overlap_mode: "own_area" or "iou" (default: "own_area")
#[pyfunction]
#[pyo3(signature = (boxes, scores, overlap_threshold, overlap_mode = "own_area"))]
fn nms(
    boxes: PyReadonlyArray2<'_, f32>,
    scores: PyReadonlyArray1<'_, f32>,
    overlap_threshold: f32,
    overlap_mode: &str,
) -> PyResult<Vec<usize>> {
    let shape = boxes.shape();
    if shape[1] != 4 {
        return Err(PyValueError::new_err("boxes must have shape (N, 4)"));
    }
    let boxes = boxes.as_slice()?;
    let scores = scores.as_slice()?;
    if scores.len() != shape[0] {
        return Err(PyValueError::new_err("scores must have one entry per box"));
    }
    validate_threshold("overlap_threshold", overlap_threshold).map_err(to_py_err)?;
    let mode = parse_overlap_mode(overlap_mode)?;

    let candidates: Vec<CandidateBox> = boxes
        .chunks_exact(4)
        .zip(scores)
        .map(|(b, &score)| CandidateBox {
            class_id: 0,
            confidence: score,
            class_probability: score,
            score,
            bounding: BoundingBox::new(b[0], b[1], b[2], b[3]),
        })
        .collect();

    let keep = nms_keep_flags(&candidates, overlap_threshold, mode, NmsScope::ClassAgnostic);
    Ok(keep
        .iter()
        .enumerate()
        .filter_map(|(idx, &kept)| kept.then_some(idx))
        .collect())
}

/// Python module for detpost.
#[pymodule]
fn _detpost(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Detection>()?;
    m.add_class::<PostprocessConfig>()?;
    m.add_function(wrap_pyfunction!(postprocess, m)?)?;
    m.add_function(wrap_pyfunction!(letterbox_ratios, m)?)?;
    m.add_function(wrap_pyfunction!(nms, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
