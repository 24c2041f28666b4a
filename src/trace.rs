//! Stage spans and count events for the post-processing pipeline.
//!
//! Spans in use: `decode`, `decode_par`, `decode_exported`, `suppress`,
//! `rescale`, `postprocess` and `postprocess_exported`, each carrying the
//! number of rows or boxes it received. Every stage closes with a `*_done`
//! event reporting how many boxes it produced (`suppress_done` also reports
//! how many were suppressed). Without the `tracing` feature all of this
//! compiles away.

/// Opens an info span named after a stage, e.g. `trace_span!("decode", rows = n)`.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr, $($field:tt)+) => {
        tracing::info_span!($name, $($field)+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr, $($field:tt)+) => {
        $crate::trace::NoopSpan
    };
}

/// Emits a stage's box counts, e.g. `trace_event!("rescale_done", boxes = n)`.
///
/// The count expressions are evaluated either way.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
}

pub(crate) use trace_event;
pub(crate) use trace_span;

/// Guard returned by `trace_span!` when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
