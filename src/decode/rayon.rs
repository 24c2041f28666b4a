//! Rayon-parallel row decoding (feature-gated).
//!
//! Rows are independent, so they are decoded in parallel chunks. The collected
//! candidates keep buffer order and match [`decode`](super::decode) exactly.

use crate::candidate::CandidateBox;
use crate::decode::{check_dense_stride, decode_row, DecodeParams};
use crate::tensor::RawOutputView;
use crate::trace::{trace_event, trace_span};
use crate::util::DetPostResult;
use rayon::prelude::*;

/// Parallel counterpart of [`decode`](super::decode).
pub fn decode_par(
    raw: RawOutputView<'_>,
    params: DecodeParams,
) -> DetPostResult<Vec<CandidateBox>> {
    params.validate()?;
    let _span = trace_span!("decode_par", rows = raw.total_rows()).entered();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    check_dense_stride(raw.row_stride())?;

    let candidates: Vec<CandidateBox> = raw
        .as_slice()
        .par_chunks_exact(raw.row_stride())
        .filter_map(|row| decode_row(row, &params))
        .collect();

    trace_event!("decode_done", candidates = candidates.len());
    Ok(candidates)
}
