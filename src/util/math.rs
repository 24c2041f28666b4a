//! Numeric helpers shared by the decoder and the suppressor.

use std::cmp::Ordering;

/// Maps NaN and infinities to negative infinity.
///
/// A non-finite score can never pass a threshold in `[0, 1]`.
#[inline]
pub(crate) fn finite_or_neg_inf(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        f32::NEG_INFINITY
    }
}

/// Returns the index and value of the largest element.
///
/// Non-finite values compare as negative infinity; ties keep the lowest index.
/// Returns `None` only for an empty slice.
pub(crate) fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    let mut iter = values.iter().copied().map(finite_or_neg_inf).enumerate();
    let mut best = iter.next()?;
    for (idx, value) in iter {
        if value > best.1 {
            best = (idx, value);
        }
    }
    Some(best)
}

/// Ascending score order with NaN treated as negative infinity.
#[inline]
pub(crate) fn score_cmp_asc(a: f32, b: f32) -> Ordering {
    let a = if a.is_nan() { f32::NEG_INFINITY } else { a };
    let b = if b.is_nan() { f32::NEG_INFINITY } else { b };
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Returns true when `value` is a finite number in `[0, 1]`.
#[inline]
pub(crate) fn is_unit_interval(value: f32) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}
