//! Overlap measures between boxes.
//!
//! Box extents are pixel-inclusive: a box of width `w` covers `w + 1` pixels,
//! so even a zero-width box has unit area.

use crate::candidate::BoundingBox;

/// Area of `bbox` under the inclusive `(w + 1) * (h + 1)` convention.
#[inline]
pub fn inclusive_area(bbox: &BoundingBox) -> f32 {
    (bbox.w + 1.0) * (bbox.h + 1.0)
}

/// Inclusive area of the intersection rectangle of `a` and `b`.
///
/// Each overlap extent is capped at both boxes' own extents, so a nested or
/// duplicate box never reports more area than its own [`inclusive_area`].
#[inline]
pub fn intersection_area(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let xx1 = a.x.max(b.x);
    let yy1 = a.y.max(b.y);
    let xx2 = a.right().min(b.right());
    let yy2 = a.bottom().min(b.bottom());
    let overlap_w = ((xx2 - xx1).min(a.w).min(b.w) + 1.0).max(0.0);
    let overlap_h = ((yy2 - yy1).min(a.h).min(b.h) + 1.0).max(0.0);
    overlap_w * overlap_h
}

/// Fraction of `bbox` covered by `reference`, measured over `bbox`'s own area.
///
/// Not symmetric: a small box inside a large one scores 1 against it, while
/// the large box scores less against the small one. Degenerate boxes with a
/// non-positive inclusive area report zero overlap.
#[inline]
pub fn own_area_overlap(bbox: &BoundingBox, reference: &BoundingBox) -> f32 {
    let area = inclusive_area(bbox);
    if area.is_nan() || area <= 0.0 {
        return 0.0;
    }
    intersection_area(bbox, reference) / area
}

/// Symmetric intersection-over-union with inclusive areas.
#[inline]
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let inter = intersection_area(a, b);
    let union = inclusive_area(a) + inclusive_area(b) - inter;
    if union.is_nan() || union <= 0.0 {
        return 0.0;
    }
    (inter / union).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::{inclusive_area, intersection_area, iou, own_area_overlap};
    use crate::candidate::BoundingBox;

    #[test]
    fn zero_width_box_covers_one_pixel() {
        let point = BoundingBox::new(5.0, 5.0, 0.0, 0.0);
        assert_eq!(inclusive_area(&point), 1.0);
        assert_eq!(intersection_area(&point, &point), 1.0);
    }

    #[test]
    fn boxes_sharing_an_edge_overlap_by_one_pixel_column() {
        let left = BoundingBox::new(0.0, 0.0, 9.0, 9.0);
        let right = BoundingBox::new(9.0, 0.0, 9.0, 9.0);
        assert_eq!(intersection_area(&left, &right), 10.0);
        assert!((own_area_overlap(&left, &right) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn disjoint_boxes_do_not_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(100.0, 100.0, 10.0, 10.0);
        assert_eq!(intersection_area(&a, &b), 0.0);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn own_area_overlap_is_directional() {
        let small = BoundingBox::new(2.0, 2.0, 3.0, 3.0);
        let large = BoundingBox::new(0.0, 0.0, 19.0, 19.0);
        assert_eq!(own_area_overlap(&small, &large), 1.0);
        assert!((own_area_overlap(&large, &small) - 16.0 / 400.0).abs() < 1e-6);
        assert!((iou(&small, &large) - 16.0 / 400.0).abs() < 1e-6);
    }

    #[test]
    fn fractional_nested_boxes_overlap_at_most_one() {
        // right() - x rounds above w for these coordinates.
        let outer = BoundingBox::new(493.10013, 162.91306, 104.06205, 192.55794);
        let inner = BoundingBox::new(500.3, 170.7, 50.15, 90.35);
        for overlap in [
            own_area_overlap(&outer, &outer),
            iou(&outer, &outer),
            own_area_overlap(&inner, &outer),
        ] {
            assert!(overlap <= 1.0, "overlap {overlap} exceeds 1");
            assert!(overlap > 0.999);
        }
        assert!(iou(&inner, &outer) < 0.5);
    }

    #[test]
    fn degenerate_area_reports_no_overlap() {
        let inverted = BoundingBox::new(0.0, 0.0, -1.0, 4.0);
        let other = BoundingBox::new(0.0, 0.0, 4.0, 4.0);
        assert_eq!(own_area_overlap(&inverted, &other), 0.0);
    }
}
