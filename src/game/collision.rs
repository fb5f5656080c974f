//! Axis-aligned bounding-box collision tests

use super::entity::BoundingBox;

/// True if the two rectangles share interior area (touching edges do not count)
#[inline]
pub fn overlaps(a: &BoundingBox, b: &BoundingBox) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Overlap test after trimming `inset` (fraction per side) from both boxes.
///
/// An inset of 0 is the raw sprite rectangle.
#[inline]
pub fn overlaps_with_inset(a: &BoundingBox, b: &BoundingBox, inset: f32) -> bool {
    if inset <= 0.0 {
        return overlaps(a, b);
    }
    overlaps(&a.inset(inset), &b.inset(inset))
}
