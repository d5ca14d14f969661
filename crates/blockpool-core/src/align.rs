//! Alignment helpers for block sizes.

use crate::constants::WORST_CASE_ALIGN;

/// Round `size` up to the next multiple of `align`.
///
/// `align` must be a power of two. Returns `None` if the result would overflow.
#[must_use]
pub const fn align_up(size: usize, align: usize) -> Option<usize> {
    match size.checked_add(align - 1) {
        Some(padded) => Some(padded & !(align - 1)),
        None => None,
    }
}

/// Adjust a requested element size to the worst-case alignment boundary.
///
/// A zero-sized request gets one full alignment unit so the link word of a
/// free block always fits. Sizes too large to round saturate to the largest
/// aligned value; provisioning such a pool fails with out-of-memory.
#[must_use]
pub const fn adjust_to_worst_case(size: usize) -> usize {
    if size == 0 {
        return WORST_CASE_ALIGN;
    }
    match align_up(size, WORST_CASE_ALIGN) {
        Some(aligned) => aligned,
        None => usize::MAX & !(WORST_CASE_ALIGN - 1),
    }
}
