// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Misc helpers.

pub(crate) fn nearly_eq(x: f32, y: f32) -> bool {
    (x - y).abs() < f32::EPSILON
}

pub(crate) fn nearly_zero(x: f32) -> bool {
    nearly_eq(x, 0.)
}

/// Converts a non-negative logical index into a `usize`, rejecting the "before first" sentinel.
pub(crate) fn to_index(index: isize) -> Option<usize> {
    usize::try_from(index).ok()
}

/// Converts a character position into the signed form used by cursors.
pub(crate) fn to_signed(index: usize) -> isize {
    isize::try_from(index).unwrap_or(isize::MAX)
}
