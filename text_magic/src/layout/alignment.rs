// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{CharacterMetrics, RowMetrics};
use crate::document::TextAlign;
use crate::util::nearly_zero;

/// Shifts the characters of each row to honour `alignment`.
///
/// Must run after every row is final, since each offset depends on the row's natural width.
pub(crate) fn align(
    rows: &[RowMetrics],
    characters: &mut [CharacterMetrics],
    alignment_width: f32,
    alignment: TextAlign,
) {
    for row in rows {
        if row.is_empty() {
            continue;
        }

        // Compute free space.
        let free_space = alignment_width - row.width;
        if free_space <= 0.0 || nearly_zero(free_space) {
            continue;
        }

        let offset = match alignment {
            TextAlign::Left => continue,
            TextAlign::Right => free_space,
            TextAlign::Center => free_space * 0.5,
        };
        for character in &mut characters[row.start_index..=row.end_index] {
            character.x += offset;
        }
    }
}
