// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::RangeInclusive;

use peniko::Color;
use peniko::kurbo::Rect;

use super::CursorInfo;
use crate::layout::TextMetrics;
use crate::util::to_index;

/// An anchor/focus pair of gaps.
///
/// The two ends are not ordered; [`SelectRange::normalized`] yields the selected characters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectRange {
    /// The gap where the selection started.
    pub start: CursorInfo,
    /// The gap the selection was extended to.
    pub end: CursorInfo,
    /// Fill color of the selection.
    pub color: Color,
    /// Opacity applied to `color`.
    pub opacity: f32,
}

impl SelectRange {
    /// Creates an empty selection with the given appearance.
    pub fn new(color: Color, opacity: f32) -> Self {
        Self {
            start: CursorInfo::BEFORE_FIRST,
            end: CursorInfo::BEFORE_FIRST,
            color,
            opacity,
        }
    }

    /// Sets both ends.
    pub fn set(&mut self, start: CursorInfo, end: CursorInfo) {
        self.start = start;
        self.end = end;
    }

    /// Collapses the selection to empty.
    pub fn clear(&mut self) {
        self.set(CursorInfo::BEFORE_FIRST, CursorInfo::BEFORE_FIRST);
    }

    /// Returns `true` if both ends are the same gap.
    pub fn is_empty(&self) -> bool {
        self.start.after_character_index == self.end.after_character_index
    }

    /// The selected characters as an ascending inclusive range, or `None` when empty.
    pub fn normalized(&self) -> Option<RangeInclusive<usize>> {
        if self.is_empty() {
            return None;
        }
        let low = self
            .start
            .after_character_index
            .min(self.end.after_character_index);
        let high = self
            .start
            .after_character_index
            .max(self.end.after_character_index);
        Some(to_index(low + 1)?..=to_index(high)?)
    }

    /// The selection fill with opacity applied.
    pub fn fill_color(&self) -> Color {
        self.color.multiply_alpha(self.opacity)
    }

    /// One rectangle per selected character, spanning its row's content box.
    pub fn rects(&self, metrics: &TextMetrics) -> Vec<Rect> {
        let Some(range) = self.normalized() else {
            return Vec::new();
        };
        metrics
            .all_character
            .get(range)
            .unwrap_or_default()
            .iter()
            .filter_map(|character| {
                let row = metrics.rows.get(character.which_row)?;
                Some(Rect::new(
                    f64::from(character.x),
                    f64::from(row.content_top),
                    f64::from(character.x + character.width),
                    f64::from(row.content_top + row.content_height),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::SelectRange;
    use crate::editing::CursorInfo;
    use peniko::color::palette::css;

    #[test]
    fn same_gap_is_empty() {
        let mut range = SelectRange::new(css::BLUE, 0.2);
        range.set(CursorInfo::after(3), CursorInfo::before_next(3));
        assert!(range.is_empty());
        assert_eq!(range.normalized(), None);
    }

    #[test]
    fn ends_are_ordered_on_read() {
        let mut range = SelectRange::new(css::BLUE, 0.2);
        range.set(CursorInfo::after(4), CursorInfo::BEFORE_FIRST);
        assert_eq!(range.normalized(), Some(0..=4));
        range.set(CursorInfo::after(1), CursorInfo::after(2));
        assert_eq!(range.normalized(), Some(2..=2));
    }
}
