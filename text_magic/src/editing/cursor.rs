// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::Rect;

use crate::document::{Document, TextAlign};
use crate::layout::{CharacterMetrics, TextMetrics, content_width};
use crate::util::{to_index, to_signed};

/// Which side of a row boundary a [`CursorInfo`] renders on.
///
/// At a soft wrap the gap after the last character of row `N` is the same logical gap as
/// the one before the first character of row `N + 1`. The tag picks the row the caret is
/// drawn on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CursorPosition {
    /// Drawn after the character at
    /// [`after_character_index`](CursorInfo::after_character_index).
    #[default]
    AfterIndex,
    /// Drawn before the character that follows it.
    BeforeNextIndex,
}

/// How a hit on a newline character resolves.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum NewlineBias {
    /// Resolve to the gap before the newline.
    #[default]
    Backward,
    /// Resolve to the gap after the newline.
    Forward,
}

/// A logical gap between two characters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CursorInfo {
    /// Index of the character before the gap; `-1` is before the first character.
    pub after_character_index: isize,
    /// Rendering side at a soft wrap.
    pub cursor_position: CursorPosition,
}

/// Where to draw the caret, in device units.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CaretGeometry {
    /// Left edge of the caret.
    pub x: f32,
    /// Top of the caret.
    pub y: f32,
    /// Height of the caret.
    pub height: f32,
    /// Top of the line box the caret sits in.
    pub row_top: f32,
    /// Bottom of the line box the caret sits in.
    pub row_bottom: f32,
}

impl CaretGeometry {
    /// The caret rectangle with the given stroke width.
    pub fn rect(&self, width: f32) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.x + width),
            f64::from(self.y + self.height),
        )
    }
}

impl CursorInfo {
    /// The gap before the first character.
    pub const BEFORE_FIRST: Self = Self {
        after_character_index: -1,
        cursor_position: CursorPosition::AfterIndex,
    };

    /// The gap after character `index`.
    pub fn after(index: isize) -> Self {
        Self {
            after_character_index: index,
            cursor_position: CursorPosition::AfterIndex,
        }
    }

    /// The gap after character `index`, drawn before the character that follows.
    pub fn before_next(index: isize) -> Self {
        Self {
            after_character_index: index,
            cursor_position: CursorPosition::BeforeNextIndex,
        }
    }

    /// Returns `true` if this is the gap before the first character.
    pub fn is_before_first(&self) -> bool {
        self.after_character_index < 0
    }

    /// Resolves a point in device units to a gap, placing newline hits before the newline.
    pub fn from_point(metrics: &TextMetrics, align: TextAlign, x: f32, y: f32) -> Self {
        Self::from_point_with(metrics, align, x, y, NewlineBias::Backward)
    }

    /// Resolves a point in device units to a gap.
    ///
    /// A `y` above the text yields [`CursorInfo::BEFORE_FIRST`]; a `y` below the last row
    /// is treated as a hit on the last row.
    pub fn from_point_with(
        metrics: &TextMetrics,
        align: TextAlign,
        x: f32,
        y: f32,
        bias: NewlineBias,
    ) -> Self {
        let characters = &metrics.all_character;
        let only_newline = characters.len() == 1 && characters[0].is_newline();
        if characters.is_empty() || only_newline || y < 0.0 {
            return Self::BEFORE_FIRST;
        }
        let Some(last_row) = metrics.rows.len().checked_sub(1) else {
            return Self::BEFORE_FIRST;
        };

        let row_index = metrics
            .rows
            .iter()
            .position(|row| y >= row.top && y <= row.bottom)
            .unwrap_or(last_row);
        let row = &metrics.rows[row_index];
        if row.is_empty() {
            // The row after a trailing newline.
            return Self::after(to_signed(row.end_index));
        }

        let first = &characters[row.start_index];
        let last = &characters[row.end_index];
        let before_start = x < first.x;
        let past_end = x > last.x + last.width;
        let hit = match align {
            TextAlign::Left | TextAlign::Center if past_end => row.end_index,
            TextAlign::Right | TextAlign::Center if before_start => {
                return Self::before_next(to_signed(row.start_index) - 1);
            }
            _ => (row.start_index..=row.end_index)
                .find(|&index| contains_x(&characters[index], x))
                .unwrap_or(if before_start {
                    row.start_index
                } else {
                    row.end_index
                }),
        };
        log::trace!("hit character {hit} on row {row_index} at ({x}, {y})");

        let target = &characters[hit];
        let hit = to_signed(hit);
        if target.is_newline() {
            return Self::after(match bias {
                NewlineBias::Backward => hit - 1,
                NewlineBias::Forward => hit,
            });
        }

        let index = if x < target.x + target.width * 0.5 {
            hit - 1
        } else {
            hit
        };
        let soft_wrapped = row_index > 0
            && index == to_signed(row.start_index) - 1
            && !characters[row.start_index - 1].is_newline();
        if soft_wrapped {
            Self::before_next(index)
        } else {
            Self::after(index)
        }
    }

    /// Computes where the caret for this gap is drawn.
    ///
    /// `default_font_size` sizes the caret of an empty document. Returns `None` if the
    /// index is past the end of `metrics`.
    pub fn geometry(
        &self,
        metrics: &TextMetrics,
        document: &Document,
        scale: f32,
        default_font_size: f32,
    ) -> Option<CaretGeometry> {
        let characters = &metrics.all_character;
        let width = content_width(document, scale);
        let origin = |next: Option<&CharacterMetrics>| {
            next.map_or(
                match document.text_align {
                    TextAlign::Left => 0.0,
                    TextAlign::Center => width * 0.5,
                    TextAlign::Right => width,
                },
                |character| character.x,
            )
        };

        let Some(index) = to_index(self.after_character_index) else {
            let Some(first) = characters.first() else {
                let height = default_font_size * scale;
                return Some(CaretGeometry {
                    x: origin(None),
                    y: 0.0,
                    height,
                    row_top: 0.0,
                    row_bottom: height,
                });
            };
            let row = metrics.rows.get(first.which_row)?;
            return Some(CaretGeometry {
                x: first.x,
                y: row.content_top,
                height: row.content_height,
                row_top: row.top,
                row_bottom: row.bottom,
            });
        };

        let character = characters.get(index)?;
        match self.cursor_position {
            CursorPosition::BeforeNextIndex => {
                let Some(next) = characters.get(index + 1) else {
                    return Self::after(self.after_character_index).geometry(
                        metrics,
                        document,
                        scale,
                        default_font_size,
                    );
                };
                let row = metrics.rows.get(next.which_row)?;
                Some(CaretGeometry {
                    x: next.x,
                    y: row.content_top,
                    height: row.content_height,
                    row_top: row.top,
                    row_bottom: row.bottom,
                })
            }
            CursorPosition::AfterIndex if character.is_newline() => {
                let row = metrics.rows.get(character.which_row)?;
                let next_row = metrics.rows.get(character.which_row + 1);
                let spacing = document.paragraph_spacing * scale;
                Some(CaretGeometry {
                    x: origin(characters.get(index + 1)),
                    y: next_row.map_or(row.bottom + spacing, |next| next.content_top),
                    height: next_row.map_or(row.content_height, |next| next.content_height),
                    row_top: row.bottom,
                    row_bottom: next_row.map_or(row.bottom, |next| next.bottom),
                })
            }
            CursorPosition::AfterIndex => {
                let row = metrics.rows.get(character.which_row)?;
                Some(CaretGeometry {
                    x: character.x + character.width,
                    y: row.content_top,
                    height: row.content_height,
                    row_top: row.top,
                    row_bottom: row.bottom,
                })
            }
        }
    }
}

fn contains_x(character: &CharacterMetrics, x: f32) -> bool {
    x >= character.x && x <= character.x + character.width
}
