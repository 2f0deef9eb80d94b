// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row layout and per-character metrics.

mod alignment;

use crate::analysis::{graphemes, is_emoji, is_newline, is_surrogate_pair};
use crate::backend::{GlyphQuery, RenderBackend};
use crate::document::Document;
use crate::style::TextStyle;

/// Width of the list marker gutter, in layout units.
pub const LIST_GUTTER_WIDTH: f32 = 40.0;

/// Result of laying out a [`Document`].
///
/// Replaced wholesale on every mutation. `all_character` is partitioned contiguously by
/// row, and each row covers the inclusive range `start_index..=end_index`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// Width of the text area, in device units.
    pub width: f32,
    /// Bottom of the last row, in device units.
    pub height: f32,
    /// Rows, top to bottom.
    pub rows: Vec<RowMetrics>,
    /// Every logical character of the document, newlines included.
    pub all_character: Vec<CharacterMetrics>,
}

/// Geometry of one row.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RowMetrics {
    /// Natural width of the row's characters, before alignment.
    pub width: f32,
    /// Height of the line box, paragraph spacing included.
    pub height: f32,
    /// Height of the tallest glyph box on the row.
    pub content_height: f32,
    /// Top of the line box.
    pub top: f32,
    /// Top of the content box, after paragraph spacing.
    pub content_top: f32,
    /// Bottom of the line box.
    pub bottom: f32,
    /// Bottom of the content box.
    pub content_bottom: f32,
    /// First character of the row.
    pub start_index: usize,
    /// Last character of the row. For an empty trailing row this is `start_index - 1`.
    pub end_index: usize,
}

impl RowMetrics {
    /// Returns `true` for the empty row that follows a trailing newline.
    pub fn is_empty(&self) -> bool {
        self.start_index > self.end_index
    }
}

/// Geometry of one logical character (grapheme cluster).
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterMetrics {
    /// The grapheme cluster.
    pub char: String,
    /// Whether the grapheme is an emoji.
    pub is_emoji: bool,
    /// Whether the grapheme contains a character outside the Basic Multilingual Plane.
    pub is_surrogate_pair: bool,
    /// Left edge, after alignment.
    pub x: f32,
    /// Top of the glyph box.
    pub y: f32,
    /// Advance, letter spacing included.
    pub width: f32,
    /// Height of the glyph box.
    pub height: f32,
    /// Baseline position.
    pub baseline: f32,
    /// Index of the row holding the character.
    pub which_row: usize,
    /// Index of the document segment holding the character.
    pub which_content: usize,
    /// Byte offset of the grapheme within its segment.
    pub index_of_content: usize,
    /// Byte length of the grapheme.
    pub len: usize,
    /// Resolved style of the character.
    pub style: TextStyle,
}

impl CharacterMetrics {
    /// Returns `true` if the character is an explicit line break.
    pub fn is_newline(&self) -> bool {
        is_newline(&self.char)
    }

    /// Byte range of the grapheme within its segment.
    pub fn byte_range(&self) -> core::ops::Range<usize> {
        self.index_of_content..self.index_of_content + self.len
    }
}

impl TextMetrics {
    /// Returns `true` if no character was laid out.
    pub fn is_empty(&self) -> bool {
        self.all_character.is_empty()
    }

    /// The row holding character `index`.
    pub fn row_of(&self, index: usize) -> Option<&RowMetrics> {
        let character = self.all_character.get(index)?;
        self.rows.get(character.which_row)
    }

    /// Rows that start a paragraph and receive a list marker.
    ///
    /// A row qualifies when its first visible character is the first character of the
    /// document or follows a newline. Rows holding only a newline get no marker.
    pub fn paragraph_start_rows(&self) -> Vec<usize> {
        let mut rows = Vec::new();
        for (index, character) in self.all_character.iter().enumerate() {
            if character.is_newline() {
                continue;
            }
            if index == 0 || self.all_character[index - 1].is_newline() {
                rows.push(character.which_row);
            }
        }
        rows
    }
}

/// Width available to text, in device units.
pub fn content_width(document: &Document, scale: f32) -> f32 {
    let gutter = if document.list_style.is_some() {
        LIST_GUTTER_WIDTH
    } else {
        0.0
    };
    (document.width - gutter).max(0.0) * scale
}

/// A row before vertical placement.
#[derive(Clone, Copy, Debug)]
struct RowSpan {
    start: usize,
    end: usize,
    width: f32,
    content_height: f32,
}

/// Lays out `document` with glyph extents from `backend`.
///
/// `scale` multiplies font sizes, widths and spacings, producing device units.
pub fn measure<B: RenderBackend + ?Sized>(
    document: &Document,
    backend: &mut B,
    scale: f32,
) -> TextMetrics {
    let width = content_width(document, scale);
    if document.is_empty() {
        return TextMetrics::default();
    }

    let mut characters: Vec<CharacterMetrics> = Vec::new();
    let mut spans: Vec<RowSpan> = Vec::new();
    let mut open = RowSpan {
        start: 0,
        end: 0,
        width: 0.0,
        content_height: 0.0,
    };
    let mut newline_height = 0.0_f32;

    for (which_content, (text, style)) in document.segments().enumerate() {
        let font_size = style.font_size * scale;
        let letter_spacing = style.letter_spacing() * scale;
        let line_height = style.line_height();

        for (offset, grapheme) in graphemes(text) {
            let newline = is_newline(grapheme);
            let emoji = is_emoji(grapheme);
            let extents = backend.glyph_extents(GlyphQuery {
                text: grapheme,
                style,
                font_size,
                is_emoji: emoji,
            });
            let advance = if newline {
                0.0
            } else {
                extents.advance + letter_spacing
            };
            let height = extents.height() * line_height;

            if !newline && open.end > open.start && open.width + advance > width {
                spans.push(open);
                open = RowSpan {
                    start: characters.len(),
                    end: characters.len(),
                    width: 0.0,
                    content_height: 0.0,
                };
            }

            characters.push(CharacterMetrics {
                char: grapheme.to_owned(),
                is_emoji: emoji,
                is_surrogate_pair: is_surrogate_pair(grapheme),
                x: open.width,
                y: 0.0,
                width: advance,
                height,
                // Offset from the glyph box top until rows are placed.
                baseline: (height - extents.height()) * 0.5 + extents.ascent,
                which_row: spans.len(),
                which_content,
                index_of_content: offset,
                len: grapheme.len(),
                style: style.clone(),
            });
            open.end = characters.len();
            open.width += advance;
            open.content_height = open.content_height.max(height);

            if newline {
                spans.push(open);
                open = RowSpan {
                    start: characters.len(),
                    end: characters.len(),
                    width: 0.0,
                    content_height: 0.0,
                };
                newline_height = height;
            }
        }
    }

    let ends_with_newline = characters.last().is_some_and(CharacterMetrics::is_newline);
    if open.end > open.start {
        spans.push(open);
    } else if ends_with_newline {
        // The empty row after a trailing newline takes the newline's height.
        open.content_height = newline_height;
        spans.push(open);
    }

    let spacing = document.paragraph_spacing * scale;
    let mut rows = Vec::with_capacity(spans.len());
    let mut bottom = 0.0_f32;
    for (index, span) in spans.iter().enumerate() {
        let top = bottom;
        let content_top = if index == 0 { top } else { top + spacing };
        bottom = content_top + span.content_height;
        for character in &mut characters[span.start..span.end] {
            character.y = content_top + span.content_height - character.height;
            character.baseline += character.y;
        }
        rows.push(RowMetrics {
            width: span.width,
            height: bottom - top,
            content_height: span.content_height,
            top,
            content_top,
            bottom,
            content_bottom: bottom,
            start_index: span.start,
            end_index: if span.end > span.start {
                span.end - 1
            } else {
                // Only the trailing empty row, which always follows a newline.
                span.start.saturating_sub(1)
            },
        });
    }

    alignment::align(&rows, &mut characters, width, document.text_align);

    log::debug!(
        "measured {} characters into {} rows ({} segments)",
        characters.len(),
        rows.len(),
        document.segment_count()
    );

    TextMetrics {
        width,
        height: bottom,
        rows,
        all_character: characters,
    }
}
