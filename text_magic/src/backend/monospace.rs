// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::Rect;

use super::{GlyphExtents, GlyphQuery, RenderBackend, RenderRequest};
use crate::error::Error;

/// A deterministic backend with fixed-pitch metrics.
///
/// Narrow characters advance half the font size; East Asian wide characters and emoji
/// advance the full font size. Every glyph box has an ascent of `0.8` and a descent of `0.2`
/// times the font size. Rendering keeps a summary of the latest frame instead of painting.
#[derive(Clone, Debug)]
pub struct MonospaceBackend {
    initialized: bool,
    init_failure: Option<String>,
    use_device_pixel_ratio: bool,
    frame_count: usize,
    last_frame: Option<RenderedFrame>,
}

/// Summary of a frame handed to [`MonospaceBackend::render`].
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedFrame {
    /// The concatenated document text.
    pub text: String,
    /// Number of laid out rows.
    pub rows: usize,
    /// Number of laid out characters.
    pub characters: usize,
    /// Selection rectangles.
    pub selection: Vec<Rect>,
    /// The caret, if visible.
    pub caret: Option<Rect>,
    /// Rows that receive a list marker.
    pub list_marker_rows: Vec<usize>,
    /// Scale the frame was laid out with.
    pub scale: f32,
}

impl Default for MonospaceBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MonospaceBackend {
    /// Creates a backend that honours the device pixel ratio.
    pub fn new() -> Self {
        Self {
            initialized: false,
            init_failure: None,
            use_device_pixel_ratio: true,
            frame_count: 0,
            last_frame: None,
        }
    }

    /// Builder-style helper that makes the backend ignore the device pixel ratio.
    pub fn without_device_pixel_ratio(mut self) -> Self {
        self.use_device_pixel_ratio = false;
        self
    }

    /// Builder-style helper that makes [`RenderBackend::init`] fail with `message`.
    pub fn failing_init(mut self, message: impl Into<String>) -> Self {
        self.init_failure = Some(message.into());
        self
    }

    /// Returns `true` once [`RenderBackend::init`] has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of frames rendered so far.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// The most recent frame.
    pub fn last_frame(&self) -> Option<&RenderedFrame> {
        self.last_frame.as_ref()
    }

    /// The advance, as a fraction of the font size.
    pub fn advance_factor(text: &str, is_emoji: bool) -> f32 {
        if is_emoji || text.chars().next().is_some_and(is_wide) {
            1.0
        } else {
            0.5
        }
    }
}

impl RenderBackend for MonospaceBackend {
    fn init(&mut self) -> Result<(), Error> {
        if let Some(message) = &self.init_failure {
            return Err(Error::backend_init(message.clone()));
        }
        self.initialized = true;
        Ok(())
    }

    fn glyph_extents(&mut self, query: GlyphQuery<'_>) -> GlyphExtents {
        GlyphExtents {
            advance: Self::advance_factor(query.text, query.is_emoji) * query.font_size,
            ascent: 0.8 * query.font_size,
            descent: 0.2 * query.font_size,
        }
    }

    fn render(&mut self, request: &RenderRequest<'_>) {
        self.frame_count += 1;
        self.last_frame = Some(RenderedFrame {
            text: request.document.text(),
            rows: request.metrics.rows.len(),
            characters: request.metrics.all_character.len(),
            selection: request.selection.to_vec(),
            caret: request.caret,
            list_marker_rows: if request.document.list_style.is_some() {
                request.metrics.paragraph_start_rows()
            } else {
                Vec::new()
            },
            scale: request.scale,
        });
    }

    fn use_device_pixel_ratio(&self) -> bool {
        self.use_device_pixel_ratio
    }
}

/// East Asian wide and fullwidth ranges.
fn is_wide(ch: char) -> bool {
    matches!(
        ch,
        '\u{1100}'..='\u{115F}'
            | '\u{2E80}'..='\u{303E}'
            | '\u{3041}'..='\u{33FF}'
            | '\u{3400}'..='\u{4DBF}'
            | '\u{4E00}'..='\u{9FFF}'
            | '\u{A000}'..='\u{A4CF}'
            | '\u{AC00}'..='\u{D7A3}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{FE30}'..='\u{FE4F}'
            | '\u{FF00}'..='\u{FF60}'
            | '\u{FFE0}'..='\u{FFE6}'
            | '\u{20000}'..='\u{3FFFD}'
    )
}
