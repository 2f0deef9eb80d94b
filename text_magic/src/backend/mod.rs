// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering backends.
//!
//! A backend supplies glyph extents to the layout engine and paints a laid out document.
//! The editor owns exactly one backend; all font data and caches live inside it.

mod monospace;
#[cfg(feature = "pixmap")]
mod pixmap;

pub use monospace::{MonospaceBackend, RenderedFrame};
#[cfg(feature = "pixmap")]
pub use pixmap::PixmapBackend;

use peniko::Color;
use peniko::kurbo::Rect;

use crate::document::Document;
use crate::error::Error;
use crate::layout::TextMetrics;
use crate::style::TextStyle;

/// Vertical and horizontal extents of one measured grapheme, in device units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphExtents {
    /// Horizontal advance.
    pub advance: f32,
    /// Distance from the baseline to the top of the glyph box (positive).
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the glyph box (positive).
    pub descent: f32,
}

impl GlyphExtents {
    /// Height of the glyph box.
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// A request for the extents of one grapheme.
#[derive(Clone, Copy, Debug)]
pub struct GlyphQuery<'a> {
    /// The grapheme cluster.
    pub text: &'a str,
    /// The style of the segment holding the grapheme.
    pub style: &'a TextStyle,
    /// The font size after device pixel ratio scaling.
    pub font_size: f32,
    /// Whether the grapheme should be drawn from an emoji face.
    pub is_emoji: bool,
}

/// Everything a backend needs to paint one frame.
///
/// All geometry is in device units and relative to the text area, which begins after the
/// list gutter when [`Document::list_style`] is set.
#[derive(Clone, Copy, Debug)]
pub struct RenderRequest<'a> {
    /// The document being painted.
    pub document: &'a Document,
    /// Fresh metrics for `document`.
    pub metrics: &'a TextMetrics,
    /// Device pixel ratio applied to the document's layout units.
    pub scale: f32,
    /// Width of the list gutter, or zero without a list style.
    pub gutter: f32,
    /// One rectangle per selected character.
    pub selection: &'a [Rect],
    /// Selection fill, with opacity already applied.
    pub selection_color: Color,
    /// The caret, when it is visible.
    pub caret: Option<Rect>,
}

/// A glyph measuring and painting capability.
pub trait RenderBackend {
    /// Prepares the backend for painting.
    ///
    /// Called once by [`RichEditor::init`](crate::RichEditor::init); no frame is rendered
    /// before it succeeds. [`RenderBackend::glyph_extents`] may be called earlier, since the
    /// editor measures documents set before initialization.
    fn init(&mut self) -> Result<(), Error>;

    /// Measures one grapheme.
    fn glyph_extents(&mut self, query: GlyphQuery<'_>) -> GlyphExtents;

    /// Paints a frame.
    fn render(&mut self, request: &RenderRequest<'_>);

    /// Returns `true` if layout should be scaled by the host's device pixel ratio.
    fn use_device_pixel_ratio(&self) -> bool;
}
