// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Measures glyphs with Skrifa and paints outlines with Tiny-Skia.
//!
//! Color emoji faces without outlines are measured but not painted.

use hashbrown::HashMap;
use peniko::color::palette::css;
use peniko::kurbo::Rect;
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{FontRef, MetadataProvider};
use tiny_skia::{
    FillRule, Mask, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Stroke as SkiaStroke, Transform,
};

use super::{GlyphExtents, GlyphQuery, RenderBackend, RenderRequest};
use crate::document::ListStyle;
use crate::error::Error;
use crate::layout::{CharacterMetrics, RowMetrics, TextMetrics};
use crate::style::{
    DecorationLine, DecorationStyle, FontStyle, HighlightKind, StrokePosition, TextStyle,
};

/// Radius of disc and circle list markers, in device units.
const LIST_MARKER_RADIUS: f32 = 20.0;
/// Font size of string list markers, in layout units.
const LIST_MARKER_FONT_SIZE: f32 = 30.0;
/// Stroke width of oval and cross highlights, in layout units.
const HIGHLIGHT_STROKE_WIDTH: f32 = 4.0;
/// Horizontal shear applied to italic text.
const ITALIC_SKEW: f32 = 0.25;
/// Number of measured graphemes kept before the extent cache is flushed.
const MAX_CACHED_EXTENTS: usize = 4096;

#[derive(Clone, Debug)]
struct FontEntry {
    data: Vec<u8>,
    index: u32,
}

impl FontEntry {
    fn font_ref(&self) -> Option<FontRef<'_>> {
        FontRef::from_index(&self.data, self.index).ok()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ExtentsKey {
    family: String,
    text: String,
    size_bits: u32,
    emoji: bool,
}

/// A backend that shapes nothing and paints into a [`Pixmap`].
///
/// Each grapheme is measured as the sum of its code points' advances in the face registered
/// for the style's family, falling back to the first registered face. Emoji use the face
/// registered with [`PixmapBackend::register_emoji_font`].
pub struct PixmapBackend {
    fonts: HashMap<String, FontEntry>,
    default_family: Option<String>,
    emoji_family: Option<String>,
    extents: HashMap<ExtentsKey, GlyphExtents>,
    background: peniko::Color,
    caret_color: peniko::Color,
    use_device_pixel_ratio: bool,
    pixmap: Option<Pixmap>,
}

impl core::fmt::Debug for PixmapBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixmapBackend")
            .field("families", &self.fonts.keys().collect::<Vec<_>>())
            .field("default_family", &self.default_family)
            .field("emoji_family", &self.emoji_family)
            .field("cached_extents", &self.extents.len())
            .field("background", &self.background)
            .field(
                "pixmap",
                &self.pixmap.as_ref().map(|p| (p.width(), p.height())),
            )
            .finish_non_exhaustive()
    }
}

impl Default for PixmapBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PixmapBackend {
    /// Creates a backend with no fonts and a transparent background.
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
            default_family: None,
            emoji_family: None,
            extents: HashMap::new(),
            background: css::TRANSPARENT,
            caret_color: css::BLACK,
            use_device_pixel_ratio: true,
            pixmap: None,
        }
    }

    /// Builder-style helper that sets the background color.
    pub fn with_background(mut self, color: peniko::Color) -> Self {
        self.background = color;
        self
    }

    /// Builder-style helper that sets the caret color.
    pub fn with_caret_color(mut self, color: peniko::Color) -> Self {
        self.caret_color = color;
        self
    }

    /// Builder-style helper that makes the backend ignore the device pixel ratio.
    pub fn without_device_pixel_ratio(mut self) -> Self {
        self.use_device_pixel_ratio = false;
        self
    }

    /// Registers the face at `index` in `data` under `family`.
    ///
    /// The first registered family becomes the fallback for unknown families.
    pub fn register_font(
        &mut self,
        family: impl Into<String>,
        data: Vec<u8>,
        index: u32,
    ) -> Result<(), Error> {
        let family = family.into();
        if let Err(err) = FontRef::from_index(&data, index) {
            return Err(Error::invalid_font(format!("{family}: {err}")));
        }
        log::debug!("registered font family {family:?} ({} bytes)", data.len());
        if self.default_family.is_none() {
            self.default_family = Some(family.clone());
        }
        self.fonts.insert(family, FontEntry { data, index });
        self.extents.clear();
        Ok(())
    }

    /// Registers a face used for emoji graphemes and string list markers.
    pub fn register_emoji_font(
        &mut self,
        family: impl Into<String>,
        data: Vec<u8>,
        index: u32,
    ) -> Result<(), Error> {
        let family = family.into();
        self.register_font(family.clone(), data, index)?;
        self.emoji_family = Some(family);
        Ok(())
    }

    /// The last painted frame.
    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    fn resolve(&self, style: &TextStyle, is_emoji: bool) -> Option<&FontEntry> {
        let emoji = is_emoji
            .then(|| self.emoji_family.as_ref())
            .flatten()
            .and_then(|family| self.fonts.get(family));
        emoji
            .or_else(|| self.fonts.get(&style.font_family))
            .or_else(|| {
                self.default_family
                    .as_ref()
                    .and_then(|family| self.fonts.get(family))
            })
    }

    fn measure_uncached(&self, query: &GlyphQuery<'_>) -> GlyphExtents {
        let Some(font) = self
            .resolve(query.style, query.is_emoji)
            .and_then(FontEntry::font_ref)
        else {
            log::warn!(
                "no font for family {:?}, using fallback metrics",
                query.style.font_family
            );
            return GlyphExtents {
                advance: 0.6 * query.font_size,
                ascent: 0.8 * query.font_size,
                descent: 0.2 * query.font_size,
            };
        };
        let size = Size::new(query.font_size);
        let metrics = font.metrics(size, LocationRef::default());
        let glyph_metrics = font.glyph_metrics(size, LocationRef::default());
        let charmap = font.charmap();
        let advance = query
            .text
            .chars()
            .filter_map(|ch| charmap.map(ch))
            .filter_map(|glyph_id| glyph_metrics.advance_width(glyph_id))
            .sum();
        GlyphExtents {
            advance,
            ascent: metrics.ascent,
            descent: -metrics.descent,
        }
    }

    fn paint_character(
        &mut self,
        pixmap: &mut Pixmap,
        character: &CharacterMetrics,
        origin: f32,
        scale: f32,
    ) {
        let style = &character.style;
        let font_size = style.font_size * scale;
        let extents = self.glyph_extents(GlyphQuery {
            text: &character.char,
            style,
            font_size,
            is_emoji: character.is_emoji,
        });
        let x = origin + character.x;
        let skew = if style.font_style == FontStyle::Italic {
            ITALIC_SKEW
        } else {
            0.0
        };
        let glyph = self
            .resolve(style, character.is_emoji)
            .and_then(|font| {
                text_path(font, &character.char, font_size, x, character.baseline, skew)
            });

        if let Some(path) = &glyph {
            if let Some(shadow) = &style.shadow {
                let outline = style
                    .stroke
                    .as_ref()
                    .map(|stroke| stroke_style(stroke.width * scale));
                draw_blurred(
                    pixmap,
                    path,
                    &paint(shadow.color),
                    outline.as_ref(),
                    blur_sigma(shadow.blur_radius * scale),
                );
            }
            if let Some(stroke) = &style.stroke {
                let width = stroke.width * scale;
                match stroke.position {
                    StrokePosition::Center => {
                        pixmap.stroke_path(
                            path,
                            &paint(stroke.color),
                            &stroke_style(width),
                            Transform::identity(),
                            None,
                        );
                    }
                    // The fill covers the inner half.
                    StrokePosition::Outer => {
                        pixmap.stroke_path(
                            path,
                            &paint(stroke.color),
                            &stroke_style(width * 2.0),
                            Transform::identity(),
                            None,
                        );
                    }
                    StrokePosition::Inner => {}
                }
            }

            let fill = paint(style.color);
            let embolden = style
                .font_weight
                .is_emboldened()
                .then(|| stroke_style(font_size / 24.0));
            match &style.blur {
                Some(blur) => {
                    let sigma = blur_sigma(blur.radius * scale);
                    draw_blurred(pixmap, path, &fill, None, sigma);
                    if let Some(embolden) = &embolden {
                        draw_blurred(pixmap, path, &fill, Some(embolden), sigma);
                    }
                }
                None => {
                    pixmap.fill_path(path, &fill, FillRule::Winding, Transform::identity(), None);
                    if let Some(embolden) = &embolden {
                        pixmap.stroke_path(path, &fill, embolden, Transform::identity(), None);
                    }
                }
            }

            if let Some(stroke) = style
                .stroke
                .as_ref()
                .filter(|stroke| stroke.position == StrokePosition::Inner)
            {
                let mut mask = Mask::new(pixmap.width(), pixmap.height());
                if let Some(mask) = mask.as_mut() {
                    mask.fill_path(path, FillRule::Winding, true, Transform::identity());
                }
                pixmap.stroke_path(
                    path,
                    &paint(stroke.color),
                    &stroke_style(stroke.width * scale * 2.0),
                    Transform::identity(),
                    mask.as_ref(),
                );
            }
        }

        if let Some(decoration) = &style.decoration {
            let thickness = decoration.thickness * scale;
            let y = match decoration.line {
                DecorationLine::Underline => character.baseline + extents.descent - thickness / 2.0,
                DecorationLine::LineThrough => {
                    character.y + character.height / 2.0 - thickness / 2.0
                }
            };
            let (x0, x1) = (x, x + character.width);
            let mut builder = PathBuilder::new();
            match decoration.style {
                DecorationStyle::Solid => {
                    builder.move_to(x0, y);
                    builder.line_to(x1, y);
                }
                DecorationStyle::Wavy => {
                    let wave = |x: f32| y + thickness * (0.8 * x).sin();
                    builder.move_to(x0, wave(x0));
                    let mut step = x0 + 1.0;
                    while step < x1 {
                        builder.line_to(step, wave(step));
                        step += 1.0;
                    }
                    builder.line_to(x1, wave(x1));
                }
            }
            if let Some(path) = builder.finish() {
                pixmap.stroke_path(
                    &path,
                    &paint(decoration.color),
                    &stroke_style(thickness),
                    Transform::identity(),
                    None,
                );
            }
        }
    }

    fn paint_list_markers(
        &self,
        pixmap: &mut Pixmap,
        style: &ListStyle,
        metrics: &TextMetrics,
        gutter: f32,
        scale: f32,
    ) {
        let marker_paint = paint(css::BLACK);
        let radius = LIST_MARKER_RADIUS.min(gutter * 0.5);
        for row in metrics.paragraph_start_rows() {
            let Some(row) = metrics.rows.get(row) else {
                continue;
            };
            let center_y = (row.top + row.bottom) / 2.0;
            match style {
                ListStyle::Disc => {
                    if let Some(path) = PathBuilder::from_circle(gutter / 2.0, center_y, radius) {
                        pixmap.fill_path(
                            &path,
                            &marker_paint,
                            FillRule::Winding,
                            Transform::identity(),
                            None,
                        );
                    }
                }
                ListStyle::Circle => {
                    if let Some(path) = PathBuilder::from_circle(gutter / 2.0, center_y, radius) {
                        pixmap.stroke_path(
                            &path,
                            &marker_paint,
                            &stroke_style(2.0),
                            Transform::identity(),
                            None,
                        );
                    }
                }
                ListStyle::Marker(marker) => {
                    let size = LIST_MARKER_FONT_SIZE * scale;
                    let Some(font) = self.resolve(&TextStyle::default(), true) else {
                        continue;
                    };
                    let x = gutter / 2.0 - size / 3.0 * 2.0;
                    let baseline = center_y + size / 3.0;
                    if let Some(path) = text_path(font, marker, size, x, baseline, 0.0) {
                        pixmap.fill_path(
                            &path,
                            &marker_paint,
                            FillRule::Winding,
                            Transform::identity(),
                            None,
                        );
                    }
                }
            }
        }
    }
}

impl RenderBackend for PixmapBackend {
    fn init(&mut self) -> Result<(), Error> {
        if self.fonts.is_empty() {
            log::warn!("no fonts registered, glyphs will not be painted");
        }
        Ok(())
    }

    fn glyph_extents(&mut self, query: GlyphQuery<'_>) -> GlyphExtents {
        let key = ExtentsKey {
            family: query.style.font_family.clone(),
            text: query.text.to_owned(),
            size_bits: query.font_size.to_bits(),
            emoji: query.is_emoji,
        };
        if let Some(extents) = self.extents.get(&key) {
            return *extents;
        }
        let extents = self.measure_uncached(&query);
        if self.extents.len() >= MAX_CACHED_EXTENTS {
            log::debug!("flushing {} cached glyph extents", self.extents.len());
            self.extents.clear();
        }
        self.extents.insert(key, extents);
        extents
    }

    fn render(&mut self, request: &RenderRequest<'_>) {
        let document = request.document;
        let width = (document.width * request.scale).ceil().max(1.0) as u32;
        let height = (document.height * request.scale).ceil().max(1.0) as u32;
        let Some(mut pixmap) = Pixmap::new(width, height) else {
            log::warn!("cannot allocate a {width}x{height} pixmap");
            return;
        };
        pixmap.fill(skia_color(self.background));

        let origin = request.gutter;
        let selection = paint(request.selection_color);
        for rect in request.selection {
            fill_rect(&mut pixmap, *rect, origin, &selection);
        }

        paint_highlights(&mut pixmap, request.metrics, origin, request.scale);

        for character in &request.metrics.all_character {
            if character.is_newline() {
                continue;
            }
            self.paint_character(&mut pixmap, character, origin, request.scale);
        }

        if let Some(caret) = request.caret {
            fill_rect(&mut pixmap, caret, origin, &paint(self.caret_color));
        }

        if let Some(style) = &document.list_style {
            self.paint_list_markers(
                &mut pixmap,
                style,
                request.metrics,
                request.gutter,
                request.scale,
            );
        }

        log::trace!(
            "painted {} characters into {width}x{height}",
            request.metrics.all_character.len()
        );
        self.pixmap = Some(pixmap);
    }

    fn use_device_pixel_ratio(&self) -> bool {
        self.use_device_pixel_ratio
    }
}

/// Builds the outline of `text` with its origin at `(x, baseline)`.
fn text_path(
    font: &FontEntry,
    text: &str,
    font_size: f32,
    x: f32,
    baseline: f32,
    skew: f32,
) -> Option<Path> {
    let font = font.font_ref()?;
    let size = Size::new(font_size);
    let location = LocationRef::default();
    let charmap = font.charmap();
    let outlines = font.outline_glyphs();
    let glyph_metrics = font.glyph_metrics(size, location);
    let mut pen = GlyphPen::new(x, baseline, skew);
    for ch in text.chars() {
        let Some(glyph_id) = charmap.map(ch) else {
            continue;
        };
        if let Some(outline) = outlines.get(glyph_id) {
            if let Err(err) = outline.draw(DrawSettings::unhinted(size, location), &mut pen) {
                log::debug!("failed to draw outline for {ch:?}: {err}");
            }
        }
        pen.x += glyph_metrics.advance_width(glyph_id).unwrap_or(0.0);
    }
    pen.finish()
}

// --- MARK: Highlights ---

/// A horizontal stretch of characters sharing a highlight kind on one row.
struct HighlightRun<'a> {
    row: &'a RowMetrics,
    x0: f32,
    x1: f32,
    kind: HighlightKind,
    color: peniko::Color,
}

fn highlight_runs(metrics: &TextMetrics) -> Vec<HighlightRun<'_>> {
    let mut runs: Vec<HighlightRun<'_>> = Vec::new();
    let mut previous: Option<(usize, HighlightKind)> = None;
    for character in &metrics.all_character {
        let Some(highlight) = &character.style.highlight else {
            previous = None;
            continue;
        };
        let Some(row) = metrics.rows.get(character.which_row) else {
            continue;
        };
        let key = (character.which_row, highlight.kind);
        match runs.last_mut() {
            Some(run) if previous == Some(key) => run.x1 = character.x + character.width,
            _ => runs.push(HighlightRun {
                row,
                x0: character.x,
                x1: character.x + character.width,
                kind: highlight.kind,
                color: highlight.color,
            }),
        }
        previous = Some(key);
    }
    runs
}

fn paint_highlights(pixmap: &mut Pixmap, metrics: &TextMetrics, origin: f32, scale: f32) {
    let stroke = stroke_style(HIGHLIGHT_STROKE_WIDTH * scale);
    for run in highlight_runs(metrics) {
        let (x0, x1) = (origin + run.x0, origin + run.x1);
        let top = run.row.content_top;
        let bottom = run.row.content_top + run.row.content_height;
        let highlight = paint(run.color);
        match run.kind {
            HighlightKind::Fill => {
                let mid = (run.row.content_top + run.row.content_bottom) / 2.0;
                if let Some(rect) = tiny_skia::Rect::from_ltrb(x0, mid, x1, bottom) {
                    pixmap.fill_rect(rect, &highlight, Transform::identity(), None);
                }
            }
            HighlightKind::Oval => {
                let path = tiny_skia::Rect::from_ltrb(x0, top, x1, bottom)
                    .and_then(PathBuilder::from_oval);
                if let Some(path) = path {
                    pixmap.stroke_path(&path, &highlight, &stroke, Transform::identity(), None);
                }
            }
            HighlightKind::X => {
                let quarter = top + run.row.content_height / 4.0;
                let mut builder = PathBuilder::new();
                builder.move_to(x0, quarter);
                builder.line_to(x1, bottom);
                builder.move_to(x0, bottom);
                builder.line_to(x1, quarter);
                if let Some(path) = builder.finish() {
                    pixmap.stroke_path(&path, &highlight, &stroke, Transform::identity(), None);
                }
            }
        }
    }
}

// --- MARK: Painting helpers ---

fn skia_color(color: peniko::Color) -> tiny_skia::Color {
    let rgba8 = color.to_rgba8();
    tiny_skia::Color::from_rgba8(rgba8.r, rgba8.g, rgba8.b, rgba8.a)
}

fn paint(color: peniko::Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color));
    paint.anti_alias = true;
    paint
}

fn stroke_style(width: f32) -> SkiaStroke {
    SkiaStroke {
        width,
        ..SkiaStroke::default()
    }
}

fn fill_rect(pixmap: &mut Pixmap, rect: Rect, origin: f32, paint: &Paint<'_>) {
    let rect = tiny_skia::Rect::from_ltrb(
        origin + rect.x0 as f32,
        rect.y0 as f32,
        origin + rect.x1 as f32,
        rect.y1 as f32,
    );
    if let Some(rect) = rect {
        pixmap.fill_rect(rect, paint, Transform::identity(), None);
    }
}

/// Gaussian sigma for a blur radius.
fn blur_sigma(radius: f32) -> f32 {
    0.57735 * radius + 0.5
}

/// Paints `path` into a scratch layer, blurs the layer and composites it.
///
/// `stroke` strokes the path instead of filling it.
fn draw_blurred(
    pixmap: &mut Pixmap,
    path: &Path,
    paint: &Paint<'_>,
    stroke: Option<&SkiaStroke>,
    sigma: f32,
) {
    let radius = sigma.round().max(0.0) as usize;
    let bounds = path.bounds();
    let pad = (radius * 3) as f32 + stroke.map_or(0.0, |stroke| stroke.width) + 1.0;
    let left = (bounds.left() - pad).floor();
    let top = (bounds.top() - pad).floor();
    let width = (bounds.width() + pad * 2.0).ceil() as u32;
    let height = (bounds.height() + pad * 2.0).ceil() as u32;
    let Some(mut layer) = Pixmap::new(width, height) else {
        return;
    };
    let transform = Transform::from_translate(-left, -top);
    match stroke {
        Some(stroke) => layer.stroke_path(path, paint, stroke, transform, None),
        None => layer.fill_path(path, paint, FillRule::Winding, transform, None),
    }
    box_blur(layer.data_mut(), width as usize, height as usize, radius);
    pixmap.draw_pixmap(
        left as i32,
        top as i32,
        layer.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}

/// Three box blur passes over premultiplied RGBA8, approximating a gaussian.
fn box_blur(data: &mut [u8], width: usize, height: usize, radius: usize) {
    if radius == 0 || width == 0 || height == 0 {
        return;
    }
    let mut scratch = vec![0_u8; data.len()];
    for _ in 0..3 {
        blur_axis(data, &mut scratch, height, width, width * 4, 4, radius);
        blur_axis(&scratch, data, width, height, 4, width * 4, radius);
    }
}

/// Averages a sliding window along each of `lines` lines of `len` pixels.
///
/// Pixels outside the layer count as transparent.
fn blur_axis(
    src: &[u8],
    dst: &mut [u8],
    lines: usize,
    len: usize,
    line_stride: usize,
    step: usize,
    radius: usize,
) {
    let window = (2 * radius + 1) as u32;
    for line in 0..lines {
        let base = line * line_stride;
        for channel in 0..4 {
            let at = |i: usize| u32::from(src[base + i * step + channel]);
            let mut sum: u32 = (0..=radius.min(len - 1)).map(at).sum();
            for i in 0..len {
                dst[base + i * step + channel] = (sum / window) as u8;
                if i + radius + 1 < len {
                    sum += at(i + radius + 1);
                }
                if i >= radius {
                    sum -= at(i - radius);
                }
            }
        }
    }
}

// --- MARK: Outline pen ---

struct GlyphPen {
    builder: PathBuilder,
    x: f32,
    y: f32,
    skew: f32,
}

impl GlyphPen {
    fn new(x: f32, y: f32, skew: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            x,
            y,
            skew,
        }
    }

    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.x + x + self.skew * y, self.y - y)
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl OutlinePen for GlyphPen {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let (cx0, cy0) = self.point(cx0, cy0);
        let (x, y) = self.point(x, y);
        self.builder.quad_to(cx0, cy0, x, y);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let (cx0, cy0) = self.point(cx0, cy0);
        let (cx1, cy1) = self.point(cx1, cy1);
        let (x, y) = self.point(x, y);
        self.builder.cubic_to(cx0, cy0, cx1, cy1, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
