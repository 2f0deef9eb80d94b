// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rich styling support.

use peniko::Color;
use peniko::color::palette::css;

/// Visual slant of a font.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontStyle {
    /// An upright face.
    #[default]
    Normal,
    /// An italic or synthesized oblique face.
    Italic,
}

/// Weight keyword of a font.
///
/// Only the keywords accepted by the editor are modelled; any weight other than
/// [`FontWeight::Normal`] is rendered with a synthesized embolden when the backend has
/// no such face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    Normal,
    /// Bold weight.
    Bold,
    /// Lighter than the inherited weight.
    Lighter,
    /// Bolder than the inherited weight.
    Bolder,
}

impl FontWeight {
    /// The numeric weight on the CSS scale (100 to 900).
    pub fn value(self) -> f32 {
        match self {
            Self::Normal => 400.0,
            Self::Bold => 700.0,
            Self::Lighter => 300.0,
            Self::Bolder => 800.0,
        }
    }

    /// Returns `true` when glyph outlines should be emboldened.
    pub fn is_emboldened(self) -> bool {
        self != Self::Normal
    }
}

/// Which line a [`Decoration`] draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecorationLine {
    /// A line under the glyphs, at the row's descent.
    Underline,
    /// A line through the middle of the glyph box.
    LineThrough,
}

/// Stroke pattern of a [`Decoration`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DecorationStyle {
    /// A straight line.
    #[default]
    Solid,
    /// A sine wave whose amplitude is the decoration thickness.
    Wavy,
}

/// Text decoration line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decoration {
    /// Underline or line-through.
    pub line: DecorationLine,
    /// Solid or wavy.
    pub style: DecorationStyle,
    /// Color of the line.
    pub color: Color,
    /// Thickness of the line, in layout units.
    pub thickness: f32,
}

/// Where a glyph [`Stroke`] sits relative to the outline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StrokePosition {
    /// Entirely inside the glyph outline.
    Inner,
    /// Entirely outside the glyph outline.
    Outer,
    /// Centered on the glyph outline.
    #[default]
    Center,
}

/// Glyph outline stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    /// Color of the stroke.
    pub color: Color,
    /// Width of the stroke, in layout units.
    pub width: f32,
    /// Placement relative to the outline.
    pub position: StrokePosition,
}

/// Glyph drop shadow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    /// Color of the shadow.
    pub color: Color,
    /// Blur radius of the shadow, in layout units.
    pub blur_radius: f32,
}

/// Gaussian blur applied to the glyph fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blur {
    /// Blur radius, in layout units.
    pub radius: f32,
}

/// Shape of a [`Highlight`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    /// A marker fill over the lower half of the row.
    #[default]
    Fill,
    /// An ellipse around the highlighted run.
    Oval,
    /// Two crossing strokes over the highlighted run.
    X,
}

/// Highlight drawn behind (or over) a run of characters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Highlight {
    /// Color of the highlight.
    pub color: Color,
    /// Shape of the highlight.
    pub kind: HighlightKind,
}

/// Properties that define a style.
///
/// A slice of properties forms a partial style, merged into a [`TextStyle`] with
/// [`TextStyle::apply`]. Optional parts take an `Option` so they can also be cleared.
#[derive(Clone, PartialEq, Debug)]
pub enum StyleProperty {
    /// Fill color of the glyphs.
    Color(Color),
    /// Font size, in layout units.
    FontSize(f32),
    /// Font family name.
    FontFamily(String),
    /// Font style.
    FontStyle(FontStyle),
    /// Font weight.
    FontWeight(FontWeight),
    /// Extra spacing after each character.
    LetterSpacing(Option<f32>),
    /// Line height multiplier.
    LineHeight(Option<f32>),
    /// Underline or line-through decoration.
    Decoration(Option<Decoration>),
    /// Glyph outline stroke.
    Stroke(Option<Stroke>),
    /// Glyph shadow.
    Shadow(Option<Shadow>),
    /// Glyph blur.
    Blur(Option<Blur>),
    /// Run highlight.
    Highlight(Option<Highlight>),
}

/// The resolved style of one document segment.
///
/// This is a value type: every segment owns its own copy, and edits clone and then mutate.
#[derive(Clone, PartialEq, Debug)]
pub struct TextStyle {
    /// Fill color of the glyphs.
    pub color: Color,
    /// Font size, in layout units.
    pub font_size: f32,
    /// Font family name. An empty name selects the backend's default family.
    pub font_family: String,
    /// Font style.
    pub font_style: FontStyle,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Extra spacing after each character.
    pub letter_spacing: Option<f32>,
    /// Line height multiplier.
    pub line_height: Option<f32>,
    /// Underline or line-through decoration.
    pub decoration: Option<Decoration>,
    /// Glyph outline stroke.
    pub stroke: Option<Stroke>,
    /// Glyph shadow.
    pub shadow: Option<Shadow>,
    /// Glyph blur.
    pub blur: Option<Blur>,
    /// Run highlight.
    pub highlight: Option<Highlight>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: css::BLACK,
            font_size: 16.0,
            font_family: String::new(),
            font_style: FontStyle::Normal,
            font_weight: FontWeight::Normal,
            letter_spacing: None,
            line_height: None,
            decoration: None,
            stroke: None,
            shadow: None,
            blur: None,
            highlight: None,
        }
    }
}

impl TextStyle {
    /// Creates the default style for new text in a document.
    pub fn new(font_family: impl Into<String>, font_size: f32, color: Color) -> Self {
        Self {
            color,
            font_size,
            font_family: font_family.into(),
            ..Self::default()
        }
    }

    /// Applies a single property to this style.
    pub fn apply(&mut self, property: &StyleProperty) {
        match property {
            StyleProperty::Color(color) => self.color = *color,
            StyleProperty::FontSize(size) => self.font_size = *size,
            StyleProperty::FontFamily(family) => self.font_family.clone_from(family),
            StyleProperty::FontStyle(style) => self.font_style = *style,
            StyleProperty::FontWeight(weight) => self.font_weight = *weight,
            StyleProperty::LetterSpacing(spacing) => self.letter_spacing = *spacing,
            StyleProperty::LineHeight(height) => self.line_height = *height,
            StyleProperty::Decoration(decoration) => self.decoration = *decoration,
            StyleProperty::Stroke(stroke) => self.stroke = *stroke,
            StyleProperty::Shadow(shadow) => self.shadow = *shadow,
            StyleProperty::Blur(blur) => self.blur = *blur,
            StyleProperty::Highlight(highlight) => self.highlight = *highlight,
        }
    }

    /// Applies every property of a partial style, in order.
    pub fn apply_all(&mut self, properties: &[StyleProperty]) {
        for property in properties {
            self.apply(property);
        }
    }

    /// Returns a copy of this style with a partial style merged in.
    pub fn merged(&self, properties: &[StyleProperty]) -> Self {
        let mut style = self.clone();
        style.apply_all(properties);
        style
    }

    /// Extra horizontal advance after each character, unscaled.
    pub fn letter_spacing(&self) -> f32 {
        self.letter_spacing.unwrap_or(0.0)
    }

    /// Line height multiplier, defaulting to `1.0`.
    pub fn line_height(&self) -> f32 {
        self.line_height.unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Decoration, DecorationLine, DecorationStyle, FontWeight, StyleProperty, TextStyle,
    };
    use peniko::color::palette::css;

    #[test]
    fn merge_overrides_only_named_properties() {
        let base = TextStyle::new("Inter", 20.0, css::BLACK);
        let merged = base.merged(&[
            StyleProperty::Color(css::RED),
            StyleProperty::FontWeight(FontWeight::Bold),
        ]);
        assert_eq!(merged.color, css::RED);
        assert_eq!(merged.font_weight, FontWeight::Bold);
        assert_eq!(merged.font_family, "Inter");
        assert_eq!(merged.font_size, 20.0);
        assert_eq!(base.color, css::BLACK, "merging must not alias the base");
    }

    #[test]
    fn merge_is_idempotent() {
        let props = [
            StyleProperty::FontSize(30.0),
            StyleProperty::Decoration(Some(Decoration {
                line: DecorationLine::Underline,
                style: DecorationStyle::Wavy,
                color: css::BLUE,
                thickness: 2.0,
            })),
        ];
        let once = TextStyle::default().merged(&props);
        let twice = once.merged(&props);
        assert_eq!(once, twice);
    }

    #[test]
    fn optional_parts_can_be_cleared() {
        let style = TextStyle::default().merged(&[StyleProperty::LetterSpacing(Some(3.0))]);
        assert_eq!(style.letter_spacing(), 3.0);
        let cleared = style.merged(&[StyleProperty::LetterSpacing(None)]);
        assert_eq!(cleared.letter_spacing(), 0.0);
        assert_eq!(cleared.line_height(), 1.0);
    }
}
