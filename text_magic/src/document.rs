// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The styled-text document model.

use crate::error::Error;
use crate::style::TextStyle;

/// Horizontal alignment of each row within the content width.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlign {
    /// Rows start at the left edge.
    #[default]
    Left,
    /// Rows end at the right edge.
    Right,
    /// Rows are centered.
    Center,
}

/// Marker drawn in the list gutter at the first row of each paragraph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListStyle {
    /// A filled circle.
    Disc,
    /// A stroked circle.
    Circle,
    /// An arbitrary string, normally an emoji.
    Marker(String),
}

/// A styled-text document: ordered text segments, each paired with a [`TextStyle`].
///
/// `contents[i]` is rendered with `styles[i]`. Edits keep both lists the same length and
/// never leave an empty segment behind.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// Container width, in layout units.
    pub width: f32,
    /// Container height, in layout units.
    pub height: f32,
    /// Row alignment.
    pub text_align: TextAlign,
    /// Extra space above every row but the first, in layout units.
    pub paragraph_spacing: f32,
    /// List marker style, if the document is rendered as a list.
    pub list_style: Option<ListStyle>,
    contents: Vec<String>,
    styles: Vec<TextStyle>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(260.0, 200.0)
    }
}

impl Document {
    /// Creates an empty document with the given container size.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            text_align: TextAlign::Left,
            paragraph_spacing: 0.0,
            list_style: None,
            contents: Vec::new(),
            styles: Vec::new(),
        }
    }

    /// Builder-style helper that replaces the segments of this document.
    ///
    /// Empty segments are dropped.
    pub fn with_segments<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = (S, TextStyle)>,
        S: Into<String>,
    {
        self.contents.clear();
        self.styles.clear();
        for (text, style) in segments {
            self.push_segment(text, style);
        }
        self
    }

    /// The text of each segment, in order.
    pub fn contents(&self) -> &[String] {
        &self.contents
    }

    /// The style of each segment, in order.
    pub fn styles(&self) -> &[TextStyle] {
        &self.styles
    }

    /// Iterates over `(text, style)` pairs.
    pub fn segments(&self) -> impl Iterator<Item = (&str, &TextStyle)> + '_ {
        self.contents
            .iter()
            .map(String::as_str)
            .zip(self.styles.iter())
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.contents.len()
    }

    /// Returns `true` if the document holds no text.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// The concatenated text of all segments.
    pub fn text(&self) -> String {
        self.contents.concat()
    }

    /// Appends a segment, ignoring empty text.
    pub fn push_segment(&mut self, text: impl Into<String>, style: TextStyle) {
        let text = text.into();
        if !text.is_empty() {
            self.contents.push(text);
            self.styles.push(style);
        }
    }

    /// Removes all segments, keeping the container settings.
    pub fn clear(&mut self) {
        self.contents.clear();
        self.styles.clear();
    }

    /// Checks that `contents` and `styles` correspond and that no segment is empty.
    pub fn check_invariants(&self) -> Result<(), Error> {
        if self.contents.len() != self.styles.len() {
            return Err(Error::invariant(format!(
                "{} segments but {} styles",
                self.contents.len(),
                self.styles.len()
            )));
        }
        if let Some(index) = self.contents.iter().position(String::is_empty) {
            return Err(Error::invariant(format!("segment {index} is empty")));
        }
        Ok(())
    }

    // --- MARK: Raw segment access ---

    pub(crate) fn content_mut(&mut self, index: usize) -> Option<&mut String> {
        self.contents.get_mut(index)
    }

    pub(crate) fn style_mut(&mut self, index: usize) -> Option<&mut TextStyle> {
        self.styles.get_mut(index)
    }

    pub(crate) fn styles_mut(&mut self) -> &mut [TextStyle] {
        &mut self.styles
    }

    /// Replaces the segments in `range` with `replacement`, keeping both lists in step.
    pub(crate) fn splice_segments<I>(&mut self, range: core::ops::Range<usize>, replacement: I)
    where
        I: IntoIterator<Item = (String, TextStyle)>,
    {
        let (contents, styles): (Vec<_>, Vec<_>) = replacement
            .into_iter()
            .filter(|(text, _)| !text.is_empty())
            .unzip();
        self.contents.splice(range.clone(), contents);
        self.styles.splice(range, styles);
    }

    /// Removes the segment at `index` if its text became empty.
    pub(crate) fn prune_segment(&mut self, index: usize) {
        if self.contents.get(index).is_some_and(String::is_empty) {
            self.contents.remove(index);
            self.styles.remove(index);
        }
    }
}
