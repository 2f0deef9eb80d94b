// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style-aware edit operations.
//!
//! Every operation resolves logical character indices through the [`TextMetrics`] of the
//! current document, mutates the [`Document`] in place and leaves `contents` and `styles`
//! in step with no empty segment. Callers re-measure before the next operation.

use core::ops::{Range, RangeInclusive};

use smallvec::SmallVec;

use super::CursorInfo;
use crate::document::Document;
use crate::error::Error;
use crate::layout::{CharacterMetrics, TextMetrics};
use crate::style::{StyleProperty, TextStyle};
use crate::util::{to_index, to_signed};

/// A styled excerpt of a document, used for style-preserving copy and paste.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichFragment {
    segments: Vec<(String, TextStyle)>,
}

impl RichFragment {
    /// Creates a fragment, dropping empty segments.
    pub fn new(segments: impl IntoIterator<Item = (String, TextStyle)>) -> Self {
        Self {
            segments: segments
                .into_iter()
                .filter(|(text, _)| !text.is_empty())
                .collect(),
        }
    }

    /// The styled segments of the fragment.
    pub fn segments(&self) -> &[(String, TextStyle)] {
        &self.segments
    }

    /// The plain text of the fragment.
    pub fn text(&self) -> String {
        self.segments.iter().map(|(text, _)| text.as_str()).collect()
    }

    /// Returns `true` if the fragment holds no text.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Where inserted text landed in the document.
///
/// Inserted text can join the grapheme before or after it, so its extent is recorded in
/// bytes rather than characters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Insertion {
    /// The segment holding the inserted text.
    pub segment: usize,
    /// Byte range of the inserted text within the segment.
    pub bytes: Range<usize>,
}

fn character(metrics: &TextMetrics, index: usize) -> Result<&CharacterMetrics, Error> {
    let len = metrics.all_character.len();
    debug_assert!(index < len, "character index {index} out of range for {len}");
    metrics
        .all_character
        .get(index)
        .ok_or_else(|| Error::index_out_of_range(to_signed(index), len))
}

/// Resolves a gap to `(segment, byte offset)`, or `None` for the gap before the first character.
fn resolve_gap(
    metrics: &TextMetrics,
    cursor: CursorInfo,
) -> Result<Option<(usize, usize)>, Error> {
    if cursor.after_character_index < -1 {
        return Err(Error::index_out_of_range(
            cursor.after_character_index,
            metrics.all_character.len(),
        ));
    }
    let Some(index) = to_index(cursor.after_character_index) else {
        return Ok(None);
    };
    let character = character(metrics, index)?;
    Ok(Some((character.which_content, character.byte_range().end)))
}

fn check_range(metrics: &TextMetrics, range: &RangeInclusive<usize>) -> Result<(), Error> {
    if range.start() > range.end() {
        return Err(Error::index_out_of_range(
            to_signed(*range.start()),
            metrics.all_character.len(),
        ));
    }
    Ok(())
}

/// Inserts `text` at `cursor`, returning where it landed.
///
/// The text inherits the style of the segment holding the character before the gap. An
/// empty document gets a single segment with `default_style`. Empty text inserts nothing
/// and returns `None`.
pub fn insert_at(
    document: &mut Document,
    metrics: &TextMetrics,
    cursor: CursorInfo,
    text: &str,
    default_style: &TextStyle,
) -> Result<Option<Insertion>, Error> {
    if text.is_empty() {
        return Ok(None);
    }
    if document.is_empty() {
        document.push_segment(text, default_style.clone());
        return Ok(Some(Insertion {
            segment: 0,
            bytes: 0..text.len(),
        }));
    }

    let (segment, offset) = resolve_gap(metrics, cursor)?.unwrap_or((0, 0));
    let content = document
        .content_mut(segment)
        .ok_or_else(|| Error::invariant(format!("metrics name missing segment {segment}")))?;
    content.insert_str(offset, text);
    log::debug!("inserted {} bytes into segment {segment}", text.len());
    Ok(Some(Insertion {
        segment,
        bytes: offset..offset + text.len(),
    }))
}

/// Removes text recorded by [`insert_at`], restoring the document as it was before.
///
/// The insertion must be the last edit made to the document.
pub fn remove_insertion(document: &mut Document, insertion: &Insertion) -> Result<(), Error> {
    remove_bytes(document, insertion.segment, insertion.bytes.clone())?;
    document.prune_segment(insertion.segment);
    Ok(())
}

/// Inserts a styled fragment at `cursor`.
///
/// The segment holding the gap is split so the fragment's own styles survive.
pub fn insert_fragment(
    document: &mut Document,
    metrics: &TextMetrics,
    cursor: CursorInfo,
    fragment: &RichFragment,
) -> Result<(), Error> {
    if fragment.is_empty() {
        return Ok(());
    }
    let inserted = fragment.segments.iter().cloned();
    if document.is_empty() {
        document.splice_segments(0..0, inserted);
        return Ok(());
    }
    match resolve_gap(metrics, cursor)? {
        None => document.splice_segments(0..0, inserted),
        Some((segment, offset)) => {
            let host_len = document.contents().get(segment).map_or(0, String::len);
            if offset >= host_len {
                document.splice_segments(segment + 1..segment + 1, inserted);
            } else {
                let style = document.styles()[segment].clone();
                let tail = document
                    .content_mut(segment)
                    .map(|content| content.split_off(offset))
                    .unwrap_or_default();
                let pieces: Vec<_> = inserted.chain([(tail, style)]).collect();
                document.splice_segments(segment + 1..segment + 1, pieces);
                document.prune_segment(segment);
            }
        }
    }
    Ok(())
}

/// Deletes the characters in `range`.
pub fn delete_range(
    document: &mut Document,
    metrics: &TextMetrics,
    range: RangeInclusive<usize>,
) -> Result<(), Error> {
    check_range(metrics, &range)?;
    let first = character(metrics, *range.start())?;
    let last = character(metrics, *range.end())?;
    let (start_segment, end_segment) = (first.which_content, last.which_content);

    if start_segment == end_segment {
        let span = first.index_of_content..last.byte_range().end;
        remove_bytes(document, start_segment, span)?;
        document.prune_segment(start_segment);
    } else {
        let head_len = first.index_of_content;
        let tail_start = last.byte_range().end;
        remove_bytes(document, end_segment, 0..tail_start)?;
        if let Some(content) = document.content_mut(start_segment) {
            content.truncate(head_len);
        }
        let empty = |index: usize| document.contents().get(index).is_none_or(String::is_empty);
        let splice_start = if empty(start_segment) {
            start_segment
        } else {
            start_segment + 1
        };
        let splice_end = if empty(end_segment) {
            end_segment + 1
        } else {
            end_segment
        };
        document.splice_segments(splice_start..splice_end, core::iter::empty());
    }
    log::debug!("deleted characters {range:?}");
    Ok(())
}

/// Deletes the character before `cursor`, returning the moved cursor.
///
/// Returns `None` when the cursor is before the first character. A grapheme is always
/// removed whole, so a multi-code-point emoji goes in one step.
pub fn delete_backward(
    document: &mut Document,
    metrics: &TextMetrics,
    cursor: CursorInfo,
) -> Result<Option<CursorInfo>, Error> {
    let Some(index) = to_index(cursor.after_character_index) else {
        return Ok(None);
    };
    let target = character(metrics, index)?;
    remove_bytes(document, target.which_content, target.byte_range())?;
    document.prune_segment(target.which_content);
    Ok(Some(CursorInfo::after(cursor.after_character_index - 1)))
}

/// Merges `properties` into the styles covering `range`, or into every style for `None`.
///
/// Segments only partly covered are split so that the style change stays inside `range`.
pub fn apply_style(
    document: &mut Document,
    metrics: &TextMetrics,
    range: Option<RangeInclusive<usize>>,
    properties: &[StyleProperty],
) -> Result<(), Error> {
    let Some(range) = range else {
        for style in document.styles_mut() {
            style.apply_all(properties);
        }
        return Ok(());
    };
    check_range(metrics, &range)?;
    let first = character(metrics, *range.start())?;
    let last = character(metrics, *range.end())?;
    let (start_segment, end_segment) = (first.which_content, last.which_content);

    if start_segment == end_segment {
        let span = first.index_of_content..last.byte_range().end;
        restyle_span(document, start_segment, span, properties);
    } else {
        // Work from the back so earlier segment indices stay valid.
        restyle_span(document, end_segment, 0..last.byte_range().end, properties);
        for index in start_segment + 1..end_segment {
            if let Some(style) = document.style_mut(index) {
                style.apply_all(properties);
            }
        }
        let start_len = document.contents().get(start_segment).map_or(0, String::len);
        restyle_span(
            document,
            start_segment,
            first.index_of_content..start_len,
            properties,
        );
    }
    Ok(())
}

/// Copies the characters in `range` with their styles.
pub fn extract_fragment(
    document: &Document,
    metrics: &TextMetrics,
    range: RangeInclusive<usize>,
) -> Result<RichFragment, Error> {
    check_range(metrics, &range)?;
    character(metrics, *range.end())?;
    let mut segments: Vec<(String, TextStyle)> = Vec::new();
    let mut current = None;
    for character in &metrics.all_character[range] {
        if current == Some(character.which_content) {
            if let Some((text, _)) = segments.last_mut() {
                text.push_str(&character.char);
                continue;
            }
        }
        let style = document
            .styles()
            .get(character.which_content)
            .cloned()
            .unwrap_or_else(|| character.style.clone());
        segments.push((character.char.clone(), style));
        current = Some(character.which_content);
    }
    Ok(RichFragment::new(segments))
}

/// The text of the characters in `range`.
pub fn plain_text(metrics: &TextMetrics, range: RangeInclusive<usize>) -> Result<String, Error> {
    check_range(metrics, &range)?;
    character(metrics, *range.end())?;
    Ok(metrics.all_character[range]
        .iter()
        .map(|character| character.char.as_str())
        .collect())
}

fn remove_bytes(document: &mut Document, segment: usize, span: Range<usize>) -> Result<(), Error> {
    let content = document
        .content_mut(segment)
        .ok_or_else(|| Error::invariant(format!("metrics name missing segment {segment}")))?;
    if span.start > span.end
        || span.end > content.len()
        || !content.is_char_boundary(span.start)
        || !content.is_char_boundary(span.end)
    {
        return Err(Error::invariant(format!(
            "byte range {span:?} exceeds segment {segment} of {} bytes",
            content.len()
        )));
    }
    content.replace_range(span, "");
    Ok(())
}

/// Splits `segment` around the byte `span` and merges `properties` into the middle piece.
///
/// Covering the whole segment restyles it in place.
fn restyle_span(
    document: &mut Document,
    segment: usize,
    span: Range<usize>,
    properties: &[StyleProperty],
) {
    let Some(content) = document.contents().get(segment) else {
        return;
    };
    let end = span.end.min(content.len());
    let start = span.start.min(end);
    if start == 0 && end == content.len() {
        if let Some(style) = document.style_mut(segment) {
            style.apply_all(properties);
        }
        return;
    }

    let base = document.styles()[segment].clone();
    let mut pieces: SmallVec<[(String, TextStyle); 3]> = SmallVec::new();
    pieces.push((content[..start].to_owned(), base.clone()));
    pieces.push((content[start..end].to_owned(), base.merged(properties)));
    pieces.push((content[end..].to_owned(), base));
    document.splice_segments(segment..segment + 1, pieces);
}
