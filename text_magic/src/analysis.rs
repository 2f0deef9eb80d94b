// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grapheme segmentation and emoji classification.
//!
//! Layout and editing treat a grapheme cluster as one logical character, so an emoji sequence
//! such as a flag or a ZWJ family is measured, selected and deleted as a single unit.

use icu_properties::CodePointSetData;
use icu_properties::props::{EmojiPresentation, ExtendedPictographic, RegionalIndicator};
use icu_segmenter::GraphemeClusterSegmenter;

const VARIATION_SELECTOR_16: char = '\u{FE0F}';
const COMBINING_KEYCAP: char = '\u{20E3}';

/// Splits `text` into grapheme clusters, yielding each cluster with its byte offset.
pub fn graphemes(text: &str) -> impl Iterator<Item = (usize, &str)> + '_ {
    let breaks: Vec<usize> = GraphemeClusterSegmenter::new().segment_str(text).collect();
    let mut previous = 0;
    breaks.into_iter().filter_map(move |offset| {
        if offset == previous {
            return None;
        }
        let start = previous;
        previous = offset;
        Some((start, &text[start..offset]))
    })
}

/// Number of grapheme clusters in `text`.
pub fn grapheme_count(text: &str) -> usize {
    graphemes(text).count()
}

/// Returns `true` if `grapheme` is an explicit line break.
pub fn is_newline(grapheme: &str) -> bool {
    matches!(grapheme, "\n" | "\r\n")
}

/// Returns `true` if `grapheme` renders as an emoji.
///
/// A cluster is an emoji when it contains a regional indicator or a keycap, holds a
/// pictographic character with default emoji presentation, or forces emoji presentation
/// with a variation selector.
pub fn is_emoji(grapheme: &str) -> bool {
    let pictographic = CodePointSetData::new::<ExtendedPictographic>();
    let presentation = CodePointSetData::new::<EmojiPresentation>();
    let regional = CodePointSetData::new::<RegionalIndicator>();

    let forced = grapheme.contains(VARIATION_SELECTOR_16);
    grapheme.chars().any(|ch| {
        regional.contains(ch)
            || ch == COMBINING_KEYCAP
            || (pictographic.contains(ch) && (forced || presentation.contains(ch)))
    })
}

/// Returns `true` if `grapheme` would need a UTF-16 surrogate pair, i.e. it contains a
/// character outside the Basic Multilingual Plane.
pub fn is_surrogate_pair(grapheme: &str) -> bool {
    grapheme.chars().any(|ch| ch.len_utf16() == 2)
}

#[cfg(test)]
mod tests {
    use super::{grapheme_count, graphemes, is_emoji, is_newline, is_surrogate_pair};

    #[test]
    fn graphemes_carry_byte_offsets() {
        let clusters: Vec<_> = graphemes("a\u{e9}\r\nb").collect();
        assert_eq!(clusters, [(0, "a"), (1, "\u{e9}"), (3, "\r\n"), (5, "b")]);
    }

    #[test]
    fn emoji_sequences_are_one_grapheme() {
        // Family ZWJ sequence and a flag.
        let text = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}\u{1F1EF}\u{1F1F5}";
        assert_eq!(grapheme_count(text), 2);
        assert!(graphemes(text).all(|(_, g)| is_emoji(g)));
    }

    #[test]
    fn emoji_classification() {
        assert!(is_emoji("\u{1F600}"));
        assert!(is_emoji("\u{2764}\u{FE0F}"));
        assert!(is_emoji("1\u{FE0F}\u{20E3}"));
        assert!(!is_emoji("\u{2764}"), "text presentation heart");
        assert!(!is_emoji("a"));
        assert!(!is_emoji("\u{6D4B}"));
    }

    #[test]
    fn surrogate_pairs_and_newlines() {
        assert!(is_surrogate_pair("\u{1F600}"));
        assert!(!is_surrogate_pair("\u{6D4B}"));
        assert!(is_newline("\n"));
        assert!(is_newline("\r\n"));
        assert!(!is_newline(" "));
    }
}
