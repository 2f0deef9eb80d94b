// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::utils::{measure_document, sized};
use crate::backend::MonospaceBackend;
use crate::layout::measure;
use crate::{Document, ListStyle, TextAlign, TextStyle};

#[test]
fn empty_document_has_no_rows() {
    let metrics = measure_document(&Document::default());
    assert!(metrics.is_empty());
    assert!(metrics.rows.is_empty());
    assert_eq!(metrics.height, 0.0);
}

#[test]
fn wraps_greedily_at_container_width() {
    let doc = Document::new(100.0, 100.0).with_segments([("ABCDEFGHIJKLMNOP", sized(20.0))]);
    let metrics = measure_document(&doc);
    assert_eq!(metrics.rows.len(), 2);
    assert_eq!(
        (metrics.rows[0].start_index, metrics.rows[0].end_index),
        (0, 9)
    );
    assert_eq!(
        (metrics.rows[1].start_index, metrics.rows[1].end_index),
        (10, 15)
    );
    let k = &metrics.all_character[10];
    assert_eq!((k.x, k.y, k.which_row), (0.0, 20.0, 1));
    assert_eq!(metrics.height, 40.0);
}

#[test]
fn oversized_character_still_gets_a_row() {
    let doc = Document::new(5.0, 100.0).with_segments([("ab", sized(20.0))]);
    let metrics = measure_document(&doc);
    assert_eq!(metrics.rows.len(), 2);
    assert!(metrics.rows.iter().all(|row| row.start_index == row.end_index));
}

#[test]
fn rows_partition_characters() {
    let doc = Document::new(60.0, 100.0).with_segments([
        ("lorem ipsum ", TextStyle::default()),
        ("dolor\nsit amet", sized(24.0)),
    ]);
    let metrics = measure_document(&doc);
    let mut next = 0;
    for (index, row) in metrics.rows.iter().enumerate() {
        assert_eq!(row.start_index, next);
        for character in &metrics.all_character[row.start_index..=row.end_index] {
            assert_eq!(character.which_row, index);
            assert!(character.y >= row.content_top);
            assert!(character.y + character.height <= row.content_bottom + 0.001);
        }
        next = row.end_index + 1;
    }
    assert_eq!(next, metrics.all_character.len());
}

#[test]
fn newline_ends_row_without_width() {
    let doc = Document::default().with_segments([("ab\ncd", TextStyle::default())]);
    let metrics = measure_document(&doc);
    assert_eq!(metrics.rows.len(), 2);
    let newline = &metrics.all_character[2];
    assert!(newline.is_newline());
    assert_eq!(newline.width, 0.0);
    assert_eq!(newline.which_row, 0);
    assert_eq!(metrics.rows[1].start_index, 3);
}

#[test]
fn trailing_newline_adds_empty_row() {
    let doc = Document::default().with_segments([("ab\n", TextStyle::default())]);
    let metrics = measure_document(&doc);
    assert_eq!(metrics.rows.len(), 2);
    let trailing = &metrics.rows[1];
    assert!(trailing.is_empty());
    assert_eq!((trailing.start_index, trailing.end_index), (3, 2));
    assert_eq!(trailing.top, 16.0);
    assert_eq!(trailing.content_height, 16.0);
    assert_eq!(metrics.height, 32.0);
}

#[test]
fn right_alignment_shifts_by_free_space() {
    let mut doc = Document::new(100.0, 100.0).with_segments([("ABCDEF", sized(20.0))]);
    doc.text_align = TextAlign::Right;
    let metrics = measure_document(&doc);
    assert_eq!(metrics.rows[0].width, 60.0);
    let xs: Vec<f32> = metrics.all_character.iter().map(|c| c.x).collect();
    assert_eq!(xs, [40.0, 50.0, 60.0, 70.0, 80.0, 90.0]);
}

#[test]
fn center_alignment_shifts_by_half_free_space() {
    let mut doc = Document::new(100.0, 100.0).with_segments([("ABCDEF", sized(20.0))]);
    doc.text_align = TextAlign::Center;
    let metrics = measure_document(&doc);
    assert_eq!(metrics.all_character[0].x, 20.0);
}

#[test]
fn full_rows_are_not_shifted() {
    let mut doc = Document::new(100.0, 100.0).with_segments([("ABCDEFGHIJ", sized(20.0))]);
    doc.text_align = TextAlign::Right;
    let metrics = measure_document(&doc);
    assert_eq!(metrics.all_character[0].x, 0.0);
}

#[test]
fn paragraph_spacing_separates_rows() {
    let mut doc = Document::default().with_segments([("a\nb", TextStyle::default())]);
    doc.paragraph_spacing = 10.0;
    let metrics = measure_document(&doc);
    let (first, second) = (&metrics.rows[0], &metrics.rows[1]);
    assert_eq!((first.top, first.content_top, first.bottom), (0.0, 0.0, 16.0));
    assert_eq!(
        (second.top, second.content_top, second.bottom),
        (16.0, 26.0, 42.0)
    );
    assert_eq!(second.height, 26.0);
    assert_eq!(metrics.all_character[2].y, 26.0);
}

#[test]
fn mixed_sizes_share_a_bottom_line() {
    let doc = Document::default().with_segments([("a", sized(16.0)), ("B", sized(32.0))]);
    let metrics = measure_document(&doc);
    assert_eq!(metrics.rows[0].content_height, 32.0);
    let (small, large) = (&metrics.all_character[0], &metrics.all_character[1]);
    assert_eq!(small.y, 16.0);
    assert_eq!(large.y, 0.0);
    assert_eq!(small.y + small.height, large.y + large.height);
    assert_eq!(large.which_content, 1);
}

#[test]
fn line_height_scales_glyph_boxes() {
    let tall = TextStyle {
        line_height: Some(1.5),
        ..TextStyle::default()
    };
    let metrics = measure_document(&Document::default().with_segments([("ab", tall)]));
    assert_eq!(metrics.all_character[0].height, 24.0);
    assert_eq!(metrics.rows[0].content_height, 24.0);
}

#[test]
fn letter_spacing_widens_advances() {
    let spaced = TextStyle {
        letter_spacing: Some(2.0),
        ..TextStyle::default()
    };
    let metrics = measure_document(&Document::default().with_segments([("ab", spaced)]));
    assert_eq!(metrics.all_character[0].width, 10.0);
    assert_eq!(metrics.all_character[1].x, 10.0);
}

#[test]
fn list_style_reserves_a_gutter() {
    let mut doc = Document::new(100.0, 100.0).with_segments([("ABCDEFG", sized(20.0))]);
    assert_eq!(measure_document(&doc).rows.len(), 1);
    doc.list_style = Some(ListStyle::Disc);
    let metrics = measure_document(&doc);
    assert_eq!(metrics.width, 60.0);
    assert_eq!(metrics.rows.len(), 2);
    assert_eq!(metrics.rows[0].end_index, 5);
}

#[test]
fn paragraph_starts_skip_soft_wraps() {
    let doc =
        Document::new(40.0, 100.0).with_segments([("abcdefg\nhi\n\nj", TextStyle::default())]);
    let metrics = measure_document(&doc);
    // "abcde" | "fg\n" | "hi\n" | "\n" | "j"
    assert_eq!(metrics.rows.len(), 5);
    assert_eq!(metrics.paragraph_start_rows(), [0, 2, 4]);
}

#[test]
fn graphemes_are_atomic() {
    let doc = Document::default().with_segments([
        ("h\u{e9}llo", TextStyle::default()),
        ("\u{1F600}e\u{301}", TextStyle::default()),
    ]);
    let metrics = measure_document(&doc);
    let chars: Vec<&str> = metrics.all_character.iter().map(|c| c.char.as_str()).collect();
    assert_eq!(chars, ["h", "\u{e9}", "l", "l", "o", "\u{1F600}", "e\u{301}"]);

    let l = &metrics.all_character[2];
    assert_eq!((l.which_content, l.index_of_content, l.len), (0, 3, 1));

    let emoji = &metrics.all_character[5];
    assert!(emoji.is_emoji);
    assert!(emoji.is_surrogate_pair);
    assert_eq!(emoji.width, 16.0);
    assert_eq!((emoji.which_content, emoji.index_of_content), (1, 0));

    let combined = &metrics.all_character[6];
    assert!(!combined.is_emoji);
    assert_eq!(combined.byte_range(), 4..7);
}

#[test]
fn scale_multiplies_geometry() {
    let doc = Document::new(100.0, 100.0).with_segments([("ab", TextStyle::default())]);
    let metrics = measure(&doc, &mut MonospaceBackend::new(), 2.0);
    assert_eq!(metrics.width, 200.0);
    assert_eq!(metrics.all_character[1].x, 16.0);
    assert_eq!(metrics.rows[0].content_height, 32.0);
}

#[test]
fn baseline_sits_at_ascent() {
    let metrics = measure_document(&Document::default().with_segments([("a", sized(20.0))]));
    let a = &metrics.all_character[0];
    assert_eq!(a.baseline, 16.0);
}
