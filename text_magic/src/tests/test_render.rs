// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel checks for the pixmap backend.
//!
//! No font is registered, so glyphs are measured with fallback metrics (advance `0.6`
//! times the font size) and only non-glyph painting is observable.

use peniko::color::palette::css;

use crate::{
    CursorInfo, Decoration, DecorationLine, DecorationStyle, EditorOptions, Highlight,
    HighlightKind, HostEvent, ListStyle, MemoryClipboard, PixmapBackend, RichEditor,
    StyleProperty,
};

fn editor(text: &str) -> RichEditor<PixmapBackend> {
    let options = EditorOptions {
        font_size: 20.0,
        ..EditorOptions::default()
    };
    let mut editor = RichEditor::new(PixmapBackend::new(), options);
    editor.init().unwrap();
    editor.set_text(text);
    editor
}

fn alpha(editor: &RichEditor<PixmapBackend>, x: u32, y: u32) -> u8 {
    editor
        .backend()
        .pixmap()
        .unwrap()
        .pixel(x, y)
        .unwrap()
        .alpha()
}

#[test]
fn frame_covers_the_container() {
    let editor = editor("ab");
    let pixmap = editor.backend().pixmap().unwrap();
    assert_eq!((pixmap.width(), pixmap.height()), (260, 200));
}

#[test]
fn device_pixel_ratio_scales_the_frame() {
    let mut editor = editor("ab");
    editor
        .handle_event(
            HostEvent::DevicePixelRatioChanged(2.0),
            &mut MemoryClipboard::default(),
        )
        .unwrap();
    let pixmap = editor.backend().pixmap().unwrap();
    assert_eq!((pixmap.width(), pixmap.height()), (520, 400));
}

#[test]
fn caret_is_painted_after_the_character() {
    let mut editor = editor("ab");
    editor.set_cursor(CursorInfo::after(1));
    // Two characters of 12 units each.
    assert_eq!(alpha(&editor, 24, 10), 255);
    assert_eq!(alpha(&editor, 27, 10), 0);
}

#[test]
fn selection_is_translucent() {
    let mut editor = editor("ab");
    editor.select_all();
    let pixel = editor.backend().pixmap().unwrap().pixel(5, 10).unwrap();
    assert!(pixel.blue() > 0);
    assert!(pixel.alpha() > 0 && pixel.alpha() < 255);
    assert_eq!(alpha(&editor, 30, 10), 0);
}

#[test]
fn list_gutter_offsets_text_and_holds_markers() {
    let mut editor = editor("ab");
    editor.change_list_style(Some(ListStyle::Disc));
    editor.select_all();
    assert!(alpha(&editor, 20, 10) > 0, "disc marker");
    assert!(alpha(&editor, 45, 10) > 0, "selection after the gutter");
    assert_eq!(alpha(&editor, 70, 10), 0);
}

#[test]
fn cross_highlight_strokes_the_run() {
    let mut editor = editor("ab");
    editor
        .apply_style(&[StyleProperty::Highlight(Some(Highlight {
            color: css::GREEN,
            kind: HighlightKind::X,
        }))])
        .unwrap();
    assert!(alpha(&editor, 12, 12) > 0);
    assert_eq!(alpha(&editor, 12, 1), 0);
}

#[test]
fn underline_sits_at_the_descent() {
    let mut editor = editor("ab");
    editor
        .apply_style(&[StyleProperty::Decoration(Some(Decoration {
            line: DecorationLine::Underline,
            style: DecorationStyle::Solid,
            color: css::BLACK,
            thickness: 2.0,
        }))])
        .unwrap();
    assert!(alpha(&editor, 5, 19) > 0);
    assert_eq!(alpha(&editor, 5, 10), 0);
}
