// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::utils::TestEnv;
use crate::{CursorInfo, HostEvent, Key};

fn update(env: &mut TestEnv, text: &str) {
    env.send(HostEvent::CompositionUpdate(text.to_owned()));
}

#[test]
fn updates_replace_provisional_text() {
    let mut env = TestEnv::new("abcd");
    env.editor.set_cursor(CursorInfo::after(1));
    env.send(HostEvent::CompositionStart);
    assert!(env.editor.is_composing());

    update(&mut env, "\u{6D4B}");
    assert_eq!(env.editor.text(), "ab\u{6D4B}cd");
    assert_eq!(env.cursor_index(), 2);

    update(&mut env, "\u{6D4B}\u{8BD5}");
    assert_eq!(env.editor.text(), "ab\u{6D4B}\u{8BD5}cd");
    assert_eq!(env.cursor_index(), 3);

    env.send(HostEvent::CompositionEnd("\u{6D4B}\u{8BD5}".to_owned()));
    assert!(!env.editor.is_composing());
    assert_eq!(env.editor.text(), "ab\u{6D4B}\u{8BD5}cd");
    assert_eq!(env.editor.cursor(), CursorInfo::after(3));
}

#[test]
fn end_commits_text_different_from_the_last_update() {
    let mut env = TestEnv::new("ab");
    env.editor.set_cursor(CursorInfo::after(1));
    env.send(HostEvent::CompositionStart);
    update(&mut env, "ni");
    update(&mut env, "nih");
    env.send(HostEvent::CompositionEnd("\u{4F60}".to_owned()));
    assert_eq!(env.editor.text(), "ab\u{4F60}");
    assert_eq!(env.cursor_index(), 2);
}

#[test]
fn cancel_restores_the_document() {
    let mut env = TestEnv::new("abcd");
    env.editor.set_cursor(CursorInfo::after(1));
    env.send(HostEvent::CompositionStart);
    update(&mut env, "xyz");
    env.send(HostEvent::CompositionCancel);
    assert!(!env.editor.is_composing());
    assert_eq!(env.editor.text(), "abcd");
    assert_eq!(env.editor.cursor(), CursorInfo::after(1));
}

#[test]
fn input_while_composing_commits() {
    let mut env = TestEnv::new("ab");
    env.editor.set_cursor(CursorInfo::after(0));
    env.send(HostEvent::CompositionStart);
    update(&mut env, "ka");
    env.type_text("\u{304B}");
    assert!(!env.editor.is_composing());
    assert_eq!(env.editor.text(), "a\u{304B}b");
}

#[test]
fn start_replaces_the_selection() {
    let mut env = TestEnv::new("abcd");
    env.editor
        .set_selection(CursorInfo::after(0), CursorInfo::after(2));
    env.send(HostEvent::CompositionStart);
    assert_eq!(env.editor.text(), "ad");
    update(&mut env, "X");
    assert_eq!(env.editor.text(), "aXd");
}

#[test]
fn composing_into_an_empty_document() {
    let mut env = TestEnv::new("");
    env.send(HostEvent::CompositionStart);
    update(&mut env, "\u{6D4B}");
    update(&mut env, "\u{6D4B}\u{8BD5}");
    assert_eq!(env.editor.document().contents(), ["\u{6D4B}\u{8BD5}"]);
    env.send(HostEvent::CompositionEnd("\u{6D4B}\u{8BD5}".to_owned()));
    assert_eq!(env.editor.document().contents(), ["\u{6D4B}\u{8BD5}"]);
    assert_eq!(env.cursor_index(), 1);
}

#[test]
fn empty_update_removes_provisional_text() {
    let mut env = TestEnv::new("ab");
    env.editor.set_cursor(CursorInfo::after(1));
    env.send(HostEvent::CompositionStart);
    update(&mut env, "q");
    update(&mut env, "");
    assert_eq!(env.editor.text(), "ab");
    assert_eq!(env.cursor_index(), 1);
    assert!(env.editor.is_composing());
}

#[test]
fn keys_are_left_to_the_input_method() {
    let mut env = TestEnv::new("ab");
    env.editor.set_cursor(CursorInfo::after(1));
    env.send(HostEvent::CompositionStart);
    update(&mut env, "n");
    assert!(!env.press(Key::Backspace));
    assert!(!env.press(Key::ArrowLeft));
    assert!(!env.send(HostEvent::Paste));
    assert_eq!(env.editor.text(), "abn");
}

#[test]
fn updates_without_a_composition_are_ignored() {
    let mut env = TestEnv::new("ab");
    update(&mut env, "zz");
    assert_eq!(env.editor.text(), "ab");
}

#[test]
fn provisional_combining_mark_joins_the_preceding_letter() {
    let mut env = TestEnv::new("e");
    env.editor.set_cursor(CursorInfo::after(0));
    env.send(HostEvent::CompositionStart);
    update(&mut env, "\u{301}");
    assert_eq!(env.editor.text(), "e\u{301}");
    assert_eq!(env.cursor_index(), 0);

    update(&mut env, "\u{301}x");
    assert_eq!(env.editor.text(), "e\u{301}x");
    assert_eq!(env.cursor_index(), 1);

    env.send(HostEvent::CompositionEnd("\u{301}x".to_owned()));
    assert_eq!(env.editor.text(), "e\u{301}x");
    assert_eq!(env.editor.cursor(), CursorInfo::after(1));
}

#[test]
fn cancelling_a_merged_mark_restores_the_letter() {
    let mut env = TestEnv::new("eb");
    env.editor.set_cursor(CursorInfo::after(0));
    env.send(HostEvent::CompositionStart);
    update(&mut env, "\u{301}");
    env.send(HostEvent::CompositionCancel);
    assert_eq!(env.editor.text(), "eb");
    assert_eq!(env.editor.metrics().all_character.len(), 2);
    assert_eq!(env.editor.cursor(), CursorInfo::after(0));
}

#[test]
fn provisional_regional_indicator_can_split_off_again() {
    let mut env = TestEnv::new("\u{1F1EF}");
    env.editor.set_cursor(CursorInfo::after(0));
    env.send(HostEvent::CompositionStart);
    update(&mut env, "\u{1F1F5}");
    assert_eq!(env.editor.metrics().all_character.len(), 1);
    assert_eq!(env.cursor_index(), 0);

    update(&mut env, "\u{1F1F5}\u{1F1F0}");
    assert_eq!(env.editor.metrics().all_character.len(), 2);
    assert_eq!(env.cursor_index(), 1);

    env.send(HostEvent::CompositionEnd("\u{1F1F5}".to_owned()));
    assert_eq!(env.editor.text(), "\u{1F1EF}\u{1F1F5}");
    assert_eq!(env.editor.cursor(), CursorInfo::after(0));
}
