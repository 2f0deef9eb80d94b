// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    Document, EditorOptions, HostEvent, Key, KeyEvent, MemoryClipboard, MonospaceBackend,
    RichEditor, TextMetrics, TextStyle,
};

/// A monospace editor with an in-memory clipboard.
///
/// Narrow characters advance half the font size, so with the default 16px font every
/// ASCII character is 8 units wide and every row is 16 units tall.
pub(crate) struct TestEnv {
    pub(crate) editor: RichEditor<MonospaceBackend>,
    pub(crate) clipboard: MemoryClipboard,
}

impl TestEnv {
    pub(crate) fn new(text: &str) -> Self {
        Self::with_options(text, EditorOptions::default())
    }

    pub(crate) fn with_options(text: &str, options: EditorOptions) -> Self {
        Self::with_backend(text, MonospaceBackend::new(), options)
    }

    pub(crate) fn with_backend(
        text: &str,
        backend: MonospaceBackend,
        options: EditorOptions,
    ) -> Self {
        let mut editor = RichEditor::new(backend, options);
        editor.init().unwrap();
        if !text.is_empty() {
            editor.set_text(text);
        }
        editor.focus();
        Self {
            editor,
            clipboard: MemoryClipboard::default(),
        }
    }

    pub(crate) fn send(&mut self, event: HostEvent) -> bool {
        let handled = self
            .editor
            .handle_event(event, &mut self.clipboard)
            .unwrap();
        assert_invariants(self.editor.document());
        handled
    }

    pub(crate) fn press(&mut self, key: Key) -> bool {
        self.send(HostEvent::Key(KeyEvent::plain(key)))
    }

    pub(crate) fn press_shifted(&mut self, key: Key) -> bool {
        self.send(HostEvent::Key(KeyEvent::shifted(key)))
    }

    pub(crate) fn shortcut(&mut self, ch: char) -> bool {
        self.send(HostEvent::Key(KeyEvent::command(ch)))
    }

    pub(crate) fn type_text(&mut self, text: &str) {
        self.send(HostEvent::Input(text.to_owned()));
    }

    pub(crate) fn cursor_index(&self) -> isize {
        self.editor.cursor().after_character_index
    }

    pub(crate) fn selected(&self) -> Option<core::ops::RangeInclusive<usize>> {
        self.editor.selection().normalized()
    }
}

/// Asserts the document's segment invariants.
pub(crate) fn assert_invariants(document: &Document) {
    document.check_invariants().unwrap();
    assert_eq!(document.contents().len(), document.styles().len());
    assert!(
        document.contents().iter().all(|content| !content.is_empty()),
        "empty segment in {:?}",
        document.contents()
    );
}

pub(crate) fn measure_document(document: &Document) -> TextMetrics {
    crate::layout::measure(document, &mut MonospaceBackend::new(), 1.0)
}

/// The default style at `font_size`.
pub(crate) fn sized(font_size: f32) -> TextStyle {
    TextStyle {
        font_size,
        ..TextStyle::default()
    }
}
