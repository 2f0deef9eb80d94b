// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A styled-text editing core.
//!
//! `text_magic` maintains a document made of styled segments, lays it out into wrapped rows
//! with per-character geometry, maps pointer coordinates to logical positions, and performs
//! style-aware edits while an input method is active.
//!
//! The crate does not shape glyphs itself. Glyph extents and painting are provided by a
//! [`RenderBackend`]; [`MonospaceBackend`] gives deterministic metrics for headless use, and
//! (with the `pixmap` feature) [`PixmapBackend`] measures with real fonts and paints into a
//! `tiny-skia` pixmap.
//!
//! The usual entry point is [`RichEditor`]:
//!
//! ```
//! use text_magic::{EditorOptions, HostEvent, MemoryClipboard, MonospaceBackend, RichEditor};
//!
//! let mut editor = RichEditor::new(MonospaceBackend::new(), EditorOptions::default());
//! editor.init().unwrap();
//! let mut clipboard = MemoryClipboard::default();
//! editor
//!     .handle_event(HostEvent::Input("Hi".into()), &mut clipboard)
//!     .unwrap();
//! assert_eq!(editor.document().contents(), ["Hi"]);
//! assert_eq!(editor.metrics().all_character.len(), 2);
//! ```
//!
//! ## Features
//!
//! - `pixmap` (enabled by default): the `skrifa`/`tiny-skia` rendering backend.
//! - `system_clipboard`: a [`Clipboard`] implementation backed by `clipboard-rs`.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use peniko;
pub use peniko::Color;
pub use peniko::kurbo::Rect;

mod error;
mod util;

pub mod analysis;
pub mod backend;
pub mod clipboard;
pub mod document;
pub mod editing;
pub mod layout;
pub mod style;

#[cfg(test)]
mod tests;

pub use backend::{GlyphExtents, GlyphQuery, MonospaceBackend, RenderBackend, RenderRequest};
#[cfg(feature = "pixmap")]
pub use backend::PixmapBackend;
pub use clipboard::{Clipboard, MemoryClipboard};
#[cfg(feature = "system_clipboard")]
pub use clipboard::SystemClipboard;
pub use document::{Document, ListStyle, TextAlign};
pub use editing::{
    CaretGeometry, CursorInfo, CursorPosition, EditorOptions, Generation, HostEvent, Insertion,
    Key, KeyEvent, Modifiers, NewlineBias, RestyleScope, RichEditor, RichFragment, SelectRange,
};
pub use error::{Error, ErrorKind};
pub use layout::{CharacterMetrics, RowMetrics, TextMetrics};
pub use style::{
    Blur, Decoration, DecorationLine, DecorationStyle, FontStyle, FontWeight, Highlight,
    HighlightKind, Shadow, Stroke, StrokePosition, StyleProperty, TextStyle,
};
