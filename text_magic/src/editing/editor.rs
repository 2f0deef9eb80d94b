// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::time::{Duration, Instant};

use peniko::Color;
use peniko::color::palette::css;
use peniko::kurbo::Rect;

use super::ops::{self, Insertion, RichFragment};
use super::{CaretGeometry, Composition, CursorInfo, NewlineBias, SelectRange, Throttle};
use crate::backend::{RenderBackend, RenderRequest};
use crate::clipboard::Clipboard;
use crate::document::{Document, ListStyle, TextAlign};
use crate::error::Error;
use crate::layout::{self, LIST_GUTTER_WIDTH, TextMetrics};
use crate::style::{StyleProperty, TextStyle};
use crate::util::to_signed;

/// Opaque representation of a generation.
///
/// Obtained from [`RichEditor::generation`].
// Overflow handling: the generations are only compared,
// so wrapping is fine.
#[derive(PartialEq, Eq, Default, Clone, Copy, Debug)]
pub struct Generation(u32);

impl Generation {
    /// Make it not what it currently is.
    pub(crate) fn nudge(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// What [`RichEditor::apply_style`] restyles when nothing is selected.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RestyleScope {
    /// Merge the style into every segment of the document.
    #[default]
    Document,
    /// Merge the style into the editor's default style only, which styles text typed into
    /// an empty document.
    DefaultStyle,
}

/// Configuration of a [`RichEditor`].
#[derive(Clone, Debug, PartialEq)]
pub struct EditorOptions {
    /// Container width, in layout units.
    pub width: f32,
    /// Container height, in layout units.
    pub height: f32,
    /// Font size of the default style.
    pub font_size: f32,
    /// Color of the default style.
    pub font_color: Color,
    /// Font family of the default style.
    pub font_family: String,
    /// Initial row alignment.
    pub text_align: TextAlign,
    /// Initial paragraph spacing, in layout units.
    pub paragraph_spacing: f32,
    /// Selection fill color.
    pub selection_color: Color,
    /// Opacity applied to the selection fill.
    pub selection_opacity: f32,
    /// Caret stroke width, in layout units.
    pub caret_width: f32,
    /// Minimum time between two drag selection updates.
    pub drag_throttle: Duration,
    /// What a style change without a selection applies to.
    pub restyle_scope: RestyleScope,
    /// Whether pasting text copied from this editor restores its styles.
    pub preserve_styles_on_paste: bool,
    /// Initial device pixel ratio of the host surface.
    pub device_pixel_ratio: f32,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            width: 260.0,
            height: 200.0,
            font_size: 16.0,
            font_color: css::BLACK,
            font_family: String::new(),
            text_align: TextAlign::Left,
            paragraph_spacing: 0.0,
            selection_color: css::BLUE,
            selection_opacity: 0.2,
            caret_width: 1.0,
            drag_throttle: Duration::from_millis(100),
            restyle_scope: RestyleScope::Document,
            preserve_styles_on_paste: false,
            device_pixel_ratio: 1.0,
        }
    }
}

/// A key the editor reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Inserts a newline.
    Enter,
    /// Deletes the selection or the character before the caret.
    Backspace,
    /// Consumed without effect.
    Tab,
    /// Moves up one row.
    ArrowUp,
    /// Moves down one row.
    ArrowDown,
    /// Moves back one character.
    ArrowLeft,
    /// Moves forward one character.
    ArrowRight,
    /// A character key; only command shortcuts are handled, text arrives as
    /// [`HostEvent::Input`].
    Character(char),
}

/// Modifier keys held during a key press.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Shift extends the selection.
    pub shift: bool,
    /// The platform command key (Meta on macOS, Control elsewhere).
    pub command: bool,
}

/// A key press.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key.
    pub key: Key,
    /// Held modifiers.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press without modifiers.
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    /// A key press with Shift held.
    pub fn shifted(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                shift: true,
                command: false,
            },
        }
    }

    /// A command shortcut for `ch`.
    pub fn command(ch: char) -> Self {
        Self {
            key: Key::Character(ch),
            modifiers: Modifiers {
                shift: false,
                command: true,
            },
        }
    }
}

/// A normalized event delivered by the host surface.
///
/// Pointer coordinates are in layout units, relative to the text area.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    /// The primary button went down.
    PointerDown {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },
    /// The pointer moved.
    PointerMove {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
        /// When the move happened.
        time: Instant,
    },
    /// The primary button went up.
    PointerUp,
    /// A key was pressed.
    Key(KeyEvent),
    /// Text was typed outside a composition.
    Input(String),
    /// The input method started composing.
    CompositionStart,
    /// The input method changed its provisional text.
    CompositionUpdate(String),
    /// The input method committed its final text.
    CompositionEnd(String),
    /// The input method was disabled mid-composition.
    CompositionCancel,
    /// Copy the selection.
    Copy,
    /// Copy the selection, then delete it.
    Cut,
    /// Paste the clipboard at the caret.
    Paste,
    /// The host's device pixel ratio changed.
    DevicePixelRatioChanged(f32),
}

/// A styled-text editor driving a [`RenderBackend`].
///
/// The editor owns its document, the metrics derived from it and its backend. Every
/// mutation re-measures synchronously, so edits always resolve indices against fresh
/// metrics, and then renders a frame.
#[derive(Debug)]
pub struct RichEditor<B: RenderBackend> {
    backend: B,
    options: EditorOptions,
    document: Document,
    metrics: TextMetrics,
    default_style: TextStyle,
    cursor: CursorInfo,
    cursor_visible: bool,
    selection: SelectRange,
    composition: Composition,
    pointer_down: bool,
    drag: Throttle<(f32, f32)>,
    device_pixel_ratio: f32,
    copied: Option<RichFragment>,
    initialized: bool,
    generation: Generation,
}

impl<B: RenderBackend> RichEditor<B> {
    /// Creates an editor with an empty document.
    pub fn new(backend: B, options: EditorOptions) -> Self {
        let mut document = Document::new(options.width, options.height);
        document.text_align = options.text_align;
        document.paragraph_spacing = options.paragraph_spacing;
        Self {
            backend,
            document,
            metrics: TextMetrics::default(),
            default_style: TextStyle::new(
                options.font_family.clone(),
                options.font_size,
                options.font_color,
            ),
            cursor: CursorInfo::BEFORE_FIRST,
            cursor_visible: false,
            selection: SelectRange::new(options.selection_color, options.selection_opacity),
            composition: Composition::Idle,
            pointer_down: false,
            drag: Throttle::new(options.drag_throttle),
            device_pixel_ratio: options.device_pixel_ratio,
            copied: None,
            initialized: false,
            generation: Generation(1),
            options,
        }
    }

    /// Initializes the backend, then measures and renders the first frame.
    pub fn init(&mut self) -> Result<(), Error> {
        self.backend.init()?;
        self.initialized = true;
        self.refresh();
        Ok(())
    }

    // --- MARK: Accessors ---

    /// The document being edited.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Metrics of the current document.
    pub fn metrics(&self) -> &TextMetrics {
        &self.metrics
    }

    /// The caret position.
    pub fn cursor(&self) -> CursorInfo {
        self.cursor
    }

    /// Returns `true` if the caret is shown.
    pub fn is_cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// The current selection.
    pub fn selection(&self) -> &SelectRange {
        &self.selection
    }

    /// The style for text typed into an empty document.
    pub fn default_style(&self) -> &TextStyle {
        &self.default_style
    }

    /// The options the editor was created with.
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// The input method state.
    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// Returns `true` while an input method composition is in progress.
    pub fn is_composing(&self) -> bool {
        self.composition.is_composing()
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably.
    ///
    /// Call [`RichEditor::measure`] after changing anything that affects glyph extents.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The host's device pixel ratio.
    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// The factor from layout units to device units.
    pub fn scale(&self) -> f32 {
        if self.backend.use_device_pixel_ratio() {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }

    /// Get the current `Generation` of the editor, to decide whether to redraw.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The concatenated document text.
    pub fn text(&self) -> String {
        self.document.text()
    }

    /// The selected text, if anything is selected.
    pub fn selected_text(&self) -> Option<String> {
        let range = self.selection.normalized()?;
        ops::plain_text(&self.metrics, range).ok()
    }

    /// Where the caret is drawn, in device units.
    pub fn caret_geometry(&self) -> Option<CaretGeometry> {
        self.cursor.geometry(
            &self.metrics,
            &self.document,
            self.scale(),
            self.default_style.font_size,
        )
    }

    /// One rectangle per selected character, in device units.
    pub fn selection_rects(&self) -> Vec<Rect> {
        self.selection.rects(&self.metrics)
    }

    /// Resolves a point in device units to a gap.
    pub fn get_cursor_by_coordinate(&self, x: f32, y: f32) -> CursorInfo {
        CursorInfo::from_point(&self.metrics, self.document.text_align, x, y)
    }

    /// Resolves a point in device units to a gap with an explicit newline bias.
    pub fn get_cursor_by_coordinate_with(
        &self,
        x: f32,
        y: f32,
        bias: NewlineBias,
    ) -> CursorInfo {
        CursorInfo::from_point_with(&self.metrics, self.document.text_align, x, y, bias)
    }

    // --- MARK: Layout and rendering ---

    /// Re-measures the document and returns the fresh metrics.
    pub fn measure(&mut self) -> &TextMetrics {
        self.remeasure();
        &self.metrics
    }

    /// Renders a frame through the backend.
    ///
    /// Does nothing before [`RichEditor::init`] succeeded.
    pub fn render(&mut self) {
        self.generation.nudge();
        if !self.initialized {
            log::trace!("skipping render before init");
            return;
        }
        let scale = self.scale();
        let selection = self.selection.rects(&self.metrics);
        let caret = if self.cursor_visible && selection.is_empty() {
            self.caret_geometry()
                .map(|caret| caret.rect(self.options.caret_width * scale))
        } else {
            None
        };
        let gutter = if self.document.list_style.is_some() {
            LIST_GUTTER_WIDTH * scale
        } else {
            0.0
        };
        let request = RenderRequest {
            document: &self.document,
            metrics: &self.metrics,
            scale,
            gutter,
            selection: &selection,
            selection_color: self.selection.fill_color(),
            caret,
        };
        self.backend.render(&request);
    }

    fn remeasure(&mut self) {
        let scale = self.scale();
        self.metrics = layout::measure(&self.document, &mut self.backend, scale);
        let max = to_signed(self.metrics.all_character.len()) - 1;
        if self.cursor.after_character_index > max {
            self.cursor = CursorInfo::after(max);
        }
    }

    fn refresh(&mut self) {
        self.remeasure();
        self.render();
    }

    // --- MARK: Document settings ---

    /// Changes the container size.
    pub fn change_size(&mut self, width: f32, height: f32) {
        self.document.width = width;
        self.document.height = height;
        self.refresh();
    }

    /// Changes the row alignment.
    pub fn change_text_align(&mut self, align: TextAlign) {
        self.document.text_align = align;
        self.refresh();
    }

    /// Changes the space above every row but the first.
    pub fn change_paragraph_spacing(&mut self, spacing: f32) {
        self.document.paragraph_spacing = spacing;
        self.refresh();
    }

    /// Changes (or removes) the list marker style.
    pub fn change_list_style(&mut self, style: Option<ListStyle>) {
        self.document.list_style = style;
        self.refresh();
    }

    /// Replaces the document text with a single segment in the default style.
    pub fn set_text(&mut self, text: &str) {
        self.document.clear();
        self.document.push_segment(text, self.default_style.clone());
        self.reset_interaction();
        self.refresh();
    }

    /// Replaces the whole document.
    pub fn set_document(&mut self, document: Document) {
        self.document = document;
        self.reset_interaction();
        self.refresh();
    }

    fn reset_interaction(&mut self) {
        self.composition = Composition::Idle;
        self.cursor = CursorInfo::BEFORE_FIRST;
        self.selection.clear();
        self.copied = None;
    }

    /// Merges `properties` into the selection, or, without one, into the scope chosen by
    /// [`EditorOptions::restyle_scope`].
    pub fn apply_style(&mut self, properties: &[StyleProperty]) -> Result<(), Error> {
        self.settle_composition();
        match (self.selection.normalized(), self.options.restyle_scope) {
            (Some(range), _) => {
                ops::apply_style(&mut self.document, &self.metrics, Some(range), properties)?;
            }
            (None, RestyleScope::Document) => {
                ops::apply_style(&mut self.document, &self.metrics, None, properties)?;
            }
            (None, RestyleScope::DefaultStyle) => self.default_style.apply_all(properties),
        }
        self.refresh();
        Ok(())
    }

    // --- MARK: Caret and selection ---

    /// Shows the caret.
    pub fn focus(&mut self) {
        self.cursor_visible = true;
        self.render();
    }

    /// Hides the caret.
    pub fn blur(&mut self) {
        self.cursor_visible = false;
        self.render();
    }

    /// Moves the caret, clearing the selection.
    pub fn set_cursor(&mut self, cursor: CursorInfo) {
        let max = to_signed(self.metrics.all_character.len()) - 1;
        self.cursor = CursorInfo {
            after_character_index: cursor.after_character_index.clamp(-1, max),
            ..cursor
        };
        self.selection.clear();
        self.cursor_visible = true;
        self.render();
    }

    /// Selects from `anchor` to `focus`.
    pub fn set_selection(&mut self, anchor: CursorInfo, focus: CursorInfo) {
        self.selection.set(anchor, focus);
        self.cursor_visible = self.selection.is_empty();
        self.render();
    }

    /// Selects every character.
    pub fn select_all(&mut self) {
        if self.metrics.is_empty() {
            return;
        }
        let last = to_signed(self.metrics.all_character.len()) - 1;
        self.set_selection(CursorInfo::BEFORE_FIRST, CursorInfo::after(last));
    }

    // --- MARK: Editing ---

    /// Inserts `text` at the caret, replacing the selection.
    pub fn insert_text(&mut self, text: &str) -> Result<(), Error> {
        if text.is_empty() {
            return Ok(());
        }
        self.settle_composition();
        self.delete_selection()?;
        let base = self.insertion_base();
        let style = self.default_style.clone();
        self.insert_measured(base, |document, metrics| {
            ops::insert_at(document, metrics, base, text, &style)
        })?;
        self.selection.clear();
        self.cursor_visible = true;
        self.render();
        Ok(())
    }

    /// Deletes the selection, or the character before the caret.
    pub fn backspace(&mut self) -> Result<(), Error> {
        self.settle_composition();
        if !self.delete_selection()? {
            match ops::delete_backward(&mut self.document, &self.metrics, self.cursor)? {
                Some(cursor) => self.cursor = cursor,
                None => return Ok(()),
            }
        }
        self.cursor_visible = true;
        self.refresh();
        Ok(())
    }

    /// Deletes the selection and collapses the caret to its start.
    ///
    /// Returns `false` if nothing was selected.
    fn delete_selection(&mut self) -> Result<bool, Error> {
        let Some(range) = self.selection.normalized() else {
            return Ok(false);
        };
        let start = to_signed(*range.start());
        ops::delete_range(&mut self.document, &self.metrics, range)?;
        self.cursor = CursorInfo::after(start - 1);
        self.selection.clear();
        self.remeasure();
        Ok(true)
    }

    fn insert_fragment(&mut self, fragment: &RichFragment) -> Result<(), Error> {
        self.settle_composition();
        self.delete_selection()?;
        let base = self.insertion_base();
        self.insert_measured(base, |document, metrics| {
            ops::insert_fragment(document, metrics, base, fragment)
        })?;
        self.cursor_visible = true;
        self.render();
        Ok(())
    }

    fn insertion_base(&self) -> CursorInfo {
        if self.document.is_empty() {
            CursorInfo::BEFORE_FIRST
        } else {
            self.cursor
        }
    }

    /// Runs `edit` at `base`, re-measures and places the caret after the characters the
    /// document gained.
    ///
    /// Inserted text may join the grapheme before it, so the gain can be smaller than the
    /// inserted text's own grapheme count.
    fn insert_measured<T>(
        &mut self,
        base: CursorInfo,
        edit: impl FnOnce(&mut Document, &TextMetrics) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let before = to_signed(self.metrics.all_character.len());
        let result = edit(&mut self.document, &self.metrics)?;
        self.remeasure();
        let after = to_signed(self.metrics.all_character.len());
        let gained = (after - before).max(0);
        self.cursor = CursorInfo::after((base.after_character_index + gained).min(after - 1));
        Ok(result)
    }

    // --- MARK: Clipboard ---

    /// Writes the selected text to `clipboard`.
    ///
    /// Returns `false` if nothing was selected.
    pub fn copy(&mut self, clipboard: &mut dyn Clipboard) -> Result<bool, Error> {
        let Some(range) = self.selection.normalized() else {
            return Ok(false);
        };
        let text = ops::plain_text(&self.metrics, range.clone())?;
        clipboard.write_text(&text).inspect_err(|err| {
            log::warn!("failed to copy text to clipboard: {err}");
        })?;
        self.copied = if self.options.preserve_styles_on_paste {
            Some(ops::extract_fragment(&self.document, &self.metrics, range)?)
        } else {
            None
        };
        log::debug!("copied {} bytes", text.len());
        Ok(true)
    }

    /// Copies the selection, then deletes it.
    pub fn cut(&mut self, clipboard: &mut dyn Clipboard) -> Result<bool, Error> {
        if !self.copy(clipboard)? {
            return Ok(false);
        }
        self.settle_composition();
        self.delete_selection()?;
        self.cursor_visible = true;
        self.refresh();
        Ok(true)
    }

    /// Inserts the clipboard text at the caret, replacing the selection.
    ///
    /// When [`EditorOptions::preserve_styles_on_paste`] is set and the clipboard still holds
    /// what this editor copied, the copied styles are restored.
    pub fn paste(&mut self, clipboard: &mut dyn Clipboard) -> Result<(), Error> {
        let text = clipboard.read_text().inspect_err(|err| {
            log::warn!("failed to read clipboard contents: {err}");
        })?;
        match self.copied.take() {
            Some(fragment) if fragment.text() == text => {
                let result = self.insert_fragment(&fragment);
                self.copied = Some(fragment);
                result
            }
            _ => self.insert_text(&text),
        }
    }

    // --- MARK: IME ---

    /// Starts composing at the caret, deleting the selection first.
    pub fn start_composition(&mut self) -> Result<(), Error> {
        if self.delete_selection()? {
            self.render();
        }
        self.composition.start(self.cursor);
        Ok(())
    }

    /// Replaces the provisional text with `text`.
    ///
    /// Ignored when no composition is in progress.
    pub fn update_composition(&mut self, text: &str) -> Result<(), Error> {
        let Some(state) = self.composition.state().cloned() else {
            return Ok(());
        };
        self.remove_provisional(state.provisional.as_ref())?;
        let start = state.start_cursor;
        let style = self.default_style.clone();
        let provisional = self.insert_measured(start, |document, metrics| {
            ops::insert_at(document, metrics, start, text, &style)
        })?;
        self.composition.record(text, provisional);
        self.cursor_visible = true;
        self.render();
        Ok(())
    }

    /// Commits `text` in place of the provisional text.
    ///
    /// Without a composition in progress this is a plain insertion.
    pub fn finish_composition(&mut self, text: &str) -> Result<(), Error> {
        let Some(state) = self.composition.finish() else {
            return self.insert_text(text);
        };
        self.remove_provisional(state.provisional.as_ref())?;
        let start = state.start_cursor;
        let style = self.default_style.clone();
        self.insert_measured(start, |document, metrics| {
            ops::insert_at(document, metrics, start, text, &style)
        })?;
        self.cursor_visible = true;
        self.render();
        Ok(())
    }

    /// Abandons the composition, removing the provisional text.
    pub fn cancel_composition(&mut self) -> Result<(), Error> {
        let Some(state) = self.composition.finish() else {
            return Ok(());
        };
        self.remove_provisional(state.provisional.as_ref())?;
        self.cursor = state.start_cursor;
        self.cursor_visible = true;
        self.refresh();
        Ok(())
    }

    fn remove_provisional(&mut self, provisional: Option<&Insertion>) -> Result<(), Error> {
        if let Some(provisional) = provisional {
            ops::remove_insertion(&mut self.document, provisional)?;
            self.remeasure();
        }
        Ok(())
    }

    /// Keeps any provisional text as typed and leaves the composing state.
    ///
    /// Edits outside the input method would invalidate the recorded provisional span.
    fn settle_composition(&mut self) {
        if let Some(state) = self.composition.finish() {
            log::debug!("settling composition of {:?}", state.provisional_text);
        }
    }

    // --- MARK: Events ---

    /// Handles one host event.
    ///
    /// Returns `true` if the event was consumed, in which case the host should suppress its
    /// default handling.
    pub fn handle_event(
        &mut self,
        event: HostEvent,
        clipboard: &mut dyn Clipboard,
    ) -> Result<bool, Error> {
        match event {
            HostEvent::PointerDown { x, y } => {
                self.pointer_down = true;
                self.drag.reset();
                let scale = self.scale();
                let cursor = self.get_cursor_by_coordinate(x * scale, y * scale);
                self.set_cursor(cursor);
                Ok(true)
            }
            HostEvent::PointerMove { x, y, time } => {
                if !self.pointer_down {
                    return Ok(false);
                }
                if let Some((x, y)) = self.drag.call(time, (x, y)) {
                    self.drag_to(x, y);
                }
                Ok(true)
            }
            HostEvent::PointerUp => {
                if let Some((x, y)) = self.drag.flush() {
                    self.drag_to(x, y);
                }
                self.pointer_down = false;
                Ok(true)
            }
            HostEvent::Key(key) => self.handle_key(key, clipboard),
            HostEvent::Input(text) => {
                if self.is_composing() {
                    self.finish_composition(&text)?;
                } else {
                    self.insert_text(&text)?;
                }
                Ok(true)
            }
            HostEvent::CompositionStart => {
                self.start_composition()?;
                Ok(true)
            }
            HostEvent::CompositionUpdate(text) => {
                self.update_composition(&text)?;
                Ok(true)
            }
            HostEvent::CompositionEnd(text) => {
                self.finish_composition(&text)?;
                Ok(true)
            }
            HostEvent::CompositionCancel => {
                self.cancel_composition()?;
                Ok(true)
            }
            HostEvent::Copy => self.copy(clipboard),
            HostEvent::Cut => self.cut(clipboard),
            HostEvent::Paste => {
                if self.is_composing() {
                    return Ok(false);
                }
                self.paste(clipboard)?;
                Ok(true)
            }
            HostEvent::DevicePixelRatioChanged(ratio) => {
                self.device_pixel_ratio = ratio;
                if self.backend.use_device_pixel_ratio() {
                    self.selection.clear();
                    self.cursor = CursorInfo::BEFORE_FIRST;
                    self.cursor_visible = false;
                    self.refresh();
                }
                Ok(true)
            }
        }
    }

    /// Delivers a drag update held back by the throttle once its interval elapsed.
    pub fn tick(&mut self, now: Instant) {
        if !self.pointer_down {
            return;
        }
        if let Some((x, y)) = self.drag.poll(now) {
            self.drag_to(x, y);
        }
    }

    fn drag_to(&mut self, x: f32, y: f32) {
        let scale = self.scale();
        if self.cursor_visible {
            self.selection.start = self.cursor;
        }
        self.selection.end = self.get_cursor_by_coordinate(x * scale, y * scale);
        if !self.selection.is_empty() {
            self.cursor_visible = false;
        }
        self.render();
    }

    fn handle_key(
        &mut self,
        event: KeyEvent,
        clipboard: &mut dyn Clipboard,
    ) -> Result<bool, Error> {
        if self.is_composing() {
            return Ok(false);
        }
        let KeyEvent { key, modifiers } = event;
        match key {
            Key::Enter => self.insert_text("\n")?,
            Key::Backspace => self.backspace()?,
            Key::Tab => {}
            Key::ArrowUp => self.move_vertically(true, modifiers.shift),
            Key::ArrowDown => self.move_vertically(false, modifiers.shift),
            Key::ArrowLeft => self.move_left(modifiers.shift),
            Key::ArrowRight => self.move_right(modifiers.shift),
            Key::Character(ch) if modifiers.command => match ch.to_ascii_lowercase() {
                'a' => self.select_all(),
                'c' => {
                    self.copy(clipboard)?;
                }
                'x' => {
                    self.cut(clipboard)?;
                }
                'v' => self.paste(clipboard)?,
                _ => return Ok(false),
            },
            Key::Character(_) => return Ok(false),
        }
        Ok(true)
    }

    // --- MARK: Cursor movement ---

    fn move_vertically(&mut self, up: bool, extend: bool) {
        if self.metrics.is_empty() {
            return;
        }
        let characters = &self.metrics.all_character;
        let range = self.selection.normalized();
        let probe = match (&range, up) {
            (Some(range), true) => characters.get(*range.start()).and_then(|first| {
                let row = self.metrics.rows.get(first.which_row)?;
                Some((first.x, row.top - 2.0))
            }),
            (Some(range), false) => characters.get(*range.end()).and_then(|last| {
                let row = self.metrics.rows.get(last.which_row)?;
                Some((last.x + last.width, row.bottom + 5.0))
            }),
            (None, true) => self
                .caret_geometry()
                .map(|caret| (caret.x, caret.row_top - 2.0)),
            (None, false) => self
                .caret_geometry()
                .map(|caret| (caret.x, caret.y + caret.height + 2.0)),
        };
        let Some((x, y)) = probe else {
            return;
        };

        let target = if up {
            let mut target = self.get_cursor_by_coordinate_with(x, y, NewlineBias::Forward);
            let lands_on_newline = usize::try_from(target.after_character_index)
                .ok()
                .and_then(|index| characters.get(index))
                .is_some_and(|character| character.is_newline());
            if target.after_character_index > 0 && lands_on_newline {
                target.after_character_index -= 1;
            }
            target
        } else {
            self.get_cursor_by_coordinate(x, y)
        };

        if extend {
            let anchor = match (range, up) {
                (Some(range), true) => CursorInfo::after(to_signed(*range.end())),
                (Some(range), false) => CursorInfo::after(to_signed(*range.start()) - 1),
                (None, _) => self.cursor,
            };
            self.set_selection(anchor, target);
        } else {
            self.set_cursor(target);
        }
    }

    fn move_right(&mut self, extend: bool) {
        let len = to_signed(self.metrics.all_character.len());
        if len == 0 {
            return;
        }
        let range = self.selection.normalized();
        if extend {
            if let Some(range) = range {
                let (start, end) = (to_signed(*range.start()), to_signed(*range.end()));
                if end < len - 1 {
                    let mut focus = end + 1;
                    if self.is_newline_at(focus) && focus < len - 1 {
                        focus += 1;
                    }
                    self.set_selection(CursorInfo::after(start - 1), CursorInfo::after(focus));
                }
            } else if self.cursor.after_character_index < len - 1 {
                let anchor = self.cursor;
                self.set_selection(anchor, CursorInfo::after(anchor.after_character_index + 1));
            }
            return;
        }
        if let Some(range) = range {
            self.cursor = CursorInfo::after(to_signed(*range.end()) - 1);
            self.selection.clear();
        }
        if self.cursor.after_character_index + 1 < len {
            self.set_cursor(CursorInfo::after(self.cursor.after_character_index + 1));
        } else {
            self.set_cursor(self.cursor);
        }
    }

    fn move_left(&mut self, extend: bool) {
        if self.metrics.is_empty() {
            return;
        }
        let range = self.selection.normalized();
        if extend {
            if let Some(range) = range {
                let (start, end) = (to_signed(*range.start()), to_signed(*range.end()));
                if start > 0 {
                    let mut anchor = start - 2;
                    if anchor >= 0 && self.is_newline_at(anchor + 1) {
                        anchor -= 1;
                    }
                    self.set_selection(CursorInfo::after(anchor), CursorInfo::after(end));
                }
            } else if self.cursor.after_character_index >= 0 {
                let focus = self.cursor;
                self.set_selection(CursorInfo::after(focus.after_character_index - 1), focus);
            }
            return;
        }
        if let Some(range) = range {
            self.cursor = CursorInfo::after(to_signed(*range.start()));
            self.selection.clear();
        }
        if self.cursor.after_character_index >= 0 {
            self.set_cursor(CursorInfo::after(self.cursor.after_character_index - 1));
        } else {
            self.set_cursor(self.cursor);
        }
    }

    fn is_newline_at(&self, index: isize) -> bool {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.metrics.all_character.get(index))
            .is_some_and(|character| character.is_newline())
    }
}
