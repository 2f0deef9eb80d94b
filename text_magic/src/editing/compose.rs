// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::CursorInfo;
use super::ops::Insertion;

/// Provisional input method text that has not been committed yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompositionState {
    /// The provisional text currently shown in the document.
    pub provisional_text: String,
    /// Where the provisional text sits in the document, if any is shown.
    pub provisional: Option<Insertion>,
    /// The gap the composition started at.
    pub start_cursor: CursorInfo,
}

/// The input method composition state machine.
///
/// `Idle -> Composing` on start, `Composing -> Composing` on every update and
/// `Composing -> Idle` on end or cancel. The editor performs the document edits each
/// transition calls for; this type only tracks what is provisional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Composition {
    /// No composition in progress.
    #[default]
    Idle,
    /// A composition is in progress.
    Composing(CompositionState),
}

impl Composition {
    /// Returns `true` while a composition is in progress.
    pub fn is_composing(&self) -> bool {
        matches!(self, Self::Composing(_))
    }

    /// The in-progress composition, if any.
    pub fn state(&self) -> Option<&CompositionState> {
        match self {
            Self::Idle => None,
            Self::Composing(state) => Some(state),
        }
    }

    /// Enters the composing state at `start_cursor`, discarding any previous composition.
    pub fn start(&mut self, start_cursor: CursorInfo) {
        *self = Self::Composing(CompositionState {
            provisional_text: String::new(),
            provisional: None,
            start_cursor,
        });
    }

    /// Records that `text` is now the provisional text, placed at `provisional`.
    ///
    /// Does nothing when idle.
    pub fn record(&mut self, text: &str, provisional: Option<Insertion>) {
        if let Self::Composing(state) = self {
            state.provisional_text.clear();
            state.provisional_text.push_str(text);
            state.provisional = provisional;
        }
    }

    /// Leaves the composing state, returning what was provisional.
    pub fn finish(&mut self) -> Option<CompositionState> {
        match core::mem::take(self) {
            Self::Idle => None,
            Self::Composing(state) => Some(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Composition;
    use crate::editing::CursorInfo;
    use crate::editing::ops::Insertion;

    #[test]
    fn record_replaces_the_provisional_text() {
        let mut composition = Composition::default();
        assert!(!composition.is_composing());
        composition.start(CursorInfo::after(2));
        assert_eq!(composition.state().unwrap().provisional, None);

        let placed = Insertion {
            segment: 0,
            bytes: 3..9,
        };
        composition.record("\u{6D4B}\u{8BD5}", Some(placed.clone()));
        let state = composition.state().unwrap();
        assert_eq!(state.provisional.as_ref(), Some(&placed));
        assert_eq!(state.start_cursor, CursorInfo::after(2));

        composition.record("", None);
        assert_eq!(composition.state().unwrap().provisional, None);

        let finished = composition.finish().unwrap();
        assert_eq!(finished.provisional_text, "");
        assert!(!composition.is_composing());
        assert_eq!(composition.finish(), None);
    }

    #[test]
    fn record_is_ignored_when_idle() {
        let mut composition = Composition::default();
        composition.record(
            "x",
            Some(Insertion {
                segment: 0,
                bytes: 0..1,
            }),
        );
        assert_eq!(composition, Composition::Idle);
    }
}
