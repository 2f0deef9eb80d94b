// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Error type for document edits, clipboard access and backend setup.
///
/// Carries a non-exhaustive [`ErrorKind`] plus the index and length context of index
/// errors, or a message describing the failure of an external collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    /// The non-exhaustive category describing this error.
    kind: ErrorKind,

    /// Index-related context, or a free-form message.
    detail: Detail,
}

#[derive(Debug, Clone, PartialEq)]
enum Detail {
    Index { index: isize, len: usize },
    Message(String),
}

impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The offending logical character index, for [`ErrorKind::IndexOutOfRange`].
    pub fn index(&self) -> Option<isize> {
        match self.detail {
            Detail::Index { index, .. } => Some(index),
            Detail::Message(_) => None,
        }
    }

    /// The message attached by the failing collaborator, if any.
    pub fn message(&self) -> Option<&str> {
        match &self.detail {
            Detail::Index { .. } => None,
            Detail::Message(message) => Some(message),
        }
    }

    pub(crate) fn index_out_of_range(index: isize, len: usize) -> Self {
        Self {
            kind: ErrorKind::IndexOutOfRange,
            detail: Detail::Index { index, len },
        }
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvariantViolation,
            detail: Detail::Message(message.into()),
        }
    }

    pub(crate) fn clipboard(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Clipboard,
            detail: Detail::Message(message.into()),
        }
    }

    pub(crate) fn backend_init(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::BackendInit,
            detail: Detail::Message(message.into()),
        }
    }

    #[cfg_attr(
        not(feature = "pixmap"),
        expect(dead_code, reason = "only the pixmap backend loads font data")
    )]
    pub(crate) fn invalid_font(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidFont,
            detail: Detail::Message(message.into()),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match (&self.kind, &self.detail) {
            (ErrorKind::IndexOutOfRange, Detail::Index { index, len }) => write!(
                f,
                "character index {index} out of range for {len} characters"
            ),
            (ErrorKind::InvariantViolation, Detail::Message(message)) => {
                write!(f, "document invariant violated: {message}")
            }
            (ErrorKind::Clipboard, Detail::Message(message)) => {
                write!(f, "clipboard access failed: {message}")
            }
            (ErrorKind::BackendInit, Detail::Message(message)) => {
                write!(f, "render backend failed to initialize: {message}")
            }
            (ErrorKind::InvalidFont, Detail::Message(message)) => {
                write!(f, "invalid font data: {message}")
            }
            (kind, _) => write!(f, "{kind:?}"),
        }
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A logical character index fell outside `[-1, len - 1]`.
    IndexOutOfRange,

    /// The document's `contents` and `styles` no longer correspond, or a segment is empty.
    InvariantViolation,

    /// Reading from or writing to the clipboard failed. The document is left untouched.
    Clipboard,

    /// The render backend could not be initialized.
    BackendInit,

    /// Font data handed to a backend could not be parsed.
    InvalidFont,
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    #[test]
    fn index_errors_report_context() {
        let err = Error::index_out_of_range(7, 3);
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
        assert_eq!(err.index(), Some(7));
        assert_eq!(err.message(), None);
        assert_eq!(
            err.to_string(),
            "character index 7 out of range for 3 characters"
        );
    }

    #[test]
    fn message_errors_keep_message() {
        let err = Error::clipboard("no display");
        assert_eq!(err.kind(), ErrorKind::Clipboard);
        assert_eq!(err.message(), Some("no display"));
        assert_eq!(err.to_string(), "clipboard access failed: no display");
    }
}
