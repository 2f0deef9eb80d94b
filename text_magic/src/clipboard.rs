// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clipboard access for copy, cut and paste.

use crate::error::Error;

/// A plain-text clipboard.
pub trait Clipboard {
    /// Reads the clipboard text.
    fn read_text(&mut self) -> Result<String, Error>;

    /// Replaces the clipboard text.
    fn write_text(&mut self, text: &str) -> Result<(), Error>;
}

/// An in-process clipboard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    /// Creates a clipboard holding `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// The current contents, if anything was written.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn read_text(&mut self) -> Result<String, Error> {
        self.text
            .clone()
            .ok_or_else(|| Error::clipboard("clipboard is empty"))
    }

    fn write_text(&mut self, text: &str) -> Result<(), Error> {
        self.text = Some(text.to_owned());
        Ok(())
    }
}

/// The operating system clipboard.
#[cfg(feature = "system_clipboard")]
pub struct SystemClipboard {
    context: clipboard_rs::ClipboardContext,
}

#[cfg(feature = "system_clipboard")]
impl core::fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SystemClipboard").finish_non_exhaustive()
    }
}

#[cfg(feature = "system_clipboard")]
impl SystemClipboard {
    /// Connects to the system clipboard.
    pub fn new() -> Result<Self, Error> {
        let context = clipboard_rs::ClipboardContext::new()
            .map_err(|err| Error::clipboard(err.to_string()))?;
        Ok(Self { context })
    }
}

#[cfg(feature = "system_clipboard")]
impl Clipboard for SystemClipboard {
    fn read_text(&mut self) -> Result<String, Error> {
        use clipboard_rs::Clipboard as _;
        self.context
            .get_text()
            .map_err(|err| Error::clipboard(err.to_string()))
    }

    fn write_text(&mut self, text: &str) -> Result<(), Error> {
        use clipboard_rs::Clipboard as _;
        self.context
            .set_text(text.to_owned())
            .map_err(|err| Error::clipboard(err.to_string()))
    }
}
