// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cursor addressing, edit operations and the host-facing editor.

mod compose;
mod cursor;
mod editor;
mod selection;
mod throttle;

pub mod ops;

pub use self::compose::*;
pub use self::cursor::*;
pub use self::editor::*;
pub use self::ops::{Insertion, RichFragment};
pub use self::selection::*;
pub use self::throttle::Throttle;
