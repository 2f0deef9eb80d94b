// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod test_composition;
mod test_layout;
#[cfg(feature = "pixmap")]
mod test_render;
mod utils;
