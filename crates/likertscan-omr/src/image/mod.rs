// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: the grayscale buffer passed between pipeline stages.

pub mod buffer;

pub use buffer::{GrayscaleImage, MAX_IMAGE_EDGE};
