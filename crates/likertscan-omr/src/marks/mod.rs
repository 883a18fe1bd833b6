// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Mark analysis: ink extraction and the bubble grid reader.

pub mod analyzer;
pub mod binarize;

pub use analyzer::{AnswerGrid, CellRect, MarkAnalyzer, cell_density, column_score, decide_item};
pub use binarize::{IntegralImage, adaptive_threshold_inv, extract_ink};
