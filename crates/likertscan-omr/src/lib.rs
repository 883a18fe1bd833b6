// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// likertscan-omr — optical mark recognition for Likert-scale answer sheets.
//
// Straightens a photographed sheet, extracts pen ink, reads one answer per
// item from a fixed bubble grid, and applies reverse keying. Also provides a
// parallel batch runner and a random-result simulator for demos.

pub mod batch;
pub mod geometry;
pub mod image;
pub mod marks;
pub mod pipeline;
pub mod scoring;
pub mod simulate;
pub mod synthetic;

// Re-export the primary entry points so callers can use `likertscan_omr::OmrPipeline` etc.
pub use batch::scan_batch;
pub use geometry::GeometryEngine;
pub use image::GrayscaleImage;
pub use marks::MarkAnalyzer;
pub use pipeline::OmrPipeline;
pub use simulate::simulate_scan;
