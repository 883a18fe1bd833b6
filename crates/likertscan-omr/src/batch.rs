// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Parallel scanning of many sheets against one configuration.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use likertscan_core::error::{Result, ScanError};
use likertscan_core::{ScanConfiguration, ScanResult};
use rayon::prelude::*;
use tracing::{info, instrument};

use crate::image::GrayscaleImage;
use crate::pipeline::OmrPipeline;

/// Scan `images` in parallel on the global rayon pool.
///
/// Results come back in input order. Once `cancel` is set, images that have
/// not started yet resolve to `ScanError::Cancelled`; runs already in
/// progress finish normally.
#[instrument(skip_all, fields(images = images.len()))]
pub fn scan_batch(
    pipeline: &OmrPipeline,
    images: &[GrayscaleImage],
    config: &ScanConfiguration,
    cancel: &AtomicBool,
) -> Vec<Result<ScanResult>> {
    let completed = AtomicUsize::new(0);
    let total = images.len();

    let results: Vec<Result<ScanResult>> = images
        .par_iter()
        .map(|image| {
            if cancel.load(Ordering::Relaxed) {
                return Err(ScanError::Cancelled);
            }
            let result = pipeline.run(image, config);
            let count = completed.fetch_add(1, Ordering::SeqCst) + 1;
            info!(count, total, ok = result.is_ok(), "Sheet processed");
            result
        })
        .collect();

    info!(
        completed = completed.load(Ordering::SeqCst),
        total, "Batch finished"
    );
    results
}
