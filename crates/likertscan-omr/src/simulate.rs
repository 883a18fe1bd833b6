// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Random scan results for demos and UI work when no camera or image is at hand.

use likertscan_core::error::Result;
use likertscan_core::{ItemResult, ScanConfiguration, ScanResult};
use rand::Rng;
use tracing::{debug, instrument};

use crate::scoring::score_items;

/// Probability that a simulated item is left unanswered.
pub const UNANSWERED_RATE: f64 = 0.05;

/// Produce a plausible result for `config` without looking at an image.
///
/// Each item is unanswered with probability [`UNANSWERED_RATE`] and otherwise
/// takes a uniform raw score in `1..=likert_type`. Reverse keying goes
/// through the same path as a real scan.
#[instrument(skip_all, fields(items = config.item_count, likert = config.likert_type))]
pub fn simulate_scan<R: Rng>(config: &ScanConfiguration, rng: &mut R) -> Result<ScanResult> {
    config.validate()?;

    let mut items: Vec<ItemResult> = (0..config.item_count)
        .map(|_| {
            if rng.gen_bool(UNANSWERED_RATE) {
                ItemResult {
                    raw_score: 0,
                    final_score: 0,
                    confidence: 0.0,
                }
            } else {
                let raw_score = rng.gen_range(1..=config.likert_type);
                ItemResult {
                    raw_score,
                    final_score: raw_score,
                    confidence: 1.0,
                }
            }
        })
        .collect();

    score_items(&mut items, &config.reverse_items, config.likert_type);
    let result = ScanResult::from_items(items, &config.reverse_items, false);
    debug!(total = result.total, errors = result.error_count, "Simulated scan");
    Ok(result)
}
