// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan configuration and pipeline settings.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// Largest item count a single sheet can carry.
pub const MAX_ITEM_COUNT: u32 = 500;
/// Largest number of options per item.
pub const MAX_LIKERT_TYPE: u32 = 20;

/// Which end of the printed scale scores highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDirection {
    /// Leftmost bubble scores 1.
    #[default]
    LowToHigh,
    /// Leftmost bubble scores `likert_type`.
    HighToLow,
}

/// Per-run survey description, supplied by the caller for every scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfiguration {
    /// Number of items (rows) printed on the sheet.
    pub item_count: u32,
    /// Number of options per item (3, 5 and 7 are typical).
    pub likert_type: u32,
    /// Mapping from bubble column to score.
    pub score_direction: ScoreDirection,
    /// 1-indexed item numbers that are reverse-keyed.
    pub reverse_items: BTreeSet<u32>,
}

impl Default for ScanConfiguration {
    fn default() -> Self {
        Self {
            item_count: 21,
            likert_type: 5,
            score_direction: ScoreDirection::LowToHigh,
            reverse_items: BTreeSet::new(),
        }
    }
}

impl ScanConfiguration {
    /// Build and validate a configuration.
    pub fn new(
        item_count: u32,
        likert_type: u32,
        score_direction: ScoreDirection,
        reverse_items: impl IntoIterator<Item = u32>,
    ) -> Result<Self> {
        let config = Self {
            item_count,
            likert_type,
            score_direction,
            reverse_items: reverse_items.into_iter().collect(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the structural invariants: counts inside
    /// `1..=MAX_ITEM_COUNT` and `1..=MAX_LIKERT_TYPE`, and every reverse item
    /// inside `1..=item_count`.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_ITEM_COUNT).contains(&self.item_count) {
            return Err(ScanError::InvalidConfiguration(format!(
                "item_count {} is outside 1..={MAX_ITEM_COUNT}",
                self.item_count
            )));
        }
        if !(1..=MAX_LIKERT_TYPE).contains(&self.likert_type) {
            return Err(ScanError::InvalidConfiguration(format!(
                "likert_type {} is outside 1..={MAX_LIKERT_TYPE}",
                self.likert_type
            )));
        }
        if let Some(bad) = self
            .reverse_items
            .iter()
            .find(|&&item| item == 0 || item > self.item_count)
        {
            return Err(ScanError::InvalidConfiguration(format!(
                "reverse item {bad} is outside 1..={}",
                self.item_count
            )));
        }
        Ok(())
    }

    /// Whether the 1-indexed `item` is reverse-keyed.
    pub fn is_reversed(&self, item: u32) -> bool {
        self.reverse_items.contains(&item)
    }
}

/// Parse the free-text reverse item list used by the settings screen.
///
/// Tokens are separated by commas, semicolons or whitespace. Each token
/// contributes its leading integer, so `"3x"` and `"4.5"` read as 3 and 4.
/// Tokens without leading digits, negative numbers and zero are skipped, and
/// duplicates collapse.
pub fn parse_reverse_items(input: &str) -> BTreeSet<u32> {
    input
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter_map(leading_integer)
        .filter(|&n| n > 0)
        .collect()
}

/// The unsigned integer at the start of `token`, after an optional `+`.
fn leading_integer(token: &str) -> Option<u32> {
    let unsigned = token.strip_prefix('+').unwrap_or(token);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    unsigned[..end].parse().ok()
}

/// What to do when no sheet boundary is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionPolicy {
    /// Analyse the unrectified image.
    #[default]
    Lenient,
    /// Fail the run with `ScanError::BoundaryNotFound`.
    Strict,
}

/// Position of the answer grid on the page, as fractions of the page size.
///
/// These fractions must track the printed form layout: header, instructions
/// and demographic fields occupy the band above `rows_top`, and the bubbles
/// sit between `columns_left` and `columns_right`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    pub rows_top: f32,
    pub rows_bottom: f32,
    pub columns_left: f32,
    pub columns_right: f32,
    /// Share of each column's width sampled for density (centered).
    pub cell_width_fill: f32,
    /// Share of each row's height sampled for density (centered).
    pub cell_height_fill: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            rows_top: 0.28,
            rows_bottom: 0.97,
            columns_left: 0.70,
            columns_right: 0.95,
            cell_width_fill: 0.8,
            cell_height_fill: 0.6,
        }
    }
}

/// Thresholds for accepting the densest bubble in a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkThresholds {
    /// Minimum ink fraction of the densest cell (exclusive).
    pub min_density: f32,
    /// Minimum `(max - second) / max` margin (exclusive).
    pub min_confidence: f32,
}

impl Default for MarkThresholds {
    fn default() -> Self {
        Self {
            min_density: 0.08,
            min_confidence: 0.2,
        }
    }
}

/// Pipeline tuning shared by every run of an `OmrPipeline`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub layout: GridLayout,
    pub thresholds: MarkThresholds,
    pub detection_policy: DetectionPolicy,
}
