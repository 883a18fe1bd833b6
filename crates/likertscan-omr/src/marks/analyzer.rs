// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bubble grid analysis: per-cell ink density and the per-item decision.

use image::GrayImage;
use likertscan_core::{GridLayout, ItemResult, MarkThresholds, ScanConfiguration, ScoreDirection};
use tracing::{debug, instrument, trace};

use super::binarize::{INK, IntegralImage};

/// Pixel rectangle `[x, x + width) x [y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Item rows by option columns laid over a page of known size.
#[derive(Debug, Clone, Copy)]
pub struct AnswerGrid {
    start_x: f32,
    start_y: f32,
    col_width: f32,
    row_height: f32,
    items: u32,
    options: u32,
    layout: GridLayout,
    page_width: u32,
    page_height: u32,
}

impl AnswerGrid {
    /// Split the layout bands of a `width x height` page into `items` rows
    /// and `options` columns.
    pub fn new(layout: GridLayout, width: u32, height: u32, items: u32, options: u32) -> Self {
        let start_y = floor_px(height as f32 * layout.rows_top);
        let end_y = floor_px(height as f32 * layout.rows_bottom);
        let start_x = floor_px(width as f32 * layout.columns_left);
        let end_x = floor_px(width as f32 * layout.columns_right);

        Self {
            start_x,
            start_y,
            col_width: (end_x - start_x) / options.max(1) as f32,
            row_height: (end_y - start_y) / items.max(1) as f32,
            items,
            options,
            layout,
            page_width: width,
            page_height: height,
        }
    }

    /// Centre of the bubble for 0-based `item` and `option`.
    pub fn bubble_center(&self, item: u32, option: u32) -> (f32, f32) {
        (
            self.start_x + (option as f32 + 0.5) * self.col_width,
            self.start_y + (item as f32 + 0.5) * self.row_height,
        )
    }

    pub fn col_width(&self) -> f32 {
        self.col_width
    }

    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    /// The sampled sub-rectangle of a cell: centred, covering
    /// `cell_width_fill` of the column and `cell_height_fill` of the row,
    /// clipped to the page.
    pub fn cell(&self, item: u32, option: u32) -> CellRect {
        debug_assert!(item < self.items && option < self.options);
        let margin_x = self.col_width * (1.0 - self.layout.cell_width_fill) / 2.0;
        let margin_y = self.row_height * (1.0 - self.layout.cell_height_fill) / 2.0;

        let x = (floor_px(self.start_x + option as f32 * self.col_width + margin_x).max(0.0) as u32)
            .min(self.page_width);
        let y = (floor_px(self.start_y + item as f32 * self.row_height + margin_y).max(0.0) as u32)
            .min(self.page_height);
        let w = (floor_px(self.col_width * self.layout.cell_width_fill).max(0.0) as u32)
            .min(self.page_width - x);
        let h = (floor_px(self.row_height * self.layout.cell_height_fill).max(0.0) as u32)
            .min(self.page_height - y);

        CellRect {
            x,
            y,
            width: w,
            height: h,
        }
    }
}

/// Floor to a pixel index, absorbing `f32` error from fractions such as
/// `0.7 * 1000`.
fn floor_px(value: f32) -> f32 {
    (value + 1e-3).floor()
}

/// Fraction of ink pixels in `cell`; 0 for an empty rectangle.
pub fn cell_density(ink: &IntegralImage, cell: CellRect) -> f32 {
    let area = cell.width as u64 * cell.height as u64;
    if area == 0 {
        return 0.0;
    }
    let sum = ink.sum(cell.x, cell.y, cell.x + cell.width, cell.y + cell.height);
    (sum as f64 / (area as f64 * INK as f64)) as f32
}

/// Decide one item from its per-option densities.
///
/// The densest option is accepted only if its density exceeds
/// `min_density` and it beats the runner-up by more than `min_confidence`
/// of its own density. Ties keep the leftmost option.
pub fn decide_item(
    densities: &[f32],
    likert_type: u32,
    direction: ScoreDirection,
    thresholds: &MarkThresholds,
) -> ItemResult {
    let mut max_density = 0.0f32;
    let mut second_density = 0.0f32;
    let mut selected: Option<usize> = None;

    for (col, &density) in densities.iter().enumerate() {
        if density > max_density {
            second_density = max_density;
            max_density = density;
            selected = Some(col);
        } else if density > second_density {
            second_density = density;
        }
    }

    let confidence = if max_density > 0.0 {
        (max_density - second_density) / max_density
    } else {
        0.0
    };

    let raw_score = match selected {
        Some(col) if max_density > thresholds.min_density && confidence > thresholds.min_confidence => {
            column_score(col as u32, likert_type, direction)
        }
        _ => 0,
    };

    ItemResult {
        raw_score,
        final_score: raw_score,
        confidence,
    }
}

/// Score of the 0-based bubble column `col`.
pub fn column_score(col: u32, likert_type: u32, direction: ScoreDirection) -> u32 {
    match direction {
        ScoreDirection::LowToHigh => col + 1,
        ScoreDirection::HighToLow => likert_type.saturating_sub(col),
    }
}

/// Reads item answers from a binary ink image.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkAnalyzer {
    layout: GridLayout,
    thresholds: MarkThresholds,
}

impl MarkAnalyzer {
    pub fn new(layout: GridLayout, thresholds: MarkThresholds) -> Self {
        Self { layout, thresholds }
    }

    pub fn grid(&self, width: u32, height: u32, config: &ScanConfiguration) -> AnswerGrid {
        AnswerGrid::new(self.layout, width, height, config.item_count, config.likert_type)
    }

    /// One `ItemResult` per item, with `final_score` equal to `raw_score`
    /// (reverse keying happens in the scoring stage).
    #[instrument(skip(self, ink, config), fields(width = ink.width(), height = ink.height(), items = config.item_count))]
    pub fn analyze(&self, ink: &GrayImage, config: &ScanConfiguration) -> Vec<ItemResult> {
        let grid = self.grid(ink.width(), ink.height(), config);
        let integral = IntegralImage::new(ink);
        debug!(
            row_height = grid.row_height(),
            col_width = grid.col_width(),
            "Answer grid laid out"
        );

        let mut densities = Vec::with_capacity(config.likert_type as usize);
        (0..config.item_count)
            .map(|item| {
                densities.clear();
                densities.extend(
                    (0..config.likert_type).map(|option| cell_density(&integral, grid.cell(item, option))),
                );
                let result = decide_item(
                    &densities,
                    config.likert_type,
                    config.score_direction,
                    &self.thresholds,
                );
                trace!(item = item + 1, ?densities, raw = result.raw_score, confidence = result.confidence, "Item analysed");
                result
            })
            .collect()
    }
}
