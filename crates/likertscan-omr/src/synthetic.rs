// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic answer sheets for calibration, tests, and benchmarks.

use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use likertscan_core::{GridLayout, ScanConfiguration};

use crate::marks::AnswerGrid;

pub const PAPER: Luma<u8> = Luma([245]);
pub const PRINTED_OUTLINE: Luma<u8> = Luma([150]);
pub const PEN: Luma<u8> = Luma([20]);

/// Render an upright sheet of `width x height` with an outlined bubble in
/// every cell and a filled bubble at each 0-based `(item, option)` in `marks`.
pub fn render_sheet(
    width: u32,
    height: u32,
    config: &ScanConfiguration,
    layout: GridLayout,
    marks: &[(u32, u32)],
) -> GrayImage {
    let mut sheet = GrayImage::from_pixel(width, height, PAPER);
    let grid = AnswerGrid::new(layout, width, height, config.item_count, config.likert_type);
    let radius = (grid.col_width().min(grid.row_height()) * 0.35).round().max(1.0) as i32;

    for item in 0..config.item_count {
        for option in 0..config.likert_type {
            let (cx, cy) = grid.bubble_center(item, option);
            let center = (cx.round() as i32, cy.round() as i32);
            if marks.contains(&(item, option)) {
                draw_filled_circle_mut(&mut sheet, center, radius, PEN);
            } else {
                draw_hollow_circle_mut(&mut sheet, center, radius, PRINTED_OUTLINE);
            }
        }
    }
    sheet
}

const DESK: Luma<u8> = Luma([35]);

/// Place `sheet` on a darker background of `canvas_width x canvas_height`
/// with its top-left corner at `(x, y)`.
pub fn place_on_desk(sheet: &GrayImage, canvas_width: u32, canvas_height: u32, x: i64, y: i64) -> GrayImage {
    let mut canvas = GrayImage::from_pixel(canvas_width, canvas_height, DESK);
    image::imageops::overlay(&mut canvas, sheet, x, y);
    canvas
}

/// Photograph `sheet` at an angle: its corners land on `quad`
/// (top-left, top-right, bottom-right, bottom-left) of a darker canvas.
///
/// Returns `None` if `quad` does not define an invertible projection.
pub fn place_in_perspective(
    sheet: &GrayImage,
    canvas_width: u32,
    canvas_height: u32,
    quad: [(f32, f32); 4],
) -> Option<GrayImage> {
    let (w, h) = (sheet.width() as f32, sheet.height() as f32);
    let page = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
    let projection = Projection::from_control_points(page, quad)?;
    let mut canvas = GrayImage::new(canvas_width, canvas_height);
    warp_into(sheet, &projection, Interpolation::Bilinear, DESK, &mut canvas);
    Some(canvas)
}
