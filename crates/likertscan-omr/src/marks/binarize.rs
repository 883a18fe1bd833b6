// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ink extraction: inverted local-mean adaptive threshold followed by
// morphological closing and opening, plus the summed-area table used for
// both local means and cell densities.

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};
use tracing::{debug, instrument};

/// Neighbourhood radius of the local mean (15x15 block).
pub const BLOCK_RADIUS: u32 = 7;
/// A pixel is ink when it is at least this much darker than its local mean.
pub const THRESHOLD_OFFSET: i32 = 10;

/// Foreground value in binary images.
pub const INK: u8 = 255;

/// Summed-area table over a grayscale image.
///
/// `sum(x0, y0, x1, y1)` returns the sum of samples in the half-open
/// rectangle `[x0, x1) x [y0, y1)` in constant time.
#[derive(Debug, Clone)]
pub struct IntegralImage {
    width: u32,
    height: u32,
    /// `(width + 1) x (height + 1)` table with a zero top row and left column.
    table: Vec<u64>,
}

impl IntegralImage {
    pub fn new(gray: &GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let stride = (w + 1) as usize;
        let mut table = vec![0u64; stride * (h + 1) as usize];

        for y in 0..h {
            let mut row_sum: u64 = 0;
            for x in 0..w {
                row_sum += gray.get_pixel(x, y).0[0] as u64;
                let idx = (y + 1) as usize * stride + (x + 1) as usize;
                let above = y as usize * stride + (x + 1) as usize;
                table[idx] = row_sum + table[above];
            }
        }

        Self {
            width: w,
            height: h,
            table,
        }
    }

    /// Sum over `[x0, x1) x [y0, y1)`, clamped to the image.
    pub fn sum(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> u64 {
        let x1 = x1.min(self.width) as usize;
        let y1 = y1.min(self.height) as usize;
        let x0 = (x0 as usize).min(x1);
        let y0 = (y0 as usize).min(y1);
        let stride = (self.width + 1) as usize;

        // S = I[y1][x1] - I[y0][x1] - I[y1][x0] + I[y0][x0]
        self.table[y1 * stride + x1] + self.table[y0 * stride + x0]
            - self.table[y0 * stride + x1]
            - self.table[y1 * stride + x0]
    }

    /// Mean over the square of the given radius centred on `(cx, cy)`,
    /// clamped to the image.
    pub fn region_mean(&self, cx: u32, cy: u32, radius: u32) -> f64 {
        let x0 = cx.saturating_sub(radius);
        let y0 = cy.saturating_sub(radius);
        let x1 = cx.saturating_add(radius + 1).min(self.width);
        let y1 = cy.saturating_add(radius + 1).min(self.height);

        let area = (x1 - x0) as f64 * (y1 - y0) as f64;
        if area == 0.0 {
            return 128.0;
        }
        self.sum(x0, y0, x1, y1) as f64 / area
    }
}

/// Inverted adaptive threshold: a pixel becomes `INK` when its intensity is
/// at or below the mean of its `(2 * block_radius + 1)`-square neighbourhood
/// minus `offset`, and 0 otherwise.
#[instrument(skip(gray), fields(width = gray.width(), height = gray.height()))]
pub fn adaptive_threshold_inv(gray: &GrayImage, block_radius: u32, offset: i32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let integral = IntegralImage::new(gray);
    let mut output = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let local_mean = integral.region_mean(x, y, block_radius);
            let threshold = local_mean - offset as f64;
            let value = gray.get_pixel(x, y).0[0] as f64;
            if value <= threshold {
                output.put_pixel(x, y, Luma([INK]));
            }
        }
    }

    debug!("Adaptive threshold complete");
    output
}

/// Full ink extraction for mark analysis: adaptive threshold (15x15 block,
/// offset 10), then closing to fill small gaps in pen strokes and opening to
/// drop isolated specks, both with a 3x3 elliptical element.
#[instrument(skip(gray), fields(width = gray.width(), height = gray.height()))]
pub fn extract_ink(gray: &GrayImage) -> GrayImage {
    let binary = adaptive_threshold_inv(gray, BLOCK_RADIUS, THRESHOLD_OFFSET);
    // A 3x3 ellipse is the L1 ball of radius 1.
    let closed = close(&binary, Norm::L1, 1);
    open(&closed, Norm::L1, 1)
}
