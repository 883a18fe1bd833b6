// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification onto an ISO A-series page frame.

use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use likertscan_core::CornerSet;
use likertscan_core::error::{Result, ScanError};
use tracing::{debug, instrument};

/// Height-to-width ratio of ISO A-series paper (√2).
pub const ISO_PAGE_RATIO: f32 = 1.414_213_6;

/// Output size for a source image of the given height: the height is kept
/// and the width follows the A-series ratio.
pub fn target_dimensions(source_height: u32) -> (u32, u32) {
    let width = (source_height as f32 / ISO_PAGE_RATIO).floor() as u32;
    (width.max(1), source_height)
}

/// Warp the quadrilateral `corners` of `gray` onto an upright page.
///
/// The corners map to the output's corners in the same
/// top-left, top-right, bottom-right, bottom-left order. Samples from outside
/// the source are filled white. Fails when the corners do not define an
/// invertible projection (collinear or coincident points).
#[instrument(skip(gray, corners), fields(width = gray.width(), height = gray.height()))]
pub fn rectify(gray: &GrayImage, corners: &CornerSet) -> Result<GrayImage> {
    let (out_w, out_h) = target_dimensions(gray.height());

    let dest: [(f32, f32); 4] = [
        (0.0, 0.0),                   // top-left
        (out_w as f32, 0.0),          // top-right
        (out_w as f32, out_h as f32), // bottom-right
        (0.0, out_h as f32),          // bottom-left
    ];
    let src = corners.as_tuples();
    if src.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(ScanError::Transform("corner coordinates are not finite".into()));
    }

    if has_collinear_triple(&src) {
        return Err(ScanError::Transform("three or more corners are collinear".into()));
    }

    let projection = Projection::from_control_points(src, dest).ok_or_else(|| {
        ScanError::Transform("corners do not define an invertible projection".into())
    })?;

    let mut output = GrayImage::new(out_w, out_h);
    warp_into(gray, &projection, Interpolation::Bilinear, Luma([255u8]), &mut output);

    debug!(out_w, out_h, "Perspective correction applied");
    Ok(output)
}

/// Whether any three of the four points (nearly) lie on one line.
fn has_collinear_triple(points: &[(f32, f32); 4]) -> bool {
    const MIN_TWICE_AREA: f32 = 1e-3;
    (0..4).any(|skip| {
        let tri: Vec<(f32, f32)> = (0..4).filter(|&i| i != skip).map(|i| points[i]).collect();
        let cross = (tri[1].0 - tri[0].0) * (tri[2].1 - tri[0].1)
            - (tri[1].1 - tri[0].1) * (tri[2].0 - tri[0].0);
        cross.abs() < MIN_TWICE_AREA
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use likertscan_core::Point2D;

    fn corners(points: [(f32, f32); 4]) -> CornerSet {
        CornerSet::from_unordered(points.map(Point2D::from))
    }

    #[test]
    fn target_keeps_height_and_iso_ratio() {
        assert_eq!(target_dimensions(1000), (707, 1000));
        assert_eq!(target_dimensions(600), (424, 600));
    }

    #[test]
    fn output_has_iso_ratio_for_any_input_shape() {
        for (w, h) in [(800u32, 300u32), (300, 800), (500, 500)] {
            let gray = GrayImage::from_pixel(w, h, Luma([128u8]));
            let quad = corners([
                (w as f32 * 0.1, h as f32 * 0.1),
                (w as f32 * 0.9, h as f32 * 0.05),
                (w as f32 * 0.95, h as f32 * 0.9),
                (w as f32 * 0.05, h as f32 * 0.95),
            ]);
            let out = rectify(&gray, &quad).unwrap();
            assert_eq!(out.height(), h);
            let ratio = out.height() as f32 / out.width() as f32;
            assert!((ratio - ISO_PAGE_RATIO).abs() < 2.0 / out.width() as f32 + 1e-3);
        }
    }

    #[test]
    fn quadrants_land_in_the_right_place() {
        // Source: left half black, right half white, inside a skewed quad.
        let (w, h) = (400u32, 560u32);
        let mut gray = GrayImage::from_pixel(w, h, Luma([255u8]));
        for y in 0..h {
            for x in 0..w / 2 {
                gray.put_pixel(x, y, Luma([0u8]));
            }
        }
        let quad = corners([(20.0, 10.0), (380.0, 30.0), (370.0, 550.0), (30.0, 530.0)]);
        let out = rectify(&gray, &quad).unwrap();
        let (ow, oh) = out.dimensions();
        assert_eq!(out.get_pixel(ow / 8, oh / 2).0[0], 0);
        assert_eq!(out.get_pixel(ow * 7 / 8, oh / 2).0[0], 255);
    }

    #[test]
    fn collinear_corners_fail() {
        let gray = GrayImage::from_pixel(100, 100, Luma([0u8]));
        let line = corners([(0.0, 0.0), (10.0, 10.0), (20.0, 20.0), (30.0, 30.0)]);
        let err = rectify(&gray, &line).unwrap_err();
        assert!(matches!(err, ScanError::Transform(_)));
    }
}
