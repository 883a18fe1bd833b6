// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Answer sheet boundary detection: blur, Canny edges, dilation, external
// contours, and selection of the largest four-sided outline.

use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::dilate;
use likertscan_core::{CornerSet, Point2D};
use tracing::{debug, instrument};

use super::polygon;

/// Gaussian sigma equivalent to a 5x5 kernel.
pub const BLUR_SIGMA: f32 = 1.1;
pub const CANNY_LOW: f32 = 50.0;
pub const CANNY_HIGH: f32 = 150.0;
/// Polygon approximation tolerance as a share of the contour perimeter.
pub const APPROX_EPSILON_RATIO: f64 = 0.02;
/// The sheet must cover more than this share of the image.
pub const MIN_AREA_RATIO: f64 = 0.10;

/// A four-vertex candidate outline.
#[derive(Debug, Clone)]
struct Quadrilateral {
    vertices: [Point2D; 4],
    area: f64,
}

/// Find the answer sheet's four corners, if a large enough quadrilateral
/// outline is present.
///
/// ## Pipeline
///
/// 1. Gaussian blur (5x5 equivalent) for noise reduction
/// 2. Canny edge detection (50 / 150)
/// 3. Dilation with a 3x3 square to close gaps in the edge map
/// 4. External contour extraction
/// 5. Douglas–Peucker approximation at 2% of each contour's perimeter,
///    keeping only four-vertex outlines
/// 6. Largest candidate wins if it covers more than 10% of the image
///
/// Returns `None` when no candidate passes; that is a normal outcome.
#[instrument(skip(gray), fields(width = gray.width(), height = gray.height()))]
pub fn detect_sheet_corners(gray: &GrayImage) -> Option<CornerSet> {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 {
        return None;
    }

    let blurred = gaussian_blur_f32(gray, BLUR_SIGMA);
    let edges = canny(&blurred, CANNY_LOW, CANNY_HIGH);
    let edges = dilate(&edges, Norm::LInf, 1);
    debug!("Edge map computed");

    let contours = find_contours::<u32>(&edges);
    let external = contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none());

    let mut best: Option<Quadrilateral> = None;
    let mut examined = 0usize;
    for contour in external {
        examined += 1;
        let points = polygon::to_f64(&contour.points);
        let area = polygon::area(&points);
        if best.as_ref().is_some_and(|b| area <= b.area) {
            continue;
        }
        let epsilon = APPROX_EPSILON_RATIO * polygon::perimeter(&points);
        if epsilon <= 0.0 {
            continue;
        }
        let approx = polygon::approximate_closed(&points, epsilon);
        if let [a, b, c, d] = approx.as_slice() {
            best = Some(Quadrilateral {
                vertices: [a, b, c, d].map(|&(x, y)| Point2D::new(x as f32, y as f32)),
                area,
            });
        }
    }
    debug!(contours = examined, "External contours examined");

    let Some(best) = best else {
        debug!("No four-sided outline found");
        return None;
    };

    let min_area = width as f64 * height as f64 * MIN_AREA_RATIO;
    if best.area <= min_area {
        debug!(
            area = best.area,
            min_area, "Largest four-sided outline too small"
        );
        return None;
    }

    let corners = CornerSet::from_unordered(best.vertices);
    debug!(
        top_left = ?corners.top_left(),
        top_right = ?corners.top_right(),
        bottom_right = ?corners.bottom_right(),
        bottom_left = ?corners.bottom_left(),
        "Sheet corners detected"
    );
    Some(corners)
}
