// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry engine: finds the answer sheet in a photograph and straightens it
// onto an upright A-series page, or falls back to the photo as taken.

pub mod detect;
pub mod polygon;
pub mod rectify;

use std::borrow::Cow;

use image::GrayImage;
use likertscan_core::error::{Result, ScanError};
use likertscan_core::{CornerSet, DetectionPolicy};
use tracing::{info, instrument, warn};

pub use detect::detect_sheet_corners;
pub use rectify::{ISO_PAGE_RATIO, rectify, target_dimensions};

/// Output of the geometry stage.
///
/// `image` borrows the input when no correction was applied.
#[derive(Debug, Clone)]
pub struct Rectification<'a> {
    pub image: Cow<'a, GrayImage>,
    /// Corners the warp used, or `None` if the input passed through.
    pub corners: Option<CornerSet>,
}

impl Rectification<'_> {
    pub fn is_rectified(&self) -> bool {
        self.corners.is_some()
    }
}

/// Detects and corrects sheet perspective according to a `DetectionPolicy`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryEngine {
    policy: DetectionPolicy,
}

impl GeometryEngine {
    pub fn new(policy: DetectionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DetectionPolicy {
        self.policy
    }

    /// Find the sheet and rectify it.
    ///
    /// Under `DetectionPolicy::Lenient` a missing boundary or a degenerate
    /// transform returns the input unchanged; mark analysis can often still
    /// read a moderately well-aligned photo. Under `Strict` those cases are
    /// errors.
    #[instrument(skip(self, gray), fields(width = gray.width(), height = gray.height(), policy = ?self.policy))]
    pub fn process<'a>(&self, gray: &'a GrayImage) -> Result<Rectification<'a>> {
        let Some(corners) = detect_sheet_corners(gray) else {
            return match self.policy {
                DetectionPolicy::Lenient => {
                    info!("No sheet boundary found; analysing unrectified image");
                    Ok(passthrough(gray))
                }
                DetectionPolicy::Strict => Err(ScanError::BoundaryNotFound),
            };
        };

        match rectify(gray, &corners) {
            Ok(image) => {
                info!(
                    out_w = image.width(),
                    out_h = image.height(),
                    "Sheet rectified"
                );
                Ok(Rectification {
                    image: Cow::Owned(image),
                    corners: Some(corners),
                })
            }
            Err(err) => match self.policy {
                DetectionPolicy::Lenient => {
                    warn!(error = %err, "Rectification failed; analysing unrectified image");
                    Ok(passthrough(gray))
                }
                DetectionPolicy::Strict => Err(err),
            },
        }
    }
}

fn passthrough(gray: &GrayImage) -> Rectification<'_> {
    Rectification {
        image: Cow::Borrowed(gray),
        corners: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn sheet_on_desk() -> GrayImage {
        let mut img = GrayImage::from_pixel(400, 500, Luma([30u8]));
        for y in 60..440 {
            for x in 50..350 {
                img.put_pixel(x, y, Luma([240u8]));
            }
        }
        img
    }

    #[test]
    fn lenient_blank_image_passes_through() {
        let img = GrayImage::from_pixel(200, 300, Luma([200u8]));
        let out = GeometryEngine::default().process(&img).unwrap();
        assert!(!out.is_rectified());
        assert!(matches!(out.image, Cow::Borrowed(_)));
        assert_eq!(out.image.as_ref(), &img);
    }

    #[test]
    fn strict_blank_image_fails() {
        let img = GrayImage::from_pixel(200, 300, Luma([200u8]));
        let err = GeometryEngine::new(DetectionPolicy::Strict)
            .process(&img)
            .unwrap_err();
        assert!(matches!(err, ScanError::BoundaryNotFound));
    }

    #[test]
    fn detected_sheet_gets_iso_ratio() {
        let img = sheet_on_desk();
        let out = GeometryEngine::default().process(&img).unwrap();
        assert!(out.is_rectified());
        assert_eq!(out.image.dimensions(), target_dimensions(500));
        // The warped page is the white sheet, so its centre is bright.
        let (w, h) = out.image.dimensions();
        assert!(out.image.get_pixel(w / 2, h / 2).0[0] > 200);
    }
}
