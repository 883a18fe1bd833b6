// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grayscale image buffer: construction from raw RGBA/luma samples or encoded
// bytes, read-only pixel access, and derived buffers (crop, downscale).

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, RgbaImage};
use likertscan_core::error::{Result, ScanError};
use tracing::{debug, instrument};

/// Long-edge cap applied by image loaders before scanning.
pub const MAX_IMAGE_EDGE: u32 = 2000;

/// An owned 8-bit grayscale image.
///
/// Every transformation returns a new buffer; the source is never mutated.
/// Constructors that take raw samples reject zero dimensions and buffers whose
/// length does not match `width * height`.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayscaleImage {
    image: GrayImage,
}

impl GrayscaleImage {
    // -- Construction ---------------------------------------------------------

    /// Build from one luma byte per pixel, row-major.
    pub fn from_luma(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(ScanError::MalformedImage(format!(
                "expected {expected} luma samples for {width}x{height}, got {}",
                samples.len()
            )));
        }
        let image = GrayImage::from_raw(width, height, samples).ok_or_else(|| {
            ScanError::MalformedImage(format!("cannot wrap {width}x{height} luma buffer"))
        })?;
        Ok(Self { image })
    }

    /// Build from four RGBA bytes per pixel, row-major. Alpha is ignored.
    pub fn from_rgba(width: u32, height: u32, samples: &[u8]) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * 4;
        if samples.len() != expected {
            return Err(ScanError::MalformedImage(format!(
                "expected {expected} RGBA bytes for {width}x{height}, got {}",
                samples.len()
            )));
        }
        let luma = samples
            .chunks_exact(4)
            .map(|px| rgb_to_luma(px[0], px[1], px[2]))
            .collect();
        Self::from_luma(width, height, luma)
    }

    /// Convert an already-decoded image.
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self> {
        check_dimensions(image.width(), image.height())?;
        match image {
            DynamicImage::ImageLuma8(gray) => Ok(Self {
                image: gray.clone(),
            }),
            other => {
                let rgba: RgbaImage = other.to_rgba8();
                Self::from_rgba(rgba.width(), rgba.height(), rgba.as_raw())
            }
        }
    }

    /// Decode encoded bytes (JPEG, PNG, TIFF, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(data)
            .map_err(|err| ScanError::ImageDecode(err.to_string()))?;
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            "Image decoded from bytes"
        );
        Self::from_dynamic(&decoded)
    }

    /// Wrap a stage output. No dimension check: the pipeline validates its
    /// input before any stage runs.
    pub fn from_gray(image: GrayImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Intensity at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the image. Callers derive
    /// coordinates from the known dimensions, so this is a programming error.
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        assert!(
            x < self.width() && y < self.height(),
            "pixel ({x}, {y}) outside {}x{} image",
            self.width(),
            self.height()
        );
        self.image.get_pixel(x, y).0[0]
    }

    /// Row-major samples.
    pub fn samples(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_gray(self) -> GrayImage {
        self.image
    }

    // -- Derived buffers ------------------------------------------------------

    /// Copy out a region of interest. The rectangle is clamped to the image.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let safe_x = x.min(self.width());
        let safe_y = y.min(self.height());
        let safe_w = width.min(self.width() - safe_x);
        let safe_h = height.min(self.height() - safe_y);
        let region = image::imageops::crop_imm(&self.image, safe_x, safe_y, safe_w, safe_h);
        Self {
            image: region.to_image(),
        }
    }

    /// Downscale so neither edge exceeds `max_edge`, preserving aspect ratio.
    /// Images already within bounds are returned as an identical copy.
    #[instrument(skip(self), fields(width = self.width(), height = self.height()))]
    pub fn fit_within(&self, max_edge: u32) -> Self {
        let (w, h) = self.dimensions();
        if w <= max_edge && h <= max_edge {
            return self.clone();
        }
        let ratio = (max_edge as f64 / w as f64).min(max_edge as f64 / h as f64);
        let new_w = ((w as f64 * ratio).floor() as u32).max(1);
        let new_h = ((h as f64 * ratio).floor() as u32).max(1);
        debug!(new_w, new_h, "Downscaling oversized image");
        Self {
            image: image::imageops::resize(&self.image, new_w, new_h, FilterType::Lanczos3),
        }
    }
}

impl From<GrayImage> for GrayscaleImage {
    fn from(image: GrayImage) -> Self {
        Self::from_gray(image)
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ScanError::MalformedImage(format!(
            "image has zero dimension ({width}x{height})"
        )));
    }
    Ok(())
}

/// ITU-R BT.601 luma in 14-bit fixed point.
fn rgb_to_luma(r: u8, g: u8, b: u8) -> u8 {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    let y = (r as u32 * R + g as u32 * G + b as u32 * B + (1 << 13)) >> 14;
    y.min(255) as u8
}
