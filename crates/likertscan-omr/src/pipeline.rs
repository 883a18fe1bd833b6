// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan pipeline: rectification, ink extraction, mark analysis and scoring
// for one image against one survey configuration.

use likertscan_core::error::{Result, ScanError};
use likertscan_core::{PipelineStage, ScanConfiguration, ScanResult, ScanSettings};
use tracing::{debug, info, instrument, warn};

use crate::geometry::GeometryEngine;
use crate::image::GrayscaleImage;
use crate::marks::{MarkAnalyzer, extract_ink};
use crate::scoring::score_items;

/// Runs the full answer-sheet pipeline.
///
/// Holds only immutable settings, so one pipeline can serve any number of
/// concurrent runs. Every intermediate buffer is local to `run` and dropped
/// when it returns, whichever stage it returns from.
///
/// ```ignore
/// let pipeline = OmrPipeline::new(ScanSettings::default());
/// let result = pipeline.run(&image, &config)?;
/// println!("total = {}", result.total);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OmrPipeline {
    settings: ScanSettings,
    geometry: GeometryEngine,
    analyzer: MarkAnalyzer,
}

impl OmrPipeline {
    pub fn new(settings: ScanSettings) -> Self {
        Self {
            geometry: GeometryEngine::new(settings.detection_policy),
            analyzer: MarkAnalyzer::new(settings.layout, settings.thresholds),
            settings,
        }
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Scan one image.
    ///
    /// Fails only on a malformed image, an invalid configuration, or (under
    /// the strict detection policy) a sheet that could not be found or
    /// straightened. Unanswered or ambiguous items are reported in the result.
    #[instrument(skip_all, fields(width = image.width(), height = image.height(), items = config.item_count))]
    pub fn run(&self, image: &GrayscaleImage, config: &ScanConfiguration) -> Result<ScanResult> {
        let mut tracker = StageTracker::default();
        self.run_stages(image, config, &mut tracker)
            .inspect(|_| tracker.advance(PipelineStage::Done))
            .inspect_err(|err| tracker.fail(err))
    }

    /// Build a grayscale buffer from raw RGBA samples and scan it.
    pub fn run_rgba(
        &self,
        width: u32,
        height: u32,
        samples: &[u8],
        config: &ScanConfiguration,
    ) -> Result<ScanResult> {
        let image = GrayscaleImage::from_rgba(width, height, samples)?;
        self.run(&image, config)
    }

    fn run_stages(
        &self,
        image: &GrayscaleImage,
        config: &ScanConfiguration,
        tracker: &mut StageTracker,
    ) -> Result<ScanResult> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ScanError::MalformedImage(format!(
                "image has zero dimension ({width}x{height})"
            )));
        }
        config.validate()?;

        tracker.advance(PipelineStage::Rectifying);
        let rectification = self.geometry.process(image.as_gray())?;
        let rectified = rectification.is_rectified();

        tracker.advance(PipelineStage::Binarizing);
        let ink = extract_ink(&rectification.image);
        drop(rectification);

        tracker.advance(PipelineStage::Analyzing);
        let mut items = self.analyzer.analyze(&ink, config);
        drop(ink);

        tracker.advance(PipelineStage::Scoring);
        score_items(&mut items, &config.reverse_items, config.likert_type);

        let result = ScanResult::from_items(items, &config.reverse_items, rectified);
        info!(
            total = result.total,
            valid = result.valid_count,
            errors = result.error_count,
            rectified,
            "Scan complete"
        );
        Ok(result)
    }
}

/// Tracks the current stage of one run for logging.
#[derive(Debug)]
struct StageTracker {
    stage: PipelineStage,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self {
            stage: PipelineStage::Idle,
        }
    }
}

impl StageTracker {
    fn advance(&mut self, next: PipelineStage) {
        debug!(from = %self.stage, to = %next, "Pipeline stage");
        self.stage = next;
    }

    fn fail(&mut self, err: &ScanError) {
        warn!(stage = %self.stage, error = %err, "Scan failed");
        self.stage = PipelineStage::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{place_in_perspective, place_on_desk, render_sheet};
    use image::{GrayImage, Luma};
    use likertscan_core::{DetectionPolicy, GridLayout, ScoreDirection};

    const SHEET_W: u32 = 424;
    const SHEET_H: u32 = 600;

    fn config(items: u32, likert: u32, reverse: &[u32]) -> ScanConfiguration {
        ScanConfiguration::new(items, likert, ScoreDirection::LowToHigh, reverse.iter().copied())
            .unwrap()
    }

    fn sheet(config: &ScanConfiguration, marks: &[(u32, u32)]) -> GrayscaleImage {
        GrayscaleImage::from_gray(render_sheet(
            SHEET_W,
            SHEET_H,
            config,
            GridLayout::default(),
            marks,
        ))
    }

    #[test]
    fn single_mark_is_read() {
        let config = config(5, 5, &[]);
        let image = sheet(&config, &[(0, 2)]);
        let result = OmrPipeline::default().run(&image, &config).unwrap();

        assert_eq!(result.scores, vec![3, 0, 0, 0, 0]);
        assert_eq!(result.raw_scores, vec![3, 0, 0, 0, 0]);
        assert_eq!(result.total, 3);
        assert_eq!(result.valid_count, 1);
        assert_eq!(result.error_items, vec![2, 3, 4, 5]);
        assert!(!result.rectified);
    }

    #[test]
    fn midpoint_is_its_own_reverse() {
        let config = config(5, 5, &[1]);
        let image = sheet(&config, &[(0, 2)]);
        let result = OmrPipeline::default().run(&image, &config).unwrap();
        assert_eq!(result.raw_scores[0], 3);
        assert_eq!(result.scores[0], 3);
        assert_eq!(result.reverse_items, vec![1]);
    }

    #[test]
    fn first_column_reversed_scores_five() {
        let config = config(5, 5, &[1]);
        let image = sheet(&config, &[(0, 0)]);
        let result = OmrPipeline::default().run(&image, &config).unwrap();
        assert_eq!(result.raw_scores[0], 1);
        assert_eq!(result.scores[0], 5);
    }

    #[test]
    fn double_mark_is_an_error_item() {
        let config = config(5, 5, &[]);
        let image = sheet(&config, &[(0, 1), (1, 0), (1, 3), (2, 4)]);
        let result = OmrPipeline::default().run(&image, &config).unwrap();
        assert_eq!(result.scores, vec![2, 0, 5, 0, 0]);
        assert!(result.error_items.contains(&2));
        assert!(result.items[1].confidence <= 0.2);
    }

    #[test]
    fn high_to_low_direction() {
        let config = ScanConfiguration::new(7, 7, ScoreDirection::HighToLow, []).unwrap();
        let image = sheet(&config, &[(0, 0), (1, 6), (2, 2)]);
        let result = OmrPipeline::default().run(&image, &config).unwrap();
        assert_eq!(result.raw_scores, vec![7, 1, 5, 0, 0, 0, 0]);
    }

    #[test]
    fn scores_length_matches_item_count() {
        for items in [1u32, 7, 21] {
            let config = config(items, 5, &[]);
            let image = sheet(&config, &[]);
            let result = OmrPipeline::default().run(&image, &config).unwrap();
            assert_eq!(result.scores.len(), items as usize);
            assert_eq!(result.raw_scores.len(), items as usize);
            assert_eq!(result.error_count, items as usize);
            assert_eq!(result.total, 0);
        }
    }

    #[test]
    fn aligned_sheet_passes_geometry_unchanged() {
        let config = config(5, 5, &[]);
        let image = sheet(&config, &[(3, 1)]);
        let rectification = GeometryEngine::default().process(image.as_gray()).unwrap();
        let out = rectification.image.as_ref();
        assert_eq!(out.dimensions(), image.dimensions());

        let diff: u64 = out
            .pixels()
            .zip(image.as_gray().pixels())
            .map(|(a, b)| (a.0[0] as i64 - b.0[0] as i64).unsigned_abs())
            .sum();
        let mean_diff = diff as f64 / (SHEET_W * SHEET_H) as f64;
        assert!(mean_diff < 2.0, "mean abs diff {mean_diff}");
    }

    #[test]
    fn photographed_sheet_is_rectified_and_read() {
        let config = config(5, 5, &[2]);
        let page = render_sheet(566, 800, &config, GridLayout::default(), &[(0, 4), (1, 1), (3, 2)]);
        let photo = GrayscaleImage::from_gray(place_on_desk(&page, 700, 900, 60, 50));

        let result = OmrPipeline::default().run(&photo, &config).unwrap();
        assert!(result.rectified);
        assert_eq!(result.raw_scores, vec![5, 2, 0, 3, 0]);
        assert_eq!(result.scores, vec![5, 4, 0, 3, 0]);
        assert_eq!(result.error_items, vec![3, 5]);
    }

    #[test]
    fn keystoned_sheet_is_rectified_and_read() {
        let config = config(5, 5, &[2]);
        let page = render_sheet(566, 800, &config, GridLayout::default(), &[(0, 4), (1, 1), (3, 2)]);
        let quad = [(150.0, 80.0), (650.0, 80.0), (760.0, 960.0), (40.0, 960.0)];
        let photo = place_in_perspective(&page, 800, 1040, quad).unwrap();
        let photo = GrayscaleImage::from_gray(photo);

        let result = OmrPipeline::default().run(&photo, &config).unwrap();
        assert!(result.rectified);
        assert_eq!(result.raw_scores, vec![5, 2, 0, 3, 0]);
        assert_eq!(result.scores, vec![5, 4, 0, 3, 0]);
    }

    #[test]
    fn empty_image_is_fatal() {
        let config = config(5, 5, &[]);
        let image = GrayscaleImage::from_gray(GrayImage::new(0, 0));
        let err = OmrPipeline::default().run(&image, &config).unwrap_err();
        assert!(matches!(err, ScanError::MalformedImage(_)));
    }

    #[test]
    fn rgba_length_mismatch_is_fatal() {
        let config = config(5, 5, &[]);
        let err = OmrPipeline::default()
            .run_rgba(10, 10, &[0; 12], &config)
            .unwrap_err();
        assert!(matches!(err, ScanError::MalformedImage(_)));
    }

    #[test]
    fn invalid_configuration_is_fatal() {
        let image = GrayscaleImage::from_gray(GrayImage::from_pixel(50, 50, Luma([250u8])));
        let config = ScanConfiguration {
            reverse_items: [9].into_iter().collect(),
            item_count: 3,
            ..ScanConfiguration::default()
        };
        let err = OmrPipeline::default().run(&image, &config).unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfiguration(_)));
    }

    #[test]
    fn strict_policy_rejects_unframed_photo() {
        let config = config(5, 5, &[]);
        let image = sheet(&config, &[(0, 0)]);
        let settings = ScanSettings {
            detection_policy: DetectionPolicy::Strict,
            ..ScanSettings::default()
        };
        let err = OmrPipeline::new(settings).run(&image, &config).unwrap_err();
        assert!(matches!(err, ScanError::BoundaryNotFound));
    }
}
