// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// likertscan-cli — file loading and report assembly for the `likertscan`
// binary. Kept in a library so the helpers can be tested without a process.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use likertscan_core::human_errors::humanize_error;
use likertscan_core::{Result, ScanConfiguration, ScanResult, ScanSettings, parse_reverse_items};
use likertscan_omr::image::MAX_IMAGE_EDGE;
use likertscan_omr::{GrayscaleImage, OmrPipeline};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Read a `ScanConfiguration` from a JSON file, or use the defaults when no
/// path is given. Missing fields take their default values.
///
/// `reverse` overrides the file's reverse items using the free-text format
/// of [`parse_reverse_items`].
pub fn load_configuration(path: Option<&Path>, reverse: Option<&str>) -> Result<ScanConfiguration> {
    let mut config = match path {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => ScanConfiguration::default(),
    };
    if let Some(reverse) = reverse {
        config.reverse_items = parse_reverse_items(reverse);
    }
    config.validate()?;
    Ok(config)
}

/// Read tunable `ScanSettings` from a JSON file, or use the defaults.
pub fn load_settings(path: Option<&Path>) -> Result<ScanSettings> {
    match path {
        Some(path) => Ok(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => Ok(ScanSettings::default()),
    }
}

/// Decode an image file and cap its long edge at [`MAX_IMAGE_EDGE`].
pub fn load_image(path: &Path) -> Result<GrayscaleImage> {
    let bytes = fs::read(path)?;
    Ok(GrayscaleImage::from_bytes(&bytes)?.fit_within(MAX_IMAGE_EDGE))
}

/// Outcome for one input file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ScanResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl FileReport {
    fn from_outcome(file: PathBuf, outcome: Result<ScanResult>) -> Self {
        match outcome {
            Ok(result) => Self {
                file,
                result: Some(result),
                error: None,
                suggestion: None,
            },
            Err(err) => {
                warn!(file = %file.display(), error = %err, "Sheet not scanned");
                let human = humanize_error(&err);
                Self {
                    file,
                    result: None,
                    error: Some(human.message),
                    suggestion: Some(human.suggestion),
                }
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_some()
    }
}

/// Load and scan every file on the global rayon pool.
///
/// Each file is decoded and scanned inside its own task, so a decoded buffer
/// lives only as long as its scan. Reports come back in input order, with
/// load failures reported like scan failures.
#[instrument(skip_all, fields(files = files.len()))]
pub fn scan_files(
    pipeline: &OmrPipeline,
    files: &[PathBuf],
    config: &ScanConfiguration,
) -> Vec<FileReport> {
    let completed = AtomicUsize::new(0);
    files
        .par_iter()
        .map(|file| {
            let outcome = load_image(file).and_then(|image| pipeline.run(&image, config));
            let count = completed.fetch_add(1, Ordering::SeqCst) + 1;
            info!(count, total = files.len(), file = %file.display(), "File processed");
            FileReport::from_outcome(file.clone(), outcome)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use likertscan_core::{DetectionPolicy, ScoreDirection};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn json_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn configuration_defaults_without_file() {
        let config = load_configuration(None, None).unwrap();
        assert_eq!(config, ScanConfiguration::default());
    }

    #[test]
    fn configuration_partial_json_fills_defaults() {
        let file = json_file(r#"{"item_count": 10, "score_direction": "high_to_low"}"#);
        let config = load_configuration(Some(file.path()), None).unwrap();
        assert_eq!(config.item_count, 10);
        assert_eq!(config.likert_type, 5);
        assert_eq!(config.score_direction, ScoreDirection::HighToLow);
    }

    #[test]
    fn reverse_override_replaces_file_items() {
        let file = json_file(r#"{"item_count": 10, "reverse_items": [1, 2]}"#);
        let config = load_configuration(Some(file.path()), Some("4; 7 9")).unwrap();
        assert_eq!(config.reverse_items.into_iter().collect::<Vec<_>>(), vec![4, 7, 9]);
    }

    #[test]
    fn out_of_range_reverse_item_is_rejected() {
        let file = json_file(r#"{"item_count": 3, "reverse_items": [4]}"#);
        let err = load_configuration(Some(file.path()), None).unwrap_err();
        assert!(matches!(err, likertscan_core::ScanError::InvalidConfiguration(_)));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let file = json_file("{ not json");
        let err = load_settings(Some(file.path())).unwrap_err();
        assert!(matches!(err, likertscan_core::ScanError::Serialization(_)));
    }

    #[test]
    fn settings_policy_from_json() {
        let file = json_file(r#"{"detection_policy": "strict"}"#);
        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.detection_policy, DetectionPolicy::Strict);
        assert_eq!(settings.thresholds, ScanSettings::default().thresholds);
    }

    #[test]
    fn missing_image_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_image(&dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, likertscan_core::ScanError::Io(_)));
    }

    #[test]
    fn large_image_is_capped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.png");
        GrayImage::from_pixel(2400, 600, Luma([200u8])).save(&path).unwrap();
        let image = load_image(&path).unwrap();
        assert_eq!(image.dimensions(), (2000, 500));
    }

    #[test]
    fn scan_files_reports_every_file_in_order() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("sheet.png");
        GrayImage::from_pixel(300, 420, Luma([240u8])).save(&good).unwrap();
        let bad = dir.path().join("garbage.png");
        fs::write(&bad, b"not an image").unwrap();

        let files = vec![bad.clone(), good.clone()];
        let reports = scan_files(&OmrPipeline::default(), &files, &ScanConfiguration::default());

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].file, bad);
        assert!(!reports[0].is_ok());
        assert!(reports[0].suggestion.is_some());
        assert_eq!(reports[1].file, good);
        let result = reports[1].result.as_ref().unwrap();
        assert_eq!(result.scores.len(), 21);
        assert_eq!(result.total, 0);
    }

    #[test]
    fn scan_files_keeps_order_across_parallel_tasks() {
        let dir = TempDir::new().unwrap();
        let files: Vec<PathBuf> = (0..8)
            .map(|i| {
                let path = dir.path().join(format!("sheet-{i}.png"));
                if i % 2 == 0 {
                    GrayImage::from_pixel(200, 280, Luma([235u8])).save(&path).unwrap();
                } else {
                    fs::write(&path, b"truncated").unwrap();
                }
                path
            })
            .collect();

        let reports = scan_files(&OmrPipeline::default(), &files, &ScanConfiguration::default());
        let names: Vec<&PathBuf> = reports.iter().map(|r| &r.file).collect();
        assert_eq!(names, files.iter().collect::<Vec<_>>());
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.is_ok(), i % 2 == 0, "{}", report.file.display());
        }
    }
}
