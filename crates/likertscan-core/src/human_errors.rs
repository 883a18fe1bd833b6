// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the people operating the scanner
// (survey staff and assistants), not for developers.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::ScanError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Trying the same thing again may work.
    Transient,
    /// The operator must do something (re-photograph, fix settings).
    ActionRequired,
    /// Cannot be fixed by retrying; fall back to manual entry.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the operator should try (shown as body text).
    pub suggestion: String,
    /// Whether retrying the same input may succeed.
    pub retriable: bool,
    /// Severity level (drives icon/colour in the UI).
    pub severity: Severity,
}

/// Convert a `ScanError` into a `HumanError` for presentation.
pub fn humanize_error(err: &ScanError) -> HumanError {
    match err {
        ScanError::MalformedImage(_) => HumanError {
            message: "The photo is empty or damaged.".into(),
            suggestion: "Take the photo again, making sure the whole answer sheet is visible.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanError::ImageDecode(_) => HumanError {
            message: "This image couldn't be opened.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanError::InvalidConfiguration(detail) => HumanError {
            message: "The survey settings don't look right.".into(),
            suggestion: format!("Check the number of items, the scale type and the reverse-scored items in Settings. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanError::BoundaryNotFound => HumanError {
            message: "We couldn't find the edges of the answer sheet.".into(),
            suggestion: "Place the sheet on a dark, plain surface and photograph it from straight above with all four corners in view.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanError::Transform(_) => HumanError {
            message: "We couldn't straighten the photo.".into(),
            suggestion: "Take the photo again from straight above, or enter the answers by hand.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanError::Cancelled => HumanError {
            message: "Scanning was stopped.".into(),
            suggestion: "Start the scan again to process the remaining sheets.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading a file.".into(),
                    suggestion: "Try again. If this keeps happening, check the file permissions.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ScanError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Check that the settings file is valid JSON, or delete it to go back to the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}
