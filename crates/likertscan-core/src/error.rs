// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for likertscan.

use thiserror::Error;

/// Top-level error type for all likertscan operations.
///
/// Only terminal conditions live here. A sheet whose border could not be
/// found (under the lenient policy) or an item without a confident mark is
/// reported as data in the `ScanResult`, never as an error.
#[derive(Debug, Error)]
pub enum ScanError {
    // -- Input errors --
    #[error("malformed image: {0}")]
    MalformedImage(String),

    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    #[error("invalid scan configuration: {0}")]
    InvalidConfiguration(String),

    // -- Pipeline errors --
    #[error("answer sheet boundary not found")]
    BoundaryNotFound,

    #[error("perspective transform failed: {0}")]
    Transform(String),

    #[error("scan cancelled before this image was started")]
    Cancelled,

    // -- Collaborator I/O (CLI only) --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanError>;
