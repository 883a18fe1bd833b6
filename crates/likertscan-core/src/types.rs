// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the likertscan answer-sheet reader.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn as_tuple(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

impl From<(f32, f32)> for Point2D {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// The four corners of an answer sheet in canonical order:
/// top-left, top-right, bottom-right, bottom-left.
///
/// The only way to build one is from unordered points, so the ordering never
/// depends on the order the corners were detected in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[Point2D; 4]", into = "[Point2D; 4]")]
pub struct CornerSet([Point2D; 4]);

impl CornerSet {
    /// Order four raw points as `[TL, TR, BR, BL]`.
    ///
    /// The two points with the smallest `y` form the top pair and the other
    /// two the bottom pair; each pair is then sorted by `x`. Ties on one axis
    /// are broken by the other, which makes the result independent of the
    /// input permutation.
    pub fn from_unordered(mut points: [Point2D; 4]) -> Self {
        points.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

        let by_x = |a: &Point2D, b: &Point2D| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y));
        let mut top = [points[0], points[1]];
        let mut bottom = [points[2], points[3]];
        top.sort_by(by_x);
        bottom.sort_by(by_x);

        Self([top[0], top[1], bottom[1], bottom[0]])
    }

    pub fn top_left(&self) -> Point2D {
        self.0[0]
    }

    pub fn top_right(&self) -> Point2D {
        self.0[1]
    }

    pub fn bottom_right(&self) -> Point2D {
        self.0[2]
    }

    pub fn bottom_left(&self) -> Point2D {
        self.0[3]
    }

    pub fn points(&self) -> &[Point2D; 4] {
        &self.0
    }

    /// Corners as `(x, y)` tuples in canonical order.
    pub fn as_tuples(&self) -> [(f32, f32); 4] {
        self.0.map(|p| p.as_tuple())
    }

    /// Enclosed area via the shoelace formula.
    pub fn area(&self) -> f32 {
        let mut area = 0.0f32;
        for i in 0..4 {
            let j = (i + 1) % 4;
            area += self.0[i].x * self.0[j].y;
            area -= self.0[j].x * self.0[i].y;
        }
        area.abs() / 2.0
    }
}

impl From<[Point2D; 4]> for CornerSet {
    fn from(points: [Point2D; 4]) -> Self {
        Self::from_unordered(points)
    }
}

impl From<CornerSet> for [Point2D; 4] {
    fn from(corners: CornerSet) -> Self {
        corners.0
    }
}

/// Pipeline stage of a single scan, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    Idle,
    Rectifying,
    Binarizing,
    Analyzing,
    Scoring,
    Done,
    Failed,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Rectifying => "rectifying",
            Self::Binarizing => "binarizing",
            Self::Analyzing => "analyzing",
            Self::Scoring => "scoring",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome for a single item. A score of 0 means no confident answer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemResult {
    /// Score before reverse keying (0 or 1..=likert_type).
    pub raw_score: u32,
    /// Score after reverse keying (0 or 1..=likert_type).
    pub final_score: u32,
    /// `(max - second) / max` of the row's cell densities, in [0, 1].
    pub confidence: f32,
}

impl ItemResult {
    pub fn is_answered(&self) -> bool {
        self.final_score > 0
    }
}

/// Terminal artifact of a scan, handed to persistence and presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Final (reverse-adjusted) score per item, in item order.
    pub scores: Vec<u32>,
    /// Score per item before reverse keying.
    pub raw_scores: Vec<u32>,
    /// Sum of the non-zero final scores.
    pub total: u64,
    /// Number of items with a non-zero final score.
    pub valid_count: usize,
    /// Number of items without a confident answer.
    pub error_count: usize,
    /// 1-indexed numbers of the items without a confident answer.
    pub error_items: Vec<u32>,
    /// Reverse-keyed items applied during this run, ascending.
    pub reverse_items: Vec<u32>,
    /// Per-item detail including confidence.
    pub items: Vec<ItemResult>,
    /// Whether the sheet boundary was found and the image rectified.
    pub rectified: bool,
}

impl ScanResult {
    /// Aggregate per-item outcomes into a result.
    pub fn from_items(items: Vec<ItemResult>, reverse_items: &BTreeSet<u32>, rectified: bool) -> Self {
        let scores: Vec<u32> = items.iter().map(|item| item.final_score).collect();
        let raw_scores = items.iter().map(|item| item.raw_score).collect();
        let total = scores.iter().map(|&s| u64::from(s)).sum();
        let error_items: Vec<u32> = scores
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == 0)
            .map(|(i, _)| i as u32 + 1)
            .collect();

        Self {
            valid_count: scores.len() - error_items.len(),
            error_count: error_items.len(),
            scores,
            raw_scores,
            total,
            error_items,
            reverse_items: reverse_items.iter().copied().collect(),
            items,
            rectified,
        }
    }
}
