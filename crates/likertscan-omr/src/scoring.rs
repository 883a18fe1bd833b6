// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reverse-keyed item scoring.

use std::collections::BTreeSet;

use likertscan_core::ItemResult;

/// Reverse a single score on a `likert_type`-point scale: `(likert_type + 1) - raw`.
/// A zero (no answer) stays zero.
pub fn reverse_score(raw: u32, likert_type: u32) -> u32 {
    if raw == 0 {
        return 0;
    }
    // `likert_type - raw + 1`, ordered so that no step can overflow.
    likert_type.checked_sub(raw).map_or(0, |gap| gap + 1)
}

/// Apply reverse keying to raw scores. `reverse_items` holds 1-indexed item
/// numbers; items not listed pass through unchanged.
pub fn apply_reverse_scoring(raw_scores: &[u32], reverse_items: &BTreeSet<u32>, likert_type: u32) -> Vec<u32> {
    raw_scores
        .iter()
        .enumerate()
        .map(|(index, &score)| {
            if reverse_items.contains(&(index as u32 + 1)) {
                reverse_score(score, likert_type)
            } else {
                score
            }
        })
        .collect()
}

/// Fill in `final_score` for each item from its `raw_score`.
pub fn score_items(items: &mut [ItemResult], reverse_items: &BTreeSet<u32>, likert_type: u32) {
    for (index, item) in items.iter_mut().enumerate() {
        item.final_score = if reverse_items.contains(&(index as u32 + 1)) {
            reverse_score(item.raw_score, likert_type)
        } else {
            item.raw_score
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[u32]) -> BTreeSet<u32> {
        items.iter().copied().collect()
    }

    #[test]
    fn five_point_pairs() {
        let reversed: Vec<u32> = (1..=5).map(|s| reverse_score(s, 5)).collect();
        assert_eq!(reversed, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn zero_is_never_reversed_into_an_answer() {
        for likert in [3, 5, 7] {
            assert_eq!(reverse_score(0, likert), 0);
        }
    }

    #[test]
    fn only_listed_items_change() {
        let raw = [1, 2, 3, 0, 5];
        let scored = apply_reverse_scoring(&raw, &set(&[1, 4, 5]), 5);
        assert_eq!(scored, vec![5, 2, 3, 0, 1]);
    }

    #[test]
    fn reverse_scoring_is_self_inverse() {
        for likert in [3u32, 5, 7] {
            let raw: Vec<u32> = (0..=likert).chain((0..=likert).rev()).collect();
            let reverse = set(&(1..=raw.len() as u32).filter(|i| i % 2 == 1).collect::<Vec<_>>());
            let once = apply_reverse_scoring(&raw, &reverse, likert);
            let twice = apply_reverse_scoring(&once, &reverse, likert);
            assert_eq!(twice, raw);
        }
    }

    #[test]
    fn widest_scale_reverses_without_overflow() {
        assert_eq!(reverse_score(1, u32::MAX), u32::MAX);
        assert_eq!(reverse_score(u32::MAX, u32::MAX), 1);
        assert_eq!(reverse_score(9, 5), 0);
    }

    #[test]
    fn empty_reverse_set_is_identity() {
        let raw = [3, 1, 0, 7];
        assert_eq!(apply_reverse_scoring(&raw, &BTreeSet::new(), 7), raw.to_vec());
    }

    #[test]
    fn score_items_keeps_raw_scores() {
        let mut items = vec![
            ItemResult { raw_score: 1, final_score: 1, confidence: 1.0 },
            ItemResult { raw_score: 0, final_score: 0, confidence: 0.1 },
        ];
        score_items(&mut items, &set(&[1, 2]), 5);
        assert_eq!(items[0].raw_score, 1);
        assert_eq!(items[0].final_score, 5);
        assert_eq!(items[1].final_score, 0);
    }
}
