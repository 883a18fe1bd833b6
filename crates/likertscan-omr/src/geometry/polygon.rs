// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Closed-polygon helpers for contour analysis: area, perimeter, and
// Douglas–Peucker simplification.

use imageproc::point::Point;

/// Convert contour points to floating point.
pub fn to_f64(points: &[Point<u32>]) -> Vec<(f64, f64)> {
    points.iter().map(|p| (p.x as f64, p.y as f64)).collect()
}

/// Area enclosed by a closed polygon (shoelace formula).
pub fn area(points: &[(f64, f64)]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].0 * points[j].1;
        area -= points[j].0 * points[i].1;
    }
    area.abs() / 2.0
}

/// Perimeter of a closed polygon.
pub fn perimeter(points: &[(f64, f64)]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| distance(points[i], points[(i + 1) % n]))
        .sum()
}

/// Simplify a closed curve so that no dropped point lies further than
/// `epsilon` from the simplified outline.
///
/// The curve is anchored at two extreme points: the point furthest from the
/// first sample, and the point furthest from that one. Both always survive,
/// and each half between them is simplified as an open chain. The result
/// starts at the first anchor and does not repeat it.
pub fn approximate_closed(points: &[(f64, f64)], epsilon: f64) -> Vec<(f64, f64)> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let anchor = furthest_from(points, points[0]);
    let mut closed: Vec<(f64, f64)> = points[anchor..]
        .iter()
        .chain(&points[..anchor])
        .copied()
        .collect();
    let origin = closed[0];
    let split = furthest_from(&closed, origin);
    if split == 0 {
        return vec![origin];
    }
    closed.push(origin);

    let mut keep = vec![false; closed.len()];
    keep[0] = true;
    keep[split] = true;
    keep[closed.len() - 1] = true;
    simplify_chain(&closed, 0, split, epsilon, &mut keep);
    simplify_chain(&closed, split, closed.len() - 1, epsilon, &mut keep);

    // The last entry duplicates the first.
    closed
        .iter()
        .zip(keep.iter())
        .take(closed.len() - 1)
        .filter(|(_, k)| **k)
        .map(|(p, _)| *p)
        .collect()
}

/// Index of the point furthest from `origin`; the first one on ties.
fn furthest_from(points: &[(f64, f64)], origin: (f64, f64)) -> usize {
    points
        .iter()
        .enumerate()
        .map(|(i, &p)| (i, distance(origin, p)))
        .fold((0, f64::MIN), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0
}

/// Iterative Douglas–Peucker over `points[start..=end]`, marking survivors.
fn simplify_chain(points: &[(f64, f64)], start: usize, end: usize, epsilon: f64, keep: &mut [bool]) {
    let mut stack = vec![(start, end)];
    while let Some((first, last)) = stack.pop() {
        if last <= first + 1 {
            continue;
        }
        let (index, dmax) = ((first + 1)..last)
            .map(|i| (i, segment_distance(points[i], points[first], points[last])))
            .fold((first, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if dmax > epsilon {
            keep[index] = true;
            stack.push((first, index));
            stack.push((index, last));
        }
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}

/// Perpendicular distance from `p` to the line through `a` and `b`, or the
/// distance to `a` when the two coincide.
fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let len = distance(a, b);
    if len < f64::EPSILON {
        return distance(p, a);
    }
    ((b.0 - a.0) * (a.1 - p.1) - (a.0 - p.0) * (b.1 - a.1)).abs() / len
}
