//! Optimal partition of a track into compact, long lasting intervals
//!
//! Boundaries are indices `0..=n` of an `n` point track; the interval between
//! boundaries `i < j` holds points `i..j`. A reward matrix scores every
//! interval and an interval dynamic program finds the partition with the
//! highest total reward.

use rayon::prelude::*;

use crate::track::{Position, Track, min_enclosing_circle, seconds_between};

/// Upper triangular reward matrix, `rewards[i][j]` scores points `i..j`.
///
/// An interval earns the square of its point count when its enclosing circle
/// diameter is at most `diameter` and it lasts at least `duration` seconds,
/// nothing otherwise. Rows are independent and computed in parallel.
pub(crate) fn reward_matrix(track: &Track, diameter: f64, duration: f64) -> Vec<Vec<f64>> {
    let n = track.size();
    let positions: Vec<Position> = track.positions().copied().collect();
    let observations = track.observations();

    let mut rows: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut row = vec![0.0; n + 1];
            let start = &observations[i];
            for j in i + 1..=n {
                let last = &observations[j - 1];
                // Once the interval cannot fit in the circle, no extension can
                if start.position.distance_2d(&last.position) > diameter {
                    break;
                }
                if j >= i + 2 && positions[j - 2].distance_2d(&last.position) > diameter {
                    break;
                }
                if seconds_between(&start.timestamp, &last.timestamp) < duration {
                    continue;
                }
                let compact = min_enclosing_circle(&positions[i..j])
                    .is_some_and(|circle| circle.diameter() <= diameter);
                if compact {
                    #[allow(clippy::cast_precision_loss)]
                    let count = (j - i) as f64;
                    row[j] = count * count;
                }
            }
            row
        })
        .collect();
    rows.push(vec![0.0; n + 1]);
    rows
}

/// Boundaries of the best scoring partition of `rewards`, first `0` and
/// last `n` included.
///
/// Intervals are solved by increasing width so every cell only reads
/// strictly narrower ones.
pub(crate) fn optimal_partition(rewards: &[Vec<f64>]) -> Vec<usize> {
    let size = rewards.len();
    if size < 2 {
        return Vec::new();
    }

    let mut best: Vec<Vec<f64>> = rewards.to_vec();
    let mut split: Vec<Vec<Option<usize>>> = vec![vec![None; size]; size];

    for width in 2..size {
        for i in 0..size - width {
            let j = i + width;
            for k in i + 1..j {
                let value = best[i][k] + best[k][j];
                if value > best[i][j] {
                    best[i][j] = value;
                    split[i][j] = Some(k);
                }
            }
        }
    }

    backtrack(&split, size - 1)
}

/// Unfolds the split table from the full interval with an explicit stack
fn backtrack(split: &[Vec<Option<usize>>], last: usize) -> Vec<usize> {
    let mut boundaries = Vec::new();
    let mut stack = vec![(0, last)];

    while let Some((i, j)) = stack.pop() {
        match split[i][j] {
            Some(k) if j - i > 1 => {
                // Left half is visited first
                stack.push((k, j));
                stack.push((i, k));
            }
            _ => boundaries.push(i),
        }
    }
    boundaries.push(last);
    boundaries
}
