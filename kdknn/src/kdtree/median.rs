/*
* Licensed to Elasticsearch B.V. under one or more contributor
* license agreements. See the NOTICE file distributed with
* this work for additional information regarding copyright
* ownership. Elasticsearch B.V. licenses this file to you under
* the Apache License, Version 2.0 (the "License"); you may
* not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
*  http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing,
* software distributed under the License is distributed on an
* "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
* KIND, either express or implied.  See the License for the
* specific language governing permissions and limitations
* under the License.
*/

//! # Split Value Estimation
//! Large ranges get a sampled, bucketed estimate of the median so the parallel phase never sorts
//! millions of coordinates. Small ranges get the exact lower median. Neither is trusted blindly:
//! `choose_cut` only keeps an estimate that leaves points on both sides of the plane.

use pointcloud::data_sources::DataRam;
use pointcloud::PointIndex;
use rand::Rng;

/// Coordinates drawn for the approximate median
pub const MEDIAN_SAMPLE_SIZE: usize = 1024;
/// Equal width buckets per refinement round
pub const MEDIAN_BUCKETS: usize = 16;
/// Refinement rounds before the remaining samples are resolved exactly
pub const MAX_REFINEMENTS: usize = 4;

/// Estimates the median of coordinate `dim` over the range, within `[lo, hi]`.
///
/// Samples are counted into `MEDIAN_BUCKETS` equal width buckets, the bucket holding the 50th
/// percentile becomes the new `[lo, hi]`, and only the samples inside it survive. This repeats up
/// to `MAX_REFINEMENTS` times or until no more than one bucket's worth of samples are left, then
/// the survivors are resolved exactly. Returns `None` if every sampled value is the same.
pub fn approximate_median<M, R: Rng>(
    points: &DataRam<M>,
    indexes: &[PointIndex],
    dim: usize,
    lo: f32,
    hi: f32,
    rng: &mut R,
) -> Option<f32> {
    if indexes.is_empty() {
        return None;
    }
    let mut samples: Vec<f32> = if indexes.len() <= MEDIAN_SAMPLE_SIZE {
        indexes.iter().map(|i| points.coordinate(*i, dim)).collect()
    } else {
        (0..MEDIAN_SAMPLE_SIZE)
            .map(|_| points.coordinate(indexes[rng.gen_range(0..indexes.len())], dim))
            .collect()
    };
    if is_flat(&samples) {
        return None;
    }

    let mut rank = (samples.len() - 1) / 2;
    let mut lo = lo;
    let mut hi = hi;
    for _ in 0..MAX_REFINEMENTS {
        if samples.len() <= MEDIAN_BUCKETS {
            break;
        }
        let width = (hi - lo) / MEDIAN_BUCKETS as f32;
        if !(width > 0.0) {
            break;
        }
        let bucket = |x: f32| (((x - lo) / width) as usize).min(MEDIAN_BUCKETS - 1);

        let mut counts = [0usize; MEDIAN_BUCKETS];
        for x in &samples {
            counts[bucket(*x)] += 1;
        }
        let mut below = 0;
        let mut target = MEDIAN_BUCKETS - 1;
        for (b, count) in counts.iter().enumerate() {
            if below + count > rank {
                target = b;
                break;
            }
            below += count;
        }

        rank -= below;
        samples.retain(|x| bucket(*x) == target);
        let new_lo = lo + target as f32 * width;
        if target + 1 < MEDIAN_BUCKETS {
            hi = lo + (target + 1) as f32 * width;
        }
        lo = new_lo;
    }

    let (_, median, _) = samples.select_nth_unstable_by(rank, |a, b| a.total_cmp(b));
    Some(*median)
}

/// The exact lower median of coordinate `dim` over the range. The coordinates are copied into
/// `buffer`, which the caller reuses between nodes. Returns `None` if they are all equal.
pub fn exact_median<M>(
    points: &DataRam<M>,
    indexes: &[PointIndex],
    dim: usize,
    buffer: &mut Vec<f32>,
) -> Option<f32> {
    buffer.clear();
    buffer.extend(indexes.iter().map(|i| points.coordinate(*i, dim)));
    if buffer.is_empty() || is_flat(buffer) {
        return None;
    }
    let mid = (buffer.len() - 1) / 2;
    let (_, median, _) = buffer.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    Some(*median)
}

/// A cut splits `[lo, hi]` into two non-empty sides under the `<=` / `>` rule only if
/// `lo <= cut < hi`.
#[inline]
pub fn valid_cut(cut: f32, lo: f32, hi: f32) -> bool {
    lo <= cut && cut < hi
}

/// Keeps the estimate if it is a valid cut, otherwise falls back to the middle of the extent, or
/// to `lo` when rounding pushes the middle onto `hi`.
pub fn choose_cut(estimate: Option<f32>, lo: f32, hi: f32) -> f32 {
    match estimate {
        Some(cut) if valid_cut(cut, lo, hi) => cut,
        _ => {
            let mid = lo + (hi - lo) / 2.0;
            if valid_cut(mid, lo, hi) {
                mid
            } else {
                lo
            }
        }
    }
}

fn is_flat(values: &[f32]) -> bool {
    match values.split_first() {
        Some((first, rest)) => rest.iter().all(|x| x == first),
        None => true,
    }
}
