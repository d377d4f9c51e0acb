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

//! Supported distances
//!
//! The KD-tree never needs the true distance until it reports a result, so each metric exposes a
//! *reduced* distance (`rdist`) that is cheaper to compute and orders points identically. The
//! contribution of a single coordinate difference, `axis_rdist`, is what the search compares
//! against when it decides whether the far side of a splitting plane can still hold a neighbor.

use std::fmt::Debug;

/// The trait that enables a metric
pub trait Metric: 'static + Send + Sync + Debug + Clone {
    /// The reduced distance between two dense points of the same dimension.
    fn rdist(x: &[f32], y: &[f32]) -> f32;
    /// The reduced distance contributed by a single coordinate difference.
    fn axis_rdist(delta: f32) -> f32;
    /// Converts a reduced distance back to the metric's distance.
    fn rdist_to_dist(rdist: f32) -> f32;
    /// The actual distance
    #[inline]
    fn dist(x: &[f32], y: &[f32]) -> f32 {
        Self::rdist_to_dist(Self::rdist(x, y))
    }
}

/// L2 norm, the square root of the sum of squares
#[derive(Debug, Clone)]
pub struct L2 {}

impl Metric for L2 {
    #[inline]
    fn rdist(x: &[f32], y: &[f32]) -> f32 {
        let mut acc = [0.0f32; 8];
        let mut x_chunks = x.chunks_exact(8);
        let mut y_chunks = y.chunks_exact(8);
        for (xc, yc) in (&mut x_chunks).zip(&mut y_chunks) {
            for i in 0..8 {
                let diff = xc[i] - yc[i];
                acc[i] += diff * diff;
            }
        }
        let leftover: f32 = x_chunks
            .remainder()
            .iter()
            .zip(y_chunks.remainder())
            .map(|(xi, yi)| (xi - yi) * (xi - yi))
            .sum();
        acc.iter().sum::<f32>() + leftover
    }

    #[inline]
    fn axis_rdist(delta: f32) -> f32 {
        delta * delta
    }

    #[inline]
    fn rdist_to_dist(rdist: f32) -> f32 {
        rdist.sqrt()
    }
}

/// L1 norm, the sum of absolute differences
#[derive(Debug, Clone)]
pub struct L1 {}

impl Metric for L1 {
    #[inline]
    fn rdist(x: &[f32], y: &[f32]) -> f32 {
        x.iter().zip(y).map(|(xi, yi)| (xi - yi).abs()).sum()
    }

    #[inline]
    fn axis_rdist(delta: f32) -> f32 {
        delta.abs()
    }

    #[inline]
    fn rdist_to_dist(rdist: f32) -> f32 {
        rdist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_matches_naive() {
        let x: Vec<f32> = (0..19).map(|i| i as f32 * 0.5).collect();
        let y: Vec<f32> = (0..19).map(|i| (19 - i) as f32 * 0.25).collect();
        let naive: f32 = x
            .iter()
            .zip(&y)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>();
        assert_approx_eq!(L2::rdist(&x, &y), naive, 1e-3);
        assert_approx_eq!(L2::dist(&x, &y), naive.sqrt(), 1e-4);
    }

    #[test]
    fn axis_bound_never_exceeds_distance() {
        let x = [1.0, -2.0, 3.5];
        let y = [0.5, 4.0, -1.0];
        for j in 0..3 {
            assert!(L2::axis_rdist(x[j] - y[j]) <= L2::rdist(&x, &y));
            assert!(L1::axis_rdist(x[j] - y[j]) <= L1::rdist(&x, &y));
        }
        assert_approx_eq!(L1::dist(&x, &y), 0.5 + 6.0 + 4.5);
    }
}
