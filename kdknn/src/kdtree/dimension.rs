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

//! Picks the coordinate a node splits on.

use super::bounds::BoundingBox;
use pointcloud::data_sources::DataRam;
use pointcloud::PointIndex;
use rand::Rng;

/// How many points are drawn to estimate the per dimension variance
pub const DIMENSION_SAMPLE_SIZE: usize = 64;

/// Chooses the dimension with the highest sample variance over a random sample of the range.
/// Equal variances go to the lower dimension. When the sample has no spread at all this walks
/// round-robin from `depth % dim` to the first dimension the bounding box says has a non-zero
/// extent. Returns `None` only when every extent is zero, meaning all points in the range are
/// identical and the node has to be a leaf.
pub fn select_dimension<M, R: Rng>(
    points: &DataRam<M>,
    indexes: &[PointIndex],
    bbox: &BoundingBox,
    depth: usize,
    rng: &mut R,
) -> Option<usize> {
    let dim = bbox.dim();
    if dim == 0 || indexes.is_empty() {
        return None;
    }

    let variances = if indexes.len() <= DIMENSION_SAMPLE_SIZE {
        sample_variances(points, indexes.iter().copied(), dim)
    } else {
        let sample = (0..DIMENSION_SAMPLE_SIZE).map(|_| indexes[rng.gen_range(0..indexes.len())]);
        sample_variances(points, sample, dim)
    };

    let mut best = 0;
    for j in 1..dim {
        if variances[j] > variances[best] {
            best = j;
        }
    }
    if variances[best] > 0.0 && bbox.extent(best) > 0.0 {
        return Some(best);
    }

    (0..dim)
        .map(|offset| (depth + offset) % dim)
        .find(|j| bbox.extent(*j) > 0.0)
}

fn sample_variances<M, I: Iterator<Item = PointIndex>>(
    points: &DataRam<M>,
    sample: I,
    dim: usize,
) -> Vec<f64> {
    let mut count = 0.0f64;
    let mut mean = vec![0.0f64; dim];
    let mut m2 = vec![0.0f64; dim];
    for i in sample {
        count += 1.0;
        for (j, x) in points.row(i).iter().enumerate() {
            let x = *x as f64;
            let delta = x - mean[j];
            mean[j] += delta / count;
            m2[j] += delta * (x - mean[j]);
        }
    }
    if count > 1.0 {
        m2.iter_mut().for_each(|v| *v /= count - 1.0);
    } else {
        m2.iter_mut().for_each(|v| *v = 0.0);
    }
    m2
}
