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

//! In place partitioning of a slice of the permutation around a cut value.

use pointcloud::data_sources::DataRam;
use pointcloud::{Metric, PointIndex};
use rayon::prelude::*;

/// Block size each worker partitions on its own in `parallel_partition`
pub const PARTITION_BLOCK: usize = 1 << 14;

/// Reorders `indexes` so that every point with coordinate `dim <= cut` comes before every point
/// with coordinate `dim > cut`. Returns how many landed on the left.
pub fn partition<M>(points: &DataRam<M>, indexes: &mut [PointIndex], dim: usize, cut: f32) -> usize {
    let mut left = 0;
    let mut right = indexes.len();
    while left < right {
        if points.coordinate(indexes[left], dim) <= cut {
            left += 1;
        } else {
            right -= 1;
            indexes.swap(left, right);
        }
    }
    left
}

/// Same contract as `partition`. Each `PARTITION_BLOCK` sized block is partitioned by its own
/// worker, then right side entries sitting before the global split point are swapped with left
/// side entries sitting after it. The result is deterministic for a given input.
pub fn parallel_partition<M: Metric>(
    points: &DataRam<M>,
    indexes: &mut [PointIndex],
    dim: usize,
    cut: f32,
) -> usize {
    if indexes.len() < 2 * PARTITION_BLOCK {
        return partition(points, indexes, dim, cut);
    }
    let len = indexes.len();
    let block_lefts: Vec<usize> = indexes
        .par_chunks_mut(PARTITION_BLOCK)
        .map(|block| partition(points, block, dim, cut))
        .collect();
    let split: usize = block_lefts.iter().sum();

    let mut misplaced_right = Vec::new();
    let mut misplaced_left = Vec::new();
    for (b, left_count) in block_lefts.iter().enumerate() {
        let start = b * PARTITION_BLOCK;
        let end = (start + PARTITION_BLOCK).min(len);
        misplaced_right.extend((start + left_count)..end.min(split));
        misplaced_left.extend(start.max(split)..(start + left_count));
    }
    debug_assert_eq!(misplaced_left.len(), misplaced_right.len());
    for (r, l) in misplaced_right.into_iter().zip(misplaced_left) {
        indexes.swap(r, l);
    }
    split
}
