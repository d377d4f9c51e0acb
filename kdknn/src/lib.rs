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

#![warn(missing_docs)]
#![doc(test(attr(allow(unused_variables))))]

//! # KdKnn
//! An exact kd-tree for k-nearest-neighbor classification. The tree is stored as one flat table of
//! node records, built in parallel over an index permutation that is partitioned in place, and
//! searched with an explicit stack and a bounded max-heap.
//!
//! ## Parameter Guide
//! The leaf capacity matters most. Smaller leaves make for a deeper tree that prunes more
//! aggressively, larger leaves mean fewer nodes and longer linear scans at the bottom. Somewhere
//! between 8 and 32 is a good place to start.
//!
//! The serial threshold and parallel depth decide where the builder switches from splitting a
//! whole layer at once with sampled medians to finishing each subtree on its own with exact
//! medians. They only change how the work is scheduled and the layout of the table, never which
//! neighbors a query finds.
//!
//! Set an rng seed to get bit-identical tables from repeated builds.
//!
//! ```rust
//! use kdknn::*;
//! use pointcloud::data_sources::DataRam;
//! use pointcloud::label_sources::SmallIntLabels;
//! use pointcloud::L2;
//!
//! let points = DataRam::<L2>::new(vec![0.0, 0.0, 1.0, 0.0, 5.0, 5.0, 6.0, 5.0], 2).unwrap();
//! let labels = SmallIntLabels::new(vec![0, 0, 1, 1], None);
//! let index = build(points, Some(labels), 1, 0).unwrap();
//! assert_eq!(index.classify(&[0.2, 0.1], 1).unwrap(), Some(0));
//! ```

#[cfg(test)]
#[macro_use]
extern crate assert_approx_eq;

pub mod errors;
pub use errors::{KdError, KdResult};

pub mod kdtree;
pub use kdtree::*;

pub mod query_interface;
pub mod utils;

use pointcloud::data_sources::DataRam;
use pointcloud::label_sources::SmallIntLabels;
use pointcloud::Metric;

/// Builds an index over `points` with the default builder, the given leaf capacity and rng seed.
/// `labels`, if present, must have one entry per point.
pub fn build<M: Metric>(
    points: DataRam<M>,
    labels: Option<SmallIntLabels>,
    leaf_capacity: usize,
    seed: u64,
) -> KdResult<KdIndex<M>> {
    let mut builder = KdTreeBuilder::new();
    builder.set_leaf_capacity(leaf_capacity).set_rng_seed(seed);
    builder.build_from_parts(points, labels)
}

/// The `k` nearest neighbors of `point`, closest first, ties broken by the smaller index.
pub fn query<M: Metric>(index: &KdIndex<M>, point: &[f32], k: usize) -> KdResult<Vec<Neighbor>> {
    index.query(point, k)
}
