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

//! Utility functions for i/o

use crate::errors::KdResult;
use crate::kdtree::{KdIndex, KdTreeBuilder};
use log::info;
use pointcloud::loaders::{labeled_ram_from_yaml, ram_from_yaml};
use pointcloud::{Metric, PointCloud, L2};
use std::path::Path;

/// Given a yaml file on disk, it loads the labeled dataset it describes and builds an index with
/// the builder parameters from the same file.
///
/// ```yaml
/// ---
/// leaf_capacity: 16
/// rng_seed: 0
/// data_path: DATA_CSV
/// labels_path: LABELS_CSV
/// labels_index: 3
/// count: NUMBER_OF_DATA_POINTS
/// ```
pub fn kd_index_from_labeled_yaml<P: AsRef<Path>>(path: P) -> KdResult<KdIndex<L2>> {
    let point_cloud = labeled_ram_from_yaml::<_, L2>(&path)?;
    let builder = KdTreeBuilder::from_yaml(&path)?;
    info!(
        "Loaded {} labeled points, building with leaf capacity {}",
        point_cloud.len(),
        builder.leaf_capacity
    );
    builder.build_labeled(&point_cloud)
}

/// Same as `kd_index_from_labeled_yaml`, for a dataset without labels.
///
/// ```yaml
/// ---
/// leaf_capacity: 16
/// data_path: DATA_CSV
/// count: NUMBER_OF_DATA_POINTS
/// ```
pub fn kd_index_from_yaml<P: AsRef<Path>>(path: P) -> KdResult<KdIndex<L2>> {
    let point_cloud = ram_from_yaml::<_, L2>(&path)?;
    let builder = KdTreeBuilder::from_yaml(&path)?;
    info!(
        "Loaded {} points, building with leaf capacity {}",
        point_cloud.len(),
        builder.leaf_capacity
    );
    builder.build_from_parts(point_cloud, None)
}

/// Loads an index saved with `save_index`.
pub fn load_index<P: AsRef<Path>, M: Metric>(index_path: P) -> KdResult<KdIndex<M>> {
    info!("Loading index from : {}", index_path.as_ref().to_string_lossy());
    KdIndex::load(index_path)
}

/// Saves an index, replacing anything already at `index_path`.
pub fn save_index<P: AsRef<Path>, M: Metric>(index_path: P, index: &KdIndex<M>) -> KdResult<()> {
    info!("Saving index to : {}", index_path.as_ref().to_string_lossy());
    index.save(index_path)
}
