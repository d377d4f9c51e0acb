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

//! # Bulk queries
//! A built index is immutable, so answering many queries at once is just a matter of handing
//! chunks of them to rayon.

use crate::errors::KdResult;
use crate::kdtree::{KdIndex, Neighbor};
use pointcloud::{Metric, PointIndex};
use rayon::prelude::*;
use std::sync::Arc;

const QUERY_CHUNK: usize = 16;

/// Runs queries against a shared index in parallel. Results come back in the order of the input.
#[derive(Debug, Clone)]
pub struct BulkInterface<M: Metric> {
    index: Arc<KdIndex<M>>,
}

impl<M: Metric> BulkInterface<M> {
    /// Creates a new bulk interface around a shared index
    pub fn new(index: Arc<KdIndex<M>>) -> Self {
        BulkInterface { index }
    }

    /// The index this answers queries with
    pub fn index(&self) -> &KdIndex<M> {
        &self.index
    }

    /// Bulk knn
    pub fn knn(&self, points: &[&[f32]], k: usize) -> Vec<KdResult<Vec<(f32, PointIndex)>>> {
        self.map_chunks(points, |index, point| index.knn(point, k))
    }

    /// Bulk query, with labels
    pub fn query(&self, points: &[&[f32]], k: usize) -> Vec<KdResult<Vec<Neighbor>>> {
        self.map_chunks(points, |index, point| index.query(point, k))
    }

    /// Bulk classify
    pub fn classify(&self, points: &[&[f32]], k: usize) -> Vec<KdResult<Option<i64>>> {
        self.map_chunks(points, |index, point| index.classify(point, k))
    }

    fn map_chunks<T, F>(&self, points: &[&[f32]], f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&KdIndex<M>, &[f32]) -> T + Send + Sync,
    {
        let index: &KdIndex<M> = &self.index;
        points
            .par_chunks(QUERY_CHUNK)
            .flat_map_iter(|chunk| chunk.iter().map(|p| f(index, *p)).collect::<Vec<T>>())
            .collect()
    }
}
