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

use pointcloud::PointIndex;
use std::cmp::Ordering;

/// A scored candidate. `index` is the point's original index, `position` is where it lives in
/// the permuted storage.
#[derive(Clone, Copy, Debug)]
pub struct QuerySingleton {
    /// Reduced distance to the query
    pub dist: f32,
    /// Index of the point in the caller's data
    pub index: PointIndex,
    /// Row in the permuted storage
    pub position: usize,
}

impl QuerySingleton {
    pub(crate) fn new(dist: f32, index: PointIndex, position: usize) -> QuerySingleton {
        QuerySingleton {
            dist,
            index,
            position,
        }
    }
}

impl PartialEq for QuerySingleton {
    fn eq(&self, other: &QuerySingleton) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QuerySingleton {}

// Ordered by distance, then by original index. The max of a heap is the worst candidate.
impl Ord for QuerySingleton {
    fn cmp(&self, other: &QuerySingleton) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for QuerySingleton {
    fn partial_cmp(&self, other: &QuerySingleton) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
