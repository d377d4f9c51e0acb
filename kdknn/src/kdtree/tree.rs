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

//! # The KD-Tree Table and Index
//!
//! `KdTreeTable` is the flat node arena the builder produces. It knows nothing about the points
//! beyond their count and dimension; the search is handed the permuted points and the permutation
//! to turn leaf positions into coordinates and original indexes.
//!
//! `KdIndex` bundles a table with the permuted points, permuted labels and the permutation, and
//! is what callers query. It is immutable once built, so it can be shared between threads
//! without any locking.

use super::node::*;
use super::prediction::{majority_vote, Neighbor};
use super::query_tools::{KnnQueryHeap, QuerySingleton, SingletonQueryHeap};
use crate::errors::*;
use pointcloud::data_sources::DataRam;
use pointcloud::label_sources::SmallIntLabels;
use pointcloud::{LabelSet, Metric, PointCloud, PointIndex, L2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Version of the saved index layout. Bumped whenever `IndexFile` changes shape.
pub const FORMAT_VERSION: u32 = 1;

/// The flat node table of a kd-tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KdTreeTable {
    pub(crate) nodes: Vec<KdNode>,
    pub(crate) root: usize,
    pub(crate) boundary: usize,
    pub(crate) depth: usize,
    pub(crate) dim: usize,
    pub(crate) point_count: usize,
}

#[derive(Debug, Clone, Copy)]
struct SearchFrame {
    node: usize,
    bound: f32,
}

impl KdTreeTable {
    /// All node rows
    pub fn nodes(&self) -> &[KdNode] {
        &self.nodes
    }

    /// Number of node rows
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// If the table has no rows. A validated table never is.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Row of the root node
    pub fn root(&self) -> usize {
        self.root
    }

    /// The number of rows written while the tree was being built breadth first. Rows past this
    /// belong to subtrees that were built serially.
    pub fn boundary(&self) -> usize {
        self.boundary
    }

    /// The deepest node, the root is at depth 0
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Dimension of the indexed points
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of indexed points
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Bounds checked row access
    pub fn node(&self, i: usize) -> KdResult<&KdNode> {
        self.nodes
            .get(i)
            .ok_or_else(|| KdError::malformed(format!("node {} of {} requested", i, self.len())))
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Checks that the table is a tree rooted at `root` whose leaves tile `0..point_count`.
    pub fn validate(&self) -> KdResult<()> {
        if self.root >= self.nodes.len() {
            return Err(KdError::malformed(format!(
                "root {} is outside of a table of {} nodes",
                self.root,
                self.nodes.len()
            )));
        }
        if self.boundary > self.nodes.len() {
            return Err(KdError::malformed("boundary is past the end of the table"));
        }
        let mut visited = vec![false; self.nodes.len()];
        let mut leaves: Vec<(usize, usize)> = Vec::new();
        let mut max_depth = 0;
        let mut stack: Vec<(usize, usize)> = vec![(self.root, 0)];
        while let Some((i, depth)) = stack.pop() {
            if visited[i] {
                return Err(KdError::malformed(format!("node {} is reachable twice", i)));
            }
            visited[i] = true;
            max_depth = max_depth.max(depth);
            match self.nodes[i].kind() {
                NodeKind::Leaf { start, end } => {
                    if start > end || end > self.point_count {
                        return Err(KdError::malformed(format!(
                            "leaf {} covers {}..{} of {} points",
                            i, start, end, self.point_count
                        )));
                    }
                    leaves.push((start, end));
                }
                NodeKind::Split {
                    dimension,
                    left,
                    right,
                    ..
                } => {
                    if dimension >= self.dim {
                        return Err(KdError::malformed(format!(
                            "node {} splits on dimension {} of {}",
                            i, dimension, self.dim
                        )));
                    }
                    if left >= self.nodes.len() || right >= self.nodes.len() {
                        return Err(KdError::malformed(format!(
                            "node {} has children {} and {} in a table of {} nodes",
                            i,
                            left,
                            right,
                            self.nodes.len()
                        )));
                    }
                    stack.push((right, depth + 1));
                    stack.push((left, depth + 1));
                }
            }
        }
        leaves.sort_unstable();
        let mut cursor = 0;
        for (start, end) in leaves {
            if start != cursor {
                return Err(KdError::malformed(format!(
                    "a leaf starts at {} where {} was expected",
                    start, cursor
                )));
            }
            cursor = end;
        }
        if cursor != self.point_count {
            return Err(KdError::malformed(format!(
                "leaves cover 0..{} of {} points",
                cursor, self.point_count
            )));
        }
        if max_depth != self.depth {
            return Err(KdError::malformed(format!(
                "recorded depth {} but the deepest node is at {}",
                self.depth, max_depth
            )));
        }
        Ok(())
    }

    /// Exact k nearest neighbor search. `points` must be the permuted storage the leaves index
    /// into and `permutation` maps its rows back to original indexes.
    ///
    /// The near child of a split is always visited first. The far child is only stacked while the
    /// heap has room or the reduced distance to the splitting plane is no worse than the current
    /// k-th candidate, and is checked again when it comes off the stack.
    pub fn knn<M: Metric>(
        &self,
        points: &DataRam<M>,
        permutation: &[PointIndex],
        query: &[f32],
        k: usize,
    ) -> KdResult<KnnQueryHeap> {
        let mut heap = KnnQueryHeap::new(k);
        let mut stack: SmallVec<[SearchFrame; 32]> = SmallVec::with_capacity(self.depth + 1);
        stack.push(SearchFrame {
            node: self.root,
            bound: 0.0,
        });
        let mut visits = 0;
        while let Some(frame) = stack.pop() {
            if !heap.accepts(frame.bound) {
                continue;
            }
            visits += 1;
            if visits > self.nodes.len() {
                return Err(KdError::malformed("search visited more nodes than the table holds"));
            }
            match self.node(frame.node)?.kind() {
                NodeKind::Leaf { start, end } => {
                    if start > end || end > permutation.len() {
                        return Err(KdError::malformed(format!(
                            "leaf {} covers {}..{} of {} points",
                            frame.node,
                            start,
                            end,
                            permutation.len()
                        )));
                    }
                    heap.push_outliers((start..end).map(|pos| {
                        QuerySingleton::new(M::rdist(query, points.row(pos)), permutation[pos], pos)
                    }));
                }
                NodeKind::Split {
                    dimension,
                    left,
                    right,
                    cut_value,
                } => {
                    let coordinate = query.get(dimension).ok_or_else(|| {
                        KdError::malformed(format!(
                            "node {} splits on dimension {} of {}",
                            frame.node,
                            dimension,
                            query.len()
                        ))
                    })?;
                    let delta = coordinate - cut_value;
                    let (near, far) = if delta <= 0.0 {
                        (left, right)
                    } else {
                        (right, left)
                    };
                    let far_bound = frame.bound.max(M::axis_rdist(delta));
                    if heap.accepts(far_bound) {
                        stack.push(SearchFrame {
                            node: far,
                            bound: far_bound,
                        });
                    }
                    stack.push(SearchFrame {
                        node: near,
                        bound: frame.bound,
                    });
                }
            }
        }
        Ok(heap)
    }
}

/// A built kd-tree together with everything needed to answer queries with it.
#[derive(Debug, Clone)]
pub struct KdIndex<M: Metric = L2> {
    pub(crate) table: KdTreeTable,
    pub(crate) points: DataRam<M>,
    pub(crate) labels: Option<SmallIntLabels>,
    pub(crate) permutation: Vec<PointIndex>,
}

#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
struct IndexFile<M: Metric> {
    format_version: u32,
    table: KdTreeTable,
    points: DataRam<M>,
    labels: Option<SmallIntLabels>,
    permutation: Vec<PointIndex>,
}

impl<M: Metric> KdIndex<M> {
    /// Glues together the parts of an index, checking they agree with each other.
    pub fn from_parts(
        table: KdTreeTable,
        points: DataRam<M>,
        labels: Option<SmallIntLabels>,
        permutation: Vec<PointIndex>,
    ) -> KdResult<KdIndex<M>> {
        table.validate()?;
        if points.len() != table.point_count || permutation.len() != table.point_count {
            return Err(KdError::malformed(format!(
                "table covers {} points but there are {} points and {} permutation entries",
                table.point_count,
                points.len(),
                permutation.len()
            )));
        }
        if points.dim() != table.dim {
            return Err(KdError::DimensionMismatch {
                expected: table.dim,
                found: points.dim(),
            });
        }
        if let Some(labels) = &labels {
            if labels.len() != points.len() {
                return Err(KdError::LabelCountMismatch {
                    points: points.len(),
                    labels: labels.len(),
                });
            }
        }
        let mut seen = vec![false; permutation.len()];
        for i in &permutation {
            match seen.get_mut(*i) {
                Some(s) if !*s => *s = true,
                _ => {
                    return Err(KdError::malformed(format!(
                        "permutation entry {} is out of range or repeated",
                        i
                    )))
                }
            }
        }
        Ok(KdIndex {
            table,
            points,
            labels,
            permutation,
        })
    }

    /// The node table
    pub fn table(&self) -> &KdTreeTable {
        &self.table
    }

    /// The points, in tree order
    pub fn points(&self) -> &DataRam<M> {
        &self.points
    }

    /// The labels, in tree order
    pub fn labels(&self) -> Option<&SmallIntLabels> {
        self.labels.as_ref()
    }

    /// Maps a row of the tree ordered storage to the index the point had when it was handed in
    pub fn permutation(&self) -> &[PointIndex] {
        &self.permutation
    }

    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.permutation.len()
    }

    /// If there are no points. A built index always has at least one.
    pub fn is_empty(&self) -> bool {
        self.permutation.is_empty()
    }

    /// Dimension of the indexed points
    pub fn dim(&self) -> usize {
        self.table.dim
    }

    fn check_query(&self, point: &[f32], k: usize) -> KdResult<()> {
        if k == 0 {
            return Err(KdError::ZeroK);
        }
        if k > self.len() {
            return Err(KdError::KTooLarge { k, len: self.len() });
        }
        if point.len() != self.dim() {
            return Err(KdError::DimensionMismatch {
                expected: self.dim(),
                found: point.len(),
            });
        }
        Ok(())
    }

    fn search(&self, point: &[f32], k: usize) -> KdResult<Vec<QuerySingleton>> {
        self.check_query(point, k)?;
        let heap = self
            .table
            .knn(&self.points, &self.permutation, point, k)?;
        Ok(heap.unpack())
    }

    /// The `k` nearest neighbors of `point` as `(distance, original index)` pairs, closest
    /// first. Equal distances are ordered by index.
    pub fn knn(&self, point: &[f32], k: usize) -> KdResult<Vec<(f32, PointIndex)>> {
        Ok(self
            .search(point, k)?
            .iter()
            .map(|s| (M::rdist_to_dist(s.dist), s.index))
            .collect())
    }

    /// The `k` nearest neighbors with their labels.
    pub fn query(&self, point: &[f32], k: usize) -> KdResult<Vec<Neighbor>> {
        let found = self.search(point, k)?;
        found
            .iter()
            .map(|s| -> KdResult<Neighbor> {
                let label = match &self.labels {
                    Some(labels) => labels.label(s.position)?.copied(),
                    None => None,
                };
                Ok(Neighbor {
                    index: s.index,
                    distance: M::rdist_to_dist(s.dist),
                    label,
                })
            })
            .collect()
    }

    /// Majority label of the `k` nearest neighbors. `None` if none of them have a label.
    pub fn classify(&self, point: &[f32], k: usize) -> KdResult<Option<i64>> {
        Ok(majority_vote(&self.query(point, k)?))
    }

    /// Writes the index to `path` as json.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> KdResult<()> {
        let file = IndexFile {
            format_version: FORMAT_VERSION,
            table: self.table.clone(),
            points: self.points.clone(),
            labels: self.labels.clone(),
            permutation: self.permutation.clone(),
        };
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &file)?;
        Ok(())
    }

    /// Reads an index written by `save`, validating it before handing it back.
    pub fn load<P: AsRef<Path>>(path: P) -> KdResult<KdIndex<M>> {
        let reader = BufReader::new(File::open(path)?);
        let file: IndexFile<M> = serde_json::from_reader(reader)?;
        if file.format_version != FORMAT_VERSION {
            return Err(KdError::VersionMismatch {
                expected: FORMAT_VERSION,
                found: file.format_version,
            });
        }
        KdIndex::from_parts(file.table, file.points, file.labels, file.permutation)
    }
}
