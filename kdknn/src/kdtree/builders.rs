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

//! # Construction
//!
//! The tree is built in two phases. While ranges are large the builder works breadth first: every
//! node of a layer is split at once with rayon, each worker owning a disjoint slice of the
//! permutation, and the results are committed in layer order so each split reserves two adjacent
//! rows for its children. Once ranges are small enough (or the layer gets too wide, or too deep)
//! each pending range is finished by its own task with an explicit work stack and exact medians.
//! Finished subtrees come back over a channel and are spliced into the table ordered by the row
//! reserved for them, so the layout does not depend on which task finished first.

use super::bounds::BoundingBox;
use super::dimension::select_dimension;
use super::median::{approximate_median, choose_cut, exact_median};
use super::node::KdNode;
use super::partition::{parallel_partition, partition};
use super::tree::{KdIndex, KdTreeTable};
use crate::errors::*;
use crossbeam_channel::unbounded;
use log::{debug, info, warn};
use pointcloud::data_sources::DataRam;
use pointcloud::label_sources::SmallIntLabels;
use pointcloud::{LabelSet, LabeledCloud, Metric, PointCloud, PointIndex};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::fs::read_to_string;
use std::mem;
use std::path::Path;
use std::time::Instant;
use yaml_rust::{Yaml, YamlLoader};

/// Largest number of points one index can hold. Node rows and leaf bounds are stored as `u32`
/// and a tree over `n` points has up to `2n - 1` rows, all below `LEAF_MARKER`.
pub const MAX_POINTS: usize = (u32::MAX / 2) as usize;

/// A pending range of the permutation and the row reserved for the node that will cover it.
#[derive(Debug, Clone, Copy)]
struct BuilderNode {
    slot: usize,
    start: usize,
    end: usize,
    depth: usize,
}

impl BuilderNode {
    #[inline]
    fn len(&self) -> usize {
        self.end - self.start
    }

    fn children(&self, left_slot: usize, left_count: usize) -> (BuilderNode, BuilderNode) {
        let mid = self.start + left_count;
        (
            BuilderNode {
                slot: left_slot,
                start: self.start,
                end: mid,
                depth: self.depth + 1,
            },
            BuilderNode {
                slot: left_slot + 1,
                start: mid,
                end: self.end,
                depth: self.depth + 1,
            },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum NodeSplit {
    Leaf,
    Split {
        dimension: usize,
        cut_value: f32,
        left_count: usize,
    },
}

/// A serially built subtree. Row 0 is its root and goes into `slot` of the main table.
#[derive(Debug)]
struct Subtree {
    slot: usize,
    nodes: Vec<KdNode>,
    depth: usize,
}

struct BuildParameters<'a, M> {
    points: &'a DataRam<M>,
    leaf_capacity: usize,
    max_depth: usize,
    serial_threshold: usize,
    rng_seed: Option<u64>,
}

fn mix(start: usize, end: usize, depth: usize) -> u64 {
    let mut h = (start as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    h ^= (end as u64).rotate_left(21).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= (depth as u64).rotate_left(42).wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}

impl<'a, M: Metric> BuildParameters<'a, M> {
    fn node_rng(&self, node: &BuilderNode) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed ^ mix(node.start, node.end, node.depth)),
            None => SmallRng::from_entropy(),
        }
    }

    /// Decides what the node over `indexes` is, partitioning them if it is a split.
    fn split(&self, node: &BuilderNode, indexes: &mut [PointIndex], buffer: &mut Vec<f32>) -> NodeSplit {
        if indexes.len() <= self.leaf_capacity {
            return NodeSplit::Leaf;
        }
        if node.depth >= self.max_depth {
            warn!(
                "Hit the maximum depth {}, leaving {} points in a leaf",
                self.max_depth,
                indexes.len()
            );
            return NodeSplit::Leaf;
        }
        let bbox = match BoundingBox::compute(self.points, indexes) {
            Some(bbox) => bbox,
            None => return NodeSplit::Leaf,
        };
        if bbox.is_degenerate() {
            warn!(
                "{} identical points at depth {}, leaving them in one leaf",
                indexes.len(),
                node.depth
            );
            return NodeSplit::Leaf;
        }
        let mut rng = self.node_rng(node);
        let dimension = match select_dimension(self.points, indexes, &bbox, node.depth, &mut rng) {
            Some(dimension) => dimension,
            None => {
                warn!(
                    "No dimension of {} points at depth {} can be cut, leaving them in one leaf",
                    indexes.len(),
                    node.depth
                );
                return NodeSplit::Leaf;
            }
        };
        let lo = bbox.lower(dimension);
        let hi = bbox.upper(dimension);

        let large = indexes.len() > self.serial_threshold;
        let estimate = if large {
            approximate_median(self.points, indexes, dimension, lo, hi, &mut rng)
        } else {
            exact_median(self.points, indexes, dimension, buffer)
        };
        let cut_value = choose_cut(estimate, lo, hi);
        let left_count = if large {
            parallel_partition(self.points, indexes, dimension, cut_value)
        } else {
            partition(self.points, indexes, dimension, cut_value)
        };
        if left_count == 0 || left_count == indexes.len() {
            warn!(
                "Cut {} on dimension {} left one side empty, leaving {} points in a leaf",
                cut_value,
                dimension,
                indexes.len()
            );
            return NodeSplit::Leaf;
        }
        NodeSplit::Split {
            dimension,
            cut_value,
            left_count,
        }
    }

    /// Builds the subtree under `root` depth first. `indexes` is exactly the root's range.
    fn build_subtree(&self, root: BuilderNode, indexes: &mut [PointIndex]) -> Subtree {
        let base = root.start;
        let mut nodes = vec![KdNode::placeholder()];
        let mut depth = root.depth;
        let mut buffer = Vec::new();
        let mut stack = vec![BuilderNode { slot: 0, ..root }];
        while let Some(node) = stack.pop() {
            depth = depth.max(node.depth);
            let range = &mut indexes[node.start - base..node.end - base];
            match self.split(&node, range, &mut buffer) {
                NodeSplit::Leaf => nodes[node.slot] = KdNode::leaf(node.start, node.end),
                NodeSplit::Split {
                    dimension,
                    cut_value,
                    left_count,
                } => {
                    let left_slot = nodes.len();
                    nodes.push(KdNode::placeholder());
                    nodes.push(KdNode::placeholder());
                    nodes[node.slot] = KdNode::split(dimension, left_slot, cut_value);
                    let (left, right) = node.children(left_slot, left_count);
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        Subtree {
            slot: root.slot,
            nodes,
            depth,
        }
    }
}

/// Hands each node of a layer the slice of the permutation it owns. The layer has to be sorted by
/// `start` with disjoint ranges, which is how the breadth first loop produces it.
fn carve(permutation: &mut [PointIndex], layer: Vec<BuilderNode>) -> Vec<(BuilderNode, &mut [PointIndex])> {
    let mut rest = permutation;
    let mut offset = 0;
    let mut carved = Vec::with_capacity(layer.len());
    for node in layer {
        let tail = mem::take(&mut rest);
        let (_, tail) = tail.split_at_mut(node.start - offset);
        let (mine, tail) = tail.split_at_mut(node.len());
        rest = tail;
        offset = node.end;
        carved.push((node, mine));
    }
    carved
}

/// A construction object for a kd-tree.
#[derive(Debug, Clone)]
pub struct KdTreeBuilder {
    pub(crate) leaf_capacity: usize,
    pub(crate) max_depth: usize,
    pub(crate) parallel_depth: usize,
    pub(crate) serial_threshold: usize,
    pub(crate) rng_seed: Option<u64>,
}

impl Default for KdTreeBuilder {
    fn default() -> KdTreeBuilder {
        KdTreeBuilder {
            leaf_capacity: 16,
            max_depth: 64,
            parallel_depth: 8,
            serial_threshold: 1 << 15,
            rng_seed: None,
        }
    }
}

fn read_usize(params: &Yaml, key: &'static str, default: usize) -> KdResult<usize> {
    match params[key] {
        Yaml::BadValue | Yaml::Null => Ok(default),
        Yaml::Integer(i) if i >= 0 => Ok(i as usize),
        ref other => Err(KdError::invalid_parameter(
            key,
            format!("expected a non-negative integer, found {:?}", other),
        )),
    }
}

impl KdTreeBuilder {
    /// Creates a new builder with sensible defaults.
    pub fn new() -> KdTreeBuilder {
        KdTreeBuilder::default()
    }

    /// Reads the builder parameters from a yaml file. Missing keys keep their defaults.
    ///
    /// ```yaml
    /// leaf_capacity: 16
    /// max_depth: 64
    /// parallel_depth: 8
    /// serial_threshold: 32768
    /// rng_seed: 0
    /// ```
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> KdResult<KdTreeBuilder> {
        let config = read_to_string(&path)?;
        let params_files = YamlLoader::load_from_str(&config).map_err(|e| {
            KdError::ParsingError(ParsingError::MalformedYamlError {
                file_name: path.as_ref().to_string_lossy().to_string(),
                field: e.to_string(),
            })
        })?;
        let defaults = KdTreeBuilder::default();
        let params = match params_files.get(0) {
            Some(params) => params,
            None => return Ok(defaults),
        };
        let rng_seed = match params["rng_seed"] {
            Yaml::Integer(i) => Some(i as u64),
            Yaml::BadValue | Yaml::Null => None,
            ref other => {
                return Err(KdError::invalid_parameter(
                    "rng_seed",
                    format!("expected an integer, found {:?}", other),
                ))
            }
        };
        Ok(KdTreeBuilder {
            leaf_capacity: read_usize(params, "leaf_capacity", defaults.leaf_capacity)?,
            max_depth: read_usize(params, "max_depth", defaults.max_depth)?,
            parallel_depth: read_usize(params, "parallel_depth", defaults.parallel_depth)?,
            serial_threshold: read_usize(params, "serial_threshold", defaults.serial_threshold)?,
            rng_seed,
        })
    }

    /// The most points a leaf may hold before the builder tries to split it. Must be at least 1.
    pub fn set_leaf_capacity(&mut self, x: usize) -> &mut Self {
        self.leaf_capacity = x;
        self
    }
    /// Nodes at this depth become leaves no matter how many points they hold.
    pub fn set_max_depth(&mut self, x: usize) -> &mut Self {
        self.max_depth = x;
        self
    }
    /// The deepest layer that is split breadth first.
    pub fn set_parallel_depth(&mut self, x: usize) -> &mut Self {
        self.parallel_depth = x;
        self
    }
    /// Ranges at most this long are finished serially with exact medians.
    pub fn set_serial_threshold(&mut self, x: usize) -> &mut Self {
        self.serial_threshold = x;
        self
    }
    /// Seeds the per node random number generators. Without a seed they draw from the OS.
    pub fn set_rng_seed(&mut self, x: u64) -> &mut Self {
        self.rng_seed = Some(x);
        self
    }

    /// Builds an unlabeled index over any point cloud. The points are copied into ram.
    pub fn build<D: PointCloud>(&self, point_cloud: &D) -> KdResult<KdIndex<D::Metric>> {
        self.check_cloud(point_cloud)?;
        let points = DataRam::from_cloud(point_cloud)?;
        self.build_from_parts(points, None)
    }

    /// Builds an index over a labeled cloud. Unlabeled points are kept and masked out of votes.
    pub fn build_labeled<D: LabeledCloud<Label = i64>>(
        &self,
        point_cloud: &D,
    ) -> KdResult<KdIndex<D::Metric>> {
        self.check_cloud(point_cloud)?;
        let mut labels = Vec::with_capacity(point_cloud.len());
        let mut mask = Vec::with_capacity(point_cloud.len());
        for i in 0..point_cloud.len() {
            match point_cloud.label(i)? {
                Some(label) => {
                    labels.push(*label);
                    mask.push(true);
                }
                None => {
                    labels.push(0);
                    mask.push(false);
                }
            }
        }
        let mask = if mask.iter().all(|m| *m) {
            None
        } else {
            Some(mask)
        };
        let points = DataRam::from_cloud(point_cloud)?;
        self.build_from_parts(points, Some(SmallIntLabels::new(labels, mask)))
    }

    fn check_cloud<D: PointCloud>(&self, point_cloud: &D) -> KdResult<()> {
        if point_cloud.is_empty() {
            return Err(KdError::EmptyPointSet);
        }
        if point_cloud.dim() == 0 {
            return Err(KdError::invalid_parameter("dim", "points need at least one coordinate"));
        }
        Ok(())
    }

    /// Builds an index over points already in ram, with optional labels in the same order.
    pub fn build_from_parts<M: Metric>(
        &self,
        points: DataRam<M>,
        labels: Option<SmallIntLabels>,
    ) -> KdResult<KdIndex<M>> {
        if points.is_empty() {
            return Err(KdError::EmptyPointSet);
        }
        if self.leaf_capacity == 0 {
            return Err(KdError::invalid_parameter("leaf_capacity", "must be at least 1"));
        }
        if points.len() > MAX_POINTS {
            return Err(KdError::invalid_parameter(
                "points",
                format!("at most {} points can be indexed", MAX_POINTS),
            ));
        }
        if let Some(labels) = &labels {
            if labels.len() != points.len() {
                return Err(KdError::LabelCountMismatch {
                    points: points.len(),
                    labels: labels.len(),
                });
            }
        }

        let start = Instant::now();
        info!(
            "Building a kd-tree over {} points of dimension {}",
            points.len(),
            points.dim()
        );
        let mut permutation: Vec<PointIndex> = (0..points.len()).collect();
        let table = self.build_table(&points, &mut permutation);
        info!(
            "Built a kd-tree with {} nodes, {} leaves and depth {} in {:?}",
            table.len(),
            table.leaf_count(),
            table.depth(),
            start.elapsed()
        );

        let points = points.permuted(&permutation)?;
        let labels = match labels {
            Some(labels) => Some(labels.permuted(&permutation)?),
            None => None,
        };
        KdIndex::from_parts(table, points, labels, permutation)
    }

    fn build_table<M: Metric>(&self, points: &DataRam<M>, permutation: &mut [PointIndex]) -> KdTreeTable {
        let params = BuildParameters {
            points,
            leaf_capacity: self.leaf_capacity,
            max_depth: self.max_depth,
            serial_threshold: self.serial_threshold,
            rng_seed: self.rng_seed,
        };
        let params = &params;
        let budget = 4 * rayon::current_num_threads();

        let mut nodes = vec![KdNode::placeholder()];
        let mut depth = 0;
        let mut layer = vec![BuilderNode {
            slot: 0,
            start: 0,
            end: permutation.len(),
            depth: 0,
        }];
        while !layer.is_empty()
            && layer[0].depth < self.parallel_depth
            && layer.len() <= budget
            && layer.iter().any(|node| node.len() > self.serial_threshold)
        {
            let layer_depth = layer[0].depth;
            let splits: Vec<(BuilderNode, NodeSplit)> = carve(permutation, layer)
                .into_par_iter()
                .map(|(node, indexes)| {
                    let mut buffer = Vec::new();
                    let split = params.split(&node, indexes, &mut buffer);
                    (node, split)
                })
                .collect();

            let mut next = Vec::with_capacity(2 * splits.len());
            for (node, split) in splits {
                depth = depth.max(node.depth);
                match split {
                    NodeSplit::Leaf => nodes[node.slot] = KdNode::leaf(node.start, node.end),
                    NodeSplit::Split {
                        dimension,
                        cut_value,
                        left_count,
                    } => {
                        let left_slot = nodes.len();
                        nodes.push(KdNode::placeholder());
                        nodes.push(KdNode::placeholder());
                        nodes[node.slot] = KdNode::split(dimension, left_slot, cut_value);
                        let (left, right) = node.children(left_slot, left_count);
                        next.push(left);
                        next.push(right);
                    }
                }
            }
            debug!(
                "Committed layer {}, {} nodes written, {} ranges pending",
                layer_depth,
                nodes.len(),
                next.len()
            );
            layer = next;
        }
        let boundary = nodes.len();
        debug!(
            "Breadth first phase done at {} nodes, finishing {} subtrees serially",
            boundary,
            layer.len()
        );

        let (sender, receiver) = unbounded();
        rayon::scope(|s| {
            for (node, indexes) in carve(permutation, layer) {
                let sender = sender.clone();
                s.spawn(move |_| {
                    let subtree = params.build_subtree(node, indexes);
                    let sent = sender.send(subtree);
                    debug_assert!(sent.is_ok(), "the receiver outlives the scope");
                });
            }
        });
        drop(sender);

        let mut subtrees: Vec<Subtree> = receiver.iter().collect();
        subtrees.sort_by_key(|subtree| subtree.slot);
        for subtree in subtrees {
            depth = depth.max(subtree.depth);
            let offset = nodes.len() - 1;
            let mut rows = subtree
                .nodes
                .into_iter()
                .map(|node| node.offset_children(offset));
            if let Some(root) = rows.next() {
                nodes[subtree.slot] = root;
            }
            nodes.extend(rows);
        }

        KdTreeTable {
            nodes,
            root: 0,
            boundary,
            depth,
            dim: points.dim(),
            point_count: permutation.len(),
        }
    }
}
