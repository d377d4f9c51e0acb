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

//! # The Node Record
//! The tree is a flat table of these. A split node names its splitting dimension, the value it cut
//! at, and the row of its left child; the right child always sits in the next row. A leaf reuses
//! the two index fields for the `[start, end)` range it owns in the permuted point storage and
//! marks itself with `LEAF_MARKER` in place of a dimension.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Stored in the dimension field of leaves.
pub const LEAF_MARKER: u32 = u32::MAX;

/// One row of the kd-tree table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KdNode {
    dimension: u32,
    left_index: u32,
    right_index: u32,
    cut_value: f32,
}

/// A decoded view of a `KdNode`, so callers can `match` instead of checking the marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    /// A routing node
    Split {
        /// The coordinate this node splits on
        dimension: usize,
        /// Row of the child holding coordinates `<= cut_value`
        left: usize,
        /// Row of the child holding coordinates `> cut_value`
        right: usize,
        /// The splitting value
        cut_value: f32,
    },
    /// A bucket of points
    Leaf {
        /// First position in the permuted storage
        start: usize,
        /// One past the last position
        end: usize,
    },
}

impl KdNode {
    /// A split on `dimension` whose children are in rows `left_index` and `left_index + 1`.
    pub fn split(dimension: usize, left_index: usize, cut_value: f32) -> KdNode {
        KdNode {
            dimension: dimension as u32,
            left_index: left_index as u32,
            right_index: (left_index + 1) as u32,
            cut_value,
        }
    }

    /// A leaf over the positions `start..end` of the permuted storage.
    pub fn leaf(start: usize, end: usize) -> KdNode {
        KdNode {
            dimension: LEAF_MARKER,
            left_index: start as u32,
            right_index: end as u32,
            cut_value: 0.0,
        }
    }

    /// Fills a reserved row until the builder commits the real node.
    pub(crate) fn placeholder() -> KdNode {
        KdNode::leaf(0, 0)
    }

    /// If the dimension field holds the leaf marker
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.dimension == LEAF_MARKER
    }

    /// The splitting dimension, `None` for leaves
    pub fn dimension(&self) -> Option<usize> {
        if self.is_leaf() {
            None
        } else {
            Some(self.dimension as usize)
        }
    }

    /// The split value. Meaningless for leaves.
    pub fn cut_value(&self) -> f32 {
        self.cut_value
    }

    /// The rows of the left and right child, `None` for leaves
    pub fn children(&self) -> Option<(usize, usize)> {
        if self.is_leaf() {
            None
        } else {
            Some((self.left_index as usize, self.right_index as usize))
        }
    }

    /// The positions this leaf covers, `None` for split nodes
    pub fn range(&self) -> Option<Range<usize>> {
        if self.is_leaf() {
            Some(self.left_index as usize..self.right_index as usize)
        } else {
            None
        }
    }

    /// Decodes the record
    #[inline]
    pub fn kind(&self) -> NodeKind {
        if self.is_leaf() {
            NodeKind::Leaf {
                start: self.left_index as usize,
                end: self.right_index as usize,
            }
        } else {
            NodeKind::Split {
                dimension: self.dimension as usize,
                left: self.left_index as usize,
                right: self.right_index as usize,
                cut_value: self.cut_value,
            }
        }
    }

    /// Shifts the child rows of a split node. Used when a separately built subtree is spliced into
    /// the main table.
    pub(crate) fn offset_children(self, offset: usize) -> KdNode {
        if self.is_leaf() {
            self
        } else {
            KdNode {
                left_index: self.left_index + offset as u32,
                right_index: self.right_index + offset as u32,
                ..self
            }
        }
    }
}
