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
use rayon::prelude::*;
use std::cmp::min;
use std::fmt::Debug;

use crate::distances::*;
use crate::errors::*;
use crate::PointIndex;

#[inline]
fn chunk(data_dim: usize) -> usize {
    min(15000 / data_dim.max(1), 20)
}

/// Base trait for a point cloud
pub trait PointCloud: Debug + Send + Sync + 'static {
    /// Underlying metric this point cloud uses
    type Metric: Metric;

    /// The number of samples this cloud covers
    fn len(&self) -> usize;
    /// If this is empty
    fn is_empty(&self) -> bool;
    /// The dimension of the underlying data
    fn dim(&self) -> usize;
    /// Gets a point from this dataset
    fn point(&self, pn: PointIndex) -> PointCloudResult<&[f32]>;

    /// The main distance function. This paralizes if there are enough points to make it worthwhile.
    fn distances_to_point(
        &self,
        point: &[f32],
        indexes: &[PointIndex],
    ) -> PointCloudResult<Vec<f32>> {
        if point.len() != self.dim() {
            return Err(PointCloudError::dimension_mismatch(self.dim(), point.len()));
        }
        let chunk = chunk(self.dim());
        if indexes.len() > chunk * 3 {
            indexes
                .par_iter()
                .with_min_len(chunk)
                .map(|i| self.point(*i).map(|y| Self::Metric::dist(point, y)))
                .collect()
        } else {
            indexes
                .iter()
                .map(|i| self.point(*i).map(|y| Self::Metric::dist(point, y)))
                .collect()
        }
    }
}

/// A summary for labels. You can make this an empty zero sized type for when you don't need it.
pub trait Summary: Debug + Default + Send + Sync + 'static {
    /// Underlying type.
    type Label: ?Sized;
    /// Adding a single value to the summary.
    fn add(&mut self, v: &Self::Label);
    /// Merging several summaries of your data source together. This results in a summary of underlying column over
    /// the union of the indexes used to create the input summaries.
    fn combine(&mut self, other: &Self);
    /// The number of elements this summary covers
    fn count(&self) -> usize;
}

/// A trait for a container that just holds labels. Meant to be used in conjunction with `SimpleLabeledCloud` to be
/// and easy label object.
pub trait LabelSet: Debug + Send + Sync + 'static {
    /// Underlying type.
    type Label: ?Sized;
    /// Number of elements in this label set
    fn len(&self) -> usize;
    /// If there are no elements left in this label set
    fn is_empty(&self) -> bool;
    /// Grabs a label reference. Supports errors (the label could be remote),
    /// and partially labeled datasets with the option.
    fn label(&self, pn: PointIndex) -> PointCloudResult<Option<&Self::Label>>;
}

/// A point cloud that is labeled
pub trait LabeledCloud: PointCloud {
    /// Underlying type.
    type Label: ?Sized;
    /// Grabs a label reference. Supports errors (the label could be remote),
    /// and partially labeled datasets with the option.
    fn label(&self, pn: PointIndex) -> PointCloudResult<Option<&Self::Label>>;
}

/// Simply shoves together a point cloud and a label set, for a modular label system
#[derive(Debug)]
pub struct SimpleLabeledCloud<D: PointCloud, L: LabelSet> {
    data: D,
    labels: L,
}

impl<D: PointCloud, L: LabelSet> SimpleLabeledCloud<D, L> {
    /// Creates a new one
    pub fn new(data: D, labels: L) -> Self {
        SimpleLabeledCloud { data, labels }
    }

    /// The data half
    pub fn data(&self) -> &D {
        &self.data
    }

    /// The label half
    pub fn labels(&self) -> &L {
        &self.labels
    }
}

impl<D: PointCloud, L: LabelSet> PointCloud for SimpleLabeledCloud<D, L> {
    type Metric = D::Metric;

    #[inline]
    fn dim(&self) -> usize {
        self.data.dim()
    }
    #[inline]
    fn len(&self) -> usize {
        self.data.len()
    }
    #[inline]
    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    #[inline]
    fn point(&self, i: PointIndex) -> PointCloudResult<&[f32]> {
        self.data.point(i)
    }
}

impl<D: PointCloud, L: LabelSet> LabeledCloud for SimpleLabeledCloud<D, L> {
    type Label = L::Label;

    fn label(&self, pn: PointIndex) -> PointCloudResult<Option<&Self::Label>> {
        self.labels.label(pn)
    }
}
