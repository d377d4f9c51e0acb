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

//! Ram allocated data.

use crate::base_traits::*;
use crate::distances::*;
use crate::errors::{PointCloudError, PointCloudResult};
use crate::PointIndex;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// A thin wrapper to give a `Vec<f32>` dimensionality. Points are stored row-major, so point `i`
/// is `data[i * dim..(i + 1) * dim]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct DataRam<M = L2> {
    name: String,
    data: Vec<f32>,
    dim: usize,
    #[serde(skip)]
    metric: PhantomData<M>,
}

impl<M> DataRam<M> {
    /// Consumes your buffer and dimension and gives a dimensioned buffer.
    pub fn new(data: Vec<f32>, dim: usize) -> PointCloudResult<DataRam<M>> {
        if dim == 0 || data.len() % dim != 0 {
            return Err(PointCloudError::dimension_mismatch(dim, data.len()));
        }
        Ok(DataRam {
            name: "RAM".to_string(),
            data,
            dim,
            metric: PhantomData,
        })
    }

    /// Gives this dataset a name, used when reporting access errors.
    pub fn with_name(mut self, name: String) -> Self {
        self.name = name;
        self
    }

    /// Copies the rows of `indexes`, in that order, into a new contiguous buffer.
    /// Used to lay the training set out in tree order once construction is done.
    pub fn permuted(&self, indexes: &[PointIndex]) -> PointCloudResult<DataRam<M>> {
        let mut data = Vec::with_capacity(indexes.len() * self.dim);
        for i in indexes {
            match self.data.get(self.dim * i..self.dim * i + self.dim) {
                Some(row) => data.extend_from_slice(row),
                None => return Err(PointCloudError::data_access(*i, self.name.clone())),
            }
        }
        Ok(DataRam {
            name: self.name.clone(),
            data,
            dim: self.dim,
            metric: PhantomData,
        })
    }

    /// Unchecked row access. Panics when `i` is out of range, so only call this with indexes
    /// that came from this cloud.
    #[inline]
    pub fn row(&self, i: PointIndex) -> &[f32] {
        &self.data[self.dim * i..self.dim * i + self.dim]
    }

    /// A single coordinate, same panic rules as `row`
    #[inline]
    pub fn coordinate(&self, i: PointIndex, j: usize) -> f32 {
        self.data[self.dim * i + j]
    }

    /// The flat row-major buffer
    pub fn as_slice(&self) -> &[f32] {
        &self.data[..]
    }
}

impl<M: Metric> DataRam<M> {
    /// Copies any point cloud into ram. The KD-tree builder does this once so that every later
    /// coordinate access is a plain slice index.
    pub fn from_cloud<D: PointCloud<Metric = M>>(cloud: &D) -> PointCloudResult<DataRam<M>> {
        let dim = cloud.dim();
        let mut data = Vec::with_capacity(cloud.len() * dim);
        for i in 0..cloud.len() {
            let point = cloud.point(i)?;
            if point.len() != dim {
                return Err(PointCloudError::dimension_mismatch(dim, point.len()));
            }
            data.extend_from_slice(point);
        }
        DataRam::new(data, dim.max(1))
    }
}

impl<M: Metric> PointCloud for DataRam<M> {
    type Metric = M;

    #[inline]
    fn dim(&self) -> usize {
        self.dim
    }
    #[inline]
    fn len(&self) -> usize {
        self.data.len() / self.dim
    }
    #[inline]
    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    #[inline]
    fn point(&self, i: PointIndex) -> PointCloudResult<&[f32]> {
        match self.data.get(self.dim * i..self.dim * i + self.dim) {
            None => Err(PointCloudError::data_access(i, self.name.clone())),
            Some(x) => Ok(x),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::iter;

    pub fn build_ram_fixed_test(count: usize, data_dim: usize) -> DataRam {
        DataRam::new(
            (0..count)
                .flat_map(|i| iter::repeat(i as f32).take(data_dim))
                .collect(),
            data_dim,
        )
        .unwrap()
    }

    #[test]
    fn point_correct() {
        let pc = build_ram_fixed_test(5, 5);

        let point = pc.point(1).unwrap();
        for d in point.iter() {
            assert_approx_eq!(1.0, d);
        }
        assert!(pc.point(5).is_err());
    }

    #[test]
    fn rejects_ragged_buffers() {
        assert!(DataRam::<L2>::new(vec![0.0; 7], 3).is_err());
        assert!(DataRam::<L2>::new(vec![0.0; 6], 0).is_err());
    }

    #[test]
    fn distance_correct() {
        let pc = build_ram_fixed_test(5, 5);

        let indexes = [1];
        let point = vec![0.0f32; 5];

        let dists = pc.distances_to_point(&point, &indexes).unwrap();
        for d in dists {
            assert_approx_eq!(5.0f32.sqrt(), d);
        }
        assert!(pc.distances_to_point(&[0.0, 0.0], &indexes).is_err());
    }

    #[test]
    fn permutation_reorders_rows() {
        let pc = build_ram_fixed_test(4, 2);
        let permuted = pc.permuted(&[3, 0, 2, 1]).unwrap();
        assert_eq!(permuted.row(0), &[3.0, 3.0]);
        assert_eq!(permuted.row(1), &[0.0, 0.0]);
        assert_eq!(permuted.coordinate(3, 1), 1.0);
        assert!(pc.permuted(&[4]).is_err());
    }
}
