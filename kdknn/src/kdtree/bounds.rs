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

//! Axis aligned bounding boxes over a range of the permutation.

use pointcloud::data_sources::DataRam;
use pointcloud::{Metric, PointIndex};
use rayon::prelude::*;

/// Ranges at least this long are scanned in parallel
pub const BOUNDS_PARALLEL_THRESHOLD: usize = 1 << 15;
const BOUNDS_CHUNK: usize = 1 << 13;

/// Per dimension lower and upper coordinate of a set of points.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    lower: Vec<f32>,
    upper: Vec<f32>,
}

impl BoundingBox {
    /// The box of a single point.
    pub fn from_point(point: &[f32]) -> BoundingBox {
        BoundingBox {
            lower: point.to_vec(),
            upper: point.to_vec(),
        }
    }

    /// Scans the points under `indexes` once. Returns `None` for an empty range.
    pub fn compute<M: Metric>(points: &DataRam<M>, indexes: &[PointIndex]) -> Option<BoundingBox> {
        if indexes.len() >= BOUNDS_PARALLEL_THRESHOLD {
            indexes
                .par_chunks(BOUNDS_CHUNK)
                .filter_map(|chunk| BoundingBox::compute_serial(points, chunk))
                .reduce_with(|mut a, b| {
                    a.merge(&b);
                    a
                })
        } else {
            BoundingBox::compute_serial(points, indexes)
        }
    }

    fn compute_serial<M>(points: &DataRam<M>, indexes: &[PointIndex]) -> Option<BoundingBox> {
        let (first, rest) = indexes.split_first()?;
        let mut bbox = BoundingBox::from_point(points.row(*first));
        for i in rest {
            bbox.add_point(points.row(*i));
        }
        Some(bbox)
    }

    /// Grows the box to contain `point`
    #[inline]
    pub fn add_point(&mut self, point: &[f32]) {
        for ((lo, hi), x) in self.lower.iter_mut().zip(self.upper.iter_mut()).zip(point) {
            if *x < *lo {
                *lo = *x;
            }
            if *x > *hi {
                *hi = *x;
            }
        }
    }

    /// Element-wise union with another box of the same dimension
    pub fn merge(&mut self, other: &BoundingBox) {
        for (lo, o) in self.lower.iter_mut().zip(&other.lower) {
            *lo = lo.min(*o);
        }
        for (hi, o) in self.upper.iter_mut().zip(&other.upper) {
            *hi = hi.max(*o);
        }
    }

    /// Dimension of the box
    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    /// Smallest coordinate along `j`
    #[inline]
    pub fn lower(&self, j: usize) -> f32 {
        self.lower[j]
    }

    /// Largest coordinate along `j`
    #[inline]
    pub fn upper(&self, j: usize) -> f32 {
        self.upper[j]
    }

    /// `upper(j) - lower(j)`
    #[inline]
    pub fn extent(&self, j: usize) -> f32 {
        self.upper[j] - self.lower[j]
    }

    /// True when every point in the box is the same point.
    pub fn is_degenerate(&self) -> bool {
        self.lower.iter().zip(&self.upper).all(|(lo, hi)| lo >= hi)
    }

    /// The dimension with the largest extent, ties go to the lower dimension.
    #[cfg(test)]
    pub fn widest_dimension(&self) -> usize {
        let mut widest = 0;
        for j in 1..self.dim() {
            if self.extent(j) > self.extent(widest) {
                widest = j;
            }
        }
        widest
    }

    /// If the point is inside the box, boundary included
    #[cfg(test)]
    pub fn contains(&self, point: &[f32]) -> bool {
        self.lower
            .iter()
            .zip(&self.upper)
            .zip(point)
            .all(|((lo, hi), x)| lo <= x && x <= hi)
    }

    /// Reduced distance from `point` to the closest point of the box.
    #[cfg(test)]
    pub fn min_rdist<M: Metric>(&self, point: &[f32]) -> f32 {
        let closest: Vec<f32> = self
            .lower
            .iter()
            .zip(&self.upper)
            .zip(point)
            .map(|((lo, hi), x)| x.max(*lo).min(*hi))
            .collect();
        M::rdist(point, &closest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointcloud::L2;

    fn grid() -> DataRam<L2> {
        DataRam::new(
            vec![0.0, 5.0, 1.0, -2.0, 3.0, 5.0, -1.0, 0.5, 2.0, 2.0],
            2,
        )
        .unwrap()
    }

    #[test]
    fn compute_covers_range() {
        let points = grid();
        let bbox = BoundingBox::compute(&points, &[0, 1, 2, 3, 4]).unwrap();
        assert_eq!(bbox.lower(0), -1.0);
        assert_eq!(bbox.upper(0), 3.0);
        assert_eq!(bbox.lower(1), -2.0);
        assert_eq!(bbox.upper(1), 5.0);
        assert_eq!(bbox.widest_dimension(), 1);
        for i in 0..5 {
            assert!(bbox.contains(points.row(i)));
        }
    }

    #[test]
    fn subrange_only() {
        let points = grid();
        let bbox = BoundingBox::compute(&points, &[1, 3]).unwrap();
        assert_eq!(bbox.lower(0), -1.0);
        assert_eq!(bbox.upper(0), 1.0);
        assert_approx_eq!(bbox.extent(1), 2.5);
    }

    #[test]
    fn empty_range_has_no_box() {
        let points = grid();
        assert!(BoundingBox::compute(&points, &[]).is_none());
    }

    #[test]
    fn parallel_matches_serial() {
        let count = BOUNDS_PARALLEL_THRESHOLD + 17;
        let data: Vec<f32> = (0..count * 3)
            .map(|i| ((i * 7919) % 1013) as f32 - 500.0)
            .collect();
        let points = DataRam::<L2>::new(data, 3).unwrap();
        let indexes: Vec<usize> = (0..count).collect();
        let parallel = BoundingBox::compute(&points, &indexes).unwrap();
        let serial = BoundingBox::compute_serial(&points, &indexes).unwrap();
        assert_eq!(parallel, serial);
    }

    #[test]
    fn min_rdist_is_zero_inside() {
        let points = grid();
        let bbox = BoundingBox::compute(&points, &[0, 1, 2, 3, 4]).unwrap();
        assert_eq!(bbox.min_rdist::<L2>(&[0.0, 0.0]), 0.0);
        assert_approx_eq!(bbox.min_rdist::<L2>(&[5.0, 0.0]), 4.0);
    }

    #[test]
    fn identical_points_are_degenerate() {
        let points = DataRam::<L2>::new(vec![1.0, 1.0, 1.0, 1.0], 2).unwrap();
        let bbox = BoundingBox::compute(&points, &[0, 1]).unwrap();
        assert!(bbox.is_degenerate());
    }
}
