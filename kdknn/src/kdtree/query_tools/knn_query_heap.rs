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

//! The bounded heap that collects the k best candidates of a query.

use super::query_items::QuerySingleton;
use super::SingletonQueryHeap;
use std::collections::BinaryHeap;

/// A max-heap that never holds more than `k` candidates, so its top is always the worst accepted
/// one. A candidate is only kept if the heap has room or it beats that top under the
/// `(distance, index)` order.
#[derive(Debug)]
pub struct KnnQueryHeap {
    dist_heap: BinaryHeap<QuerySingleton>,
    k: usize,
}

impl SingletonQueryHeap for KnnQueryHeap {
    fn push_singleton(&mut self, singleton: QuerySingleton) {
        if self.dist_heap.len() < self.k {
            self.dist_heap.push(singleton);
        } else if let Some(mut worst) = self.dist_heap.peek_mut() {
            if singleton < *worst {
                *worst = singleton;
            }
        }
    }
}

impl KnnQueryHeap {
    /// Creates a new KNN heap
    pub fn new(k: usize) -> KnnQueryHeap {
        KnnQueryHeap {
            dist_heap: BinaryHeap::with_capacity(k + 1),
            k,
        }
    }

    /// The current number of candidates
    pub fn len(&self) -> usize {
        self.dist_heap.len()
    }

    /// If no candidate has been accepted yet
    pub fn is_empty(&self) -> bool {
        self.dist_heap.is_empty()
    }

    /// If the heap holds `k` candidates
    pub fn is_full(&self) -> bool {
        self.dist_heap.len() >= self.k
    }

    /// The reduced distance of the worst accepted candidate. If the heap isn't full it returns the
    /// maximum float value.
    pub fn max_dist(&self) -> f32 {
        if self.is_full() {
            self.dist_heap.peek().map(|x| x.dist).unwrap_or(f32::MAX)
        } else {
            f32::MAX
        }
    }

    /// Whether a region whose closest point is `bound` away could still hold a candidate. Equal
    /// distances count, since a smaller index there would still win the tie.
    #[inline]
    pub fn accepts(&self, bound: f32) -> bool {
        match self.dist_heap.peek() {
            Some(worst) if self.is_full() => bound <= worst.dist,
            _ => true,
        }
    }

    /// Unpacks the heap in ascending `(distance, index)` order. This consumes the query heap.
    pub fn unpack(self) -> Vec<QuerySingleton> {
        self.dist_heap.into_sorted_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacking_has_correct_order() {
        let mut heap = KnnQueryHeap::new(4);
        heap.push_outliers(
            [0.8, 0.2, 0.6, 0.1, 0.4, 0.9]
                .iter()
                .enumerate()
                .map(|(i, d)| QuerySingleton::new(*d, i, i)),
        );
        let unpack: Vec<usize> = heap.unpack().iter().map(|s| s.index).collect();
        assert_eq!(unpack, vec![3, 1, 4, 2]);
    }

    #[test]
    fn ties_keep_smaller_index() {
        let mut heap = KnnQueryHeap::new(2);
        heap.push_singleton(QuerySingleton::new(1.0, 7, 0));
        heap.push_singleton(QuerySingleton::new(1.0, 5, 1));
        heap.push_singleton(QuerySingleton::new(1.0, 2, 2));
        heap.push_singleton(QuerySingleton::new(1.0, 9, 3));
        let unpack: Vec<usize> = heap.unpack().iter().map(|s| s.index).collect();
        assert_eq!(unpack, vec![2, 5]);
    }

    #[test]
    fn bounds() {
        let mut heap = KnnQueryHeap::new(2);
        assert!(heap.accepts(100.0));
        assert_eq!(heap.max_dist(), f32::MAX);
        heap.push_singleton(QuerySingleton::new(1.0, 0, 0));
        assert!(heap.accepts(100.0));
        heap.push_singleton(QuerySingleton::new(3.0, 1, 1));
        assert!(heap.is_full());
        assert!(heap.accepts(3.0));
        assert!(!heap.accepts(3.5));
        assert_eq!(heap.max_dist(), 3.0);
    }
}
