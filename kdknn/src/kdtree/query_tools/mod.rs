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

//! Tools and data structures for assisting kd-tree queries.

pub(crate) mod query_items;
pub use query_items::QuerySingleton;

pub(crate) mod knn_query_heap;
pub use knn_query_heap::KnnQueryHeap;

/// If you have an algorithm that does local brute force KNN on the points of a leaf,
/// implement this to use the leaf scan
pub trait SingletonQueryHeap {
    /// Offers a single point to the heap
    fn push_singleton(&mut self, singleton: QuerySingleton);

    /// Offers a bunch of points to the heap
    fn push_outliers<I: IntoIterator<Item = QuerySingleton>>(&mut self, singletons: I) {
        for singleton in singletons {
            self.push_singleton(singleton);
        }
    }
}
