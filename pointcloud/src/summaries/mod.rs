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

//! Summaries of the labels under a set of indexes.

use crate::base_traits::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A summary for a small number of categories. Classification problems rarely have more than a
/// handful of classes among `k` neighbors, so a linear scan over a `SmallVec` beats hashing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategorySummary {
    /// Vector of label, count pairs in the order the labels were first seen
    pub items: SmallVec<[(i64, usize); 4]>,
}

impl Default for CategorySummary {
    fn default() -> Self {
        CategorySummary {
            items: SmallVec::new(),
        }
    }
}

impl CategorySummary {
    /// The label with the highest count. Equal counts go to the smallest label, so the result
    /// does not depend on the order the labels were added in.
    pub fn mode(&self) -> Option<i64> {
        self.items
            .iter()
            .fold(None, |best: Option<(i64, usize)>, &(val, count)| match best {
                Some((best_val, best_count))
                    if best_count > count || (best_count == count && best_val < val) =>
                {
                    Some((best_val, best_count))
                }
                _ => Some((val, count)),
            })
            .map(|(val, _)| val)
    }

    /// How many times this label was added
    pub fn get(&self, val: i64) -> usize {
        self.items
            .iter()
            .find(|(stored_val, _)| *stored_val == val)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }
}

impl Summary for CategorySummary {
    type Label = i64;
    fn add(&mut self, val: &i64) {
        match self.items.iter_mut().find(|(stored_val, _)| stored_val == val) {
            Some((_, totals)) => *totals += 1,
            None => self.items.push((*val, 1)),
        }
    }

    fn combine(&mut self, other: &CategorySummary) {
        for (val, count) in other.items.iter() {
            match self.items.iter_mut().find(|(stored_val, _)| stored_val == val) {
                Some((_, totals)) => *totals += count,
                None => self.items.push((*val, *count)),
            }
        }
    }

    fn count(&self) -> usize {
        self.items.iter().map(|(_a, b)| b).sum()
    }
}
