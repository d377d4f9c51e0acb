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

//! Turns a neighbor list into a prediction.

use pointcloud::summaries::CategorySummary;
use pointcloud::{PointIndex, Summary};
use serde::{Deserialize, Serialize};

/// A single query result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Index of the point in the data the index was built from
    pub index: PointIndex,
    /// Distance to the query under the index's metric
    pub distance: f32,
    /// Label of the point, if the index was built with labels and this one isn't masked
    pub label: Option<i64>,
}

/// Counts the labels present among the neighbors.
pub fn label_summary(neighbors: &[Neighbor]) -> CategorySummary {
    let mut summary = CategorySummary::default();
    for label in neighbors.iter().filter_map(|n| n.label.as_ref()) {
        summary.add(label);
    }
    summary
}

/// The most common label among the neighbors, smallest label on ties. Unlabeled neighbors don't
/// vote, and `None` comes back if nobody voted.
pub fn majority_vote(neighbors: &[Neighbor]) -> Option<i64> {
    label_summary(neighbors).mode()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbors(labels: &[Option<i64>]) -> Vec<Neighbor> {
        labels
            .iter()
            .enumerate()
            .map(|(i, label)| Neighbor {
                index: i,
                distance: i as f32,
                label: *label,
            })
            .collect()
    }

    #[test]
    fn majority_wins() {
        assert_eq!(
            majority_vote(&neighbors(&[Some(2), Some(1), Some(2)])),
            Some(2)
        );
    }

    #[test]
    fn ties_go_to_smallest_label() {
        assert_eq!(
            majority_vote(&neighbors(&[Some(4), Some(3), Some(4), Some(3)])),
            Some(3)
        );
    }

    #[test]
    fn unlabeled_neighbors_abstain() {
        assert_eq!(majority_vote(&neighbors(&[None, Some(5), None])), Some(5));
        assert_eq!(majority_vote(&neighbors(&[None, None])), None);
        assert_eq!(majority_vote(&[]), None);
        assert_eq!(label_summary(&neighbors(&[None, Some(5), Some(5)])).get(5), 2);
    }
}
