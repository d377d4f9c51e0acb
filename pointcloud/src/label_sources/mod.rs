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

//! Label sets that can be glued to a `DataRam` with `SimpleLabeledCloud`.

use crate::base_traits::*;
use crate::errors::*;
use crate::PointIndex;
use serde::{Deserialize, Serialize};

/// Small integer class labels, optionally masked for partially labeled datasets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmallIntLabels {
    labels: Vec<i64>,
    mask: Option<Vec<bool>>,
}

impl SmallIntLabels {
    /// Creates a new label set. A `false` entry in the mask marks that point as unlabeled.
    pub fn new(labels: Vec<i64>, mask: Option<Vec<bool>>) -> SmallIntLabels {
        SmallIntLabels { labels, mask }
    }

    /// Copies the labels of `indexes`, in that order, into a new label set.
    pub fn permuted(&self, indexes: &[PointIndex]) -> PointCloudResult<SmallIntLabels> {
        let labels = indexes
            .iter()
            .map(|i| {
                self.labels
                    .get(*i)
                    .copied()
                    .ok_or_else(|| PointCloudError::data_access(*i, "labels".to_string()))
            })
            .collect::<PointCloudResult<Vec<i64>>>()?;
        let mask = self
            .mask
            .as_ref()
            .map(|m| indexes.iter().map(|i| m.get(*i).copied().unwrap_or(false)).collect());
        Ok(SmallIntLabels { labels, mask })
    }
}

impl LabelSet for SmallIntLabels {
    type Label = i64;

    fn len(&self) -> usize {
        self.labels.len()
    }
    fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
    fn label(&self, pn: PointIndex) -> PointCloudResult<Option<&i64>> {
        if let Some(mask) = &self.mask {
            if !mask.get(pn).copied().unwrap_or(false) {
                return Ok(None);
            }
        }
        Ok(self.labels.get(pn))
    }
}
