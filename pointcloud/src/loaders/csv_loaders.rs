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

//! CSV readers for dense data and integer labels.

use csv::{ReaderBuilder, StringRecord};
use log::debug;
use std::path::Path;

use super::open_maybe_gz;
use crate::data_sources::DataRam;
use crate::errors::*;
use crate::label_sources::SmallIntLabels;

fn csv_error<P: AsRef<Path>>(path: P, record: &StringRecord, key: String) -> PointCloudError {
    PointCloudError::ParsingError(ParsingError::CSVReadError {
        file_name: path.as_ref().to_string_lossy().to_string(),
        line_number: record.position().map(|p| p.line() as usize).unwrap_or(0),
        key,
    })
}

/// Reads a headerless CSV of floats into ram, one point per row. Columns listed in `skip` are
/// left out, so a label column can live in the same file.
pub fn ram_from_csv<P: AsRef<Path>, M>(path: P, skip: &[usize]) -> PointCloudResult<DataRam<M>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .from_reader(open_maybe_gz(&path)?);

    let mut data = Vec::new();
    let mut dim: Option<usize> = None;
    for result in rdr.records() {
        let record = result.map_err(|e| {
            PointCloudError::ParsingError(ParsingError::CSVReadError {
                file_name: path.as_ref().to_string_lossy().to_string(),
                line_number: e.position().map(|p| p.line() as usize).unwrap_or(0),
                key: format!("{}", e),
            })
        })?;
        let mut row_dim = 0;
        for (col, field) in record.iter().enumerate() {
            if skip.contains(&col) {
                continue;
            }
            let val = field.trim().parse::<f32>().map_err(|_| {
                csv_error(&path, &record, format!("Unable to read f32 from column {}", col))
            })?;
            data.push(val);
            row_dim += 1;
        }
        match dim {
            None => dim = Some(row_dim),
            Some(d) if d != row_dim => {
                return Err(csv_error(
                    &path,
                    &record,
                    format!("Expected {} values, found {}", d, row_dim),
                ))
            }
            _ => {}
        }
    }
    debug!(
        "Read {} values of dimension {:?} from {:?}",
        data.len(),
        dim,
        path.as_ref()
    );
    DataRam::new(data, dim.unwrap_or(1)).map(|d| d.with_name(path.as_ref().to_string_lossy().to_string()))
}

/// Reads one integer column of a CSV as labels. Empty or missing entries become unlabeled points.
pub fn labels_from_csv<P: AsRef<Path>>(
    path: P,
    index: usize,
    has_headers: bool,
) -> PointCloudResult<SmallIntLabels> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(has_headers)
        .from_reader(open_maybe_gz(&path)?);

    let mut labels = Vec::new();
    let mut mask = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| {
            PointCloudError::ParsingError(ParsingError::CSVReadError {
                file_name: path.as_ref().to_string_lossy().to_string(),
                line_number: e.position().map(|p| p.line() as usize).unwrap_or(0),
                key: format!("{}", e),
            })
        })?;
        match record.get(index).map(|v| v.trim()) {
            Some(val) if !val.is_empty() => {
                let val = val.parse::<i64>().map_err(|_| {
                    csv_error(&path, &record, format!("Unable to read i64 from {:?}", record))
                })?;
                labels.push(val);
                mask.push(true);
            }
            _ => {
                labels.push(0);
                mask.push(false);
            }
        }
    }
    if mask.iter().any(|f| !f) {
        Ok(SmallIntLabels::new(labels, Some(mask)))
    } else {
        Ok(SmallIntLabels::new(labels, None))
    }
}
