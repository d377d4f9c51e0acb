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

//! Yaml descriptions of a dataset on disk.

use std::fs;
use std::path::Path;
use yaml_rust::{Yaml, YamlLoader};

use super::*;
use crate::base_traits::*;
use crate::data_sources::DataRam;
use crate::distances::Metric;
use crate::errors::*;
use crate::DefaultLabeledCloud;

pub(crate) fn load_yaml<P: AsRef<Path>>(path: P) -> PointCloudResult<Yaml> {
    let config = fs::read_to_string(&path)?;
    let mut docs = YamlLoader::load_from_str(&config).map_err(|e| {
        PointCloudError::ParsingError(ParsingError::MalformedYamlError {
            file_name: path.as_ref().to_string_lossy().to_string(),
            field: format!("{}", e),
        })
    })?;
    if docs.is_empty() {
        return Err(PointCloudError::ParsingError(ParsingError::MissingYamlError {
            file_name: path.as_ref().to_string_lossy().to_string(),
            field: "document".to_string(),
        }));
    }
    Ok(docs.swap_remove(0))
}

fn required_str<'a, P: AsRef<Path>>(
    params: &'a Yaml,
    field: &str,
    path: P,
) -> PointCloudResult<&'a str> {
    params[field].as_str().ok_or_else(|| {
        PointCloudError::ParsingError(ParsingError::MissingYamlError {
            file_name: path.as_ref().to_string_lossy().to_string(),
            field: field.to_string(),
        })
    })
}

fn check_count<P: AsRef<Path>, D: PointCloud>(
    params: &Yaml,
    cloud: &D,
    path: P,
) -> PointCloudResult<()> {
    if let Some(count) = params["count"].as_i64() {
        if count as usize != cloud.len() {
            return Err(PointCloudError::ParsingError(
                ParsingError::MalformedYamlError {
                    file_name: path.as_ref().to_string_lossy().to_string(),
                    field: format!(
                        "count: expected {} points, but the file has {} points at dim {}",
                        count,
                        cloud.len(),
                        cloud.dim()
                    ),
                },
            ));
        }
    }
    Ok(())
}

/// Given a yaml file on disk, it builds a point cloud. Minimal example below.
/// ```yaml
/// ---
/// data_path: DATA_CSV
/// count: NUMBER_OF_DATA_POINTS
/// ```
pub fn ram_from_yaml<P: AsRef<Path>, M: Metric>(path: P) -> PointCloudResult<DataRam<M>> {
    let params = load_yaml(&path)?;
    let data_path = resolve_path(required_str(&params, "data_path", &path)?, path.as_ref());
    let data_set = ram_from_csv(&data_path, &[])?;
    check_count(&params, &data_set, &path)?;
    Ok(data_set)
}

/// Given a yaml file on disk, it builds a labeled point cloud. If the labels path is the data path
/// the label column is dropped from the data.
/// ```yaml
/// ---
/// data_path: DATA_CSV
/// labels_path: LABELS_CSV
/// labels_index: 3
/// labels_header: false
/// count: NUMBER_OF_DATA_POINTS
/// ```
pub fn labeled_ram_from_yaml<P: AsRef<Path>, M: Metric>(
    path: P,
) -> PointCloudResult<DefaultLabeledCloud<M>> {
    let params = load_yaml(&path)?;
    let data_path = resolve_path(required_str(&params, "data_path", &path)?, path.as_ref());
    let labels_path = resolve_path(required_str(&params, "labels_path", &path)?, path.as_ref());
    let labels_index = params["labels_index"].as_i64().unwrap_or(0) as usize;
    let labels_header = params["labels_header"].as_bool().unwrap_or(false);

    let skip: Vec<usize> = if labels_path == data_path {
        vec![labels_index]
    } else {
        vec![]
    };
    let data_set = ram_from_csv(&data_path, &skip)?;
    let label_set = labels_from_csv(&labels_path, labels_index, labels_header)?;
    if label_set.len() != data_set.len() {
        return Err(PointCloudError::ParsingError(
            ParsingError::MalformedYamlError {
                file_name: path.as_ref().to_string_lossy().to_string(),
                field: format!(
                    "labels_path: {} labels for {} points",
                    label_set.len(),
                    data_set.len()
                ),
            },
        ));
    }
    check_count(&params, &data_set, &path)?;
    Ok(SimpleLabeledCloud::new(data_set, label_set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distances::L2;
    use std::fs::File;
    use std::io::Write;
    use tempdir::TempDir;

    #[test]
    fn labeled_yaml_with_shared_file() {
        let dir = TempDir::new("pointcloud_yaml").unwrap();
        let mut file = File::create(dir.path().join("points.csv")).unwrap();
        writeln!(file, "0.0,0.0,1").unwrap();
        writeln!(file, "1.0,0.5,2").unwrap();
        drop(file);
        let yaml_path = dir.path().join("data.yml");
        let mut yaml = File::create(&yaml_path).unwrap();
        writeln!(yaml, "---").unwrap();
        writeln!(yaml, "data_path: points.csv").unwrap();
        writeln!(yaml, "labels_path: points.csv").unwrap();
        writeln!(yaml, "labels_index: 2").unwrap();
        writeln!(yaml, "count: 2").unwrap();
        drop(yaml);

        let cloud = labeled_ram_from_yaml::<_, L2>(&yaml_path).unwrap();
        assert_eq!(cloud.dim(), 2);
        assert_eq!(cloud.label(1).unwrap(), Some(&2));
    }

    #[test]
    fn wrong_count_is_an_error() {
        let dir = TempDir::new("pointcloud_yaml").unwrap();
        let mut file = File::create(dir.path().join("points.csv")).unwrap();
        writeln!(file, "0.0,0.0").unwrap();
        drop(file);
        let yaml_path = dir.path().join("data.yml");
        let mut yaml = File::create(&yaml_path).unwrap();
        writeln!(yaml, "data_path: points.csv").unwrap();
        writeln!(yaml, "count: 5").unwrap();
        drop(yaml);

        assert!(ram_from_yaml::<_, L2>(&yaml_path).is_err());
    }

    #[test]
    fn missing_field_is_an_error() {
        let dir = TempDir::new("pointcloud_yaml").unwrap();
        let yaml_path = dir.path().join("data.yml");
        let mut yaml = File::create(&yaml_path).unwrap();
        writeln!(yaml, "count: 5").unwrap();
        drop(yaml);

        match ram_from_yaml::<_, L2>(&yaml_path) {
            Err(PointCloudError::ParsingError(ParsingError::MissingYamlError { field, .. })) => {
                assert_eq!(field, "data_path")
            }
            other => panic!("expected a missing field, got {:?}", other),
        }
    }
}
