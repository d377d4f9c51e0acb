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

//! The errors that can occor when a kd-tree is building, being queried, loading or saving.
//! Data access errors are floated up from `PointCloud` as that's the i/o layer.

use pointcloud::errors::PointCloudError;
use std::error::Error;
use std::fmt;
use std::io;

/// Helper type for a call that could go wrong.
pub type KdResult<T> = Result<T, KdError>;

/// Error type for the kd-tree. Input errors are reported before any work is done, integrity errors
/// mean the node table can't be trusted and nothing it returned should be used.
#[derive(Debug)]
pub enum KdError {
    /// Unable to retrieve some data point, or the point cloud was malformed
    PointCloudError(PointCloudError),
    /// IO error when opening files
    IoError(io::Error),
    /// Parsing error when loading a config or a saved index
    ParsingError(ParsingError),
    /// Tried to build a tree over no points
    EmptyPointSet,
    /// A builder parameter is outside of the range it can work with
    InvalidParameter {
        /// Name of the parameter
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },
    /// Asked for zero neighbors
    ZeroK,
    /// Asked for more neighbors than there are points in the index
    KTooLarge {
        /// The requested number of neighbors
        k: usize,
        /// The number of indexed points
        len: usize,
    },
    /// The query point doesn't have the dimension of the indexed points
    DimensionMismatch {
        /// Dimension of the index
        expected: usize,
        /// Dimension of the query
        found: usize,
    },
    /// There isn't exactly one label per point
    LabelCountMismatch {
        /// Number of points
        points: usize,
        /// Number of labels
        labels: usize,
    },
    /// The node table references something out of bounds or isn't a tree
    MalformedTree(String),
    /// A saved index was written by an incompatible version of this library
    VersionMismatch {
        /// The version this library reads
        expected: u32,
        /// The version in the file
        found: u32,
    },
}

impl fmt::Display for KdError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            KdError::IoError(ref e) => write!(f, "{}", e),
            KdError::ParsingError(ref e) => write!(f, "{}", e),
            KdError::PointCloudError(ref e) => write!(f, "{}", e),
            KdError::EmptyPointSet => write!(f, "cannot build a kd-tree over an empty point set"),
            KdError::InvalidParameter {
                ref name,
                ref reason,
            } => write!(f, "invalid value for {}: {}", name, reason),
            KdError::ZeroK => write!(f, "asked for zero nearest neighbors"),
            KdError::KTooLarge { k, len } => write!(
                f,
                "asked for {} nearest neighbors but the index only has {} points",
                k, len
            ),
            KdError::DimensionMismatch { expected, found } => write!(
                f,
                "the index has dimension {}, the query point has dimension {}",
                expected, found
            ),
            KdError::LabelCountMismatch { points, labels } => {
                write!(f, "got {} labels for {} points", labels, points)
            }
            KdError::MalformedTree(ref msg) => write!(f, "malformed kd-tree: {}", msg),
            KdError::VersionMismatch { expected, found } => write!(
                f,
                "saved index has format version {}, this library reads version {}",
                found, expected
            ),
        }
    }
}

impl Error for KdError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            KdError::IoError(ref e) => Some(e),
            KdError::ParsingError(ref e) => Some(e),
            KdError::PointCloudError(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<PointCloudError> for KdError {
    fn from(err: PointCloudError) -> Self {
        KdError::PointCloudError(err)
    }
}

impl From<io::Error> for KdError {
    fn from(err: io::Error) -> Self {
        KdError::IoError(err)
    }
}

impl From<serde_json::Error> for KdError {
    fn from(err: serde_json::Error) -> Self {
        KdError::ParsingError(ParsingError::SerdeError(err))
    }
}

impl KdError {
    pub(crate) fn malformed<S: Into<String>>(msg: S) -> KdError {
        KdError::MalformedTree(msg.into())
    }

    pub(crate) fn invalid_parameter<S: Into<String>>(name: &'static str, reason: S) -> KdError {
        KdError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// A parsing error occored while doing something with text
#[derive(Debug)]
pub enum ParsingError {
    /// Yaml was messed up
    MalformedYamlError {
        /// The file that was messed up
        file_name: String,
        /// The value that was messed up
        field: String,
    },
    /// A saved index didn't decode
    SerdeError(serde_json::Error),
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParsingError::SerdeError(ref e) => write!(f, "{}", e),
            ParsingError::MalformedYamlError {
                ref file_name,
                ref field,
            } => write!(f, "there is a error reading {} in {}", field, file_name),
        }
    }
}

impl Error for ParsingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            ParsingError::SerdeError(ref e) => Some(e),
            ParsingError::MalformedYamlError { .. } => None,
        }
    }
}
