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

//! The errors that can occur when a point cloud is loading, working or saving
use std::error::Error;
use std::fmt;
use std::io;

/// Helper type for a call that could go wrong.
pub type PointCloudResult<T> = Result<T, PointCloudError>;

/// Error type for the Point cloud
#[derive(Debug)]
pub enum PointCloudError {
    /// Unable to retrieve some data point (given by index) in a file (slice name)
    DataAccessError {
        /// Index of access error
        index: usize,
        /// File that had the access error
        slice_name: String,
    },
    /// The flat buffer or a query point does not have the dimension we expected
    DimensionMismatch {
        /// The dimension of the cloud
        expected: usize,
        /// What we were handed
        found: usize,
    },
    /// IO error when opening files
    IoError(io::Error),
    /// Parsing error when loading a CSV file
    ParsingError(ParsingError),
}

impl fmt::Display for PointCloudError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PointCloudError::IoError(ref e) => write!(f, "{}", e),
            PointCloudError::ParsingError(ref e) => write!(f, "{}", e),
            PointCloudError::DataAccessError { index, slice_name } => write!(
                f,
                "there was an issue grabbing data point {} from {}",
                index, slice_name
            ),
            PointCloudError::DimensionMismatch { expected, found } => write!(
                f,
                "expected data of dimension {}, but got {}",
                expected, found
            ),
        }
    }
}

impl Error for PointCloudError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PointCloudError::IoError(ref e) => Some(e),
            PointCloudError::ParsingError(ref e) => Some(e),
            PointCloudError::DataAccessError { .. } => None,
            PointCloudError::DimensionMismatch { .. } => None,
        }
    }
}

impl From<io::Error> for PointCloudError {
    fn from(err: io::Error) -> Self {
        PointCloudError::IoError(err)
    }
}

impl From<ParsingError> for PointCloudError {
    fn from(err: ParsingError) -> Self {
        PointCloudError::ParsingError(err)
    }
}

impl From<PointCloudError> for io::Error {
    fn from(err: PointCloudError) -> Self {
        match err {
            PointCloudError::IoError(e) => e,
            e => io::Error::new(io::ErrorKind::Other, Box::new(e)),
        }
    }
}

impl PointCloudError {
    /// If we can't get an element from a loaded data file, gives the i and filename
    pub fn data_access(index: usize, slice_name: String) -> PointCloudError {
        PointCloudError::DataAccessError { index, slice_name }
    }

    /// The buffer or point handed to us was the wrong width
    pub fn dimension_mismatch(expected: usize, found: usize) -> PointCloudError {
        PointCloudError::DimensionMismatch { expected, found }
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
    /// A needed field was missing from the file.
    MissingYamlError {
        /// The file
        file_name: String,
        /// The missing field
        field: String,
    },
    /// An error reading the CSV
    CSVReadError {
        /// The file that the error occored in
        file_name: String,
        /// The line that was messed up
        line_number: usize,
        /// The column name that was messed up
        key: String,
    },
    /// Something else happened parsing a string
    RegularParsingError(&'static str),
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParsingError::MalformedYamlError { file_name, field } => write!(
                f,
                "there is a error reading the yaml entry {} in {}",
                field, file_name
            ),
            ParsingError::MissingYamlError { file_name, field } => {
                write!(f, "{} is missing the field {}", file_name, field)
            }
            ParsingError::CSVReadError {
                file_name,
                line_number,
                key,
            } => write!(
                f,
                "issue reading a CSV entry in {} on line {}: {}",
                file_name, line_number, key
            ),
            ParsingError::RegularParsingError(s) => write!(f, "Error parsing a string: {}", s),
        }
    }
}

impl Error for ParsingError {}
