//! Centralized error handling for h5_extract
//!
//! Every fallible operation in the crate returns [`Result`], so callers see one
//! error type whether the failure came from HDF5, the output file, or a bad
//! configuration value.

use std::fmt;

/// Main error type for extraction operations
#[derive(Debug)]
pub enum ExtractError {
    /// HDF5 library errors (open, read, type conversion)
    Hdf5Error(hdf5::Error),

    /// Dataset path not present in the store
    DatasetNotFound { path: String },

    /// Dataset is not a usable two-dimensional matrix
    InvalidShape { message: String },

    /// Failure writing the output text file or its manifest
    IoWrite(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// Option value outside its accepted range
    InvalidConfig { message: String },

    /// Malformed JSON configuration file
    ConfigParse(serde_json::Error),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::Hdf5Error(e) => write!(f, "HDF5 error: {}", e),
            ExtractError::DatasetNotFound { path } => {
                write!(f, "Dataset '{}' not found in file", path)
            }
            ExtractError::InvalidShape { message } => write!(f, "Invalid shape: {}", message),
            ExtractError::IoWrite(e) => write!(f, "Write error: {}", e),
            ExtractError::ArrayError(e) => write!(f, "Array error: {}", e),
            ExtractError::InvalidConfig { message } => {
                write!(f, "Invalid configuration: {}", message)
            }
            ExtractError::ConfigParse(e) => write!(f, "Config parse error: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractError::Hdf5Error(e) => Some(e),
            ExtractError::IoWrite(e) => Some(e),
            ExtractError::ArrayError(e) => Some(e),
            ExtractError::ConfigParse(e) => Some(e),
            _ => None,
        }
    }
}

impl ExtractError {
    pub(crate) fn invalid_shape(message: impl Into<String>) -> Self {
        ExtractError::InvalidShape {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        ExtractError::InvalidConfig {
            message: message.into(),
        }
    }
}

impl From<hdf5::Error> for ExtractError {
    fn from(error: hdf5::Error) -> Self {
        ExtractError::Hdf5Error(error)
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(error: std::io::Error) -> Self {
        ExtractError::IoWrite(error)
    }
}

impl From<ndarray::ShapeError> for ExtractError {
    fn from(error: ndarray::ShapeError) -> Self {
        ExtractError::ArrayError(error)
    }
}

impl From<serde_json::Error> for ExtractError {
    fn from(error: serde_json::Error) -> Self {
        ExtractError::ConfigParse(error)
    }
}

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;
