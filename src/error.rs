//! Error types shared by every decoder in the crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A required piece of the on-disk schema is absent or malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("document has no root element")]
    EmptyDocument,
    #[error("missing element <{path}>")]
    MissingElement { path: String },
    #[error("missing attribute '{attribute}' on <{element}>")]
    MissingAttribute { element: String, attribute: String },
    #[error("invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
    #[error("missing group '{group}'")]
    MissingGroup { group: String },
    #[error("missing dataset '{name}' in group '{group}'")]
    MissingDataset { group: String, name: String },
}

#[derive(Debug, Error)]
pub enum ThorError {
    #[error("{count} files found for pattern {pattern}")]
    PathResolution { pattern: String, count: usize },

    #[error("{path} is a directory and no file pattern was given")]
    MissingPattern { path: PathBuf },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("unknown {field}: {value}")]
    UnsupportedValue { field: &'static str, value: String },

    #[error("not supported: {0}")]
    UnsupportedFeature(String),

    #[error("column '{column}' has {found} samples, expected {expected}")]
    InconsistentLength {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("shape needs {required} bytes but the file holds {available}")]
    ShapeMismatch { required: usize, available: usize },

    #[error("array holds {expected} pixels, requested {requested}")]
    PixelTypeMismatch {
        expected: &'static str,
        requested: &'static str,
    },

    #[error("block {index} out of range for {count} blocks")]
    BlockOutOfRange { index: usize, count: usize },

    #[error("failed to decode frame data: {0}")]
    FrameDecode(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "hdf5")]
    #[error(transparent)]
    Hdf5(#[from] hdf5::Error),
}

impl ThorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ThorError> = std::result::Result<T, E>;
