//! Decoders for ThorImage/ThorSync acquisition file sets.
//!
//! An acquisition directory holds an `Experiment.xml` descriptor, a raw
//! `Image*.raw` frame file and, when ThorSync ran alongside, an
//! `Episode*.h5` file of clock-synchronized analog and digital lines.
//! [`ImageMetadataSource`] decodes the descriptor, [`ImageArraySource`]
//! exposes the frames as a lazy chunked array and [`SyncSource`] reads an
//! episode into a polars `DataFrame`.

pub mod array_view;
pub mod container;
pub mod error;
pub mod parser;
pub mod processing;
pub mod thor_image;
pub mod thor_sync;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

pub use array_view::{ArrayView, ChunkedArray};
pub use container::{MemoryContainer, SampleContainer};
pub use error::{Result, SchemaError, ThorError};
pub use thor_image::{
    ArraySchema, ImageArrayOptions, ImageArraySource, ImageMetadataSource, MetadataOptions,
};
#[cfg(feature = "hdf5")]
pub use thor_sync::Hdf5SyncSource;
pub use thor_sync::{SyncOptions, SyncSource};
pub use types::{
    Acquisition, ArrayGeometry, CaptureMode, ExperimentMetadata, FrameDescriptor, Pixel,
    PixelType, SyncSchema, XmlDocument,
};
