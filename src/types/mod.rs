pub mod document;
pub mod geometry;
pub mod metadata;
pub mod samples;

// Re-export the main types
pub use document::{XmlDocument, XmlElement};
pub use geometry::{ArrayGeometry, Pixel, PixelType};
pub use metadata::{
    Acquisition, CaptureMode, ExperimentMetadata, FrameDescriptor, PmtDescriptor,
    PockelsDescriptor,
};
pub use samples::{SampleSeries, SampleType, SeriesInfo, SyncSchema};
