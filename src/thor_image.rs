//! Path-driven sources for ThorImage acquisitions: the `Experiment.xml`
//! descriptor and the raw `Image*.raw` frame file next to it.
//!
//! Each source resolves its path and schema once, keeps them until `close`,
//! and reads frame data only when asked to.

use crate::array_view::{ArrayView, ChunkedArray};
use crate::error::{Result, ThorError};
use crate::processing::resolve_geometry;
use crate::types::document::XmlDocument;
use crate::types::geometry::{ArrayGeometry, Pixel, PixelType};
use crate::types::metadata::ExperimentMetadata;
use crate::utils::{chunk_extents, file_size, find_file, read_binary_file_mmap};
use bon::Builder;
use log::debug;
use memmap2::Mmap;
use ndarray::ArrayD;
use serde::Deserialize;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

pub const DEFAULT_METADATA_PATTERN: &str = "Experiment.xml";
pub const DEFAULT_RAW_PATTERN: &str = "Image*.raw";

/// An empty pattern means a directory input cannot be resolved.
fn pattern_option(pattern: &str) -> Option<&str> {
    (!pattern.is_empty()).then_some(pattern)
}

#[derive(Debug, Clone, PartialEq, Builder, Deserialize)]
#[serde(default)]
pub struct MetadataOptions {
    /// File pattern used when the input is a directory.
    #[builder(into, default = DEFAULT_METADATA_PATTERN.to_string())]
    pub pattern: String,
}

impl Default for MetadataOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The experiment descriptor of one acquisition.
#[derive(Debug)]
pub struct ImageMetadataSource {
    input: PathBuf,
    options: MetadataOptions,
    path: Option<PathBuf>,
    metadata: Option<ExperimentMetadata>,
}

impl ImageMetadataSource {
    /// `input` is either the descriptor itself or the acquisition directory.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self::with_options(input, MetadataOptions::default())
    }

    pub fn with_options(input: impl Into<PathBuf>, options: MetadataOptions) -> Self {
        Self {
            input: input.into(),
            options,
            path: None,
            metadata: None,
        }
    }

    /// Resolves the concrete descriptor path, once.
    pub fn resolve_path(&mut self) -> Result<&Path> {
        match self.path {
            Some(ref path) => Ok(path),
            None => {
                let path = find_file(&self.input, pattern_option(&self.options.pattern))?;
                Ok(self.path.insert(path))
            }
        }
    }

    /// Parses the descriptor into its element tree.
    pub fn read(&mut self) -> Result<XmlDocument> {
        let path = self.resolve_path()?;
        let text = fs::read_to_string(path).map_err(|e| ThorError::io(path, e))?;
        XmlDocument::parse(&text)
    }

    /// Decoded metadata, cached after the first successful decode.
    pub fn to_metadata(&mut self) -> Result<ExperimentMetadata> {
        if let Some(metadata) = &self.metadata {
            return Ok(metadata.clone());
        }
        let metadata = ExperimentMetadata::from_document(&self.read()?)?;
        self.metadata = Some(metadata.clone());
        Ok(metadata)
    }

    pub fn close(&mut self) {
        self.path = None;
        self.metadata = None;
    }
}

#[derive(Debug, Clone, PartialEq, Builder, Deserialize)]
#[serde(default)]
pub struct ImageArrayOptions {
    #[builder(into, default = DEFAULT_RAW_PATTERN.to_string())]
    pub pattern: String,
    /// Full array shape, frames first. Skips metadata when given.
    pub shape: Option<Vec<usize>>,
    /// Element type used together with `shape`.
    #[builder(default)]
    pub pixel_type: PixelType,
    /// Frames per chunk; one chunk spans all frames when unset.
    pub chunks: Option<NonZeroUsize>,
    /// Descriptor location, relative to the raw file's directory unless absolute.
    #[builder(into)]
    pub metadata_path: Option<PathBuf>,
}

impl Default for ImageArrayOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub path: PathBuf,
    pub geometry: ArrayGeometry,
    /// Chunk extents per axis; only the frame axis is split.
    pub chunks: Vec<Vec<usize>>,
    /// Metadata the geometry was inferred from, if it was inferred.
    pub metadata: Option<ExperimentMetadata>,
}

impl ArraySchema {
    pub fn shape(&self) -> &[usize] {
        &self.geometry.shape
    }

    pub fn pixel_type(&self) -> PixelType {
        self.geometry.dtype
    }

    pub fn num_blocks(&self) -> usize {
        self.chunks.first().map_or(1, Vec::len)
    }
}

#[derive(Debug)]
struct LoadedArray {
    schema: ArraySchema,
    mmap: Mmap,
}

/// The raw frame file of one acquisition.
#[derive(Debug)]
pub struct ImageArraySource {
    input: PathBuf,
    options: ImageArrayOptions,
    loaded: Option<LoadedArray>,
}

impl ImageArraySource {
    /// `input` is the raw file, a pattern for it, or the acquisition directory.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self::with_options(input, ImageArrayOptions::default())
    }

    pub fn with_options(input: impl Into<PathBuf>, options: ImageArrayOptions) -> Self {
        Self {
            input: input.into(),
            options,
            loaded: None,
        }
    }

    fn metadata_location(&self, raw_path: &Path) -> PathBuf {
        let raw_dir = raw_path.parent().unwrap_or(Path::new("."));
        match &self.options.metadata_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => raw_dir.join(path),
            None => raw_dir.to_path_buf(),
        }
    }

    fn load(&self) -> Result<LoadedArray> {
        let path = find_file(&self.input, pattern_option(&self.options.pattern))?;

        let (geometry, metadata) = match &self.options.shape {
            Some(shape) => (
                ArrayGeometry {
                    shape: shape.clone(),
                    dtype: self.options.pixel_type,
                },
                None,
            ),
            None => {
                let metadata = ImageMetadataSource::new(self.metadata_location(&path)).to_metadata()?;
                let geometry = resolve_geometry(&metadata, file_size(&path)?)?;
                (geometry, Some(metadata))
            }
        };

        let mmap = read_binary_file_mmap(&path)?;
        geometry.required_bytes(mmap.len())?;

        let mut chunks = vec![chunk_extents(geometry.frame_count(), self.options.chunks)];
        chunks.extend(geometry.shape.iter().skip(1).map(|&n| vec![n]));
        debug!(
            "{}: shape {:?}, {}, {} blocks",
            path.display(),
            geometry.shape,
            geometry.dtype,
            chunks[0].len()
        );

        Ok(LoadedArray {
            schema: ArraySchema {
                path,
                geometry,
                chunks,
                metadata,
            },
            mmap,
        })
    }

    fn loaded(&mut self) -> Result<&LoadedArray> {
        match self.loaded {
            Some(ref loaded) => Ok(loaded),
            None => {
                let loaded = self.load()?;
                Ok(self.loaded.insert(loaded))
            }
        }
    }

    /// Path, geometry and chunking, resolved on first call.
    pub fn schema(&mut self) -> Result<&ArraySchema> {
        Ok(&self.loaded()?.schema)
    }

    /// A lazy view over the mapped file. No frame is decoded until a block is read.
    pub fn to_array<T: Pixel>(&mut self) -> Result<ArrayView<'_, T>> {
        let chunk_extent = self.options.chunks;
        let loaded = self.loaded()?;
        ArrayView::new(&loaded.mmap, &loaded.schema.geometry, chunk_extent)
    }

    pub fn read<T: Pixel>(&mut self) -> Result<ArrayD<T>> {
        self.to_array::<T>()?.read_all()
    }

    pub fn read_partition<T: Pixel>(&mut self, index: usize) -> Result<ArrayD<T>> {
        self.to_array::<T>()?.read_block(index)
    }

    /// Drops the mapping and cached schema.
    pub fn close(&mut self) {
        self.loaded = None;
    }
}
