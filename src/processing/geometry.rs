use crate::error::{Result, ThorError};
use crate::types::geometry::ArrayGeometry;
use crate::types::metadata::ExperimentMetadata;
use log::{debug, warn};

/// Infers the full array geometry of a raw file from its metadata and size.
///
/// The frame count is `raw_file_size / frame_bytes`, rounded down. Trailing
/// bytes that do not make up a whole frame are ignored.
pub fn resolve_geometry(metadata: &ExperimentMetadata, raw_file_size: u64) -> Result<ArrayGeometry> {
    let frame = metadata.frame().ok_or_else(|| {
        ThorError::UnsupportedFeature(format!(
            "frame geometry for {} acquisitions",
            metadata.acquisition.modality()
        ))
    })?;
    if frame.channels != 1 {
        return Err(ThorError::UnsupportedFeature(format!(
            "{} channel frames",
            frame.channels
        )));
    }

    let frame_bytes = frame
        .elements_per_frame()
        .and_then(|n| n.checked_mul(frame.dtype.itemsize()))
        .filter(|&n| n != 0)
        .ok_or_else(|| {
            ThorError::UnsupportedFeature(format!("frame shape {:?}", frame.shape))
        })? as u64;
    let frame_count = raw_file_size / frame_bytes;
    let remainder = raw_file_size % frame_bytes;
    if remainder != 0 {
        warn!("ignoring {remainder} trailing bytes after {frame_count} frames");
    }

    let geometry = ArrayGeometry {
        shape: vec![frame_count as usize, frame.shape.0, frame.shape.1],
        dtype: frame.dtype,
    };
    debug!("raw geometry {:?} {}", geometry.shape, geometry.dtype);
    Ok(geometry)
}
