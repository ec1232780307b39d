//! Hierarchical sample containers holding a ThorSync episode.
//!
//! An episode has three groups: `Global` with the `GCtr` clock counter,
//! `AI` with analog lines and `DI` with digital lines. Every series in a
//! well-formed episode has one sample per clock tick.

#[cfg(feature = "hdf5")]
mod h5;
mod memory;

#[cfg(feature = "hdf5")]
pub use h5::Hdf5Container;
pub use memory::MemoryContainer;

use crate::error::Result;
use crate::types::samples::{SampleSeries, SeriesInfo};
use std::path::Path;

pub const CLOCK_GROUP: &str = "Global";
pub const CLOCK_NAME: &str = "GCtr";
pub const ANALOG_GROUP: &str = "AI";
pub const DIGITAL_GROUP: &str = "DI";

pub trait SampleContainer {
    fn open(path: &Path) -> Result<Self>
    where
        Self: Sized;

    /// Series in `group`, in container order, or `None` if the group is absent.
    /// HDF5 files list their members in name order.
    fn members(&self, group: &str) -> Result<Option<Vec<SeriesInfo>>>;

    /// Reads a whole series, flattened to one dimension.
    fn read(&self, group: &str, name: &str) -> Result<SampleSeries>;
}
