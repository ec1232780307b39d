//! Path-driven source for ThorSync episodes.

use crate::container::SampleContainer;
use crate::error::Result;
use crate::processing::{DEFAULT_CLOCK_RATE, decode_sync_table, sync_schema};
use crate::types::samples::SyncSchema;
use crate::utils::find_file;
use bon::Builder;
use log::debug;
use polars::prelude::DataFrame;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

pub const DEFAULT_SYNC_PATTERN: &str = "Episode*.h5";

#[derive(Debug, Clone, PartialEq, Builder, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// File pattern used when the input is a directory.
    #[builder(into, default = DEFAULT_SYNC_PATTERN.to_string())]
    pub pattern: String,
    /// Digital lines clipped into `{0, 1}`.
    #[builder(into, default)]
    pub binary: BTreeSet<String>,
    /// Master clock ticks per second.
    #[builder(default = DEFAULT_CLOCK_RATE)]
    pub clock_rate: f64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// One ThorSync episode, read through the container backend `C`.
#[derive(Debug)]
pub struct SyncSource<C: SampleContainer> {
    input: PathBuf,
    options: SyncOptions,
    path: Option<PathBuf>,
    schema: Option<SyncSchema>,
    table: Option<DataFrame>,
    _container: PhantomData<C>,
}

#[cfg(feature = "hdf5")]
pub type Hdf5SyncSource = SyncSource<crate::container::Hdf5Container>;

impl<C: SampleContainer> SyncSource<C> {
    /// `input` is the episode file, a pattern for it, or its directory.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self::with_options(input, SyncOptions::default())
    }

    pub fn with_options(input: impl Into<PathBuf>, options: SyncOptions) -> Self {
        Self {
            input: input.into(),
            options,
            path: None,
            schema: None,
            table: None,
            _container: PhantomData,
        }
    }

    pub fn resolve_path(&mut self) -> Result<&Path> {
        match self.path {
            Some(ref path) => Ok(path),
            None => {
                let pattern = Some(self.options.pattern.as_str()).filter(|p| !p.is_empty());
                let path = find_file(&self.input, pattern)?;
                Ok(self.path.insert(path))
            }
        }
    }

    /// Column names, types and row count, without reading any samples.
    pub fn schema(&mut self) -> Result<&SyncSchema> {
        match self.schema {
            Some(ref schema) => Ok(schema),
            None => {
                let path = self.resolve_path()?.to_path_buf();
                let container = C::open(&path)?;
                let schema = sync_schema(&container, &path, &self.options.binary)?;
                debug!("{}: sync table shape {:?}", path.display(), schema.shape());
                Ok(self.schema.insert(schema))
            }
        }
    }

    /// The whole episode as one table, decoded once and cached.
    pub fn read(&mut self) -> Result<DataFrame> {
        if let Some(table) = &self.table {
            return Ok(table.clone());
        }
        let path = self.resolve_path()?.to_path_buf();
        let container = C::open(&path)?;
        if self.schema.is_none() {
            self.schema = Some(sync_schema(&container, &path, &self.options.binary)?);
        }
        let table = decode_sync_table(&container, &self.options.binary, self.options.clock_rate)?;
        self.table = Some(table.clone());
        Ok(table)
    }

    pub fn close(&mut self) {
        self.path = None;
        self.schema = None;
        self.table = None;
    }
}
