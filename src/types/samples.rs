//! Sample series stored in a ThorSync episode.

use polars::prelude::{DataType, NamedFrom, PlSmallStr, Series};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Native element type of a stored series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl SampleType {
    pub fn to_polars(self) -> DataType {
        match self {
            Self::I8 => DataType::Int8,
            Self::I16 => DataType::Int16,
            Self::I32 => DataType::Int32,
            Self::I64 => DataType::Int64,
            Self::U8 => DataType::UInt8,
            Self::U16 => DataType::UInt16,
            Self::U32 => DataType::UInt32,
            Self::U64 => DataType::UInt64,
            Self::F32 => DataType::Float32,
            Self::F64 => DataType::Float64,
        }
    }
}

/// A flat series of samples in its native type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dtype", content = "values", rename_all = "lowercase")]
pub enum SampleSeries {
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// Applies `$body` to the vector inside any `SampleSeries` variant.
macro_rules! with_series {
    ($series:expr, $values:ident => $body:expr) => {
        match $series {
            SampleSeries::I8($values) => $body,
            SampleSeries::I16($values) => $body,
            SampleSeries::I32($values) => $body,
            SampleSeries::I64($values) => $body,
            SampleSeries::U8($values) => $body,
            SampleSeries::U16($values) => $body,
            SampleSeries::U32($values) => $body,
            SampleSeries::U64($values) => $body,
            SampleSeries::F32($values) => $body,
            SampleSeries::F64($values) => $body,
        }
    };
}

impl SampleSeries {
    pub fn len(&self) -> usize {
        with_series!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sample_type(&self) -> SampleType {
        match self {
            Self::I8(_) => SampleType::I8,
            Self::I16(_) => SampleType::I16,
            Self::I32(_) => SampleType::I32,
            Self::I64(_) => SampleType::I64,
            Self::U8(_) => SampleType::U8,
            Self::U16(_) => SampleType::U16,
            Self::U32(_) => SampleType::U32,
            Self::U64(_) => SampleType::U64,
            Self::F32(_) => SampleType::F32,
            Self::F64(_) => SampleType::F64,
        }
    }

    /// Every sample as `f64`. Used for the clock, whose counter may exceed 2^53
    /// only after years of acquisition.
    pub fn to_f64(&self) -> Vec<f64> {
        with_series!(self, v => v.iter().map(|&x| x as f64).collect())
    }

    /// Clips samples into `{0, 1}` and narrows to `i8`.
    pub fn to_binary(&self) -> Vec<i8> {
        with_series!(self, v => v.iter().map(|&x| clip_unit(x as f64)).collect())
    }

    /// Casts samples to `i32` so that differencing cannot wrap around.
    pub fn to_i32(&self) -> Vec<i32> {
        match self {
            Self::I8(v) => v.iter().map(|&x| i32::from(x)).collect(),
            Self::I16(v) => v.iter().map(|&x| i32::from(x)).collect(),
            Self::I32(v) => v.clone(),
            Self::I64(v) => v.iter().map(|&x| x as i32).collect(),
            Self::U8(v) => v.iter().map(|&x| i32::from(x)).collect(),
            Self::U16(v) => v.iter().map(|&x| i32::from(x)).collect(),
            Self::U32(v) => v.iter().map(|&x| x as i32).collect(),
            Self::U64(v) => v.iter().map(|&x| x as i32).collect(),
            Self::F32(v) => v.iter().map(|&x| x as i32).collect(),
            Self::F64(v) => v.iter().map(|&x| x as i32).collect(),
        }
    }

    /// Consumes the series into a polars column of the same native type.
    pub fn into_series(self, name: PlSmallStr) -> Series {
        with_series!(self, v => Series::new(name, v))
    }
}

fn clip_unit(x: f64) -> i8 {
    if x >= 1.0 { 1 } else { 0 }
}

/// Name, type and length of a stored series, known without reading samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesInfo {
    pub name: String,
    pub dtype: SampleType,
    pub len: usize,
}

/// Structure of a sync table as derived from the container layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSchema {
    pub path: PathBuf,
    /// Number of clock ticks, i.e. rows.
    pub length: usize,
    pub columns: Vec<(String, DataType)>,
}

impl SyncSchema {
    pub fn shape(&self) -> (usize, usize) {
        (self.length, self.columns.len())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }
}
