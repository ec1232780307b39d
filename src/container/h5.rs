//! ThorSync `Episode*.h5` files read through libhdf5.

use crate::container::SampleContainer;
use crate::error::{Result, SchemaError, ThorError};
use crate::types::samples::{SampleSeries, SampleType, SeriesInfo};
use hdf5::types::{FloatSize, IntSize, TypeDescriptor};
use hdf5::{Dataset, File, Group};
use log::debug;
use std::path::Path;

#[derive(Debug)]
pub struct Hdf5Container {
    handle: File,
}

fn sample_type(dataset: &Dataset) -> Result<SampleType> {
    let descriptor = dataset.dtype()?.to_descriptor()?;
    let dtype = match descriptor {
        TypeDescriptor::Integer(IntSize::U1) => SampleType::I8,
        TypeDescriptor::Integer(IntSize::U2) => SampleType::I16,
        TypeDescriptor::Integer(IntSize::U4) => SampleType::I32,
        TypeDescriptor::Integer(IntSize::U8) => SampleType::I64,
        TypeDescriptor::Unsigned(IntSize::U1) => SampleType::U8,
        TypeDescriptor::Unsigned(IntSize::U2) => SampleType::U16,
        TypeDescriptor::Unsigned(IntSize::U4) => SampleType::U32,
        TypeDescriptor::Unsigned(IntSize::U8) => SampleType::U64,
        TypeDescriptor::Float(FloatSize::U4) => SampleType::F32,
        TypeDescriptor::Float(FloatSize::U8) => SampleType::F64,
        other => {
            return Err(ThorError::UnsupportedFeature(format!(
                "dataset {} of type {other:?}",
                dataset.name()
            )));
        }
    };
    Ok(dtype)
}

fn short_name(dataset: &Dataset) -> String {
    let name = dataset.name();
    match name.rsplit_once('/') {
        Some((_, short)) => short.to_string(),
        None => name,
    }
}

impl Hdf5Container {
    fn group(&self, group: &str) -> Option<Group> {
        self.handle.group(group).ok()
    }
}

impl SampleContainer for Hdf5Container {
    fn open(path: &Path) -> Result<Self> {
        debug!("opening sync episode {}", path.display());
        Ok(Self {
            handle: File::open(path)?,
        })
    }

    fn members(&self, group: &str) -> Result<Option<Vec<SeriesInfo>>> {
        let Some(group) = self.group(group) else {
            return Ok(None);
        };
        let mut members = Vec::new();
        for dataset in group.datasets()? {
            members.push(SeriesInfo {
                name: short_name(&dataset),
                dtype: sample_type(&dataset)?,
                len: dataset.size(),
            });
        }
        Ok(Some(members))
    }

    fn read(&self, group_name: &str, name: &str) -> Result<SampleSeries> {
        let group = self.group(group_name).ok_or_else(|| SchemaError::MissingGroup {
            group: group_name.to_string(),
        })?;
        let dataset = group.dataset(name).map_err(|_| SchemaError::MissingDataset {
            group: group_name.to_string(),
            name: name.to_string(),
        })?;

        // read_raw flattens (n, 1) line datasets in storage order
        let series = match sample_type(&dataset)? {
            SampleType::I8 => SampleSeries::I8(dataset.read_raw()?),
            SampleType::I16 => SampleSeries::I16(dataset.read_raw()?),
            SampleType::I32 => SampleSeries::I32(dataset.read_raw()?),
            SampleType::I64 => SampleSeries::I64(dataset.read_raw()?),
            SampleType::U8 => SampleSeries::U8(dataset.read_raw()?),
            SampleType::U16 => SampleSeries::U16(dataset.read_raw()?),
            SampleType::U32 => SampleSeries::U32(dataset.read_raw()?),
            SampleType::U64 => SampleSeries::U64(dataset.read_raw()?),
            SampleType::F32 => SampleSeries::F32(dataset.read_raw()?),
            SampleType::F64 => SampleSeries::F64(dataset.read_raw()?),
        };
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::{DEFAULT_CLOCK_RATE, decode_sync_table};
    use crate::test_utils::{TestResult, sync_container};
    use crate::thor_sync::{Hdf5SyncSource, SyncOptions};
    use hdf5::H5Type;
    use std::collections::BTreeSet;

    /// ThorSync stores each line as an `(n, 1)` dataset.
    fn write_line<T: H5Type>(group: &Group, name: &str, values: &[T]) -> hdf5::Result<()> {
        group
            .new_dataset::<T>()
            .shape((values.len(), 1))
            .create(name)?
            .write_raw(values)
    }

    /// The `sync_container` episode in HDF5 form.
    fn write_episode(path: &Path) -> hdf5::Result<()> {
        let file = File::create(path)?;
        write_line(&file.create_group("Global")?, "GCtr", &[0u64, 1, 2, 3])?;
        let analog = file.create_group("AI")?;
        write_line(&analog, "Piezo", &[0.0f64, 0.5, 1.0, 1.5])?;
        write_line(&analog, "Photodiode", &[0.1f32, 0.2, 0.3, 0.4])?;
        let digital = file.create_group("DI")?;
        write_line(&digital, "FrameOut", &[0u32, 2, 16, 0])?;
        write_line(&digital, "Strobe", &[0u32, 2, 16, 2])?;
        Ok(())
    }

    #[test]
    fn test_members_and_reads() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("Episode001.h5");
        write_episode(&path)?;
        let container = Hdf5Container::open(&path)?;

        let analog = container.members("AI")?.ok_or("no AI group")?;
        let described: Vec<(&str, SampleType, usize)> = analog
            .iter()
            .map(|info| (info.name.as_str(), info.dtype, info.len))
            .collect();
        assert_eq!(
            described,
            vec![("Photodiode", SampleType::F32, 4), ("Piezo", SampleType::F64, 4)]
        );
        assert_eq!(container.members("Missing")?, None);

        assert_eq!(
            container.read("Global", "GCtr")?,
            SampleSeries::U64(vec![0, 1, 2, 3])
        );
        assert_eq!(
            container.read("DI", "Strobe")?,
            SampleSeries::U32(vec![0, 2, 16, 2])
        );
        assert!(matches!(
            container.read("DI", "Missing"),
            Err(ThorError::Schema(SchemaError::MissingDataset { .. }))
        ));
        assert!(matches!(
            container.read("Missing", "GCtr"),
            Err(ThorError::Schema(SchemaError::MissingGroup { .. }))
        ));
        Ok(())
    }

    #[test_log::test]
    fn test_episode_matches_memory_container() -> TestResult {
        let dir = tempfile::tempdir()?;
        write_episode(&dir.path().join("Episode001.h5"))?;
        let binary = BTreeSet::from(["FrameOut".to_string()]);

        let options = SyncOptions::builder().binary(binary.clone()).build();
        let mut source = Hdf5SyncSource::with_options(dir.path(), options);
        let names = source.schema()?.column_names().join(",");
        assert_eq!(names, "time,Photodiode,Piezo,FrameOut,Strobe");

        let table = source.read()?;
        let expected = decode_sync_table(&sync_container(), &binary, DEFAULT_CLOCK_RATE)?;
        assert_eq!(table.shape(), expected.shape());
        for column in expected.get_columns() {
            let decoded = table.column(column.name().as_str())?;
            assert_eq!(decoded.dtype(), column.dtype());
            assert!(
                decoded
                    .as_materialized_series()
                    .equals(column.as_materialized_series()),
                "column {} differs",
                column.name()
            );
        }
        Ok(())
    }
}
