use crate::container::{ANALOG_GROUP, CLOCK_GROUP, CLOCK_NAME, DIGITAL_GROUP, SampleContainer};
use crate::error::{Result, SchemaError, ThorError};
use crate::types::samples::{SampleSeries, SeriesInfo, SyncSchema};
use log::debug;
use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;

/// Vendor clock rate of the ThorSync master counter, in ticks per second.
pub const DEFAULT_CLOCK_RATE: f64 = 20_000_000.0;

pub const TIME_COLUMN: &str = "time";

/// The three groups of an episode, checked for presence.
struct Layout {
    clock: SeriesInfo,
    analog: Vec<SeriesInfo>,
    digital: Vec<SeriesInfo>,
}

fn require_group<C: SampleContainer>(container: &C, group: &str) -> Result<Vec<SeriesInfo>> {
    container.members(group)?.ok_or_else(|| {
        SchemaError::MissingGroup {
            group: group.to_string(),
        }
        .into()
    })
}

fn layout<C: SampleContainer>(container: &C) -> Result<Layout> {
    let clock = require_group(container, CLOCK_GROUP)?
        .into_iter()
        .find(|info| info.name == CLOCK_NAME)
        .ok_or_else(|| SchemaError::MissingDataset {
            group: CLOCK_GROUP.to_string(),
            name: CLOCK_NAME.to_string(),
        })?;
    Ok(Layout {
        clock,
        analog: require_group(container, ANALOG_GROUP)?,
        digital: require_group(container, DIGITAL_GROUP)?,
    })
}

fn digital_dtype(name: &str, binary: &BTreeSet<String>) -> DataType {
    if binary.contains(name) {
        DataType::Int8
    } else {
        DataType::Int32
    }
}

/// Column names and types of the table `decode_sync_table` would produce,
/// read from the container structure alone.
pub fn sync_schema<C: SampleContainer>(
    container: &C,
    path: &Path,
    binary: &BTreeSet<String>,
) -> Result<SyncSchema> {
    let layout = layout(container)?;
    let mut columns = vec![(TIME_COLUMN.to_string(), DataType::Float64)];
    columns.extend(
        layout
            .analog
            .iter()
            .map(|info| (info.name.clone(), info.dtype.to_polars())),
    );
    columns.extend(
        layout
            .digital
            .iter()
            .map(|info| (info.name.clone(), digital_dtype(&info.name, binary))),
    );
    Ok(SyncSchema {
        path: path.to_path_buf(),
        length: layout.clock.len,
        columns,
    })
}

fn check_length(column: &str, expected: usize, series: &SampleSeries) -> Result<()> {
    if series.len() != expected {
        return Err(ThorError::InconsistentLength {
            column: column.to_string(),
            expected,
            found: series.len(),
        });
    }
    Ok(())
}

/// Normalizes one digital line: lines in `binary` are clipped into `{0, 1}`
/// as `i8`, all others widened to `i32`.
pub fn normalize_digital(name: &str, series: &SampleSeries, binary: &BTreeSet<String>) -> Series {
    if binary.contains(name) {
        Series::new(name.into(), series.to_binary())
    } else {
        Series::new(name.into(), series.to_i32())
    }
}

/// Reads a whole episode into one table with one row per clock tick.
///
/// Columns are `time` (seconds), the analog lines in their native types, then
/// the digital lines, each group in container order.
pub fn decode_sync_table<C: SampleContainer>(
    container: &C,
    binary: &BTreeSet<String>,
    clock_rate: f64,
) -> Result<DataFrame> {
    let layout = layout(container)?;

    let clock = container.read(CLOCK_GROUP, CLOCK_NAME)?;
    let length = clock.len();
    let time: Vec<f64> = clock.to_f64().into_iter().map(|t| t / clock_rate).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(1 + layout.analog.len() + layout.digital.len());
    columns.push(Series::new(TIME_COLUMN.into(), time).into());

    for info in &layout.analog {
        let series = container.read(ANALOG_GROUP, &info.name)?;
        check_length(&info.name, length, &series)?;
        columns.push(series.into_series(info.name.as_str().into()).into());
    }

    for info in &layout.digital {
        let series = container.read(DIGITAL_GROUP, &info.name)?;
        check_length(&info.name, length, &series)?;
        columns.push(normalize_digital(&info.name, &series, binary).into());
    }

    debug!(
        "decoded {} ticks, {} analog and {} digital lines",
        length,
        layout.analog.len(),
        layout.digital.len()
    );
    Ok(DataFrame::new(columns)?)
}
