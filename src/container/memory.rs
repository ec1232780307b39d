use crate::container::SampleContainer;
use crate::error::{Result, SchemaError, ThorError};
use crate::types::samples::{SampleSeries, SeriesInfo};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Groups of named series held in memory, in insertion order.
///
/// Its JSON form (`{"groups": [["AI", [["Piezo", {"dtype": "f64", "values": [...]}]]]]}`)
/// is what [`SampleContainer::open`] reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryContainer {
    groups: Vec<(String, Vec<(String, SampleSeries)>)>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `group` if needed; an empty group is still present.
    pub fn with_group(mut self, group: &str) -> Self {
        self.group_mut(group);
        self
    }

    pub fn insert(&mut self, group: &str, name: &str, series: SampleSeries) {
        let members = self.group_mut(group);
        match members.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = series,
            None => members.push((name.to_string(), series)),
        }
    }

    pub fn with_series(mut self, group: &str, name: &str, series: SampleSeries) -> Self {
        self.insert(group, name, series);
        self
    }

    fn group_mut(&mut self, group: &str) -> &mut Vec<(String, SampleSeries)> {
        let index = match self.groups.iter().position(|(g, _)| g == group) {
            Some(index) => index,
            None => {
                self.groups.push((group.to_string(), Vec::new()));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index].1
    }

    fn group(&self, group: &str) -> Option<&[(String, SampleSeries)]> {
        self.groups
            .iter()
            .find(|(g, _)| g == group)
            .map(|(_, members)| members.as_slice())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl SampleContainer for MemoryContainer {
    fn open(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ThorError::io(path, e))?;
        Ok(serde_json::from_str(&text)?)
    }

    fn members(&self, group: &str) -> Result<Option<Vec<SeriesInfo>>> {
        Ok(self.group(group).map(|members| {
            members
                .iter()
                .map(|(name, series)| SeriesInfo {
                    name: name.clone(),
                    dtype: series.sample_type(),
                    len: series.len(),
                })
                .collect()
        }))
    }

    fn read(&self, group: &str, name: &str) -> Result<SampleSeries> {
        let members = self.group(group).ok_or_else(|| SchemaError::MissingGroup {
            group: group.to_string(),
        })?;
        members
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, series)| series.clone())
            .ok_or_else(|| {
                SchemaError::MissingDataset {
                    group: group.to_string(),
                    name: name.to_string(),
                }
                .into()
            })
    }
}
