//! Normalized experiment metadata decoded from `Experiment.xml`.

use crate::types::geometry::PixelType;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureMode {
    #[serde(rename = "z-series")]
    ZSeries,
    #[serde(rename = "t-series")]
    TSeries,
}

impl CaptureMode {
    /// Maps the integer stored in `<CaptureMode mode=..>`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::ZSeries),
            1 => Some(Self::TSeries),
            _ => None,
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZSeries => write!(f, "z-series"),
            Self::TSeries => write!(f, "t-series"),
        }
    }
}

/// Geometry and timing of a single acquired frame.
///
/// `shape` keeps the axis order the instrument reports: `(height, width)` for
/// cameras, `(pixelX, pixelY)` for laser scanning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct FrameDescriptor {
    #[builder(into)]
    pub name: String,
    pub shape: (usize, usize),
    #[builder(default)]
    pub dtype: PixelType,
    /// Field of view in micrometers, `(heightUM, widthUM)`.
    pub size: (f64, f64),
    pub channels: u32,
    pub zoom: f64,
    pub averaging: u32,
    /// Frames per second after averaging.
    pub rate: f64,
    /// Seconds. Camera only.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub exposure: Option<f64>,
    /// `(binY, binX)`. Camera only.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub binning: Option<(u32, u32)>,
}

impl FrameDescriptor {
    /// `None` when the product overflows.
    pub fn elements_per_frame(&self) -> Option<usize> {
        self.shape.0.checked_mul(self.shape.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PmtDescriptor {
    pub enabled: bool,
    pub gain: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PockelsDescriptor {
    pub start: f64,
    pub stop: f64,
}

/// Modality-specific part of the metadata. Serializes with a `modality` tag
/// and only the keys that modality produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "modality", rename_all = "lowercase")]
pub enum Acquisition {
    Camera {
        frame: FrameDescriptor,
    },
    Multiphoton {
        frame: FrameDescriptor,
        /// PMTs A, B, C and D, enabled or not.
        #[serde(rename = "PMTs")]
        pmts: [PmtDescriptor; 4],
        pockels: Vec<PockelsDescriptor>,
    },
    /// Recognized, but frame extraction is not implemented for it.
    Confocal,
}

impl Acquisition {
    pub fn modality(&self) -> &'static str {
        match self {
            Self::Camera { .. } => "camera",
            Self::Multiphoton { .. } => "multiphoton",
            Self::Confocal => "confocal",
        }
    }

    pub fn frame(&self) -> Option<&FrameDescriptor> {
        match self {
            Self::Camera { frame } | Self::Multiphoton { frame, .. } => Some(frame),
            Self::Confocal => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    pub software_version: String,
    /// Acquisition start, from the `uTime` epoch seconds. Always UTC; convert
    /// with `with_timezone` for the acquiring machine's wall-clock time.
    pub date: DateTime<Utc>,
    pub capture_mode: CaptureMode,
    #[serde(flatten)]
    pub acquisition: Acquisition,
}

impl ExperimentMetadata {
    pub fn frame(&self) -> Option<&FrameDescriptor> {
        self.acquisition.frame()
    }

    /// Nested key/value form of the record.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
