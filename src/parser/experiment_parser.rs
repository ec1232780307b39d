//! Decoding of `Experiment.xml` into [`ExperimentMetadata`].
//!
//! The descriptor stores everything as attributes on direct children of the
//! root element: `Software`, `Date`, `CaptureMode`, `Modality`, then `Camera`
//! for camera acquisitions or `LSM`, `Wavelengths/ChannelEnable`, `PMT` and
//! one `Pockels` per Pockels cell for laser-scanning ones.

use crate::error::{Result, SchemaError, ThorError};
use crate::types::document::{XmlDocument, XmlElement};
use crate::types::geometry::PixelType;
use crate::types::metadata::{
    Acquisition, CaptureMode, ExperimentMetadata, FrameDescriptor, PmtDescriptor,
    PockelsDescriptor,
};
use chrono::DateTime;
use log::debug;

const PMT_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

pub fn decode_metadata(doc: &XmlDocument) -> Result<ExperimentMetadata> {
    let software_version = doc.require("Software")?.require_attr("version")?.to_string();

    let date_node = doc.require("Date")?;
    let utime: i64 = date_node.parse_attr("uTime")?;
    let date = DateTime::from_timestamp(utime, 0).ok_or_else(|| SchemaError::InvalidAttribute {
        element: date_node.name.clone(),
        attribute: "uTime".into(),
        value: utime.to_string(),
    })?;

    let mode: i64 = doc.require("CaptureMode")?.parse_attr("mode")?;
    let capture_mode = CaptureMode::from_code(mode).ok_or_else(|| ThorError::UnsupportedValue {
        field: "capture mode",
        value: mode.to_string(),
    })?;

    let modality = doc
        .require("Modality")?
        .require_attr("name")?
        .to_lowercase();
    let acquisition = match modality.as_str() {
        "camera" => Acquisition::Camera {
            frame: decode_camera_frame(doc)?,
        },
        "multiphoton" => decode_multiphoton(doc)?,
        "confocal" => Acquisition::Confocal,
        _ => {
            return Err(ThorError::UnsupportedValue {
                field: "modality",
                value: modality,
            });
        }
    };
    debug!(
        "decoded {} {} experiment, software {}",
        acquisition.modality(),
        capture_mode,
        software_version
    );

    Ok(ExperimentMetadata {
        software_version,
        date,
        capture_mode,
        acquisition,
    })
}

/// `1` when `averageMode` is off, otherwise `averageNum`.
fn averaging(node: &XmlElement) -> Result<u32> {
    let mode: i64 = node.parse_attr("averageMode")?;
    if mode == 0 {
        Ok(1)
    } else {
        Ok(node.parse_attr("averageNum")?)
    }
}

fn field_of_view(node: &XmlElement) -> Result<(f64, f64)> {
    Ok((node.parse_attr("heightUM")?, node.parse_attr("widthUM")?))
}

fn decode_camera_frame(doc: &XmlDocument) -> Result<FrameDescriptor> {
    let node = doc.require("Camera")?;
    let averaging = averaging(node)?;
    let exposure = node.parse_attr::<f64>("exposureTimeMS")? / 1000.0;

    let frame = FrameDescriptor::builder()
        .name(node.require_attr("name")?)
        .shape((node.parse_attr("height")?, node.parse_attr("width")?))
        .dtype(PixelType::U16)
        .size(field_of_view(node)?)
        .channels(1)
        .zoom(1.0)
        .averaging(averaging)
        .rate((1.0 / exposure) / f64::from(averaging))
        .exposure(exposure)
        .binning((node.parse_attr("binningY")?, node.parse_attr("binningX")?))
        .build();
    Ok(frame)
}

fn decode_multiphoton(doc: &XmlDocument) -> Result<Acquisition> {
    let node = doc.require("LSM")?;
    let pixel_x: usize = node.parse_attr("pixelX")?;
    let pixel_y: usize = node.parse_attr("pixelY")?;
    let shape = (pixel_x, pixel_y);
    let averaging = averaging(node)?;

    let channel_mask: u64 = doc
        .require("Wavelengths/ChannelEnable")?
        .parse_attr("Set")?;

    let frame = FrameDescriptor::builder()
        .name(node.require_attr("name")?)
        .shape(shape)
        .dtype(PixelType::U16)
        .size(field_of_view(node)?)
        .channels(channel_mask.count_ones())
        .zoom(pixel_y as f64 / shape.0 as f64)
        .averaging(averaging)
        .rate(node.parse_attr::<f64>("frameRate")? / f64::from(averaging))
        .build();

    let pmt_node = doc.require("PMT")?;
    let mut pmts = [PmtDescriptor {
        enabled: false,
        gain: 0.0,
    }; 4];
    for (pmt, letter) in pmts.iter_mut().zip(PMT_LETTERS) {
        let enabled: i64 = pmt_node.parse_attr(&format!("enable{letter}"))?;
        *pmt = PmtDescriptor {
            enabled: enabled != 0,
            gain: pmt_node.parse_attr(&format!("gain{letter}"))?,
        };
    }

    let pockels = doc
        .find_all("Pockels")
        .map(|n| -> Result<PockelsDescriptor> {
            Ok(PockelsDescriptor {
                start: n.parse_attr("start")?,
                stop: n.parse_attr("stop")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Acquisition::Multiphoton {
        frame,
        pmts,
        pockels,
    })
}

impl ExperimentMetadata {
    /// Decodes a parsed descriptor. See [`decode_metadata`].
    pub fn from_document(doc: &XmlDocument) -> Result<Self> {
        decode_metadata(doc)
    }
}
