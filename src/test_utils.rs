//! Fixtures shared by the unit tests: synthetic descriptors, raw frame files
//! and sync episodes.

use crate::container::{ANALOG_GROUP, CLOCK_GROUP, CLOCK_NAME, DIGITAL_GROUP, MemoryContainer};
use crate::types::samples::SampleSeries;
use std::fs;
use std::io;
use std::path::Path;

pub type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

const HEADER: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ThorImageExperiment>
  <Software version="3.0.2016.10131" />
  <Date date="08/12/2020 17:43:56" uTime="1597254236" />"#;

/// A camera descriptor with `width` x `height` frames.
pub fn camera_xml_sized(mode: &str, modality: &str, width: usize, height: usize) -> String {
    format!(
        r#"{HEADER}
  <CaptureMode mode="{mode}" />
  <Modality name="{modality}" />
  <Camera name="CS2100M" width="{width}" height="{height}" widthUM="256" heightUM="256" averageMode="0" averageNum="4" exposureTimeMS="50" binningX="1" binningY="1" />
</ThorImageExperiment>
"#
    )
}

pub fn camera_xml(mode: &str, modality: &str) -> String {
    camera_xml_sized(mode, modality, 512, 512)
}

/// A multiphoton t-series descriptor. `set` is the channel-enable bit mask.
pub fn multiphoton_xml(pixel_x: usize, pixel_y: usize, set: &str) -> String {
    format!(
        r#"{HEADER}
  <CaptureMode mode="1" />
  <Modality name="Multiphoton" />
  <LSM name="GalvoResonance" pixelX="{pixel_x}" pixelY="{pixel_y}" widthUM="400" heightUM="400" averageMode="0" averageNum="2" frameRate="30" />
  <Wavelengths>
    <ChannelEnable Set="{set}" />
  </Wavelengths>
  <PMT enableA="1" gainA="0.7" enableB="0" gainB="0" enableC="0" gainC="0" enableD="0" gainD="0.3" />
  <Pockels start="0" stop="1.5" />
  <Pockels start="0.1" stop="0.2" />
</ThorImageExperiment>
"#
    )
}

/// Writes `count` consecutive `u16` values, little endian.
pub fn write_frames(path: &Path, count: usize) -> io::Result<()> {
    let bytes: Vec<u8> = (0..count).flat_map(|i| (i as u16).to_le_bytes()).collect();
    fs::write(path, bytes)
}

/// A camera acquisition directory with 4 x 6 frames: `Experiment.xml` and
/// `Image_0001_0001.raw` holding `frames` frames plus `trailing` junk bytes.
pub fn write_camera_acquisition(dir: &Path, frames: usize, trailing: usize) -> io::Result<()> {
    fs::write(dir.join("Experiment.xml"), camera_xml_sized("1", "Camera", 6, 4))?;
    let raw = dir.join("Image_0001_0001.raw");
    write_frames(&raw, frames * 24)?;
    if trailing > 0 {
        let mut bytes = fs::read(&raw)?;
        bytes.resize(bytes.len() + trailing, 0xff);
        fs::write(&raw, bytes)?;
    }
    Ok(())
}

pub fn write_multiphoton_acquisition(dir: &Path, set: &str, frames: usize) -> io::Result<()> {
    fs::write(dir.join("Experiment.xml"), multiphoton_xml(8, 8, set))?;
    write_frames(&dir.join("Image_0001_0001.raw"), frames * 64)
}

/// A four-tick episode with two analog and two digital lines.
pub fn sync_container() -> MemoryContainer {
    MemoryContainer::new()
        .with_series(CLOCK_GROUP, CLOCK_NAME, SampleSeries::U64(vec![0, 1, 2, 3]))
        .with_series(ANALOG_GROUP, "Piezo", SampleSeries::F64(vec![0.0, 0.5, 1.0, 1.5]))
        .with_series(
            ANALOG_GROUP,
            "Photodiode",
            SampleSeries::F32(vec![0.1, 0.2, 0.3, 0.4]),
        )
        .with_series(DIGITAL_GROUP, "FrameOut", SampleSeries::U32(vec![0, 2, 16, 0]))
        .with_series(DIGITAL_GROUP, "Strobe", SampleSeries::U32(vec![0, 2, 16, 2]))
}
