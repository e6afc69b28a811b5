//! Decoders for sim_telarray object payloads

use crate::core::{EventIoFile, EventIoObject, ObjectKind};
use crate::error::{EventIoError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

/// Fail unless `object` is of the expected kind
pub fn check_kind(object: &EventIoObject, expected: ObjectKind) -> Result<()> {
    if object.kind != expected {
        return Err(EventIoError::WrongType {
            expected: expected.name().to_string(),
            got: format!("{}[{}]", object.kind.name(), object.object_type()),
        });
    }
    Ok(())
}

/// Which history record an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    CommandLine,
    Config,
}

/// A command line or configuration line recorded by the simulation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub kind: HistoryKind,
    /// Unix timestamp as stored in the file
    pub timestamp: i32,
    pub time: Option<DateTime<Utc>>,
    pub text: String,
}

impl HistoryEntry {
    pub fn parse(file: &mut EventIoFile, object: &EventIoObject) -> Result<Self> {
        let kind = match object.kind {
            ObjectKind::HistoryCommandLine => HistoryKind::CommandLine,
            ObjectKind::HistoryConfig => HistoryKind::Config,
            _ => {
                return Err(EventIoError::WrongType {
                    expected: "HistoryCommandLine or HistoryConfig".to_string(),
                    got: object.kind.name().to_string(),
                })
            }
        };

        let mut reader = file.reader(object)?;
        let timestamp = reader.read_i32()?;
        let text = reader.read_string()?;

        Ok(Self {
            kind,
            timestamp,
            time: Utc.timestamp_opt(timestamp as i64, 0).single(),
            text,
        })
    }
}

/// Pixel positions and optics of one camera
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraSettings {
    pub telescope_id: u32,
    pub n_pixels: u32,
    pub focal_length: f32,
    pub pixel_x: Vec<f32>,
    pub pixel_y: Vec<f32>,
}

impl CameraSettings {
    pub fn parse(file: &mut EventIoFile, object: &EventIoObject) -> Result<Self> {
        check_kind(object, ObjectKind::CameraSettings)?;
        let mut reader = file.reader(object)?;

        let n_pixels = reader.read_i32()?;
        if n_pixels < 0 {
            return Err(EventIoError::Malformed {
                kind: ObjectKind::CameraSettings.name().to_string(),
                reason: format!("negative number of pixels {}", n_pixels),
            });
        }
        let focal_length = reader.read_f32()?;
        let pixel_x = reader.read_f32_vec(n_pixels as usize)?;
        let pixel_y = reader.read_f32_vec(n_pixels as usize)?;

        Ok(Self {
            telescope_id: object.id(),
            n_pixels: n_pixels as u32,
            focal_length,
            pixel_x,
            pixel_y,
        })
    }
}

/// MC run header payload
///
/// The layout differs between versions and none is known here, so every
/// version is reported as unsupported. The raw bytes stay available through
/// [`EventIoFile::read_data`].
pub fn parse_mc_run_header(object: &EventIoObject) -> Result<Vec<u8>> {
    check_kind(object, ObjectKind::MCRunHeader)?;
    Err(EventIoError::UnsupportedVersion {
        kind: ObjectKind::MCRunHeader.name().to_string(),
        version: object.header.version,
    })
}
