//! Decoders for CORSIKA IACT object payloads
//!
//! Run and event headers wrap the CORSIKA `RUNH`/`EVTH` blocks: an `i32`
//! word count followed by that many `f32` words. Only the leading words
//! with a fixed meaning are decoded here.

use crate::core::{EventIoFile, EventIoObject, ObjectKind, ObjectReader};
use crate::error::{EventIoError, Result};
use crate::simtel::objects::check_kind;
use serde::Serialize;

fn malformed(kind: ObjectKind, reason: String) -> EventIoError {
    EventIoError::Malformed {
        kind: kind.name().to_string(),
        reason,
    }
}

/// Read a CORSIKA block, requiring at least `min_words` words
fn read_block(reader: &mut ObjectReader, kind: ObjectKind, min_words: usize) -> Result<Vec<f32>> {
    let n_words = reader.read_i32()?;
    if n_words < 0 || (n_words as usize) < min_words {
        return Err(malformed(
            kind,
            format!("block of {} words, need at least {}", n_words, min_words),
        ));
    }
    reader.read_f32_vec(n_words as usize)
}

/// Leading fields of the CORSIKA run header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorsikaRunHeader {
    pub run_number: u32,
    pub energy_slope: f32,
    /// Lower and upper bound of the primary energy in GeV
    pub energy_range: (f32, f32),
}

impl CorsikaRunHeader {
    pub fn parse(file: &mut EventIoFile, object: &EventIoObject) -> Result<Self> {
        check_kind(object, ObjectKind::IactRunHeader)?;
        let mut reader = file.reader(object)?;
        let block = read_block(&mut reader, ObjectKind::IactRunHeader, 18)?;

        Ok(Self {
            run_number: block[1] as u32,
            energy_slope: block[15],
            energy_range: (block[16], block[17]),
        })
    }
}

/// Leading fields of the CORSIKA event header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorsikaEventHeader {
    pub event_number: u32,
    pub particle_id: u32,
    /// Primary energy in GeV
    pub total_energy: f32,
    /// Zenith angle in radians
    pub zenith_angle: f32,
    /// Azimuth angle in radians
    pub azimuth_angle: f32,
}

impl CorsikaEventHeader {
    pub fn parse(file: &mut EventIoFile, object: &EventIoObject) -> Result<Self> {
        check_kind(object, ObjectKind::IactEventHeader)?;
        let mut reader = file.reader(object)?;
        let block = read_block(&mut reader, ObjectKind::IactEventHeader, 12)?;

        Ok(Self {
            event_number: block[1] as u32,
            particle_id: block[2] as u32,
            total_energy: block[3],
            zenith_angle: block[10],
            azimuth_angle: block[11],
        })
    }
}

/// Telescope positions from the telescope definition, in cm
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelescopePositions {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    /// Radius of the sphere around each telescope
    pub r: Vec<f32>,
}

impl TelescopePositions {
    pub fn parse(file: &mut EventIoFile, object: &EventIoObject) -> Result<Self> {
        check_kind(object, ObjectKind::TelescopeDefinition)?;
        let mut reader = file.reader(object)?;

        let n_telescopes = reader.read_i32()?;
        if n_telescopes < 0 {
            return Err(malformed(
                ObjectKind::TelescopeDefinition,
                format!("negative number of telescopes {}", n_telescopes),
            ));
        }
        let n = n_telescopes as usize;

        Ok(Self {
            x: reader.read_f32_vec(n)?,
            y: reader.read_f32_vec(n)?,
            z: reader.read_f32_vec(n)?,
            r: reader.read_f32_vec(n)?,
        })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}
