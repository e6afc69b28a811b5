//! Object header decoding
//!
//! Every EventIO object starts with a header of 32 bit little endian words.
//! Top-level objects begin with a sync marker that also tells the byte order;
//! sub-objects inherit the byte order of their parent and carry no marker.
//!
//! ```text
//! [sync] type/version  id  length  [extension]
//! ```

use crate::error::{EventIoError, Result};
use serde::Serialize;
use std::io::Read;
use tracing::debug;

/// Sync marker as signed 32 bit integer
pub const SYNC_MARKER_INT_VALUE: i32 = -736130505;

/// Sync marker as it appears on disk for little endian files
pub const SYNC_MARKER_LE_BYTES: [u8; 4] = SYNC_MARKER_INT_VALUE.to_le_bytes();

// N-bit words and 1-bit flags packed into the header words.
// LEN and POS are measured in bits, POS starting at zero.
pub const TYPE_LEN: u32 = 16;
pub const TYPE_POS: u32 = 0;
pub const USER_POS: u32 = 16;
pub const EXTENDED_POS: u32 = 17;
pub const VERSION_LEN: u32 = 12;
pub const VERSION_POS: u32 = 20;
pub const ONLY_SUB_OBJECTS_POS: u32 = 30;
pub const LENGTH_LEN: u32 = 30;
pub const LENGTH_POS: u32 = 0;
pub const EXTENSION_LEN: u32 = 12;
pub const EXTENSION_POS: u32 = 0;

/// Byte order announced by the sync marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    Little,
    Big,
}

/// Determine the byte order from the four sync bytes
pub fn parse_sync(sync: [u8; 4]) -> Result<Endianness> {
    if i32::from_le_bytes(sync) == SYNC_MARKER_INT_VALUE {
        debug!("Found Little Endian byte order");
        return Ok(Endianness::Little);
    }
    if i32::from_be_bytes(sync) == SYNC_MARKER_INT_VALUE {
        debug!("Found Big Endian byte order");
        return Ok(Endianness::Big);
    }
    Err(EventIoError::InvalidSync(sync))
}

/// Test a single bit of a 32 bit word
pub fn bool_bit_from_pos(word: u32, pos: u32) -> bool {
    word & (1 << pos) != 0
}

/// Extract `len` bits starting at bit `pos`
///
/// For the word `0b1010_1100_0000_0000` with `pos = 10` and `len = 4`
/// the result is `0b1011`.
pub fn len_bits_from_pos(word: u32, len: u32, pos: u32) -> u32 {
    (word >> pos) & ((1u32 << len) - 1)
}

/// Contents of the type word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub object_type: u32,
    pub version: u32,
    pub user: bool,
    pub extended: bool,
}

impl TypeInfo {
    pub fn from_word(word: u32) -> Self {
        Self {
            object_type: len_bits_from_pos(word, TYPE_LEN, TYPE_POS),
            version: len_bits_from_pos(word, VERSION_LEN, VERSION_POS),
            user: bool_bit_from_pos(word, USER_POS),
            extended: bool_bit_from_pos(word, EXTENDED_POS),
        }
    }
}

/// Contents of the length word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthInfo {
    pub only_sub_objects: bool,
    pub length: u64,
}

impl LengthInfo {
    pub fn from_word(word: u32) -> Self {
        Self {
            only_sub_objects: bool_bit_from_pos(word, ONLY_SUB_OBJECTS_POS),
            length: len_bits_from_pos(word, LENGTH_LEN, LENGTH_POS) as u64,
        }
    }
}

/// Decode the extension word, already shifted so it can be added to the
/// 30 bit length
pub fn extension_from_word(word: u32) -> u64 {
    (len_bits_from_pos(word, EXTENSION_LEN, EXTENSION_POS) as u64) << LENGTH_LEN
}

/// Decoded object header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectHeader {
    pub endianness: Endianness,
    #[serde(rename = "type")]
    pub object_type: u32,
    pub version: u32,
    pub user: bool,
    pub extended: bool,
    pub only_sub_objects: bool,
    /// Length of the data field in bytes
    pub length: u64,
    pub id: u32,
    /// Absolute offset of the first byte of the data field
    pub data_offset: u64,
    /// Nesting depth, 0 for top-level objects
    pub level: u32,
    /// Number of bytes the header itself occupies
    pub header_size: u64,
}

impl ObjectHeader {
    /// Read a header at the current position of `reader`
    ///
    /// `position` must be the absolute offset the reader is at. Top-level
    /// headers (`parent == None`) start with the sync marker.
    pub fn read<R: Read>(
        reader: &mut R,
        position: u64,
        parent: Option<&ObjectHeader>,
    ) -> Result<Self> {
        let mut header_size = 0u64;

        let (endianness, level) = match parent {
            None => {
                let mut sync = [0u8; 4];
                reader.read_exact(&mut sync)?;
                header_size += 4;
                (parse_sync(sync)?, 0)
            }
            Some(parent) => (parent.endianness, parent.level + 1),
        };

        if endianness == Endianness::Big {
            return Err(EventIoError::BigEndianUnsupported);
        }

        let type_info = TypeInfo::from_word(read_u32(reader)?);
        let id = read_u32(reader)?;
        let length_info = LengthInfo::from_word(read_u32(reader)?);
        header_size += 12;

        let mut length = length_info.length;
        if type_info.extended {
            length += extension_from_word(read_u32(reader)?);
            header_size += 4;
        }

        Ok(Self {
            endianness,
            object_type: type_info.object_type,
            version: type_info.version,
            user: type_info.user,
            extended: type_info.extended,
            only_sub_objects: length_info.only_sub_objects,
            length,
            id,
            data_offset: position + header_size,
            level,
            header_size,
        })
    }

    /// Absolute offset one past the last data byte
    pub fn data_end(&self) -> u64 {
        self.data_offset + self.length
    }
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
