//! Cursor over the data field of a single object

use crate::error::{EventIoError, Result};

/// Little endian reader over an in-memory data field
#[derive(Debug, Clone)]
pub struct ObjectReader {
    data: Vec<u8>,
    position: usize,
}

impl ObjectReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Move to an absolute position inside the data field
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.data.len() {
            return Err(EventIoError::UnexpectedEnd {
                needed: position,
                available: self.data.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    fn take(&mut self, n: usize) -> Result<&[u8]> {
        if n > self.remaining() {
            return Err(EventIoError::UnexpectedEnd {
                needed: n,
                available: self.remaining(),
            });
        }
        let start = self.position;
        self.position += n;
        Ok(&self.data[start..self.position])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        self.take(n).map(<[u8]>::to_vec)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.take_array().map(i16::from_le_bytes)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.take_array().map(u16::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.take_array().map(i32::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.take_array().map(u32::from_le_bytes)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.take_array().map(i64::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.take_array().map(f32::from_le_bytes)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.take_array().map(f64::from_le_bytes)
    }

    pub fn read_f32_vec(&mut self, n: usize) -> Result<Vec<f32>> {
        let needed = n.checked_mul(4).ok_or(EventIoError::UnexpectedEnd {
            needed: usize::MAX,
            available: self.remaining(),
        })?;
        let bytes = self.take(needed)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// EventIO string: int16 length followed by the characters
    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_i16()?;
        if length < 0 {
            return Err(EventIoError::Malformed {
                kind: "string".to_string(),
                reason: format!("negative length {}", length),
            });
        }
        let bytes = self.take(length as usize)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Variable length unsigned integer
    ///
    /// The count of leading one bits in the first byte is the number of
    /// bytes that follow. The remaining bits of the first byte are the most
    /// significant part of the value.
    pub fn read_var_uint(&mut self) -> Result<u64> {
        let first = self.read_u8()?;
        let extra = first.leading_ones() as usize;
        let mask = if extra >= 7 { 0 } else { 0xffu8 >> (extra + 1) };

        let mut value = (first & mask) as u64;
        for &byte in self.take(extra)? {
            value = (value << 8) | byte as u64;
        }
        Ok(value)
    }

    /// Variable length signed integer, zig-zag encoded on top of
    /// [`read_var_uint`](Self::read_var_uint)
    pub fn read_var_int(&mut self) -> Result<i64> {
        let u = self.read_var_uint()?;
        if u & 1 == 1 {
            Ok(-((u >> 1) as i64) - 1)
        } else {
            Ok((u >> 1) as i64)
        }
    }
}
