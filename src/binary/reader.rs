//! Bounds-checked little-endian reader over a byte slice.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::util::{Error, Quat, Result, Vec3};

/// Sequential reader used by every decoder in the crate.
///
/// Every read checks the remaining length first, so a truncated buffer
/// surfaces as [`Error::UnexpectedEof`] instead of a short read.
pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { cursor: Cursor::new(data) }
    }

    /// Current read offset.
    #[inline]
    pub fn pos(&self) -> usize {
        self.cursor.position() as usize
    }

    /// Total buffer length.
    #[inline]
    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    /// Bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.pos())
    }

    /// True once every byte has been consumed.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining() == 0
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(Error::UnexpectedEof {
                offset: self.pos(),
                needed: needed - remaining,
            });
        }
        Ok(())
    }

    /// Read raw bytes.
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let start = self.pos();
        let data: &'a [u8] = *self.cursor.get_ref();
        self.cursor.set_position((start + len) as u64);
        Ok(&data[start..start + len])
    }

    /// Skip `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.bytes(len).map(|_| ())
    }

    /// Read a u8 value.
    pub fn u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.cursor.read_u8()?)
    }

    /// Read a u16 value (little-endian).
    pub fn u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.cursor.read_u16::<LittleEndian>()?)
    }

    /// Read a u32 value (little-endian).
    pub fn u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.cursor.read_u32::<LittleEndian>()?)
    }

    /// Read an i32 value (little-endian).
    pub fn i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.cursor.read_i32::<LittleEndian>()?)
    }

    /// Read an f32 value (little-endian).
    pub fn f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(self.cursor.read_f32::<LittleEndian>()?)
    }

    /// Read three floats as a vector.
    pub fn vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(self.f32()?, self.f32()?, self.f32()?))
    }

    /// Read a quaternion stored as x, y, z, w.
    pub fn quat(&mut self) -> Result<Quat> {
        Ok(Quat::from_xyzw(self.f32()?, self.f32()?, self.f32()?, self.f32()?))
    }

    /// Read an element count and check that `count * min_item_size` bytes remain.
    ///
    /// Rejects negative counts and counts that could not possibly fit,
    /// so callers can allocate with the returned capacity safely.
    pub fn count(&mut self, min_item_size: usize) -> Result<usize> {
        let offset = self.pos();
        let count = self.i32()?;
        if count < 0 {
            return Err(Error::invalid(format!("negative count {count} at offset {offset}")));
        }
        let count = count as usize;
        let needed = count.saturating_mul(min_item_size);
        if needed > self.remaining() {
            return Err(Error::UnexpectedEof {
                offset: self.pos(),
                needed: needed - self.remaining(),
            });
        }
        Ok(count)
    }

    /// Read a fixed-width ANSI string, stopping at the first NUL.
    pub fn fixed_string(&mut self, width: usize) -> Result<String> {
        let raw = self.bytes(width)?;
        Ok(decode_ansi(raw))
    }

    /// Read an i32 length followed by that many ANSI bytes, stopping at the first NUL.
    pub fn prefixed_string(&mut self) -> Result<String> {
        let len = self.count(1)?;
        let raw = self.bytes(len)?;
        Ok(decode_ansi(raw))
    }
}

/// ANSI bytes are carried as Latin-1 so every byte value survives a round trip.
fn decode_ansi(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    raw[..end].iter().map(|&b| b as char).collect()
}
