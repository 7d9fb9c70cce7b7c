//! Little-endian writer into an in-memory buffer.

use byteorder::{LittleEndian, WriteBytesExt};

use crate::util::{Quat, Result, Vec3};

/// Output buffer for encoding RSM data.
#[derive(Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with a preallocated buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity) }
    }

    /// Get the current write position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.buf.len()
    }

    /// Consume the writer and return the encoded bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    /// Write bytes.
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Write a u8 value.
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.buf.write_u8(value)?;
        Ok(())
    }

    /// Write a u16 value (little-endian).
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.buf.write_u16::<LittleEndian>(value)?;
        Ok(())
    }

    /// Write a u32 value (little-endian).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.buf.write_u32::<LittleEndian>(value)?;
        Ok(())
    }

    /// Write an i32 value (little-endian).
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.buf.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    /// Write an f32 value (little-endian).
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.buf.write_f32::<LittleEndian>(value)?;
        Ok(())
    }

    /// Write a collection length as i32.
    pub fn write_count(&mut self, count: usize) -> Result<()> {
        let count = i32::try_from(count)
            .map_err(|_| crate::util::Error::invalid(format!("count {count} exceeds i32")))?;
        self.write_i32(count)
    }

    /// Write three floats.
    pub fn write_vec3(&mut self, v: Vec3) -> Result<()> {
        self.write_f32(v.x)?;
        self.write_f32(v.y)?;
        self.write_f32(v.z)
    }

    /// Write a quaternion as x, y, z, w.
    pub fn write_quat(&mut self, q: Quat) -> Result<()> {
        self.write_f32(q.x)?;
        self.write_f32(q.y)?;
        self.write_f32(q.z)?;
        self.write_f32(q.w)
    }

    /// Write an ANSI string NUL-padded (or truncated) to exactly `width` bytes.
    pub fn write_fixed_string(&mut self, s: &str, width: usize) {
        let mut raw = encode_ansi(s);
        raw.resize(width, 0);
        self.write_bytes(&raw);
    }

    /// Write an i32 length followed by the ANSI bytes of `s`.
    pub fn write_prefixed_string(&mut self, s: &str) -> Result<()> {
        let raw = encode_ansi(s);
        self.write_count(raw.len())?;
        self.write_bytes(&raw);
        Ok(())
    }
}

/// Inverse of the reader's Latin-1 mapping; chars outside it become `?`.
fn encode_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::ByteReader;

    #[test]
    fn test_fixed_string_padding() {
        let mut w = ByteWriter::new();
        w.write_fixed_string("tex.bmp", 40);
        let out = w.into_inner();
        assert_eq!(out.len(), 40);
        assert_eq!(&out[..7], b"tex.bmp");
        assert!(out[7..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_strings_read_back() -> Result<()> {
        let mut w = ByteWriter::new();
        w.write_prefixed_string("\u{C7}name")?;
        w.write_fixed_string("short", 8);
        let out = w.into_inner();

        let mut r = ByteReader::new(&out);
        assert_eq!(r.prefixed_string()?, "\u{C7}name");
        assert_eq!(r.fixed_string(8)?, "short");
        Ok(())
    }

    #[test]
    fn test_unmappable_char() -> Result<()> {
        let mut w = ByteWriter::new();
        w.write_prefixed_string("a\u{AC00}")?;
        assert_eq!(&w.into_inner()[4..], b"a?");
        Ok(())
    }
}
