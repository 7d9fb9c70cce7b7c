//! Document header.

use super::version::Version;
use crate::binary::{ByteReader, ByteWriter};
use crate::util::{Error, Result};

/// Magic bytes at the start of an RSM file.
pub const RSM_MAGIC: &[u8; 4] = b"GRSM";

/// Size of the reserved block in pre-2.2 headers.
pub const RESERVED_LEN: usize = 16;

/// Shading mode requested by the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShadeType {
    None,
    Flat,
    Smooth,
    /// Unknown code, carried through untouched.
    Other(i32),
}

impl ShadeType {
    /// Map a file code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::None,
            1 => Self::Flat,
            2 => Self::Smooth,
            other => Self::Other(other),
        }
    }

    /// File code.
    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Flat => 1,
            Self::Smooth => 2,
            Self::Other(code) => code,
        }
    }
}

/// Fixed leading fields of a document.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub version: Version,
    /// Animation length stored in the file.
    pub anim_len: i32,
    pub shade_type: ShadeType,
    /// Model alpha; 255 for files older than 1.4.
    pub alpha: u8,
    /// Frames per second (2.2 and later); 0 when the file stores none.
    pub frame_rate: f32,
    /// Reserved bytes of pre-2.2 headers, kept verbatim.
    pub reserved: [u8; RESERVED_LEN],
}

impl Header {
    /// Header for a new document of `version`.
    pub fn new(version: Version) -> Self {
        Self {
            version,
            anim_len: 0,
            shade_type: ShadeType::Smooth,
            alpha: 255,
            frame_rate: if version.is_rsm2() { 30.0 } else { 0.0 },
            reserved: [0; RESERVED_LEN],
        }
    }

    /// Read and validate the header.
    pub fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        if r.bytes(RSM_MAGIC.len())? != RSM_MAGIC {
            return Err(Error::InvalidMagic);
        }

        let version = Version::new(r.u8()?, r.u8()?);
        if !version.is_supported() {
            return Err(Error::UnsupportedVersion { major: version.major, minor: version.minor });
        }

        let anim_len = r.i32()?;
        let shade_type = ShadeType::from_code(r.i32()?);
        let alpha = if version >= Version::V1_4 { r.u8()? } else { 255 };

        let mut reserved = [0u8; RESERVED_LEN];
        let frame_rate = if version.is_rsm2() {
            r.f32()?
        } else {
            reserved.copy_from_slice(r.bytes(RESERVED_LEN)?);
            0.0
        };

        Ok(Self { version, anim_len, shade_type, alpha, frame_rate, reserved })
    }

    /// Write the header for its own version.
    pub fn write(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_bytes(RSM_MAGIC);
        w.write_u8(self.version.major)?;
        w.write_u8(self.version.minor)?;
        w.write_i32(self.anim_len)?;
        w.write_i32(self.shade_type.code())?;
        if self.version >= Version::V1_4 {
            w.write_u8(self.alpha)?;
        }
        if self.version.is_rsm2() {
            w.write_f32(self.frame_rate)?;
        } else {
            w.write_bytes(&self.reserved);
        }
        Ok(())
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new(Version::LATEST)
    }
}
