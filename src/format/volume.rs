//! Volume boxes.

use crate::binary::{ByteReader, ByteWriter};
use crate::util::{Result, Vec3};

/// Oriented collision volume attached to a model.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VolumeBox {
    pub size: Vec3,
    pub position: Vec3,
    pub rotation: Vec3,
    /// Stored from 1.3 on; 0 for older files.
    pub flag: i32,
}

impl VolumeBox {
    /// Encoded size without the flag.
    pub const SIZE_NO_FLAG: usize = 36;
    /// Encoded size with the flag.
    pub const SIZE: usize = 40;

    /// Read one box; `no_flag` selects the pre-1.3 layout.
    pub fn read(r: &mut ByteReader<'_>, no_flag: bool) -> Result<Self> {
        let size = r.vec3()?;
        let position = r.vec3()?;
        let rotation = r.vec3()?;
        let flag = if no_flag { 0 } else { r.i32()? };
        Ok(Self { size, position, rotation, flag })
    }

    /// Write one box; `no_flag` selects the pre-1.3 layout.
    pub fn write(&self, w: &mut ByteWriter, no_flag: bool) -> Result<()> {
        w.write_vec3(self.size)?;
        w.write_vec3(self.position)?;
        w.write_vec3(self.rotation)?;
        if !no_flag {
            w.write_i32(self.flag)?;
        }
        Ok(())
    }
}
