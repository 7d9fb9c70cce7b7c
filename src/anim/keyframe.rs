//! Keyframe sample types.
//!
//! Tracks are stored as plain `Vec`s sorted by frame, in file order.

use crate::binary::{ByteReader, ByteWriter};
use crate::util::{Quat, Result, Vec3};

/// Common view over every keyframe kind, used by the interpolation engine.
pub trait KeyFrame {
    /// Sampled value type.
    type Value: Copy;

    /// Frame number of this key.
    fn frame(&self) -> i32;

    /// Sampled value at this key.
    fn value(&self) -> Self::Value;
}

/// Scale key: per-axis scale plus an opaque float the exporter writes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleKeyFrame {
    pub frame: i32,
    pub scale: Vec3,
    pub data: f32,
}

/// Rotation key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationKeyFrame {
    pub frame: i32,
    pub rotation: Quat,
}

/// Position key: offset from the parent plus an opaque integer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionKeyFrame {
    pub frame: i32,
    pub position: Vec3,
    pub data: i32,
}

/// Texture animation key: a single scalar offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureKeyFrame {
    pub frame: i32,
    pub offset: f32,
}

impl KeyFrame for ScaleKeyFrame {
    type Value = Vec3;
    fn frame(&self) -> i32 {
        self.frame
    }
    fn value(&self) -> Vec3 {
        self.scale
    }
}

impl KeyFrame for RotationKeyFrame {
    type Value = Quat;
    fn frame(&self) -> i32 {
        self.frame
    }
    fn value(&self) -> Quat {
        self.rotation
    }
}

impl KeyFrame for PositionKeyFrame {
    type Value = Vec3;
    fn frame(&self) -> i32 {
        self.frame
    }
    fn value(&self) -> Vec3 {
        self.position
    }
}

impl KeyFrame for TextureKeyFrame {
    type Value = f32;
    fn frame(&self) -> i32 {
        self.frame
    }
    fn value(&self) -> f32 {
        self.offset
    }
}

impl ScaleKeyFrame {
    /// Encoded size in bytes.
    pub const SIZE: usize = 20;

    pub(crate) fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self { frame: r.i32()?, scale: r.vec3()?, data: r.f32()? })
    }

    pub(crate) fn write(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_i32(self.frame)?;
        w.write_vec3(self.scale)?;
        w.write_f32(self.data)
    }
}

impl RotationKeyFrame {
    /// Encoded size in bytes.
    pub const SIZE: usize = 20;

    pub(crate) fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self { frame: r.i32()?, rotation: r.quat()? })
    }

    pub(crate) fn write(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_i32(self.frame)?;
        w.write_quat(self.rotation)
    }
}

impl PositionKeyFrame {
    /// Encoded size in bytes.
    pub const SIZE: usize = 20;
    /// Encoded size of the model-level keys of old files (no trailing data).
    pub const LEGACY_SIZE: usize = 16;

    pub(crate) fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self { frame: r.i32()?, position: r.vec3()?, data: r.i32()? })
    }

    pub(crate) fn write(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_i32(self.frame)?;
        w.write_vec3(self.position)?;
        w.write_i32(self.data)
    }

    pub(crate) fn read_legacy(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self { frame: r.i32()?, position: r.vec3()?, data: 0 })
    }

    pub(crate) fn write_legacy(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_i32(self.frame)?;
        w.write_vec3(self.position)
    }
}

impl TextureKeyFrame {
    /// Encoded size in bytes.
    pub const SIZE: usize = 8;

    pub(crate) fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self { frame: r.i32()?, offset: r.f32()? })
    }

    pub(crate) fn write(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_i32(self.frame)?;
        w.write_f32(self.offset)
    }
}

/// Largest frame number in a track, if any.
pub fn last_frame<K: KeyFrame>(track: &[K]) -> Option<i32> {
    track.iter().map(KeyFrame::frame).max()
}
