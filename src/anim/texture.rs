//! Texture coordinate animation.
//!
//! A mesh may animate the UVs of each of its textures. Tracks are keyed
//! by (relative texture id, animation type) and kept in file order so
//! encoding reproduces the input layout.

use super::keyframe::TextureKeyFrame;
use crate::util::{rotate_uv, Vec2};

/// What a texture offset track does to a UV pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureAnimationType {
    /// Add the offset to U.
    UShift,
    /// Add the offset to V.
    VShift,
    /// Multiply U by the offset.
    UScale,
    /// Multiply V by the offset.
    VScale,
    /// Rotate (U, V) about the origin by the offset in radians.
    Rotation,
    /// Unknown type code, carried through untouched.
    Other(i32),
}

impl TextureAnimationType {
    /// Map a file type code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::UShift,
            1 => Self::VShift,
            2 => Self::UScale,
            3 => Self::VScale,
            4 => Self::Rotation,
            other => Self::Other(other),
        }
    }

    /// File type code.
    pub fn code(self) -> i32 {
        match self {
            Self::UShift => 0,
            Self::VShift => 1,
            Self::UScale => 2,
            Self::VScale => 3,
            Self::Rotation => 4,
            Self::Other(code) => code,
        }
    }

    /// Apply an evaluated offset to one UV corner.
    pub fn apply(self, uv: Vec2, offset: f32) -> Vec2 {
        match self {
            Self::UShift => Vec2::new(uv.x + offset, uv.y),
            Self::VShift => Vec2::new(uv.x, uv.y + offset),
            Self::UScale => Vec2::new(uv.x * offset, uv.y),
            Self::VScale => Vec2::new(uv.x, uv.y * offset),
            Self::Rotation => rotate_uv(uv, offset),
            Self::Other(_) => uv,
        }
    }

    /// Rotated UV fields overlap themselves, so the texture must not tile.
    #[inline]
    pub fn disables_tiling(self) -> bool {
        self == Self::Rotation
    }
}

/// Keyframes for one animation type of one texture.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureTrack {
    pub kind: i32,
    pub frames: Vec<TextureKeyFrame>,
}

/// All animated types of one texture.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureAnimation {
    pub texture_id: i32,
    pub tracks: Vec<TextureTrack>,
}

/// Texture animation tracks of a mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextureKeyFrameGroup {
    animations: Vec<TextureAnimation>,
}

impl TextureKeyFrameGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of animated textures.
    pub fn len(&self) -> usize {
        self.animations.len()
    }

    /// True when no texture is animated.
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    /// Animated textures in file order.
    pub fn animations(&self) -> &[TextureAnimation] {
        &self.animations
    }

    /// Distinct animation type codes across all textures, in first-seen order.
    pub fn types(&self) -> Vec<i32> {
        let mut types = Vec::new();
        for track in self.animations.iter().flat_map(|a| &a.tracks) {
            if !types.contains(&track.kind) {
                types.push(track.kind);
            }
        }
        types
    }

    /// Append a key to the (texture, type) track, creating it if needed.
    pub fn add_key_frame(&mut self, texture_id: i32, kind: i32, frame: TextureKeyFrame) {
        self.track_mut(texture_id, kind).frames.push(frame);
    }

    /// Get or create the (texture, type) track.
    pub fn track_mut(&mut self, texture_id: i32, kind: i32) -> &mut TextureTrack {
        let existing = self
            .animations
            .iter()
            .position(|a| a.texture_id == texture_id && a.tracks.iter().any(|t| t.kind == kind));
        let ai = match existing.or_else(|| self.animations.iter().position(|a| a.texture_id == texture_id)) {
            Some(i) => i,
            None => {
                self.animations.push(TextureAnimation { texture_id, tracks: Vec::new() });
                self.animations.len() - 1
            }
        };
        let anim = &mut self.animations[ai];
        let ti = match anim.tracks.iter().position(|t| t.kind == kind) {
            Some(i) => i,
            None => {
                anim.tracks.push(TextureTrack { kind, frames: Vec::new() });
                anim.tracks.len() - 1
            }
        };
        &mut anim.tracks[ti]
    }

    /// Keyframes for (texture, type), if that pair is animated.
    ///
    /// A texture may be listed in several blocks; the first block holding
    /// the type wins.
    pub fn frames(&self, texture_id: i32, kind: i32) -> Option<&[TextureKeyFrame]> {
        self.animations
            .iter()
            .filter(|a| a.texture_id == texture_id)
            .flat_map(|a| &a.tracks)
            .find(|t| t.kind == kind)
            .map(|t| t.frames.as_slice())
    }

    /// True if (texture, type) has at least one key.
    pub fn has_animation(&self, texture_id: i32, kind: i32) -> bool {
        self.frames(texture_id, kind).is_some_and(|f| !f.is_empty())
    }

    /// Push a fully built texture animation (decoder use).
    pub(crate) fn push(&mut self, animation: TextureAnimation) {
        self.animations.push(animation);
    }
}
