//! Mesh node: geometry, static transform, keyframe tracks and the
//! per-frame state derived from them.

use bytemuck::{Pod, Zeroable};
use smallvec::SmallVec;

use crate::anim::{
    evaluate, PositionKeyFrame, RotationKeyFrame, ScaleKeyFrame, TextureKeyFrameGroup, TrackCache,
};
use crate::util::{inverse_mat4, mat3_from_file, BoundingBox, Mat4, Quat, Result, Vec3};

/// Identity as the nine floats of a stored transform.
pub const IDENTITY_TRANSFORM: [f32; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// Color given to texture vertices of files that store none.
pub const OPAQUE_WHITE: u32 = 0xFFFF_FFFF;

/// Texture coordinate with its vertex color.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct TextureVertex {
    pub color: u32,
    pub u: f32,
    pub v: f32,
}

impl TextureVertex {
    /// Opaque white vertex at (u, v).
    pub fn new(u: f32, v: f32) -> Self {
        Self { color: OPAQUE_WHITE, u, v }
    }
}

/// Triangle referencing vertices, texture vertices and a mesh-relative texture.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub vertex_ids: [u16; 3],
    pub texture_vertex_ids: [u16; 3],
    /// Index into the owning mesh's `texture_indexes`.
    pub texture_id: u16,
    pub padding: u16,
    pub two_side: i32,
    /// One smoothing group per corner when present; files store 0 to 3.
    pub smooth_groups: SmallVec<[i32; 3]>,
}

impl Face {
    /// Face with a single smoothing group of 0.
    pub fn new(vertex_ids: [u16; 3], texture_vertex_ids: [u16; 3], texture_id: u16) -> Self {
        Self {
            vertex_ids,
            texture_vertex_ids,
            texture_id,
            padding: 0,
            two_side: 0,
            smooth_groups: smallvec::smallvec![0],
        }
    }

    /// True if the face should be drawn from both sides.
    #[inline]
    pub fn is_two_sided(&self) -> bool {
        self.two_side != 0
    }

    /// Smoothing group of corner `i`; a single stored group applies to every corner.
    pub fn smooth_group(&self, corner: usize) -> Option<i32> {
        self.smooth_groups
            .get(corner)
            .or_else(|| self.smooth_groups.first())
            .copied()
    }
}

/// Position/rotation/scale block carried by pre-2.2 files.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegacyTransform {
    pub position: Vec3,
    pub rot_angle: f32,
    pub rot_axis: Vec3,
    pub scale: Vec3,
}

impl Default for LegacyTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rot_angle: 0.0,
            rot_axis: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// One node of the model hierarchy.
///
/// Static data (everything decoded from the file) is public. Hierarchy
/// links are indices into the owning document's mesh list and are set by
/// hierarchy resolution. Matrices, bounding box and interpolation buffers
/// are rewritten by every frame evaluation.
#[derive(Clone, Debug)]
pub struct MeshNode {
    pub name: String,
    pub parent_name: String,
    /// Texture names owned by the mesh (2.3 and later).
    pub textures: Vec<String>,
    /// Relative texture id -> texture slot.
    pub texture_indexes: Vec<i32>,
    /// Static 3x3 transform, nine floats as stored.
    pub transform: [f32; 9],
    /// Anchor position, present in every version.
    pub anchor: Vec3,
    pub legacy: LegacyTransform,
    pub vertices: Vec<Vec3>,
    pub texture_vertices: Vec<TextureVertex>,
    pub faces: Vec<Face>,
    pub scale_key_frames: Vec<ScaleKeyFrame>,
    pub rotation_key_frames: Vec<RotationKeyFrame>,
    pub position_key_frames: Vec<PositionKeyFrame>,
    pub texture_key_frames: TextureKeyFrameGroup,
    pub bounding_box: BoundingBox,

    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) local_matrix: Mat4,
    pub(crate) self_matrix: Mat4,
    pub(crate) cache: TrackCache,
}

impl Default for MeshNode {
    fn default() -> Self {
        Self::new("")
    }
}

impl MeshNode {
    /// Create an empty mesh with identity transform.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_name: String::new(),
            textures: Vec::new(),
            texture_indexes: Vec::new(),
            transform: IDENTITY_TRANSFORM,
            anchor: Vec3::ZERO,
            legacy: LegacyTransform::default(),
            vertices: Vec::new(),
            texture_vertices: Vec::new(),
            faces: Vec::new(),
            scale_key_frames: Vec::new(),
            rotation_key_frames: Vec::new(),
            position_key_frames: Vec::new(),
            texture_key_frames: TextureKeyFrameGroup::new(),
            bounding_box: BoundingBox::default(),
            parent: None,
            children: Vec::new(),
            local_matrix: Mat4::IDENTITY,
            self_matrix: Mat4::IDENTITY,
            cache: TrackCache::default(),
        }
    }

    /// Set the parent name (builder style).
    pub fn with_parent(mut self, parent_name: impl Into<String>) -> Self {
        self.parent_name = parent_name.into();
        self
    }

    /// Index of the resolved parent.
    #[inline]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Indices of resolved children.
    #[inline]
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Own animated transform of the last evaluated frame, before ancestors.
    #[inline]
    pub fn local_matrix(&self) -> Mat4 {
        self.local_matrix
    }

    /// World transform of the last evaluated frame.
    #[inline]
    pub fn self_matrix(&self) -> Mat4 {
        self.self_matrix
    }

    /// Texture slot for a face's relative texture id.
    pub fn absolute_texture_id(&self, relative: usize) -> Option<i32> {
        self.texture_indexes.get(relative).copied()
    }

    /// Drop all interpolation buffers. Must run before a new frame is evaluated.
    pub fn clear_buffer(&mut self) {
        self.cache.clear();
    }

    /// True when no interpolated value is buffered.
    pub fn is_buffer_clear(&self) -> bool {
        self.cache.is_empty()
    }

    /// Interpolated scale at `frame`.
    pub fn scale_at(&mut self, frame: i32) -> Result<Vec3> {
        let track = &self.scale_key_frames;
        self.cache.scale.get_or_try_insert_with(frame, || evaluate(track, frame))
    }

    /// Interpolated rotation at `frame`.
    pub fn rotation_at(&mut self, frame: i32) -> Result<Quat> {
        let track = &self.rotation_key_frames;
        self.cache.rotation.get_or_try_insert_with(frame, || evaluate(track, frame))
    }

    /// Interpolated position offset at `frame`.
    pub fn position_at(&mut self, frame: i32) -> Result<Vec3> {
        let track = &self.position_key_frames;
        self.cache.position.get_or_try_insert_with(frame, || evaluate(track, frame))
    }

    /// Texture offset of (relative texture id, type) at `frame`; 0 when not animated.
    pub fn texture_offset_at(&mut self, frame: i32, texture_id: i32, kind: i32) -> Result<f32> {
        let frames = match self.texture_key_frames.frames(texture_id, kind) {
            Some(frames) if !frames.is_empty() => frames,
            _ => return Ok(0.0),
        };
        self.cache
            .texture
            .entry((texture_id, kind))
            .or_default()
            .get_or_try_insert_with(frame, || evaluate(frames, frame))
    }

    /// Own transform at `frame`: scale, then rotation.
    ///
    /// Without rotation keys the static transform is used, followed by the
    /// inverse of the parent's static transform.
    pub(crate) fn animated_local(
        &mut self,
        frame: i32,
        parent_transform: Option<&[f32; 9]>,
    ) -> Result<Mat4> {
        let mut m = Mat4::IDENTITY;

        if !self.scale_key_frames.is_empty() {
            m = Mat4::from_scale(self.scale_at(frame)?) * m;
        }

        if !self.rotation_key_frames.is_empty() {
            m = Mat4::from_quat(self.rotation_at(frame)?) * m;
        } else {
            m = Mat4::from_mat3(mat3_from_file(&self.transform)) * m;
            if let Some(pt) = parent_transform {
                m = inverse_mat4(pt) * m;
            }
        }

        Ok(m)
    }

    /// Offset of this node from its parent at `frame`.
    pub(crate) fn frame_offset(
        &mut self,
        frame: i32,
        parent: Option<(&[f32; 9], Vec3)>,
    ) -> Result<Vec3> {
        if !self.position_key_frames.is_empty() {
            return self.position_at(frame);
        }
        Ok(match parent {
            Some((transform, anchor)) => inverse_mat4(transform).transform_point3(self.anchor - anchor),
            None => self.anchor,
        })
    }

    /// Vertices placed in world space with the last evaluated self matrix.
    pub fn world_vertices(&self) -> Vec<Vec3> {
        self.vertices
            .iter()
            .map(|v| self.self_matrix.transform_point3(*v))
            .collect()
    }

    /// Highest keyed frame across scale, rotation and position tracks.
    pub fn last_key_frame(&self) -> Option<i32> {
        [
            crate::anim::last_frame(&self.scale_key_frames),
            crate::anim::last_frame(&self.rotation_key_frames),
            crate::anim::last_frame(&self.position_key_frames),
        ]
        .into_iter()
        .flatten()
        .max()
    }
}

impl std::fmt::Display for MeshNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Name = {}", self.name)
    }
}
