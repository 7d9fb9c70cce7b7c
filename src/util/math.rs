//! Math type re-exports and RSM-specific math utilities.
//!
//! RSM stores its matrices row-major for row-vector math (`v' = v * M`).
//! That float order is exactly the column-major layout of the equivalent
//! column-vector matrix, so the stored floats load straight into `glam`
//! with `from_cols_array` and every composition here is written in
//! column-vector order (`M * v`).

pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Determinant magnitude below which a static transform is treated as singular.
const SINGULAR_EPSILON: f32 = 1e-12;

/// Build a column-vector matrix from the nine floats of an RSM transform.
#[inline]
pub fn mat3_from_file(m: &[f32; 9]) -> Mat3 {
    Mat3::from_cols_array(m)
}

/// Inverse of the nine floats stored in a file, as a 4x4 matrix.
///
/// Singular transforms (all-zero matrices occur in some legacy exports)
/// invert to identity.
pub fn inverse_mat4(m: &[f32; 9]) -> Mat4 {
    let m = mat3_from_file(m);
    if m.determinant().abs() < SINGULAR_EPSILON {
        tracing::trace!("singular static transform, using identity inverse");
        return Mat4::IDENTITY;
    }
    Mat4::from_mat3(m.inverse())
}

/// Rotate a 2D point around the origin by `angle` radians.
///
/// Runs through the same 4x4 Z rotation used for mesh transforms,
/// with the point placed at `z = 0`.
#[inline]
pub fn rotate_uv(uv: Vec2, angle: f32) -> Vec2 {
    Mat4::from_rotation_z(angle)
        .transform_point3(uv.extend(0.0))
        .truncate()
}

/// Axis-aligned bounding box of a mesh, in the layout the renderer reads.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
    /// Half extents.
    pub range: Vec3,
    pub center: Vec3,
    /// Midpoint of min and max.
    pub offset: Vec3,
}

impl BoundingBox {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
        range: Vec3::ZERO,
        center: Vec3::ZERO,
        offset: Vec3::ZERO,
    };

    /// Box enclosing all `points`; an empty input yields a zeroed box.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut b = Self::EMPTY;
        for p in points {
            b.expand_by_point(*p);
        }
        if b.is_empty() {
            return Self::zeroed();
        }
        b.update_derived();
        b
    }

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand min/max to include a point. Call [`update_derived`](Self::update_derived) afterwards.
    #[inline]
    pub fn expand_by_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Recompute range, offset and center from min/max.
    pub fn update_derived(&mut self) {
        self.offset = (self.max + self.min) / 2.0;
        self.range = (self.max - self.min) / 2.0;
        self.center = self.min + self.range;
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl fmt::Debug for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundingBox({:?} - {:?})", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let pts = [Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 4.0, 6.0)];
        let b = BoundingBox::from_points(&pts);
        assert_eq!(b.min, Vec3::new(-1.0, 0.0, 2.0));
        assert_eq!(b.max, Vec3::new(3.0, 4.0, 6.0));
        assert_eq!(b.range, Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(b.offset, Vec3::new(1.0, 2.0, 4.0));
        assert_eq!(b.center, b.offset);
    }

    #[test]
    fn test_bounding_box_empty_input() {
        let b = BoundingBox::from_points(&[]);
        assert_eq!(b, BoundingBox::default());
    }

    #[test]
    fn test_file_matrix_layout() {
        // Row-major storage of a row-vector rotation 90 degrees about Z.
        let m = mat3_from_file(&[0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        let v = m * Vec3::X;
        assert!((v - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_singular_inverse() {
        assert_eq!(inverse_mat4(&[0.0; 9]), Mat4::IDENTITY);
        let inv = inverse_mat4(&[2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0]);
        assert!((inv.transform_point3(Vec3::ONE) - Vec3::splat(0.5)).length() < 1e-6);
    }

    #[test]
    fn test_rotate_uv() {
        let r = rotate_uv(Vec2::new(1.0, 0.0), std::f32::consts::FRAC_PI_2);
        assert!((r - Vec2::new(0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_bbox_pod() {
        assert_eq!(std::mem::size_of::<BoundingBox>(), 60); // 5 * Vec3
    }
}
