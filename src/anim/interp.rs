//! Keyframe interpolation engine.
//!
//! [`evaluate`] samples a frame-ascending track at an integer frame.
//! Queries outside the keyed range clamp to the boundary key; queries
//! between keys interpolate linearly (slerp for rotations).

use std::collections::HashMap;

use super::keyframe::KeyFrame;
use crate::util::{Error, Quat, Result, Vec3};

/// Blend between two sampled values.
pub trait Interpolate: Copy {
    /// Value at `t` in `[0, 1]` between `a` and `b`.
    fn interpolate(a: Self, b: Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    #[inline]
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        t * (b - a) + a
    }
}

impl Interpolate for Vec3 {
    #[inline]
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        t * (b - a) + a
    }
}

impl Interpolate for Quat {
    /// Spherical interpolation along the shorter arc.
    #[inline]
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        a.slerp(b, t)
    }
}

/// Sample `track` at `frame`.
///
/// The track must be non-empty and sorted by frame; an empty track is a
/// caller bug and reports [`Error::EmptyKeyframeTrack`].
pub fn evaluate<K>(track: &[K], frame: i32) -> Result<K::Value>
where
    K: KeyFrame,
    K::Value: Interpolate,
{
    let (first, last) = match (track.first(), track.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(Error::EmptyKeyframeTrack),
    };

    if frame <= first.frame() {
        return Ok(first.value());
    }
    if frame >= last.frame() {
        return Ok(last.value());
    }

    // first.frame < frame < last.frame, so 1 <= next < len
    let next = track.partition_point(|k| k.frame() <= frame);
    let cur = &track[next - 1];
    let nxt = &track[next];

    if cur.frame() == frame {
        return Ok(cur.value());
    }

    // Frames span the full i32 range.
    let dist = (i64::from(nxt.frame()) - i64::from(cur.frame())) as f32;
    let t = (i64::from(frame) - i64::from(cur.frame())) as f32 / dist;
    Ok(K::Value::interpolate(cur.value(), nxt.value(), t))
}

/// Single-slot memo of the most recently evaluated frame.
#[derive(Clone, Debug)]
pub struct Memo<T> {
    slot: Option<(i32, T)>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T: Copy> Memo<T> {
    /// Cached value for `frame`, or the result of `f` (which is then cached).
    ///
    /// The slot is tagged with its frame, so a lookup for a different
    /// frame never returns a stale value even if [`clear`](Self::clear)
    /// was skipped.
    pub fn get_or_try_insert_with(
        &mut self,
        frame: i32,
        f: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        match self.slot {
            Some((cached, value)) if cached == frame => Ok(value),
            Some((cached, _)) => {
                tracing::trace!(cached, frame, "memo not cleared before new frame");
                let value = f()?;
                self.slot = Some((frame, value));
                Ok(value)
            }
            None => {
                let value = f()?;
                self.slot = Some((frame, value));
                Ok(value)
            }
        }
    }

    /// Currently cached `(frame, value)`.
    pub fn cached(&self) -> Option<(i32, T)> {
        self.slot
    }

    /// Drop the cached value.
    pub fn clear(&mut self) {
        self.slot = None;
    }
}

/// Per-mesh interpolation buffers for one frame.
#[derive(Clone, Debug, Default)]
pub struct TrackCache {
    pub scale: Memo<Vec3>,
    pub rotation: Memo<Quat>,
    pub position: Memo<Vec3>,
    /// Keyed by (relative texture id, animation type).
    pub texture: HashMap<(i32, i32), Memo<f32>>,
}

impl TrackCache {
    /// Invalidate every buffered value.
    pub fn clear(&mut self) {
        self.scale.clear();
        self.rotation.clear();
        self.position.clear();
        self.texture.clear();
    }

    /// True when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.scale.cached().is_none()
            && self.rotation.cached().is_none()
            && self.position.cached().is_none()
            && self.texture.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::keyframe::{PositionKeyFrame, RotationKeyFrame, TextureKeyFrame};

    fn tex(frame: i32, offset: f32) -> TextureKeyFrame {
        TextureKeyFrame { frame, offset }
    }

    fn pos(frame: i32, x: f32) -> PositionKeyFrame {
        PositionKeyFrame { frame, position: Vec3::new(x, 2.0 * x, -x), data: 0 }
    }

    #[test]
    fn test_empty_track() {
        let track: [TextureKeyFrame; 0] = [];
        assert!(matches!(evaluate(&track, 0), Err(Error::EmptyKeyframeTrack)));
    }

    #[test]
    fn test_clamp_to_boundaries() -> Result<()> {
        let track = [tex(10, 1.0), tex(20, 3.0), tex(30, -2.0)];
        assert_eq!(evaluate(&track, -5)?, 1.0);
        assert_eq!(evaluate(&track, 10)?, 1.0);
        assert_eq!(evaluate(&track, 30)?, -2.0);
        assert_eq!(evaluate(&track, 1000)?, -2.0);
        Ok(())
    }

    #[test]
    fn test_exact_keys() -> Result<()> {
        let track = [pos(0, 0.0), pos(7, 1.25), pos(9, -3.5), pos(40, 8.0)];
        for key in &track {
            assert_eq!(evaluate(&track, key.frame)?, key.position);
        }
        Ok(())
    }

    #[test]
    fn test_linear_midpoint() -> Result<()> {
        let track = [tex(0, 0.0), tex(10, 5.0), tex(20, 1.0)];
        assert!((evaluate(&track, 5)? - 2.5).abs() < 1e-6);
        assert!((evaluate(&track, 15)? - 3.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_extreme_frames() -> Result<()> {
        let track = [tex(i32::MIN, 0.0), tex(i32::MAX, 1.0)];
        assert!((evaluate(&track, 0)? - 0.5).abs() < 1e-6);
        assert!((evaluate(&track, i32::MAX - 1)? - 1.0).abs() < 1e-6);
        assert_eq!(evaluate(&track, i32::MIN)?, 0.0);
        Ok(())
    }

    #[test]
    fn test_single_key() -> Result<()> {
        let track = [pos(4, 2.0)];
        assert_eq!(evaluate(&track, 0)?, track[0].position);
        assert_eq!(evaluate(&track, 99)?, track[0].position);
        Ok(())
    }

    #[test]
    fn test_slerp_monotonic() -> Result<()> {
        let a = Quat::IDENTITY;
        // Same orientation as a 170 degree turn, stored with negated sign.
        let b = -Quat::from_rotation_y(170f32.to_radians());
        let track = [
            RotationKeyFrame { frame: 0, rotation: a },
            RotationKeyFrame { frame: 100, rotation: b },
        ];

        let mut last_angle = -1.0f32;
        for frame in 0..=100 {
            let q = evaluate(&track, frame)?;
            let angle = q.angle_between(a);
            assert!(angle + 1e-4 >= last_angle, "frame {frame}: {angle} < {last_angle}");
            assert!(q.angle_between(b) <= a.angle_between(b) + 1e-4);
            last_angle = angle;
        }
        Ok(())
    }

    #[test]
    fn test_memo_tagged_by_frame() -> Result<()> {
        let mut memo = Memo::default();
        assert_eq!(memo.get_or_try_insert_with(3, || Ok(1.0f32))?, 1.0);
        // Same frame is served from the slot.
        assert_eq!(memo.get_or_try_insert_with(3, || Ok(9.0f32))?, 1.0);
        // A different frame recomputes.
        assert_eq!(memo.get_or_try_insert_with(4, || Ok(2.0f32))?, 2.0);
        memo.clear();
        assert!(memo.cached().is_none());
        Ok(())
    }

    #[test]
    fn test_memo_error_not_cached() {
        let mut memo: Memo<f32> = Memo::default();
        assert!(memo.get_or_try_insert_with(1, || Err(Error::EmptyKeyframeTrack)).is_err());
        assert!(memo.cached().is_none());
    }
}
