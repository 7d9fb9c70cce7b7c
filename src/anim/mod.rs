//! Keyframe tracks and their interpolation.
//!
//! - [`keyframe`] - Scale, rotation, position and texture keys
//! - [`interp`] - Sampling engine and per-frame memo
//! - [`texture`] - UV animation tracks and their effect on coordinates

pub mod interp;
pub mod keyframe;
pub mod texture;

pub use interp::{evaluate, Interpolate, Memo, TrackCache};
pub use keyframe::{
    last_frame, KeyFrame, PositionKeyFrame, RotationKeyFrame, ScaleKeyFrame, TextureKeyFrame,
};
pub use texture::{TextureAnimation, TextureAnimationType, TextureKeyFrameGroup, TextureTrack};
