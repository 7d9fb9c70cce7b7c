//! # RSM
//!
//! Reader, writer and animation evaluator for the RSM binary model format:
//! hierarchical meshes with per-mesh scale, rotation, position and texture
//! coordinate keyframes.
//!
//! ## Modules
//!
//! - [`util`] - Errors, math types, bounding boxes
//! - [`binary`] - Little-endian byte cursor and writer
//! - [`anim`] - Keyframe tracks, interpolation, texture animation
//! - [`mesh`] - Mesh nodes, hierarchy resolution, transform composition
//! - [`format`] - Version-dispatched binary codec
//! - [`document`] - The model container
//! - [`scene`] - World-space draw groups for a renderer
//! - [`worker`] - Background frame evaluation and playback clock
//! - [`config`] - Persistent settings
//!
//! ## Example
//!
//! ```ignore
//! use rsm::prelude::*;
//!
//! let mut doc = Document::open("model.rsm")?;
//! doc.calc(10)?;
//!
//! for mesh in &doc.meshes {
//!     println!("{} at {:?}", mesh.name, mesh.self_matrix().w_axis);
//! }
//! ```

pub mod util;
pub mod binary;
pub mod anim;
pub mod mesh;
pub mod format;
pub mod document;
pub mod scene;
pub mod worker;
pub mod config;

// Re-export commonly used types
pub use util::{Error, LoadWarning, Result};
pub use document::Document;
pub use format::Version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{BoundingBox, Error, LoadWarning, Mat4, Quat, Result, Vec2, Vec3};
    pub use crate::anim::{
        PositionKeyFrame, RotationKeyFrame, ScaleKeyFrame, TextureAnimationType, TextureKeyFrame,
    };
    pub use crate::mesh::{Face, MeshNode, TextureVertex};
    pub use crate::format::{Header, ShadeType, Version, VolumeBox};
    pub use crate::document::Document;
    pub use crate::scene::{collect, DrawGroup, TextureSource};
    pub use crate::config::Settings;
}
