//! Mesh hierarchy.
//!
//! - [`node`] - Mesh node data and per-node animation sampling
//! - [`hierarchy`] - Name-based parent resolution and texture dedup
//! - [`calc`] - Per-frame world transform composition

pub mod calc;
pub mod hierarchy;
pub mod node;

pub use calc::calc_subtree;
pub use hierarchy::{check_acyclic, dedup_textures, resolve_links, roots};
pub use node::{Face, LegacyTransform, MeshNode, TextureVertex, IDENTITY_TRANSFORM, OPAQUE_WHITE};
