//! Renderer hand-off.
//!
//! Turns an evaluated document into flat, per-texture triangle lists in
//! world space, sorted for back-to-front drawing.
//!
//! - [`order`] - Transparency draw order
//! - [`texture`] - Texture path resolution and the asset lookup trait

pub mod order;
pub mod texture;

pub use order::TransparencyOrder;
pub use texture::{texture_path, DirectorySource, TextureSource};

use std::collections::HashMap;

use rayon::prelude::*;

use crate::anim::TextureAnimationType;
use crate::config::Settings;
use crate::document::{mesh_texture_name, Document};
use crate::format::Version;
use crate::mesh::{Face, MeshNode};
use crate::util::{BoundingBox, Error, Result, Vec2, Vec3};

/// Triangles of one mesh sharing one texture.
///
/// `positions`, `normals` and `uvs` hold three entries per triangle.
#[derive(Clone, Debug, Default)]
pub struct DrawGroup {
    pub texture: String,
    /// Index of the owning mesh in the document.
    pub mesh: usize,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Set when a rotated UV animation forbids tiling.
    pub no_tile: bool,
    /// Center of the owning mesh's bounding box.
    pub center: Vec3,
    pub bounding_box: BoundingBox,
}

impl DrawGroup {
    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Place a mesh's vertices in world space and refresh its bounding box.
///
/// Uses the self matrix of the last evaluated frame.
pub fn compile_mesh(node: &mut MeshNode) -> Vec<Vec3> {
    let world = node.world_vertices();
    node.bounding_box = BoundingBox::from_points(&world);
    world
}

/// Per-vertex normals: the sum of adjacent face cross products, normalized.
pub fn vertex_normals(vertices: &[Vec3], faces: &[Face]) -> Result<Vec<Vec3>> {
    let mut normals = vec![Vec3::ZERO; vertices.len()];
    for face in faces {
        let [a, b, c] = face.vertex_ids.map(usize::from);
        let (p0, p1, p2) = (
            corner(vertices, a, "vertex")?,
            corner(vertices, b, "vertex")?,
            corner(vertices, c, "vertex")?,
        );
        let n = (p1 - p0).cross(p2 - p0);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    Ok(normals.into_iter().map(Vec3::normalize_or_zero).collect())
}

fn corner<T: Copy>(list: &[T], index: usize, what: &str) -> Result<T> {
    list.get(index)
        .copied()
        .ok_or_else(|| Error::invalid(format!("{what} index {index} out of range ({})", list.len())))
}

/// Evaluate `doc` at `frame` and build its sorted draw groups.
///
/// Meshes are converted in parallel once the hierarchy is evaluated.
#[tracing::instrument(skip(doc, settings), fields(meshes = doc.meshes.len()))]
pub fn collect(
    doc: &mut Document,
    frame: i32,
    origin: Vec3,
    settings: &Settings,
) -> Result<Vec<DrawGroup>> {
    doc.calc(frame)?;

    let version = doc.version();
    let textures = &doc.textures;
    let per_mesh: Vec<Vec<DrawGroup>> = doc
        .meshes
        .par_iter_mut()
        .enumerate()
        .map(|(i, mesh)| collect_mesh(i, mesh, version, textures, frame))
        .collect::<Result<_>>()?;

    let mut groups: Vec<DrawGroup> = per_mesh.into_iter().flatten().collect();
    TransparencyOrder::new(&doc.meshes, origin, &settings.always_last_extension).sort(&mut groups);

    tracing::debug!("frame {frame}: {} draw groups", groups.len());
    Ok(groups)
}

fn collect_mesh(
    index: usize,
    mesh: &mut MeshNode,
    version: Version,
    global_textures: &[String],
    frame: i32,
) -> Result<Vec<DrawGroup>> {
    let world = compile_mesh(mesh);
    let normals = vertex_normals(&world, &mesh.faces)?;
    let uvs: Vec<Vec2> = mesh.texture_vertices.iter().map(|t| Vec2::new(t.u, t.v)).collect();
    let types = mesh.texture_key_frames.types();

    let mut groups: Vec<DrawGroup> = Vec::new();
    let mut by_texture: HashMap<String, usize> = HashMap::new();

    for f in 0..mesh.faces.len() {
        let face = mesh.faces[f].clone();
        let relative = face.texture_id as usize;
        let texture = mesh_texture_name(version, global_textures, mesh, relative)
            .map(str::to_owned)
            .ok_or_else(|| {
                Error::invalid(format!("mesh {:?}: texture id {relative} out of range", mesh.name))
            })?;

        let gi = match by_texture.get(&texture) {
            Some(&gi) => gi,
            None => {
                groups.push(DrawGroup {
                    texture: texture.clone(),
                    mesh: index,
                    center: mesh.bounding_box.center,
                    bounding_box: mesh.bounding_box,
                    ..DrawGroup::default()
                });
                by_texture.insert(texture, groups.len() - 1);
                groups.len() - 1
            }
        };

        let mut corners = [Vec2::ZERO; 3];
        for (k, uv) in corners.iter_mut().enumerate() {
            *uv = corner(&uvs, face.texture_vertex_ids[k] as usize, "texture vertex")?;
        }

        let mut no_tile = false;
        for &kind in &types {
            if !mesh.texture_key_frames.has_animation(relative as i32, kind) {
                continue;
            }
            let offset = mesh.texture_offset_at(frame, relative as i32, kind)?;
            let anim = TextureAnimationType::from_code(kind);
            for uv in corners.iter_mut() {
                *uv = anim.apply(*uv, offset);
            }
            no_tile |= anim.disables_tiling();
        }

        let group = &mut groups[gi];
        group.no_tile |= no_tile;
        for k in 0..3 {
            let v = face.vertex_ids[k] as usize;
            group.positions.push(corner(&world, v, "vertex")?);
            group.normals.push(normals[v]);
            group.uvs.push(corners[k]);
        }
    }

    tracing::trace!(mesh = %mesh.name, groups = groups.len(), "collected mesh");
    Ok(groups)
}
