//! Parent/child resolution and texture deduplication.
//!
//! Meshes are decoded as a flat list; links are rebuilt from names and
//! stored as indices into that list.

use std::collections::HashSet;

use super::node::MeshNode;
use crate::util::{Error, LoadWarning, Result};

/// Link every mesh to the first other mesh whose name equals its parent name.
///
/// Unmatched parent names leave the mesh as a root and produce a warning.
/// A parent chain that loops is rejected.
pub fn resolve_links(meshes: &mut [MeshNode]) -> Result<Vec<LoadWarning>> {
    let mut warnings = Vec::new();

    for mesh in meshes.iter_mut() {
        mesh.parent = None;
        mesh.children.clear();
    }

    for i in 0..meshes.len() {
        if meshes[i].parent_name.is_empty() {
            continue;
        }
        let parent_name = meshes[i].parent_name.clone();

        let found = meshes
            .iter()
            .enumerate()
            .find(|(j, m)| *j != i && m.name == parent_name)
            .map(|(j, _)| j);

        match found {
            Some(p) => meshes[i].parent = Some(p),
            None => {
                tracing::warn!(mesh = %meshes[i].name, parent = %parent_name, "unresolved parent");
                warnings.push(LoadWarning::UnresolvedParent {
                    mesh: meshes[i].name.clone(),
                    parent: parent_name.clone(),
                });
            }
        }
    }

    check_acyclic(meshes)?;

    for i in 0..meshes.len() {
        if let Some(p) = meshes[i].parent {
            meshes[p].children.push(i);
        }
    }

    Ok(warnings)
}

/// Walk every parent chain with a bound of `meshes.len()` steps.
pub fn check_acyclic(meshes: &[MeshNode]) -> Result<()> {
    for (i, mesh) in meshes.iter().enumerate() {
        let mut cur = mesh.parent;
        let mut steps = 0;
        while let Some(p) = cur {
            steps += 1;
            if steps > meshes.len() || p == i {
                return Err(Error::CyclicHierarchy { mesh: mesh.name.clone() });
            }
            cur = meshes.get(p).and_then(|m| m.parent);
        }
    }
    Ok(())
}

/// Indices of meshes without a parent, in list order.
pub fn roots(meshes: &[MeshNode]) -> Vec<usize> {
    meshes
        .iter()
        .enumerate()
        .filter(|(_, m)| m.parent.is_none())
        .map(|(i, _)| i)
        .collect()
}

/// Re-point faces that use a duplicated texture name at its first occurrence.
///
/// `textures` is the name list the mesh's texture slots refer to. Only
/// faces that actually reference a duplicate are touched; the canonical
/// slot is appended to `texture_indexes` if the mesh does not map it yet.
pub fn dedup_textures(mesh: &mut MeshNode, textures: &[String]) -> Option<LoadWarning> {
    let mut seen = HashSet::new();
    let mut warning = None;

    for (i, name) in textures.iter().enumerate() {
        if seen.insert(name.as_str()) {
            continue;
        }

        let uses_duplicate = mesh
            .faces
            .iter()
            .any(|f| mesh.absolute_texture_id(f.texture_id as usize) == Some(i as i32));
        if !uses_duplicate {
            continue;
        }

        let canonical = match textures[..i].iter().position(|t| t == name) {
            Some(j) => j,
            None => {
                tracing::warn!(mesh = %mesh.name, texture = %name, "no earlier texture slot, using 0");
                warning = Some(LoadWarning::DuplicateTextureFallback {
                    mesh: mesh.name.clone(),
                    texture: name.clone(),
                });
                0
            }
        };

        let relative = match mesh.texture_indexes.iter().position(|&t| t == canonical as i32) {
            Some(r) => r,
            None => {
                mesh.texture_indexes.push(canonical as i32);
                mesh.texture_indexes.len() - 1
            }
        };

        tracing::trace!(mesh = %mesh.name, texture = %name, from = i, to = canonical, "dedup texture");

        let indexes = &mesh.texture_indexes;
        for face in mesh.faces.iter_mut() {
            if indexes.get(face.texture_id as usize) == Some(&(i as i32)) {
                face.texture_id = relative as u16;
            }
        }
    }

    warning
}
