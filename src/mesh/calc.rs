//! Per-frame transform composition.
//!
//! Nodes are evaluated parent first: a child reads the matrices its
//! parent computed for the same frame.

use super::node::MeshNode;
use crate::util::{Error, Result};

/// Evaluate `root` and all of its descendants at `frame`.
///
/// Interpolation buffers are not cleared here; callers invalidate the
/// whole tree once before evaluating a new frame.
pub fn calc_subtree(meshes: &mut [MeshNode], root: usize, frame: i32) -> Result<()> {
    if root >= meshes.len() {
        return Err(Error::MeshOutOfBounds { index: root, count: meshes.len() });
    }

    let mut stack = vec![root];
    let mut visited = 0usize;

    while let Some(idx) = stack.pop() {
        visited += 1;
        if visited > meshes.len() {
            return Err(Error::CyclicHierarchy { mesh: meshes[idx].name.clone() });
        }
        calc_node(meshes, idx, frame)?;
        stack.extend(meshes[idx].children.iter().rev().copied());
    }

    Ok(())
}

/// Compute local and self matrices of one node.
fn calc_node(meshes: &mut [MeshNode], idx: usize, frame: i32) -> Result<()> {
    let parent = meshes[idx].parent;
    let parent_static = parent.map(|p| (meshes[p].transform, meshes[p].anchor));

    let node = &mut meshes[idx];
    let local = node.animated_local(frame, parent_static.as_ref().map(|(t, _)| t))?;
    let offset = node.frame_offset(frame, parent_static.as_ref().map(|(t, a)| (t, *a)))?;
    node.local_matrix = local;

    let mut self_matrix = local;
    self_matrix.w_axis = offset.extend(1.0);

    // Ancestor rotations, nearest first, root last.
    let mut cur = parent;
    let mut depth = 0usize;
    while let Some(a) = cur {
        depth += 1;
        if depth > meshes.len() {
            return Err(Error::CyclicHierarchy { mesh: meshes[idx].name.clone() });
        }
        self_matrix = meshes[a].local_matrix * self_matrix;
        cur = meshes[a].parent;
    }

    if let Some(p) = parent {
        let parent_offset = meshes[p].self_matrix.w_axis.truncate();
        self_matrix.w_axis += parent_offset.extend(0.0);
    }

    meshes[idx].self_matrix = self_matrix;
    Ok(())
}
