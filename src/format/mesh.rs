//! Mesh record codec.
//!
//! One record per node. Field presence and widths follow the document
//! version; see [`Version`] for the thresholds.

use smallvec::SmallVec;

use super::version::Version;
use crate::anim::{
    PositionKeyFrame, RotationKeyFrame, ScaleKeyFrame, TextureAnimation, TextureKeyFrame,
    TextureKeyFrameGroup, TextureTrack,
};
use crate::binary::{ByteReader, ByteWriter, FIXED_NAME_LEN};
use crate::mesh::{Face, LegacyTransform, MeshNode, TextureVertex, OPAQUE_WHITE};
use crate::util::{LoadWarning, Result};

/// Fixed part of a face: ids, texture id, padding and the two-side flag.
const FACE_BASE_LEN: usize = 20;
/// Face record length (2.2+) above which a second smoothing group follows.
const FACE_SECOND_GROUP_LEN: usize = 24;
/// Face record length (2.2+) above which a third smoothing group follows.
const FACE_THIRD_GROUP_LEN: usize = 28;
/// Largest face record this decoder understands.
const FACE_MAX_LEN: usize = 32;

fn read_name(r: &mut ByteReader<'_>, version: Version) -> Result<String> {
    if version.is_rsm2() {
        r.prefixed_string()
    } else {
        r.fixed_string(FIXED_NAME_LEN)
    }
}

fn write_name(w: &mut ByteWriter, name: &str, version: Version) -> Result<()> {
    if version.is_rsm2() {
        w.write_prefixed_string(name)
    } else {
        w.write_fixed_string(name, FIXED_NAME_LEN);
        Ok(())
    }
}

/// Read a name the way the document version stores it.
pub(crate) fn read_doc_string(r: &mut ByteReader<'_>, version: Version) -> Result<String> {
    read_name(r, version)
}

/// Write a name the way the document version stores it.
pub(crate) fn write_doc_string(w: &mut ByteWriter, name: &str, version: Version) -> Result<()> {
    write_name(w, name, version)
}

/// Decode one mesh record.
pub fn read_mesh(
    r: &mut ByteReader<'_>,
    version: Version,
    warnings: &mut Vec<LoadWarning>,
) -> Result<MeshNode> {
    let mut mesh = MeshNode::new(read_name(r, version)?);
    mesh.parent_name = read_name(r, version)?;

    if version >= Version::V2_3 {
        let count = r.count(4)?;
        mesh.textures.reserve(count);
        for _ in 0..count {
            mesh.textures.push(r.prefixed_string()?);
        }
        mesh.texture_indexes = (0..count as i32).collect();
    } else {
        let count = r.count(4)?;
        mesh.texture_indexes.reserve(count);
        for _ in 0..count {
            mesh.texture_indexes.push(r.i32()?);
        }
    }

    for value in mesh.transform.iter_mut() {
        *value = r.f32()?;
    }
    mesh.anchor = r.vec3()?;

    if !version.is_rsm2() {
        mesh.legacy = LegacyTransform {
            position: r.vec3()?,
            rot_angle: r.f32()?,
            rot_axis: r.vec3()?,
            scale: r.vec3()?,
        };
    }

    let count = r.count(12)?;
    mesh.vertices.reserve(count);
    for _ in 0..count {
        mesh.vertices.push(r.vec3()?);
    }

    let has_color = version >= Version::V1_2;
    let count = r.count(if has_color { 12 } else { 8 })?;
    mesh.texture_vertices.reserve(count);
    for _ in 0..count {
        let color = if has_color { r.u32()? } else { OPAQUE_WHITE };
        mesh.texture_vertices.push(TextureVertex { color, u: r.f32()?, v: r.f32()? });
    }

    let min_face = match version {
        v if v.is_rsm2() => 4 + FACE_BASE_LEN + 4,
        v if v >= Version::V1_2 => FACE_BASE_LEN + 4,
        _ => FACE_BASE_LEN,
    };
    let count = r.count(min_face)?;
    mesh.faces.reserve(count);
    for i in 0..count {
        let face = read_face(r, version, &mesh.name, i, warnings)?;
        mesh.faces.push(face);
    }

    if version >= Version::V1_6 {
        let count = r.count(ScaleKeyFrame::SIZE)?;
        mesh.scale_key_frames.reserve(count);
        for _ in 0..count {
            mesh.scale_key_frames.push(ScaleKeyFrame::read(r)?);
        }
    }

    let count = r.count(RotationKeyFrame::SIZE)?;
    mesh.rotation_key_frames.reserve(count);
    for _ in 0..count {
        mesh.rotation_key_frames.push(RotationKeyFrame::read(r)?);
    }

    if version.is_rsm2() {
        let count = r.count(PositionKeyFrame::SIZE)?;
        mesh.position_key_frames.reserve(count);
        for _ in 0..count {
            mesh.position_key_frames.push(PositionKeyFrame::read(r)?);
        }
    }

    if version >= Version::V2_3 {
        mesh.texture_key_frames = read_texture_groups(r)?;
    }

    tracing::trace!(
        mesh = %mesh.name,
        parent = %mesh.parent_name,
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        "decoded mesh"
    );

    Ok(mesh)
}

fn read_face(
    r: &mut ByteReader<'_>,
    version: Version,
    mesh_name: &str,
    index: usize,
    warnings: &mut Vec<LoadWarning>,
) -> Result<Face> {
    let record_len = if version.is_rsm2() { Some(r.count(0)?) } else { None };
    let start = r.pos();

    let vertex_ids = [r.u16()?, r.u16()?, r.u16()?];
    let texture_vertex_ids = [r.u16()?, r.u16()?, r.u16()?];
    let texture_id = r.u16()?;
    let padding = r.u16()?;
    let two_side = r.i32()?;

    let mut smooth_groups = SmallVec::new();
    if version >= Version::V1_2 {
        smooth_groups.push(r.i32()?);
        if let Some(len) = record_len {
            if len > FACE_SECOND_GROUP_LEN {
                smooth_groups.push(r.i32()?);
            }
            if len > FACE_THIRD_GROUP_LEN {
                smooth_groups.push(r.i32()?);
            }
        }
    }

    if let Some(len) = record_len {
        let consumed = r.pos() - start;
        if len > FACE_MAX_LEN && len > consumed {
            let skipped = len - consumed;
            r.skip(skipped)?;
            tracing::warn!(mesh = %mesh_name, face = index, skipped, "unknown face bytes skipped");
            warnings.push(LoadWarning::FaceTrailingBytes {
                mesh: mesh_name.to_string(),
                face: index,
                skipped,
            });
        }
    }

    Ok(Face { vertex_ids, texture_vertex_ids, texture_id, padding, two_side, smooth_groups })
}

fn read_texture_groups(r: &mut ByteReader<'_>) -> Result<TextureKeyFrameGroup> {
    let mut group = TextureKeyFrameGroup::new();

    let count = r.count(8)?;
    for _ in 0..count {
        let texture_id = r.i32()?;
        let type_count = r.count(8)?;
        let mut tracks = Vec::with_capacity(type_count);
        for _ in 0..type_count {
            let kind = r.i32()?;
            let frame_count = r.count(TextureKeyFrame::SIZE)?;
            let mut frames = Vec::with_capacity(frame_count);
            for _ in 0..frame_count {
                frames.push(TextureKeyFrame::read(r)?);
            }
            tracks.push(TextureTrack { kind, frames });
        }
        group.push(TextureAnimation { texture_id, tracks });
    }

    Ok(group)
}

/// Encode one mesh record for `version`.
///
/// Only static data is written; matrices and buffers of the last
/// evaluated frame are ignored.
pub fn write_mesh(w: &mut ByteWriter, mesh: &MeshNode, version: Version) -> Result<()> {
    write_name(w, &mesh.name, version)?;
    write_name(w, &mesh.parent_name, version)?;

    if version >= Version::V2_3 {
        w.write_count(mesh.textures.len())?;
        for texture in &mesh.textures {
            w.write_prefixed_string(texture)?;
        }
    } else {
        w.write_count(mesh.texture_indexes.len())?;
        for &index in &mesh.texture_indexes {
            w.write_i32(index)?;
        }
    }

    for &value in &mesh.transform {
        w.write_f32(value)?;
    }
    w.write_vec3(mesh.anchor)?;

    if !version.is_rsm2() {
        w.write_vec3(mesh.legacy.position)?;
        w.write_f32(mesh.legacy.rot_angle)?;
        w.write_vec3(mesh.legacy.rot_axis)?;
        w.write_vec3(mesh.legacy.scale)?;
    }

    w.write_count(mesh.vertices.len())?;
    for &v in &mesh.vertices {
        w.write_vec3(v)?;
    }

    w.write_count(mesh.texture_vertices.len())?;
    for tv in &mesh.texture_vertices {
        if version >= Version::V1_2 {
            w.write_u32(tv.color)?;
        }
        w.write_f32(tv.u)?;
        w.write_f32(tv.v)?;
    }

    w.write_count(mesh.faces.len())?;
    for face in &mesh.faces {
        write_face(w, face, version)?;
    }

    if version >= Version::V1_6 {
        w.write_count(mesh.scale_key_frames.len())?;
        for key in &mesh.scale_key_frames {
            key.write(w)?;
        }
    }

    w.write_count(mesh.rotation_key_frames.len())?;
    for key in &mesh.rotation_key_frames {
        key.write(w)?;
    }

    if version.is_rsm2() {
        w.write_count(mesh.position_key_frames.len())?;
        for key in &mesh.position_key_frames {
            key.write(w)?;
        }
    }

    if version >= Version::V2_3 {
        let group = &mesh.texture_key_frames;
        w.write_count(group.len())?;
        for anim in group.animations() {
            w.write_i32(anim.texture_id)?;
            w.write_count(anim.tracks.len())?;
            for track in &anim.tracks {
                w.write_i32(track.kind)?;
                w.write_count(track.frames.len())?;
                for key in &track.frames {
                    key.write(w)?;
                }
            }
        }
    }

    Ok(())
}

fn write_face(w: &mut ByteWriter, face: &Face, version: Version) -> Result<()> {
    // At least one group is always stored from 1.2 on, at most three.
    let groups: &[i32] = match face.smooth_groups.len() {
        0 => &[0],
        n => &face.smooth_groups[..n.min(3)],
    };

    if version.is_rsm2() {
        w.write_count(FACE_BASE_LEN + 4 * groups.len())?;
    }

    for &id in &face.vertex_ids {
        w.write_u16(id)?;
    }
    for &id in &face.texture_vertex_ids {
        w.write_u16(id)?;
    }
    w.write_u16(face.texture_id)?;
    w.write_u16(face.padding)?;
    w.write_i32(face.two_side)?;

    if version.is_rsm2() {
        for &group in groups {
            w.write_i32(group)?;
        }
    } else if version >= Version::V1_2 {
        w.write_i32(groups[0])?;
    }

    Ok(())
}
