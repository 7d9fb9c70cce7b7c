//! RSM binary codec.
//!
//! - [`version`] - Version numbers and layout thresholds
//! - [`header`] - Magic, version and model-wide fields
//! - [`mesh`] - Per-node records
//! - [`volume`] - Volume boxes
//!
//! File layout, in order:
//!
//! ```text
//! header
//! texture names        (< 2.3; fixed 40-byte names before 2.2)
//! main node name       (< 2.2, one fixed name) | root names (>= 2.2, count + names)
//! mesh count, meshes
//! model position keys  (< 1.5)
//! volume boxes         (optional, flag from 1.3)
//! ```

pub mod header;
pub mod mesh;
pub mod version;
pub mod volume;

pub use header::{Header, ShadeType, RSM_MAGIC};
pub use mesh::{read_mesh, write_mesh};
pub use version::Version;
pub use volume::VolumeBox;

use crate::binary::{ByteReader, ByteWriter, FIXED_NAME_LEN};
use crate::document::Document;
use crate::anim::PositionKeyFrame;
use crate::mesh::{dedup_textures, resolve_links};
use crate::util::Result;
use mesh::{read_doc_string, write_doc_string};

/// Smallest possible mesh record: two length-prefixed names, a texture
/// count, the transform and the anchor.
const MIN_MESH_LEN: usize = 4 + 4 + 4 + 36 + 12;

/// Decode a complete document.
///
/// Nothing is returned unless every structure and the hierarchy pass
/// succeed.
#[tracing::instrument(skip_all, fields(len = bytes.len()))]
pub fn decode(bytes: &[u8]) -> Result<Document> {
    let mut r = ByteReader::new(bytes);
    let header = Header::read(&mut r)?;
    let version = header.version;
    tracing::debug!("RSM {version}, anim_len {}", header.anim_len);

    let mut textures = Vec::new();
    if version < Version::V2_3 {
        let min = if version.is_rsm2() { 4 } else { FIXED_NAME_LEN };
        let count = r.count(min)?;
        textures.reserve(count);
        for _ in 0..count {
            textures.push(read_doc_string(&mut r, version)?);
        }
    }

    let root_names = if version.is_rsm2() {
        let count = r.count(4)?;
        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            names.push(r.prefixed_string()?);
        }
        names
    } else {
        vec![r.fixed_string(FIXED_NAME_LEN)?]
    };

    let mut warnings = Vec::new();
    let count = r.count(MIN_MESH_LEN)?;
    let mut meshes = Vec::with_capacity(count);
    for _ in 0..count {
        meshes.push(read_mesh(&mut r, version, &mut warnings)?);
    }
    tracing::debug!("{} meshes, {} textures", meshes.len(), textures.len());

    let mut position_key_frames = Vec::new();
    if version < Version::V1_5 {
        let count = r.count(PositionKeyFrame::LEGACY_SIZE)?;
        position_key_frames.reserve(count);
        for _ in 0..count {
            position_key_frames.push(PositionKeyFrame::read_legacy(&mut r)?);
        }
    }

    let no_flag = version < Version::V1_3;
    let volume_block_present = !r.is_eof();
    let mut volume_boxes = Vec::new();
    if volume_block_present {
        let size = if no_flag { VolumeBox::SIZE_NO_FLAG } else { VolumeBox::SIZE };
        let count = r.count(size)?;
        volume_boxes.reserve(count);
        for _ in 0..count {
            volume_boxes.push(VolumeBox::read(&mut r, no_flag)?);
        }
    }

    if !r.is_eof() {
        tracing::debug!("{} trailing bytes ignored", r.remaining());
    }

    warnings.extend(resolve_links(&mut meshes)?);
    for mesh in meshes.iter_mut() {
        let warning = if version >= Version::V2_3 {
            let own = mesh.textures.clone();
            dedup_textures(mesh, &own)
        } else {
            dedup_textures(mesh, &textures)
        };
        warnings.extend(warning);
    }

    Ok(Document {
        header,
        textures,
        root_names,
        meshes,
        position_key_frames,
        volume_boxes,
        volume_block_present,
        warnings,
    })
}

/// Encode a document for its header version.
#[tracing::instrument(skip_all, fields(meshes = doc.meshes.len()))]
pub fn encode(doc: &Document) -> Result<Vec<u8>> {
    let version = doc.header.version;
    let mut w = ByteWriter::with_capacity(estimate_size(doc));

    doc.header.write(&mut w)?;

    if version < Version::V2_3 {
        w.write_count(doc.textures.len())?;
        for texture in &doc.textures {
            write_doc_string(&mut w, texture, version)?;
        }
    }

    if version.is_rsm2() {
        w.write_count(doc.root_names.len())?;
        for name in &doc.root_names {
            w.write_prefixed_string(name)?;
        }
    } else {
        let main = doc.root_names.first().map(String::as_str).unwrap_or("");
        w.write_fixed_string(main, FIXED_NAME_LEN);
    }

    w.write_count(doc.meshes.len())?;
    for mesh in &doc.meshes {
        write_mesh(&mut w, mesh, version)?;
    }

    if version < Version::V1_5 {
        w.write_count(doc.position_key_frames.len())?;
        for key in &doc.position_key_frames {
            key.write_legacy(&mut w)?;
        }
    }

    if doc.volume_block_present || !doc.volume_boxes.is_empty() {
        let no_flag = version < Version::V1_3;
        w.write_count(doc.volume_boxes.len())?;
        for b in &doc.volume_boxes {
            b.write(&mut w, no_flag)?;
        }
    }

    tracing::debug!("encoded {} bytes", w.pos());
    Ok(w.into_inner())
}

fn estimate_size(doc: &Document) -> usize {
    doc.meshes
        .iter()
        .map(|m| MIN_MESH_LEN + m.vertices.len() * 12 + m.texture_vertices.len() * 12 + m.faces.len() * 36)
        .sum::<usize>()
        + 64
}
