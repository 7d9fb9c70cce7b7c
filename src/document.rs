//! Top-level model container.

use std::fs::File;
use std::path::Path;

use crate::anim::PositionKeyFrame;
use crate::format::{self, Header, Version, VolumeBox};
use crate::mesh::{calc_subtree, resolve_links, roots, MeshNode};
use crate::util::{Error, LoadWarning, Result};

/// A decoded RSM model.
///
/// Mesh topology is fixed once built; [`calc`](Self::calc) only rewrites
/// the per-frame matrices and interpolation buffers of each mesh.
#[derive(Clone, Debug)]
pub struct Document {
    pub header: Header,
    /// Global texture names (before 2.3); index is the texture slot.
    pub textures: Vec<String>,
    /// Main node name (before 2.2) or root mesh names (2.2 and later).
    pub root_names: Vec<String>,
    pub meshes: Vec<MeshNode>,
    /// Model-level position keys of files older than 1.5.
    pub position_key_frames: Vec<PositionKeyFrame>,
    pub volume_boxes: Vec<VolumeBox>,

    pub(crate) volume_block_present: bool,
    pub(crate) warnings: Vec<LoadWarning>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Version::LATEST)
    }
}

impl Document {
    /// Empty document of `version`.
    pub fn new(version: Version) -> Self {
        Self {
            header: Header::new(version),
            textures: Vec::new(),
            root_names: if version.is_rsm2() { Vec::new() } else { vec![String::new()] },
            meshes: Vec::new(),
            position_key_frames: Vec::new(),
            volume_boxes: Vec::new(),
            volume_block_present: true,
            warnings: Vec::new(),
        }
    }

    /// Decode from bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        format::decode(bytes)
    }

    /// Encode for the header version.
    pub fn encode(&self) -> Result<Vec<u8>> {
        format::encode(self)
    }

    /// Open and decode a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Opening model: {}", path.display());
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        decode_file(file)
    }

    /// Encode and write to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.encode()?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Format version.
    #[inline]
    pub fn version(&self) -> Version {
        self.header.version
    }

    /// Non-fatal problems found while loading.
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Rebuild parent/child links from mesh names.
    ///
    /// Needed after adding or renaming meshes of a tool-built document.
    pub fn resolve_hierarchy(&mut self) -> Result<Vec<LoadWarning>> {
        resolve_links(&mut self.meshes)
    }

    /// Index of the root mesh: the mesh named by the first root name, else mesh 0.
    pub fn root_index(&self) -> Option<usize> {
        if self.meshes.is_empty() {
            return None;
        }
        let named = self
            .root_names
            .first()
            .filter(|n| !n.is_empty())
            .and_then(|n| self.find_mesh(n));
        Some(named.unwrap_or(0))
    }

    /// Index of the first mesh called `name`.
    pub fn find_mesh(&self, name: &str) -> Option<usize> {
        self.meshes.iter().position(|m| m.name == name)
    }

    /// Meshes without a parent, in list order.
    pub fn roots(&self) -> Vec<usize> {
        roots(&self.meshes)
    }

    /// Children of mesh `index`.
    pub fn children(&self, index: usize) -> Result<&[usize]> {
        self.meshes
            .get(index)
            .map(MeshNode::children)
            .ok_or(Error::MeshOutOfBounds { index, count: self.meshes.len() })
    }

    /// Texture name behind a mesh's relative texture id.
    pub fn texture_name(&self, mesh: usize, relative: usize) -> Option<&str> {
        mesh_texture_name(self.version(), &self.textures, self.meshes.get(mesh)?, relative)
    }

    /// Last animated frame of the root mesh, or the stored length when the root has no keys.
    pub fn animation_length(&self) -> i32 {
        self.root_index()
            .and_then(|i| self.meshes[i].last_key_frame())
            .unwrap_or(self.header.anim_len)
    }

    /// Frames per second; 0 for files that store none.
    #[inline]
    pub fn frame_rate(&self) -> f32 {
        self.header.frame_rate
    }

    /// Drop every mesh's interpolation buffers.
    pub fn clear_buffers(&mut self) {
        for mesh in self.meshes.iter_mut() {
            mesh.clear_buffer();
        }
    }

    /// Evaluate the whole tree at `frame`.
    ///
    /// Buffers are cleared first, then every root is evaluated with its
    /// descendants.
    #[tracing::instrument(skip(self), level = "trace")]
    pub fn calc(&mut self, frame: i32) -> Result<()> {
        self.clear_buffers();
        for root in self.roots() {
            calc_subtree(&mut self.meshes, root, frame)?;
        }
        Ok(())
    }

    /// Evaluate mesh `index` and its descendants at `frame`.
    ///
    /// Ancestors keep the matrices of their last evaluation.
    pub fn calc_from(&mut self, index: usize, frame: i32) -> Result<()> {
        self.clear_buffers();
        calc_subtree(&mut self.meshes, index, frame)
    }
}

/// Per-mesh list from 2.3 on, global list through `texture_indexes` before.
pub(crate) fn mesh_texture_name<'a>(
    version: Version,
    global_textures: &'a [String],
    mesh: &'a MeshNode,
    relative: usize,
) -> Option<&'a str> {
    if version >= Version::V2_3 {
        mesh.textures.get(relative).map(String::as_str)
    } else {
        let slot = usize::try_from(mesh.absolute_texture_id(relative)?).ok()?;
        global_textures.get(slot).map(String::as_str)
    }
}

#[cfg(feature = "mmap")]
fn decode_file(file: File) -> Result<Document> {
    if file.metadata()?.len() == 0 {
        return Document::decode(&[]);
    }
    // Safety: the map is read-only and lives only for the decode.
    let map = unsafe { memmap2::Mmap::map(&file) }?;
    Document::decode(&map)
}

#[cfg(not(feature = "mmap"))]
fn decode_file(mut file: File) -> Result<Document> {
    use std::io::Read;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Document::decode(&bytes)
}
