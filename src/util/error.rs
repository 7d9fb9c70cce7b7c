//! Error types for the RSM library.

use thiserror::Error;

/// Main error type for RSM operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid magic bytes at start of file
    #[error("Invalid RSM file: expected GRSM magic bytes")]
    InvalidMagic,

    /// Unsupported file format version
    #[error("Unsupported RSM version: {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// Buffer ended before a field could be read
    #[error("Unexpected end of data at offset {offset} (needed {needed} more bytes)")]
    UnexpectedEof { offset: usize, needed: usize },

    /// Invalid data structure in file
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// A keyframe track with no keys was evaluated
    #[error("Keyframe track is empty")]
    EmptyKeyframeTrack,

    /// Parent chain loops back on itself
    #[error("Cyclic parent chain through mesh {mesh:?}")]
    CyclicHierarchy { mesh: String },

    /// Mesh index out of bounds
    #[error("Mesh index {index} out of bounds (count: {count})")]
    MeshOutOfBounds { index: usize, count: usize },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(std::path::PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// True for errors raised by a malformed or truncated byte stream.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMagic
                | Self::UnsupportedVersion { .. }
                | Self::UnexpectedEof { .. }
                | Self::InvalidStructure(_)
                | Self::CyclicHierarchy { .. }
        )
    }
}

/// Result type alias for RSM operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal conditions found while loading a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadWarning {
    /// Parent name did not match any other mesh; the mesh is treated as a root.
    UnresolvedParent { mesh: String, parent: String },
    /// A duplicated texture had no earlier occurrence; slot 0 was used instead.
    DuplicateTextureFallback { mesh: String, texture: String },
    /// Face record carried bytes past the known fields; they were dropped.
    FaceTrailingBytes { mesh: String, face: usize, skipped: usize },
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnresolvedParent { mesh, parent } => {
                write!(f, "mesh {mesh:?}: parent {parent:?} not found, treated as root")
            }
            Self::DuplicateTextureFallback { mesh, texture } => {
                write!(f, "mesh {mesh:?}: no earlier slot for duplicate texture {texture:?}, using 0")
            }
            Self::FaceTrailingBytes { mesh, face, skipped } => {
                write!(f, "mesh {mesh:?}: face {face} skipped {skipped} unknown bytes")
            }
        }
    }
}
