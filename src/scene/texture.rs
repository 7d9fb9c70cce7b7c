//! Texture asset lookup.
//!
//! Texture names are resolved to `<root>\<name>` paths, the way the game
//! archive keys its entries. Decoding the returned bytes is left to the
//! renderer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Separator used in archive paths.
pub const ARCHIVE_SEPARATOR: char = '\\';

/// Provider of raw texture bytes keyed by archive path.
pub trait TextureSource {
    /// Raw bytes of `path`, or `None` if the asset does not exist.
    fn fetch(&self, path: &str) -> Option<Vec<u8>>;
}

impl TextureSource for HashMap<String, Vec<u8>> {
    fn fetch(&self, path: &str) -> Option<Vec<u8>> {
        self.get(path)
            .or_else(|| self.iter().find(|(k, _)| k.eq_ignore_ascii_case(path)).map(|(_, v)| v))
            .cloned()
    }
}

/// Archive path of texture `name` under `root`.
pub fn texture_path(root: &str, name: &str) -> String {
    let root = root.trim_end_matches(['\\', '/']);
    if root.is_empty() {
        return name.to_string();
    }
    format!("{root}{ARCHIVE_SEPARATOR}{name}")
}

/// Texture source backed by an extracted archive on disk.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    base: PathBuf,
}

impl DirectorySource {
    /// Resolve archive paths relative to `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Filesystem path for an archive path.
    pub fn resolve(&self, path: &str) -> PathBuf {
        path.split(['\\', '/'])
            .filter(|part| !part.is_empty())
            .fold(self.base.clone(), |p, part| p.join(part))
    }

    /// Base directory.
    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl TextureSource for DirectorySource {
    fn fetch(&self, path: &str) -> Option<Vec<u8>> {
        let file = self.resolve(path);
        match std::fs::read(&file) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::debug!("texture {} not found: {e}", file.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_path() {
        assert_eq!(texture_path("data\\texture", "wall.bmp"), "data\\texture\\wall.bmp");
        assert_eq!(texture_path("data\\texture\\", "a\\b.tga"), "data\\texture\\a\\b.tga");
        assert_eq!(texture_path("", "x.bmp"), "x.bmp");
    }

    #[test]
    fn test_map_source_case_insensitive() {
        let mut map = HashMap::new();
        map.insert("data\\texture\\Wall.BMP".to_string(), vec![1, 2, 3]);
        assert_eq!(map.fetch("data\\texture\\wall.bmp"), Some(vec![1, 2, 3]));
        assert_eq!(map.fetch("data\\texture\\none.bmp"), None);
    }

    #[test]
    fn test_directory_source() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir_all(dir.path().join("data").join("texture"))?;
        std::fs::write(dir.path().join("data").join("texture").join("a.bmp"), b"BM")?;

        let source = DirectorySource::new(dir.path());
        assert_eq!(source.fetch(&texture_path("data\\texture", "a.bmp")), Some(b"BM".to_vec()));
        assert_eq!(source.fetch("data\\texture\\b.bmp"), None);
        Ok(())
    }
}
