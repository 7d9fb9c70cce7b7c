//! Persistent settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::util::Result;

/// Settings shared by scene collection, playback and the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Textures
    /// Directory texture names are resolved against.
    pub texture_root: String,
    /// Textures with this extension are drawn after all others.
    pub always_last_extension: String,

    // Playback
    pub fallback_frame_delay_ms: u64,
    /// Delays below this use the fallback.
    pub min_frame_delay_ms: u64,
    pub loop_playback: bool,

    // Last opened file
    pub last_file: Option<PathBuf>,

    // Recent files (most recent first, max 10)
    pub recent_files: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            texture_root: String::from("data\\texture"),
            always_last_extension: String::from(".tga"),
            fallback_frame_delay_ms: 33,
            min_frame_delay_ms: 5,
            loop_playback: true,
            last_file: None,
            recent_files: Vec::new(),
        }
    }
}

const MAX_RECENT_FILES: usize = 10;

impl Settings {
    /// Get settings file path
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("rsm");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from the user config dir, falling back to defaults
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| Self::load_from(&p).ok())
            .unwrap_or_default()
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&text)?;
        settings.recent_files.truncate(MAX_RECENT_FILES);
        Ok(settings)
    }

    /// Save settings to the user config dir; failures are logged only
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            return;
        };
        if let Err(e) = self.save_to(&path) {
            tracing::warn!("settings not saved to {}: {e}", path.display());
        }
    }

    /// Save settings to a specific file, creating parent dirs
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Add file to recent files list (moves to top if already present)
    pub fn add_recent(&mut self, path: PathBuf) {
        self.recent_files.retain(|p| p != &path);
        self.recent_files.insert(0, path.clone());
        self.recent_files.truncate(MAX_RECENT_FILES);
        self.last_file = Some(path);
    }

    /// Get recent files (filters out non-existent)
    pub fn recent_files(&self) -> Vec<&PathBuf> {
        self.recent_files.iter().filter(|p| p.exists()).collect()
    }
}
