use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use nook_core::ExtractConfig;

use crate::error::{Result, StoreError};

pub const SETTINGS_FILE: &str = "config.toml";

pub const DEFAULT_MAX_MEMORIES: usize = 100;

/// Contents of `config.toml` in the data directory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub extract: ExtractConfig,
    pub memory: MemorySettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    /// When false, `learn` extracts facts but stores nothing.
    pub enabled: bool,
    /// Per-user cap; the oldest entries go first.
    pub max_memories: usize,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_memories: DEFAULT_MAX_MEMORIES,
        }
    }
}

impl Settings {
    /// Read `<dir>/config.toml`, falling back to defaults when it is absent.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(SETTINGS_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        Self::from_toml(&content)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))
    }

    /// Parse and validate settings text. The error is a bare message.
    pub fn from_toml(content: &str) -> std::result::Result<Self, String> {
        let settings: Settings = toml::from_str(content).map_err(|e| e.to_string())?;
        settings.validate()
    }

    fn validate(self) -> std::result::Result<Self, String> {
        if self.memory.max_memories == 0 {
            return Err("memory.max_memories must be at least 1".to_string());
        }
        let extract = self.extract.validate().map_err(|e| format!("extract.{e}"))?;
        Ok(Self { extract, ..self })
    }
}
