use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::LoadOptions;
use crate::store::read_optional;

pub const DEFAULT_CONFIG_FILE: &str = "decks.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub decks_dir: PathBuf,
    pub legacy_stats: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            decks_dir: PathBuf::from("data/decks"),
            legacy_stats: PathBuf::from("data/legacy-stats.json"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    pub strict: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub data: DataConfig,
    pub integrity: IntegrityConfig,
}

impl CatalogConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Reads `path`; relative data paths are taken from the config file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse_at(path, &raw)
    }

    /// Like [`CatalogConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match read_optional(path)? {
            Some(raw) => Self::parse_at(path, &raw),
            None => {
                tracing::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            strict: self.integrity.strict,
        }
    }

    fn parse_at(path: &Path, raw: &str) -> Result<Self> {
        let config = Self::from_toml_str(raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolved_against(base))
    }

    fn resolved_against(mut self, base: &Path) -> Self {
        self.data.decks_dir = base.join(&self.data.decks_dir);
        self.data.legacy_stats = base.join(&self.data.legacy_stats);
        self
    }
}
