//! Reads deck records and the legacy stats table from the data directory.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::config::CatalogConfig;
use crate::schema::{DeckInput, DeckRecord};
use crate::stats::LegacyStatsTable;

/// One record per `*.json` file directly under `dir`, in filename order.
pub fn read_decks(dir: &Path) -> Result<Vec<DeckInput>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read deck directory {}", dir.display()))?
        .map(|entry| entry.map(|entry| entry.path()));
    let paths = json_files(dir, entries)?;

    paths.iter().map(|path| read_deck(path)).collect()
}

fn json_files(
    dir: &Path,
    entries: impl IntoIterator<Item = io::Result<PathBuf>>,
) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to list deck directory {}", dir.display()))?;
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Contents of `path`, or `None` when it does not exist. Other read errors are returned.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn read_deck(path: &Path) -> Result<DeckInput> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read deck {}", path.display()))?;
    let record: DeckRecord = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse deck {}", path.display()))?;

    Ok(DeckInput {
        record,
        origin_stem: path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string),
    })
}

/// A missing file yields an empty table.
pub fn read_legacy_stats(path: &Path) -> Result<LegacyStatsTable> {
    let Some(raw) = read_optional(path)? else {
        tracing::debug!("no legacy stats at {}", path.display());
        return Ok(LegacyStatsTable::default());
    };
    LegacyStatsTable::from_json_str(&raw)
        .with_context(|| format!("failed to parse legacy stats {}", path.display()))
}

pub fn load_catalog(config: &CatalogConfig) -> Result<Catalog> {
    let inputs = read_decks(&config.data.decks_dir)?;
    let legacy = read_legacy_stats(&config.data.legacy_stats)?;
    let catalog = Catalog::load(inputs, &legacy, &config.load_options())?;

    tracing::info!(
        decks = catalog.len(),
        issues = catalog.issues().len(),
        "loaded deck catalog from {}",
        config.data.decks_dir.display()
    );
    Ok(catalog)
}
