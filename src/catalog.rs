use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// Identifier of one card: `<id>.jpg` in the images directory.
pub type CardId = u32;

const IMAGE_EXTENSION: &str = ".jpg";

/// Sorted, de-duplicated set of card identifiers found at startup.
///
/// The catalog is immutable once loaded; picking up new files requires a restart.
#[derive(Debug, Clone)]
pub struct Catalog {
    dir: PathBuf,
    entries: Vec<CardId>,
}

impl Catalog {
    /// Build a catalog from already known identifiers.
    pub fn from_entries(dir: impl Into<PathBuf>, mut entries: Vec<CardId>) -> Self {
        entries.sort_unstable();
        entries.dedup();
        Self {
            dir: dir.into(),
            entries,
        }
    }

    /// Scan `dir` (non-recursively) for numbered `.jpg` files.
    ///
    /// Never fails: an unreadable directory or one without usable files yields
    /// an empty catalog and a warning, so the bot can still start.
    pub async fn load(dir: &Path) -> Self {
        let entries = match scan_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Error reading images directory: {:#}", e);
                Vec::new()
            }
        };

        let catalog = Self::from_entries(dir, entries);
        match (catalog.entries.first(), catalog.entries.last()) {
            (Some(first), Some(last)) => info!(
                "Loaded {} images from {} (numbers: {}-{})",
                catalog.len(),
                dir.display(),
                first,
                last
            ),
            _ => warn!("No valid numbered images found in {}", dir.display()),
        }
        catalog
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[CardId] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<CardId> {
        self.entries.get(index).copied()
    }

    #[cfg(test)]
    pub fn contains(&self, id: CardId) -> bool {
        self.entries.binary_search(&id).is_ok()
    }

    /// Path of the image file for `id`, whether or not it still exists.
    pub fn image_path(&self, id: CardId) -> PathBuf {
        self.dir.join(format!("{}{}", id, IMAGE_EXTENSION))
    }
}

async fn scan_dir(dir: &Path) -> Result<Vec<CardId>> {
    let mut reader = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read images directory: {}", dir.display()))?;

    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(stem) = name.strip_suffix(IMAGE_EXTENSION) else {
            continue;
        };

        let path = entry.path();
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }

        match parse_card_id(stem) {
            Some(id) => entries.push(id),
            None => debug!("Skipping non-numeric image name: {}", name),
        }
    }

    Ok(entries)
}

/// Parse a base name such as `"17"` or `"02"` into an identifier.
fn parse_card_id(stem: &str) -> Option<CardId> {
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}
