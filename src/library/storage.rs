//! Library Storage
//!
//! The whole library lives in one JSON file, `folders.json`, rewritten in
//! full after every change.

use super::Library;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

const LIBRARY_FILE: &str = "folders.json";

pub struct LibraryStorage {
    path: PathBuf,
}

impl LibraryStorage {
    /// Storage under the platform data directory.
    pub fn new() -> Self {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pubmed-ai");
        Self::with_path(base_dir)
    }

    /// Storage under a custom directory (config `DATA_DIR`, tests)
    pub fn with_path(base_dir: PathBuf) -> Self {
        Self {
            path: base_dir.join(LIBRARY_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_dir(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Load the library; a missing file gives the default library.
    pub async fn load(&self) -> anyhow::Result<Library> {
        if !self.path.exists() {
            info!("No library file found, starting empty");
            return Ok(Library::default());
        }

        let content = fs::read_to_string(&self.path).await?;
        let mut library: Library = serde_json::from_str(&content)?;
        library.normalize();

        info!(path = ?self.path, saved = library.total_saved(), "Loaded library");
        Ok(library)
    }

    pub async fn save(&self, library: &Library) -> anyhow::Result<()> {
        self.ensure_dir().await?;

        let content = serde_json::to_string_pretty(library)?;
        // Written to a sibling file, then renamed over the old one.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            warn!(error = %e, "Rename failed, writing library in place");
            fs::copy(&tmp, &self.path).await?;
            let _ = fs::remove_file(&tmp).await;
        }

        info!(path = ?self.path, saved = library.total_saved(), "Saved library");
        Ok(())
    }

    /// Load, apply `f`, save. Returns what `f` returned.
    pub async fn update<R>(&self, f: impl FnOnce(&mut Library) -> R) -> anyhow::Result<R> {
        let mut library = self.load().await?;
        let result = f(&mut library);
        self.save(&library).await?;
        Ok(result)
    }
}

impl Default for LibraryStorage {
    fn default() -> Self {
        Self::new()
    }
}
