use crate::error::SourceError;
use crate::traits::WatchlistStore;
use async_trait::async_trait;
use listport_models::{EntryPatch, WatchlistEntry};
use std::path::PathBuf;
use tracing::debug;

/// Watchlist store backed by a single JSON file. Every operation reads the
/// whole file, applies the change, and rewrites it through a temp file so a
/// crash mid-write never leaves a torn list behind.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn load_entries(&self) -> Result<Vec<WatchlistEntry>, SourceError> {
        if !self.path.exists() {
            debug!("Watchlist file {:?} does not exist yet, starting empty", self.path);
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        let entries: Vec<WatchlistEntry> = serde_json::from_str(&content)?;
        Ok(entries)
    }

    async fn save_entries(&self, entries: &[WatchlistEntry]) -> Result<(), SourceError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Saved {} watchlist entries to {:?}", entries.len(), self.path);
        Ok(())
    }

    fn next_id(entries: &[WatchlistEntry]) -> u64 {
        entries.iter().filter_map(|e| e.id).max().unwrap_or(0) + 1
    }
}

#[async_trait]
impl WatchlistStore for JsonFileStore {
    fn backend_name(&self) -> &str {
        "file"
    }

    async fn list(&self) -> Result<Vec<WatchlistEntry>, SourceError> {
        self.load_entries().await
    }

    async fn create(&self, entry: &WatchlistEntry) -> Result<WatchlistEntry, SourceError> {
        let mut entries = self.load_entries().await?;
        let mut created = entry.clone();
        created.id = Some(Self::next_id(&entries));
        entries.push(created.clone());
        self.save_entries(&entries).await?;
        Ok(created)
    }

    async fn update(&self, id: u64, patch: &EntryPatch) -> Result<WatchlistEntry, SourceError> {
        let mut entries = self.load_entries().await?;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == Some(id))
            .ok_or(SourceError::NotFound(id))?;
        patch.apply_to(entry);
        let updated = entry.clone();
        self.save_entries(&entries).await?;
        Ok(updated)
    }

    async fn delete(&self, id: u64) -> Result<(), SourceError> {
        let mut entries = self.load_entries().await?;
        let before = entries.len();
        entries.retain(|e| e.id != Some(id));
        if entries.len() == before {
            return Err(SourceError::NotFound(id));
        }
        self.save_entries(&entries).await?;
        Ok(())
    }
}
