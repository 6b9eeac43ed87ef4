use crate::error::SourceError;
use async_trait::async_trait;
use listport_models::{CatalogTitle, EntryPatch, WatchlistEntry};

/// The canonical media catalog, consumed as a black box. Implementations
/// return raw, unscored hits; confidence scoring happens in the engine.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<CatalogTitle>, SourceError>;
}

/// The user's persistent watchlist.
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    fn backend_name(&self) -> &str;

    async fn list(&self) -> Result<Vec<WatchlistEntry>, SourceError>;

    /// Persist a new entry; the returned copy carries the assigned id.
    async fn create(&self, entry: &WatchlistEntry) -> Result<WatchlistEntry, SourceError>;

    /// Apply a partial update. Fields left `None` in the patch are untouched.
    async fn update(&self, id: u64, patch: &EntryPatch) -> Result<WatchlistEntry, SourceError>;

    async fn delete(&self, id: u64) -> Result<(), SourceError>;
}
