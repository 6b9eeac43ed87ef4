use anyhow::Result;
use tracing::{info, warn};

use crate::duplicates;
use listport_models::{
    CandidateMatch, EntryPatch, ImportResult, MergeField, PreviewItem, Resolution,
    ResolutionStrategy, WatchStatus, WatchlistEntry,
};
use listport_sources::WatchlistStore;

enum Outcome {
    Imported,
    Skipped,
    Merged,
    Overwritten,
}

/// Commit reviewed items against the store, one at a time.
///
/// A single bad item never aborts the batch: its failure is recorded in the
/// result and processing moves on. The five counters always sum to the number
/// of items submitted.
pub async fn commit(
    items: &[PreviewItem],
    resolutions: &[Resolution],
    store: &dyn WatchlistStore,
) -> Result<ImportResult> {
    // One snapshot up front; merge needs the existing entry's current fields
    let snapshot = store.list().await?;
    info!(
        "Committing {} items against {} store ({} existing entries)",
        items.len(),
        store.backend_name(),
        snapshot.len()
    );

    let mut result = ImportResult::default();
    for (index, item) in items.iter().enumerate() {
        if item.should_skip {
            result.skipped += 1;
            continue;
        }
        match commit_item(index, item, resolutions, &snapshot, store).await {
            Ok(Outcome::Imported) => result.imported += 1,
            Ok(Outcome::Skipped) => result.skipped += 1,
            Ok(Outcome::Merged) => result.merged += 1,
            Ok(Outcome::Overwritten) => result.overwritten += 1,
            Err(message) => {
                warn!("Item {} '{}' failed: {}", index, item.original_title, message);
                result.record_failure(index, &item.original_title, message);
            }
        }
    }

    info!(
        "Commit finished: {} imported, {} merged, {} overwritten, {} skipped, {} failed",
        result.imported, result.merged, result.overwritten, result.skipped, result.failed
    );
    Ok(result)
}

async fn commit_item(
    index: usize,
    item: &PreviewItem,
    resolutions: &[Resolution],
    snapshot: &[WatchlistEntry],
    store: &dyn WatchlistStore,
) -> std::result::Result<Outcome, String> {
    match duplicates::find_existing(item, snapshot) {
        None => {
            // Binding a row to a catalog title is always an explicit choice
            let candidate = item
                .selected_candidate()
                .ok_or_else(|| "no match selected".to_string())?;
            let entry = entry_from_item(item, candidate);
            store.create(&entry).await.map_err(|e| e.to_string())?;
            Ok(Outcome::Imported)
        }
        Some(existing) => {
            let resolution = resolutions
                .iter()
                .find(|r| r.matches(index, &item.original_title, item.original_year));
            let resolution = match resolution {
                Some(resolution) => resolution,
                None => {
                    warn!(
                        "'{}' already exists and no resolution was given, skipping",
                        item.original_title
                    );
                    return Ok(Outcome::Skipped);
                }
            };
            match resolution.strategy {
                ResolutionStrategy::Skip => Ok(Outcome::Skipped),
                ResolutionStrategy::Merge => {
                    let id = existing
                        .id
                        .ok_or_else(|| "existing entry has no id".to_string())?;
                    let patch = merge_patch(item, existing, resolution);
                    store.update(id, &patch).await.map_err(|e| e.to_string())?;
                    Ok(Outcome::Merged)
                }
                ResolutionStrategy::Overwrite => {
                    let id = existing
                        .id
                        .ok_or_else(|| "existing entry has no id".to_string())?;
                    store
                        .update(id, &overwrite_patch(item))
                        .await
                        .map_err(|e| e.to_string())?;
                    Ok(Outcome::Overwritten)
                }
            }
        }
    }
}

/// A new entry from the selected candidate plus the row's normalized fields.
/// Canonical identity (title, year, kind, artwork) comes from the catalog.
fn entry_from_item(item: &PreviewItem, candidate: &CandidateMatch) -> WatchlistEntry {
    let date_completed = if item.suggested_status == WatchStatus::Completed {
        item.date_added
    } else {
        None
    };
    WatchlistEntry {
        id: None,
        catalog_id: candidate.catalog_id,
        media_kind: candidate.media_kind,
        title: candidate.title.clone(),
        year: candidate.year,
        status: item.suggested_status,
        rating: item.rating,
        notes: item.notes.clone(),
        date_added: item.date_added,
        date_completed,
        poster_path: candidate.poster_path.clone(),
        streaming_providers: item.streaming_providers.clone(),
    }
}

/// The patch for a Merge resolution: exactly the listed fields are taken
/// from the import. Status has a default when unlisted: whichever of the
/// existing and imported statuses represents more progress wins.
fn merge_patch(item: &PreviewItem, existing: &WatchlistEntry, resolution: &Resolution) -> EntryPatch {
    let mut patch = EntryPatch::default();

    if resolution.merge_field(MergeField::Status) {
        patch.status = Some(item.suggested_status);
    } else {
        patch.status = Some(existing.status.max(item.suggested_status));
    }
    if resolution.merge_field(MergeField::Rating) {
        patch.rating = item.rating;
    }
    if resolution.merge_field(MergeField::Notes) {
        patch.notes = item.notes.clone();
    }
    if resolution.merge_field(MergeField::DateAdded) {
        patch.date_added = item.date_added;
    }
    if resolution.merge_field(MergeField::Providers) {
        patch.streaming_providers = Some(item.streaming_providers.clone());
    }
    patch
}

/// Overwrite replaces every mutable field with the import's values. Identity
/// fields and the completion date stay as they are.
fn overwrite_patch(item: &PreviewItem) -> EntryPatch {
    EntryPatch {
        status: Some(item.suggested_status),
        rating: item.rating,
        notes: item.notes.clone(),
        date_added: item.date_added,
        date_completed: None,
        streaming_providers: Some(item.streaming_providers.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use listport_models::{MediaKind, ResolutionKey};
    use listport_sources::SourceError;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    struct FakeStore {
        entries: Mutex<Vec<WatchlistEntry>>,
        next_id: Mutex<u64>,
        fail_titles: Vec<String>,
    }

    impl FakeStore {
        fn new(entries: Vec<WatchlistEntry>) -> Self {
            let next_id = entries.iter().filter_map(|e| e.id).max().unwrap_or(0) + 1;
            FakeStore {
                entries: Mutex::new(entries),
                next_id: Mutex::new(next_id),
                fail_titles: Vec::new(),
            }
        }

        fn failing_on(mut self, title: &str) -> Self {
            self.fail_titles.push(title.to_string());
            self
        }

        fn contents(&self) -> Vec<WatchlistEntry> {
            self.entries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WatchlistStore for FakeStore {
        fn backend_name(&self) -> &str {
            "fake"
        }

        async fn list(&self) -> Result<Vec<WatchlistEntry>, SourceError> {
            Ok(self.entries.lock().unwrap().clone())
        }

        async fn create(&self, entry: &WatchlistEntry) -> Result<WatchlistEntry, SourceError> {
            if self.fail_titles.contains(&entry.title) {
                return Err(SourceError::api(500, "store exploded"));
            }
            let mut entries = self.entries.lock().unwrap();
            let mut next_id = self.next_id.lock().unwrap();
            let mut created = entry.clone();
            created.id = Some(*next_id);
            *next_id += 1;
            entries.push(created.clone());
            Ok(created)
        }

        async fn update(&self, id: u64, patch: &EntryPatch) -> Result<WatchlistEntry, SourceError> {
            let mut entries = self.entries.lock().unwrap();
            let entry = entries
                .iter_mut()
                .find(|e| e.id == Some(id))
                .ok_or(SourceError::NotFound(id))?;
            if self.fail_titles.contains(&entry.title) {
                return Err(SourceError::api(500, "store exploded"));
            }
            patch.apply_to(entry);
            Ok(entry.clone())
        }

        async fn delete(&self, id: u64) -> Result<(), SourceError> {
            let mut entries = self.entries.lock().unwrap();
            let before = entries.len();
            entries.retain(|e| e.id != Some(id));
            if entries.len() == before {
                return Err(SourceError::NotFound(id));
            }
            Ok(())
        }
    }

    fn candidate(catalog_id: u64, title: &str, year: Option<u32>) -> CandidateMatch {
        CandidateMatch {
            catalog_id,
            media_kind: MediaKind::Movie,
            title: title.to_string(),
            year,
            poster_path: Some("/poster.jpg".to_string()),
            backdrop_path: None,
            overview: None,
            confidence: 0.95,
        }
    }

    fn bare_item(title: &str, year: Option<u32>) -> PreviewItem {
        PreviewItem {
            original_title: title.to_string(),
            original_year: year,
            match_candidates: Vec::new(),
            selected_match: None,
            suggested_status: WatchStatus::NotWatched,
            rating: None,
            notes: None,
            date_added: None,
            streaming_providers: Vec::new(),
            has_existing_entry: false,
            existing_entry_id: None,
            should_skip: false,
            error: None,
        }
    }

    fn matched_item(title: &str, year: Option<u32>, catalog_id: u64) -> PreviewItem {
        let mut item = bare_item(title, year);
        item.match_candidates = vec![candidate(catalog_id, title, year)];
        item.selected_match = Some(0);
        item
    }

    fn stored(id: u64, catalog_id: u64, title: &str, status: WatchStatus) -> WatchlistEntry {
        WatchlistEntry {
            id: Some(id),
            catalog_id,
            media_kind: MediaKind::Movie,
            title: title.to_string(),
            year: Some(1995),
            status,
            rating: Some(6.0),
            notes: Some("old notes".to_string()),
            date_added: NaiveDate::from_ymd_opt(2019, 1, 1),
            date_completed: None,
            poster_path: None,
            streaming_providers: vec!["Hulu".to_string()],
        }
    }

    fn resolution(strategy: ResolutionStrategy, fields: Option<&[MergeField]>) -> Resolution {
        Resolution {
            key: ResolutionKey::Index(0),
            strategy,
            merge_fields: fields.map(|f| f.iter().copied().collect::<BTreeSet<_>>()),
        }
    }

    #[tokio::test]
    async fn test_create_from_selected_candidate() {
        let store = FakeStore::new(Vec::new());
        let mut item = matched_item("heat", Some(1995), 949);
        item.rating = Some(8.5);

        let result = commit(&[item], &[], &store).await.unwrap();

        assert_eq!(result.imported, 1);
        assert_eq!(result.total(), 1);
        let entries = store.contents();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].catalog_id, 949);
        // Canonical identity comes from the catalog, not the upload
        assert_eq!(entries[0].title, "heat");
        assert_eq!(entries[0].id, Some(1));
        assert_eq!(entries[0].rating, Some(8.5));
    }

    #[tokio::test]
    async fn test_completed_create_mirrors_date_added() {
        let store = FakeStore::new(Vec::new());
        let mut item = matched_item("Heat", Some(1995), 949);
        item.suggested_status = WatchStatus::Completed;
        item.date_added = NaiveDate::from_ymd_opt(2020, 5, 1);

        commit(&[item], &[], &store).await.unwrap();

        let entries = store.contents();
        assert_eq!(entries[0].date_completed, NaiveDate::from_ymd_opt(2020, 5, 1));
    }

    #[tokio::test]
    async fn test_unselected_item_fails_not_imports() {
        let store = FakeStore::new(Vec::new());
        let mut item = matched_item("Heat", Some(1995), 949);
        item.selected_match = None;

        let result = commit(&[item], &[], &store).await.unwrap();

        assert_eq!(result.imported, 0);
        assert_eq!(result.failed, 1);
        assert!(result.errors[0].message.contains("no match selected"));
        assert!(store.contents().is_empty());
    }

    #[tokio::test]
    async fn test_premarked_skip_is_counted() {
        let store = FakeStore::new(Vec::new());
        let mut item = matched_item("Heat", Some(1995), 949);
        item.should_skip = true;

        let result = commit(&[item], &[], &store).await.unwrap();

        assert_eq!(result.skipped, 1);
        assert_eq!(result.total(), 1);
        assert!(store.contents().is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_duplicate_skipped_without_error() {
        let store = FakeStore::new(vec![stored(1, 949, "Heat", WatchStatus::Completed)]);
        let item = matched_item("Heat", Some(1995), 949);

        let result = commit(&[item], &[], &store).await.unwrap();

        assert_eq!(result.skipped, 1);
        assert_eq!(result.failed, 0);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_skip_resolution_leaves_entry_alone() {
        let store = FakeStore::new(vec![stored(1, 949, "Heat", WatchStatus::Completed)]);
        let item = matched_item("Heat", Some(1995), 949);
        let resolutions = [resolution(ResolutionStrategy::Skip, None)];

        let result = commit(&[item], &resolutions, &store).await.unwrap();

        assert_eq!(result.skipped, 1);
        assert_eq!(store.contents()[0].rating, Some(6.0));
    }

    #[tokio::test]
    async fn test_merge_rating_only_keeps_existing_status() {
        let store = FakeStore::new(vec![stored(1, 949, "Heat", WatchStatus::Completed)]);
        let mut item = matched_item("Heat", Some(1995), 949);
        item.rating = Some(9.0);
        let resolutions = [resolution(
            ResolutionStrategy::Merge,
            Some(&[MergeField::Rating]),
        )];

        let result = commit(&[item], &resolutions, &store).await.unwrap();

        assert_eq!(result.merged, 1);
        let entries = store.contents();
        assert_eq!(entries[0].rating, Some(9.0));
        // Import said not_watched; existing Completed is further along
        assert_eq!(entries[0].status, WatchStatus::Completed);
        assert_eq!(entries[0].notes.as_deref(), Some("old notes"));
    }

    #[tokio::test]
    async fn test_merge_with_status_listed_takes_import_value() {
        let store = FakeStore::new(vec![stored(1, 949, "Heat", WatchStatus::Completed)]);
        let mut item = matched_item("Heat", Some(1995), 949);
        item.suggested_status = WatchStatus::Watching;
        let resolutions = [resolution(
            ResolutionStrategy::Merge,
            Some(&[MergeField::Status]),
        )];

        commit(&[item], &resolutions, &store).await.unwrap();

        assert_eq!(store.contents()[0].status, WatchStatus::Watching);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_mutable_fields_only() {
        let store = FakeStore::new(vec![stored(1, 949, "Heat", WatchStatus::Completed)]);
        let mut item = matched_item("Heat", Some(1995), 949);
        item.suggested_status = WatchStatus::Watching;
        item.rating = Some(7.0);
        item.notes = Some("fresh notes".to_string());
        item.date_added = NaiveDate::from_ymd_opt(2021, 3, 14);
        item.streaming_providers = vec!["Netflix".to_string()];

        let result = commit(&[item], &[resolution(ResolutionStrategy::Overwrite, None)], &store)
            .await
            .unwrap();

        assert_eq!(result.overwritten, 1);
        let entries = store.contents();
        assert_eq!(entries[0].status, WatchStatus::Watching);
        assert_eq!(entries[0].rating, Some(7.0));
        assert_eq!(entries[0].notes.as_deref(), Some("fresh notes"));
        assert_eq!(entries[0].date_added, NaiveDate::from_ymd_opt(2021, 3, 14));
        assert_eq!(entries[0].streaming_providers, vec!["Netflix"]);
        // Identity survives an overwrite
        assert_eq!(entries[0].id, Some(1));
        assert_eq!(entries[0].catalog_id, 949);
    }

    #[tokio::test]
    async fn test_store_failure_is_isolated_to_its_item() {
        let store = FakeStore::new(Vec::new()).failing_on("Bad Apple");
        let items = [
            matched_item("Heat", Some(1995), 949),
            matched_item("Bad Apple", Some(2000), 111),
            matched_item("Ronin", Some(1998), 888),
        ];

        let result = commit(&items, &[], &store).await.unwrap();

        assert_eq!(result.imported, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].index, 1);
        assert_eq!(result.errors[0].title, "Bad Apple");
        assert_eq!(result.total(), 3);
        assert_eq!(store.contents().len(), 2);
    }

    #[tokio::test]
    async fn test_counters_always_sum_to_submitted() {
        let store = FakeStore::new(vec![stored(1, 949, "Heat", WatchStatus::Completed)])
            .failing_on("Bad Apple");
        let mut premarked = matched_item("Thief", Some(1981), 222);
        premarked.should_skip = true;
        let mut unselected = bare_item("Mystery", None);
        unselected.match_candidates = vec![candidate(333, "Mystery", None)];

        let items = [
            matched_item("Ronin", Some(1998), 888), // imported
            premarked,                              // skipped up front
            matched_item("Heat", Some(1995), 949),  // duplicate, no resolution
            matched_item("Bad Apple", Some(2000), 111), // store failure
            unselected,                             // no selection
        ];

        let result = commit(&items, &[], &store).await.unwrap();

        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped, 2);
        assert_eq!(result.failed, 2);
        assert_eq!(result.merged + result.overwritten, 0);
        assert_eq!(result.total(), items.len());
    }
}
