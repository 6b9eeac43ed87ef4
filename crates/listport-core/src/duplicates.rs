use listport_models::{PreviewItem, WatchlistEntry};

/// Find the existing entry an imported item collides with.
///
/// The catalog id is the preferred key: the selected candidate's when one
/// exists, else the top candidate's as a provisional key. Case-insensitive
/// title + year equality is the fallback for rows the catalog key misses.
pub fn find_existing<'a>(
    item: &PreviewItem,
    snapshot: &'a [WatchlistEntry],
) -> Option<&'a WatchlistEntry> {
    if let Some(catalog_id) = item.effective_catalog_id() {
        if let Some(entry) = snapshot.iter().find(|e| e.catalog_id == catalog_id) {
            return Some(entry);
        }
    }
    snapshot.iter().find(|e| {
        e.title.eq_ignore_ascii_case(&item.original_title) && e.year == item.original_year
    })
}

/// Flag collisions on every item in place. Runs at preview time, before any
/// selection exists, so duplicates surface while the user is still reviewing.
pub fn annotate_duplicates(items: &mut [PreviewItem], snapshot: &[WatchlistEntry]) {
    for item in items.iter_mut() {
        match find_existing(item, snapshot) {
            Some(entry) => {
                item.has_existing_entry = true;
                item.existing_entry_id = entry.id;
            }
            None => {
                item.has_existing_entry = false;
                item.existing_entry_id = None;
            }
        }
    }
}
