use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::media::MediaKind;
use crate::status::WatchStatus;

/// A canonical watchlist record as persisted by the external store.
/// Uniquely identified by catalog id or (title, year) within one user's list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    /// Store-assigned id; None until the entry has been created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub catalog_id: u64,
    pub media_kind: MediaKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    pub status: WatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_added: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_completed: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub streaming_providers: Vec<String>,
}

/// Partial update for an existing entry. `None` fields are left untouched by
/// the store; identity fields (id, catalog id, kind) are never part of a patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WatchStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_added: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_completed: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming_providers: Option<Vec<String>>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.rating.is_none()
            && self.notes.is_none()
            && self.date_added.is_none()
            && self.date_completed.is_none()
            && self.streaming_providers.is_none()
    }

    /// Apply this patch to an entry in place.
    pub fn apply_to(&self, entry: &mut WatchlistEntry) {
        if let Some(status) = self.status {
            entry.status = status;
        }
        if let Some(rating) = self.rating {
            entry.rating = Some(rating);
        }
        if let Some(ref notes) = self.notes {
            entry.notes = Some(notes.clone());
        }
        if let Some(date_added) = self.date_added {
            entry.date_added = Some(date_added);
        }
        if let Some(date_completed) = self.date_completed {
            entry.date_completed = Some(date_completed);
        }
        if let Some(ref providers) = self.streaming_providers {
            entry.streaming_providers = providers.clone();
        }
    }
}
