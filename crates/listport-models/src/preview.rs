use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::CandidateMatch;
use crate::status::WatchStatus;

/// The unit of review and the unit of commit.
///
/// Built by normalization + matching, mutated only by explicit user decisions
/// (selecting a candidate, toggling skip), consumed exactly once by commit and
/// then discarded. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreviewItem {
    pub original_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_year: Option<u32>,
    /// Scored candidates, non-increasing in confidence, at most five.
    #[serde(default)]
    pub match_candidates: Vec<CandidateMatch>,
    /// Index into `match_candidates`. Always starts out None: binding a row to
    /// a catalog title is an explicit user action, never inferred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_match: Option<usize>,
    pub suggested_status: WatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_added: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub streaming_providers: Vec<String>,
    #[serde(default)]
    pub has_existing_entry: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_entry_id: Option<u64>,
    #[serde(default)]
    pub should_skip: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PreviewItem {
    /// The candidate the user selected, if any.
    pub fn selected_candidate(&self) -> Option<&CandidateMatch> {
        self.selected_match.and_then(|i| self.match_candidates.get(i))
    }

    /// The id this item would bind to: the selected candidate's, or the top
    /// candidate's as a provisional key before any selection exists.
    pub fn effective_catalog_id(&self) -> Option<u64> {
        self.selected_candidate()
            .or_else(|| self.match_candidates.first())
            .map(|c| c.catalog_id)
    }
}

/// Which format the upload was parsed as.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImportFormat::Csv => "csv",
            ImportFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// The reviewable, not-yet-committed representation of an import batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preview {
    pub items: Vec<PreviewItem>,
    pub detected_format: ImportFormat,
    pub rows_parsed: usize,
    /// Rows carried into the preview with a row-level error attached.
    pub rows_with_errors: usize,
}
