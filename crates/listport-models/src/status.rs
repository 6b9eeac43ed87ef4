use serde::{Deserialize, Serialize};

/// Normalized watch status. Variant order encodes progress so that
/// `NotWatched < Watching < Completed`; merge resolution relies on this
/// ordering to keep whichever status represents more progress.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    /// Want to watch / plan to watch / on the list
    #[default]
    NotWatched,
    /// Currently watching / in progress
    Watching,
    /// Finished watching
    Completed,
}

impl WatchStatus {
    pub fn as_token(&self) -> &'static str {
        match self {
            WatchStatus::NotWatched => "not_watched",
            WatchStatus::Watching => "watching",
            WatchStatus::Completed => "completed",
        }
    }

    /// Parse the canonical snake_case token ("not_watched", "watching",
    /// "completed"). Free-text synonyms are the normalizer's job, not ours.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "not_watched" => Some(WatchStatus::NotWatched),
            "watching" => Some(WatchStatus::Watching),
            "completed" => Some(WatchStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_token())
    }
}
