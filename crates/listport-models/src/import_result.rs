use serde::{Deserialize, Serialize};

/// One item's failure inside an otherwise-committed batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemError {
    /// Position of the item in the submitted preview sequence.
    pub index: usize,
    pub title: String,
    pub message: String,
}

/// Terminal report of a commit. The five counters always sum to the number of
/// items submitted; items pre-marked for skipping count toward `skipped`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub merged: usize,
    pub overwritten: usize,
    pub failed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ItemError>,
}

impl ImportResult {
    pub fn total(&self) -> usize {
        self.imported + self.skipped + self.merged + self.overwritten + self.failed
    }

    pub fn record_failure(&mut self, index: usize, title: &str, message: impl Into<String>) {
        self.failed += 1;
        self.errors.push(ItemError {
            index,
            title: title.to_string(),
            message: message.into(),
        });
    }
}
