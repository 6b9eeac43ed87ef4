use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The user's policy for reconciling one imported row with an existing entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStrategy {
    /// Leave the existing entry untouched.
    Skip,
    /// Take the listed fields from the import, keep everything else.
    Merge,
    /// Replace all mutable fields with the import's values.
    Overwrite,
}

/// Fields a merge may take from the import.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MergeField {
    Status,
    Rating,
    Notes,
    DateAdded,
    Providers,
}

/// How a resolution refers back to its preview item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionKey {
    /// Position in the submitted preview sequence.
    Index(usize),
    /// Original title + year, compared case-insensitively.
    Entry {
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        year: Option<u32>,
    },
}

/// One user decision for a duplicate row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resolution {
    pub key: ResolutionKey,
    pub strategy: ResolutionStrategy,
    /// Only meaningful for `Merge`; unspecified fields keep the existing value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_fields: Option<BTreeSet<MergeField>>,
}

impl Resolution {
    /// Whether this resolution addresses the item at `index` with the given
    /// original title/year.
    pub fn matches(&self, index: usize, title: &str, year: Option<u32>) -> bool {
        match &self.key {
            ResolutionKey::Index(i) => *i == index,
            ResolutionKey::Entry { title: t, year: y } => {
                t.eq_ignore_ascii_case(title) && *y == year
            }
        }
    }

    pub fn merge_field(&self, field: MergeField) -> bool {
        self.merge_fields
            .as_ref()
            .map(|fields| fields.contains(&field))
            .unwrap_or(false)
    }
}
