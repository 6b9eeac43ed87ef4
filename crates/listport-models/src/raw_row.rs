use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One source record exactly as parsed, before any interpretation.
///
/// Field values are kept close to the wire: status is free text, the rating is
/// whatever number the file carried, the watch date is an unparsed string.
/// Columns the parser does not recognize land verbatim in `extra` so nothing
/// from the upload is silently discarded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawRow {
    pub title: String,
    pub year: Option<u32>,
    pub status: Option<String>,
    pub rating: Option<f64>,
    pub notes: Option<String>,
    pub date_watched: Option<String>,
    pub providers: Option<String>,
    /// Unrecognized columns, keyed by the original header name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
    /// Set when the row itself was malformed but retained for the preview.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_note: Option<String>,
}

impl RawRow {
    /// A placeholder row for a record that could not be parsed at all.
    pub fn malformed(note: impl Into<String>) -> Self {
        RawRow {
            parse_note: Some(note.into()),
            ..Default::default()
        }
    }
}
