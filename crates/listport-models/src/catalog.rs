use serde::{Deserialize, Serialize};

use crate::media::MediaKind;

/// One unscored hit from the external catalog search service.
///
/// The service returns whatever its own ranking produces; confidence scoring
/// is the matcher's responsibility, not the catalog's.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogTitle {
    pub catalog_id: u64,
    pub media_kind: MediaKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u64>,
}

/// A catalog hit scored against one imported row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateMatch {
    pub catalog_id: u64,
    pub media_kind: MediaKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Estimated probability in [0, 1] that this candidate is the right match.
    pub confidence: f64,
}

impl CandidateMatch {
    pub fn from_catalog(hit: &CatalogTitle, confidence: f64) -> Self {
        CandidateMatch {
            catalog_id: hit.catalog_id,
            media_kind: hit.media_kind,
            title: hit.title.clone(),
            year: hit.year,
            poster_path: hit.poster_path.clone(),
            backdrop_path: hit.backdrop_path.clone(),
            overview: hit.overview.clone(),
            confidence,
        }
    }
}
