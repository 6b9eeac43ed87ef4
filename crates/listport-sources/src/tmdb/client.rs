use crate::error::SourceError;
use crate::tmdb::api;
use crate::traits::CatalogSearch;
use async_trait::async_trait;
use listport_models::CatalogTitle;
use reqwest::Client;
use std::sync::Arc;

/// Catalog client for a TMDB-compatible search API.
#[derive(Clone)]
pub struct TmdbCatalog {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl TmdbCatalog {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl CatalogSearch for TmdbCatalog {
    async fn search(&self, query: &str) -> Result<Vec<CatalogTitle>, SourceError> {
        api::search_multi(&self.client, &self.base_url, &self.api_key, query).await
    }
}
