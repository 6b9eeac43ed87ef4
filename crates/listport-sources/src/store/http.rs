use crate::error::SourceError;
use crate::traits::WatchlistStore;
use async_trait::async_trait;
use listport_models::{EntryPatch, WatchlistEntry};
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use tracing::debug;

/// REST client for a remote watchlist service.
pub struct HttpWatchlistStore {
    client: Arc<Client>,
    base_url: String,
    token: String,
}

impl HttpWatchlistStore {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn entries_url(&self) -> String {
        format!("{}/watchlist", self.base_url)
    }

    fn entry_url(&self, id: u64) -> String {
        format!("{}/watchlist/{}", self.base_url, id)
    }

    async fn check(response: Response, id: Option<u64>) -> Result<Response, SourceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(SourceError::NotFound(id));
            }
        }
        let message = response.text().await.unwrap_or_default();
        Err(SourceError::api(status.as_u16(), message))
    }
}

#[async_trait]
impl WatchlistStore for HttpWatchlistStore {
    fn backend_name(&self) -> &str {
        "http"
    }

    async fn list(&self) -> Result<Vec<WatchlistEntry>, SourceError> {
        let response = self
            .client
            .get(self.entries_url())
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await?;

        let response = Self::check(response, None).await?;
        let entries: Vec<WatchlistEntry> = response.json().await?;
        debug!("Fetched {} entries from watchlist service", entries.len());
        Ok(entries)
    }

    async fn create(&self, entry: &WatchlistEntry) -> Result<WatchlistEntry, SourceError> {
        let response = self
            .client
            .post(self.entries_url())
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .json(entry)
            .send()
            .await?;

        let response = Self::check(response, None).await?;
        Ok(response.json().await?)
    }

    async fn update(&self, id: u64, patch: &EntryPatch) -> Result<WatchlistEntry, SourceError> {
        let response = self
            .client
            .patch(self.entry_url(id))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .json(patch)
            .send()
            .await?;

        let response = Self::check(response, Some(id)).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, id: u64) -> Result<(), SourceError> {
        let response = self
            .client
            .delete(self.entry_url(id))
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;

        Self::check(response, Some(id)).await?;
        Ok(())
    }
}
