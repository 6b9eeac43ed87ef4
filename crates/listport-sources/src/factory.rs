/// Construction of the configured collaborators.
///
/// Centralizes how the catalog client and the watchlist store backend are
/// built from configuration and stored credentials.
use crate::store::{HttpWatchlistStore, JsonFileStore};
use crate::tmdb::TmdbCatalog;
use crate::traits::{CatalogSearch, WatchlistStore};
use anyhow::Result;
use listport_config::{Config, CredentialStore, PathManager, StoreBackend};
use std::sync::Arc;

pub fn build_catalog(
    config: &Config,
    credentials: &CredentialStore,
) -> Result<Arc<dyn CatalogSearch>> {
    let api_key = credentials
        .get_catalog_api_key()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Catalog API key not found in credentials. Run 'listporter config set-catalog-key' first"
            )
        })?
        .clone();

    Ok(Arc::new(TmdbCatalog::new(
        config.catalog.base_url.clone(),
        api_key,
    )))
}

pub fn build_store(
    config: &Config,
    credentials: &CredentialStore,
    paths: &PathManager,
) -> Result<Box<dyn WatchlistStore>> {
    match config.store.backend {
        StoreBackend::File => Ok(Box::new(JsonFileStore::new(paths.watchlist_file()))),
        StoreBackend::Http => {
            if config.store.base_url.is_empty() {
                return Err(anyhow::anyhow!(
                    "store.backend is \"http\" but store.base_url is not configured"
                ));
            }
            let token = credentials
                .get_store_token()
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Store token not found in credentials. Run 'listporter config set-store-token' first"
                    )
                })?
                .clone();
            Ok(Box::new(HttpWatchlistStore::new(
                config.store.base_url.clone(),
                token,
            )))
        }
    }
}
