use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tracing::{debug, warn};

use crate::duplicates;
use crate::error::FormatError;
use crate::matcher;
use crate::normalize;
use crate::parse;
use listport_config::ImportConfig;
use listport_models::{Preview, PreviewItem, WatchlistEntry};
use listport_sources::CatalogSearch;

/// Tunables for preview generation.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub max_upload_bytes: usize,
    pub lookup_concurrency: usize,
    pub lookup_timeout: Duration,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            max_upload_bytes: 10 * 1024 * 1024,
            lookup_concurrency: 5,
            lookup_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&ImportConfig> for ImportOptions {
    fn from(config: &ImportConfig) -> Self {
        ImportOptions {
            max_upload_bytes: config.max_upload_bytes,
            lookup_concurrency: config.lookup_concurrency,
            lookup_timeout: Duration::from_secs(config.lookup_timeout_secs),
        }
    }
}

/// Builds review previews: parse, normalize, match against the catalog, flag
/// duplicates. Holds no state beyond the catalog handle and its options.
pub struct Importer {
    catalog: Arc<dyn CatalogSearch>,
    options: ImportOptions,
}

impl Importer {
    pub fn new(catalog: Arc<dyn CatalogSearch>) -> Self {
        Importer {
            catalog,
            options: ImportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse an upload and build the full preview against a snapshot of the
    /// store. Output order always equals input row order, whatever order the
    /// catalog lookups finish in.
    pub async fn build_preview(
        &self,
        bytes: &[u8],
        declared_type: Option<&str>,
        filename: Option<&str>,
        snapshot: &[WatchlistEntry],
    ) -> Result<Preview, FormatError> {
        let (rows, detected_format) =
            parse::parse_upload(bytes, declared_type, filename, self.options.max_upload_bytes)?;
        let rows_parsed = rows.len();

        let mut items: Vec<PreviewItem> = rows.iter().map(normalize::normalize_row).collect();

        self.attach_candidates(&mut items).await;
        duplicates::annotate_duplicates(&mut items, snapshot);

        let rows_with_errors = items.iter().filter(|item| item.error.is_some()).count();
        debug!(
            "Preview ready: {} items, {} with row errors, format {}",
            items.len(),
            rows_with_errors,
            detected_format
        );

        Ok(Preview {
            items,
            detected_format,
            rows_parsed,
            rows_with_errors,
        })
    }

    /// Run catalog lookups with bounded concurrency, writing each outcome
    /// back into its item's slot by index. One row failing or timing out
    /// never touches its siblings.
    async fn attach_candidates(&self, items: &mut [PreviewItem]) {
        let lookups = items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.original_title.is_empty())
            .map(|(index, item)| {
                let catalog = Arc::clone(&self.catalog);
                let title = item.original_title.clone();
                let year = item.original_year;
                let timeout = self.options.lookup_timeout;
                async move {
                    let outcome = tokio::time::timeout(
                        timeout,
                        matcher::find_candidates(catalog.as_ref(), &title, year),
                    )
                    .await;
                    (index, outcome)
                }
            });

        let results = futures::stream::iter(lookups)
            .buffer_unordered(self.options.lookup_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        for (index, outcome) in results {
            match outcome {
                Ok(Ok(candidates)) => items[index].match_candidates = candidates,
                Ok(Err(e)) => {
                    warn!(
                        "Catalog lookup for '{}' failed: {}",
                        items[index].original_title, e
                    );
                    items[index].error = Some("lookup failed".to_string());
                }
                Err(_) => {
                    warn!(
                        "Catalog lookup for '{}' timed out after {:?}",
                        items[index].original_title, self.options.lookup_timeout
                    );
                    items[index].error = Some("lookup failed".to_string());
                }
            }
        }
    }
}
