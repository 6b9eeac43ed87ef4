use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

/// The catalog search service (a TMDB-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,
}

/// Where the canonical watchlist lives: a local JSON file or a remote
/// HTTP service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Base URL of the watchlist service; only read for the http backend.
    #[serde(default)]
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Http,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::File => write!(f, "file"),
            StoreBackend::Http => write!(f, "http"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_lookup_concurrency")]
    pub lookup_concurrency: usize,
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,
}

fn default_catalog_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_lookup_concurrency() -> usize {
    5
}

fn default_lookup_timeout_secs() -> u64 {
    10
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            base_url: String::new(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            lookup_concurrency: default_lookup_concurrency(),
            lookup_timeout_secs: default_lookup_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.catalog.base_url.is_empty() {
            return Err(anyhow::anyhow!("catalog.base_url cannot be empty"));
        }
        if self.store.backend == StoreBackend::Http && self.store.base_url.is_empty() {
            return Err(anyhow::anyhow!(
                "store.backend is \"http\" but store.base_url is not configured"
            ));
        }
        if self.import.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("import.max_upload_bytes must be positive"));
        }
        if self.import.lookup_concurrency == 0 {
            return Err(anyhow::anyhow!(
                "import.lookup_concurrency must be at least 1"
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            catalog: CatalogConfig {
                base_url: "https://catalog.example.test/v3".to_string(),
            },
            store: StoreConfig {
                backend: StoreBackend::Http,
                base_url: "https://watchlist.example.test".to_string(),
            },
            import: ImportConfig {
                max_upload_bytes: 1024,
                lookup_concurrency: 2,
                lookup_timeout_secs: 3,
            },
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.catalog.base_url, "https://catalog.example.test/v3");
        assert_eq!(loaded.store.backend, StoreBackend::Http);
        assert_eq!(loaded.import.max_upload_bytes, 1024);
        assert_eq!(loaded.import.lookup_concurrency, 2);
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.catalog.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.import.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.import.lookup_concurrency, 5);
        assert_eq!(config.import.lookup_timeout_secs, 10);
    }

    #[test]
    fn test_validate_http_backend_requires_base_url() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.store.backend = StoreBackend::Http;
        assert!(config.validate().is_err());

        config.store.base_url = "https://watchlist.example.test".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = Config::default();
        config.import.max_upload_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.import.lookup_concurrency = 0;
        assert!(config.validate().is_err());
    }
}
