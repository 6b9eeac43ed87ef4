pub mod error;
pub mod factory;
pub mod store;
pub mod tmdb;
pub mod traits;

pub use error::SourceError;
pub use factory::{build_catalog, build_store};
pub use store::{HttpWatchlistStore, JsonFileStore};
pub use tmdb::TmdbCatalog;
pub use traits::{CatalogSearch, WatchlistStore};
