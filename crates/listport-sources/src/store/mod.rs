pub mod file;
pub mod http;

pub use file::JsonFileStore;
pub use http::HttpWatchlistStore;
