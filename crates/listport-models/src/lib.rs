pub mod catalog;
pub mod entry;
pub mod import_result;
pub mod media;
pub mod preview;
pub mod raw_row;
pub mod resolution;
pub mod status;

pub use catalog::{CandidateMatch, CatalogTitle};
pub use entry::{EntryPatch, WatchlistEntry};
pub use import_result::{ImportResult, ItemError};
pub use media::MediaKind;
pub use preview::{ImportFormat, Preview, PreviewItem};
pub use raw_row::RawRow;
pub use resolution::{MergeField, Resolution, ResolutionKey, ResolutionStrategy};
pub use status::WatchStatus;
