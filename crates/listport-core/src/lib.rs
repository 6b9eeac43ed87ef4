pub mod commit;
pub mod detect;
pub mod duplicates;
pub mod error;
pub mod export;
pub mod matcher;
pub mod normalize;
pub mod parse;
pub mod preview;

pub use commit::commit;
pub use detect::detect_format;
pub use duplicates::{annotate_duplicates, find_existing};
pub use error::FormatError;
pub use export::{export_entries, export_filename};
pub use matcher::{find_candidates, rank_candidates, MAX_CANDIDATES};
pub use normalize::normalize_row;
pub use parse::parse_upload;
pub use preview::{ImportOptions, Importer};
