pub mod commit;
pub mod config;
pub mod export;
pub mod import;
pub mod prompts;
