pub mod api;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod hasher;
pub mod large_files;
pub mod logging;
pub mod remover;
pub mod scanner;
pub mod signal;
pub mod utils;

pub use api::{Request, Response, handle, handle_json};
pub use cli::Cli;
pub use config::Config;
pub use duplicates::{DuplicateGroup, GroupMember, KeepPolicy, find_duplicates, print_results};
pub use error::SweepError;
pub use hasher::{HashStrategy, content_digest};
pub use large_files::{LargeFile, LargeFileOptions, find_large_files};
pub use remover::{RemovalReport, TrashRecord, remove, staging_usage};
pub use scanner::{CandidateFile, ScanOptions, scan};
pub use signal::Cancellation;
pub use utils::format_human_elapsed;
