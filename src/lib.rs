//! hemeroteca - file scanned periodical back-issues into a dated folder tree
//!
//! This library classifies archive names into publication and date, resolves
//! their place in a `year / month / publication` tree, extracts them with
//! external tools, and moves the contents into place with retrying cleanup.
//! A simpler date-only workflow moves or copies files by the date in their
//! names.

pub mod calendar;
pub mod cli;
pub mod config;
pub mod destination;
pub mod extractor;
pub mod file_organizer;
pub mod filename_parser;
pub mod output;
pub mod preview;
pub mod retry;

pub use config::{ConfigError, Settings};
pub use destination::TargetInfo;
pub use extractor::{ArchiveExtractor, ArchiveKind, ExtractionError, SystemExtractor};
pub use file_organizer::{
    DateOperation, FileOrganizer, OrganizeError, ProcessingProgress, ProcessingResult,
};
pub use filename_parser::{DateInfo, FileMetadata};
pub use preview::{PreviewError, PreviewItem, PreviewReport};
pub use retry::{RetryPolicy, SafeRemover};

pub use cli::{OrganizeCommand, run_cli};
