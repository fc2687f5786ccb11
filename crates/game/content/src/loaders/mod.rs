//! Content loaders for reading combat data from files.
//!
//! Each loader has a `load(path)` entry point for files on disk and a
//! `parse(..)` entry point for text already in memory (used by the embedded
//! data set). Every failure names the file it came from.

pub mod archetypes;
pub mod config;
mod embedded;
pub mod factory;
pub mod tables;

pub use archetypes::ArchetypeLoader;
pub use config::ConfigLoader;
pub use factory::{Content, ContentFactory, ContentSource};
pub use tables::TableLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
