//! Data-driven combat content and loaders.
//!
//! This crate ships the default designer data for the combat layer and the
//! loaders that read it from RON/TOML files:
//! - Data tables (one RON map per row type, keyed by row name)
//! - Archetype definitions (RON)
//! - Combat configuration (TOML)
//!
//! Loaders produce `combat-core` types directly; nothing here holds runtime
//! state. The default data files are also compiled into the crate so a runtime
//! can start without a data directory.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ArchetypeLoader, ConfigLoader, Content, ContentFactory, ContentSource, LoadResult,
    TableLoader,
};
