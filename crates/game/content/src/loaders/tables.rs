//! Data table loader.
//!
//! A table file is a RON map from row name to row:
//!
//! ```ron
//! {
//!     "InitActionCost": (dash_stamina_cost: 20.0, parry_stamina_cost: 15.0),
//! }
//! ```
//!
//! Row fields fall back to the row type's defaults when omitted.

use std::collections::BTreeMap;
use std::path::Path;

use combat_core::DataTable;
use serde::de::DeserializeOwned;

use crate::loaders::{LoadResult, read_file};

/// Loader for typed data tables from RON files.
pub struct TableLoader;

impl TableLoader {
    /// Load a table from a RON file. The table is named after the file stem.
    pub fn load<R: DeserializeOwned>(path: &Path) -> LoadResult<DataTable<R>> {
        let content = read_file(path)?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("table");
        Self::parse(name, &content, &path.display().to_string())
    }

    /// Parse a table named `name` from RON text. `origin` names the source in errors.
    pub fn parse<R: DeserializeOwned>(
        name: &str,
        content: &str,
        origin: &str,
    ) -> LoadResult<DataTable<R>> {
        let rows: BTreeMap<String, R> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse table RON {}: {}", origin, e))?;

        if rows.is_empty() {
            tracing::warn!(target: "content::tables", table = name, %origin, "table has no rows");
        }
        tracing::debug!(target: "content::tables", table = name, rows = rows.len(), "table loaded");

        Ok(DataTable::from_rows(name, rows))
    }
}
