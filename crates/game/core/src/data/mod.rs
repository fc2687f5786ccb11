//! Designer-authored data tables.
//!
//! A [`DataTable`] is an immutable map from row name to a typed row. Tables are
//! loaded by `combat-content` and shared between characters through `Arc`.
//! A missing table or row is a configuration error ([`DataError`]) that the
//! caller reports loudly and recovers from locally.
mod archetype;
mod combo;
mod enemy;
mod player;

pub use archetype::{ArchetypeDefinition, ArchetypeKind, ArchetypeRows, BossArchetype};
pub use combo::{AttackType, ComboAttackRow, HitboxTiming};
pub use enemy::{BossPhaseRow, EnemyBaseStatRow, EnemyRangedStatRow};
pub use player::{ActionCostRow, BaseStatRow, OverclockSettingRow};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{CombatError, ErrorSeverity};

/// Errors raised when designer data cannot be resolved.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// No table was assigned where one is required.
    #[error("data table for {0} rows is not assigned")]
    TableNotAssigned(&'static str),

    /// The table exists but has no row with the requested name.
    #[error("row '{row}' not found in table '{table}'")]
    RowNotFound { table: String, row: String },
}

impl CombatError for DataError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            DataError::TableNotAssigned(_) => "DATA_TABLE_NOT_ASSIGNED",
            DataError::RowNotFound { .. } => "DATA_ROW_NOT_FOUND",
        }
    }
}

/// Named, read-only table of rows.
#[derive(Clone, Debug, PartialEq)]
pub struct DataTable<R> {
    name: String,
    rows: BTreeMap<String, R>,
}

impl<R> DataTable<R> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
        }
    }

    pub fn from_rows<I, K>(name: impl Into<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
    {
        Self {
            name: name.into(),
            rows: rows.into_iter().map(|(k, r)| (k.into(), r)).collect(),
        }
    }

    /// Adds or replaces a row (builder pattern).
    pub fn with_row(mut self, row_name: impl Into<String>, row: R) -> Self {
        self.rows.insert(row_name.into(), row);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a row by name.
    pub fn find_row(&self, row_name: &str) -> Result<&R, DataError> {
        self.rows.get(row_name).ok_or_else(|| DataError::RowNotFound {
            table: self.name.clone(),
            row: row_name.to_owned(),
        })
    }

    pub fn row_names(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reference to one row of a possibly-unassigned table.
#[derive(Clone, Debug)]
pub struct RowHandle<R> {
    table: Option<Arc<DataTable<R>>>,
    row_name: String,
}

impl<R: Clone> RowHandle<R> {
    pub fn new(table: Option<Arc<DataTable<R>>>, row_name: impl Into<String>) -> Self {
        Self {
            table,
            row_name: row_name.into(),
        }
    }

    pub fn unassigned(row_name: impl Into<String>) -> Self {
        Self::new(None, row_name)
    }

    pub fn row_name(&self) -> &str {
        &self.row_name
    }

    /// Resolves the row, copying it out of the table.
    pub fn load(&self) -> Result<R, DataError> {
        let table = self
            .table
            .as_ref()
            .ok_or(DataError::TableNotAssigned(short_type_name::<R>()))?;
        table.find_row(&self.row_name).cloned()
    }
}

fn short_type_name<R>() -> &'static str {
    let full = core::any::type_name::<R>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Every table the combat layer reads, bundled for spawning characters.
#[derive(Clone, Debug)]
pub struct DataTables {
    pub base_stats: Arc<DataTable<BaseStatRow>>,
    pub action_costs: Arc<DataTable<ActionCostRow>>,
    pub overclock: Arc<DataTable<OverclockSettingRow>>,
    pub combo_attacks: Arc<DataTable<ComboAttackRow>>,
    pub enemy_stats: Arc<DataTable<EnemyBaseStatRow>>,
    pub enemy_ranged_stats: Arc<DataTable<EnemyRangedStatRow>>,
    pub boss_phases: Arc<DataTable<BossPhaseRow>>,
}

impl DataTables {
    /// Tables holding the default rows under their conventional names.
    pub fn with_defaults() -> Self {
        use crate::config::CombatConfig as C;
        Self {
            base_stats: Arc::new(
                DataTable::new("base_stats").with_row(C::BASE_STAT_ROW, BaseStatRow::default()),
            ),
            action_costs: Arc::new(
                DataTable::new("action_costs")
                    .with_row(C::ACTION_COST_ROW, ActionCostRow::default()),
            ),
            overclock: Arc::new(
                DataTable::new("overclock")
                    .with_row(C::OVERCLOCK_ROW, OverclockSettingRow::default()),
            ),
            combo_attacks: Arc::new(ComboAttackRow::default_table()),
            enemy_stats: Arc::new(
                DataTable::new("enemy_stats")
                    .with_row(C::ENEMY_BASE_STAT_ROW, EnemyBaseStatRow::default()),
            ),
            enemy_ranged_stats: Arc::new(
                DataTable::new("enemy_ranged_stats")
                    .with_row(C::ENEMY_RANGED_STAT_ROW, EnemyRangedStatRow::default()),
            ),
            boss_phases: Arc::new(
                DataTable::new("boss_phases").with_row(C::BOSS_PHASE_ROW, BossPhaseRow::default()),
            ),
        }
    }
}
