//! Content factory for building combat data from files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use combat_core::{ArchetypeDefinition, CombatConfig, DataTable, DataTables};
use serde::de::DeserializeOwned;

use crate::loaders::{ArchetypeLoader, ConfigLoader, LoadResult, TableLoader, embedded, read_file};

/// Where the factory reads its files from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentSource {
    /// A data directory on disk.
    Directory(PathBuf),
    /// The default data set compiled into this crate.
    Embedded,
}

/// Everything a combat world needs from content, loaded together.
#[derive(Clone, Debug)]
pub struct Content {
    pub config: CombatConfig,
    pub tables: DataTables,
    pub archetypes: Vec<ArchetypeDefinition>,
}

impl Content {
    /// Finds an archetype definition by name.
    pub fn archetype(&self, name: &str) -> Option<&ArchetypeDefinition> {
        self.archetypes.iter().find(|def| def.name == name)
    }
}

/// Content factory that loads all combat content from one source.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── archetypes.ron
/// ├── base_stats.ron
/// ├── action_costs.ron
/// ├── overclock.ron
/// ├── combo_attacks.ron
/// ├── enemy_stats.ron
/// ├── enemy_ranged_stats.ron
/// └── boss_phases.ron
/// ```
pub struct ContentFactory {
    source: ContentSource,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: ContentSource::Directory(data_dir.into()),
        }
    }

    /// Creates a factory over the data files compiled into the crate.
    pub fn embedded() -> Self {
        Self {
            source: ContentSource::Embedded,
        }
    }

    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    /// Returns the data directory path, if reading from disk.
    pub fn data_dir(&self) -> Option<&Path> {
        match &self.source {
            ContentSource::Directory(dir) => Some(dir),
            ContentSource::Embedded => None,
        }
    }

    /// Load combat configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        match &self.source {
            ContentSource::Directory(dir) => ConfigLoader::load(&dir.join("config.toml")),
            ContentSource::Embedded => ConfigLoader::parse(embedded::CONFIG, "embedded config.toml"),
        }
    }

    /// Load archetype definitions from `archetypes.ron`.
    pub fn load_archetypes(&self) -> LoadResult<Vec<ArchetypeDefinition>> {
        match &self.source {
            ContentSource::Directory(dir) => ArchetypeLoader::load(&dir.join("archetypes.ron")),
            ContentSource::Embedded => {
                ArchetypeLoader::parse(embedded::ARCHETYPES, "embedded archetypes.ron")
            }
        }
    }

    /// Load every data table.
    pub fn load_tables(&self) -> LoadResult<DataTables> {
        Ok(DataTables {
            base_stats: self.load_table("base_stats")?,
            action_costs: self.load_table("action_costs")?,
            overclock: self.load_table("overclock")?,
            combo_attacks: self.load_table("combo_attacks")?,
            enemy_stats: self.load_table("enemy_stats")?,
            enemy_ranged_stats: self.load_table("enemy_ranged_stats")?,
            boss_phases: self.load_table("boss_phases")?,
        })
    }

    /// Load config, tables and archetypes.
    pub fn load_all(&self) -> LoadResult<Content> {
        let content = Content {
            config: self.load_config()?,
            tables: self.load_tables()?,
            archetypes: self.load_archetypes()?,
        };
        tracing::info!(
            target: "content::factory",
            source = ?self.source,
            archetypes = content.archetypes.len(),
            "combat content loaded"
        );
        Ok(content)
    }

    /// Load one table from `{name}.ron`.
    fn load_table<R: DeserializeOwned>(&self, name: &str) -> LoadResult<Arc<DataTable<R>>> {
        let file_name = format!("{name}.ron");
        let (content, origin) = match &self.source {
            ContentSource::Directory(dir) => {
                let path = dir.join(&file_name);
                (read_file(&path)?, path.display().to_string())
            }
            ContentSource::Embedded => {
                let text = embedded::file(&file_name)
                    .ok_or_else(|| anyhow::anyhow!("No embedded data file {}", file_name))?;
                (text.to_owned(), format!("embedded {file_name}"))
            }
        };
        TableLoader::parse(name, &content, &origin).map(Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{ArchetypeKind, AttackType, BossArchetype, ComboAttackRow};
    use std::fs;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Some(Path::new("/tmp/data")));
        assert_eq!(ContentFactory::embedded().data_dir(), None);
    }

    #[test]
    fn embedded_content_matches_default_rows() {
        let content = ContentFactory::embedded().load_all().unwrap();
        let defaults = DataTables::with_defaults();

        assert_eq!(content.config, CombatConfig::default());
        assert_eq!(
            content.tables.base_stats.find_row(CombatConfig::BASE_STAT_ROW),
            defaults.base_stats.find_row(CombatConfig::BASE_STAT_ROW)
        );
        assert_eq!(
            content.tables.overclock.find_row(CombatConfig::OVERCLOCK_ROW),
            defaults.overclock.find_row(CombatConfig::OVERCLOCK_ROW)
        );
        assert_eq!(
            content.tables.boss_phases.find_row(CombatConfig::BOSS_PHASE_ROW),
            defaults.boss_phases.find_row(CombatConfig::BOSS_PHASE_ROW)
        );
        assert_eq!(*content.tables.combo_attacks, *defaults.combo_attacks);
    }

    #[test]
    fn embedded_archetypes_cover_every_kind() {
        let content = ContentFactory::embedded().load_all().unwrap();
        assert_eq!(content.archetype("Player").unwrap().kind, ArchetypeKind::Player);
        assert_eq!(content.archetype("MeleeEnemy").unwrap().kind, ArchetypeKind::MeleeEnemy);
        assert!(matches!(
            content.archetype("RangedEnemy").unwrap().kind,
            ArchetypeKind::RangedEnemy { projectile: Some(_) }
        ));
        assert_eq!(
            content.archetype("MidBoss").unwrap().kind,
            ArchetypeKind::Boss {
                archetype: BossArchetype::MidBoss
            }
        );
        assert!(content.archetype("FinalBoss").is_some());
        assert!(content.archetype("Nobody").is_none());
    }

    #[test]
    fn directory_source_reads_every_file() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "config.toml",
            "archetypes.ron",
            "base_stats.ron",
            "action_costs.ron",
            "overclock.ron",
            "enemy_stats.ron",
            "enemy_ranged_stats.ron",
            "boss_phases.ron",
        ] {
            fs::write(dir.path().join(name), embedded::file(name).unwrap()).unwrap();
        }
        fs::write(
            dir.path().join("combo_attacks.ron"),
            r#"{ "LightAttack_1": (step: 1, attack_type: Light, montage: Some("AM_Jab")) }"#,
        )
        .unwrap();

        let content = ContentFactory::new(dir.path()).load_all().unwrap();
        assert_eq!(content.tables.combo_attacks.len(), 1);
        let row = content
            .tables
            .combo_attacks
            .find_row(&ComboAttackRow::row_name(1, AttackType::Light))
            .unwrap();
        assert_eq!(row.montage.as_deref(), Some("AM_Jab"));
    }

    #[test]
    fn missing_table_file_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentFactory::new(dir.path()).load_tables().unwrap_err();
        assert!(err.to_string().contains("base_stats.ron"));
    }
}
