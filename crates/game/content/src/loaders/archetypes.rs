//! Archetype catalog loader.

use std::collections::BTreeSet;
use std::path::Path;

use combat_core::ArchetypeDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Archetype catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeCatalog {
    pub archetypes: Vec<ArchetypeDefinition>,
}

/// Loader for archetype definitions from RON files.
pub struct ArchetypeLoader;

impl ArchetypeLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<ArchetypeDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse a catalog from RON text. Archetype names must be unique.
    pub fn parse(content: &str, origin: &str) -> LoadResult<Vec<ArchetypeDefinition>> {
        let catalog: ArchetypeCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse archetype RON {}: {}", origin, e))?;

        let mut seen = BTreeSet::new();
        for def in &catalog.archetypes {
            if !seen.insert(def.name.as_str()) {
                anyhow::bail!("Duplicate archetype '{}' in {}", def.name, origin);
            }
            if def.collision_radius <= 0.0 {
                anyhow::bail!(
                    "Archetype '{}' in {} has non-positive collision radius {}",
                    def.name,
                    origin,
                    def.collision_radius
                );
            }
        }

        Ok(catalog.archetypes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{ArchetypeKind, BossArchetype};

    const CATALOG: &str = r#"(
        archetypes: [
            (name: "Player", kind: Player),
            (name: "Archer", kind: RangedEnemy(projectile: Some("Arrow")), collision_radius: 30.0),
            (
                name: "Warden",
                kind: Boss(archetype: FinalBoss),
                rows: (boss_phase: "WardenPhases"),
            ),
        ],
    )"#;

    #[test]
    fn parses_kinds_and_row_overrides() {
        let defs = ArchetypeLoader::parse(CATALOG, "inline").unwrap();
        assert_eq!(defs.len(), 3);

        assert_eq!(defs[0].kind, ArchetypeKind::Player);
        assert_eq!(defs[0].collision_radius, 40.0);

        assert_eq!(
            defs[1].kind,
            ArchetypeKind::RangedEnemy {
                projectile: Some("Arrow".into())
            }
        );
        assert_eq!(defs[1].collision_radius, 30.0);

        assert_eq!(
            defs[2].kind,
            ArchetypeKind::Boss {
                archetype: BossArchetype::FinalBoss
            }
        );
        assert_eq!(defs[2].rows.boss_phase, "WardenPhases");
        assert_eq!(defs[2].rows.enemy_stat, "EnemyBaseStatInit");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let text = r#"(archetypes: [(name: "A", kind: Player), (name: "A", kind: MeleeEnemy)])"#;
        let err = ArchetypeLoader::parse(text, "dup.ron").unwrap_err();
        assert!(err.to_string().contains("Duplicate archetype 'A'"));
    }

    #[test]
    fn zero_collision_radius_is_rejected() {
        let text = r#"(archetypes: [(name: "Ghost", kind: MeleeEnemy, collision_radius: 0.0)])"#;
        assert!(ArchetypeLoader::parse(text, "inline").is_err());
    }
}
