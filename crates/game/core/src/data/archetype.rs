//! Character archetype definitions.
//!
//! An archetype names the components a character is composed of and the data
//! rows that configure them. Behaviour differences between archetypes are data,
//! not subtypes.

use crate::config::CombatConfig;

/// Boss archetype, selecting which presentation patterns each phase unlocks.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BossArchetype {
    MidBoss,
    FinalBoss,
}

/// Component layout of a character.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArchetypeKind {
    /// Stats component plus combo ability.
    Player,
    /// Enemy kit with melee hitbox and charge attack.
    MeleeEnemy,
    /// Enemy kit with projectiles. `projectile` names the projectile to spawn.
    RangedEnemy { projectile: Option<String> },
    /// Enemy kit with melee attacks plus boss phases.
    Boss { archetype: BossArchetype },
}

impl ArchetypeKind {
    pub const fn is_enemy(&self) -> bool {
        !matches!(self, Self::Player)
    }
}

/// Named archetype with the rows that configure it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArchetypeDefinition {
    pub name: String,
    pub kind: ArchetypeKind,
    #[cfg_attr(feature = "serde", serde(default = "default_collision_radius"))]
    pub collision_radius: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rows: ArchetypeRows,
}

/// Row names used when spawning an archetype. Defaults follow the conventional
/// names in [`CombatConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArchetypeRows {
    pub base_stat: String,
    pub action_cost: String,
    pub overclock: String,
    pub enemy_stat: String,
    pub enemy_ranged_stat: String,
    pub boss_phase: String,
}

impl Default for ArchetypeRows {
    fn default() -> Self {
        Self {
            base_stat: CombatConfig::BASE_STAT_ROW.to_owned(),
            action_cost: CombatConfig::ACTION_COST_ROW.to_owned(),
            overclock: CombatConfig::OVERCLOCK_ROW.to_owned(),
            enemy_stat: CombatConfig::ENEMY_BASE_STAT_ROW.to_owned(),
            enemy_ranged_stat: CombatConfig::ENEMY_RANGED_STAT_ROW.to_owned(),
            boss_phase: CombatConfig::BOSS_PHASE_ROW.to_owned(),
        }
    }
}

const DEFAULT_COLLISION_RADIUS: f32 = 40.0;

#[cfg_attr(not(feature = "serde"), allow(dead_code))]
fn default_collision_radius() -> f32 {
    DEFAULT_COLLISION_RADIUS
}

impl ArchetypeDefinition {
    pub fn new(name: impl Into<String>, kind: ArchetypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            collision_radius: DEFAULT_COLLISION_RADIUS,
            rows: ArchetypeRows::default(),
        }
    }

    pub fn player() -> Self {
        Self::new("Player", ArchetypeKind::Player)
    }

    pub fn melee_enemy() -> Self {
        Self::new("MeleeEnemy", ArchetypeKind::MeleeEnemy)
    }

    pub fn ranged_enemy(projectile: Option<&str>) -> Self {
        Self::new(
            "RangedEnemy",
            ArchetypeKind::RangedEnemy {
                projectile: projectile.map(str::to_owned),
            },
        )
    }

    pub fn boss(archetype: BossArchetype) -> Self {
        Self::new(archetype.as_ref(), ArchetypeKind::Boss { archetype })
    }

    pub fn with_collision_radius(mut self, radius: f32) -> Self {
        self.collision_radius = radius;
        self
    }

    pub fn with_rows(mut self, rows: ArchetypeRows) -> Self {
        self.rows = rows;
        self
    }
}
