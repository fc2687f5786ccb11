//! Character combat rules shared by every runtime.
//!
//! `combat-core` holds the data-driven stat engine (attributes, tags, effects),
//! the per-character components built on it (stats, combo attack, boss phases,
//! enemy kit) and the collaborator interfaces they consume. It performs no I/O:
//! data tables come from `combat-content`, and timers, spatial queries and
//! montage playback are supplied by `combat-runtime`.
//!
//! All attribute writes go through [`AbilitySystem`], which queues every
//! committed change for the owning character to dispatch.
pub mod ability_system;
pub mod attributes;
pub mod combo;
pub mod config;
pub mod context;
pub mod data;
pub mod effects;
pub mod enemy;
pub mod entity;
pub mod env;
pub mod error;
pub mod events;
pub mod phase;
pub mod stats;
pub mod tags;
pub mod timer;
pub mod traits;

pub use ability_system::{AbilitySystem, AppliedEffect};
pub use attributes::{Attribute, AttributeChange, AttributeRegistry, AttributeSet, ClampRule};
pub use combo::{ComboAttack, ComboEndReason, ComboError, HitResolution};
pub use config::CombatConfig;
pub use context::CombatContext;
pub use data::{
    ActionCostRow, ArchetypeDefinition, ArchetypeKind, ArchetypeRows, AttackType, BaseStatRow,
    BossArchetype, BossPhaseRow, ComboAttackRow, DataError, DataTable, DataTables,
    EnemyBaseStatRow, EnemyRangedStatRow, HitboxTiming, OverclockSettingRow, RowHandle,
};
pub use effects::{ActiveEffectHandle, DurationPolicy, EffectSpec};
pub use enemy::EnemyCombat;
pub use entity::{EntityId, Transform};
pub use env::{
    CollisionChannel, MontageEnd, MontageInstance, MontagePlayer, MontageRequest, OverlapQuery,
    ProjectileLaunch, ProjectileSpawner,
};
pub use error::{CombatError, ErrorSeverity};
pub use events::{Event, EventBus, SubscriptionId, Topic};
pub use phase::{BossPattern, PhaseController};
pub use stats::{OverclockLevel, OverclockSource, StaminaAction, StatsComponent, StatsError};
pub use tags::{GameplayTag, TagContainer};
pub use timer::{FiredTimer, TimerCallback, TimerHandle, TimerKind, TimerManager, TimerService};
pub use traits::{AIControllable, Damageable, HasOverclock, HasPhases};
