//! Stats component: the per-character façade over the ability system.
//!
//! [`StatsComponent`] loads the base stat, action cost and overclock rows,
//! applies the base stats as one instant effect, and afterwards reacts to every
//! committed attribute change forwarded by its owner:
//!
//! * Health, Stamina, Chronos and OverclockPoint changes are re-published as
//!   `(current, max)` events.
//! * OverclockPoint changes also drive the level-tag sync, which runs in the
//!   fixed order: reached flags, tag grant/revoke, derived level, broadcast.
//!
//! Infinite buffs are keyed. Applying a buff under a key that is already in use
//! removes the previous effect first, so a key never stacks.
mod overclock;

pub use overclock::{OverclockLevel, OverclockSource};

use std::collections::HashMap;
use std::sync::Arc;

use crate::ability_system::AbilitySystem;
use crate::attributes::{Attribute, AttributeChange};
use crate::context::CombatContext;
use crate::data::{
    ActionCostRow, ArchetypeRows, BaseStatRow, DataError, DataTable, OverclockSettingRow,
    RowHandle,
};
use crate::effects::{ActiveEffectHandle, EffectSpec};
use crate::error::{CombatError, ErrorSeverity};
use crate::events::Event;
use crate::tags::GameplayTag;
use crate::tags::native::stats;

/// Errors raised by [`StatsComponent::initialize`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StatsError {
    #[error("stats component is already initialized")]
    AlreadyInitialized,

    #[error(transparent)]
    Data(#[from] DataError),
}

impl CombatError for StatsError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            StatsError::AlreadyInitialized => ErrorSeverity::Validation,
            StatsError::Data(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            StatsError::AlreadyInitialized => "STATS_ALREADY_INITIALIZED",
            StatsError::Data(err) => err.error_code(),
        }
    }
}

/// Stamina-costed movement and defensive actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum StaminaAction {
    Dash,
    Parry,
}

impl StaminaAction {
    fn cost(self, costs: &ActionCostRow) -> f32 {
        match self {
            Self::Dash => costs.dash_stamina_cost,
            Self::Parry => costs.parry_stamina_cost,
        }
    }
}

#[derive(Clone, Debug)]
struct LoadedRows {
    action_cost: ActionCostRow,
    overclock: OverclockSettingRow,
}

#[derive(Debug)]
pub struct StatsComponent {
    base_stat: RowHandle<BaseStatRow>,
    action_cost: RowHandle<ActionCostRow>,
    overclock: RowHandle<OverclockSettingRow>,
    loaded: Option<LoadedRows>,
    infinite_buffs: HashMap<String, ActiveEffectHandle>,
}

impl StatsComponent {
    pub fn new(
        base_stat: RowHandle<BaseStatRow>,
        action_cost: RowHandle<ActionCostRow>,
        overclock: RowHandle<OverclockSettingRow>,
    ) -> Self {
        Self {
            base_stat,
            action_cost,
            overclock,
            loaded: None,
            infinite_buffs: HashMap::new(),
        }
    }

    /// Builds the component from shared tables and an archetype's row names.
    pub fn from_tables(
        base_stats: &Arc<DataTable<BaseStatRow>>,
        action_costs: &Arc<DataTable<ActionCostRow>>,
        overclock: &Arc<DataTable<OverclockSettingRow>>,
        rows: &ArchetypeRows,
    ) -> Self {
        Self::new(
            RowHandle::new(Some(Arc::clone(base_stats)), rows.base_stat.as_str()),
            RowHandle::new(Some(Arc::clone(action_costs)), rows.action_cost.as_str()),
            RowHandle::new(Some(Arc::clone(overclock)), rows.overclock.as_str()),
        )
    }

    pub fn is_initialized(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn overclock_settings(&self) -> Option<&OverclockSettingRow> {
        self.loaded.as_ref().map(|rows| &rows.overclock)
    }

    pub fn action_costs(&self) -> Option<&ActionCostRow> {
        self.loaded.as_ref().map(|rows| &rows.action_cost)
    }

    /// Loads the rows and applies the base stats.
    ///
    /// A second call is rejected without touching any state. When a row is
    /// missing nothing is applied and the component stays uninitialized.
    pub fn initialize(&mut self, ctx: &mut CombatContext<'_>) -> Result<(), StatsError> {
        if self.loaded.is_some() {
            tracing::warn!(
                target: "combat::stats",
                owner = %ctx.owner(),
                "stats component already initialized; ignoring"
            );
            return Err(StatsError::AlreadyInitialized);
        }

        let rows = self.load_rows().inspect_err(|err| {
            tracing::error!(
                target: "combat::stats",
                owner = %ctx.owner(),
                code = err.error_code(),
                error = %err,
                "failed to load stat rows"
            );
        })?;
        let (base, loaded) = rows;

        let spec = EffectSpec::instant()
            .set_by_caller(stats::MAX_HEALTH, base.max_health)
            .set_by_caller(stats::HEALTH, base.max_health)
            .set_by_caller(stats::MAX_STAMINA, base.max_stamina)
            .set_by_caller(stats::STAMINA, base.max_stamina)
            .set_by_caller(stats::STAMINA_REGEN_RATE, base.stamina_regen_rate)
            .set_by_caller(stats::MOVEMENT_SPEED, base.movement_speed)
            .set_by_caller(stats::MAX_CHRONOS, base.max_chronos)
            .set_by_caller(stats::CHRONOS, base.max_chronos)
            .set_by_caller(stats::MAX_OVERCLOCK_POINT, loaded.overclock.max_overclock_point);
        ctx.apply_to_self(&spec);

        tracing::debug!(
            target: "combat::stats",
            owner = %ctx.owner(),
            max_health = base.max_health,
            max_stamina = base.max_stamina,
            "base stats applied"
        );
        self.loaded = Some(loaded);
        Ok(())
    }

    fn load_rows(&self) -> Result<(BaseStatRow, LoadedRows), DataError> {
        let base = self.base_stat.load()?;
        let action_cost = self.action_cost.load()?;
        let overclock = self.overclock.load()?;
        Ok((
            base,
            LoadedRows {
                action_cost,
                overclock,
            },
        ))
    }

    // ========================================================================
    // Attribute change observer
    // ========================================================================

    /// Re-publishes a committed change. Ignored until initialized.
    pub fn on_attribute_changed(&mut self, ctx: &mut CombatContext<'_>, change: &AttributeChange) {
        let Some(loaded) = self.loaded.as_ref() else {
            return;
        };
        let current = change.new_value;
        let event = match change.attribute {
            Attribute::Health => Event::HealthChanged {
                current,
                max: ctx.asc.attribute(Attribute::MaxHealth),
            },
            Attribute::Stamina => Event::StaminaChanged {
                current,
                max: ctx.asc.attribute(Attribute::MaxStamina),
            },
            Attribute::Chronos => Event::ChronosChanged {
                current,
                max: ctx.asc.attribute(Attribute::MaxChronos),
            },
            Attribute::OverclockPoint => {
                Self::sync_overclock_tags(ctx, &loaded.overclock, current);
                Event::OverclockPointChanged {
                    current,
                    max: loaded.overclock.max_overclock_point,
                }
            }
            _ => return,
        };
        ctx.publish(event);
    }

    fn sync_overclock_tags(
        ctx: &mut CombatContext<'_>,
        settings: &OverclockSettingRow,
        point: f32,
    ) {
        let reached = overclock::reached_levels(point, settings);
        for (level, active) in reached {
            if let Some(tag) = level.tag() {
                ctx.asc.set_tag_active(&tag, active);
            }
        }
        let level = OverclockLevel::held_by(ctx.asc.tags());
        tracing::trace!(target: "combat::stats", owner = %ctx.owner(), point, %level, "overclock tags synced");
        ctx.publish(Event::OverclockLevelChanged { level });
    }

    // ========================================================================
    // Overclock
    // ========================================================================

    /// Adds overclock points. Non-positive amounts are ignored.
    pub fn gain_overclock_point(&mut self, ctx: &mut CombatContext<'_>, amount: f32) -> bool {
        if amount <= 0.0 || !self.is_initialized() {
            return false;
        }
        Self::apply_instant(ctx, stats::OVERCLOCK_POINT, amount)
    }

    /// Adds the configured gain for `source`.
    pub fn gain_overclock_for(&mut self, ctx: &mut CombatContext<'_>, source: OverclockSource) -> bool {
        let Some(settings) = self.overclock_settings() else {
            return false;
        };
        let amount = source.gain(settings);
        self.gain_overclock_point(ctx, amount)
    }

    /// Spends one overclock level.
    ///
    /// Fails unless the level's tag is held. Only that level's threshold is
    /// removed, not the sum of the lower thresholds.
    pub fn consume_overclock_level(
        &mut self,
        ctx: &mut CombatContext<'_>,
        level: OverclockLevel,
    ) -> bool {
        let Some(settings) = self.overclock_settings() else {
            return false;
        };
        let Some(tag) = level.tag() else {
            return false;
        };
        if !ctx.asc.has_matching_tag(&tag) {
            tracing::debug!(target: "combat::stats", owner = %ctx.owner(), %level, "overclock level not held");
            return false;
        }
        let amount = level.threshold(settings);
        Self::apply_instant(ctx, stats::OVERCLOCK_POINT, -amount)
    }

    /// Highest overclock level whose tag `asc` currently holds.
    pub fn current_overclock_level(asc: &AbilitySystem) -> OverclockLevel {
        OverclockLevel::held_by(asc.tags())
    }

    // ========================================================================
    // Stamina
    // ========================================================================

    /// Pays the stamina cost of `action`. Returns false if stamina is short.
    pub fn consume_action_cost(&mut self, ctx: &mut CombatContext<'_>, action: StaminaAction) -> bool {
        let Some(costs) = self.action_costs() else {
            return false;
        };
        let cost = action.cost(costs);
        let stamina = ctx.asc.attribute(Attribute::Stamina);
        if stamina < cost {
            tracing::debug!(target: "combat::stats", owner = %ctx.owner(), %action, cost, stamina, "not enough stamina");
            return false;
        }
        Self::apply_instant(ctx, stats::STAMINA, -cost)
    }

    // ========================================================================
    // Buffs
    // ========================================================================

    /// Applies an infinite modifier under `key`, replacing any buff already
    /// registered under the same key.
    pub fn apply_infinite_buff(
        &mut self,
        ctx: &mut CombatContext<'_>,
        tag: GameplayTag,
        delta: f32,
        key: &str,
    ) -> Option<ActiveEffectHandle> {
        if !self.is_initialized() || !tag.is_valid() || key.is_empty() {
            return None;
        }
        self.remove_infinite_buff(ctx, key);

        let applied = ctx.apply_to_self(&EffectSpec::infinite().set_by_caller(tag, delta));
        let handle = applied.handle?;
        self.infinite_buffs.insert(key.to_owned(), handle);
        Some(handle)
    }

    /// Removes the infinite buff registered under `key`.
    pub fn remove_infinite_buff(&mut self, ctx: &mut CombatContext<'_>, key: &str) -> bool {
        match self.infinite_buffs.remove(key) {
            Some(handle) => ctx.asc.remove_active_effect(handle, &mut *ctx.timers),
            None => false,
        }
    }

    pub fn infinite_buff(&self, key: &str) -> Option<ActiveEffectHandle> {
        self.infinite_buffs.get(key).copied()
    }

    /// Applies a modifier that reverts after `duration` seconds.
    ///
    /// Non-positive durations and invalid tags are ignored.
    pub fn apply_duration_buff(
        &mut self,
        ctx: &mut CombatContext<'_>,
        tag: GameplayTag,
        delta: f32,
        duration: f32,
    ) -> Option<ActiveEffectHandle> {
        if !self.is_initialized() || !tag.is_valid() || duration <= 0.0 {
            return None;
        }
        ctx.apply_to_self(&EffectSpec::with_duration(duration).set_by_caller(tag, delta))
            .handle
    }

    /// Publishes the current value of every watched attribute and the current
    /// overclock level.
    pub fn broadcast_snapshot(&self, ctx: &mut CombatContext<'_>) {
        let Some(settings) = self.overclock_settings() else {
            return;
        };
        let asc = &*ctx.asc;
        let events = [
            Event::HealthChanged {
                current: asc.attribute(Attribute::Health),
                max: asc.attribute(Attribute::MaxHealth),
            },
            Event::StaminaChanged {
                current: asc.attribute(Attribute::Stamina),
                max: asc.attribute(Attribute::MaxStamina),
            },
            Event::ChronosChanged {
                current: asc.attribute(Attribute::Chronos),
                max: asc.attribute(Attribute::MaxChronos),
            },
            Event::OverclockPointChanged {
                current: asc.attribute(Attribute::OverclockPoint),
                max: settings.max_overclock_point,
            },
            Event::OverclockLevelChanged {
                level: OverclockLevel::held_by(asc.tags()),
            },
        ];
        for event in events {
            ctx.publish(event);
        }
    }

    fn apply_instant(ctx: &mut CombatContext<'_>, tag: GameplayTag, delta: f32) -> bool {
        ctx.apply_to_self(&EffectSpec::instant().set_by_caller(tag, delta))
            .applied
    }
}
