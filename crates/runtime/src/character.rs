//! A character composed from combat components.
//!
//! Which components a character carries is decided by its archetype: players
//! get stats and the combo ability, enemies the enemy kit, bosses additionally
//! the phase controller. Capability traits are implemented here once, over
//! whichever components are present.
use std::sync::Arc;

use combat_core::{
    AIControllable, AbilitySystem, AppliedEffect, ArchetypeDefinition, ArchetypeKind, Attribute,
    CombatConfig, CombatContext, ComboAttack, ComboEndReason, Damageable, DataTables,
    EffectSpec, EnemyCombat, EntityId, Event, EventBus, FiredTimer, HasOverclock, HasPhases,
    MontageEnd, MontageInstance, OverclockLevel, PhaseController, RowHandle, StatsComponent,
    TimerCallback, TimerKind, TimerService, Transform,
};
use combat_core::tags::native::state;

/// What the world must do after routing a timer to a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerOutcome {
    Handled,
    Ignored,
    Despawn,
}

#[derive(Debug)]
pub struct Character {
    id: EntityId,
    archetype: String,
    kind: ArchetypeKind,
    collision_radius: f32,
    transform: Transform,
    pub(crate) asc: AbilitySystem,
    pub(crate) events: EventBus,
    pub(crate) stats: Option<StatsComponent>,
    pub(crate) combo: Option<ComboAttack>,
    pub(crate) enemy: Option<EnemyCombat>,
    pub(crate) phase: Option<PhaseController>,
    ai_active: bool,
    dead: bool,
}

impl Character {
    /// Builds the component set described by `def`. Nothing is loaded until
    /// [`Character::initialize`].
    pub fn from_archetype(
        id: EntityId,
        def: &ArchetypeDefinition,
        tables: &DataTables,
        transform: Transform,
    ) -> Self {
        let rows = &def.rows;
        let mut character = Self {
            id,
            archetype: def.name.clone(),
            kind: def.kind.clone(),
            collision_radius: def.collision_radius,
            transform,
            asc: AbilitySystem::new(id),
            events: EventBus::new(),
            stats: None,
            combo: None,
            enemy: None,
            phase: None,
            ai_active: def.kind.is_enemy(),
            dead: false,
        };

        match &def.kind {
            ArchetypeKind::Player => {
                character.stats = Some(StatsComponent::from_tables(
                    &tables.base_stats,
                    &tables.action_costs,
                    &tables.overclock,
                    rows,
                ));
                character.combo = Some(ComboAttack::new(Some(Arc::clone(&tables.combo_attacks))));
            }
            ArchetypeKind::MeleeEnemy => {
                character.enemy = Some(EnemyCombat::from_table(&tables.enemy_stats, rows));
            }
            ArchetypeKind::RangedEnemy { projectile } => {
                let ranged = RowHandle::new(
                    Some(Arc::clone(&tables.enemy_ranged_stats)),
                    rows.enemy_ranged_stat.as_str(),
                );
                character.enemy = Some(
                    EnemyCombat::from_table(&tables.enemy_stats, rows)
                        .with_ranged(ranged, projectile.clone()),
                );
            }
            ArchetypeKind::Boss { archetype } => {
                character.enemy = Some(EnemyCombat::from_table(&tables.enemy_stats, rows));
                character.phase = Some(PhaseController::from_table(
                    *archetype,
                    &tables.boss_phases,
                    &rows.boss_phase,
                ));
            }
        }
        character
    }

    /// Loads every component's rows and applies base stats.
    ///
    /// Configuration errors are logged by the failing component, which stays
    /// uninitialized; the rest of the character still initializes. Returns the
    /// number of failed components.
    pub fn initialize(&mut self, timers: &mut dyn TimerService) -> usize {
        let mut failures = 0;
        let mut ctx = CombatContext::new(&mut self.asc, &mut self.events, timers);
        if let Some(stats) = self.stats.as_mut() {
            failures += usize::from(stats.initialize(&mut ctx).is_err());
        }
        if let Some(enemy) = self.enemy.as_mut() {
            failures += usize::from(enemy.initialize(&mut ctx).is_err());
        }
        if let Some(phase) = self.phase.as_mut() {
            failures += usize::from(phase.initialize(self.id).is_err());
        }
        failures
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn archetype(&self) -> &str {
        &self.archetype
    }

    pub fn kind(&self) -> &ArchetypeKind {
        &self.kind
    }

    pub fn collision_radius(&self) -> f32 {
        self.collision_radius
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub(crate) fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn ability_system(&self) -> &AbilitySystem {
        &self.asc
    }

    pub fn attribute(&self, attribute: Attribute) -> f32 {
        self.asc.attribute(attribute)
    }

    pub fn stats(&self) -> Option<&StatsComponent> {
        self.stats.as_ref()
    }

    pub fn combo(&self) -> Option<&ComboAttack> {
        self.combo.as_ref()
    }

    pub fn enemy(&self) -> Option<&EnemyCombat> {
        self.enemy.as_ref()
    }

    /// Phase view, present on bosses only.
    pub fn phases(&self) -> Option<&dyn HasPhases> {
        self.phase.as_ref().map(|phase| phase as &dyn HasPhases)
    }

    pub fn phase_controller(&self) -> Option<&PhaseController> {
        self.phase.as_ref()
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn apply_effect(&mut self, spec: &EffectSpec, timers: &mut dyn TimerService) -> AppliedEffect {
        self.asc.apply_effect_to_self(spec, timers)
    }

    // ========================================================================
    // Change dispatch
    // ========================================================================

    /// Drains queued attribute changes and forwards each, in order, to the
    /// stats component, the phase controller (Health only) and the death
    /// check. Returns true if the character died during this dispatch.
    pub fn dispatch_changes(&mut self, timers: &mut dyn TimerService, config: &CombatConfig) -> bool {
        let mut died = false;
        loop {
            let changes = self.asc.take_changes();
            if changes.is_empty() {
                break;
            }
            for change in &changes {
                let mut ctx = CombatContext::new(&mut self.asc, &mut self.events, &mut *timers);
                if let Some(stats) = self.stats.as_mut() {
                    stats.on_attribute_changed(&mut ctx, change);
                }
                if change.attribute == Attribute::Health
                    && let Some(phase) = self.phase.as_mut()
                {
                    phase.check_phase_transition(&mut ctx);
                }
                if change.is_depletion() {
                    died |= self.die(&mut *timers, config);
                }
            }
        }
        died
    }

    /// Runs the death sequence. Only the first call has any effect.
    pub fn die(&mut self, timers: &mut dyn TimerService, config: &CombatConfig) -> bool {
        if self.dead {
            return false;
        }
        self.dead = true;

        let mut ctx = CombatContext::new(&mut self.asc, &mut self.events, timers);
        ctx.asc.add_loose_tag(state::DEAD);
        if let Some(combo) = self.combo.as_mut() {
            combo.end(&mut ctx, ComboEndReason::Death);
        }
        if let Some(phase) = self.phase.as_mut() {
            phase.on_death(&mut *ctx.timers);
        }
        if let Some(enemy) = self.enemy.as_mut() {
            enemy.on_death(&mut ctx);
        }
        self.ai_active = false;
        ctx.publish(Event::CharacterDeath { character: self.id });

        if self.kind.is_enemy() {
            ctx.timers.schedule(
                TimerCallback::new(self.id, TimerKind::Despawn),
                config.corpse_lifespan,
                false,
            );
        }
        tracing::info!(target: "runtime::character", id = %self.id, archetype = %self.archetype, "character died");
        true
    }

    // ========================================================================
    // Callbacks
    // ========================================================================

    /// Routes a fired timer to the component that scheduled it.
    pub fn on_timer(&mut self, fired: FiredTimer, timers: &mut dyn TimerService) -> TimerOutcome {
        let mut ctx = CombatContext::new(&mut self.asc, &mut self.events, timers);
        let handled = match fired.callback.kind {
            TimerKind::EffectExpired(effect) => ctx.asc.on_effect_expired(effect, fired.handle),
            TimerKind::ComboWindowExpired => self
                .combo
                .as_mut()
                .is_some_and(|combo| combo.on_window_expired(&mut ctx, fired.handle)),
            TimerKind::PhaseUnlock => self
                .phase
                .as_mut()
                .is_some_and(|phase| phase.on_unlock(fired.handle)),
            TimerKind::ChargeEnd => self
                .enemy
                .as_mut()
                .is_some_and(|enemy| enemy.on_charge_end(&mut ctx, fired.handle)),
            TimerKind::Despawn => return TimerOutcome::Despawn,
        };
        if handled {
            TimerOutcome::Handled
        } else {
            TimerOutcome::Ignored
        }
    }

    pub fn on_montage_ended(
        &mut self,
        instance: MontageInstance,
        how: MontageEnd,
        timers: &mut dyn TimerService,
    ) -> bool {
        let Some(combo) = self.combo.as_mut() else {
            return false;
        };
        let mut ctx = CombatContext::new(&mut self.asc, &mut self.events, timers);
        combo.on_montage_ended(&mut ctx, instance, how)
    }
}

impl Damageable for Character {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn health(&self) -> f32 {
        self.asc.attribute(Attribute::Health)
    }

    fn max_health(&self) -> f32 {
        self.asc.attribute(Attribute::MaxHealth)
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn can_be_damaged(&self) -> bool {
        !self.dead && !self.asc.has_matching_tag(&state::INVINCIBLE)
    }
}

impl HasOverclock for Character {
    fn overclock_point(&self) -> f32 {
        self.asc.attribute(Attribute::OverclockPoint)
    }

    fn overclock_level(&self) -> OverclockLevel {
        StatsComponent::current_overclock_level(&self.asc)
    }
}

impl AIControllable for Character {
    fn is_ai_active(&self) -> bool {
        self.ai_active
    }

    fn stop_ai(&mut self) {
        if self.ai_active {
            tracing::debug!(target: "runtime::character", id = %self.id, "AI stopped");
        }
        self.ai_active = false;
    }

    fn sight_radius(&self) -> Option<f32> {
        self.enemy
            .as_ref()
            .and_then(|enemy| enemy.stats())
            .map(|row| row.sight_radius)
    }
}
