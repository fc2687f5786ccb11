//! Combat world: the composition root.
//!
//! [`CombatWorld`] owns every character together with the services the combat
//! components consume: the timer manager, the spatial overlap index, the
//! animation driver and the projectile system. All entry points run
//! synchronously on the calling thread. After each operation the world drains
//! queued attribute changes, montage events and deaths before returning, so a
//! caller always observes a settled world.
use std::collections::BTreeMap;

use glam::Vec3;

use combat_content::Content;
use combat_core::combo::hit;
use combat_core::{
    AppliedEffect, ArchetypeDefinition, ArchetypeKind, CombatConfig, CombatContext, CombatError,
    Damageable, DataTables, EffectSpec, EntityId, Event, GameplayTag, HitResolution, MontageEnd,
    MontageInstance, MontagePlayer, OverclockLevel, OverclockSource, StaminaAction,
    StatsComponent, SubscriptionId, TimerManager, TimerService, Topic, Transform,
};

use crate::animation::{AnimNotify, AnimationDriver};
use crate::character::{Character, TimerOutcome};
use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::projectiles::{ProjectileHit, ProjectileSystem};
use crate::spatial::SpatialIndex;

pub struct CombatWorld {
    config: CombatConfig,
    tables: DataTables,
    archetypes: Vec<ArchetypeDefinition>,
    characters: BTreeMap<EntityId, Character>,
    next_id: u32,
    timers: TimerManager,
    spatial: SpatialIndex,
    animation: AnimationDriver,
    projectiles: ProjectileSystem,
}

impl CombatWorld {
    pub fn new(content: Content) -> Self {
        Self {
            config: content.config,
            tables: content.tables,
            archetypes: content.archetypes,
            characters: BTreeMap::new(),
            next_id: EntityId::PLAYER.0 + 1,
            timers: TimerManager::new(),
            spatial: SpatialIndex::new(),
            animation: AnimationDriver::default(),
            projectiles: ProjectileSystem::new(),
        }
    }

    /// Loads content from the configured source and builds an empty world.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        let content = config
            .content_factory()
            .load_all()
            .map_err(RuntimeError::Content)?;
        Ok(Self::new(content))
    }

    /// World over the content compiled into `combat-content`.
    pub fn embedded() -> Result<Self> {
        Self::from_config(&RuntimeConfig::default())
    }

    /// Replaces the animation driver (builder pattern).
    pub fn with_animation(mut self, animation: AnimationDriver) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_combat_config(mut self, config: CombatConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn tables(&self) -> &DataTables {
        &self.tables
    }

    pub fn archetype(&self, name: &str) -> Option<&ArchetypeDefinition> {
        self.archetypes.iter().find(|def| def.name == name)
    }

    pub fn character(&self, id: EntityId) -> Option<&Character> {
        self.characters.get(&id)
    }

    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.characters.contains_key(&id)
    }

    /// Simulation time in seconds.
    pub fn now(&self) -> f64 {
        self.timers.now()
    }

    pub fn timers(&self) -> &TimerManager {
        &self.timers
    }

    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    pub fn animation(&self) -> &AnimationDriver {
        &self.animation
    }

    pub fn projectiles(&self) -> &ProjectileSystem {
        &self.projectiles
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Spawns a character of the named archetype.
    pub fn spawn(&mut self, archetype: &str, transform: Transform) -> Result<EntityId> {
        let def = self
            .archetype(archetype)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownArchetype(archetype.to_owned()))?;
        Ok(self.spawn_definition(&def, transform))
    }

    /// Spawns a character from an explicit definition.
    ///
    /// The first player takes [`EntityId::PLAYER`]. Component configuration
    /// errors are logged and leave that component uninitialized; the
    /// character is spawned regardless.
    pub fn spawn_definition(&mut self, def: &ArchetypeDefinition, transform: Transform) -> EntityId {
        let id = if def.kind == ArchetypeKind::Player && !self.contains(EntityId::PLAYER) {
            EntityId::PLAYER
        } else {
            let id = EntityId(self.next_id);
            self.next_id += 1;
            id
        };

        let mut character = Character::from_archetype(id, def, &self.tables, transform);
        let failures = character.initialize(&mut self.timers);
        if failures > 0 {
            tracing::warn!(
                target: "runtime::world",
                %id,
                archetype = %def.name,
                failures,
                "character spawned with configuration errors"
            );
        }
        self.spatial.insert(id, transform.location, def.collision_radius);
        self.characters.insert(id, character);
        self.settle(id);

        tracing::info!(target: "runtime::world", %id, archetype = %def.name, "character spawned");
        id
    }

    /// Removes a character and cancels every timer it owns.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if self.characters.remove(&id).is_none() {
            return false;
        }
        let cancelled = self.timers.cancel_owned_by(id);
        self.spatial.remove(id);
        self.animation.forget(id);
        tracing::debug!(target: "runtime::world", %id, cancelled, "character destroyed");
        true
    }

    /// Advances the world by `dt` seconds: due timers, animation notifies,
    /// then projectiles.
    pub fn advance(&mut self, dt: f32) {
        self.timers.advance(dt);
        self.run_due_timers();

        self.animation.tick(dt);
        self.flush_animation();

        let hits = self.projectiles.tick(dt, &self.spatial);
        for hit in hits {
            self.apply_projectile_hit(hit);
        }
    }

    // ========================================================================
    // Effects and movement
    // ========================================================================

    /// Applies an effect spec to `target` and dispatches the resulting changes.
    pub fn apply_effect(&mut self, target: EntityId, spec: &EffectSpec) -> Result<AppliedEffect> {
        let character = Self::lookup(&mut self.characters, target)?;
        let applied = character.apply_effect(spec, &mut self.timers);
        self.settle(target);
        Ok(applied)
    }

    /// Grants or revokes a loose gameplay tag. Returns true if the tag set changed.
    pub fn set_tag_active(&mut self, id: EntityId, tag: &GameplayTag, active: bool) -> Result<bool> {
        let character = Self::lookup(&mut self.characters, id)?;
        Ok(character.asc.set_tag_active(tag, active))
    }

    pub fn set_transform(&mut self, id: EntityId, transform: Transform) -> Result<()> {
        let character = Self::lookup(&mut self.characters, id)?;
        character.set_transform(transform);
        self.spatial.set_location(id, transform.location);
        Ok(())
    }

    /// Registers an event handler on one character's bus.
    pub fn subscribe<F>(&mut self, id: EntityId, topic: Topic, handler: F) -> Result<SubscriptionId>
    where
        F: FnMut(&Event) + 'static,
    {
        let character = Self::lookup(&mut self.characters, id)?;
        Ok(character.events_mut().subscribe(topic, handler))
    }

    pub fn unsubscribe(&mut self, id: EntityId, subscription: SubscriptionId) -> Result<bool> {
        let character = Self::lookup(&mut self.characters, id)?;
        Ok(character.events_mut().unsubscribe(subscription))
    }

    // ========================================================================
    // Player combo
    // ========================================================================

    /// Combo input. Returns the step now playing.
    pub fn activate_combo(&mut self, id: EntityId) -> Result<u8> {
        let character = Self::lookup(&mut self.characters, id)?;
        let Some(combo) = character.combo.as_mut() else {
            return Err(missing(id, "combo"));
        };
        let mut ctx = CombatContext::new(&mut character.asc, &mut character.events, &mut self.timers);
        let result = combo.activate(&mut ctx, &mut self.animation);
        self.settle(id);
        self.flush_animation();
        Ok(result?)
    }

    /// Queues a heavy follow-up. Returns whether a heavy step is queued.
    pub fn request_heavy_attack(&mut self, id: EntityId) -> Result<bool> {
        let character = Self::lookup(&mut self.characters, id)?;
        let combo = character.combo.as_mut().ok_or_else(|| missing(id, "combo"))?;
        Ok(combo.request_heavy())
    }

    /// Combo window notify for the current step.
    pub fn open_combo_window(&mut self, id: EntityId) -> Result<bool> {
        let character = Self::lookup(&mut self.characters, id)?;
        let Some(combo) = character.combo.as_mut() else {
            return Err(missing(id, "combo"));
        };
        let mut ctx = CombatContext::new(&mut character.asc, &mut character.events, &mut self.timers);
        let opened = combo.open_combo_window(&mut ctx);
        self.settle(id);
        Ok(opened)
    }

    /// Hitbox notify for the current combo step. Returns the characters damaged.
    ///
    /// The attacker gains the step's overclock points once per damaged target.
    pub fn activate_hitbox(&mut self, id: EntityId) -> Result<Vec<EntityId>> {
        let character = Self::lookup(&mut self.characters, id)?;
        let combo = character.combo.as_ref().ok_or_else(|| missing(id, "combo"))?;
        let Some(resolution) =
            combo.resolve_hit(id, character.transform(), &self.spatial, &self.config)
        else {
            return Ok(Vec::new());
        };
        Ok(self.apply_hit(id, resolution))
    }

    /// Completes the montage `id` is playing.
    pub fn complete_montage(&mut self, id: EntityId) -> Result<bool> {
        self.end_montage(id, MontageEnd::Completed)
    }

    /// Interrupts the montage `id` is playing, for example on a hit reaction.
    pub fn interrupt_montage(&mut self, id: EntityId) -> Result<bool> {
        self.end_montage(id, MontageEnd::Interrupted)
    }

    /// Cancels an active combo and stops its montage.
    pub fn cancel_combo(&mut self, id: EntityId) -> Result<bool> {
        let character = Self::lookup(&mut self.characters, id)?;
        let Some(combo) = character.combo.as_mut() else {
            return Err(missing(id, "combo"));
        };
        let montage = combo.current_montage();
        let mut ctx = CombatContext::new(&mut character.asc, &mut character.events, &mut self.timers);
        let cancelled = combo.cancel(&mut ctx);
        if let Some(instance) = montage {
            self.animation.stop_montage(id, instance);
        }
        self.settle(id);
        self.flush_animation();
        Ok(cancelled)
    }

    // ========================================================================
    // Stats
    // ========================================================================

    pub fn gain_overclock_point(&mut self, id: EntityId, amount: f32) -> Result<bool> {
        self.with_stats(id, |stats, ctx| stats.gain_overclock_point(ctx, amount))
    }

    pub fn gain_overclock_for(&mut self, id: EntityId, source: OverclockSource) -> Result<bool> {
        self.with_stats(id, |stats, ctx| stats.gain_overclock_for(ctx, source))
    }

    pub fn consume_overclock_level(&mut self, id: EntityId, level: OverclockLevel) -> Result<bool> {
        self.with_stats(id, |stats, ctx| stats.consume_overclock_level(ctx, level))
    }

    pub fn consume_action_cost(&mut self, id: EntityId, action: StaminaAction) -> Result<bool> {
        self.with_stats(id, |stats, ctx| stats.consume_action_cost(ctx, action))
    }

    /// Re-publishes every watched attribute for late subscribers.
    pub fn broadcast_snapshot(&mut self, id: EntityId) -> Result<()> {
        self.with_stats(id, |stats, ctx| stats.broadcast_snapshot(ctx))
    }

    // ========================================================================
    // Enemy kit
    // ========================================================================

    pub fn perform_melee_attack(&mut self, id: EntityId) -> Result<bool> {
        let character = Self::lookup(&mut self.characters, id)?;
        let Some(enemy) = character.enemy.as_ref() else {
            return Err(missing(id, "enemy"));
        };
        let mut ctx = CombatContext::new(&mut character.asc, &mut character.events, &mut self.timers);
        Ok(enemy.perform_melee_attack(&mut ctx))
    }

    /// Melee hitbox notify. Returns the characters damaged.
    pub fn activate_melee_hitbox(&mut self, id: EntityId) -> Result<Vec<EntityId>> {
        let character = Self::lookup(&mut self.characters, id)?;
        if character.is_dead() {
            return Ok(Vec::new());
        }
        let enemy = character.enemy.as_ref().ok_or_else(|| missing(id, "enemy"))?;
        let Some(resolution) = enemy.melee_hit(id, character.transform(), &self.spatial) else {
            return Ok(Vec::new());
        };
        Ok(self.apply_hit(id, resolution))
    }

    /// Charges toward `target`. Returns the launch velocity.
    pub fn perform_charge_attack(&mut self, id: EntityId, target: Vec3) -> Result<Option<Vec3>> {
        let character = Self::lookup(&mut self.characters, id)?;
        let transform = *character.transform();
        let Some(enemy) = character.enemy.as_mut() else {
            return Err(missing(id, "enemy"));
        };
        let mut ctx = CombatContext::new(&mut character.asc, &mut character.events, &mut self.timers);
        Ok(enemy.perform_charge_attack(&mut ctx, &transform, target, &self.config))
    }

    pub fn fire_projectile(&mut self, id: EntityId, target: Vec3) -> Result<bool> {
        let character = Self::lookup(&mut self.characters, id)?;
        let transform = *character.transform();
        let Some(enemy) = character.enemy.as_ref() else {
            return Err(missing(id, "enemy"));
        };
        let mut ctx = CombatContext::new(&mut character.asc, &mut character.events, &mut self.timers);
        Ok(enemy.fire_projectile(&mut ctx, &transform, target, &mut self.projectiles))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn lookup(
        characters: &mut BTreeMap<EntityId, Character>,
        id: EntityId,
    ) -> Result<&mut Character> {
        characters
            .get_mut(&id)
            .ok_or(RuntimeError::UnknownCharacter(id))
    }

    fn with_stats<T>(
        &mut self,
        id: EntityId,
        op: impl FnOnce(&mut StatsComponent, &mut CombatContext<'_>) -> T,
    ) -> Result<T> {
        let character = Self::lookup(&mut self.characters, id)?;
        let Some(stats) = character.stats.as_mut() else {
            return Err(missing(id, "stats"));
        };
        let mut ctx = CombatContext::new(&mut character.asc, &mut character.events, &mut self.timers);
        let out = op(stats, &mut ctx);
        self.settle(id);
        Ok(out)
    }

    /// Applies a resolved hit. Targets that cannot be damaged are skipped.
    fn apply_hit(&mut self, attacker: EntityId, resolution: HitResolution) -> Vec<EntityId> {
        let mut damaged = Vec::new();
        for target in resolution.targets {
            let Some(character) = self.characters.get_mut(&target) else {
                continue;
            };
            if !character.can_be_damaged() {
                continue;
            }
            character.apply_effect(&resolution.damage, &mut self.timers);
            self.settle(target);
            damaged.push(target);
        }

        let gain = resolution.overclock_gain;
        // Enemy attackers carry no stats component.
        let has_stats = self
            .characters
            .get(&attacker)
            .is_some_and(|c| c.stats().is_some());
        if gain > 0.0 && has_stats {
            for _ in &damaged {
                let result =
                    self.with_stats(attacker, |stats, ctx| stats.gain_overclock_point(ctx, gain));
                warn_on_failure(attacker, "overclock gain", result);
            }
        }
        tracing::debug!(target: "runtime::world", %attacker, hits = damaged.len(), "hit resolved");
        damaged
    }

    fn apply_projectile_hit(&mut self, hit: ProjectileHit) {
        let Some(character) = self.characters.get_mut(&hit.target) else {
            return;
        };
        if !character.can_be_damaged() {
            tracing::trace!(target: "runtime::world", target_id = %hit.target, "projectile blocked");
            return;
        }
        let spec = hit::damage_spec(hit.instigator, hit.damage);
        character.apply_effect(&spec, &mut self.timers);
        self.settle(hit.target);
    }

    fn end_montage(&mut self, id: EntityId, how: MontageEnd) -> Result<bool> {
        if !self.contains(id) {
            return Err(RuntimeError::UnknownCharacter(id));
        }
        let ended = self.animation.finish(id, how).is_some();
        self.flush_animation();
        Ok(ended)
    }

    /// Dispatches pending attribute changes of `id` and finishes a death.
    fn settle(&mut self, id: EntityId) {
        let Some(character) = self.characters.get_mut(&id) else {
            return;
        };
        if character.dispatch_changes(&mut self.timers, &self.config) {
            self.spatial.set_collision(id, false);
            if let Some(instance) = self.animation.current(id) {
                self.animation.stop_montage(id, instance);
            }
            self.flush_animation();
        }
    }

    fn run_due_timers(&mut self) {
        while let Some(fired) = self.timers.pop_due() {
            let owner = fired.callback.owner;
            let Some(character) = self.characters.get_mut(&owner) else {
                tracing::trace!(target: "runtime::world", %owner, "timer for missing character");
                continue;
            };
            match character.on_timer(fired, &mut self.timers) {
                TimerOutcome::Despawn => {
                    self.destroy(owner);
                }
                TimerOutcome::Handled => self.settle(owner),
                TimerOutcome::Ignored => {}
            }
        }
    }

    fn flush_animation(&mut self) {
        while let Some(notify) = self.animation.pop_notify() {
            match notify {
                AnimNotify::HitboxStart { owner, instance } => {
                    if self.is_current_combo_montage(owner, instance) {
                        let result = self.activate_hitbox(owner);
                        warn_on_failure(owner, "hitbox notify", result);
                    }
                }
                AnimNotify::ComboWindow { owner, instance } => {
                    if self.is_current_combo_montage(owner, instance) {
                        let result = self.open_combo_window(owner);
                        warn_on_failure(owner, "combo window notify", result);
                    }
                }
                AnimNotify::Ended {
                    owner,
                    instance,
                    how,
                } => {
                    if let Some(character) = self.characters.get_mut(&owner) {
                        character.on_montage_ended(instance, how, &mut self.timers);
                        self.settle(owner);
                    }
                }
            }
        }
    }

    fn is_current_combo_montage(&self, owner: EntityId, instance: MontageInstance) -> bool {
        self.characters
            .get(&owner)
            .and_then(|c| c.combo())
            .and_then(|combo| combo.current_montage())
            == Some(instance)
    }
}

/// Logs a failed internal dispatch. Used where no caller is waiting for the
/// result, such as animation notifies.
fn warn_on_failure<T>(owner: EntityId, operation: &'static str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(
                target: "runtime::world",
                %owner,
                operation,
                code = err.error_code(),
                error = %err,
                "dispatch failed"
            );
            None
        }
    }
}

fn missing(character: EntityId, component: &'static str) -> RuntimeError {
    RuntimeError::MissingComponent {
        character,
        component,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
        }
    }

    fn capture<T>(op: impl FnOnce() -> T) -> (T, String) {
        let sink = Captured::default();
        let writer = sink.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .with_writer(move || writer.clone())
            .finish();
        let out = tracing::subscriber::with_default(subscriber, op);
        (out, sink.text())
    }

    #[test]
    fn failed_dispatch_is_logged() {
        let owner = EntityId(7);
        let (out, logs) = capture(|| {
            warn_on_failure::<bool>(owner, "hitbox notify", Err(missing(owner, "combo")))
        });

        assert_eq!(out, None);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("hitbox notify"));
        assert!(logs.contains("RUNTIME_MISSING_COMPONENT"));
    }

    #[test]
    fn successful_dispatch_is_silent() {
        let (out, logs) = capture(|| warn_on_failure(EntityId(1), "combo window notify", Ok(true)));
        assert_eq!(out, Some(true));
        assert!(logs.is_empty());
    }

    #[test]
    fn enemy_hit_skips_overclock_gain_quietly() {
        let mut world = CombatWorld::embedded()
            .expect("embedded content loads")
            .with_animation(AnimationDriver::manual());
        let player = world
            .spawn("Player", Transform::IDENTITY)
            .expect("player archetype");
        let enemy = world
            .spawn("MeleeEnemy", Transform::at(Vec3::new(150.0, 0.0, 0.0)))
            .expect("enemy archetype");

        let resolution = HitResolution {
            targets: vec![player],
            damage: hit::damage_spec(enemy, 10.0),
            overclock_gain: 5.0,
        };
        let (damaged, logs) = capture(|| world.apply_hit(enemy, resolution));

        assert_eq!(damaged, vec![player]);
        assert!(!logs.contains("dispatch failed"));
        assert_eq!(world.character(player).expect("player").health(), 90.0);
    }
}
