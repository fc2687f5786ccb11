//! Enemy combat kit: base stats, attack telegraphs, melee, charge and
//! projectile attacks.
//!
//! Every entry point is called by the AI decision layer. Attacks first
//! publish [`Event::AttackWarning`], which opens the perfect-dodge window for
//! the player.

use std::sync::Arc;

use glam::Vec3;

use crate::combo::{HitResolution, hit};
use crate::config::CombatConfig;
use crate::context::CombatContext;
use crate::data::{
    ArchetypeRows, DataError, DataTable, EnemyBaseStatRow, EnemyRangedStatRow, RowHandle,
};
use crate::effects::EffectSpec;
use crate::entity::{EntityId, Transform};
use crate::env::{OverlapQuery, ProjectileLaunch, ProjectileSpawner};
use crate::error::CombatError;
use crate::events::Event;
use crate::tags::native::{state, stats};
use crate::timer::{TimerCallback, TimerHandle, TimerKind};

/// Distance ahead of the enemy where projectiles are spawned.
const MUZZLE_OFFSET: f32 = 60.0;

#[derive(Debug)]
struct RangedKit {
    handle: RowHandle<EnemyRangedStatRow>,
    row: Option<EnemyRangedStatRow>,
    projectile: Option<String>,
}

#[derive(Debug)]
pub struct EnemyCombat {
    stat_handle: RowHandle<EnemyBaseStatRow>,
    stats: Option<EnemyBaseStatRow>,
    ranged: Option<RangedKit>,
    charging: bool,
    charge_timer: Option<TimerHandle>,
}

impl EnemyCombat {
    pub fn new(stat_handle: RowHandle<EnemyBaseStatRow>) -> Self {
        Self {
            stat_handle,
            stats: None,
            ranged: None,
            charging: false,
            charge_timer: None,
        }
    }

    pub fn from_table(table: &Arc<DataTable<EnemyBaseStatRow>>, rows: &ArchetypeRows) -> Self {
        Self::new(RowHandle::new(Some(Arc::clone(table)), rows.enemy_stat.as_str()))
    }

    /// Adds the projectile kit. `projectile` names the projectile kind; `None`
    /// leaves the enemy unable to fire.
    pub fn with_ranged(
        mut self,
        handle: RowHandle<EnemyRangedStatRow>,
        projectile: Option<String>,
    ) -> Self {
        self.ranged = Some(RangedKit {
            handle,
            row: None,
            projectile,
        });
        self
    }

    pub fn stats(&self) -> Option<&EnemyBaseStatRow> {
        self.stats.as_ref()
    }

    pub fn ranged_stats(&self) -> Option<&EnemyRangedStatRow> {
        self.ranged.as_ref().and_then(|kit| kit.row.as_ref())
    }

    pub fn is_charging(&self) -> bool {
        self.charging
    }

    pub fn charge_timer(&self) -> Option<TimerHandle> {
        self.charge_timer
    }

    /// Loads the stat rows and applies the base stats.
    ///
    /// A missing ranged row is reported but does not undo the base stats.
    pub fn initialize(&mut self, ctx: &mut CombatContext<'_>) -> Result<(), DataError> {
        let owner = ctx.owner();
        let row = self
            .stat_handle
            .load()
            .inspect_err(|err| report_missing(owner, err, "enemy stat row unavailable"))?;
        Self::apply_base_stats(ctx, &row);
        self.stats = Some(row);

        if let Some(kit) = self.ranged.as_mut() {
            let ranged = kit
                .handle
                .load()
                .inspect_err(|err| report_missing(owner, err, "ranged stat row unavailable"))?;
            kit.row = Some(ranged);
        }
        Ok(())
    }

    /// Sets MaxHealth, Health and MovementSpeed from `row` in one instant effect.
    pub fn apply_base_stats(ctx: &mut CombatContext<'_>, row: &EnemyBaseStatRow) {
        let spec = EffectSpec::instant()
            .set_by_caller(stats::MAX_HEALTH, row.max_health)
            .set_by_caller(stats::HEALTH, row.max_health)
            .set_by_caller(stats::MOVEMENT_SPEED, row.move_speed);
        ctx.apply_to_self(&spec);
    }

    fn can_act(&self, ctx: &CombatContext<'_>) -> bool {
        self.stats.is_some() && !ctx.asc.has_matching_tag(&state::DEAD)
    }

    /// Publishes the telegraph for the next attack. Returns its duration.
    pub fn broadcast_attack_warning(&self, ctx: &mut CombatContext<'_>) -> Option<f32> {
        let duration = self.stats.as_ref()?.attack_warning_duration;
        ctx.publish(Event::AttackWarning { duration });
        Some(duration)
    }

    /// Starts a melee swing. The hit itself lands on [`EnemyCombat::melee_hit`].
    pub fn perform_melee_attack(&self, ctx: &mut CombatContext<'_>) -> bool {
        if !self.can_act(ctx) {
            return false;
        }
        self.broadcast_attack_warning(ctx).is_some()
    }

    /// Resolves the melee hitbox: a sphere of radius `attack_range` centred
    /// half a range ahead of the enemy.
    pub fn melee_hit(
        &self,
        owner: EntityId,
        transform: &Transform,
        overlap: &dyn OverlapQuery,
    ) -> Option<HitResolution> {
        let row = self.stats.as_ref()?;
        let center = transform.ahead(row.attack_range * 0.5);
        Some(HitResolution {
            targets: hit::sphere_targets(owner, center, row.attack_range, overlap),
            damage: hit::damage_spec(owner, row.attack_damage),
            overclock_gain: 0.0,
        })
    }

    /// Launches a charge toward `target`. Returns the launch velocity, or
    /// `None` while a charge is already running.
    pub fn perform_charge_attack(
        &mut self,
        ctx: &mut CombatContext<'_>,
        transform: &Transform,
        target: Vec3,
        config: &CombatConfig,
    ) -> Option<Vec3> {
        if self.charging || !self.can_act(ctx) {
            return None;
        }
        let move_speed = self.stats.as_ref()?.move_speed;
        self.charging = true;
        self.broadcast_attack_warning(ctx);

        let direction = (target - transform.location)
            .try_normalize()
            .unwrap_or(transform.forward);
        let velocity = direction * move_speed * config.charge_speed_multiplier;

        ctx.asc.add_loose_tag(state::CHARGING);
        if let Some(previous) = self.charge_timer.take() {
            ctx.timers.cancel(previous);
        }
        self.charge_timer = Some(ctx.timers.schedule(
            TimerCallback::new(ctx.owner(), TimerKind::ChargeEnd),
            config.charge_duration,
            false,
        ));
        tracing::debug!(target: "combat::enemy", owner = %ctx.owner(), ?velocity, "charge launched");
        Some(velocity)
    }

    /// Charge timer callback. Stale handles are ignored.
    pub fn on_charge_end(&mut self, ctx: &mut CombatContext<'_>, timer: TimerHandle) -> bool {
        if self.charge_timer != Some(timer) {
            return false;
        }
        self.charge_timer = None;
        self.charging = false;
        ctx.asc.remove_loose_tag(&state::CHARGING);
        true
    }

    /// Fires one projectile from the muzzle toward `target`.
    pub fn fire_projectile(
        &self,
        ctx: &mut CombatContext<'_>,
        transform: &Transform,
        target: Vec3,
        spawner: &mut dyn ProjectileSpawner,
    ) -> bool {
        let Some(kit) = self.ranged.as_ref() else {
            return false;
        };
        let Some(kind) = kit.projectile.as_deref() else {
            tracing::warn!(target: "combat::enemy", owner = %ctx.owner(), "no projectile kind configured");
            return false;
        };
        let (Some(ranged), Some(base)) = (kit.row.as_ref(), self.stats.as_ref()) else {
            return false;
        };
        if !self.can_act(ctx) {
            return false;
        }

        self.broadcast_attack_warning(ctx);
        let origin = transform.ahead(MUZZLE_OFFSET);
        let direction = (target - origin).try_normalize().unwrap_or(transform.forward);
        spawner.spawn_projectile(ProjectileLaunch {
            instigator: ctx.owner(),
            kind: kind.to_owned(),
            origin,
            direction,
            speed: ranged.projectile_speed,
            life_span: ranged.projectile_life_span,
            damage: base.attack_damage,
        });
        true
    }

    /// Stops any running charge.
    pub fn on_death(&mut self, ctx: &mut CombatContext<'_>) {
        if let Some(timer) = self.charge_timer.take() {
            ctx.timers.cancel(timer);
        }
        self.charging = false;
        ctx.asc.remove_loose_tag(&state::CHARGING);
    }
}

fn report_missing(owner: EntityId, err: &DataError, message: &str) {
    tracing::error!(
        target: "combat::enemy",
        %owner,
        code = err.error_code(),
        error = %err,
        "{message}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability_system::AbilitySystem;
    use crate::attributes::Attribute;
    use crate::data::DataTables;
    use crate::env::CollisionChannel;
    use crate::events::{EventBus, Topic};
    use crate::timer::{TimerManager, TimerService};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Rig {
        asc: AbilitySystem,
        events: EventBus,
        timers: TimerManager,
        enemy: EnemyCombat,
    }

    impl Rig {
        fn melee() -> Self {
            let tables = DataTables::with_defaults();
            Self::build(EnemyCombat::from_table(&tables.enemy_stats, &ArchetypeRows::default()))
        }

        fn ranged(projectile: Option<&str>) -> Self {
            let tables = DataTables::with_defaults();
            let rows = ArchetypeRows::default();
            let enemy = EnemyCombat::from_table(&tables.enemy_stats, &rows).with_ranged(
                RowHandle::new(Some(tables.enemy_ranged_stats.clone()), rows.enemy_ranged_stat),
                projectile.map(str::to_owned),
            );
            Self::build(enemy)
        }

        fn build(mut enemy: EnemyCombat) -> Self {
            let mut asc = AbilitySystem::new(EntityId(3));
            let mut events = EventBus::new();
            let mut timers = TimerManager::new();
            enemy
                .initialize(&mut CombatContext::new(&mut asc, &mut events, &mut timers))
                .expect("default rows");
            asc.take_changes();
            Self {
                asc,
                events,
                timers,
                enemy,
            }
        }

        fn ctx(&mut self) -> CombatContext<'_> {
            CombatContext::new(&mut self.asc, &mut self.events, &mut self.timers)
        }
    }

    fn warnings(events: &mut EventBus) -> Rc<RefCell<Vec<f32>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        events.subscribe(Topic::Combat, move |event| {
            if let Event::AttackWarning { duration } = event {
                sink.borrow_mut().push(*duration);
            }
        });
        seen
    }

    #[test]
    fn base_stats_applied_from_row() {
        let rig = Rig::melee();
        assert_eq!(rig.asc.attribute(Attribute::MaxHealth), 100.0);
        assert_eq!(rig.asc.attribute(Attribute::Health), 100.0);
        assert_eq!(rig.asc.attribute(Attribute::MovementSpeed), 400.0);
    }

    #[test]
    fn melee_attack_broadcasts_warning() {
        let mut rig = Rig::melee();
        let seen = warnings(&mut rig.events);
        let enemy = std::mem::replace(&mut rig.enemy, EnemyCombat::new(RowHandle::unassigned("x")));
        assert!(enemy.perform_melee_attack(&mut rig.ctx()));
        assert_eq!(*seen.borrow(), vec![0.5]);
    }

    struct Probe {
        hits: Vec<EntityId>,
        query: RefCell<Option<(Vec3, f32)>>,
    }

    impl OverlapQuery for Probe {
        fn overlap_sphere(&self, center: Vec3, radius: f32, _: CollisionChannel) -> Vec<EntityId> {
            *self.query.borrow_mut() = Some((center, radius));
            self.hits.clone()
        }
    }

    #[test]
    fn melee_hitbox_sits_half_a_range_ahead() {
        let rig = Rig::melee();
        let probe = Probe {
            hits: vec![EntityId(3), EntityId::PLAYER],
            query: RefCell::new(None),
        };
        let transform = Transform::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Y);
        let hit = rig
            .enemy
            .melee_hit(EntityId(3), &transform, &probe)
            .expect("stats loaded");

        assert_eq!(*probe.query.borrow(), Some((Vec3::new(10.0, 100.0, 0.0), 200.0)));
        assert_eq!(hit.targets, vec![EntityId::PLAYER]);
        assert_eq!(hit.damage.magnitude(&stats::HEALTH), Some(-10.0));
    }

    #[test]
    fn charge_is_guarded_until_timer_fires() {
        let mut rig = Rig::melee();
        let config = CombatConfig::default();
        let mut enemy = std::mem::replace(&mut rig.enemy, EnemyCombat::new(RowHandle::unassigned("x")));

        let velocity = enemy
            .perform_charge_attack(&mut rig.ctx(), &Transform::IDENTITY, Vec3::new(0.0, 0.0, 50.0), &config)
            .expect("first charge launches");
        assert_eq!(velocity, Vec3::new(0.0, 0.0, 1000.0));
        assert!(rig.asc.has_matching_tag(&state::CHARGING));
        assert!(enemy
            .perform_charge_attack(&mut rig.ctx(), &Transform::IDENTITY, Vec3::X, &config)
            .is_none());

        rig.timers.advance(config.charge_duration);
        let fired = rig.timers.pop_due().expect("charge end due");
        assert!(enemy.on_charge_end(&mut rig.ctx(), fired.handle));
        assert!(!enemy.is_charging());
        assert!(!rig.asc.has_matching_tag(&state::CHARGING));
    }

    #[test]
    fn death_cancels_charge_timer() {
        let mut rig = Rig::melee();
        let mut enemy = std::mem::replace(&mut rig.enemy, EnemyCombat::new(RowHandle::unassigned("x")));
        enemy.perform_charge_attack(&mut rig.ctx(), &Transform::IDENTITY, Vec3::X, &CombatConfig::default());
        let timer = enemy.charge_timer().expect("charge timer");

        enemy.on_death(&mut rig.ctx());
        assert!(!rig.timers.is_active(timer));
        assert!(!enemy.is_charging());
    }

    #[derive(Default)]
    struct Launcher(Vec<ProjectileLaunch>);

    impl ProjectileSpawner for Launcher {
        fn spawn_projectile(&mut self, launch: ProjectileLaunch) {
            self.0.push(launch);
        }
    }

    #[test]
    fn projectile_without_kind_is_skipped() {
        let mut rig = Rig::ranged(None);
        let seen = warnings(&mut rig.events);
        let enemy = std::mem::replace(&mut rig.enemy, EnemyCombat::new(RowHandle::unassigned("x")));
        let mut launcher = Launcher::default();

        assert!(!enemy.fire_projectile(&mut rig.ctx(), &Transform::IDENTITY, Vec3::X, &mut launcher));
        assert!(launcher.0.is_empty());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn projectile_uses_ranged_row() {
        let mut rig = Rig::ranged(Some("Bolt"));
        let seen = warnings(&mut rig.events);
        let enemy = std::mem::replace(&mut rig.enemy, EnemyCombat::new(RowHandle::unassigned("x")));
        let mut launcher = Launcher::default();

        let target = Vec3::new(1000.0, 0.0, 0.0);
        assert!(enemy.fire_projectile(&mut rig.ctx(), &Transform::IDENTITY, target, &mut launcher));
        assert_eq!(seen.borrow().len(), 1);
        let launch = &launcher.0[0];
        assert_eq!(launch.kind, "Bolt");
        assert_eq!(launch.origin, Vec3::new(MUZZLE_OFFSET, 0.0, 0.0));
        assert!((launch.direction - Vec3::X).length() < 1e-5);
        assert_eq!(launch.speed, 1200.0);
        assert_eq!(launch.life_span, 5.0);
        assert_eq!(launch.damage, 10.0);
    }

    #[test]
    fn missing_stat_row_is_reported() {
        let mut enemy = EnemyCombat::new(RowHandle::unassigned("EnemyBaseStatInit"));
        let mut asc = AbilitySystem::new(EntityId(4));
        let mut events = EventBus::new();
        let mut timers = TimerManager::new();
        let err = enemy
            .initialize(&mut CombatContext::new(&mut asc, &mut events, &mut timers))
            .unwrap_err();
        assert_eq!(err, DataError::TableNotAssigned("EnemyBaseStatRow"));
        assert_eq!(asc.attribute(Attribute::MaxHealth), 0.0);
        assert!(!enemy.perform_melee_attack(&mut CombatContext::new(&mut asc, &mut events, &mut timers)));
    }
}
