//! Enemy kit, boss phases and death, driven through `CombatWorld`.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use combat_core::tags::native::{state, stats};
use combat_core::{
    AIControllable, BossPattern, Damageable, EffectSpec, EntityId, Event, Topic, Transform,
};
use combat_runtime::{AnimationDriver, CombatWorld, RuntimeError};

fn world() -> CombatWorld {
    CombatWorld::embedded()
        .expect("embedded content loads")
        .with_animation(AnimationDriver::manual())
}

fn damage(world: &mut CombatWorld, id: EntityId, amount: f32) {
    world
        .apply_effect(id, &EffectSpec::instant().set_by_caller(stats::HEALTH, -amount))
        .expect("character exists");
}

fn record(world: &mut CombatWorld, id: EntityId, topic: Topic) -> Rc<RefCell<Vec<Event>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    world
        .subscribe(id, topic, move |event| sink.borrow_mut().push(event.clone()))
        .expect("character exists");
    log
}

fn facing(location: Vec3, toward: Vec3) -> Transform {
    Transform::new(location, toward - location)
}

// ============================================================================
// Boss phases
// ============================================================================

#[test]
fn boss_advances_one_phase_per_threshold() {
    let mut world = world();
    let boss = world.spawn("MidBoss", Transform::IDENTITY).expect("boss archetype");
    let phases = record(&mut world, boss, Topic::Phase);
    assert_eq!(world.character(boss).expect("boss").max_health(), 1000.0);

    damage(&mut world, boss, 300.0);
    let view = world.character(boss).and_then(|c| c.phases()).expect("boss phases");
    assert_eq!(view.current_phase(), 1);
    assert!(view.is_phase_transitioning());
    assert_eq!(view.unlocked_patterns(), &[BossPattern::ChargeAttack]);

    // Locked during the transition.
    damage(&mut world, boss, 320.0);
    assert_eq!(world.character(boss).and_then(|c| c.phases()).map(|p| p.current_phase()), Some(1));

    world.advance(2.5);
    damage(&mut world, boss, 1.0);
    let view = world.character(boss).and_then(|c| c.phases()).expect("boss phases");
    assert_eq!(view.current_phase(), 2);
    assert_eq!(
        view.unlocked_patterns(),
        &[BossPattern::ChargeAttack, BossPattern::AreaBurst]
    );

    assert_eq!(
        *phases.borrow(),
        vec![Event::PhaseChanged { phase: 1 }, Event::PhaseChanged { phase: 2 }]
    );
}

#[test]
fn large_hit_crosses_only_one_threshold() {
    let mut world = world();
    let boss = world.spawn("MidBoss", Transform::IDENTITY).expect("boss archetype");

    damage(&mut world, boss, 700.0);
    let view = world.character(boss).and_then(|c| c.phases()).expect("boss phases");
    assert_eq!(view.current_phase(), 1);
}

#[test]
fn final_boss_uses_its_own_thresholds() {
    let mut world = world();
    let boss = world.spawn("FinalBoss", Transform::IDENTITY).expect("boss archetype");

    damage(&mut world, boss, 250.0);
    world.advance(3.5);
    damage(&mut world, boss, 250.0);

    let view = world.character(boss).and_then(|c| c.phases()).expect("boss phases");
    assert_eq!(view.current_phase(), 2);
    assert!(view.unlocked_patterns().contains(&BossPattern::OverclockSurge));
}

#[test]
fn regular_enemies_have_no_phases() {
    let mut world = world();
    let enemy = world.spawn("MeleeEnemy", Transform::IDENTITY).expect("enemy archetype");
    assert!(world.character(enemy).expect("enemy").phases().is_none());
}

// ============================================================================
// Death
// ============================================================================

#[test]
fn death_happens_once_and_corpse_despawns() {
    let mut world = world();
    let boss = world.spawn("MidBoss", Transform::IDENTITY).expect("boss archetype");
    let deaths = record(&mut world, boss, Topic::Lifecycle);

    damage(&mut world, boss, 5000.0);
    damage(&mut world, boss, 10.0);

    let corpse = world.character(boss).expect("corpse stays until despawn");
    assert!(corpse.is_dead());
    assert!(!corpse.is_ai_active());
    assert!(corpse.ability_system().has_matching_tag(&state::DEAD));
    assert!(!world.spatial().has_collision(boss));
    assert_eq!(*deaths.borrow(), vec![Event::CharacterDeath { character: boss }]);

    // Unlock timer was cancelled; only the despawn remains.
    assert_eq!(world.timers().pending_for(boss), 1);
    world.advance(6.0);
    assert!(!world.contains(boss));
    assert_eq!(world.timers().pending_for(boss), 0);
}

#[test]
fn dead_characters_are_not_hit() {
    let mut world = world();
    let player = world.spawn("Player", Transform::IDENTITY).expect("player archetype");
    let enemy = world
        .spawn("MeleeEnemy", Transform::at(Vec3::new(100.0, 0.0, 0.0)))
        .expect("enemy archetype");
    damage(&mut world, enemy, 100.0);

    world.activate_combo(player).expect("step 1");
    assert!(world.activate_hitbox(player).expect("player has combo").is_empty());
}

#[test]
fn destroy_cancels_owned_timers() {
    let mut world = world();
    let player = world.spawn("Player", Transform::IDENTITY).expect("player archetype");
    world.activate_combo(player).expect("step 1");
    world.open_combo_window(player).expect("player has combo");
    assert_eq!(world.timers().pending_for(player), 1);

    assert!(world.destroy(player));
    assert_eq!(world.timers().pending_for(player), 0);
    assert!(!world.destroy(player));
    assert!(matches!(
        world.activate_combo(player),
        Err(RuntimeError::UnknownCharacter(id)) if id == player
    ));
}

// ============================================================================
// Enemy attacks
// ============================================================================

#[test]
fn melee_attack_warns_then_hits() {
    let mut world = world();
    let player = world.spawn("Player", Transform::IDENTITY).expect("player archetype");
    let enemy = world
        .spawn("MeleeEnemy", facing(Vec3::new(150.0, 0.0, 0.0), Vec3::ZERO))
        .expect("enemy archetype");
    let warnings = record(&mut world, enemy, Topic::Combat);

    assert!(world.perform_melee_attack(enemy).expect("enemy kit"));
    assert_eq!(*warnings.borrow(), vec![Event::AttackWarning { duration: 0.5 }]);

    assert_eq!(world.activate_melee_hitbox(enemy).expect("enemy kit"), vec![player]);
    assert_eq!(world.character(player).expect("player").health(), 90.0);
}

#[test]
fn invincible_target_is_skipped() {
    let mut world = world();
    let player = world.spawn("Player", Transform::IDENTITY).expect("player archetype");
    let enemy = world
        .spawn("MeleeEnemy", facing(Vec3::new(150.0, 0.0, 0.0), Vec3::ZERO))
        .expect("enemy archetype");

    assert!(world.set_tag_active(player, &state::INVINCIBLE, true).expect("player exists"));
    assert!(!world.character(player).expect("player").can_be_damaged());
    assert!(world.activate_melee_hitbox(enemy).expect("enemy kit").is_empty());
    assert_eq!(world.character(player).expect("player").health(), 100.0);

    world.set_tag_active(player, &state::INVINCIBLE, false).expect("player exists");
    assert_eq!(world.activate_melee_hitbox(enemy).expect("enemy kit"), vec![player]);
}

#[test]
fn charge_attack_is_exclusive_until_timer() {
    let mut world = world();
    let enemy = world.spawn("MeleeEnemy", Transform::IDENTITY).expect("enemy archetype");

    let velocity = world
        .perform_charge_attack(enemy, Vec3::new(0.0, 500.0, 0.0))
        .expect("enemy kit")
        .expect("charge launched");
    assert!((velocity - Vec3::new(0.0, 1000.0, 0.0)).length() < 1e-3);
    let asc = world.character(enemy).expect("enemy").ability_system();
    assert!(asc.has_matching_tag(&state::CHARGING));

    assert!(world.perform_charge_attack(enemy, Vec3::X).expect("enemy kit").is_none());

    world.advance(0.6);
    let asc = world.character(enemy).expect("enemy").ability_system();
    assert!(!asc.has_matching_tag(&state::CHARGING));
    assert!(world.perform_charge_attack(enemy, Vec3::X).expect("enemy kit").is_some());
}

#[test]
fn projectile_flies_and_hits_first_pawn() {
    let mut world = world();
    let player = world.spawn("Player", Transform::IDENTITY).expect("player archetype");
    let archer = world
        .spawn("RangedEnemy", facing(Vec3::new(1000.0, 0.0, 0.0), Vec3::ZERO))
        .expect("ranged archetype");

    assert!(world.fire_projectile(archer, Vec3::ZERO).expect("enemy kit"));
    assert_eq!(world.projectiles().len(), 1);

    world.advance(0.5);
    assert_eq!(world.character(player).expect("player").health(), 100.0);

    world.advance(0.5);
    assert_eq!(world.character(player).expect("player").health(), 90.0);
    assert!(world.projectiles().is_empty());
    assert_eq!(world.character(archer).expect("archer").health(), 100.0);
}

#[test]
fn melee_enemy_cannot_fire() {
    let mut world = world();
    let enemy = world.spawn("MeleeEnemy", Transform::IDENTITY).expect("enemy archetype");
    assert!(!world.fire_projectile(enemy, Vec3::X).expect("enemy kit"));
    assert!(world.projectiles().is_empty());
}
