//! End-to-end combo scenarios driven through `CombatWorld`.

use glam::Vec3;

use combat_core::tags::native::{state, stats};
use combat_core::{
    Attribute, AttackType, ComboError, Damageable, EffectSpec, EntityId, HasOverclock, Transform,
};
use combat_runtime::{AnimationDriver, CombatWorld, RuntimeError};

fn manual_world() -> CombatWorld {
    CombatWorld::embedded()
        .expect("embedded content loads")
        .with_animation(AnimationDriver::manual())
}

fn spawn_player(world: &mut CombatWorld) -> EntityId {
    world
        .spawn("Player", Transform::IDENTITY)
        .expect("player archetype exists")
}

fn stamina(world: &CombatWorld, id: EntityId) -> f32 {
    world.character(id).expect("character exists").attribute(Attribute::Stamina)
}

fn combo_step(world: &CombatWorld, id: EntityId) -> u8 {
    world
        .character(id)
        .and_then(|c| c.combo())
        .map_or(0, |combo| combo.step())
}

#[test]
fn five_step_light_chain_costs_fifty_stamina() {
    let mut world = manual_world();
    let player = spawn_player(&mut world);
    assert_eq!(player, EntityId::PLAYER);

    for step in 1..=5u8 {
        assert_eq!(world.activate_combo(player).expect("step plays"), step);
        assert_eq!(combo_step(&world, player), step);
        let opened = world.open_combo_window(player).expect("player has combo");
        // The fifth row is a finisher: no window, the combo ends.
        assert_eq!(opened, step < 5);
    }

    assert_eq!(combo_step(&world, player), 0);
    assert_eq!(stamina(&world, player), 50.0);
    let asc = world.character(player).expect("player").ability_system();
    assert!(!asc.has_matching_tag(&state::COMBO_ACTIVE));
    assert!(!asc.has_matching_tag(&state::COMBO_WINDOW_OPEN));
}

#[test]
fn stamina_gate_ends_combo_without_charging() {
    let mut world = manual_world();
    let player = spawn_player(&mut world);
    world
        .apply_effect(player, &EffectSpec::instant().set_by_caller(stats::STAMINA, -85.0))
        .expect("player exists");

    assert_eq!(world.activate_combo(player).expect("first step"), 1);
    assert_eq!(stamina(&world, player), 5.0);
    world.open_combo_window(player).expect("player has combo");

    let err = world.activate_combo(player).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Combo(ComboError::NotEnoughStamina { .. })
    ));
    assert_eq!(stamina(&world, player), 5.0);
    assert_eq!(combo_step(&world, player), 0);
    assert_eq!(world.timers().pending_for(player), 0);
}

#[test]
fn stamina_gate_from_idle_refuses_activation() {
    let mut world = manual_world();
    let player = spawn_player(&mut world);
    world
        .apply_effect(player, &EffectSpec::instant().set_by_caller(stats::STAMINA, -95.0))
        .expect("player exists");

    assert!(world.activate_combo(player).is_err());
    assert_eq!(stamina(&world, player), 5.0);
    assert!(world.animation().current(player).is_none());
}

#[test]
fn window_expiry_then_interrupt_resets_once() {
    let mut world = manual_world();
    let player = spawn_player(&mut world);

    world.activate_combo(player).expect("step plays");
    assert!(world.open_combo_window(player).expect("player has combo"));
    world.advance(1.0);
    assert_eq!(combo_step(&world, player), 0);

    // The montage is still playing; its interruption must be a no-op.
    assert!(world.interrupt_montage(player).expect("player exists"));
    assert_eq!(combo_step(&world, player), 0);
    assert_eq!(stamina(&world, player), 90.0);

    // A fresh combo starts cleanly at step 1.
    assert_eq!(world.activate_combo(player).expect("restart"), 1);
}

#[test]
fn interrupt_then_window_expiry_resets_once() {
    let mut world = manual_world();
    let player = spawn_player(&mut world);

    world.activate_combo(player).expect("step plays");
    assert!(world.open_combo_window(player).expect("player has combo"));
    assert!(world.interrupt_montage(player).expect("player exists"));
    assert_eq!(combo_step(&world, player), 0);
    assert_eq!(world.timers().pending_for(player), 0);

    world.advance(1.0);
    assert_eq!(combo_step(&world, player), 0);
    assert_eq!(stamina(&world, player), 90.0);
}

#[test]
fn montage_completion_ends_combo() {
    let mut world = manual_world();
    let player = spawn_player(&mut world);

    world.activate_combo(player).expect("step plays");
    assert!(world.complete_montage(player).expect("player exists"));
    assert_eq!(combo_step(&world, player), 0);
    assert!(!world.complete_montage(player).expect("player exists"));
}

#[test]
fn superseded_montage_does_not_end_next_step() {
    let mut world = manual_world();
    let player = spawn_player(&mut world);

    world.activate_combo(player).expect("step 1");
    world.open_combo_window(player).expect("player has combo");
    world.activate_combo(player).expect("step 2");

    // Starting step 2 interrupted step 1's montage; the combo survived it.
    assert_eq!(combo_step(&world, player), 2);
    assert_eq!(world.animation().current_montage(player), Some("AM_Light_2"));
}

#[test]
fn heavy_request_switches_chain() {
    let mut world = manual_world();
    let player = spawn_player(&mut world);

    world.activate_combo(player).expect("step 1");
    assert!(!world.request_heavy_attack(player).expect("player has combo"));
    world.open_combo_window(player).expect("player has combo");
    assert!(world.request_heavy_attack(player).expect("player has combo"));
    world.activate_combo(player).expect("step 2");

    let combo = world.character(player).and_then(|c| c.combo()).expect("combo");
    assert_eq!(combo.attack_type(), AttackType::Heavy);
    assert_eq!(combo.step(), 2);
    assert_eq!(stamina(&world, player), 70.0);
}

#[test]
fn busy_step_refuses_input() {
    let mut world = manual_world();
    let player = spawn_player(&mut world);

    world.activate_combo(player).expect("step 1");
    let err = world.activate_combo(player).unwrap_err();
    assert!(matches!(err, RuntimeError::Combo(ComboError::Busy)));
    assert_eq!(combo_step(&world, player), 1);
    assert_eq!(stamina(&world, player), 90.0);
}

#[test]
fn cancel_stops_montage_and_resets() {
    let mut world = manual_world();
    let player = spawn_player(&mut world);

    world.activate_combo(player).expect("step 1");
    assert!(world.cancel_combo(player).expect("player has combo"));
    assert!(world.animation().current(player).is_none());
    assert!(!world.cancel_combo(player).expect("player has combo"));
}

#[test]
fn hitbox_damages_targets_and_grants_overclock() {
    let mut world = manual_world();
    let player = spawn_player(&mut world);
    let enemy = world
        .spawn("MeleeEnemy", Transform::at(Vec3::new(100.0, 0.0, 0.0)))
        .expect("enemy archetype exists");

    world.activate_combo(player).expect("step 1");
    assert_eq!(world.activate_hitbox(player).expect("player has combo"), vec![enemy]);
    assert_eq!(world.character(enemy).expect("enemy").health(), 90.0);

    world.open_combo_window(player).expect("player has combo");
    world.activate_combo(player).expect("step 2");
    world.activate_hitbox(player).expect("player has combo");
    assert_eq!(world.character(enemy).expect("enemy").health(), 79.0);

    let player_char = world.character(player).expect("player");
    assert_eq!(player_char.overclock_point(), 20.0);
}

#[test]
fn hitbox_while_idle_hits_nothing() {
    let mut world = manual_world();
    let player = spawn_player(&mut world);
    let enemy = world
        .spawn("MeleeEnemy", Transform::at(Vec3::new(100.0, 0.0, 0.0)))
        .expect("enemy archetype exists");

    assert!(world.activate_hitbox(player).expect("player has combo").is_empty());
    assert_eq!(world.character(enemy).expect("enemy").health(), 100.0);
}

#[test]
fn timed_animation_drives_the_chain() {
    let mut world = CombatWorld::embedded().expect("embedded content loads");
    let player = spawn_player(&mut world);
    let enemy = world
        .spawn("MeleeEnemy", Transform::at(Vec3::new(100.0, 0.0, 0.0)))
        .expect("enemy archetype exists");

    world.activate_combo(player).expect("step 1");
    world.advance(0.2);
    assert_eq!(world.character(enemy).expect("enemy").health(), 90.0);

    world.advance(0.2);
    let combo = world.character(player).and_then(|c| c.combo()).expect("combo");
    assert!(combo.is_window_open());

    assert_eq!(world.activate_combo(player).expect("step 2"), 2);
    world.advance(2.0);

    // Step 2 landed its hit, then its montage completed and ended the combo.
    assert_eq!(world.character(enemy).expect("enemy").health(), 79.0);
    assert_eq!(combo_step(&world, player), 0);
    assert_eq!(stamina(&world, player), 80.0);
    assert_eq!(world.timers().pending_for(player), 0);
}

#[test]
fn dead_player_cannot_attack() {
    let mut world = manual_world();
    let player = spawn_player(&mut world);
    world
        .apply_effect(player, &EffectSpec::instant().set_by_caller(stats::HEALTH, -100.0))
        .expect("player exists");

    assert!(world.character(player).expect("player").is_dead());
    let err = world.activate_combo(player).unwrap_err();
    assert!(matches!(err, RuntimeError::Combo(ComboError::Dead)));
}

#[test]
fn enemies_have_no_combo() {
    let mut world = manual_world();
    let enemy = world
        .spawn("MeleeEnemy", Transform::IDENTITY)
        .expect("enemy archetype exists");
    assert!(matches!(
        world.activate_combo(enemy),
        Err(RuntimeError::MissingComponent { component: "combo", .. })
    ));
}
