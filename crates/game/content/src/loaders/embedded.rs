//! Default data files compiled into the crate.

pub(crate) const CONFIG: &str = include_str!("../../data/config.toml");
pub(crate) const ARCHETYPES: &str = include_str!("../../data/archetypes.ron");

pub(crate) const BASE_STATS: &str = include_str!("../../data/base_stats.ron");
pub(crate) const ACTION_COSTS: &str = include_str!("../../data/action_costs.ron");
pub(crate) const OVERCLOCK: &str = include_str!("../../data/overclock.ron");
pub(crate) const COMBO_ATTACKS: &str = include_str!("../../data/combo_attacks.ron");
pub(crate) const ENEMY_STATS: &str = include_str!("../../data/enemy_stats.ron");
pub(crate) const ENEMY_RANGED_STATS: &str = include_str!("../../data/enemy_ranged_stats.ron");
pub(crate) const BOSS_PHASES: &str = include_str!("../../data/boss_phases.ron");

/// Looks up an embedded file by its data-directory file name.
pub(crate) fn file(name: &str) -> Option<&'static str> {
    let text = match name {
        "config.toml" => CONFIG,
        "archetypes.ron" => ARCHETYPES,
        "base_stats.ron" => BASE_STATS,
        "action_costs.ron" => ACTION_COSTS,
        "overclock.ron" => OVERCLOCK,
        "combo_attacks.ron" => COMBO_ATTACKS,
        "enemy_stats.ron" => ENEMY_STATS,
        "enemy_ranged_stats.ron" => ENEMY_RANGED_STATS,
        "boss_phases.ron" => BOSS_PHASES,
        _ => return None,
    };
    Some(text)
}
