//! Native tag table.
//!
//! Every tag the combat layer refers to by name is declared here once, so that
//! data files and code agree on spelling.

use super::GameplayTag;

/// Namespace shared by all attribute-selector tags.
pub const STATS_NAMESPACE: &str = "Data.Stats";

pub mod stats {
    use super::GameplayTag;

    // ========================================================================
    // Survival & Movement
    // ========================================================================
    pub const HEALTH: GameplayTag = GameplayTag::from_static("Data.Stats.Health");
    pub const MAX_HEALTH: GameplayTag = GameplayTag::from_static("Data.Stats.MaxHealth");
    pub const MOVEMENT_SPEED: GameplayTag = GameplayTag::from_static("Data.Stats.MovementSpeed");

    // ========================================================================
    // Action Resource: Stamina
    // ========================================================================
    pub const STAMINA: GameplayTag = GameplayTag::from_static("Data.Stats.Stamina");
    pub const MAX_STAMINA: GameplayTag = GameplayTag::from_static("Data.Stats.MaxStamina");
    pub const STAMINA_REGEN_RATE: GameplayTag =
        GameplayTag::from_static("Data.Stats.StaminaRegenRate");

    // ========================================================================
    // Gimmick Resource: Chronos
    // ========================================================================
    pub const CHRONOS: GameplayTag = GameplayTag::from_static("Data.Stats.Chronos");
    pub const MAX_CHRONOS: GameplayTag = GameplayTag::from_static("Data.Stats.MaxChronos");

    // ========================================================================
    // Reward Resource: Overclock
    // ========================================================================
    pub const OVERCLOCK_POINT: GameplayTag = GameplayTag::from_static("Data.Stats.OverclockPoint");
    pub const MAX_OVERCLOCK_POINT: GameplayTag =
        GameplayTag::from_static("Data.Stats.MaxOverclockPoint");

    /// Declared for designers but not backed by an attribute slot.
    pub const ATTACK_SPEED: GameplayTag = GameplayTag::from_static("Data.Stats.AttackSpeed");
}

pub mod state {
    use super::GameplayTag;

    pub const OVERCLOCK: GameplayTag = GameplayTag::from_static("State.Overclock");
    pub const OVERCLOCK_LV1: GameplayTag = GameplayTag::from_static("State.Overclock.Lv1");
    pub const OVERCLOCK_LV2: GameplayTag = GameplayTag::from_static("State.Overclock.Lv2");
    pub const OVERCLOCK_LV3: GameplayTag = GameplayTag::from_static("State.Overclock.Lv3");

    pub const COMBO_ACTIVE: GameplayTag = GameplayTag::from_static("State.Combo.Active");
    pub const COMBO_WINDOW_OPEN: GameplayTag = GameplayTag::from_static("State.Combo.WindowOpen");

    pub const CHARGING: GameplayTag = GameplayTag::from_static("State.Charging");
    pub const INVINCIBLE: GameplayTag = GameplayTag::from_static("State.Invincible");
    pub const DEAD: GameplayTag = GameplayTag::from_static("State.Dead");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_tags_are_well_formed() {
        for tag in [
            stats::HEALTH,
            stats::MAX_OVERCLOCK_POINT,
            stats::ATTACK_SPEED,
            state::OVERCLOCK_LV3,
            state::COMBO_WINDOW_OPEN,
            state::DEAD,
        ] {
            assert!(tag.is_valid(), "{tag} should be valid");
        }
        assert!(stats::HEALTH.as_str().starts_with(STATS_NAMESPACE));
        assert!(state::OVERCLOCK_LV1.matches(&state::OVERCLOCK));
    }
}
