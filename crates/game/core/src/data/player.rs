//! Player stat rows.

/// Initial player stats, applied once by the stats component.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BaseStatRow {
    pub max_health: f32,
    pub max_stamina: f32,
    /// Stamina recovered per second.
    pub stamina_regen_rate: f32,
    pub movement_speed: f32,
    pub max_chronos: f32,
    /// Chronos consumed per second while time is slowed.
    pub chronos_drain_rate: f32,
}

impl Default for BaseStatRow {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            max_stamina: 100.0,
            stamina_regen_rate: 10.0,
            movement_speed: 600.0,
            max_chronos: 100.0,
            chronos_drain_rate: 20.0,
        }
    }
}

/// Stamina costs of movement and defensive actions.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActionCostRow {
    pub dash_stamina_cost: f32,
    pub parry_stamina_cost: f32,
}

impl Default for ActionCostRow {
    fn default() -> Self {
        Self {
            dash_stamina_cost: 20.0,
            parry_stamina_cost: 15.0,
        }
    }
}

/// Overclock gauge capacity, level thresholds and gain amounts.
///
/// Thresholds are expected to be non-decreasing; this is a data contract and is
/// not enforced at load time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverclockSettingRow {
    pub max_overclock_point: f32,
    pub lv1_threshold: f32,
    pub lv2_threshold: f32,
    pub lv3_threshold: f32,
    pub gain_combo_hit: f32,
    pub gain_perfect_parry: f32,
    pub gain_perfect_dodge: f32,
    /// Points lost per second outside combat.
    pub overclock_decay_rate: f32,
}

impl Default for OverclockSettingRow {
    fn default() -> Self {
        Self {
            max_overclock_point: 300.0,
            lv1_threshold: 100.0,
            lv2_threshold: 200.0,
            lv3_threshold: 300.0,
            gain_combo_hit: 10.0,
            gain_perfect_parry: 50.0,
            gain_perfect_dodge: 40.0,
            overclock_decay_rate: 5.0,
        }
    }
}
