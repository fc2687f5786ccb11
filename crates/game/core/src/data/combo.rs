//! Combo attack rows.
//!
//! Rows are keyed by convention: `LightAttack_<step>` and `HeavyAttack_<step>`.

use super::DataTable;

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackType {
    #[default]
    Light,
    Heavy,
}

impl AttackType {
    pub const fn row_prefix(self) -> &'static str {
        match self {
            Self::Light => "LightAttack",
            Self::Heavy => "HeavyAttack",
        }
    }
}

/// Animation-relative window, in seconds, during which the hitbox is live.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitboxTiming {
    pub start: f32,
    pub end: f32,
}

/// One step of the combo tree.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ComboAttackRow {
    pub step: u8,
    pub attack_type: AttackType,
    pub stamina_cost: f32,
    /// Seconds the follow-up input window stays open. Zero marks a finisher.
    pub combo_window_time: f32,
    pub damage_multiplier: f32,
    /// Overclock points granted to the attacker per target hit.
    pub overclock_gain: f32,
    /// Montage played for this step. `None` is a configuration error.
    pub montage: Option<String>,
    pub hitbox: HitboxTiming,
}

impl Default for ComboAttackRow {
    fn default() -> Self {
        Self {
            step: 1,
            attack_type: AttackType::Light,
            stamina_cost: 10.0,
            combo_window_time: 0.6,
            damage_multiplier: 1.0,
            overclock_gain: 10.0,
            montage: None,
            hitbox: HitboxTiming::default(),
        }
    }
}

impl ComboAttackRow {
    /// Row name for a step and attack type, e.g. `LightAttack_3`.
    pub fn row_name(step: u8, attack_type: AttackType) -> String {
        format!("{}_{}", attack_type.row_prefix(), step)
    }

    pub fn is_finisher(&self) -> bool {
        crate::config::is_nearly_zero(self.combo_window_time)
    }

    /// Built-in five-step light and heavy chains.
    pub fn default_table() -> DataTable<ComboAttackRow> {
        const LIGHT_MULTIPLIERS: [f32; 5] = [1.0, 1.1, 1.2, 1.3, 1.6];
        const HEAVY_MULTIPLIERS: [f32; 5] = [1.8, 1.9, 2.0, 2.2, 2.8];

        let mut table = DataTable::new("combo_attacks");
        for step in 1..=5u8 {
            let idx = usize::from(step - 1);
            let light = ComboAttackRow {
                step,
                attack_type: AttackType::Light,
                stamina_cost: 10.0,
                combo_window_time: if step == 5 { 0.0 } else { 0.6 },
                damage_multiplier: LIGHT_MULTIPLIERS[idx],
                overclock_gain: 10.0,
                montage: Some(format!("AM_Light_{step}")),
                hitbox: HitboxTiming {
                    start: 0.15,
                    end: 0.3,
                },
            };
            let heavy = ComboAttackRow {
                step,
                attack_type: AttackType::Heavy,
                stamina_cost: 20.0,
                combo_window_time: if step == 1 || step == 5 { 0.0 } else { 0.8 },
                damage_multiplier: HEAVY_MULTIPLIERS[idx],
                overclock_gain: 20.0,
                montage: Some(format!("AM_Heavy_{step}")),
                hitbox: HitboxTiming {
                    start: 0.3,
                    end: 0.5,
                },
            };
            table = table
                .with_row(Self::row_name(step, AttackType::Light), light)
                .with_row(Self::row_name(step, AttackType::Heavy), heavy);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_names_follow_convention() {
        assert_eq!(ComboAttackRow::row_name(1, AttackType::Light), "LightAttack_1");
        assert_eq!(ComboAttackRow::row_name(4, AttackType::Heavy), "HeavyAttack_4");
    }

    #[test]
    fn default_table_marks_finishers() {
        let table = ComboAttackRow::default_table();
        assert_eq!(table.len(), 10);
        let light5 = table.find_row("LightAttack_5").expect("row exists");
        assert!(light5.is_finisher());
        let light2 = table.find_row("LightAttack_2").expect("row exists");
        assert!(!light2.is_finisher());
        assert!(table.find_row("HeavyAttack_1").expect("row exists").is_finisher());
    }
}
