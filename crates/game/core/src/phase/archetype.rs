//! Per-archetype phase patterns.

use crate::data::BossArchetype;

/// Presentation pattern a boss unlocks on entering a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BossPattern {
    /// Mid boss: dash attack toward the target.
    ChargeAttack,
    /// Mid boss: area explosion.
    AreaBurst,
    /// Final boss: form change presentation.
    FormChange,
    /// Final boss: arena transformation.
    ArenaShift,
    /// Final boss: forced overclock gauge charge.
    OverclockSurge,
    /// Final boss: last-stand area attack.
    DesperationBurst,
}

impl BossArchetype {
    /// Patterns unlocked on entering `phase`.
    pub fn patterns_for_phase(self, phase: usize) -> &'static [BossPattern] {
        use BossPattern::*;
        match (self, phase) {
            (Self::MidBoss, 1) => &[ChargeAttack],
            (Self::MidBoss, 2) => &[AreaBurst],
            (Self::FinalBoss, 1) => &[FormChange],
            (Self::FinalBoss, 2) => &[ArenaShift, OverclockSurge],
            (Self::FinalBoss, 3) => &[DesperationBurst],
            _ => &[],
        }
    }
}
