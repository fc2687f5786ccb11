//! Overclock levels.
//!
//! The overclock gauge is a continuous point value; levels are discrete and are
//! tracked as tags on the character. The level reported to gameplay code is
//! always read back from the held tags, never recomputed from the point value.

use crate::data::OverclockSettingRow;
use crate::tags::native::state;
use crate::tags::{GameplayTag, TagContainer};

/// Discrete overclock level.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OverclockLevel {
    #[default]
    None,
    Lv1,
    Lv2,
    Lv3,
}

impl OverclockLevel {
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Lv1 => 1,
            Self::Lv2 => 2,
            Self::Lv3 => 3,
        }
    }

    pub const fn from_u8(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::None),
            1 => Some(Self::Lv1),
            2 => Some(Self::Lv2),
            3 => Some(Self::Lv3),
            _ => None,
        }
    }

    /// State tag marking this level. `None` has no tag.
    pub const fn tag(self) -> Option<GameplayTag> {
        match self {
            Self::None => None,
            Self::Lv1 => Some(state::OVERCLOCK_LV1),
            Self::Lv2 => Some(state::OVERCLOCK_LV2),
            Self::Lv3 => Some(state::OVERCLOCK_LV3),
        }
    }

    /// Points removed when this level is consumed.
    pub fn threshold(self, settings: &OverclockSettingRow) -> f32 {
        match self {
            Self::None => 0.0,
            Self::Lv1 => settings.lv1_threshold,
            Self::Lv2 => settings.lv2_threshold,
            Self::Lv3 => settings.lv3_threshold,
        }
    }

    /// Highest level whose tag is held.
    pub fn held_by(tags: &TagContainer) -> Self {
        [Self::Lv3, Self::Lv2, Self::Lv1]
            .into_iter()
            .find(|level| level.tag().is_some_and(|tag| tags.has_matching(&tag)))
            .unwrap_or(Self::None)
    }
}

/// Combat events that fill the overclock gauge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum OverclockSource {
    ComboHit,
    PerfectParry,
    PerfectDodge,
}

impl OverclockSource {
    pub fn gain(self, settings: &OverclockSettingRow) -> f32 {
        match self {
            Self::ComboHit => settings.gain_combo_hit,
            Self::PerfectParry => settings.gain_perfect_parry,
            Self::PerfectDodge => settings.gain_perfect_dodge,
        }
    }
}

/// Level flags for a point value, lowest level first.
pub(super) fn reached_levels(point: f32, settings: &OverclockSettingRow) -> [(OverclockLevel, bool); 3] {
    [
        (OverclockLevel::Lv1, point >= settings.lv1_threshold),
        (OverclockLevel::Lv2, point >= settings.lv2_threshold),
        (OverclockLevel::Lv3, point >= settings.lv3_threshold),
    ]
}
