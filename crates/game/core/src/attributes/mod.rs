//! Attribute store and clamp policy.
//!
//! Every attribute keeps three numbers:
//! - `base`: written by instant effects
//! - `bonus`: the sum of all live infinite and duration modifiers
//! - `current`: `clamp(base + bonus)`, the value everyone reads
//!
//! All writes go through [`AttributeSet::clamp_value`] (the pre-change hook)
//! before they are committed. Writes are never rejected; out-of-range inputs are
//! silently clamped.
mod registry;

pub use registry::{ATTRIBUTE_TAGS, AttributeRegistry};

use arrayvec::ArrayVec;
use strum::EnumCount;

use crate::tags::GameplayTag;
use crate::tags::native::stats;

/// Named numeric character statistic.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attribute {
    Health,
    MaxHealth,
    MovementSpeed,
    Stamina,
    MaxStamina,
    StaminaRegenRate,
    Chronos,
    MaxChronos,
    OverclockPoint,
    MaxOverclockPoint,
}

/// Clamp rule evaluated on every write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClampRule {
    /// Value is stored as written.
    Unclamped,
    /// Value is kept at or above zero.
    Floor,
    /// Value is kept within `[0, current value of the given maximum]`.
    Bounded(Attribute),
}

impl Attribute {
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Tag that selects this attribute in data-driven effects.
    pub const fn data_tag(self) -> GameplayTag {
        match self {
            Self::Health => stats::HEALTH,
            Self::MaxHealth => stats::MAX_HEALTH,
            Self::MovementSpeed => stats::MOVEMENT_SPEED,
            Self::Stamina => stats::STAMINA,
            Self::MaxStamina => stats::MAX_STAMINA,
            Self::StaminaRegenRate => stats::STAMINA_REGEN_RATE,
            Self::Chronos => stats::CHRONOS,
            Self::MaxChronos => stats::MAX_CHRONOS,
            Self::OverclockPoint => stats::OVERCLOCK_POINT,
            Self::MaxOverclockPoint => stats::MAX_OVERCLOCK_POINT,
        }
    }

    pub const fn clamp_rule(self) -> ClampRule {
        match self {
            Self::Health => ClampRule::Bounded(Self::MaxHealth),
            Self::Stamina => ClampRule::Bounded(Self::MaxStamina),
            Self::Chronos => ClampRule::Bounded(Self::MaxChronos),
            // The overclock ceiling is a design parameter owned by the stats component.
            Self::OverclockPoint => ClampRule::Floor,
            _ => ClampRule::Unclamped,
        }
    }

    /// Attribute whose upper bound is this attribute, if any.
    pub const fn dependent(self) -> Option<Attribute> {
        match self {
            Self::MaxHealth => Some(Self::Health),
            Self::MaxStamina => Some(Self::Stamina),
            Self::MaxChronos => Some(Self::Chronos),
            _ => None,
        }
    }

    /// Ordering key for multi-modifier effects: maxima are written before the
    /// values they bound.
    pub(crate) const fn apply_order(self) -> u8 {
        if self.dependent().is_some() { 0 } else { 1 }
    }
}

/// A committed change to an attribute's current value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeChange {
    pub attribute: Attribute,
    pub old_value: f32,
    pub new_value: f32,
}

impl AttributeChange {
    /// Post-change hook: Health reached exactly zero from a positive value.
    ///
    /// The store performs no death handling; owners use this as the death signal.
    pub fn is_depletion(&self) -> bool {
        self.attribute == Attribute::Health && self.old_value > 0.0 && self.new_value <= 0.0
    }

    pub fn delta(&self) -> f32 {
        self.new_value - self.old_value
    }
}

/// Changes produced by one write: the attribute itself plus, for maxima, the
/// re-clamped dependent.
pub type AttributeChanges = ArrayVec<AttributeChange, 2>;

/// Fixed set of character attributes with clamp-on-write semantics.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeSet {
    base: [f32; Attribute::COUNT],
    bonus: [f32; Attribute::COUNT],
    current: [f32; Attribute::COUNT],
}

impl AttributeSet {
    pub fn new() -> Self {
        Self {
            base: [0.0; Attribute::COUNT],
            bonus: [0.0; Attribute::COUNT],
            current: [0.0; Attribute::COUNT],
        }
    }

    /// Current (post-clamp) value.
    #[inline]
    pub fn get(&self, attribute: Attribute) -> f32 {
        self.current[attribute.index()]
    }

    #[inline]
    pub fn base(&self, attribute: Attribute) -> f32 {
        self.base[attribute.index()]
    }

    #[inline]
    pub fn bonus(&self, attribute: Attribute) -> f32 {
        self.bonus[attribute.index()]
    }

    /// Pre-change hook: clamps `value` according to the attribute's rule.
    pub fn clamp_value(&self, attribute: Attribute, value: f32) -> f32 {
        match attribute.clamp_rule() {
            ClampRule::Unclamped => value,
            ClampRule::Floor => value.max(0.0),
            ClampRule::Bounded(max) => {
                let upper = self.get(max).max(0.0);
                value.max(0.0).min(upper)
            }
        }
    }

    /// Writes the base value, clamping it first.
    pub fn set_base(&mut self, attribute: Attribute, value: f32) -> AttributeChanges {
        self.base[attribute.index()] = self.clamp_value(attribute, value);
        let mut changes = AttributeChanges::new();
        self.refresh(attribute, &mut changes);
        changes
    }

    /// Adds `delta` to the base value.
    pub fn add_base(&mut self, attribute: Attribute, delta: f32) -> AttributeChanges {
        self.set_base(attribute, self.base(attribute) + delta)
    }

    /// Replaces the aggregated modifier bonus for `attribute`.
    pub fn set_bonus(&mut self, attribute: Attribute, bonus: f32) -> AttributeChanges {
        self.bonus[attribute.index()] = bonus;
        let mut changes = AttributeChanges::new();
        self.refresh(attribute, &mut changes);
        changes
    }

    fn refresh(&mut self, attribute: Attribute, changes: &mut AttributeChanges) {
        let idx = attribute.index();
        let old_value = self.current[idx];
        let new_value = self.clamp_value(attribute, self.base[idx] + self.bonus[idx]);
        self.current[idx] = new_value;
        if new_value != old_value {
            changes.push(AttributeChange {
                attribute,
                old_value,
                new_value,
            });
        }

        // A lowered maximum pulls its dependent down in the same write.
        if let Some(dependent) = attribute.dependent() {
            let dep = dependent.index();
            self.base[dep] = self.clamp_value(dependent, self.base[dep]);
            self.refresh(dependent, changes);
        }
    }
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::new()
    }
}
