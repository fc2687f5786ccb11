//! Data-driven effect engine.
//!
//! An effect is a set of `(tag, magnitude)` pairs plus a temporal shape:
//! - [`DurationPolicy::Instant`]: applied once to the base value, nothing retained
//! - [`DurationPolicy::Infinite`]: live until explicitly removed by handle
//! - [`DurationPolicy::HasDuration`]: live until its expiry timer fires
//!
//! All three shapes share one execution primitive, [`EffectSpec::evaluate`]: each
//! tag is resolved through the [`AttributeRegistry`] and the magnitude becomes an
//! additive modifier on the resolved attribute. Unresolved tags and near-zero
//! magnitudes are dropped without error.
mod active;

pub use active::{ActiveEffect, ActiveEffectHandle, ActiveEffects};

use crate::attributes::{Attribute, AttributeRegistry};
use crate::config::is_nearly_zero;
use crate::entity::EntityId;
use crate::tags::GameplayTag;

/// Temporal shape of an effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DurationPolicy {
    Instant,
    Infinite,
    HasDuration { seconds: f32 },
}

impl DurationPolicy {
    pub const fn is_instant(&self) -> bool {
        matches!(self, Self::Instant)
    }
}

/// Outgoing effect description with caller-supplied magnitudes.
///
/// ```
/// use combat_core::effects::EffectSpec;
/// use combat_core::tags::native::stats;
///
/// let damage = EffectSpec::instant().set_by_caller(stats::HEALTH, -25.0);
/// assert_eq!(damage.magnitude(&stats::HEALTH), Some(-25.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EffectSpec {
    policy: DurationPolicy,
    magnitudes: Vec<(GameplayTag, f32)>,
    instigator: Option<EntityId>,
}

impl EffectSpec {
    pub fn new(policy: DurationPolicy) -> Self {
        Self {
            policy,
            magnitudes: Vec::new(),
            instigator: None,
        }
    }

    pub fn instant() -> Self {
        Self::new(DurationPolicy::Instant)
    }

    pub fn infinite() -> Self {
        Self::new(DurationPolicy::Infinite)
    }

    pub fn with_duration(seconds: f32) -> Self {
        Self::new(DurationPolicy::HasDuration { seconds })
    }

    /// Sets the magnitude for `tag`, replacing any earlier value for the same tag.
    pub fn set_by_caller(mut self, tag: GameplayTag, magnitude: f32) -> Self {
        match self.magnitudes.iter_mut().find(|(t, _)| *t == tag) {
            Some(entry) => entry.1 = magnitude,
            None => self.magnitudes.push((tag, magnitude)),
        }
        self
    }

    pub fn with_instigator(mut self, instigator: EntityId) -> Self {
        self.instigator = Some(instigator);
        self
    }

    pub fn policy(&self) -> DurationPolicy {
        self.policy
    }

    pub fn instigator(&self) -> Option<EntityId> {
        self.instigator
    }

    pub fn magnitude(&self, tag: &GameplayTag) -> Option<f32> {
        self.magnitudes
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, m)| *m)
    }

    /// Resolves every `(tag, magnitude)` pair into an attribute modifier.
    ///
    /// Invalid tags, unmapped tags, near-zero and non-finite magnitudes are
    /// skipped. The result is ordered so maxima precede the attributes they bound.
    pub fn evaluate(&self, registry: &AttributeRegistry) -> Vec<EvaluatedModifier> {
        let mut modifiers: Vec<EvaluatedModifier> = self
            .magnitudes
            .iter()
            .filter_map(|(tag, magnitude)| {
                if !tag.is_valid() || is_nearly_zero(*magnitude) {
                    return None;
                }
                if !magnitude.is_finite() {
                    tracing::trace!(
                        target: "combat::effects",
                        tag = %tag,
                        magnitude,
                        "non-finite magnitude, skipped"
                    );
                    return None;
                }
                match registry.lookup(tag) {
                    Some(attribute) => Some(EvaluatedModifier {
                        attribute,
                        magnitude: *magnitude,
                    }),
                    None => {
                        tracing::trace!(
                            target: "combat::effects",
                            tag = %tag,
                            "tag not mapped to an attribute, skipped"
                        );
                        None
                    }
                }
            })
            .collect();
        modifiers.sort_by_key(|m| m.attribute.apply_order());
        modifiers
    }
}

/// A resolved additive modification of one attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvaluatedModifier {
    pub attribute: Attribute,
    pub magnitude: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::native::{state, stats};

    #[test]
    fn set_by_caller_overwrites_same_tag() {
        let spec = EffectSpec::instant()
            .set_by_caller(stats::HEALTH, -10.0)
            .set_by_caller(stats::HEALTH, -30.0);
        assert_eq!(spec.magnitude(&stats::HEALTH), Some(-30.0));
        assert_eq!(spec.evaluate(AttributeRegistry::global()).len(), 1);
    }

    #[test]
    fn evaluate_skips_unmapped_and_near_zero_entries() {
        let spec = EffectSpec::instant()
            .set_by_caller(stats::HEALTH, -10.0)
            .set_by_caller(stats::STAMINA, 0.0)
            .set_by_caller(stats::ATTACK_SPEED, 1.5)
            .set_by_caller(state::DEAD, 1.0);

        let modifiers = spec.evaluate(AttributeRegistry::global());
        assert_eq!(
            modifiers,
            vec![EvaluatedModifier {
                attribute: Attribute::Health,
                magnitude: -10.0
            }]
        );
    }

    #[test]
    fn evaluate_drops_non_finite_magnitudes() {
        let spec = EffectSpec::instant()
            .set_by_caller(stats::HEALTH, f32::NAN)
            .set_by_caller(stats::STAMINA, f32::NEG_INFINITY)
            .set_by_caller(stats::CHRONOS, -5.0);

        assert_eq!(
            spec.evaluate(AttributeRegistry::global()),
            vec![EvaluatedModifier {
                attribute: Attribute::Chronos,
                magnitude: -5.0
            }]
        );
    }

    #[test]
    fn evaluate_orders_maxima_first() {
        let spec = EffectSpec::instant()
            .set_by_caller(stats::HEALTH, 100.0)
            .set_by_caller(stats::STAMINA, 80.0)
            .set_by_caller(stats::MAX_HEALTH, 100.0)
            .set_by_caller(stats::MAX_STAMINA, 80.0);

        let order: Vec<_> = spec
            .evaluate(AttributeRegistry::global())
            .into_iter()
            .map(|m| m.attribute)
            .collect();
        assert_eq!(
            order,
            vec![
                Attribute::MaxHealth,
                Attribute::MaxStamina,
                Attribute::Health,
                Attribute::Stamina
            ]
        );
    }
}
