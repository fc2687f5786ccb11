//! Per-character ability system: attributes, loose tags and live effects.
//!
//! [`AbilitySystem`] is the only writer of a character's [`AttributeSet`]. Every
//! committed change is queued as an [`AttributeChange`]; the owning character
//! drains the queue with [`AbilitySystem::take_changes`] and dispatches it to its
//! observers in order.

use std::collections::BTreeSet;

use crate::attributes::{Attribute, AttributeChange, AttributeRegistry, AttributeSet};
use crate::effects::{
    ActiveEffectHandle, ActiveEffects, DurationPolicy, EffectSpec, EvaluatedModifier,
};
use crate::entity::EntityId;
use crate::tags::{GameplayTag, TagContainer};
use crate::timer::{TimerCallback, TimerHandle, TimerKind, TimerService};

/// Result of applying an effect to a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedEffect {
    /// Live handle for infinite and duration effects.
    pub handle: Option<ActiveEffectHandle>,
    /// False when the effect was discarded without executing.
    pub applied: bool,
}

impl AppliedEffect {
    const DISCARDED: Self = Self {
        handle: None,
        applied: false,
    };
}

#[derive(Debug)]
pub struct AbilitySystem {
    owner: EntityId,
    attributes: AttributeSet,
    tags: TagContainer,
    active: ActiveEffects,
    pending: Vec<AttributeChange>,
}

impl AbilitySystem {
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            attributes: AttributeSet::new(),
            tags: TagContainer::new(),
            active: ActiveEffects::new(),
            pending: Vec::new(),
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    #[inline]
    pub fn attribute(&self, attribute: Attribute) -> f32 {
        self.attributes.get(attribute)
    }

    pub fn tags(&self) -> &TagContainer {
        &self.tags
    }

    pub fn active_effects(&self) -> &ActiveEffects {
        &self.active
    }

    pub fn has_matching_tag(&self, tag: &GameplayTag) -> bool {
        self.tags.has_matching(tag)
    }

    pub fn add_loose_tag(&mut self, tag: GameplayTag) -> bool {
        self.tags.add(tag)
    }

    pub fn remove_loose_tag(&mut self, tag: &GameplayTag) -> bool {
        self.tags.remove(tag)
    }

    /// Grants or revokes `tag` so that holding it equals `active`.
    ///
    /// Returns true if the tag set changed.
    pub fn set_tag_active(&mut self, tag: &GameplayTag, active: bool) -> bool {
        match (self.tags.has_exact(tag), active) {
            (false, true) => self.tags.add(tag.clone()),
            (true, false) => self.tags.remove(tag),
            _ => false,
        }
    }

    /// Writes an attribute's base value directly, through the clamp.
    pub fn set_attribute_base(&mut self, attribute: Attribute, value: f32) {
        let changes = self.attributes.set_base(attribute, value);
        self.pending.extend(changes);
    }

    /// Applies `spec` to this character.
    pub fn apply_effect_to_self(
        &mut self,
        spec: &EffectSpec,
        timers: &mut dyn TimerService,
    ) -> AppliedEffect {
        let modifiers = spec.evaluate(AttributeRegistry::global());

        match spec.policy() {
            DurationPolicy::Instant => {
                for modifier in &modifiers {
                    let changes = self
                        .attributes
                        .add_base(modifier.attribute, modifier.magnitude);
                    self.pending.extend(changes);
                }
                AppliedEffect {
                    handle: None,
                    applied: true,
                }
            }
            DurationPolicy::Infinite => {
                let handle = self.activate(DurationPolicy::Infinite, modifiers);
                AppliedEffect {
                    handle: Some(handle),
                    applied: true,
                }
            }
            DurationPolicy::HasDuration { seconds } => {
                if seconds <= 0.0 {
                    tracing::debug!(
                        target: "combat::effects",
                        owner = %self.owner,
                        seconds,
                        "duration effect with non-positive duration discarded"
                    );
                    return AppliedEffect::DISCARDED;
                }
                let handle = self.activate(spec.policy(), modifiers);
                let timer = timers.schedule(
                    TimerCallback::new(self.owner, TimerKind::EffectExpired(handle)),
                    seconds,
                    false,
                );
                self.active.set_expiry(handle, timer);
                AppliedEffect {
                    handle: Some(handle),
                    applied: true,
                }
            }
        }
    }

    /// Removes a live effect and reverses its modifiers.
    ///
    /// Returns false if the handle is not live.
    pub fn remove_active_effect(
        &mut self,
        handle: ActiveEffectHandle,
        timers: &mut dyn TimerService,
    ) -> bool {
        let Some(effect) = self.active.remove(handle) else {
            return false;
        };
        if let Some(expiry) = effect.expiry {
            timers.cancel(expiry);
        }
        self.refresh_bonuses(&effect.modifiers);
        true
    }

    /// Timer callback for duration effects.
    ///
    /// Ignored unless `timer` is the expiry currently registered for `handle`.
    pub fn on_effect_expired(&mut self, handle: ActiveEffectHandle, timer: TimerHandle) -> bool {
        let matches = self
            .active
            .get(handle)
            .is_some_and(|effect| effect.expiry == Some(timer));
        if !matches {
            return false;
        }
        if let Some(effect) = self.active.remove(handle) {
            self.refresh_bonuses(&effect.modifiers);
        }
        true
    }

    /// Drains the queued attribute changes, oldest first.
    pub fn take_changes(&mut self) -> Vec<AttributeChange> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Cancels the expiry timers of every live duration effect.
    pub fn cancel_timers(&mut self, timers: &mut dyn TimerService) -> usize {
        self.active
            .iter()
            .filter_map(|effect| effect.expiry)
            .filter(|&timer| timers.cancel(timer))
            .count()
    }

    fn activate(
        &mut self,
        policy: DurationPolicy,
        modifiers: Vec<EvaluatedModifier>,
    ) -> ActiveEffectHandle {
        let touched = modifiers.clone();
        let handle = self.active.insert(policy, modifiers);
        self.refresh_bonuses(&touched);
        handle
    }

    fn refresh_bonuses(&mut self, modifiers: &[EvaluatedModifier]) {
        let mut seen = BTreeSet::new();
        for modifier in modifiers {
            if seen.insert(modifier.attribute) {
                let bonus = self.active.bonus_for(modifier.attribute);
                let changes = self.attributes.set_bonus(modifier.attribute, bonus);
                self.pending.extend(changes);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::native::stats;
    use crate::timer::TimerManager;

    fn system_with_health(max: f32) -> AbilitySystem {
        let mut asc = AbilitySystem::new(EntityId(7));
        let mut timers = TimerManager::new();
        asc.apply_effect_to_self(
            &EffectSpec::instant()
                .set_by_caller(stats::HEALTH, max)
                .set_by_caller(stats::MAX_HEALTH, max),
            &mut timers,
        );
        asc.take_changes();
        asc
    }

    #[test]
    fn instant_damage_clamps_to_zero() {
        let mut asc = system_with_health(100.0);
        let mut timers = TimerManager::new();

        let applied = asc.apply_effect_to_self(
            &EffectSpec::instant().set_by_caller(stats::HEALTH, -150.0),
            &mut timers,
        );

        assert!(applied.applied);
        assert!(applied.handle.is_none());
        assert_eq!(asc.attribute(Attribute::Health), 0.0);
        let changes = asc.take_changes();
        assert_eq!(changes.len(), 1);
        assert!(changes[0].is_depletion());
    }

    #[test]
    fn nan_damage_leaves_health_untouched() {
        let mut asc = system_with_health(100.0);
        let mut timers = TimerManager::new();

        asc.apply_effect_to_self(
            &EffectSpec::instant().set_by_caller(stats::HEALTH, f32::NAN),
            &mut timers,
        );

        assert_eq!(asc.attribute(Attribute::Health), 100.0);
        assert!(asc.take_changes().is_empty());
    }

    #[test]
    fn bulk_initialization_sets_max_before_current() {
        let asc = system_with_health(250.0);
        assert_eq!(asc.attribute(Attribute::MaxHealth), 250.0);
        assert_eq!(asc.attribute(Attribute::Health), 250.0);
    }

    #[test]
    fn infinite_effect_lives_until_removed() {
        let mut asc = AbilitySystem::new(EntityId(1));
        let mut timers = TimerManager::new();
        asc.set_attribute_base(Attribute::MovementSpeed, 600.0);

        let applied = asc.apply_effect_to_self(
            &EffectSpec::infinite().set_by_caller(stats::MOVEMENT_SPEED, 100.0),
            &mut timers,
        );
        let handle = applied.handle.expect("infinite effects return a handle");
        assert_eq!(asc.attribute(Attribute::MovementSpeed), 700.0);

        timers.advance(1000.0);
        assert!(timers.pop_due().is_none());
        assert!(asc.remove_active_effect(handle, &mut timers));
        assert!(!asc.remove_active_effect(handle, &mut timers));
        assert_eq!(asc.attribute(Attribute::MovementSpeed), 600.0);
    }

    #[test]
    fn duration_effect_reverts_when_timer_fires() {
        let mut asc = AbilitySystem::new(EntityId(1));
        let mut timers = TimerManager::new();
        asc.set_attribute_base(Attribute::MovementSpeed, 600.0);

        let handle = asc
            .apply_effect_to_self(
                &EffectSpec::with_duration(2.0).set_by_caller(stats::MOVEMENT_SPEED, -200.0),
                &mut timers,
            )
            .handle
            .expect("duration effects return a handle");
        assert_eq!(asc.attribute(Attribute::MovementSpeed), 400.0);

        timers.advance(2.0);
        let fired = timers.pop_due().expect("expiry is due");
        assert_eq!(
            fired.callback.kind,
            TimerKind::EffectExpired(handle)
        );
        assert!(asc.on_effect_expired(handle, fired.handle));
        assert!(!asc.on_effect_expired(handle, fired.handle));
        assert_eq!(asc.attribute(Attribute::MovementSpeed), 600.0);
    }

    #[test]
    fn non_positive_duration_is_discarded() {
        let mut asc = AbilitySystem::new(EntityId(1));
        let mut timers = TimerManager::new();
        let applied = asc.apply_effect_to_self(
            &EffectSpec::with_duration(0.0).set_by_caller(stats::MOVEMENT_SPEED, 50.0),
            &mut timers,
        );
        assert!(!applied.applied);
        assert_eq!(timers.pending_count(), 0);
        assert!(asc.active_effects().is_empty());
    }

    #[test]
    fn expiring_max_buff_reclamps_current() {
        let mut asc = system_with_health(100.0);
        let mut timers = TimerManager::new();
        asc.apply_effect_to_self(
            &EffectSpec::with_duration(1.0).set_by_caller(stats::MAX_HEALTH, 50.0),
            &mut timers,
        );
        asc.apply_effect_to_self(
            &EffectSpec::instant().set_by_caller(stats::HEALTH, 50.0),
            &mut timers,
        );
        assert_eq!(asc.attribute(Attribute::Health), 150.0);

        timers.advance(1.0);
        let fired = timers.pop_due().expect("expiry is due");
        let TimerKind::EffectExpired(handle) = fired.callback.kind else {
            panic!("unexpected timer kind");
        };
        asc.on_effect_expired(handle, fired.handle);
        assert_eq!(asc.attribute(Attribute::MaxHealth), 100.0);
        assert_eq!(asc.attribute(Attribute::Health), 100.0);
    }

    #[test]
    fn set_tag_active_reports_transitions_only() {
        let mut asc = AbilitySystem::new(EntityId(1));
        let tag = GameplayTag::from_static("State.Invincible");
        assert!(asc.set_tag_active(&tag, true));
        assert!(!asc.set_tag_active(&tag, true));
        assert!(asc.has_matching_tag(&tag));
        assert!(asc.set_tag_active(&tag, false));
        assert!(!asc.set_tag_active(&tag, false));
    }

    #[test]
    fn cancel_timers_stops_pending_expiries() {
        let mut asc = AbilitySystem::new(EntityId(1));
        let mut timers = TimerManager::new();
        asc.apply_effect_to_self(
            &EffectSpec::with_duration(3.0).set_by_caller(stats::STAMINA_REGEN_RATE, 5.0),
            &mut timers,
        );
        assert_eq!(asc.cancel_timers(&mut timers), 1);
        assert_eq!(timers.pending_count(), 0);
    }
}
