//! Live infinite and duration effects.

use std::fmt;

use super::{DurationPolicy, EvaluatedModifier};
use crate::attributes::Attribute;
use crate::timer::TimerHandle;

/// Opaque reference to a live effect instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActiveEffectHandle(u64);

impl ActiveEffectHandle {
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActiveEffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect:{}", self.0)
    }
}

/// One applied non-instant effect.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveEffect {
    pub handle: ActiveEffectHandle,
    pub policy: DurationPolicy,
    pub modifiers: Vec<EvaluatedModifier>,
    /// Expiry timer for duration effects.
    pub expiry: Option<TimerHandle>,
}

impl ActiveEffect {
    pub fn touches(&self, attribute: Attribute) -> bool {
        self.modifiers.iter().any(|m| m.attribute == attribute)
    }
}

/// Container of live effects, in application order.
#[derive(Clone, Debug, Default)]
pub struct ActiveEffects {
    effects: Vec<ActiveEffect>,
    next_handle: u64,
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new live effect and returns its handle.
    pub fn insert(
        &mut self,
        policy: DurationPolicy,
        modifiers: Vec<EvaluatedModifier>,
    ) -> ActiveEffectHandle {
        self.next_handle += 1;
        let handle = ActiveEffectHandle(self.next_handle);
        self.effects.push(ActiveEffect {
            handle,
            policy,
            modifiers,
            expiry: None,
        });
        handle
    }

    pub fn set_expiry(&mut self, handle: ActiveEffectHandle, timer: TimerHandle) {
        if let Some(effect) = self.effects.iter_mut().find(|e| e.handle == handle) {
            effect.expiry = Some(timer);
        }
    }

    pub fn remove(&mut self, handle: ActiveEffectHandle) -> Option<ActiveEffect> {
        let idx = self.effects.iter().position(|e| e.handle == handle)?;
        Some(self.effects.remove(idx))
    }

    pub fn get(&self, handle: ActiveEffectHandle) -> Option<&ActiveEffect> {
        self.effects.iter().find(|e| e.handle == handle)
    }

    pub fn contains(&self, handle: ActiveEffectHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Sum of all live modifier magnitudes for `attribute`.
    pub fn bonus_for(&self, attribute: Attribute) -> f32 {
        self.effects
            .iter()
            .flat_map(|e| e.modifiers.iter())
            .filter(|m| m.attribute == attribute)
            .map(|m| m.magnitude)
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.iter()
    }

    /// Removes every effect, returning them for cleanup.
    pub fn drain(&mut self) -> Vec<ActiveEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
