//! Borrowed view of one character's combat state.

use crate::ability_system::{AbilitySystem, AppliedEffect};
use crate::effects::EffectSpec;
use crate::entity::EntityId;
use crate::events::{Event, EventBus};
use crate::timer::TimerService;

/// Mutable access to a character's ability system and event bus, plus the
/// world timer service, for the duration of one operation.
pub struct CombatContext<'a> {
    pub asc: &'a mut AbilitySystem,
    pub events: &'a mut EventBus,
    pub timers: &'a mut dyn TimerService,
}

impl<'a> CombatContext<'a> {
    pub fn new(
        asc: &'a mut AbilitySystem,
        events: &'a mut EventBus,
        timers: &'a mut dyn TimerService,
    ) -> Self {
        Self {
            asc,
            events,
            timers,
        }
    }

    pub fn owner(&self) -> EntityId {
        self.asc.owner()
    }

    pub fn apply_to_self(&mut self, spec: &EffectSpec) -> AppliedEffect {
        self.asc.apply_effect_to_self(spec, &mut *self.timers)
    }

    pub fn publish(&mut self, event: Event) {
        self.events.publish(event);
    }
}
