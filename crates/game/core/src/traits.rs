//! Capability traits.
//!
//! Characters are composed from components rather than arranged in a type
//! hierarchy. Code that needs to damage, inspect or steer a character asks for
//! the capability it needs through one of these traits.

use crate::entity::EntityId;
use crate::phase::BossPattern;
use crate::stats::OverclockLevel;

/// Anything with a health pool.
pub trait Damageable {
    fn entity_id(&self) -> EntityId;

    fn health(&self) -> f32;

    fn max_health(&self) -> f32;

    fn is_dead(&self) -> bool;

    /// Whether hits may currently be applied.
    fn can_be_damaged(&self) -> bool {
        !self.is_dead()
    }
}

/// Characters that accumulate the overclock gauge.
pub trait HasOverclock {
    fn overclock_point(&self) -> f32;

    /// Highest level tag currently held.
    fn overclock_level(&self) -> OverclockLevel;
}

/// Characters driven by boss phases.
pub trait HasPhases {
    fn current_phase(&self) -> usize;

    fn is_phase_transitioning(&self) -> bool;

    fn unlocked_patterns(&self) -> &[BossPattern];
}

/// Characters steered by the AI decision layer.
pub trait AIControllable {
    fn is_ai_active(&self) -> bool;

    /// Permanently halts decision making. Called once on death.
    fn stop_ai(&mut self);

    /// Perception radius handed to the decision layer.
    fn sight_radius(&self) -> Option<f32>;
}
