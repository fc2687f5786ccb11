//! Boss phase state machine.
//!
//! Phases are indices `0..=N` where `N` is the number of health thresholds.
//! Each Health change checks exactly one threshold, the one guarding the next
//! phase, so a single hit crossing two thresholds advances one phase. After a
//! transition the controller ignores checks until its unlock timer fires.
mod archetype;

pub use archetype::BossPattern;

use std::sync::Arc;

use arrayvec::ArrayVec;

use crate::attributes::Attribute;
use crate::config::CombatConfig;
use crate::context::CombatContext;
use crate::data::{BossArchetype, BossPhaseRow, DataError, DataTable, RowHandle};
use crate::entity::EntityId;
use crate::error::CombatError;
use crate::events::Event;
use crate::timer::{TimerCallback, TimerHandle, TimerKind, TimerService};
use crate::traits::HasPhases;

#[derive(Debug)]
pub struct PhaseController {
    archetype: BossArchetype,
    row_handle: RowHandle<BossPhaseRow>,
    row: Option<BossPhaseRow>,
    phase: usize,
    transitioning: bool,
    unlock_timer: Option<TimerHandle>,
    patterns: ArrayVec<BossPattern, { CombatConfig::MAX_BOSS_PATTERNS }>,
}

impl PhaseController {
    pub fn new(archetype: BossArchetype, row_handle: RowHandle<BossPhaseRow>) -> Self {
        Self {
            archetype,
            row_handle,
            row: None,
            phase: 0,
            transitioning: false,
            unlock_timer: None,
            patterns: ArrayVec::new(),
        }
    }

    pub fn from_table(
        archetype: BossArchetype,
        table: &Arc<DataTable<BossPhaseRow>>,
        row_name: &str,
    ) -> Self {
        Self::new(archetype, RowHandle::new(Some(Arc::clone(table)), row_name))
    }

    /// Loads and caches the phase row.
    ///
    /// Without a row the controller stays in phase 0 and every check is a no-op.
    pub fn initialize(&mut self, owner: EntityId) -> Result<(), DataError> {
        match self.row_handle.load() {
            Ok(row) => {
                tracing::debug!(
                    target: "combat::phase",
                    %owner,
                    archetype = %self.archetype,
                    thresholds = ?row.phase_health_thresholds,
                    "phase data loaded"
                );
                self.row = Some(row);
                Ok(())
            }
            Err(err) => {
                tracing::error!(
                    target: "combat::phase",
                    %owner,
                    code = err.error_code(),
                    error = %err,
                    "boss phase row unavailable"
                );
                Err(err)
            }
        }
    }

    pub fn archetype(&self) -> BossArchetype {
        self.archetype
    }

    pub fn current_phase(&self) -> usize {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn unlock_timer(&self) -> Option<TimerHandle> {
        self.unlock_timer
    }

    pub fn phase_row(&self) -> Option<&BossPhaseRow> {
        self.row.as_ref()
    }

    /// Patterns unlocked so far, in unlock order.
    pub fn patterns(&self) -> &[BossPattern] {
        &self.patterns
    }

    pub fn has_pattern(&self, pattern: BossPattern) -> bool {
        self.patterns.contains(&pattern)
    }

    /// Health observer. Returns the new phase if a transition happened.
    pub fn check_phase_transition(&mut self, ctx: &mut CombatContext<'_>) -> Option<usize> {
        if self.transitioning {
            return None;
        }
        let row = self.row.as_ref()?;
        if row.phase_health_thresholds.is_empty() {
            return None;
        }
        let max_health = ctx.asc.attribute(Attribute::MaxHealth);
        if max_health <= 0.0 {
            return None;
        }
        let ratio = ctx.asc.attribute(Attribute::Health) / max_health;
        let threshold = *row.phase_health_thresholds.get(self.phase)?;
        if ratio <= threshold {
            Some(self.on_phase_transition(ctx, self.phase + 1))
        } else {
            None
        }
    }

    /// Base transition followed by the archetype's pattern unlocks.
    fn on_phase_transition(&mut self, ctx: &mut CombatContext<'_>, new_phase: usize) -> usize {
        self.transitioning = true;
        self.phase = new_phase;
        ctx.publish(Event::PhaseChanged { phase: new_phase });
        tracing::info!(target: "combat::phase", owner = %ctx.owner(), phase = new_phase, "boss phase changed");

        if let Some(previous) = self.unlock_timer.take() {
            ctx.timers.cancel(previous);
        }
        let duration = self
            .row
            .as_ref()
            .map_or(0.0, |row| row.transition_duration);
        self.unlock_timer = Some(ctx.timers.schedule(
            TimerCallback::new(ctx.owner(), TimerKind::PhaseUnlock),
            duration,
            false,
        ));

        self.unlock_patterns(ctx.owner(), new_phase);
        new_phase
    }

    fn unlock_patterns(&mut self, owner: EntityId, phase: usize) {
        for &pattern in self.archetype.patterns_for_phase(phase) {
            if self.patterns.contains(&pattern) {
                continue;
            }
            if self.patterns.try_push(pattern).is_err() {
                tracing::warn!(target: "combat::phase", %owner, %pattern, "pattern capacity reached");
                continue;
            }
            tracing::info!(
                target: "combat::phase",
                %owner,
                archetype = %self.archetype,
                phase,
                %pattern,
                "boss pattern unlocked"
            );
        }
    }

    /// Unlock timer callback. Clears the lock only; the phase never reverts.
    pub fn on_unlock(&mut self, timer: TimerHandle) -> bool {
        if self.unlock_timer != Some(timer) {
            return false;
        }
        self.unlock_timer = None;
        self.transitioning = false;
        true
    }

    /// Cancels the pending unlock and clears the lock.
    pub fn on_death(&mut self, timers: &mut dyn TimerService) {
        if let Some(timer) = self.unlock_timer.take() {
            timers.cancel(timer);
        }
        self.transitioning = false;
    }
}

impl HasPhases for PhaseController {
    fn current_phase(&self) -> usize {
        self.phase
    }

    fn is_phase_transitioning(&self) -> bool {
        self.transitioning
    }

    fn unlocked_patterns(&self) -> &[BossPattern] {
        &self.patterns
    }
}
