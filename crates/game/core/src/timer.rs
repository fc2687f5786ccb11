//! Single-threaded timer scheduling.
//!
//! Timers carry a typed [`TimerCallback`] instead of a closure: the owner of the
//! world pops due timers and routes each callback to the character named by
//! `owner`. Components keep the [`TimerHandle`] they scheduled and ignore
//! firings whose handle no longer matches, so a timer that lost a race against
//! another terminal event is a no-op.

use std::fmt;

use crate::effects::ActiveEffectHandle;
use crate::entity::EntityId;

/// Handle to a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer:{}", self.0)
    }
}

/// What a timer does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// A duration effect reached the end of its lifetime.
    EffectExpired(ActiveEffectHandle),
    /// The combo input window closed without a follow-up.
    ComboWindowExpired,
    /// The boss phase transition lock ends.
    PhaseUnlock,
    /// A charging enemy may charge again.
    ChargeEnd,
    /// A dead character is removed from the world.
    Despawn,
}

/// Typed callback routed to the owning character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerCallback {
    pub owner: EntityId,
    pub kind: TimerKind,
}

impl TimerCallback {
    pub const fn new(owner: EntityId, kind: TimerKind) -> Self {
        Self { owner, kind }
    }
}

/// A timer that came due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiredTimer {
    pub handle: TimerHandle,
    pub callback: TimerCallback,
}

/// Timer scheduling service consumed by the combat components.
pub trait TimerService {
    /// Schedules `callback` to fire after `delay` seconds.
    fn schedule(&mut self, callback: TimerCallback, delay: f32, repeating: bool) -> TimerHandle;

    /// Cancels a pending timer. Returns false if it already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Returns true while the timer is pending.
    fn is_active(&self, handle: TimerHandle) -> bool;

    /// Cancels every timer owned by `owner`, returning how many were pending.
    fn cancel_owned_by(&mut self, owner: EntityId) -> usize;
}

#[derive(Clone, Debug)]
struct PendingTimer {
    handle: TimerHandle,
    callback: TimerCallback,
    fire_at: f64,
    interval: Option<f64>,
    /// Scheduling order, used to break ties between timers due at the same time.
    seq: u64,
}

/// Timer manager driven by explicit time advancement.
///
/// Timers fire in order of due time, and in scheduling order when due at the
/// same instant. Time moves only through [`TimerManager::advance`].
#[derive(Debug, Default)]
pub struct TimerManager {
    now: f64,
    next_id: u64,
    next_seq: u64,
    pending: Vec<PendingTimer>,
}

impl TimerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Moves the clock forward. Call [`TimerManager::pop_due`] afterwards to
    /// collect the timers that came due.
    pub fn advance(&mut self, dt: f32) {
        if dt > 0.0 {
            self.now += f64::from(dt);
        }
    }

    /// Removes and returns the next due timer, if any.
    ///
    /// Repeating timers are re-armed before being returned. Popping one timer
    /// at a time lets a callback cancel other timers due in the same step.
    pub fn pop_due(&mut self) -> Option<FiredTimer> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.fire_at <= self.now)
            .min_by(|(_, a), (_, b)| a.fire_at.total_cmp(&b.fire_at).then(a.seq.cmp(&b.seq)))
            .map(|(idx, _)| idx)?;

        let fired = FiredTimer {
            handle: self.pending[idx].handle,
            callback: self.pending[idx].callback,
        };

        match self.pending[idx].interval {
            Some(interval) => {
                let seq = self.bump_seq();
                let timer = &mut self.pending[idx];
                timer.fire_at += interval;
                timer.seq = seq;
            }
            None => {
                self.pending.swap_remove(idx);
            }
        }
        Some(fired)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_for(&self, owner: EntityId) -> usize {
        self.pending
            .iter()
            .filter(|t| t.callback.owner == owner)
            .count()
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

impl TimerService for TimerManager {
    fn schedule(&mut self, callback: TimerCallback, delay: f32, repeating: bool) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let delay = f64::from(delay.max(0.0));
        // A non-positive repeat interval would fire forever within one step.
        let interval = (repeating && delay > 0.0).then_some(delay);
        let seq = self.bump_seq();
        self.pending.push(PendingTimer {
            handle,
            callback,
            fire_at: self.now + delay,
            interval,
            seq,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.pending.iter().position(|t| t.handle == handle) {
            Some(idx) => {
                self.pending.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    fn is_active(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|t| t.handle == handle)
    }

    fn cancel_owned_by(&mut self, owner: EntityId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|t| t.callback.owner != owner);
        before - self.pending.len()
    }
}
