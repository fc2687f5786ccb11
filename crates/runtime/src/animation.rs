//! Montage playback driver.
//!
//! Tracks at most one montage per character. Starting a montage interrupts the
//! one already playing. Notifies and end events are queued and drained by the
//! world after each operation, never delivered re-entrantly.
//!
//! In [`NotifyMode::Timed`] the driver advances playback on [`AnimationDriver::tick`]
//! and raises the hitbox notify at the hitbox start, the combo window notify at
//! the hitbox end and completion at the montage length. In [`NotifyMode::Manual`]
//! playback never advances on its own; the caller drives notifies explicitly.
use std::collections::{BTreeMap, HashMap, VecDeque};

use combat_core::{EntityId, HitboxTiming, MontageEnd, MontageInstance, MontagePlayer, MontageRequest};

/// Seconds a montage plays when its length is not registered.
pub const DEFAULT_MONTAGE_LENGTH: f32 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NotifyMode {
    #[default]
    Timed,
    Manual,
}

/// Something a montage raised during playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimNotify {
    HitboxStart { owner: EntityId, instance: MontageInstance },
    ComboWindow { owner: EntityId, instance: MontageInstance },
    Ended {
        owner: EntityId,
        instance: MontageInstance,
        how: MontageEnd,
    },
}

#[derive(Clone, Debug)]
struct Playback {
    instance: MontageInstance,
    montage: String,
    elapsed: f32,
    length: f32,
    hitbox: HitboxTiming,
    hitbox_raised: bool,
    window_raised: bool,
}

#[derive(Debug, Default)]
pub struct AnimationDriver {
    mode: NotifyMode,
    lengths: HashMap<String, f32>,
    playing: BTreeMap<EntityId, Playback>,
    queued: VecDeque<AnimNotify>,
    next_instance: u64,
}

impl AnimationDriver {
    pub fn new(mode: NotifyMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn manual() -> Self {
        Self::new(NotifyMode::Manual)
    }

    /// Registers the play length of a montage (builder pattern).
    pub fn with_length(mut self, montage: impl Into<String>, seconds: f32) -> Self {
        self.lengths.insert(montage.into(), seconds);
        self
    }

    pub fn mode(&self) -> NotifyMode {
        self.mode
    }

    /// Instance currently playing on `owner`.
    pub fn current(&self, owner: EntityId) -> Option<MontageInstance> {
        self.playing.get(&owner).map(|p| p.instance)
    }

    pub fn current_montage(&self, owner: EntityId) -> Option<&str> {
        self.playing.get(&owner).map(|p| p.montage.as_str())
    }

    /// Advances every playback by `dt` seconds (timed mode only).
    pub fn tick(&mut self, dt: f32) {
        if self.mode == NotifyMode::Manual || dt <= 0.0 {
            return;
        }
        let mut finished = Vec::new();
        for (&owner, playback) in self.playing.iter_mut() {
            playback.elapsed += dt;
            let instance = playback.instance;
            if !playback.hitbox_raised && playback.elapsed >= playback.hitbox.start {
                playback.hitbox_raised = true;
                self.queued.push_back(AnimNotify::HitboxStart { owner, instance });
            }
            if !playback.window_raised && playback.elapsed >= playback.hitbox.end {
                playback.window_raised = true;
                self.queued.push_back(AnimNotify::ComboWindow { owner, instance });
            }
            if playback.elapsed >= playback.length {
                finished.push(owner);
            }
        }
        for owner in finished {
            self.finish(owner, MontageEnd::Completed);
        }
    }

    /// Ends whatever `owner` is playing. Returns the instance that ended.
    pub fn finish(&mut self, owner: EntityId, how: MontageEnd) -> Option<MontageInstance> {
        let playback = self.playing.remove(&owner)?;
        tracing::trace!(
            target: "runtime::animation",
            %owner,
            montage = %playback.montage,
            %how,
            "montage ended"
        );
        self.queued.push_back(AnimNotify::Ended {
            owner,
            instance: playback.instance,
            how,
        });
        Some(playback.instance)
    }

    /// Drops the playback of a removed character without raising events.
    pub fn forget(&mut self, owner: EntityId) {
        self.playing.remove(&owner);
        self.queued.retain(|notify| notify_owner(notify) != owner);
    }

    /// Next queued notify, oldest first.
    pub fn pop_notify(&mut self) -> Option<AnimNotify> {
        self.queued.pop_front()
    }
}

fn notify_owner(notify: &AnimNotify) -> EntityId {
    match *notify {
        AnimNotify::HitboxStart { owner, .. }
        | AnimNotify::ComboWindow { owner, .. }
        | AnimNotify::Ended { owner, .. } => owner,
    }
}

impl MontagePlayer for AnimationDriver {
    fn play_montage(&mut self, owner: EntityId, request: MontageRequest<'_>) -> Option<MontageInstance> {
        if request.montage.is_empty() || request.rate <= 0.0 {
            return None;
        }
        self.finish(owner, MontageEnd::Interrupted);

        self.next_instance += 1;
        let instance = MontageInstance(self.next_instance);
        let length = self
            .lengths
            .get(request.montage)
            .copied()
            .unwrap_or(DEFAULT_MONTAGE_LENGTH)
            / request.rate;
        self.playing.insert(
            owner,
            Playback {
                instance,
                montage: request.montage.to_owned(),
                elapsed: 0.0,
                length,
                hitbox: request.hitbox,
                hitbox_raised: false,
                window_raised: false,
            },
        );
        tracing::trace!(target: "runtime::animation", %owner, montage = request.montage, length, "montage started");
        Some(instance)
    }

    fn stop_montage(&mut self, owner: EntityId, instance: MontageInstance) -> bool {
        if self.current(owner) != Some(instance) {
            return false;
        }
        self.finish(owner, MontageEnd::Cancelled).is_some()
    }
}
