//! Collaborator interfaces consumed by the combat components.
//!
//! The combat core never owns a physics scene or an animation graph. Spatial
//! queries, montage playback and projectile spawning are reached through the
//! traits below; `combat-runtime` provides the concrete implementations.
use glam::Vec3;

use crate::data::HitboxTiming;
use crate::entity::EntityId;

/// Collision channel used by overlap queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollisionChannel {
    /// Characters that can receive damage.
    #[default]
    Pawn,
    /// Static world geometry.
    WorldStatic,
}

/// Synchronous spatial overlap service.
///
/// Results are a snapshot taken at call time. Implementations may return the
/// same entity more than once; callers deduplicate.
pub trait OverlapQuery {
    fn overlap_sphere(&self, center: Vec3, radius: f32, channel: CollisionChannel)
    -> Vec<EntityId>;
}

/// Identifies one playback of a montage.
///
/// Every call to [`MontagePlayer::play_montage`] returns a fresh instance, so an
/// end notification can be matched against the playback that is still current.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MontageInstance(pub u64);

/// How a montage playback finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum MontageEnd {
    /// Played to the end.
    Completed,
    /// Superseded or blended out by another montage.
    Interrupted,
    /// Stopped explicitly.
    Cancelled,
}

/// Montage playback request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MontageRequest<'a> {
    pub montage: &'a str,
    pub rate: f32,
    /// Animation-relative hitbox window, forwarded to the notify track.
    pub hitbox: HitboxTiming,
}

impl<'a> MontageRequest<'a> {
    pub fn new(montage: &'a str) -> Self {
        Self {
            montage,
            rate: 1.0,
            hitbox: HitboxTiming::default(),
        }
    }

    pub fn with_hitbox(mut self, hitbox: HitboxTiming) -> Self {
        self.hitbox = hitbox;
        self
    }
}

/// Animation montage playback service.
pub trait MontagePlayer {
    /// Starts a montage on `owner`, interrupting whatever it was playing.
    ///
    /// Returns `None` when the montage cannot be played.
    fn play_montage(&mut self, owner: EntityId, request: MontageRequest<'_>)
    -> Option<MontageInstance>;

    /// Stops `instance` if it is still playing on `owner`.
    fn stop_montage(&mut self, owner: EntityId, instance: MontageInstance) -> bool;
}

/// Parameters for spawning one enemy projectile.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileLaunch {
    pub instigator: EntityId,
    /// Projectile kind configured on the archetype.
    pub kind: String,
    pub origin: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub life_span: f32,
    /// Health removed from the first damageable pawn the projectile crosses.
    pub damage: f32,
}

/// Projectile spawning service.
pub trait ProjectileSpawner {
    fn spawn_projectile(&mut self, launch: ProjectileLaunch);
}

