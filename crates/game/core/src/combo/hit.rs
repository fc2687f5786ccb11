//! Hit resolution shared by the combo ability and the enemy kit.

use std::collections::BTreeSet;

use glam::Vec3;

use crate::effects::EffectSpec;
use crate::entity::EntityId;
use crate::env::{CollisionChannel, OverlapQuery};
use crate::tags::native::stats;

/// Outcome of one hitbox activation.
///
/// The damage spec is applied by the caller to each target it can damage;
/// `overclock_gain` is granted to the attacker once per damaged target.
#[derive(Clone, Debug, PartialEq)]
pub struct HitResolution {
    pub targets: Vec<EntityId>,
    pub damage: EffectSpec,
    pub overclock_gain: f32,
}

/// Pawns overlapping the sphere, without duplicates and without `owner`.
pub fn sphere_targets(
    owner: EntityId,
    center: Vec3,
    radius: f32,
    overlap: &dyn OverlapQuery,
) -> Vec<EntityId> {
    let mut seen = BTreeSet::new();
    overlap
        .overlap_sphere(center, radius, CollisionChannel::Pawn)
        .into_iter()
        .filter(|&target| target != owner && seen.insert(target))
        .collect()
}

/// Instant effect removing `amount` health, attributed to `instigator`.
pub fn damage_spec(instigator: EntityId, amount: f32) -> EffectSpec {
    EffectSpec::instant()
        .set_by_caller(stats::HEALTH, -amount)
        .with_instigator(instigator)
}
