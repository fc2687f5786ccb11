//! Sphere overlap index over character bodies.
//!
//! Bodies are spheres around each character's location. A body with collision
//! disabled (dead characters) is invisible to every query.
use std::collections::BTreeMap;

use glam::Vec3;

use combat_core::{CollisionChannel, EntityId, OverlapQuery};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Body {
    location: Vec3,
    radius: f32,
    collision: bool,
}

#[derive(Debug, Default)]
pub struct SpatialIndex {
    bodies: BTreeMap<EntityId, Body>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: EntityId, location: Vec3, radius: f32) {
        self.bodies.insert(
            id,
            Body {
                location,
                radius: radius.max(0.0),
                collision: true,
            },
        );
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        self.bodies.remove(&id).is_some()
    }

    pub fn set_location(&mut self, id: EntityId, location: Vec3) -> bool {
        match self.bodies.get_mut(&id) {
            Some(body) => {
                body.location = location;
                true
            }
            None => false,
        }
    }

    pub fn set_collision(&mut self, id: EntityId, enabled: bool) -> bool {
        match self.bodies.get_mut(&id) {
            Some(body) => {
                body.collision = enabled;
                true
            }
            None => false,
        }
    }

    pub fn has_collision(&self, id: EntityId) -> bool {
        self.bodies.get(&id).is_some_and(|body| body.collision)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// First body crossed by the segment `start..end`, skipping `ignore`.
    ///
    /// Returns the body whose closest approach lies earliest along the segment.
    pub fn first_hit_along(&self, start: Vec3, end: Vec3, ignore: EntityId) -> Option<EntityId> {
        let segment = end - start;
        let length_sq = segment.length_squared();
        self.colliding()
            .filter(|(id, _)| *id != ignore)
            .filter_map(|(id, body)| {
                let t = if length_sq > 0.0 {
                    ((body.location - start).dot(segment) / length_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let closest = start + segment * t;
                (closest.distance_squared(body.location) <= body.radius * body.radius)
                    .then_some((t, id))
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, id)| id)
    }

    fn colliding(&self) -> impl Iterator<Item = (EntityId, &Body)> {
        self.bodies
            .iter()
            .filter(|(_, body)| body.collision)
            .map(|(&id, body)| (id, body))
    }
}

impl OverlapQuery for SpatialIndex {
    fn overlap_sphere(&self, center: Vec3, radius: f32, channel: CollisionChannel) -> Vec<EntityId> {
        if channel != CollisionChannel::Pawn {
            return Vec::new();
        }
        self.colliding()
            .filter(|(_, body)| {
                let reach = radius + body.radius;
                body.location.distance_squared(center) <= reach * reach
            })
            .map(|(id, _)| id)
            .collect()
    }
}
