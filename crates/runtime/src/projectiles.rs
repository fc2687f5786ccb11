//! Enemy projectiles.
//!
//! Projectiles fly in a straight line. Each tick sweeps the segment travelled
//! against the spatial index; the first body crossed (other than the
//! instigator) consumes the projectile. Unspent projectiles expire after their
//! lifespan.
use glam::Vec3;

use combat_core::{EntityId, ProjectileLaunch, ProjectileSpawner};

use crate::spatial::SpatialIndex;

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub launch: ProjectileLaunch,
    pub position: Vec3,
    pub age: f32,
}

/// A projectile that reached a body this tick.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileHit {
    pub instigator: EntityId,
    pub target: EntityId,
    pub kind: String,
    pub damage: f32,
}

#[derive(Debug, Default)]
pub struct ProjectileSystem {
    active: Vec<Projectile>,
}

impl ProjectileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[Projectile] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Moves every projectile and returns the hits, in launch order.
    pub fn tick(&mut self, dt: f32, spatial: &SpatialIndex) -> Vec<ProjectileHit> {
        if dt <= 0.0 {
            return Vec::new();
        }
        let mut hits = Vec::new();
        self.active.retain_mut(|projectile| {
            // Never travel past the end of the lifespan.
            let step = dt.min((projectile.launch.life_span - projectile.age).max(0.0));
            let start = projectile.position;
            let end = start + projectile.launch.direction * projectile.launch.speed * step;
            projectile.position = end;
            projectile.age += dt;

            if let Some(target) = spatial.first_hit_along(start, end, projectile.launch.instigator) {
                hits.push(ProjectileHit {
                    instigator: projectile.launch.instigator,
                    target,
                    kind: projectile.launch.kind.clone(),
                    damage: projectile.launch.damage,
                });
                return false;
            }
            if projectile.age >= projectile.launch.life_span {
                tracing::trace!(target: "runtime::projectiles", kind = %projectile.launch.kind, "projectile expired");
                return false;
            }
            true
        });
        hits
    }

    /// Removes every projectile fired by `instigator`.
    pub fn remove_from(&mut self, instigator: EntityId) -> usize {
        let before = self.active.len();
        self.active.retain(|p| p.launch.instigator != instigator);
        before - self.active.len()
    }
}

impl ProjectileSpawner for ProjectileSystem {
    fn spawn_projectile(&mut self, launch: ProjectileLaunch) {
        tracing::debug!(
            target: "runtime::projectiles",
            instigator = %launch.instigator,
            kind = %launch.kind,
            speed = launch.speed,
            "projectile spawned"
        );
        self.active.push(Projectile {
            position: launch.origin,
            age: 0.0,
            launch,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launch(speed: f32, life_span: f32) -> ProjectileLaunch {
        ProjectileLaunch {
            instigator: EntityId(5),
            kind: "EnemyBolt".into(),
            origin: Vec3::ZERO,
            direction: Vec3::X,
            speed,
            life_span,
            damage: 10.0,
        }
    }

    #[test]
    fn hits_first_body_on_path() {
        let mut spatial = SpatialIndex::new();
        spatial.insert(EntityId(5), Vec3::ZERO, 40.0);
        spatial.insert(EntityId(1), Vec3::new(500.0, 0.0, 0.0), 40.0);
        spatial.insert(EntityId(2), Vec3::new(800.0, 0.0, 0.0), 40.0);

        let mut projectiles = ProjectileSystem::new();
        projectiles.spawn_projectile(launch(1200.0, 5.0));

        assert!(projectiles.tick(0.25, &spatial).is_empty());
        let hits = projectiles.tick(0.25, &spatial);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target, EntityId(1));
        assert_eq!(hits[0].damage, 10.0);
        assert!(projectiles.is_empty());
    }

    #[test]
    fn expires_after_lifespan() {
        let spatial = SpatialIndex::new();
        let mut projectiles = ProjectileSystem::new();
        projectiles.spawn_projectile(launch(100.0, 1.0));

        projectiles.tick(0.6, &spatial);
        assert_eq!(projectiles.len(), 1);
        projectiles.tick(0.6, &spatial);
        assert!(projectiles.is_empty());
    }

    #[test]
    fn does_not_travel_past_lifespan() {
        let mut spatial = SpatialIndex::new();
        spatial.insert(EntityId(1), Vec3::new(150.0, 0.0, 0.0), 10.0);
        let mut projectiles = ProjectileSystem::new();
        projectiles.spawn_projectile(launch(100.0, 1.0));

        // Full step would reach x=200, but the projectile dies at x=100.
        assert!(projectiles.tick(2.0, &spatial).is_empty());
        assert!(projectiles.is_empty());
    }
}
