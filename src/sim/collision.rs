//! Collision detection
//!
//! Everything here is distance-threshold or box-overlap testing. Results are
//! reported in entity creation order so resolution is deterministic.

use glam::Vec3;

use super::entity::{BulletOwner, EntityBody, EntityId, EntityKind, EntityStore};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Shape used to probe the store from the player's side
#[derive(Debug, Clone, Copy)]
pub enum Probe {
    /// Sphere test against `entity.radius() + extra`
    Sphere { center: Vec3, radius: f32 },
    /// Box overlap against entities that carry box extents (obstacles),
    /// sphere test against `radius` for everything else
    Box { bounds: Aabb, radius: f32 },
}

/// A player-vs-entity contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub entity: EntityId,
    pub kind: EntityKind,
}

/// A projectile-vs-target hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub bullet: EntityId,
    pub target: EntityId,
    pub kind: EntityKind,
}

#[inline]
pub fn spheres_overlap(a: Vec3, ra: f32, b: Vec3, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}

/// All entities accepted by `filter` that touch the probe, in creation order
pub fn detect_contacts<F>(probe: Probe, store: &EntityStore, mut filter: F) -> Vec<Contact>
where
    F: FnMut(&super::entity::Entity) -> bool,
{
    store
        .iter()
        .filter(|e| filter(e))
        .filter(|e| match probe {
            Probe::Sphere { center, radius } => spheres_overlap(center, radius, e.pos, e.radius()),
            Probe::Box { bounds, radius } => match &e.body {
                EntityBody::Obstacle { shape, .. } => {
                    bounds.intersects(&Aabb::from_center(e.pos, shape.half_extents()))
                }
                _ => {
                    let center = (bounds.min + bounds.max) * 0.5;
                    center.distance(e.pos) < radius
                }
            },
        })
        .map(|e| Contact {
            entity: e.id,
            kind: e.kind(),
        })
        .collect()
}

/// Landing test: close enough horizontally and vertically, and falling
pub fn is_landing(player_pos: Vec3, player_vel: Vec3, platform_pos: Vec3, platform_size: f32) -> bool {
    player_vel.y < 0.0
        && player_pos.distance(platform_pos) < platform_size / 2.0 + 1.0
        && (player_pos.y - platform_pos.y).abs() < 1.0
}

/// Player bullets against damageable targets.
///
/// Each bullet hits at most one target (the earliest created one in range).
/// A target may be hit by several bullets in the same frame.
pub fn projectile_hits(store: &EntityStore, hit_radius: f32) -> Vec<Hit> {
    let mut hits = Vec::new();
    for bullet in store.iter() {
        if !matches!(
            bullet.body,
            EntityBody::Bullet {
                owner: BulletOwner::Player
            }
        ) {
            continue;
        }
        let target = store.iter().find(|t| {
            matches!(t.kind(), EntityKind::Asteroid | EntityKind::Enemy)
                && bullet.pos.distance(t.pos) < hit_radius
        });
        if let Some(target) = target {
            hits.push(Hit {
                bullet: bullet.id,
                target: target.id,
                kind: target.kind(),
            });
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::ObstacleShape;

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::from_center(Vec3::ZERO, Vec3::splat(0.5));
        let b = Aabb::from_center(Vec3::new(0.9, 0.0, 0.0), Vec3::splat(0.5));
        let c = Aabb::from_center(Vec3::new(1.1, 0.0, 0.0), Vec3::splat(0.5));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_contacts_in_creation_order() {
        let mut store = EntityStore::new(8);
        let far = store.spawn(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO, EntityBody::Coin { lane: 0, spin: 0.0 });
        let a = store.spawn(Vec3::new(0.2, 0.0, 0.0), Vec3::ZERO, EntityBody::Coin { lane: 1, spin: 0.0 });
        let b = store.spawn(Vec3::ZERO, Vec3::ZERO, EntityBody::Coin { lane: 1, spin: 0.0 });

        let probe = Probe::Sphere {
            center: Vec3::ZERO,
            radius: 0.5,
        };
        let contacts = detect_contacts(probe, &store, |_| true);
        let ids: Vec<_> = contacts.iter().map(|c| Some(c.entity)).collect();
        assert_eq!(ids, vec![a, b]);
        assert!(!ids.contains(&far));
    }

    #[test]
    fn test_box_probe_against_obstacle() {
        let mut store = EntityStore::new(4);
        store.spawn(
            Vec3::new(0.0, 2.5, 0.0),
            Vec3::ZERO,
            EntityBody::Obstacle {
                shape: ObstacleShape::Bar,
                lane: 1,
            },
        );
        // Ducking player stays under the bar
        let ducking = Probe::Box {
            bounds: Aabb::from_center(Vec3::new(0.0, 0.6, 0.0), Vec3::new(0.5, 0.5, 0.5)),
            radius: 1.0,
        };
        assert!(detect_contacts(ducking, &store, |_| true).is_empty());

        let jumping = Probe::Box {
            bounds: Aabb::from_center(Vec3::new(0.0, 2.2, 0.0), Vec3::new(0.5, 0.5, 0.5)),
            radius: 1.0,
        };
        assert_eq!(detect_contacts(jumping, &store, |_| true).len(), 1);
    }

    #[test]
    fn test_landing_requires_downward_velocity() {
        let platform = Vec3::new(0.0, 0.0, 0.0);
        let pos = Vec3::new(0.5, 0.4, 0.0);
        assert!(is_landing(pos, Vec3::new(0.0, -1.0, 0.0), platform, 3.0));
        assert!(!is_landing(pos, Vec3::new(0.0, 1.0, 0.0), platform, 3.0));
        assert!(!is_landing(Vec3::new(5.0, 0.4, 0.0), Vec3::new(0.0, -1.0, 0.0), platform, 3.0));
    }

    #[test]
    fn test_bullet_hits_one_target() {
        let mut store = EntityStore::new(8);
        let first = store
            .spawn(Vec3::ZERO, Vec3::ZERO, EntityBody::Enemy { health: 2, shot_timer: 0.0 })
            .unwrap();
        store.spawn(
            Vec3::new(0.1, 0.0, 0.0),
            Vec3::ZERO,
            EntityBody::Asteroid {
                size: 1.0,
                health: 1,
                spin: Vec3::ZERO,
            },
        );
        let bullet = store
            .spawn(
                Vec3::new(0.0, 0.0, 0.2),
                Vec3::ZERO,
                EntityBody::Bullet {
                    owner: BulletOwner::Player,
                },
            )
            .unwrap();
        store.spawn(
            Vec3::new(0.0, 0.0, 0.2),
            Vec3::ZERO,
            EntityBody::Bullet {
                owner: BulletOwner::Enemy,
            },
        );

        let hits = projectile_hits(&store, 1.0);
        assert_eq!(
            hits,
            vec![Hit {
                bullet,
                target: first,
                kind: EntityKind::Enemy
            }]
        );
    }
}
