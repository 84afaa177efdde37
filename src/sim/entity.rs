//! Transient entities and the store that owns them
//!
//! Entities live in a single `Vec` kept in id order. Ids are allocated
//! monotonically, so iteration order is creation order.

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub type EntityId = u32;

/// Entity category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle,
    Coin,
    Bullet,
    Asteroid,
    Enemy,
    Particle,
    Platform,
    Checkpoint,
}

/// Runner obstacle shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleShape {
    /// Ground crate, must be dodged or jumped
    Box,
    /// Tall spike, must be dodged
    Pyramid,
    /// Overhead bar, must be dodged or ducked under
    Bar,
}

impl ObstacleShape {
    /// Half extents of the obstacle's bounding box
    pub fn half_extents(&self) -> Vec3 {
        match self {
            ObstacleShape::Box => Vec3::new(0.75, 0.75, 0.75),
            ObstacleShape::Pyramid => Vec3::new(0.8, 1.0, 0.8),
            ObstacleShape::Bar => Vec3::new(1.5, 0.25, 0.25),
        }
    }

    /// Resting height of the obstacle center
    pub fn center_height(&self) -> f32 {
        match self {
            ObstacleShape::Bar => 2.5,
            _ => 0.75,
        }
    }
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// Per-kind entity data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityBody {
    Obstacle { shape: ObstacleShape, lane: usize },
    Coin { lane: usize, spin: f32 },
    Bullet { owner: BulletOwner },
    Asteroid { size: f32, health: u8, spin: Vec3 },
    Enemy { health: u8, shot_timer: f32 },
    /// `life` runs from 1.0 down to 0.0
    Particle { life: f32 },
    Platform { size: f32 },
    Checkpoint { index: u32, passed: bool },
}

impl EntityBody {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityBody::Obstacle { .. } => EntityKind::Obstacle,
            EntityBody::Coin { .. } => EntityKind::Coin,
            EntityBody::Bullet { .. } => EntityKind::Bullet,
            EntityBody::Asteroid { .. } => EntityKind::Asteroid,
            EntityBody::Enemy { .. } => EntityKind::Enemy,
            EntityBody::Particle { .. } => EntityKind::Particle,
            EntityBody::Platform { .. } => EntityKind::Platform,
            EntityBody::Checkpoint { .. } => EntityKind::Checkpoint,
        }
    }
}

/// A simulated object other than the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub pos: Vec3,
    pub vel: Vec3,
    pub body: EntityBody,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        self.body.kind()
    }

    /// Contact radius used by distance-threshold collision checks
    pub fn radius(&self) -> f32 {
        match &self.body {
            EntityBody::Obstacle { shape, .. } => shape.half_extents().max_element(),
            EntityBody::Coin { .. } => 0.5,
            EntityBody::Bullet { .. } => 0.1,
            EntityBody::Asteroid { size, .. } => *size,
            EntityBody::Enemy { .. } => 0.75,
            EntityBody::Particle { .. } => 0.0,
            EntityBody::Platform { size } => size / 2.0,
            EntityBody::Checkpoint { .. } => 3.0,
        }
    }

    /// Remaining hit points for damageable entities
    pub fn health(&self) -> Option<u8> {
        match self.body {
            EntityBody::Asteroid { health, .. } | EntityBody::Enemy { health, .. } => Some(health),
            _ => None,
        }
    }

    /// Subtract one hit point; returns true when the entity is destroyed
    pub fn damage(&mut self) -> bool {
        match &mut self.body {
            EntityBody::Asteroid { health, .. } | EntityBody::Enemy { health, .. } => {
                *health = health.saturating_sub(1);
                *health == 0
            }
            _ => false,
        }
    }
}

/// Owner of all transient entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore {
    entities: Vec<Entity>,
    next_id: EntityId,
    capacity: usize,
}

impl EntityStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entities: Vec::with_capacity(capacity.min(256)),
            next_id: 1,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Create an entity. Returns `None` when the store is full.
    pub fn spawn(&mut self, pos: Vec3, vel: Vec3, body: EntityBody) -> Option<EntityId> {
        if self.entities.len() >= self.capacity {
            log::trace!("Entity cap {} reached, skipping {:?}", self.capacity, body.kind());
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.entities.push(Entity { id, pos, vel, body });
        Some(id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index_of(id).map(move |i| &mut self.entities[i])
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.index_of(id).map(|i| self.entities.remove(i))
    }

    /// Keep entities matching the predicate; returns how many were removed
    pub fn retain<F: FnMut(&Entity) -> bool>(&mut self, f: F) -> usize {
        let before = self.entities.len();
        self.entities.retain(f);
        before - self.entities.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Entities of one kind, in creation order
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.kind() == kind)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Oldest entity of a kind
    pub fn first_of(&self, kind: EntityKind) -> Option<&Entity> {
        self.of_kind(kind).next()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Drop every entity. Ids keep increasing so stale references never alias.
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }
}
