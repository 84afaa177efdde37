//! Spawning and retirement of transient entities

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{EntityId, EntityStore};
use crate::consts::NOMINAL_FPS;

/// Weighted choice table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnTable<T> {
    entries: Vec<(T, u32)>,
    total: u32,
}

impl<T: Copy> SpawnTable<T> {
    pub fn new(entries: Vec<(T, u32)>) -> Self {
        let total = entries.iter().map(|(_, w)| *w).sum();
        Self { entries, total }
    }

    /// Equal weights
    pub fn uniform(items: &[T]) -> Self {
        Self::new(items.iter().map(|&t| (t, 1)).collect())
    }

    pub fn pick(&self, rng: &mut Pcg32) -> Option<T> {
        if self.total == 0 {
            return None;
        }
        let mut roll = rng.random_range(0..self.total);
        for (item, weight) in &self.entries {
            if roll < *weight {
                return Some(*item);
            }
            roll -= weight;
        }
        None
    }
}

/// Seeded random source for all spawn decisions
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    rng: Pcg32,
}

impl SpawnScheduler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Bernoulli trial for a chance authored per 60 Hz frame, scaled to `dt`
    pub fn roll(&mut self, chance_per_frame: f32, dt: f32) -> bool {
        if chance_per_frame <= 0.0 {
            return false;
        }
        let frames = dt * NOMINAL_FPS;
        let p = 1.0 - (1.0 - chance_per_frame.min(1.0)).powf(frames);
        self.rng.random_bool(p.clamp(0.0, 1.0) as f64)
    }

    /// Uniform float in `[lo, hi)`
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.rng.random_range(lo..hi)
    }

    /// Uniform index in `[0, n)`
    pub fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.rng.random_range(0..n)
    }

    pub fn pick<T: Copy>(&mut self, table: &SpawnTable<T>) -> Option<T> {
        table.pick(&mut self.rng)
    }

    /// Random vector with each component in `[-half, half)`
    pub fn jitter(&mut self, half: Vec3) -> Vec3 {
        Vec3::new(
            self.range(-half.x, half.x),
            self.range(-half.y, half.y),
            self.range(-half.z, half.z),
        )
    }
}

/// Region outside of which entities are removed
///
/// Positions are measured along `direction` (the player's direction of
/// travel) relative to the player. Anything further than `behind` units
/// behind, or further than `ahead` units in front, is retired.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetireBoundary {
    pub direction: Vec3,
    pub behind: f32,
    pub ahead: Option<f32>,
}

impl RetireBoundary {
    pub fn behind(direction: Vec3, behind: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            behind,
            ahead: None,
        }
    }

    pub fn with_ahead(mut self, ahead: f32) -> Self {
        self.ahead = Some(ahead);
        self
    }

    pub fn outside(&self, origin: Vec3, pos: Vec3) -> bool {
        let along = (pos - origin).dot(self.direction);
        along < -self.behind || self.ahead.is_some_and(|a| along > a)
    }

    /// Remove matching entities outside the boundary; returns their ids
    pub fn retire<F>(&self, store: &mut EntityStore, origin: Vec3, mut applies: F) -> Vec<EntityId>
    where
        F: FnMut(&super::entity::Entity) -> bool,
    {
        let mut retired = Vec::new();
        store.retain(|e| {
            if applies(e) && self.outside(origin, e.pos) {
                retired.push(e.id);
                false
            } else {
                true
            }
        });
        retired
    }
}
