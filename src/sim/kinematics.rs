//! Kinematic integration
//!
//! Explicit Euler: `pos += vel * dt`. Per-frame factors authored at 60 Hz
//! are converted with `NOMINAL_FPS` so the result is independent of the
//! step size.

use glam::Vec3;

use super::entity::{EntityBody, EntityStore};
use super::state::Player;
use crate::consts::NOMINAL_FPS;

/// Particle life lost per second (1.0 -> 0.0 in under a second)
pub const PARTICLE_DECAY: f32 = 1.2;

#[inline]
pub fn integrate(pos: &mut Vec3, vel: Vec3, dt: f32) {
    *pos += vel * dt;
}

/// Constant downward acceleration
#[inline]
pub fn apply_gravity(vel: &mut Vec3, gravity: f32, dt: f32) {
    vel.y -= gravity * dt;
}

/// Multiplicative damping authored as "factor per 60 Hz frame"
#[inline]
pub fn apply_friction(value: f32, per_frame_factor: f32, dt: f32) -> f32 {
    value * per_frame_factor.powf(dt * NOMINAL_FPS)
}

/// Clamp the XZ speed, leaving vertical velocity untouched
pub fn clamp_horizontal_speed(vel: Vec3, max_speed: f32) -> Vec3 {
    let horizontal = glam::Vec2::new(vel.x, vel.z).clamp_length_max(max_speed);
    Vec3::new(horizontal.x, vel.y, horizontal.y)
}

/// Move `current` toward `target` by at most `max_step`
#[inline]
pub fn approach(current: f32, target: f32, max_step: f32) -> f32 {
    if current < target {
        (current + max_step).min(target)
    } else {
        (current - max_step).max(target)
    }
}

/// Advance the player; gravity only acts while airborne
pub fn step_player(player: &mut Player, gravity: f32, dt: f32) {
    if player.mode.airborne {
        apply_gravity(&mut player.vel, gravity, dt);
    }
    integrate(&mut player.pos, player.vel, dt);
}

/// Advance every entity, spin decorations and age particles
pub fn step_entities(store: &mut EntityStore, dt: f32) {
    for entity in store.iter_mut() {
        integrate(&mut entity.pos, entity.vel, dt);
        match &mut entity.body {
            EntityBody::Coin { spin, .. } => {
                *spin = (*spin + 6.0 * dt) % std::f32::consts::TAU;
            }
            EntityBody::Particle { life } => {
                *life -= PARTICLE_DECAY * dt;
            }
            EntityBody::Enemy { shot_timer, .. } => {
                *shot_timer += dt;
            }
            _ => {}
        }
    }
    store.retain(|e| !matches!(e.body, EntityBody::Particle { life } if life <= 0.0));
}

/// Fall-death signal
#[inline]
pub fn below_world(pos: Vec3, floor: f32) -> bool {
    pos.y < floor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_integrate() {
        let mut pos = Vec3::ZERO;
        integrate(&mut pos, Vec3::new(60.0, 0.0, -30.0), SIM_DT);
        assert!((pos.x - 1.0).abs() < 1e-5);
        assert!((pos.z + 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_friction_matches_per_frame_factor() {
        let v = apply_friction(1.0, 0.98, SIM_DT);
        assert!((v - 0.98).abs() < 1e-5);
        // Two half-steps equal one full step
        let half = apply_friction(apply_friction(1.0, 0.98, SIM_DT / 2.0), 0.98, SIM_DT / 2.0);
        assert!((half - v).abs() < 1e-5);
    }

    #[test]
    fn test_clamp_horizontal_speed() {
        let v = clamp_horizontal_speed(Vec3::new(30.0, -5.0, 40.0), 10.0);
        assert!((glam::Vec2::new(v.x, v.z).length() - 10.0).abs() < 1e-4);
        assert_eq!(v.y, -5.0);
    }

    #[test]
    fn test_approach_never_overshoots() {
        assert_eq!(approach(0.0, 3.0, 0.2), 0.2);
        assert_eq!(approach(2.9, 3.0, 0.2), 3.0);
        assert_eq!(approach(0.0, -3.0, 0.2), -0.2);
        assert_eq!(approach(-2.9, -3.0, 0.2), -3.0);
    }

    #[test]
    fn test_gravity_only_when_airborne() {
        let mut player = Player::default();
        step_player(&mut player, 10.0, SIM_DT);
        assert_eq!(player.vel.y, 0.0);

        player.mode.airborne = true;
        step_player(&mut player, 10.0, SIM_DT);
        assert!(player.vel.y < 0.0);
    }

    #[test]
    fn test_particles_expire() {
        let mut store = EntityStore::new(8);
        store.spawn(Vec3::ZERO, Vec3::X, EntityBody::Particle { life: 0.01 });
        step_entities(&mut store, SIM_DT);
        assert!(store.is_empty());
    }
}
