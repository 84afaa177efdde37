//! Space shooter: dodge and shoot asteroids and enemy ships

use glam::Vec3;

use super::{explode, lethal_hit};
use crate::sim::collision::{Probe, detect_contacts, projectile_hits};
use crate::sim::entity::{BulletOwner, EntityBody, EntityKind};
use crate::sim::kinematics::step_entities;
use crate::sim::spawn::RetireBoundary;
use crate::sim::state::GameState;
use crate::sim::tick::{FrameInput, GameEvent};

/// Bullets leave the ship this far in front of it
const MUZZLE_OFFSET: f32 = 1.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShooterState {
    /// Seconds until the player may fire again
    pub cooldown: f32,
}

fn mode(mode: &mut super::GameMode) -> &mut ShooterState {
    match mode {
        super::GameMode::SpaceShooter(m) => m,
        _ => unreachable!("shooter rules on a non-shooter state"),
    }
}

pub fn setup(state: &mut GameState) {
    state.player.pos = Vec3::ZERO;
    mode(&mut state.mode).cooldown = 0.0;
}

fn fly(state: &mut GameState, input: &FrameInput, dt: f32) {
    let t = &state.tuning.shooter;
    let (bx, by) = t.bounds;
    let steer = input.steer.clamp_length_max(1.0);
    let player = &mut state.player;
    player.pos.x = (player.pos.x + steer.x * t.move_speed * dt).clamp(-bx, bx);
    player.pos.y = (player.pos.y + steer.y * t.move_speed * dt).clamp(-by, by);
    player.vel = Vec3::ZERO;
}

fn fire(state: &mut GameState, input: &FrameInput, dt: f32) {
    let (cooldown, bullet_speed) = (state.tuning.shooter.fire_cooldown, state.tuning.shooter.bullet_speed);
    let m = mode(&mut state.mode);
    m.cooldown = (m.cooldown - dt).max(0.0);
    if !input.fire || m.cooldown > 0.0 {
        return;
    }
    m.cooldown = cooldown;

    let muzzle = state.player.pos + Vec3::new(0.0, 0.0, -MUZZLE_OFFSET);
    state.entities.spawn(
        muzzle,
        Vec3::new(0.0, 0.0, -bullet_speed),
        EntityBody::Bullet {
            owner: BulletOwner::Player,
        },
    );
}

/// Enemies that waited long enough fire at random, from their own position
fn enemy_fire(state: &mut GameState, dt: f32) {
    let t = &state.tuning.shooter;
    let (interval, chance, speed) = (t.enemy_fire_interval, t.enemy_fire_chance, t.enemy_bullet_speed);

    let ready: Vec<_> = state
        .entities
        .iter()
        .filter_map(|e| match e.body {
            EntityBody::Enemy { shot_timer, .. } if shot_timer > interval => Some(e.id),
            _ => None,
        })
        .collect();

    for id in ready {
        if !state.spawner.roll(chance, dt) {
            continue;
        }
        let Some(enemy) = state.entities.get_mut(id) else {
            continue;
        };
        if let EntityBody::Enemy { shot_timer, .. } = &mut enemy.body {
            *shot_timer = 0.0;
        }
        let pos = enemy.pos;
        state.entities.spawn(
            pos,
            Vec3::new(0.0, 0.0, speed),
            EntityBody::Bullet {
                owner: BulletOwner::Enemy,
            },
        );
    }
}

fn spawn(state: &mut GameState, dt: f32) {
    let t = state.tuning.shooter.clone();
    let (bx, by) = t.bounds;

    if state.spawner.roll(t.asteroid_chance, dt) {
        let size = state.spawner.range(t.asteroid_size.0, t.asteroid_size.1);
        let pos = Vec3::new(
            state.spawner.range(-bx, bx),
            state.spawner.range(-by, by),
            t.asteroid_spawn_z,
        );
        let drift = state.spawner.jitter(Vec3::new(t.asteroid_drift, t.asteroid_drift, 0.0));
        let vel = drift + Vec3::new(0.0, 0.0, state.spawner.range(t.asteroid_speed.0, t.asteroid_speed.1));
        let spin = state.spawner.jitter(Vec3::splat(1.5));
        let health = size.ceil().clamp(1.0, u8::MAX as f32) as u8;
        state
            .entities
            .spawn(pos, vel, EntityBody::Asteroid { size, health, spin });
    }

    let enemy_chance = t.enemy_base_chance + t.enemy_chance_per_level * state.session.level as f32;
    if state.spawner.roll(enemy_chance, dt) {
        let pos = Vec3::new(
            state.spawner.range(-bx * 0.75, bx * 0.75),
            state.spawner.range(-by * 0.625, by * 0.625),
            t.enemy_spawn_z,
        );
        state.entities.spawn(
            pos,
            Vec3::new(0.0, 0.0, t.enemy_speed),
            EntityBody::Enemy {
                health: t.enemy_health,
                shot_timer: 0.0,
            },
        );
    }

    RetireBoundary::behind(Vec3::NEG_Z, t.retire_behind).retire(&mut state.entities, Vec3::ZERO, |e| {
        matches!(e.kind(), EntityKind::Asteroid | EntityKind::Enemy)
    });
    RetireBoundary::behind(Vec3::NEG_Z, t.bullet_range)
        .with_ahead(t.bullet_range)
        .retire(&mut state.entities, Vec3::ZERO, |e| e.kind() == EntityKind::Bullet);
}

/// Player bullets against asteroids and enemies
fn resolve_hits(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let t = state.tuning.shooter.clone();

    for hit in projectile_hits(&state.entities, t.bullet_hit_radius) {
        // An earlier bullet may already have destroyed the target
        let Some(target) = state.entities.get_mut(hit.target) else {
            continue;
        };
        let destroyed = target.damage();
        let at = target.pos;
        state.entities.remove(hit.bullet);

        if hit.kind == EntityKind::Asteroid {
            state.session.add_score(t.asteroid_hit_points);
            events.push(GameEvent::TargetHit {
                target: hit.target,
                points: t.asteroid_hit_points,
            });
        }
        if destroyed {
            let points = match hit.kind {
                EntityKind::Enemy => t.enemy_destroy_points,
                _ => t.asteroid_destroy_points,
            };
            state.entities.remove(hit.target);
            state.session.add_score(points);
            events.push(GameEvent::EntityDestroyed {
                entity: hit.target,
                kind: hit.kind,
                points,
            });
            explode(state, at, t.explosion_particles, t.particle_speed);
        }
    }
}

/// Crashes and enemy bullets; every lethal entity costs one life and is consumed
fn resolve_crashes(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let t = state.tuning.shooter.clone();
    let probe = Probe::Sphere {
        center: state.player.pos,
        radius: t.crash_radius,
    };
    let contacts = detect_contacts(probe, &state.entities, |e| match e.body {
        EntityBody::Asteroid { .. } | EntityBody::Enemy { .. } => true,
        EntityBody::Bullet { owner } => owner == BulletOwner::Enemy,
        _ => false,
    });

    for contact in contacts {
        if !state.session.is_playing() {
            break;
        }
        let Some(entity) = state.entities.remove(contact.entity) else {
            continue;
        };
        explode(state, entity.pos, t.explosion_particles, t.particle_speed);
        lethal_hit(state, contact.entity, contact.kind, events);
    }
}

/// Every `points_per_level` points raise the level by one
fn check_level(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let per_level = state.tuning.shooter.points_per_level.max(1);
    let target = 1 + (state.session.score / per_level) as u32;
    while state.session.is_playing() && state.session.level < target {
        let level = state.session.level_up();
        log::info!("Level up: {}", level);
        events.push(GameEvent::LevelUp { level });
    }
}

pub fn step(state: &mut GameState, input: &FrameInput, dt: f32, events: &mut Vec<GameEvent>) {
    fly(state, input, dt);
    fire(state, input, dt);
    enemy_fire(state, dt);

    step_entities(&mut state.entities, dt);
    spawn(state, dt);

    resolve_hits(state, events);
    resolve_crashes(state, events);
    check_level(state, events);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameKind;
    use crate::consts::SIM_DT;
    use crate::settings::Settings;
    use crate::sim::session::SessionState;
    use crate::sim::tick::tick;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn quiet_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.shooter.asteroid_chance = 0.0;
        tuning.shooter.enemy_base_chance = 0.0;
        tuning.shooter.enemy_chance_per_level = 0.0;
        tuning
    }

    fn playing(tuning: Tuning) -> GameState {
        let mut state = GameState::new(GameKind::SpaceShooter, 3, tuning, &Settings::default());
        let start = FrameInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &start, SIM_DT);
        state
    }

    fn player_bullet() -> EntityBody {
        EntityBody::Bullet {
            owner: BulletOwner::Player,
        }
    }

    #[test]
    fn test_movement_clamped_to_bounds() {
        let mut state = playing(quiet_tuning());
        let input = FrameInput {
            steer: Vec2::new(1.0, -1.0),
            ..Default::default()
        };
        for _ in 0..120 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.player.pos.x, 10.0);
        assert_eq!(state.player.pos.y, -8.0);
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut state = playing(quiet_tuning());
        let input = FrameInput {
            fire: true,
            ..Default::default()
        };
        // 0.25 s cooldown: two shots in 20 frames
        for _ in 0..20 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.entities.count(EntityKind::Bullet), 2);
    }

    #[test]
    fn test_asteroid_hit_then_destroyed() {
        let mut state = playing(quiet_tuning());
        let target = Vec3::new(0.0, 0.0, -10.0);
        let asteroid = state
            .entities
            .spawn(
                target,
                Vec3::ZERO,
                EntityBody::Asteroid {
                    size: 1.5,
                    health: 2,
                    spin: Vec3::ZERO,
                },
            )
            .unwrap();

        state.entities.spawn(target, Vec3::ZERO, player_bullet());
        let events = tick(&mut state, &FrameInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::TargetHit {
            target: asteroid,
            points: 10
        }));
        assert_eq!(state.entities.get(asteroid).unwrap().health(), Some(1));
        assert_eq!(state.session.score, 10);

        state.entities.spawn(target, Vec3::ZERO, player_bullet());
        let events = tick(&mut state, &FrameInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::EntityDestroyed {
            entity: asteroid,
            kind: EntityKind::Asteroid,
            points: 50
        }));
        assert!(!state.entities.contains(asteroid));
        assert_eq!(state.session.score, 70);
        assert!(state.particle_count() > 0);
        assert_eq!(state.entities.count(EntityKind::Bullet), 0);
    }

    #[test]
    fn test_enemy_destroyed_scores_100() {
        let mut state = playing(quiet_tuning());
        let target = Vec3::new(2.0, 2.0, -15.0);
        let enemy = state
            .entities
            .spawn(
                target,
                Vec3::ZERO,
                EntityBody::Enemy {
                    health: 2,
                    shot_timer: 0.0,
                },
            )
            .unwrap();
        state.entities.spawn(target, Vec3::ZERO, player_bullet());
        state.entities.spawn(target, Vec3::ZERO, player_bullet());
        let events = tick(&mut state, &FrameInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::EntityDestroyed {
            entity: enemy,
            kind: EntityKind::Enemy,
            points: 100
        }));
        assert_eq!(state.session.score, 100);
    }

    #[test]
    fn test_simultaneous_contacts_end_once() {
        let mut tuning = quiet_tuning();
        tuning.shooter.lives = 1;
        let mut state = playing(tuning);
        for _ in 0..2 {
            state.entities.spawn(
                Vec3::ZERO,
                Vec3::ZERO,
                EntityBody::Asteroid {
                    size: 1.0,
                    health: 1,
                    spin: Vec3::ZERO,
                },
            );
        }
        let events = tick(&mut state, &FrameInput::default(), SIM_DT);
        let ended = events.iter().filter(|e| matches!(e, GameEvent::Ended(_))).count();
        let hits = events.iter().filter(|e| matches!(e, GameEvent::PlayerHit { .. })).count();
        assert_eq!(ended, 1);
        assert_eq!(hits, 1);
        assert_eq!(state.session.state, SessionState::GameOver);
    }

    #[test]
    fn test_each_crash_costs_one_life() {
        let mut state = playing(quiet_tuning());
        state.entities.spawn(
            Vec3::new(0.0, 0.0, 0.5),
            Vec3::ZERO,
            EntityBody::Bullet {
                owner: BulletOwner::Enemy,
            },
        );
        state.entities.spawn(
            Vec3::ZERO,
            Vec3::ZERO,
            EntityBody::Enemy {
                health: 2,
                shot_timer: 0.0,
            },
        );
        tick(&mut state, &FrameInput::default(), SIM_DT);
        assert_eq!(state.session.lives, 1);
        assert!(state.session.is_playing());

        // Consumed: no further damage next frame
        tick(&mut state, &FrameInput::default(), SIM_DT);
        assert_eq!(state.session.lives, 1);
    }

    #[test]
    fn test_level_up_every_500_points() {
        let mut state = playing(quiet_tuning());
        state.session.add_score(990);
        let events = tick(&mut state, &FrameInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::LevelUp { level: 2 }));
        assert_eq!(state.session.level, 2);
    }

    #[test]
    fn test_enemy_fires_from_its_position() {
        let mut tuning = quiet_tuning();
        tuning.shooter.enemy_fire_chance = 1.0;
        let mut state = playing(tuning);
        let at = Vec3::new(5.0, 3.0, -30.0);
        state.entities.spawn(
            at,
            Vec3::ZERO,
            EntityBody::Enemy {
                health: 2,
                shot_timer: 2.5,
            },
        );
        tick(&mut state, &FrameInput::default(), SIM_DT);
        let bullet = state.entities.first_of(EntityKind::Bullet).unwrap();
        assert_eq!(bullet.body, EntityBody::Bullet { owner: BulletOwner::Enemy });
        assert!((bullet.pos.x - at.x).abs() < 1e-4);
        assert!(bullet.vel.z > 0.0);
    }
}
