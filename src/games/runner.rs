//! Endless runner: three lanes, jump or duck obstacles, grab coins
//!
//! The player stays at z = 0 and the world scrolls toward +z.

use glam::Vec3;

use super::lethal_hit;
use crate::sim::collision::{Aabb, Probe, detect_contacts};
use crate::sim::entity::{EntityBody, EntityKind, ObstacleShape};
use crate::sim::kinematics::{approach, step_entities, step_player};
use crate::sim::spawn::{RetireBoundary, SpawnTable};
use crate::sim::state::GameState;
use crate::sim::tick::{FrameInput, GameEvent};

/// Player cube half extents when standing
const PLAYER_HALF: Vec3 = Vec3::new(0.5, 0.5, 0.5);
/// Player cube half extents when ducking
const DUCK_HALF: Vec3 = Vec3::new(0.5, 0.25, 0.5);
/// Coin pickup distance beyond the coin's own radius
const PICKUP_RADIUS: f32 = 0.5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunnerState {
    /// Distance travelled, coin bonuses included
    pub distance: f32,
    /// Current world scroll speed
    pub speed: f32,
    /// Whole distance units already credited to the score
    pub credited: u64,
}

fn mode(mode: &mut super::GameMode) -> &mut RunnerState {
    match mode {
        super::GameMode::Runner(m) => m,
        _ => unreachable!("runner rules on a non-runner state"),
    }
}

pub fn setup(state: &mut GameState) {
    let t = &state.tuning.runner;
    state.player.lane = 1;
    state.player.pos = Vec3::new(t.lanes[1], t.ground_y, 0.0);
    let speed = t.start_speed;
    mode(&mut state.mode).speed = speed;
}

/// Score follows the whole distance travelled
fn credit_distance(state: &mut GameState) {
    let m = mode(&mut state.mode);
    let whole = m.distance.max(0.0).floor() as u64;
    if whole > m.credited && state.session.is_playing() {
        let delta = whole - m.credited;
        m.credited = whole;
        state.session.add_score(delta);
    }
}

fn steer(state: &mut GameState, input: &FrameInput, dt: f32) {
    let t = &state.tuning.runner;
    let player = &mut state.player;

    // One lane per press, clamped to the road
    if input.left && player.lane > 0 {
        player.lane -= 1;
    }
    if input.right && player.lane + 1 < t.lanes.len() {
        player.lane += 1;
    }
    player.pos.x = approach(player.pos.x, t.lanes[player.lane], t.lane_speed * dt);

    if input.jump && !player.mode.airborne && !player.mode.ducking {
        player.mode.airborne = true;
        player.vel.y = t.jump_speed;
    }
    player.mode.ducking = input.duck && !player.mode.airborne;
}

fn spawn(state: &mut GameState, dt: f32) {
    let t = state.tuning.runner.clone();
    let speed = mode(&mut state.mode).speed;
    let vel = Vec3::new(0.0, 0.0, speed);

    if state.spawner.roll(t.obstacle_chance, dt) {
        let shapes = SpawnTable::uniform(&[ObstacleShape::Box, ObstacleShape::Pyramid, ObstacleShape::Bar]);
        let shape = state.spawner.pick(&shapes).unwrap_or(ObstacleShape::Box);
        let lane = state.spawner.index(t.lanes.len());
        let z = state.spawner.range(t.obstacle_spawn_z.0, t.obstacle_spawn_z.1);
        let pos = Vec3::new(t.lanes[lane], shape.center_height(), z);
        state.entities.spawn(pos, vel, EntityBody::Obstacle { shape, lane });
    }

    if state.spawner.roll(t.coin_chance, dt) {
        let lane = state.spawner.index(t.lanes.len());
        let z = state.spawner.range(t.coin_spawn_z.0, t.coin_spawn_z.1);
        let pos = Vec3::new(t.lanes[lane], t.coin_y, z);
        state.entities.spawn(pos, vel, EntityBody::Coin { lane, spin: 0.0 });
    }

    RetireBoundary::behind(Vec3::NEG_Z, t.retire_behind).retire(
        &mut state.entities,
        Vec3::ZERO,
        |e| matches!(e.kind(), EntityKind::Obstacle | EntityKind::Coin),
    );
}

pub fn step(state: &mut GameState, input: &FrameInput, dt: f32, events: &mut Vec<GameEvent>) {
    let t = state.tuning.runner.clone();

    steer(state, input, dt);

    // Integrate: scroll speed ramps up, world moves toward the player
    let speed = {
        let m = mode(&mut state.mode);
        m.speed += t.acceleration * dt;
        m.distance += m.speed * dt;
        m.speed
    };
    step_player(&mut state.player, t.gravity, dt);
    if state.player.mode.airborne {
        if state.player.pos.y <= t.ground_y {
            state.player.pos.y = t.ground_y;
            state.player.vel.y = 0.0;
            state.player.mode.airborne = false;
        }
    } else {
        state.player.pos.y = if state.player.mode.ducking { t.duck_y } else { t.ground_y };
    }
    for e in state.entities.iter_mut() {
        if matches!(e.kind(), EntityKind::Obstacle | EntityKind::Coin) {
            e.vel.z = speed;
        }
    }
    step_entities(&mut state.entities, dt);
    credit_distance(state);

    spawn(state, dt);

    // Collide
    let half = if state.player.mode.ducking { DUCK_HALF } else { PLAYER_HALF };
    let probe = Probe::Box {
        bounds: Aabb::from_center(state.player.pos, half),
        radius: PICKUP_RADIUS + 0.5,
    };
    let contacts = detect_contacts(probe, &state.entities, |e| {
        matches!(e.kind(), EntityKind::Obstacle | EntityKind::Coin)
    });

    for contact in contacts {
        if !state.session.is_playing() {
            break;
        }
        match contact.kind {
            EntityKind::Coin => {
                state.entities.remove(contact.entity);
                mode(&mut state.mode).distance += t.coin_bonus;
                credit_distance(state);
                events.push(GameEvent::CoinCollected { coin: contact.entity });
            }
            EntityKind::Obstacle => lethal_hit(state, contact.entity, contact.kind, events),
            _ => {}
        }
    }
}
