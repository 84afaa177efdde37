//! Checkpoint racing: drive through every checkpoint as fast as possible

use glam::Vec3;

use super::end_run;
use crate::sim::collision::spheres_overlap;
use crate::sim::entity::{EntityBody, EntityId};
use crate::sim::kinematics::{apply_friction, step_entities, step_player};
use crate::sim::session::Terminal;
use crate::sim::state::GameState;
use crate::sim::tick::{FrameInput, GameEvent};

/// Analog input below this magnitude counts as released
const STEER_DEADZONE: f32 = 0.05;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RacingState {
    pub passed: u32,
    pub total: u32,
}

impl RacingState {
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.passed) as usize
    }
}

fn mode(mode: &mut super::GameMode) -> &mut RacingState {
    match mode {
        super::GameMode::Racing(m) => m,
        _ => unreachable!("racing rules on a non-racing state"),
    }
}

pub fn setup(state: &mut GameState) {
    state.player.pos = Vec3::ZERO;
    state.player.heading = 0.0;
    state.player.speed = 0.0;
    state.player.steer = 0.0;

    let mut total = 0;
    for (index, at) in state.tuning.racing.checkpoints.iter().enumerate() {
        let body = EntityBody::Checkpoint {
            index: index as u32,
            passed: false,
        };
        if state.entities.spawn(Vec3::from_array(*at), Vec3::ZERO, body).is_some() {
            total += 1;
        }
    }
    let m = mode(&mut state.mode);
    m.passed = 0;
    m.total = total;
}

/// Finishing bonus: faster than par earns points per second saved
pub fn time_bonus(par_time: f32, time_points: f32, elapsed: f32) -> u64 {
    ((par_time - elapsed).max(0.0) * time_points).floor() as u64
}

fn drive(state: &mut GameState, input: &FrameInput, dt: f32) {
    let t = &state.tuning.racing;
    let car = &mut state.player;

    let throttle = input.steer.y.clamp(-1.0, 1.0);
    if throttle.abs() > STEER_DEADZONE {
        car.speed = (car.speed + throttle * t.acceleration * dt)
            .clamp(-t.max_speed * t.reverse_ratio, t.max_speed);
    }

    // Left is a positive heading change
    let turn = input.steer.x.clamp(-1.0, 1.0);
    if turn.abs() > STEER_DEADZONE {
        car.steer = -turn * t.turn_rate;
    } else {
        car.steer = apply_friction(car.steer, t.turn_decay, dt);
    }

    car.speed = apply_friction(car.speed, t.friction, dt);
    if car.speed.abs() > t.min_steer_speed {
        car.heading += car.steer * car.speed.abs() * dt;
    }

    car.vel = Vec3::new(car.heading.sin(), 0.0, car.heading.cos()) * car.speed;
}

fn pass_checkpoints(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let radius = state.tuning.racing.checkpoint_radius;
    let car = state.player.pos;
    let reached: Vec<(EntityId, u32)> = state
        .entities
        .iter()
        .filter_map(|e| match e.body {
            EntityBody::Checkpoint { index, passed: false } if spheres_overlap(car, 0.0, e.pos, radius) => {
                Some((e.id, index))
            }
            _ => None,
        })
        .collect();

    for (id, index) in reached {
        if !state.session.is_playing() {
            break;
        }
        if let Some(EntityBody::Checkpoint { passed, .. }) = state.entities.get_mut(id).map(|e| &mut e.body) {
            *passed = true;
        }
        let remaining = {
            let m = mode(&mut state.mode);
            m.passed += 1;
            m.remaining()
        };
        state.session.add_score(state.tuning.racing.checkpoint_points);
        events.push(GameEvent::CheckpointPassed { index, remaining });
        log::debug!("Checkpoint {} passed, {} remaining", index, remaining);

        if remaining == 0 {
            let t = &state.tuning.racing;
            let bonus = time_bonus(t.par_time, t.time_points, state.session.elapsed);
            state.session.add_score(bonus);
            end_run(state, Terminal::Finished, events);
        }
    }
}

pub fn step(state: &mut GameState, input: &FrameInput, dt: f32, events: &mut Vec<GameEvent>) {
    drive(state, input, dt);
    step_player(&mut state.player, 0.0, dt);
    step_entities(&mut state.entities, dt);
    pass_checkpoints(state, events);
}
