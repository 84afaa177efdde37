//! Per-game rules on top of the shared simulation
//!
//! Each game runs the same frame order: controls, integrate, spawn/retire,
//! collide, resolve.

pub mod jumper;
pub mod racing;
pub mod runner;
pub mod shooter;

use glam::Vec3;

use crate::GameKind;
use crate::sim::entity::{EntityBody, EntityId, EntityKind};
use crate::sim::session::Terminal;
use crate::sim::state::GameState;
use crate::sim::tick::{FrameInput, GameEvent};
use crate::tuning::Tuning;

pub use jumper::JumperState;
pub use racing::RacingState;
pub use runner::RunnerState;
pub use shooter::ShooterState;

/// Game-specific state carried next to the shared simulation
#[derive(Debug, Clone, PartialEq)]
pub enum GameMode {
    CubeJumper(JumperState),
    Runner(RunnerState),
    SpaceShooter(ShooterState),
    Racing(RacingState),
}

impl GameMode {
    pub fn new(game: GameKind) -> Self {
        match game {
            GameKind::CubeJumper => GameMode::CubeJumper(JumperState::default()),
            GameKind::Runner => GameMode::Runner(RunnerState::default()),
            GameKind::SpaceShooter => GameMode::SpaceShooter(ShooterState::default()),
            GameKind::Racing => GameMode::Racing(RacingState::default()),
        }
    }
}

pub fn initial_lives(game: GameKind, tuning: &Tuning) -> u8 {
    match game {
        GameKind::Runner => tuning.runner.lives,
        GameKind::SpaceShooter => tuning.shooter.lives,
        GameKind::CubeJumper | GameKind::Racing => 1,
    }
}

/// Place the player and the initial entities for a fresh run
pub fn setup(state: &mut GameState) {
    match state.game {
        GameKind::CubeJumper => jumper::setup(state),
        GameKind::Runner => runner::setup(state),
        GameKind::SpaceShooter => shooter::setup(state),
        GameKind::Racing => racing::setup(state),
    }
}

/// One playing frame
pub fn step(state: &mut GameState, input: &FrameInput, dt: f32, events: &mut Vec<GameEvent>) {
    match state.game {
        GameKind::CubeJumper => jumper::step(state, input, dt, events),
        GameKind::Runner => runner::step(state, input, dt, events),
        GameKind::SpaceShooter => shooter::step(state, input, dt, events),
        GameKind::Racing => racing::step(state, input, dt, events),
    }
}

/// Terminal transition; emits the flush event at most once per run
pub(crate) fn end_run(state: &mut GameState, terminal: Terminal, events: &mut Vec<GameEvent>) {
    if let Some(request) = state.session.end(terminal) {
        events.push(GameEvent::Ended(request));
    }
}

/// Lethal contact: costs one life, ends the run at zero
pub(crate) fn lethal_hit(
    state: &mut GameState,
    by: EntityId,
    kind: EntityKind,
    events: &mut Vec<GameEvent>,
) {
    if !state.session.is_playing() {
        return;
    }
    let out = state.session.lose_life() || state.game.single_life();
    events.push(GameEvent::PlayerHit {
        by,
        kind,
        lives_left: state.session.lives,
    });
    if out {
        end_run(state, Terminal::GameOver, events);
    }
}

/// Burst of particles, limited by the particle budget
pub(crate) fn explode(state: &mut GameState, at: Vec3, count: usize, speed: f32) {
    let budget = state.max_particles.saturating_sub(state.particle_count());
    for _ in 0..count.min(budget) {
        let vel = state.spawner.jitter(Vec3::splat(speed));
        if state
            .entities
            .spawn(at, vel, EntityBody::Particle { life: 1.0 })
            .is_none()
        {
            break;
        }
    }
}
