//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::entity::{EntityId, EntityKind};
use super::session::{FlushRequest, SessionState};
use super::state::GameState;
use crate::games;

/// Input snapshot for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Analog steering in [-1, 1]; x = right, y = up/forward
    pub steer: Vec2,
    /// Jump/charge button held
    pub jump: bool,
    /// Duck button held
    pub duck: bool,
    /// Fire button held
    pub fire: bool,
    /// One-shot lane change to the left
    pub left: bool,
    /// One-shot lane change to the right
    pub right: bool,
    /// Start/restart (one-shot)
    pub start: bool,
    /// Pause toggle (one-shot)
    pub pause: bool,
}

impl FrameInput {
    /// Clear one-shot inputs after they were consumed by a tick
    pub fn clear_one_shots(&mut self) {
        self.left = false;
        self.right = false;
        self.start = false;
        self.pause = false;
    }
}

/// Things that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started { generation: u64 },
    Paused,
    Resumed,
    Landed { platform: EntityId, points: u64 },
    CoinCollected { coin: EntityId },
    PlayerHit { by: EntityId, kind: EntityKind, lives_left: u8 },
    TargetHit { target: EntityId, points: u64 },
    EntityDestroyed { entity: EntityId, kind: EntityKind, points: u64 },
    CheckpointPassed { index: u32, remaining: usize },
    LevelUp { level: u32 },
    /// Terminal transition; carries the one persistence flush for the run
    Ended(FlushRequest),
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &FrameInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Handle pause toggle
    if input.pause {
        match state.session.toggle_pause() {
            Some(SessionState::Paused) => events.push(GameEvent::Paused),
            Some(SessionState::Playing) => events.push(GameEvent::Resumed),
            _ => {}
        }
    }

    if input.start && state.restart() {
        events.push(GameEvent::Started {
            generation: state.session.generation,
        });
    }

    // Don't tick unless playing
    if !state.session.is_playing() {
        return events;
    }

    state.time_ticks += 1;
    state.session.advance_clock(dt);

    games::step(state, input, dt, &mut events);

    events
}
