//! Game state and core simulation types

use glam::Vec3;

use super::entity::EntityStore;
use super::session::Session;
use super::spawn::SpawnScheduler;
use crate::games::{self, GameMode};
use crate::settings::Settings;
use crate::tuning::Tuning;
use crate::GameKind;

/// Discrete player mode flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerMode {
    pub airborne: bool,
    pub ducking: bool,
    /// Cube jumper: jump button held, power building up
    pub charging: bool,
}

/// The player avatar
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Vec3,
    pub vel: Vec3,
    pub mode: PlayerMode,
    /// Runner lane index (0..3)
    pub lane: usize,
    /// Racing heading (radians, 0 = +z)
    pub heading: f32,
    /// Racing forward speed (negative when reversing)
    pub speed: f32,
    /// Racing steering input after smoothing
    pub steer: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            mode: PlayerMode::default(),
            lane: 1,
            heading: 0.0,
            speed: 0.0,
            steer: 0.0,
        }
    }
}

impl Player {
    pub fn at(pos: Vec3) -> Self {
        Self {
            pos,
            ..Self::default()
        }
    }
}

/// Complete simulation state for one game
#[derive(Debug, Clone)]
pub struct GameState {
    pub game: GameKind,
    /// Run seed; each restart derives its RNG from seed + generation
    pub seed: u64,
    pub session: Session,
    pub player: Player,
    pub entities: EntityStore,
    pub spawner: SpawnScheduler,
    pub tuning: Tuning,
    /// Particle budget from settings
    pub max_particles: usize,
    /// Per-game state
    pub mode: GameMode,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    pub fn new(game: GameKind, seed: u64, tuning: Tuning, settings: &Settings) -> Self {
        let session = Session::new(games::initial_lives(game, &tuning));
        let mut state = Self {
            game,
            seed,
            session,
            player: Player::default(),
            entities: EntityStore::new(settings.max_entities),
            spawner: SpawnScheduler::new(seed),
            tuning,
            max_particles: settings.max_particles(),
            mode: GameMode::new(game),
            time_ticks: 0,
        };
        games::setup(&mut state);
        state
    }

    /// Start or restart the run: counters, entities and player all reset
    pub fn restart(&mut self) -> bool {
        if !self.session.start() {
            return false;
        }
        self.entities.clear();
        self.player = Player::default();
        self.mode = GameMode::new(self.game);
        self.spawner = SpawnScheduler::new(self.seed.wrapping_add(self.session.generation));
        self.time_ticks = 0;
        games::setup(self);
        true
    }

    /// Live particle count
    pub fn particle_count(&self) -> usize {
        self.entities.count(super::entity::EntityKind::Particle)
    }
}
