//! Arcade Loop - shared update loop for a family of 2.5D arcade games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, kinematics, collisions, session)
//! - `games`: Per-game rules (cube jumper, runner, space shooter, racing)
//! - `persistence`: Player records and leaderboards behind a gateway
//! - `platform`: Keyboard and touch input polling
//! - `driver`: Frame loop glue between simulation and persistence
//! - `tuning`: Data-driven game balance

pub mod driver;
pub mod games;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use driver::FrameDriver;
pub use leaderboard::Leaderboard;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the driver will simulate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Nominal frames per second the per-frame tuning values were authored at
    pub const NOMINAL_FPS: f32 = 60.0;

    /// Default number of leaderboard rows fetched after a run
    pub const LEADERBOARD_LIMIT: usize = 10;
}

/// The four games sharing this loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    CubeJumper,
    Runner,
    SpaceShooter,
    Racing,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [
        GameKind::CubeJumper,
        GameKind::Runner,
        GameKind::SpaceShooter,
        GameKind::Racing,
    ];

    /// Stable identifier used as the storage key segment
    pub fn id(&self) -> &'static str {
        match self {
            GameKind::CubeJumper => "cube-jumper",
            GameKind::Runner => "runner-3d",
            GameKind::SpaceShooter => "space-shooter",
            GameKind::Racing => "racing",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.id() == id)
    }

    /// Single-life games end on the first lethal collision
    pub fn single_life(&self) -> bool {
        matches!(self, GameKind::Runner)
    }
}

/// Format seconds as `m:ss`
pub fn format_time(seconds: f32) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format an integer with thousands separators (`1234567` -> `1,234,567`)
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
