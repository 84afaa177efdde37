//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod kinematics;
pub mod session;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Aabb, Contact, Hit, Probe, detect_contacts, is_landing, projectile_hits};
pub use entity::{BulletOwner, Entity, EntityBody, EntityId, EntityKind, EntityStore, ObstacleShape};
pub use session::{FlushOutcome, FlushRequest, Scoreboard, Session, SessionState, Terminal};
pub use spawn::{RetireBoundary, SpawnScheduler, SpawnTable};
pub use state::{GameState, Player, PlayerMode};
pub use tick::{FrameInput, GameEvent, tick};
