//! Player progress and leaderboards
//!
//! Everything goes through a [`PersistenceGateway`], so the simulation never
//! talks to a storage backend directly. Failures are logged and surface as
//! missing data in a [`FlushOutcome`](crate::sim::FlushOutcome); they never
//! stop a run.

pub mod context;
pub mod gateway;
#[cfg(target_arch = "wasm32")]
pub mod local_storage;
pub mod record;
pub mod tracker;

pub use context::PlayerContext;
pub use gateway::{MemoryGateway, PersistenceError, PersistenceGateway};
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageGateway;
pub use record::PlayerRecord;
pub use tracker::ProgressTracker;
