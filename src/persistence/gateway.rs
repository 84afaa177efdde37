//! Storage boundary for player records and leaderboards

use std::collections::HashMap;

use thiserror::Error;

use super::record::PlayerRecord;
use crate::GameKind;
use crate::leaderboard::{Leaderboard, LeaderboardEntry};

#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Backend not reachable (offline, storage disabled, ...)
    #[error("persistence backend unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode or decode stored data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage write failed for '{key}'")]
    Write { key: String },
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// The four operations the games need from a backend
pub trait PersistenceGateway {
    /// `Ok(None)` when the player has no record for this game yet
    fn load_player_record(&self, user_id: &str, game: GameKind) -> PersistenceResult<Option<PlayerRecord>>;

    fn save_player_record(&mut self, user_id: &str, game: GameKind, record: &PlayerRecord) -> PersistenceResult<()>;

    fn submit_leaderboard_entry(&mut self, game: GameKind, entry: LeaderboardEntry) -> PersistenceResult<()>;

    /// Best `limit` entries, highest score first
    fn query_top_leaderboard(&self, game: GameKind, limit: usize) -> PersistenceResult<Vec<LeaderboardEntry>>;
}

/// Storage path of a player's record, shared by the key-value backends
pub fn record_key(user_id: &str, game: GameKind) -> String {
    format!("players/{}/games/{}", user_id, game.id())
}

pub fn leaderboard_key(game: GameKind) -> String {
    format!("leaderboards/{}", game.id())
}

/// In-process backend for native builds and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    records: HashMap<String, PlayerRecord>,
    boards: HashMap<GameKind, Leaderboard>,
    /// When set every call fails with `Unavailable`
    pub offline: bool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_online(&self) -> PersistenceResult<()> {
        if self.offline {
            return Err(PersistenceError::Unavailable("memory gateway offline".to_string()));
        }
        Ok(())
    }

    /// Full leaderboard, for inspection
    pub fn board(&self, game: GameKind) -> Option<&Leaderboard> {
        self.boards.get(&game)
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load_player_record(&self, user_id: &str, game: GameKind) -> PersistenceResult<Option<PlayerRecord>> {
        self.check_online()?;
        Ok(self.records.get(&record_key(user_id, game)).cloned())
    }

    fn save_player_record(&mut self, user_id: &str, game: GameKind, record: &PlayerRecord) -> PersistenceResult<()> {
        self.check_online()?;
        self.records.insert(record_key(user_id, game), record.clone());
        Ok(())
    }

    fn submit_leaderboard_entry(&mut self, game: GameKind, entry: LeaderboardEntry) -> PersistenceResult<()> {
        self.check_online()?;
        self.boards.entry(game).or_default().push(entry);
        Ok(())
    }

    fn query_top_leaderboard(&self, game: GameKind, limit: usize) -> PersistenceResult<Vec<LeaderboardEntry>> {
        self.check_online()?;
        Ok(self.boards.get(&game).map(|b| b.top(limit)).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_are_per_game() {
        let mut gw = MemoryGateway::new();
        let record = PlayerRecord {
            high_score: 10,
            ..Default::default()
        };
        gw.save_player_record("u1", GameKind::Runner, &record).unwrap();

        assert_eq!(
            gw.load_player_record("u1", GameKind::Runner).unwrap(),
            Some(record)
        );
        assert_eq!(gw.load_player_record("u1", GameKind::Racing).unwrap(), None);
        assert_eq!(gw.load_player_record("u2", GameKind::Runner).unwrap(), None);
    }

    #[test]
    fn test_offline_fails_every_call() {
        let mut gw = MemoryGateway {
            offline: true,
            ..Default::default()
        };
        assert!(matches!(
            gw.load_player_record("u1", GameKind::Runner),
            Err(PersistenceError::Unavailable(_))
        ));
        assert!(gw.save_player_record("u1", GameKind::Runner, &PlayerRecord::default()).is_err());
        assert!(gw.query_top_leaderboard(GameKind::Runner, 10).is_err());
    }

    #[test]
    fn test_keys() {
        assert_eq!(record_key("abc", GameKind::CubeJumper), "players/abc/games/cube-jumper");
        assert_eq!(leaderboard_key(GameKind::SpaceShooter), "leaderboards/space-shooter");
    }
}
