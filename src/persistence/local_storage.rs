//! Browser LocalStorage backend
//!
//! Records and leaderboards are stored as JSON under the same paths a remote
//! database would use.

use web_sys::Storage;

use super::gateway::{PersistenceError, PersistenceGateway, PersistenceResult, leaderboard_key, record_key};
use super::record::PlayerRecord;
use crate::GameKind;
use crate::leaderboard::{Leaderboard, LeaderboardEntry};

#[derive(Debug, Clone)]
pub struct LocalStorageGateway {
    storage: Storage,
}

impl LocalStorageGateway {
    /// `None` when the browser has storage disabled
    pub fn new() -> Option<Self> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()?;
        Some(Self { storage })
    }

    fn read(&self, key: &str) -> PersistenceResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|_| PersistenceError::Unavailable(format!("cannot read '{}'", key)))
    }

    fn write(&self, key: &str, json: &str) -> PersistenceResult<()> {
        self.storage
            .set_item(key, json)
            .map_err(|_| PersistenceError::Write { key: key.to_string() })
    }

    fn load_board(&self, game: GameKind) -> PersistenceResult<Leaderboard> {
        match self.read(&leaderboard_key(game))? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Leaderboard::new()),
        }
    }
}

impl PersistenceGateway for LocalStorageGateway {
    fn load_player_record(&self, user_id: &str, game: GameKind) -> PersistenceResult<Option<PlayerRecord>> {
        match self.read(&record_key(user_id, game))? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save_player_record(&mut self, user_id: &str, game: GameKind, record: &PlayerRecord) -> PersistenceResult<()> {
        let json = serde_json::to_string(record)?;
        self.write(&record_key(user_id, game), &json)
    }

    fn submit_leaderboard_entry(&mut self, game: GameKind, entry: LeaderboardEntry) -> PersistenceResult<()> {
        let mut board = self.load_board(game)?;
        board.push(entry);
        let json = serde_json::to_string(&board)?;
        self.write(&leaderboard_key(game), &json)?;
        log::info!("Leaderboard for {} now has {} entries", game.id(), board.len());
        Ok(())
    }

    fn query_top_leaderboard(&self, game: GameKind, limit: usize) -> PersistenceResult<Vec<LeaderboardEntry>> {
        Ok(self.load_board(game)?.top(limit))
    }
}
