//! Per-game progress tracking on top of a gateway

use super::context::PlayerContext;
use super::gateway::{PersistenceGateway, PersistenceResult};
use super::record::PlayerRecord;
use crate::GameKind;
use crate::consts::LEADERBOARD_LIMIT;
use crate::leaderboard::LeaderboardEntry;
use crate::sim::session::{FlushOutcome, FlushRequest};

/// Keeps one game's player record in sync with the backend.
///
/// Every mutating call is a no-op until a signed-in player's record has been
/// loaded with [`init`](Self::init). Changes are written to the backend first
/// and only kept locally once the write succeeded.
#[derive(Debug)]
pub struct ProgressTracker<G: PersistenceGateway> {
    game: GameKind,
    gateway: G,
    context: Option<PlayerContext>,
    record: Option<PlayerRecord>,
    /// Rows returned with each flush
    leaderboard_limit: usize,
    /// New record whose leaderboard entry still has to be submitted
    pending_entry: Option<LeaderboardEntry>,
}

impl<G: PersistenceGateway> ProgressTracker<G> {
    pub fn new(game: GameKind, gateway: G, context: Option<PlayerContext>) -> Self {
        Self {
            game,
            gateway,
            context,
            record: None,
            leaderboard_limit: LEADERBOARD_LIMIT,
            pending_entry: None,
        }
    }

    pub fn with_leaderboard_limit(mut self, limit: usize) -> Self {
        self.leaderboard_limit = limit.max(1);
        self
    }

    pub fn game(&self) -> GameKind {
        self.game
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn is_signed_in(&self) -> bool {
        self.context.is_some()
    }

    pub fn record(&self) -> Option<&PlayerRecord> {
        self.record.as_ref()
    }

    pub fn high_score(&self) -> Option<u64> {
        self.record.as_ref().map(|r| r.high_score)
    }

    pub fn has_pending_entry(&self) -> bool {
        self.pending_entry.is_some()
    }

    /// Load the player's record, creating and storing a default one on first
    /// play. Returns false when nobody is signed in.
    pub fn init(&mut self, now: f64) -> PersistenceResult<bool> {
        let Some(ctx) = &self.context else {
            log::info!("No signed-in player for {}, progress will not be saved", self.game.id());
            return Ok(false);
        };
        match self.gateway.load_player_record(&ctx.user_id, self.game)? {
            Some(record) => {
                log::info!(
                    "Loaded {} record for {}: high score {}",
                    self.game.id(),
                    ctx.user_id,
                    record.high_score
                );
                self.record = Some(record);
            }
            None => {
                log::info!("Creating {} record for {}", self.game.id(), ctx.user_id);
                let mut record = PlayerRecord::default();
                record.last_played = Some(now);
                self.gateway.save_player_record(&ctx.user_id, self.game, &record)?;
                self.record = Some(record);
            }
        }
        Ok(true)
    }

    /// Apply `change` to a copy of the record, store it, then keep it.
    /// Returns false when there is no record to change.
    fn commit<F>(&mut self, now: f64, change: F) -> PersistenceResult<bool>
    where
        F: FnOnce(&mut PlayerRecord),
    {
        let (Some(ctx), Some(current)) = (&self.context, &self.record) else {
            return Ok(false);
        };
        let mut updated = current.clone();
        change(&mut updated);
        updated.last_played = Some(now);
        self.gateway.save_player_record(&ctx.user_id, self.game, &updated)?;
        self.record = Some(updated);
        Ok(true)
    }

    /// Record a finished run's score. Returns true for a new personal best,
    /// which is also submitted to the leaderboard.
    pub fn update_score(&mut self, score: u64, now: f64) -> PersistenceResult<bool> {
        let Some(best) = self.high_score() else {
            return Ok(false);
        };
        if score <= best {
            return Ok(false);
        }
        self.commit(now, |r| r.high_score = score)?;

        if let Some(ctx) = &self.context {
            self.pending_entry = Some(LeaderboardEntry {
                user_id: ctx.user_id.clone(),
                user_name: ctx.leaderboard_name().to_string(),
                score,
                timestamp: now,
            });
        }
        // The record is stored; a missing entry is retried on the next flush
        if let Err(e) = self.submit_pending() {
            log::warn!("Failed to submit {} leaderboard entry, will retry: {}", self.game.id(), e);
        }
        Ok(true)
    }

    /// Submit the leaderboard entry of the last record, if it is still owed
    fn submit_pending(&mut self) -> PersistenceResult<()> {
        let Some(entry) = self.pending_entry.clone() else {
            return Ok(());
        };
        log::info!("New {} high score {} by {}", self.game.id(), entry.score, entry.user_name);
        self.gateway.submit_leaderboard_entry(self.game, entry)?;
        self.pending_entry = None;
        Ok(())
    }

    /// Highest level reached only ever grows
    pub fn update_level(&mut self, level: u32, now: f64) -> PersistenceResult<()> {
        self.commit(now, |r| r.level = r.level.max(level)).map(|_| ())
    }

    pub fn increment_games_played(&mut self, now: f64) -> PersistenceResult<()> {
        self.commit(now, |r| r.games_played += 1).map(|_| ())
    }

    pub fn add_play_time(&mut self, seconds: u64, now: f64) -> PersistenceResult<()> {
        self.commit(now, |r| r.total_time += seconds).map(|_| ())
    }

    /// Top entries for this game; readable without signing in
    pub fn leaderboard(&self, limit: usize) -> PersistenceResult<Vec<LeaderboardEntry>> {
        self.gateway.query_top_leaderboard(self.game, limit)
    }

    /// End-of-run write: score, level and play time, then a fresh leaderboard.
    /// Failures are logged; the outcome carries whatever succeeded.
    pub fn flush(&mut self, request: &FlushRequest, now: f64) -> FlushOutcome {
        let mut ok = true;
        if let Err(e) = self.submit_pending() {
            log::warn!("Failed to resubmit {} leaderboard entry: {}", self.game.id(), e);
        }
        let new_high_score = self.update_score(request.score, now).unwrap_or_else(|e| {
            log::warn!("Failed to update {} score: {}", self.game.id(), e);
            ok = false;
            false
        });
        if let Err(e) = self.update_level(request.level, now) {
            log::warn!("Failed to update {} level: {}", self.game.id(), e);
            ok = false;
        }
        if let Err(e) = self.add_play_time(request.play_time, now) {
            log::warn!("Failed to add {} play time: {}", self.game.id(), e);
            ok = false;
        }
        let leaderboard = self
            .leaderboard(self.leaderboard_limit)
            .inspect_err(|e| log::warn!("Failed to load {} leaderboard: {}", self.game.id(), e))
            .ok();

        FlushOutcome {
            generation: request.generation,
            high_score: if ok { self.high_score() } else { None },
            new_high_score,
            leaderboard,
        }
    }
}
