//! Session state machine and aggregate counters
//!
//! `Start -> Playing <-> Paused`, `Playing -> GameOver | Finished`.
//! Terminal states are left only through `start()`, which bumps the
//! generation so late persistence results from the previous run are ignored.

use serde::{Deserialize, Serialize};

use crate::leaderboard::LeaderboardEntry;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Waiting for the first start action
    Start,
    /// Active gameplay
    Playing,
    /// Update loop suspended, counters kept
    Paused,
    /// Run lost
    GameOver,
    /// Completion condition reached
    Finished,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::GameOver | SessionState::Finished)
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminal {
    GameOver,
    Finished,
}

/// Everything persistence needs when a run ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlushRequest {
    pub generation: u64,
    pub terminal: Terminal,
    pub score: u64,
    pub level: u32,
    /// Whole seconds played this run
    pub play_time: u64,
}

/// Result of a flush, applied later through `Session::accept`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlushOutcome {
    pub generation: u64,
    /// Stored high score after the flush (None when persistence failed)
    pub high_score: Option<u64>,
    pub new_high_score: bool,
    /// Top-N leaderboard (None when the query failed)
    pub leaderboard: Option<Vec<LeaderboardEntry>>,
}

/// Persistence-derived display data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    pub high_score: Option<u64>,
    pub new_high_score: bool,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// The current playthrough
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub state: SessionState,
    pub score: u64,
    pub combo: u32,
    pub lives: u8,
    /// Seconds spent in `Playing` this run
    pub elapsed: f32,
    pub level: u32,
    /// Increments on every start/restart
    pub generation: u64,
    pub scoreboard: Scoreboard,
    initial_lives: u8,
}

impl Session {
    pub fn new(initial_lives: u8) -> Self {
        let initial_lives = initial_lives.max(1);
        Self {
            state: SessionState::Start,
            score: 0,
            combo: 0,
            lives: initial_lives,
            elapsed: 0.0,
            level: 1,
            generation: 0,
            scoreboard: Scoreboard::default(),
            initial_lives,
        }
    }

    pub fn initial_lives(&self) -> u8 {
        self.initial_lives
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }

    /// Begin (or restart) a run. Ignored while a run is in progress.
    pub fn start(&mut self) -> bool {
        match self.state {
            SessionState::Start | SessionState::GameOver | SessionState::Finished => {
                self.score = 0;
                self.combo = 0;
                self.lives = self.initial_lives;
                self.elapsed = 0.0;
                self.level = 1;
                self.generation += 1;
                self.scoreboard.new_high_score = false;
                self.state = SessionState::Playing;
                log::info!("Session started (generation {})", self.generation);
                true
            }
            SessionState::Playing | SessionState::Paused => false,
        }
    }

    /// Playing <-> Paused. Returns the new state when it changed.
    pub fn toggle_pause(&mut self) -> Option<SessionState> {
        self.state = match self.state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            _ => return None,
        };
        log::info!("Session {:?}", self.state);
        Some(self.state)
    }

    pub fn advance_clock(&mut self, dt: f32) {
        if self.is_playing() {
            self.elapsed += dt;
        }
    }

    pub fn add_score(&mut self, points: u64) {
        if self.is_playing() {
            self.score += points;
        }
    }

    pub fn bump_combo(&mut self) {
        if self.is_playing() {
            self.combo += 1;
        }
    }

    pub fn reset_combo(&mut self) {
        if self.is_playing() {
            self.combo = 0;
        }
    }

    /// Remove one life; returns true when none are left
    pub fn lose_life(&mut self) -> bool {
        if self.is_playing() {
            self.lives = self.lives.saturating_sub(1);
        }
        self.lives == 0
    }

    pub fn level_up(&mut self) -> u32 {
        if self.is_playing() {
            self.level += 1;
        }
        self.level
    }

    /// Enter a terminal state. Only the first call of a run yields a request.
    pub fn end(&mut self, terminal: Terminal) -> Option<FlushRequest> {
        if !self.is_playing() {
            return None;
        }
        self.state = match terminal {
            Terminal::GameOver => SessionState::GameOver,
            Terminal::Finished => SessionState::Finished,
        };
        let request = FlushRequest {
            generation: self.generation,
            terminal,
            score: self.score,
            level: self.level,
            play_time: self.elapsed.floor() as u64,
        };
        log::info!(
            "Session {:?}: score {} in {}s (generation {})",
            self.state,
            request.score,
            request.play_time,
            request.generation
        );
        Some(request)
    }

    /// Apply a persistence result unless it belongs to an older run
    pub fn accept(&mut self, outcome: FlushOutcome) -> bool {
        if outcome.generation != self.generation {
            log::debug!(
                "Discarding stale flush outcome (generation {} != {})",
                outcome.generation,
                self.generation
            );
            return false;
        }
        if let Some(high) = outcome.high_score {
            self.scoreboard.high_score = Some(high);
        }
        self.scoreboard.new_high_score = outcome.new_high_score;
        if let Some(rows) = outcome.leaderboard {
            self.scoreboard.leaderboard = rows;
        }
        true
    }

    /// Seed the displayed high score from the stored record at load time
    pub fn set_known_high_score(&mut self, high: u64) {
        self.scoreboard.high_score = Some(high);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_frozen_outside_playing() {
        let mut s = Session::new(3);
        s.add_score(10);
        s.bump_combo();
        assert!(!s.lose_life());
        assert_eq!((s.score, s.combo, s.lives), (0, 0, 3));

        s.start();
        s.add_score(10);
        s.toggle_pause();
        s.add_score(10);
        s.lose_life();
        assert_eq!((s.score, s.lives), (10, 3));
    }

    #[test]
    fn test_pause_only_from_playing() {
        let mut s = Session::new(3);
        assert_eq!(s.toggle_pause(), None);
        s.start();
        assert_eq!(s.toggle_pause(), Some(SessionState::Paused));
        assert_eq!(s.toggle_pause(), Some(SessionState::Playing));
        s.end(Terminal::GameOver);
        assert_eq!(s.toggle_pause(), None);
    }

    #[test]
    fn test_end_yields_one_request() {
        let mut s = Session::new(1);
        s.start();
        s.add_score(42);
        let first = s.end(Terminal::GameOver);
        let second = s.end(Terminal::Finished);
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(s.state, SessionState::GameOver);
        assert_eq!(first.unwrap().score, 42);
    }

    #[test]
    fn test_restart_resets_counters() {
        let mut s = Session::new(3);
        s.start();
        s.add_score(500);
        s.bump_combo();
        s.lose_life();
        s.level_up();
        s.end(Terminal::GameOver);

        assert!(s.start());
        assert_eq!((s.score, s.combo, s.lives, s.level), (0, 0, 3, 1));
        assert_eq!(s.generation, 2);
        assert!(!s.start(), "start is ignored mid-run");
    }

    #[test]
    fn test_stale_outcome_discarded() {
        let mut s = Session::new(3);
        s.start();
        let request = s.end(Terminal::GameOver).unwrap();
        s.start();

        let outcome = FlushOutcome {
            generation: request.generation,
            high_score: Some(999),
            new_high_score: true,
            leaderboard: Some(vec![]),
        };
        assert!(!s.accept(outcome.clone()));
        assert_eq!(s.scoreboard.high_score, None);

        let fresh = FlushOutcome {
            generation: s.generation,
            ..outcome
        };
        assert!(s.accept(fresh));
        assert_eq!(s.scoreboard.high_score, Some(999));
        assert!(s.scoreboard.new_high_score);
    }
}
