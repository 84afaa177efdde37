//! Frame driver
//!
//! Turns variable-length display frames into fixed simulation ticks and
//! connects simulation events to persistence. Persistence results are
//! queued and applied on the following frame, after that frame's ticks, so
//! a run restarted in between sees them as stale.

use std::collections::VecDeque;

use crate::GameKind;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::persistence::{PersistenceGateway, ProgressTracker};
use crate::platform::now_ms;
use crate::settings::Settings;
use crate::sim::session::FlushOutcome;
use crate::sim::state::GameState;
use crate::sim::tick::{FrameInput, GameEvent, tick};
use crate::tuning::Tuning;

/// Rolling frames-per-second over the last 60 frames
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self {
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }
}

impl FpsCounter {
    /// Record a frame timestamp (ms)
    pub fn record(&mut self, time: f64) {
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        // Oldest sample is the one we'll overwrite next, 59 frames back
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = time - oldest;
            if elapsed > 0.0 {
                let intervals = (self.frame_times.len() - 1) as f64;
                self.fps = (intervals * 1000.0 / elapsed).round() as u32;
            }
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

pub struct FrameDriver<G: PersistenceGateway> {
    state: GameState,
    tracker: ProgressTracker<G>,
    accumulator: f32,
    /// One-shot inputs from frames too short to run a tick
    carried: FrameInput,
    /// Persistence results waiting for the next frame
    inbox: VecDeque<FlushOutcome>,
    fps: FpsCounter,
}

impl<G: PersistenceGateway> FrameDriver<G> {
    pub fn new(game: GameKind, seed: u64, tuning: Tuning, settings: &Settings, tracker: ProgressTracker<G>) -> Self {
        let mut tracker = tracker.with_leaderboard_limit(settings.leaderboard_size);
        let mut state = GameState::new(game, seed, tuning, settings);
        if let Err(e) = tracker.init(now_ms()) {
            log::warn!("Failed to load {} progress: {}", game.id(), e);
        }
        if let Some(high) = tracker.high_score() {
            state.session.set_known_high_score(high);
        }
        log::info!("Frame driver ready for {} (seed {})", game.id(), seed);
        Self {
            state,
            tracker,
            accumulator: 0.0,
            carried: FrameInput::default(),
            inbox: VecDeque::new(),
            fps: FpsCounter::default(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn tracker(&self) -> &ProgressTracker<G> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ProgressTracker<G> {
        &mut self.tracker
    }

    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }

    pub fn record_frame_time(&mut self, time: f64) {
        self.fps.record(time);
    }

    /// Outcomes not yet applied
    pub fn pending_outcomes(&self) -> usize {
        self.inbox.len()
    }

    /// Hand in a persistence result produced elsewhere (e.g. an async backend)
    pub fn deliver(&mut self, outcome: FlushOutcome) {
        self.inbox.push_back(outcome);
    }

    /// Advance by one display frame. Returns every event the ticks produced.
    pub fn frame(&mut self, raw_dt: f32, input: &FrameInput) -> Vec<GameEvent> {
        let dt = if raw_dt.is_finite() {
            raw_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        // Only results from earlier frames are applied this frame
        let ready: Vec<FlushOutcome> = self.inbox.drain(..).collect();

        let mut input = input.clone();
        input.left |= self.carried.left;
        input.right |= self.carried.right;
        input.start |= self.carried.start;
        input.pause |= self.carried.pause;

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let tick_events = tick(&mut self.state, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // One-shot inputs only apply to the first substep
            input.clear_one_shots();
            self.react(&tick_events);
            events.extend(tick_events);
        }
        self.carried = if substeps == 0 { input } else { FrameInput::default() };

        for outcome in ready {
            self.state.session.accept(outcome);
        }
        events
    }

    fn react(&mut self, events: &[GameEvent]) {
        let now = now_ms();
        for event in events {
            match event {
                GameEvent::Started { .. } => {
                    if let Err(e) = self.tracker.increment_games_played(now) {
                        log::warn!("Failed to count game: {}", e);
                    }
                }
                GameEvent::LevelUp { level } => {
                    if let Err(e) = self.tracker.update_level(*level, now) {
                        log::warn!("Failed to store level {}: {}", level, e);
                    }
                }
                GameEvent::Ended(request) => {
                    let outcome = self.tracker.flush(request, now);
                    self.inbox.push_back(outcome);
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryGateway, PersistenceGateway, PlayerContext};
    use crate::sim::session::SessionState;
    use glam::Vec3;

    fn driver(game: GameKind) -> FrameDriver<MemoryGateway> {
        let ctx = PlayerContext::new("u1").with_display_name("Ada");
        let tracker = ProgressTracker::new(game, MemoryGateway::new(), Some(ctx));
        FrameDriver::new(game, 99, Tuning::default(), &Settings::default(), tracker)
    }

    fn start() -> FrameInput {
        FrameInput {
            start: true,
            ..Default::default()
        }
    }

    /// Put the jumper player into free fall far below the world
    fn fall(d: &mut FrameDriver<MemoryGateway>) {
        let player = &mut d.state_mut().player;
        player.pos = Vec3::new(100.0, -19.99, 100.0);
        player.vel = Vec3::new(0.0, -30.0, 0.0);
        player.mode.airborne = true;
    }

    #[test]
    fn test_substeps_follow_frame_time() {
        let mut d = driver(GameKind::Racing);
        d.frame(SIM_DT, &start());
        assert_eq!(d.state().time_ticks, 1);

        d.frame(SIM_DT * 2.5, &FrameInput::default());
        assert_eq!(d.state().time_ticks, 3);

        // Long stalls are clamped
        d.frame(5.0, &FrameInput::default());
        let ticks = d.state().time_ticks;
        assert!((8..=9).contains(&ticks), "ticks = {}", ticks);
    }

    #[test]
    fn test_one_shots_apply_to_first_substep_only() {
        let mut d = driver(GameKind::Runner);
        d.state_mut().tuning.runner.obstacle_chance = 0.0;
        d.frame(SIM_DT, &start());
        d.state_mut().player.lane = 0;
        let right = FrameInput {
            right: true,
            ..Default::default()
        };
        d.frame(SIM_DT * 4.0, &right);
        assert_eq!(d.state().player.lane, 1);
    }

    #[test]
    fn test_short_frame_keeps_one_shot() {
        let mut d = driver(GameKind::SpaceShooter);
        d.frame(SIM_DT * 0.5, &start());
        assert_eq!(d.state().session.state, SessionState::Start);
        d.frame(SIM_DT * 0.6, &FrameInput::default());
        assert_eq!(d.state().session.state, SessionState::Playing);
    }

    #[test]
    fn test_started_counts_games_played() {
        let mut d = driver(GameKind::Racing);
        d.frame(SIM_DT, &start());
        assert_eq!(d.tracker().record().unwrap().games_played, 1);
    }

    #[test]
    fn test_flush_applied_next_frame() {
        let mut d = driver(GameKind::CubeJumper);
        d.frame(SIM_DT, &start());
        d.state_mut().session.add_score(30);
        fall(&mut d);

        let events = d.frame(SIM_DT, &FrameInput::default());
        let ended = events.iter().filter(|e| matches!(e, GameEvent::Ended(_))).count();
        assert_eq!(ended, 1);
        assert_eq!(d.pending_outcomes(), 1);
        assert_eq!(d.state().session.scoreboard.high_score, Some(0));

        d.frame(SIM_DT, &FrameInput::default());
        assert_eq!(d.pending_outcomes(), 0);
        let board = &d.state().session.scoreboard;
        assert_eq!(board.high_score, Some(30));
        assert!(board.new_high_score);
        assert_eq!(board.leaderboard.len(), 1);
        assert_eq!(d.tracker().gateway().board(GameKind::CubeJumper).unwrap().len(), 1);
    }

    #[test]
    fn test_leaderboard_size_setting_limits_rows() {
        let settings = Settings {
            leaderboard_size: 2,
            ..Settings::default()
        };
        let mut gateway = MemoryGateway::new();
        for (user, score) in [("a", 900), ("b", 800), ("c", 700)] {
            let entry = crate::leaderboard::LeaderboardEntry {
                user_id: user.to_string(),
                user_name: user.to_string(),
                score,
                timestamp: 0.0,
            };
            gateway.submit_leaderboard_entry(GameKind::CubeJumper, entry).unwrap();
        }
        let ctx = PlayerContext::new("u1").with_display_name("Ada");
        let tracker = ProgressTracker::new(GameKind::CubeJumper, gateway, Some(ctx));
        let mut d = FrameDriver::new(GameKind::CubeJumper, 99, Tuning::default(), &settings, tracker);

        d.frame(SIM_DT, &start());
        fall(&mut d);
        d.frame(SIM_DT, &FrameInput::default());
        d.frame(SIM_DT, &FrameInput::default());

        let rows = &d.state().session.scoreboard.leaderboard;
        let scores: Vec<u64> = rows.iter().map(|e| e.score).collect();
        assert_eq!(scores, [900, 800]);
    }

    #[test]
    fn test_stale_outcome_discarded_after_restart() {
        let mut d = driver(GameKind::CubeJumper);
        d.frame(SIM_DT, &start());
        d.state_mut().session.add_score(30);
        fall(&mut d);
        d.frame(SIM_DT, &FrameInput::default());
        assert_eq!(d.state().session.state, SessionState::GameOver);

        // Restart lands before the outcome is applied
        d.frame(SIM_DT, &start());
        assert_eq!(d.state().session.generation, 2);
        assert_eq!(d.state().session.scoreboard.high_score, Some(0));
        assert!(!d.state().session.scoreboard.new_high_score);

        // Stored data still reflects the finished run
        assert_eq!(d.tracker().high_score(), Some(30));
    }

    #[test]
    fn test_delivered_outcome_for_current_run() {
        let mut d = driver(GameKind::Racing);
        d.frame(SIM_DT, &start());
        d.deliver(FlushOutcome {
            generation: 1,
            high_score: Some(777),
            ..Default::default()
        });
        d.deliver(FlushOutcome {
            generation: 0,
            high_score: Some(5),
            ..Default::default()
        });
        d.frame(SIM_DT, &FrameInput::default());
        assert_eq!(d.state().session.scoreboard.high_score, Some(777));
    }

    #[test]
    fn test_fps_counter() {
        let mut fps = FpsCounter::default();
        for i in 0..120 {
            fps.record(i as f64 * 1000.0 / 60.0);
        }
        assert_eq!(fps.fps(), 60);
    }
}
