//! Session state machine: countdown, pause handling and round lifecycle.
//!
//! The controller is synchronous and owns every piece of mutable game state.
//! Whoever drives it (see `game_loop`) must deliver events one at a time.
//! Ticks carry the generation they were scheduled under; any tick whose
//! generation no longer matches is dropped, so a timer that fires after a
//! stop, pause or reset can never touch the field.

use crate::bubble::BubbleId;
use crate::category::Category;
use crate::config::{EngineConfig, GameConfig};
use crate::field::{BubbleField, FieldTick};
use crate::placement::PlacementEngine;
use crate::scoring::ScoringEngine;
use crate::vec2::{FieldSize, Vec2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use bubblepop_shared::protocol::SessionState;

/// End-of-round result handed to the score keeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub player_name: String,
    pub final_score: u64,
}

/// A successful pop.
#[derive(Debug, Clone, PartialEq)]
pub struct PopOutcome {
    pub id: BubbleId,
    pub category: Category,
    pub points: u32,
    pub score: u64,
    /// Replacement bubble, if one fit
    pub refilled: Option<BubbleId>,
}

/// A processed countdown tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub field: FieldTick,
    pub remaining_time: u32,
    /// Set on the tick that ends the round, and only then
    pub ended: Option<SessionSummary>,
}

pub struct SessionController {
    game: GameConfig,
    state: SessionState,
    remaining_time: u32,
    field: BubbleField,
    scoring: ScoringEngine,
    rng: ChaCha8Rng,
    /// Bumped every time ticking starts or stops
    generation: u64,
}

impl SessionController {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            game: GameConfig::default(),
            state: SessionState::Idle,
            remaining_time: 0,
            field: BubbleField::new(
                FieldSize::default(),
                0,
                PlacementEngine::new(config.placement),
            ),
            scoring: ScoringEngine::new(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            generation: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u64 {
        self.scoring.score()
    }

    pub fn last_popped(&self) -> Option<Category> {
        self.scoring.last_popped()
    }

    pub fn remaining_time(&self) -> u32 {
        self.remaining_time
    }

    pub fn player_name(&self) -> &str {
        &self.game.player_name
    }

    pub fn field(&self) -> &BubbleField {
        &self.field
    }

    /// Generation ticks must carry right now, or None when ticks are stopped.
    pub fn tick_generation(&self) -> Option<u64> {
        (self.state == SessionState::Running).then_some(self.generation)
    }

    /// Invalidate every tick scheduled so far.
    fn bump_generation(&mut self) {
        self.generation += 1;
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            player_name: self.game.player_name.clone(),
            final_score: self.scoring.score(),
        }
    }

    /// Fresh score, clock and field for the stored config, then run.
    fn begin_round(&mut self) {
        self.scoring.reset();
        self.remaining_time = self.game.game_time_secs;
        self.field.clear();
        self.field.set_target(self.game.max_bubbles as usize);
        let placed = self.field.populate(&mut self.rng);
        if placed == 0 {
            tracing::warn!(
                "No room for bubbles in {}x{} field",
                self.field.size().width,
                self.field.size().height
            );
        }
        self.state = SessionState::Running;
        self.bump_generation();
    }

    /// Idle -> Running. Time and bubble count below the minimums are raised.
    pub fn start(&mut self, config: GameConfig, size: FieldSize) -> bool {
        if self.state != SessionState::Idle {
            tracing::debug!("Ignoring start in {:?}", self.state);
            return false;
        }
        self.game = config.clamped();
        self.field.resize(size);
        self.begin_round();
        tracing::info!(
            "Session started for {} ({}s, {} bubbles, {} placed)",
            self.game.player_name,
            self.game.game_time_secs,
            self.game.max_bubbles,
            self.field.len()
        );
        true
    }

    /// Advance the countdown by one second. Returns None for ticks that are
    /// stale or arrive outside Running.
    pub fn tick(&mut self, generation: u64) -> Option<TickReport> {
        if self.state != SessionState::Running || generation != self.generation {
            tracing::debug!(
                "Dropping tick generation {} (current {}, {:?})",
                generation,
                self.generation,
                self.state
            );
            return None;
        }

        let field = self.field.tick(&mut self.rng);
        self.remaining_time = self.remaining_time.saturating_sub(1);
        tracing::debug!(
            "Tick: {}s left, {} expired, {} spawned",
            self.remaining_time,
            field.expired.len(),
            field.spawned
        );

        let ended = if self.remaining_time == 0 {
            self.state = SessionState::GameOver;
            self.bump_generation();
            let summary = self.summary();
            tracing::info!(
                "Game over for {} with {} points",
                summary.player_name,
                summary.final_score
            );
            Some(summary)
        } else {
            None
        };

        Some(TickReport {
            field,
            remaining_time: self.remaining_time,
            ended,
        })
    }

    /// Pop a bubble by id. Ignored unless running and the bubble is live.
    pub fn pop(&mut self, id: BubbleId) -> Option<PopOutcome> {
        if self.state != SessionState::Running {
            return None;
        }
        let bubble = self.field.remove(id)?;
        let points = self.scoring.pop(bubble.category);
        let refilled = self.field.refill_one(&mut self.rng);
        tracing::debug!(
            "Popped {:?} ({:?}) for {} points, score {}",
            id,
            bubble.category,
            points,
            self.scoring.score()
        );
        Some(PopOutcome {
            id,
            category: bubble.category,
            points,
            score: self.scoring.score(),
            refilled,
        })
    }

    /// Pop whatever bubble covers the point, if any.
    pub fn pop_at(&mut self, point: Vec2) -> Option<PopOutcome> {
        if self.state != SessionState::Running {
            return None;
        }
        let id = self.field.hit_test(point)?;
        self.pop(id)
    }

    /// User pause: Running -> PausedManual.
    pub fn pause(&mut self) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.state = SessionState::PausedManual;
        self.bump_generation();
        tracing::info!("Paused with {}s left", self.remaining_time);
        true
    }

    /// User resume from either pause state.
    pub fn resume(&mut self) -> bool {
        if !self.state.is_paused() {
            return false;
        }
        self.state = SessionState::Running;
        self.bump_generation();
        tracing::info!("Resumed with {}s left", self.remaining_time);
        true
    }

    /// Pause if running, resume if paused.
    pub fn pause_toggle(&mut self) -> bool {
        match self.state {
            SessionState::Running => self.pause(),
            SessionState::PausedManual | SessionState::PausedSystem => self.resume(),
            _ => false,
        }
    }

    /// App went to the background: Running -> PausedSystem.
    pub fn background(&mut self) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.state = SessionState::PausedSystem;
        self.bump_generation();
        tracing::info!("Paused by system with {}s left", self.remaining_time);
        true
    }

    /// App came back. Never resumes on its own; the player has to.
    pub fn foreground(&mut self) -> bool {
        tracing::debug!("Foreground in {:?}", self.state);
        false
    }

    /// GameOver -> Running with the same player and settings.
    pub fn reset(&mut self) -> bool {
        if self.state != SessionState::GameOver {
            return false;
        }
        self.begin_round();
        tracing::info!(
            "Session reset for {} ({} placed)",
            self.game.player_name,
            self.field.len()
        );
        true
    }

    /// Back to the menu from any active state: Idle, ready for a new start.
    /// The abandoned round produces no summary.
    pub fn quit(&mut self) -> bool {
        if self.state == SessionState::Idle {
            return false;
        }
        tracing::info!(
            "{} quit from {:?} with {} points",
            self.game.player_name,
            self.state,
            self.scoring.score()
        );
        self.state = SessionState::Idle;
        self.remaining_time = 0;
        self.scoring.reset();
        self.field.clear();
        self.bump_generation();
        true
    }

    /// New play-area size. Live bubbles are left where they are. An empty
    /// field in a running session is populated right away. Returns how many
    /// bubbles were added.
    pub fn resize(&mut self, size: FieldSize) -> usize {
        self.field.resize(size);
        if self.state == SessionState::Running && self.field.is_empty() {
            let placed = self.field.populate(&mut self.rng);
            tracing::debug!("Resize populated {} bubbles", placed);
            return placed;
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn roomy() -> FieldSize {
        FieldSize::new(600.0, 900.0)
    }

    fn running(time: u32, bubbles: u32) -> SessionController {
        let mut session = SessionController::new(&EngineConfig::default());
        assert!(session.start(GameConfig::new("Ada", time, bubbles), roomy()));
        session
    }

    fn tick(session: &mut SessionController) -> Option<TickReport> {
        let generation = session.tick_generation()?;
        session.tick(generation)
    }

    #[test]
    fn starts_idle() {
        let session = SessionController::new(&EngineConfig::default());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.tick_generation(), None);
        assert!(session.field().is_empty());
    }

    #[test]
    fn idle_ignores_everything_but_start() {
        let mut session = SessionController::new(&EngineConfig::default());
        assert!(session.tick(0).is_none());
        assert!(session.pop(BubbleId(1)).is_none());
        assert!(!session.pause_toggle());
        assert!(!session.background());
        assert!(!session.reset());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn start_clamps_minimums() {
        let mut session = SessionController::new(&EngineConfig::default());
        session.start(GameConfig::new("Ada", 1, 2), roomy());
        assert_eq!(session.remaining_time(), 5);
        assert_eq!(session.field().target(), 5);
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn start_populates_field() {
        let session = running(30, 10);
        assert!(!session.field().is_empty());
        assert!(session.field().len() <= 10);
        assert_eq!(session.score(), 0);
        assert_eq!(session.player_name(), "Ada");
    }

    #[test]
    fn second_start_is_ignored() {
        let mut session = running(30, 10);
        assert!(!session.start(GameConfig::new("Bob", 60, 15), roomy()));
        assert_eq!(session.player_name(), "Ada");
        assert_eq!(session.remaining_time(), 30);
    }

    #[test]
    fn times_out_after_game_time_ticks() {
        let mut session = running(5, 5);
        for expected in (1..5).rev() {
            let report = tick(&mut session).unwrap();
            assert_eq!(report.remaining_time, expected);
            assert!(report.ended.is_none());
            assert_eq!(session.state(), SessionState::Running);
        }
        let last = tick(&mut session).unwrap();
        assert_eq!(session.state(), SessionState::GameOver);
        assert_eq!(session.remaining_time(), 0);
        assert_eq!(
            last.ended,
            Some(SessionSummary {
                player_name: "Ada".to_string(),
                final_score: 0,
            })
        );
    }

    #[test]
    fn summary_emitted_once() {
        let mut session = running(5, 5);
        let mut summaries = 0;
        let generation = session.tick_generation().unwrap();
        for _ in 0..5 {
            if let Some(report) = tick(&mut session) {
                summaries += report.ended.iter().count();
            }
        }
        // a late tick with the old generation after game over
        assert!(session.tick(generation).is_none());
        assert!(tick(&mut session).is_none());
        assert_eq!(summaries, 1);
    }

    #[test]
    fn stale_generation_is_dropped() {
        let mut session = running(30, 5);
        let generation = session.tick_generation().unwrap();
        assert!(session.tick(generation + 1).is_none());
        assert!(session.tick(generation.wrapping_sub(1)).is_none());
        assert_eq!(session.remaining_time(), 30);
        assert!(session.tick(generation).is_some());
        assert_eq!(session.remaining_time(), 29);
    }

    #[test]
    fn pause_toggle_twice_returns_to_running() {
        let mut session = running(30, 5);
        assert!(session.pause_toggle());
        assert_eq!(session.state(), SessionState::PausedManual);
        assert!(session.pause_toggle());
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn no_tick_processed_while_paused() {
        let mut session = running(30, 5);
        let generation = session.tick_generation().unwrap();
        session.pause();
        assert_eq!(session.tick_generation(), None);
        assert!(session.tick(generation).is_none());
        assert_eq!(session.remaining_time(), 30);

        session.resume();
        // the pre-pause generation stays dead after resuming
        assert!(session.tick(generation).is_none());
        assert!(tick(&mut session).is_some());
        assert_eq!(session.remaining_time(), 29);
    }

    #[test]
    fn background_needs_user_resume() {
        let mut session = running(30, 5);
        assert!(session.background());
        assert_eq!(session.state(), SessionState::PausedSystem);
        assert!(!session.foreground());
        assert_eq!(session.state(), SessionState::PausedSystem);
        assert!(session.resume());
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn pause_toggle_resumes_system_pause() {
        let mut session = running(30, 5);
        session.background();
        assert!(session.pause_toggle());
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn background_while_manually_paused_is_noop() {
        let mut session = running(30, 5);
        session.pause();
        assert!(!session.background());
        assert_eq!(session.state(), SessionState::PausedManual);
    }

    #[test]
    fn pop_scores_and_refills() {
        let mut session = running(30, 10);
        let target = session.field().target();
        let bubble = session.field().bubbles()[0].clone();
        let outcome = session.pop(bubble.id).unwrap();
        assert_eq!(outcome.category, bubble.category);
        assert_eq!(outcome.points, bubble.category.points());
        assert_eq!(session.score(), u64::from(outcome.points));
        assert!(session.field().get(bubble.id).is_none());
        assert!(session.field().len() <= target);
    }

    #[test]
    fn pops_follow_combo_rule() {
        let mut session = running(60, 15);
        let mut mirror = ScoringEngine::new();
        for _ in 0..10 {
            let Some(bubble) = session.field().bubbles().first().cloned() else {
                break;
            };
            let expected = mirror.pop(bubble.category);
            let outcome = session.pop(bubble.id).unwrap();
            assert_eq!(outcome.points, expected);
        }
        assert_eq!(session.score(), mirror.score());
    }

    #[test]
    fn popping_twice_is_ignored() {
        let mut session = running(30, 5);
        let id = session.field().bubbles()[0].id;
        assert!(session.pop(id).is_some());
        let score = session.score();
        assert!(session.pop(id).is_none());
        assert_eq!(session.score(), score);
    }

    #[test]
    fn pop_ignored_while_paused() {
        let mut session = running(30, 5);
        let id = session.field().bubbles()[0].id;
        session.pause();
        assert!(session.pop(id).is_none());
        assert!(session.field().get(id).is_some());
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn pop_at_hits_bubble_center() {
        let mut session = running(30, 5);
        let bubble = session.field().bubbles()[0].clone();
        let outcome = session.pop_at(bubble.pos).unwrap();
        assert_eq!(outcome.id, bubble.id);
    }

    #[test]
    fn pop_at_in_margin_misses() {
        let mut session = running(30, 5);
        assert!(session.pop_at(Vec2::ZERO).is_none());
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn score_frozen_after_game_over() {
        let mut session = running(5, 5);
        for _ in 0..5 {
            tick(&mut session);
        }
        let id = session.field().bubbles().first().map(|b| b.id);
        if let Some(id) = id {
            assert!(session.pop(id).is_none());
        }
        assert_eq!(session.score(), 0);
        assert!(!session.pause_toggle());
    }

    #[test]
    fn reset_starts_new_round_with_same_player() {
        let mut session = running(5, 5);
        let id = session.field().bubbles()[0].id;
        session.pop(id);
        for _ in 0..5 {
            tick(&mut session);
        }
        let old_ids: HashSet<BubbleId> = session.field().bubbles().iter().map(|b| b.id).collect();

        assert!(session.reset());
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.score(), 0);
        assert_eq!(session.last_popped(), None);
        assert_eq!(session.remaining_time(), 5);
        assert_eq!(session.player_name(), "Ada");
        assert!(session
            .field()
            .bubbles()
            .iter()
            .all(|b| !old_ids.contains(&b.id)));
    }

    #[test]
    fn reset_only_from_game_over() {
        let mut session = running(30, 5);
        assert!(!session.reset());
        session.pause();
        assert!(!session.reset());
        assert_eq!(session.state(), SessionState::PausedManual);
    }

    #[test]
    fn reset_invalidates_old_generation() {
        let mut session = running(5, 5);
        let first_gen = session.tick_generation().unwrap();
        for _ in 0..5 {
            tick(&mut session);
        }
        session.reset();
        assert!(session.tick(first_gen).is_none());
        assert_eq!(session.remaining_time(), 5);
    }

    #[test]
    fn quit_after_game_over_allows_new_player() {
        let mut session = running(5, 5);
        for _ in 0..5 {
            tick(&mut session);
        }
        assert_eq!(session.state(), SessionState::GameOver);

        assert!(session.quit());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.tick_generation(), None);
        assert!(session.field().is_empty());
        assert_eq!(session.remaining_time(), 0);

        assert!(session.start(GameConfig::new("Bob", 20, 6), roomy()));
        assert_eq!(session.player_name(), "Bob");
        assert_eq!(session.remaining_time(), 20);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn quit_mid_round_drops_pending_ticks() {
        let mut session = running(30, 5);
        let id = session.field().bubbles()[0].id;
        session.pop(id);
        let generation = session.tick_generation().unwrap();

        assert!(session.quit());
        assert!(session.tick(generation).is_none());
        assert_eq!(session.score(), 0);
        assert_eq!(session.last_popped(), None);
        assert!(!session.quit());
    }

    #[test]
    fn quit_from_system_pause() {
        let mut session = running(30, 5);
        session.background();
        assert!(session.quit());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.resume());
    }

    #[test]
    fn degenerate_start_then_resize_populates() {
        let mut session = SessionController::new(&EngineConfig::default());
        session.start(GameConfig::new("Ada", 30, 8), FieldSize::default());
        assert_eq!(session.state(), SessionState::Running);
        assert!(session.field().is_empty());
        // the clock still runs on an empty field
        assert!(tick(&mut session).is_some());

        let placed = session.resize(roomy());
        assert!(placed > 0);
        assert_eq!(session.field().len(), placed);
    }

    #[test]
    fn resize_keeps_state_and_bubbles() {
        let mut session = running(30, 5);
        session.pause();
        let before = session.field().len();
        assert_eq!(session.resize(FieldSize::new(200.0, 200.0)), 0);
        assert_eq!(session.state(), SessionState::PausedManual);
        assert_eq!(session.field().len(), before);
        assert_eq!(session.field().size(), FieldSize::new(200.0, 200.0));
    }

    #[test]
    fn same_seed_same_game() {
        let mut a = running(10, 10);
        let mut b = running(10, 10);
        for _ in 0..5 {
            tick(&mut a);
            tick(&mut b);
        }
        assert_eq!(a.field().bubbles(), b.field().bubbles());
    }
}
