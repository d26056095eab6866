//! Simulated players for the demo driver and the soak tool.
//!
//! An autoplayer is a small state machine that:
//! - Watches frames as they are broadcast
//! - Waits a personality-dependent delay between taps
//! - Returns the point it wants to tap via `tick()`

use crate::category::Category;
use crate::protocol::{BubbleWire, FrameMsg, SessionState};
use crate::vec2::{vec2, Vec2};
use rand::Rng;

/// Personality affects tap timing and aim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Personality {
    /// Taps fast (0.3-0.8s) and goes for the most valuable bubble
    Eager,
    /// Takes its time (1.5-4.0s) and picks any bubble
    Relaxed,
    /// Unpredictable timing (0.2-6.0s) and sloppy aim that sometimes misses
    Chaotic,
}

impl Personality {
    /// Delay range between taps (min, max) in seconds
    fn delay_range(&self) -> (f64, f64) {
        match self {
            Personality::Eager => (0.3, 0.8),
            Personality::Relaxed => (1.5, 4.0),
            Personality::Chaotic => (0.2, 6.0),
        }
    }

    fn random_delay(&self, rng: &mut impl Rng) -> f64 {
        let (min, max) = self.delay_range();
        min + rng.gen::<f64>() * (max - min)
    }

    /// Aim offset as a fraction of the bubble radius
    fn jitter(&self) -> f64 {
        match self {
            Personality::Eager => 0.2,
            Personality::Relaxed => 0.5,
            Personality::Chaotic => 1.5,
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        match rng.gen_range(0..3) {
            0 => Personality::Eager,
            1 => Personality::Relaxed,
            _ => Personality::Chaotic,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "eager" => Some(Personality::Eager),
            "relaxed" => Some(Personality::Relaxed),
            "chaotic" => Some(Personality::Chaotic),
            _ => None,
        }
    }
}

/// A simulated tapper
#[derive(Debug)]
pub struct AutoPlayer {
    pub personality: Personality,
    /// Seconds until the next tap is allowed
    cooldown: f64,
    /// Category of the last bubble aimed at, used to chase combos
    last_target: Option<Category>,
    taps: u64,
}

impl AutoPlayer {
    pub fn new(personality: Personality, rng: &mut impl Rng) -> Self {
        Self {
            personality,
            cooldown: personality.random_delay(rng),
            last_target: None,
            taps: 0,
        }
    }

    pub fn taps(&self) -> u64 {
        self.taps
    }

    /// Advance by `dt` seconds against the latest frame. Returns a point to
    /// tap when the player is ready and there is something to aim at.
    pub fn tick(&mut self, dt: f64, frame: &FrameMsg, rng: &mut impl Rng) -> Option<Vec2> {
        if frame.state != SessionState::Running {
            return None;
        }
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return None;
        }

        let target = self.choose(&frame.bubbles, rng)?;
        self.cooldown = self.personality.random_delay(rng);
        self.last_target = Some(target.category);
        self.taps += 1;

        let reach = target.radius * self.personality.jitter();
        let dx = rng.gen_range(-1.0..=1.0) * reach;
        let dy = rng.gen_range(-1.0..=1.0) * reach;
        Some(vec2(target.pos[0] + dx, target.pos[1] + dy))
    }

    fn choose<'a>(&self, bubbles: &'a [BubbleWire], rng: &mut impl Rng) -> Option<&'a BubbleWire> {
        if bubbles.is_empty() {
            return None;
        }
        match self.personality {
            Personality::Eager => {
                // Repeat the previous category when possible, otherwise take the best
                let combo = self
                    .last_target
                    .and_then(|cat| bubbles.iter().find(|b| b.category == cat));
                combo.or_else(|| bubbles.iter().max_by_key(|b| b.category.points()))
            }
            Personality::Relaxed | Personality::Chaotic => {
                bubbles.get(rng.gen_range(0..bubbles.len()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PROTOCOL_VERSION;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn wire(id: u64, category: Category, x: f64, y: f64) -> BubbleWire {
        BubbleWire {
            id,
            category,
            radius: 30.0,
            pos: [x, y],
            remaining_lifespan: 3,
        }
    }

    fn frame(state: SessionState, bubbles: Vec<BubbleWire>) -> FrameMsg {
        FrameMsg {
            protocol_version: PROTOCOL_VERSION,
            state,
            score: 0,
            remaining_time: 30,
            player_name: "Bot".to_string(),
            bubbles,
        }
    }

    fn tick_until_tap(player: &mut AutoPlayer, frame: &FrameMsg, rng: &mut ChaCha8Rng) -> Option<(u32, Vec2)> {
        for ticks in 1..=100 {
            if let Some(point) = player.tick(0.1, frame, rng) {
                return Some((ticks, point));
            }
        }
        None
    }

    #[test]
    fn eager_taps_quickly() {
        let mut rng = test_rng();
        let mut player = AutoPlayer::new(Personality::Eager, &mut rng);
        let f = frame(SessionState::Running, vec![wire(1, Category::Tier1, 100.0, 100.0)]);
        let (ticks, _) = tick_until_tap(&mut player, &f, &mut rng).unwrap();
        assert!(ticks <= 9, "Eager player took {} ticks (0.8s max)", ticks);
        assert_eq!(player.taps(), 1);
    }

    #[test]
    fn relaxed_waits_longer() {
        let mut rng = test_rng();
        let mut player = AutoPlayer::new(Personality::Relaxed, &mut rng);
        let f = frame(SessionState::Running, vec![wire(1, Category::Tier1, 100.0, 100.0)]);
        for _ in 0..14 {
            assert!(player.tick(0.1, &f, &mut rng).is_none());
        }
        assert!(tick_until_tap(&mut player, &f, &mut rng).is_some());
    }

    #[test]
    fn eager_aims_inside_best_bubble() {
        let mut rng = test_rng();
        let mut player = AutoPlayer::new(Personality::Eager, &mut rng);
        let f = frame(
            SessionState::Running,
            vec![
                wire(1, Category::Tier1, 100.0, 100.0),
                wire(2, Category::Tier5, 300.0, 300.0),
                wire(3, Category::Tier3, 500.0, 100.0),
            ],
        );
        let (_, point) = tick_until_tap(&mut player, &f, &mut rng).unwrap();
        let distance = crate::vec2::distance(point, vec2(300.0, 300.0));
        assert!(distance <= 30.0, "Tap {:?} missed the Tier5 bubble", point);
    }

    #[test]
    fn eager_chases_combo() {
        let mut rng = test_rng();
        let mut player = AutoPlayer::new(Personality::Eager, &mut rng);
        let first = frame(SessionState::Running, vec![wire(1, Category::Tier2, 100.0, 100.0)]);
        tick_until_tap(&mut player, &first, &mut rng).unwrap();

        let second = frame(
            SessionState::Running,
            vec![
                wire(2, Category::Tier5, 300.0, 300.0),
                wire(3, Category::Tier2, 500.0, 500.0),
            ],
        );
        let (_, point) = tick_until_tap(&mut player, &second, &mut rng).unwrap();
        assert!(crate::vec2::distance(point, vec2(500.0, 500.0)) <= 30.0);
    }

    #[test]
    fn idle_while_not_running() {
        let mut rng = test_rng();
        let bubbles = vec![wire(1, Category::Tier1, 100.0, 100.0)];
        for state in [
            SessionState::Idle,
            SessionState::PausedManual,
            SessionState::PausedSystem,
            SessionState::GameOver,
        ] {
            let mut player = AutoPlayer::new(Personality::Eager, &mut rng);
            let f = frame(state, bubbles.clone());
            assert!(tick_until_tap(&mut player, &f, &mut rng).is_none());
        }
    }

    #[test]
    fn empty_field_yields_nothing() {
        let mut rng = test_rng();
        let mut player = AutoPlayer::new(Personality::Chaotic, &mut rng);
        let f = frame(SessionState::Running, Vec::new());
        assert!(tick_until_tap(&mut player, &f, &mut rng).is_none());
        assert_eq!(player.taps(), 0);
    }

    #[test]
    fn chaotic_has_variable_timing() {
        let f = frame(SessionState::Running, vec![wire(1, Category::Tier1, 100.0, 100.0)]);
        let mut send_times = Vec::new();
        for seed in 0..5 {
            let mut trial_rng = ChaCha8Rng::seed_from_u64(seed);
            let mut player = AutoPlayer::new(Personality::Chaotic, &mut trial_rng);
            let (ticks, _) = tick_until_tap(&mut player, &f, &mut trial_rng).unwrap();
            send_times.push(ticks);
        }
        let all_same = send_times.iter().all(|&t| t == send_times[0]);
        assert!(!all_same, "Chaotic timing should vary, got {:?}", send_times);
    }

    #[test]
    fn parses_personality_names() {
        assert_eq!(Personality::parse("Eager"), Some(Personality::Eager));
        assert_eq!(Personality::parse("relaxed"), Some(Personality::Relaxed));
        assert_eq!(Personality::parse("CHAOTIC"), Some(Personality::Chaotic));
        assert_eq!(Personality::parse("sleepy"), None);
    }
}
