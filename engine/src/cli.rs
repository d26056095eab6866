//! Command-line flags shared by the binaries.
//!
//! Options:
//!   --name NAME          Player name (default: Player)
//!   --time S             Round length in seconds (default: 60, min 5)
//!   --bubbles N          Bubble target (default: 15, min 5)
//!   --width W            Field width (default: 400)
//!   --height H           Field height (default: 700)
//!   --seed N             RNG seed (default: 42)
//!   --tick-ms MS         Tick period in milliseconds (default: 1000)
//!   --autoplay           Let a simulated player tap
//!   --personality P      eager, relaxed or chaotic (default: eager)
//!   --rounds N           Autoplay rounds, reset between them (default: 1)
//!
//! Unknown flags are skipped so a binary can layer its own on top.

use crate::autoplayer::Personality;
use crate::config::{EngineConfig, GameConfig};
use crate::vec2::FieldSize;

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub game: GameConfig,
    pub field: FieldSize,
    pub engine: EngineConfig,
    pub autoplay: bool,
    pub personality: Personality,
    pub rounds: u32,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            field: FieldSize::new(400.0, 700.0),
            engine: EngineConfig::default(),
            autoplay: false,
            personality: Personality::Eager,
            rounds: 1,
        }
    }
}

impl CliArgs {
    /// Parse flags from a full argv (program name first). Values that fail
    /// to parse keep their defaults.
    pub fn parse(args: &[String]) -> Self {
        let defaults = Self::default();
        let mut cli = Self::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--name" => {
                    i += 1;
                    if let Some(name) = args.get(i) {
                        cli.game.player_name = name.clone();
                    }
                }
                "--time" => {
                    i += 1;
                    cli.game.game_time_secs = args
                        .get(i)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(defaults.game.game_time_secs);
                }
                "--bubbles" => {
                    i += 1;
                    cli.game.max_bubbles = args
                        .get(i)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(defaults.game.max_bubbles);
                }
                "--width" => {
                    i += 1;
                    cli.field.width = args
                        .get(i)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(defaults.field.width);
                }
                "--height" => {
                    i += 1;
                    cli.field.height = args
                        .get(i)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(defaults.field.height);
                }
                "--seed" => {
                    i += 1;
                    cli.engine.rng_seed = args
                        .get(i)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(defaults.engine.rng_seed);
                }
                "--tick-ms" => {
                    i += 1;
                    cli.engine.tick_period_ms = args
                        .get(i)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(defaults.engine.tick_period_ms);
                }
                "--autoplay" => cli.autoplay = true,
                "--personality" => {
                    i += 1;
                    cli.personality = args
                        .get(i)
                        .and_then(|s| Personality::parse(s))
                        .unwrap_or(defaults.personality);
                }
                "--rounds" => {
                    i += 1;
                    cli.rounds = args
                        .get(i)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(defaults.rounds);
                }
                _ => {}
            }
            i += 1;
        }
        cli
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.rounds == 0 {
            return Err("rounds must be > 0".to_string());
        }
        self.game.validate()?;
        self.engine.validate()
    }
}
