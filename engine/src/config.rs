pub use bubblepop_shared::config::{GameConfig, PlacementConfig};
use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Countdown tick period. One tick is one second of game time.
    pub tick_period_ms: u64,
    pub rng_seed: u64,
    /// Capacity of the command channel into the game loop
    pub command_buffer: usize,
    /// Capacity of the frame/event broadcast channel
    pub broadcast_capacity: usize,
    pub placement: PlacementConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 1000,
            rng_seed: 42,
            command_buffer: 256,
            broadcast_capacity: 64,
            placement: PlacementConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tick_period_ms == 0 {
            return Err("tick_period_ms must be > 0".to_string());
        }
        if self.command_buffer == 0 {
            return Err("command_buffer must be > 0".to_string());
        }
        if self.broadcast_capacity == 0 {
            return Err("broadcast_capacity must be > 0".to_string());
        }
        self.placement.validate()
    }
}
