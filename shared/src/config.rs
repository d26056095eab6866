/// Minimum round length in seconds; shorter requests are clamped up.
pub const MIN_GAME_TIME_SECS: u32 = 5;
/// Minimum bubble target; smaller requests are clamped up.
pub const MIN_BUBBLES: u32 = 5;

/// Per-session settings chosen by the player.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../renderer/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub player_name: String,
    pub game_time_secs: u32,
    pub max_bubbles: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            game_time_secs: 60,
            max_bubbles: 15,
        }
    }
}

impl GameConfig {
    pub fn new(player_name: impl Into<String>, game_time_secs: u32, max_bubbles: u32) -> Self {
        Self {
            player_name: player_name.into(),
            game_time_secs,
            max_bubbles,
        }
    }

    /// Raise out-of-range values to their minimums. Never rejects.
    pub fn clamped(mut self) -> Self {
        self.game_time_secs = self.game_time_secs.max(MIN_GAME_TIME_SECS);
        self.max_bubbles = self.max_bubbles.max(MIN_BUBBLES);
        self
    }

    /// Checks what clamping cannot fix.
    pub fn validate(&self) -> Result<(), String> {
        if self.player_name.trim().is_empty() {
            return Err("player_name must not be empty".to_string());
        }
        Ok(())
    }
}

/// Placement tuning. Defaults match the shipped game.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../renderer/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct PlacementConfig {
    /// Safety margin kept clear on every side of the field
    pub margin: f64,
    /// Smallest radius a bubble may have
    pub min_radius: f64,
    /// Absolute cap on bubble radius
    pub max_radius: f64,
    /// max radius = min(safe width, safe height) / radius_divisor
    pub radius_divisor: f64,
    /// Sampling iterations allowed per placement call
    pub attempt_budget: u32,
    /// Shortest lifespan in ticks (inclusive)
    pub lifespan_min: u32,
    /// Longest lifespan in ticks (inclusive)
    pub lifespan_max: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            margin: 10.0,
            min_radius: 20.0,
            max_radius: 80.0,
            radius_divisor: 10.0,
            attempt_budget: 100,
            lifespan_min: 3,
            lifespan_max: 6,
        }
    }
}

impl PlacementConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err("margin must be finite and >= 0".to_string());
        }
        if !self.min_radius.is_finite() || self.min_radius <= 0.0 {
            return Err("min_radius must be finite and > 0".to_string());
        }
        if !self.max_radius.is_finite() || self.max_radius < self.min_radius {
            return Err("max_radius must be finite and >= min_radius".to_string());
        }
        if !self.radius_divisor.is_finite() || self.radius_divisor <= 0.0 {
            return Err("radius_divisor must be finite and > 0".to_string());
        }
        if self.attempt_budget == 0 {
            return Err("attempt_budget must be > 0".to_string());
        }
        if self.lifespan_min == 0 {
            return Err("lifespan_min must be > 0".to_string());
        }
        if self.lifespan_max < self.lifespan_min {
            return Err("lifespan_max must be >= lifespan_min".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_placement_config_is_valid() {
        assert!(PlacementConfig::default().validate().is_ok());
    }

    #[test]
    fn max_radius_below_min_invalid() {
        let mut config = PlacementConfig::default();
        config.max_radius = 10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_lifespan_invalid() {
        let mut config = PlacementConfig::default();
        config.lifespan_min = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_lifespan_range_invalid() {
        let mut config = PlacementConfig::default();
        config.lifespan_min = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn clamping_raises_small_values() {
        let config = GameConfig::new("Ada", 0, 2).clamped();
        assert_eq!(config.game_time_secs, MIN_GAME_TIME_SECS);
        assert_eq!(config.max_bubbles, MIN_BUBBLES);
        assert_eq!(config.player_name, "Ada");
    }

    #[test]
    fn clamping_keeps_valid_values() {
        let config = GameConfig::new("Ada", 30, 12).clamped();
        assert_eq!(config.game_time_secs, 30);
        assert_eq!(config.max_bubbles, 12);
    }

    #[test]
    fn blank_player_name_invalid() {
        assert!(GameConfig::new("  ", 30, 12).validate().is_err());
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_attempt_budget_invalid() {
        let mut config = PlacementConfig::default();
        config.attempt_budget = 0;
        assert!(config.validate().is_err());
    }
}
