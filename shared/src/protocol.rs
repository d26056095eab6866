use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::category::Category;

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// Lifecycle state of a session as seen by the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../renderer/src/generated/")]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Running,
    PausedManual,
    PausedSystem,
    GameOver,
}

impl SessionState {
    pub fn is_paused(self) -> bool {
        matches!(self, SessionState::PausedManual | SessionState::PausedSystem)
    }
}

// === Core -> Collaborators ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../renderer/src/generated/")]
#[serde(tag = "type")]
pub enum CoreMsg {
    #[serde(rename = "frame")]
    Frame(FrameMsg),
    #[serde(rename = "session_ended")]
    SessionEnded(SessionEndedMsg),
}

/// Everything the renderer and HUD need to draw one frame.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../renderer/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct FrameMsg {
    pub protocol_version: u32,
    pub state: SessionState,
    pub score: u64,
    pub remaining_time: u32,
    pub player_name: String,
    pub bubbles: Vec<BubbleWire>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../renderer/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct BubbleWire {
    pub id: u64,
    pub category: Category,
    pub radius: f64,
    pub pos: [f64; 2],
    pub remaining_lifespan: u32,
}

/// Sent exactly once when a round times out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../renderer/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct SessionEndedMsg {
    pub player_name: String,
    pub final_score: u64,
}

// === Collaborators -> Core ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../renderer/src/generated/")]
#[serde(tag = "type")]
pub enum HostMsg {
    #[serde(rename = "start")]
    Start {
        #[serde(rename = "playerName")]
        player_name: String,
        #[serde(rename = "gameTimeSecs")]
        game_time_secs: u32,
        #[serde(rename = "maxBubbles")]
        max_bubbles: u32,
        width: f64,
        height: f64,
    },
    #[serde(rename = "pop_at")]
    PopAt { x: f64, y: f64 },
    #[serde(rename = "pop")]
    Pop { id: u64 },
    #[serde(rename = "resize")]
    Resize { width: f64, height: f64 },
    #[serde(rename = "pause_toggle")]
    PauseToggle,
    #[serde(rename = "pause")]
    Pause,
    #[serde(rename = "resume")]
    Resume,
    #[serde(rename = "background")]
    Background,
    #[serde(rename = "foreground")]
    Foreground,
    #[serde(rename = "reset")]
    Reset,
    /// Leave the round and go back to the menu
    #[serde(rename = "quit")]
    Quit,
}

// === Conversion helpers ===

/// Round to 2 decimal places (sub-pixel precision is plenty for drawing)
#[inline]
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
