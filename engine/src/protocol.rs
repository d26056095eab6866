pub use bubblepop_shared::protocol::*;

use crate::bubble::Bubble;
use crate::session::{SessionController, SessionSummary};

impl From<&Bubble> for BubbleWire {
    fn from(bubble: &Bubble) -> Self {
        Self {
            id: bubble.id.0,
            category: bubble.category,
            radius: round2(bubble.radius),
            pos: [round2(bubble.pos.x), round2(bubble.pos.y)],
            remaining_lifespan: bubble.remaining_lifespan(),
        }
    }
}

impl From<SessionSummary> for SessionEndedMsg {
    fn from(summary: SessionSummary) -> Self {
        Self {
            player_name: summary.player_name,
            final_score: summary.final_score,
        }
    }
}

impl SessionController {
    /// Snapshot of the field and HUD values for the renderer.
    pub fn frame(&self) -> FrameMsg {
        FrameMsg {
            protocol_version: PROTOCOL_VERSION,
            state: self.state(),
            score: self.score(),
            remaining_time: self.remaining_time(),
            player_name: self.player_name().to_string(),
            bubbles: self.field().bubbles().iter().map(BubbleWire::from).collect(),
        }
    }
}
