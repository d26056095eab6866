//! Types shared between the bubble-pop engine and its collaborators
//! (renderer, settings screen, score keeper).

pub mod category;
pub mod config;
pub mod protocol;
pub mod vec2;
