//! Roaming ghost companions: a timer-driven simulation of small characters
//! that wander a viewport (or a named container), react to clicks and
//! emit short-lived particles. Rendering is left to the host; the stage
//! hands back plain instance buffers.

pub mod config;
pub mod debug;
pub mod effects;
pub mod geometry;
pub mod ghost;
pub mod render;
pub mod rng;
pub mod scheduler;
pub mod stage;
pub mod theme;

pub use config::{ConfigError, GhostConfig};
pub use geometry::{FrameRect, Viewport};
pub use ghost::Ghost;
pub use stage::Stage;
