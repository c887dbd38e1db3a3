pub mod ring;

use glam::Vec2;

use self::ring::RingBuffer;

/// Positions kept for the debug path overlay.
pub const PATH_HISTORY_LEN: usize = 120;

/// Text and path the debug overlay draws next to a ghost.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugReadout {
    pub lines: Vec<String>,
    /// Recent positions, oldest first.
    pub path: Vec<Vec2>,
}

impl DebugReadout {
    pub fn new(position: Vec2, direction: Vec2, interactions: u32, history: &RingBuffer<Vec2>) -> Self {
        Self {
            lines: vec![
                format!("Pos: {:.1},{:.1}", position.x, position.y),
                format!("Dir: {:.1},{:.1}", direction.x, direction.y),
                format!("Interactions: {interactions}"),
            ],
            path: history.iter().copied().collect(),
        }
    }
}
