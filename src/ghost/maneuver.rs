use glam::Vec2;

use crate::geometry::Bounds;
use crate::rng::RandomSource;

/// Rolls above this trigger a maneuver (40% of maneuver ticks).
const MANEUVER_GATE: f32 = 0.6;
/// Dart distance multiplier on the current heading.
const DART_REACH: f32 = 15.0;
/// Heading magnitude after a circular re-heading.
const CIRCLE_SPEED: f32 = 0.8;
/// How long the pause cue lasts.
pub const PAUSE_MS: u64 = 1_500;

/// Occasional alternative movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Maneuver {
    /// Jump along the current heading.
    Dart,
    /// Flip horizontal heading only.
    ZigZag,
    /// Pick a fresh heading on a circle.
    Circle,
    /// Hold still visually for a moment.
    Pause,
}

impl Maneuver {
    pub const ALL: [Maneuver; 4] = [
        Maneuver::Dart,
        Maneuver::ZigZag,
        Maneuver::Circle,
        Maneuver::Pause,
    ];

    /// Gate the tick, then pick one maneuver uniformly.
    pub fn roll(rng: &mut impl RandomSource) -> Option<Maneuver> {
        if rng.f32() <= MANEUVER_GATE {
            return None;
        }
        Some(Self::ALL[rng.index(Self::ALL.len())])
    }
}

/// Position after a dart, kept inside the soft walls and the hard bounds.
pub fn dart(position: Vec2, direction: Vec2, bounds: &Bounds) -> Vec2 {
    let frame = bounds.reference();
    let local = frame.to_local(position) + direction * DART_REACH;
    let local = Vec2::new(local.x.clamp(5.0, 90.0), local.y.clamp(5.0, 85.0));
    bounds.constrain(frame.to_viewport(local))
}

pub fn zig_zag(direction: Vec2) -> Vec2 {
    Vec2::new(-direction.x, direction.y)
}

pub fn circle(rng: &mut impl RandomSource) -> Vec2 {
    let angle = rng.f32() * std::f32::consts::TAU;
    Vec2::new(angle.cos(), angle.sin()) * CIRCLE_SPEED
}
