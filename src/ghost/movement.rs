use glam::Vec2;

use crate::config::SpeedTier;
use crate::geometry::Bounds;
use crate::rng::RandomSource;

/// Per-axis jitter added to every step (half-width, percent).
const JITTER: f32 = 2.5;
/// Edge zones, frame-local percent.
const EDGE_LEFT: f32 = 15.0;
const EDGE_RIGHT: f32 = 85.0;
const EDGE_TOP: f32 = 15.0;
const EDGE_BOTTOM: f32 = 80.0;
/// Largest push away from a nearby edge.
const EDGE_PUSH: f32 = 10.0;
/// Step multiplier when two perpendicular edges are near.
const CORNER_BOOST: f32 = 1.5;
/// Soft walls, frame-local percent.
pub const WALL_LEFT: f32 = 5.0;
pub const WALL_RIGHT: f32 = 90.0;
pub const WALL_TOP: f32 = 5.0;
pub const WALL_BOTTOM: f32 = 85.0;
/// Random inset after snapping inside a wall.
const WALL_SNAP: f32 = 5.0;
/// Extra speed picked up when bouncing.
const BOUNCE_KICK: f32 = 0.5;
/// Rolls above this nudge the heading (15% of ticks).
const NUDGE_GATE: f32 = 0.85;
/// Half-width of a direction nudge.
const NUDGE: f32 = 0.4;

/// Result of one roam tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoamStep {
    pub position: Vec2,
    pub direction: Vec2,
    /// A soft wall was crossed; the bump cue should play.
    pub bounced: bool,
}

/// Advance one `roam` tick: random step along the current heading, edge
/// avoidance, constraint, then soft-wall bounce.
pub fn roam_step(
    position: Vec2,
    direction: Vec2,
    speed: SpeedTier,
    bounds: &Bounds,
    rng: &mut impl RandomSource,
) -> RoamStep {
    let frame = bounds.reference();
    let local = frame.to_local(position);
    let (min, max) = speed.step_range();

    let mut step = Vec2::new(
        direction.x * rng.range(min, max),
        direction.y * rng.range(min, max),
    );
    step += Vec2::new(rng.centered(JITTER), rng.centered(JITTER));

    let near_left = local.x < EDGE_LEFT;
    let near_right = local.x > EDGE_RIGHT;
    let near_top = local.y < EDGE_TOP;
    let near_bottom = local.y > EDGE_BOTTOM;

    if near_left {
        step.x += rng.f32() * EDGE_PUSH;
    }
    if near_right {
        step.x -= rng.f32() * EDGE_PUSH;
    }
    if near_top {
        step.y += rng.f32() * EDGE_PUSH;
    }
    if near_bottom {
        step.y -= rng.f32() * EDGE_PUSH;
    }
    if (near_left || near_right) && (near_top || near_bottom) {
        step *= CORNER_BOOST;
    }

    let raw = position + frame.scale_delta(step);
    let clamped = bounds.constrain(raw);
    let raw_local = frame.to_local(raw);
    let clamped_local = frame.to_local(clamped);

    let mut out = clamped_local;
    let mut dir = direction;
    let mut bounced = false;

    if raw_local.x.min(clamped_local.x) < WALL_LEFT {
        out.x = WALL_LEFT + rng.f32() * WALL_SNAP;
        dir.x = direction.x.abs() + rng.f32() * BOUNCE_KICK;
        bounced = true;
    } else if raw_local.x.max(clamped_local.x) > WALL_RIGHT {
        out.x = WALL_RIGHT - rng.f32() * WALL_SNAP;
        dir.x = -direction.x.abs() - rng.f32() * BOUNCE_KICK;
        bounced = true;
    }

    if raw_local.y.min(clamped_local.y) < WALL_TOP {
        out.y = WALL_TOP + rng.f32() * WALL_SNAP;
        dir.y = direction.y.abs() + rng.f32() * BOUNCE_KICK;
        bounced = true;
    } else if raw_local.y.max(clamped_local.y) > WALL_BOTTOM {
        out.y = WALL_BOTTOM - rng.f32() * WALL_SNAP;
        dir.y = -direction.y.abs() - rng.f32() * BOUNCE_KICK;
        bounced = true;
    }

    let position = if bounced {
        bounds.constrain(frame.to_viewport(out))
    } else {
        clamped
    };

    RoamStep {
        position,
        direction: dir,
        bounced,
    }
}

/// Occasionally wobble the heading so the path never settles into a loop.
pub fn maybe_nudge(direction: Vec2, rng: &mut impl RandomSource) -> Option<Vec2> {
    if rng.f32() <= NUDGE_GATE {
        return None;
    }
    Some(direction + Vec2::new(rng.centered(NUDGE), rng.centered(NUDGE)))
}

/// Fresh random heading used at seeding time.
pub fn seed_direction(rng: &mut impl RandomSource) -> Vec2 {
    Vec2::new(rng.centered(0.75), rng.centered(0.75))
}

/// Heading forced by the rescue tick.
pub fn rescue_direction(rng: &mut impl RandomSource) -> Vec2 {
    Vec2::new(rng.centered(1.0), rng.centered(1.0))
}

/// Random starting position, viewport percent. The whole box starts inside
/// the bounds even when the container is too small for the seeding range.
pub fn seed_position(bounds: &Bounds, rng: &mut impl RandomSource) -> Vec2 {
    let local = if bounds.frame.is_some() {
        Vec2::new(rng.range(15.0, 85.0), rng.range(15.0, 75.0))
    } else {
        Vec2::new(rng.range(5.0, 75.0), rng.range(5.0, 65.0))
    };
    bounds.constrain(bounds.reference().to_viewport(local))
}

/// Steering in `follow` mode.
///
/// Implementations get the last pointer position (viewport percent, `None`
/// until the pointer has been seen) and return the proposed position and
/// heading; the caller constrains the position.
pub trait Follower {
    fn follow(&mut self, position: Vec2, direction: Vec2, pointer: Option<Vec2>) -> (Vec2, Vec2);
}

/// Default follower: keeps the ghost where it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stationary;

impl Follower for Stationary {
    fn follow(&mut self, position: Vec2, direction: Vec2, _pointer: Option<Vec2>) -> (Vec2, Vec2) {
        (position, direction)
    }
}

/// Eases toward the pointer, slowing down once close, and turns to face it.
#[derive(Debug, Clone, Copy)]
pub struct EaseToward {
    pub far_rate: f32,
    pub near_rate: f32,
    pub near_radius: f32,
    /// Horizontal distance below which facing is left alone.
    pub turn_threshold: f32,
}

impl Default for EaseToward {
    fn default() -> Self {
        Self {
            far_rate: 0.08,
            near_rate: 0.02,
            near_radius: 10.0,
            turn_threshold: 2.0,
        }
    }
}

impl Follower for EaseToward {
    fn follow(&mut self, position: Vec2, direction: Vec2, pointer: Option<Vec2>) -> (Vec2, Vec2) {
        let Some(target) = pointer else {
            return (position, direction);
        };
        let delta = target - position;
        let mut dir = direction;
        if delta.x.abs() > self.turn_threshold {
            dir.x = delta.x.signum();
        }
        let rate = if delta.length() < self.near_radius {
            self.near_rate
        } else {
            self.far_rate
        };
        (position + delta * rate, dir)
    }
}
