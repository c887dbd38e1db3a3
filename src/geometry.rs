use glam::Vec2;

/// Width below which the viewport margin shrinks.
const NARROW_WIDTH: f32 = 768.0;
/// Height below which the viewport margin shrinks.
const SHORT_HEIGHT: f32 = 600.0;
/// Viewport margin (percent) on roomy screens.
const WIDE_MARGIN: f32 = 5.0;
/// Viewport margin (percent) on narrow or short screens.
const TIGHT_MARGIN: f32 = 2.0;
/// Right edge of the box may not pass this percentage of the viewport.
const VIEWPORT_MAX_X: f32 = 98.0;
/// Bottom edge of the box may not pass this percentage of the viewport.
const VIEWPORT_MAX_Y: f32 = 95.0;
/// Container padding cap in pixels.
const FRAME_PADDING_MAX: f32 = 15.0;
/// Container padding as a fraction of the container width.
const FRAME_PADDING_FRACTION: f32 = 0.05;

/// Latest observed viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Viewport percent -> pixels.
    pub fn to_px(&self, pct: Vec2) -> Vec2 {
        Vec2::new(pct.x / 100.0 * self.width, pct.y / 100.0 * self.height)
    }

    /// Pixels -> viewport percent.
    pub fn to_pct(&self, px: Vec2) -> Vec2 {
        Vec2::new(px.x / self.width * 100.0, px.y / self.height * 100.0)
    }
}

/// Container bounds in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl FrameRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Inner padding kept between the frame edge and the entity box.
    pub fn padding(&self) -> f32 {
        FRAME_PADDING_MAX.min(self.width * FRAME_PADDING_FRACTION)
    }
}

/// Measured entity box in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntitySize {
    pub width: f32,
    pub height: f32,
}

impl EntitySize {
    /// Used until the render layer reports a measured size.
    pub const FALLBACK: EntitySize = EntitySize {
        width: 40.0,
        height: 45.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for EntitySize {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Resolves a named container to its current bounds.
pub trait FrameLookup {
    fn frame_rect(&self, id: &str) -> Option<FrameRect>;
}

impl FrameLookup for () {
    fn frame_rect(&self, _id: &str) -> Option<FrameRect> {
        None
    }
}

impl FrameLookup for std::collections::HashMap<String, FrameRect> {
    fn frame_rect(&self, id: &str) -> Option<FrameRect> {
        self.get(id).copied()
    }
}

/// Clamp a proposed position (viewport percent, top-left of the entity box)
/// so the whole box stays inside the active frame minus its padding.
///
/// With no resolvable frame the viewport itself is the frame. Positions that
/// already satisfy the bounds come back unchanged, so the result is a fixed
/// point of this function.
pub fn constrain(
    proposed: Vec2,
    viewport: Viewport,
    frame: Option<FrameRect>,
    entity: EntitySize,
) -> Vec2 {
    if viewport.is_degenerate() {
        return proposed.clamp(Vec2::ZERO, Vec2::splat(100.0));
    }

    match frame {
        Some(rect) => constrain_to_frame(proposed, viewport, rect, entity),
        None => constrain_to_viewport(proposed, viewport, entity),
    }
}

fn constrain_to_frame(
    proposed: Vec2,
    viewport: Viewport,
    rect: FrameRect,
    entity: EntitySize,
) -> Vec2 {
    let padding = rect.padding();
    let px = viewport.to_px(proposed);

    let min_x = rect.left + padding;
    let max_x = (rect.right() - entity.width - padding).max(min_x);
    let min_y = rect.top + padding;
    let max_y = (rect.bottom() - entity.height - padding).max(min_y);

    let x = if px.x < min_x {
        min_x / viewport.width * 100.0
    } else if px.x > max_x {
        max_x / viewport.width * 100.0
    } else {
        proposed.x
    };
    let y = if px.y < min_y {
        min_y / viewport.height * 100.0
    } else if px.y > max_y {
        max_y / viewport.height * 100.0
    } else {
        proposed.y
    };
    Vec2::new(x, y)
}

fn constrain_to_viewport(proposed: Vec2, viewport: Viewport, entity: EntitySize) -> Vec2 {
    let (min_x, min_y) = viewport_margins(viewport);
    let max_x = VIEWPORT_MAX_X - entity.width / viewport.width * 100.0;
    let max_y = VIEWPORT_MAX_Y - entity.height / viewport.height * 100.0;

    Vec2::new(
        min_x.max(max_x.min(proposed.x)),
        min_y.max(max_y.min(proposed.y)),
    )
}

/// Minimum x/y percentages when constraining against the bare viewport.
pub fn viewport_margins(viewport: Viewport) -> (f32, f32) {
    let x = if viewport.width < NARROW_WIDTH {
        TIGHT_MARGIN
    } else {
        WIDE_MARGIN
    };
    let y = if viewport.height < SHORT_HEIGHT {
        TIGHT_MARGIN
    } else {
        WIDE_MARGIN
    };
    (x, y)
}

/// Everything the solver needs for one ghost at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub viewport: Viewport,
    pub frame: Option<FrameRect>,
    pub entity: EntitySize,
}

impl Bounds {
    pub fn reference(&self) -> ReferenceFrame {
        ReferenceFrame::resolve(self.viewport, self.frame)
    }

    pub fn constrain(&self, proposed: Vec2) -> Vec2 {
        constrain(proposed, self.viewport, self.frame, self.entity)
    }
}

/// The rectangle positions are measured against, in viewport percent.
///
/// Soft walls, edge zones and seeding ranges are written in frame-local
/// percent (0..100 across the frame) and mapped through this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFrame {
    origin: Vec2,
    extent: Vec2,
}

impl ReferenceFrame {
    /// The full viewport: local and viewport percent coincide.
    pub const VIEWPORT: ReferenceFrame = ReferenceFrame {
        origin: Vec2::ZERO,
        extent: Vec2::splat(100.0),
    };

    pub fn resolve(viewport: Viewport, frame: Option<FrameRect>) -> Self {
        match frame {
            Some(rect) if !viewport.is_degenerate() && rect.width > 0.0 && rect.height > 0.0 => {
                Self {
                    origin: viewport.to_pct(Vec2::new(rect.left, rect.top)),
                    extent: viewport.to_pct(Vec2::new(rect.width, rect.height)),
                }
            }
            _ => Self::VIEWPORT,
        }
    }

    // Factors are formed first so the full-viewport frame maps exactly.
    pub fn to_local(&self, pos: Vec2) -> Vec2 {
        (pos - self.origin) * (Vec2::splat(100.0) / self.extent)
    }

    pub fn to_viewport(&self, local: Vec2) -> Vec2 {
        self.origin + local * (self.extent / 100.0)
    }

    /// Scale a local-percent delta into viewport percent.
    pub fn scale_delta(&self, local_delta: Vec2) -> Vec2 {
        local_delta * (self.extent / 100.0)
    }
}
