use crate::config::SizeTier;
use crate::geometry::{EntitySize, Viewport};

/// Unscaled pixel size for a tier.
pub fn base_size(tier: SizeTier) -> EntitySize {
    match tier {
        SizeTier::Small => EntitySize::new(30.0, 35.0),
        SizeTier::Medium => EntitySize::new(40.0, 45.0),
        SizeTier::Large => EntitySize::new(50.0, 55.0),
    }
}

/// Breakpoint multiplier for the current viewport width.
pub fn scale_factor(viewport_width: f32) -> f32 {
    if viewport_width < 480.0 {
        0.75
    } else if viewport_width < 768.0 {
        0.85
    } else if viewport_width > 1920.0 {
        1.15
    } else {
        1.0
    }
}

/// Pixel size the render layer should draw the ghost at.
pub fn responsive_size(tier: SizeTier, viewport: Viewport, responsive: bool) -> EntitySize {
    let base = base_size(tier);
    if !responsive {
        return base;
    }
    let s = scale_factor(viewport.width);
    EntitySize::new(base.width * s, base.height * s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoints() {
        assert_eq!(scale_factor(320.0), 0.75);
        assert_eq!(scale_factor(480.0), 0.85);
        assert_eq!(scale_factor(767.0), 0.85);
        assert_eq!(scale_factor(768.0), 1.0);
        assert_eq!(scale_factor(1920.0), 1.0);
        assert_eq!(scale_factor(2560.0), 1.15);
    }

    #[test]
    fn scales_tier_base() {
        let size = responsive_size(SizeTier::Large, Viewport::new(400.0, 800.0), true);
        assert_eq!(size, EntitySize::new(37.5, 41.25));
    }

    #[test]
    fn fixed_when_scaling_disabled() {
        let size = responsive_size(SizeTier::Small, Viewport::new(400.0, 800.0), false);
        assert_eq!(size, EntitySize::new(30.0, 35.0));
    }
}
