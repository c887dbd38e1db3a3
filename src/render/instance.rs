use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::effects::{Particle, ParticleKind};
use crate::ghost::interaction::Expression;
use crate::ghost::{Facing, Ghost};
use crate::rng::RandomSource;

/// Per-ghost data handed to the renderer each frame.
/// Stride = 40 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GhostInstance {
    /// Top-left corner in viewport pixels.
    pub position: [f32; 2],
    /// Drawn width and height in pixels.
    pub size: [f32; 2],
    /// `VisualFlags` bits (pop, bump, pause, reactions).
    pub flags: u32,
    /// Emote code, 0 when none is showing.
    pub emote: u32,
    /// Face index (0=neutral, 1=happy, 2=sad, 3=surprised, 4=excited).
    pub expression: u32,
    /// -1.0 facing left, 1.0 facing right.
    pub facing: f32,
    pub dark: u32,
    pub visible: u32,
    pub z_index: i32,
}

impl GhostInstance {
    pub fn from_ghost<R: RandomSource>(ghost: &Ghost<R>) -> Self {
        let size = ghost.render_size();
        let expression = match ghost.expression() {
            Expression::Neutral => 0,
            Expression::Happy => 1,
            Expression::Sad => 2,
            Expression::Surprised => 3,
            Expression::Excited => 4,
        };
        Self {
            position: ghost.viewport().to_px(ghost.position()).into(),
            size: [size.width, size.height],
            flags: ghost.flags().bits(),
            emote: ghost.emote().map_or(0, |e| e.code()),
            expression,
            facing: match ghost.facing() {
                Facing::Left => -1.0,
                Facing::Right => 1.0,
            },
            dark: ghost.is_dark() as u32,
            visible: ghost.is_visible() as u32,
            z_index: ghost.config().z_index,
        }
    }
}

/// Per-particle data. Stride = 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// Center in viewport pixels.
    pub position: [f32; 2],
    /// Lifetime fraction used, 0..1. Drives fade and scale.
    pub age: f32,
    /// 0 = sparkle, 1 = trail.
    pub kind: u32,
}

impl ParticleInstance {
    /// Sparkles sit around the ghost box; trails stay where they were dropped.
    pub fn from_particle<R: RandomSource>(ghost: &Ghost<R>, particle: &Particle) -> Self {
        let viewport = ghost.viewport();
        let (position, kind) = match particle.kind {
            ParticleKind::Sparkle => {
                let size = ghost.render_size();
                let origin = viewport.to_px(ghost.position());
                let half = Vec2::new(size.width, size.height) * 0.5;
                let spread = Vec2::new(size.width, size.height) * (particle.offset / 100.0);
                (origin + half + spread, 0)
            }
            ParticleKind::Trail => (viewport.to_px(particle.offset), 1),
        };
        Self {
            position: position.into(),
            age: particle.age(ghost.now_ms()),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Behavior, GhostConfig};
    use crate::geometry::Viewport;
    use crate::theme::ThemeNotifier;

    fn ghost() -> Ghost {
        let mut theme = ThemeNotifier::new(true);
        let config = GhostConfig {
            behavior: Behavior::Static,
            ..GhostConfig::default()
        };
        Ghost::mount(
            config,
            Viewport::new(1000.0, 500.0),
            &(),
            &mut theme,
            fastrand::Rng::with_seed(7),
        )
    }

    #[test]
    fn instance_layout_is_tight() {
        assert_eq!(std::mem::size_of::<GhostInstance>(), 40);
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 16);
    }

    #[test]
    fn ghost_instance_in_pixels() {
        let ghost = ghost();
        let inst = GhostInstance::from_ghost(&ghost);
        let pos = ghost.position();
        assert_eq!(inst.position, [pos.x / 100.0 * 1000.0, pos.y / 100.0 * 500.0]);
        assert_eq!(inst.size, [40.0, 45.0]);
        assert_eq!(inst.dark, 1);
        assert_eq!(inst.visible, 1);
        assert_eq!(inst.z_index, 50);
        assert_eq!(inst.emote, 0);
    }

    #[test]
    fn sparkles_surround_the_ghost() {
        let ghost = ghost();
        let origin = ghost.viewport().to_px(ghost.position());
        for particle in ghost.particles() {
            let inst = ParticleInstance::from_particle(&ghost, particle);
            assert_eq!(inst.kind, 0);
            assert_eq!(inst.age, 0.0);
            assert!(inst.position[0] >= origin.x && inst.position[0] <= origin.x + 40.0);
            assert!(inst.position[1] >= origin.y && inst.position[1] <= origin.y + 45.0);
        }
    }
}
