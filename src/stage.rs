use std::collections::HashMap;

use glam::Vec2;

use crate::config::GhostConfig;
use crate::geometry::{FrameRect, Viewport};
use crate::ghost::movement::Follower;
use crate::ghost::sizing;
use crate::ghost::Ghost;
use crate::render::instance::{GhostInstance, ParticleInstance};
use crate::theme::ThemeNotifier;

/// Expected number of mounted ghosts; only sizes the instance buffers.
const INITIAL_CAPACITY: usize = 8;

/// Host page: every mounted ghost lives in one hecs world, and the stage
/// routes viewport, pointer, theme and container signals to them.
pub struct Stage {
    world: hecs::World,
    frames: HashMap<String, FrameRect>,
    theme: ThemeNotifier,
    rng: fastrand::Rng,
    viewport: Viewport,
    // Reused between frames
    ghost_buf: Vec<GhostInstance>,
    particle_buf: Vec<ParticleInstance>,
}

impl Stage {
    pub fn new(viewport: Viewport) -> Self {
        Self::with_rng(viewport, fastrand::Rng::new())
    }

    /// Deterministic stage: every ghost's random source derives from `seed`.
    pub fn with_seed(viewport: Viewport, seed: u64) -> Self {
        Self::with_rng(viewport, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(viewport: Viewport, rng: fastrand::Rng) -> Self {
        Self {
            world: hecs::World::new(),
            frames: HashMap::new(),
            theme: ThemeNotifier::new(false),
            rng,
            viewport,
            ghost_buf: Vec::with_capacity(INITIAL_CAPACITY),
            particle_buf: Vec::with_capacity(INITIAL_CAPACITY * 8),
        }
    }

    pub fn mount(&mut self, config: GhostConfig) -> hecs::Entity {
        let rng = fastrand::Rng::with_seed(self.rng.u64(..));
        let mut ghost = Ghost::mount(config, self.viewport, &self.frames, &mut self.theme, rng);
        ghost.set_measured_size(Some(ghost.render_size()));
        let entity = self.world.spawn((ghost,));
        log::info!("mounted ghost {entity:?} ({} total)", self.world.len());
        entity
    }

    /// Remove a ghost, cancelling its timers. Returns false for unknown ids.
    pub fn unmount(&mut self, entity: hecs::Entity) -> bool {
        let Ok(ghost) = self.world.remove_one::<Ghost>(entity) else {
            return false;
        };
        if let Err(e) = self.world.despawn(entity) {
            log::warn!("ghost {entity:?} removed but not despawned: {e}");
        }
        ghost.unmount(&mut self.theme);
        true
    }

    pub fn reconfigure(&mut self, entity: hecs::Entity, config: GhostConfig) -> bool {
        match self.world.get::<&mut Ghost>(entity) {
            Ok(mut ghost) => {
                ghost.reconfigure(config, &self.frames);
                true
            }
            Err(_) => false,
        }
    }

    /// Swap the `follow` steering of one ghost.
    pub fn set_follower(
        &mut self,
        entity: hecs::Entity,
        follower: impl Follower + Send + Sync + 'static,
    ) -> bool {
        match self.world.get::<&mut Ghost>(entity) {
            Ok(mut ghost) => {
                ghost.set_follower(follower);
                true
            }
            Err(_) => false,
        }
    }

    /// Register or move a named container.
    pub fn set_frame(&mut self, id: impl Into<String>, rect: FrameRect) {
        self.frames.insert(id.into(), rect);
    }

    /// Ghosts bound to a removed container fall back to the viewport.
    pub fn remove_frame(&mut self, id: &str) -> bool {
        self.frames.remove(id).is_some()
    }

    /// New viewport size. Positions keep their percentages unless a ghost's
    /// box would no longer fit; the drawn size follows the new width.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        for (_, ghost) in self.world.query_mut::<&mut Ghost>() {
            let config = ghost.config();
            let size = sizing::responsive_size(config.size, viewport, config.responsive_scale);
            ghost.set_measured_size(Some(size));
            ghost.resize(viewport, &self.frames);
        }
        log::debug!("viewport resized to {}x{}", viewport.width, viewport.height);
    }

    /// Publish the host theme. Ghosts pick it up on their next advance.
    pub fn set_dark_mode(&mut self, dark: bool) {
        self.theme.set_dark(dark);
    }

    /// Pointer moved to `px`. Updates hover state and the follow target.
    pub fn pointer_moved(&mut self, px: Vec2) {
        let pct = self.viewport.to_pct(px);
        for (_, ghost) in self.world.query_mut::<&mut Ghost>() {
            let over = hit(ghost, px);
            ghost.set_hovered(over);
            ghost.pointer_moved(pct);
        }
    }

    /// Click at `px`. The topmost visible, interactive ghost under the
    /// pointer takes it.
    pub fn click_at(&mut self, px: Vec2) -> Option<hecs::Entity> {
        let mut target: Option<(hecs::Entity, i32)> = None;
        for (entity, ghost) in self.world.query::<&Ghost>().iter() {
            if !ghost.config().interactive || !hit(ghost, px) {
                continue;
            }
            let z = ghost.config().z_index;
            if target.map_or(true, |(_, best)| z > best) {
                target = Some((entity, z));
            }
        }

        let (entity, _) = target?;
        let mut ghost = self.world.get::<&mut Ghost>(entity).ok()?;
        ghost.click().then_some(entity)
    }

    pub fn advance(&mut self, dt_ms: u64) {
        for (_, ghost) in self.world.query_mut::<&mut Ghost>() {
            ghost.sync_theme(&mut self.theme);
            ghost.advance(dt_ms, &self.frames);
        }
    }

    /// Fill the instance buffers from the world. Ghosts come back sorted by
    /// z-index, lowest first.
    pub fn build_instances(&mut self) -> (&[GhostInstance], &[ParticleInstance]) {
        self.ghost_buf.clear();
        self.particle_buf.clear();

        for (_, ghost) in self.world.query::<&Ghost>().iter() {
            self.ghost_buf.push(GhostInstance::from_ghost(ghost));
            self.particle_buf.extend(
                ghost
                    .particles()
                    .iter()
                    .map(|p| ParticleInstance::from_particle(ghost, p)),
            );
        }
        self.ghost_buf.sort_by_key(|inst| inst.z_index);

        (&self.ghost_buf, &self.particle_buf)
    }

    pub fn ghost(&self, entity: hecs::Entity) -> Option<hecs::Ref<'_, Ghost>> {
        self.world.get::<&Ghost>(entity).ok()
    }

    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.world.len() == 0
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Theme subscribers still registered; one per mounted ghost.
    pub fn theme_subscribers(&self) -> usize {
        self.theme.subscribers()
    }
}

/// Whether `px` falls inside the ghost's drawn box. Hidden ghosts never hit.
fn hit(ghost: &Ghost, px: Vec2) -> bool {
    if !ghost.is_visible() {
        return false;
    }
    let size = ghost.render_size();
    let min = ghost.viewport().to_px(ghost.position());
    let max = min + Vec2::new(size.width, size.height);
    px.cmpge(min).all() && px.cmple(max).all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Behavior, SpeedTier};
    use crate::ghost::interaction::MoodState;

    fn still(z_index: i32) -> GhostConfig {
        GhostConfig {
            behavior: Behavior::Static,
            effects: false,
            z_index,
            ..GhostConfig::default()
        }
    }

    fn center_of(stage: &Stage, entity: hecs::Entity) -> Vec2 {
        let ghost = stage.ghost(entity).unwrap();
        let size = ghost.render_size();
        stage.viewport().to_px(ghost.position()) + Vec2::new(size.width, size.height) * 0.5
    }

    #[test]
    fn click_goes_to_topmost_ghost() {
        let mut stage = Stage::with_seed(Viewport::new(1280.0, 800.0), 1);
        // A container exactly one ghost big pins every roaming ghost to the
        // same spot after its first step.
        stage.set_frame("slot", FrameRect::new(200.0, 200.0, 40.0, 45.0));
        let pinned = |z_index| GhostConfig {
            frame_id: Some("slot".into()),
            speed: SpeedTier::Fast,
            effects: false,
            z_index,
            ..GhostConfig::default()
        };
        let low = stage.mount(pinned(10));
        let high = stage.mount(pinned(90));
        stage.advance(1_000);
        assert_eq!(
            stage.ghost(low).unwrap().position(),
            stage.ghost(high).unwrap().position()
        );

        let at = center_of(&stage, low);
        assert_eq!(stage.click_at(at), Some(high));
        assert_eq!(stage.ghost(high).unwrap().interactions(), 1);
        assert_eq!(stage.ghost(low).unwrap().interactions(), 0);

        assert_eq!(stage.click_at(Vec2::new(-10.0, -10.0)), None);
    }

    #[test]
    fn non_interactive_ghost_lets_clicks_through() {
        let mut stage = Stage::with_seed(Viewport::new(1280.0, 800.0), 2);
        let entity = stage.mount(GhostConfig {
            interactive: false,
            ..still(50)
        });
        let at = center_of(&stage, entity);
        assert_eq!(stage.click_at(at), None);
    }

    #[test]
    fn hover_follows_pointer() {
        let mut stage = Stage::with_seed(Viewport::new(1280.0, 800.0), 3);
        let entity = stage.mount(still(50));
        let at = center_of(&stage, entity);
        stage.pointer_moved(at);
        assert!(stage.ghost(entity).unwrap().is_hovered());
        stage.pointer_moved(Vec2::ZERO);
        assert!(!stage.ghost(entity).unwrap().is_hovered());
    }

    #[test]
    fn unmount_cleans_up() {
        let mut stage = Stage::with_seed(Viewport::new(1280.0, 800.0), 4);
        let a = stage.mount(GhostConfig::default());
        let b = stage.mount(GhostConfig::default());
        assert_eq!(stage.len(), 2);
        assert_eq!(stage.theme_subscribers(), 2);

        assert!(stage.unmount(a));
        assert!(!stage.unmount(a));
        assert_eq!(stage.len(), 1);
        assert_eq!(stage.theme_subscribers(), 1);
        assert!(stage.ghost(a).is_none());
        assert!(!stage.world.contains(a));
        assert!(stage.ghost(b).is_some());
    }

    #[test]
    fn dark_mode_reaches_ghosts_on_advance() {
        let mut stage = Stage::with_seed(Viewport::new(1280.0, 800.0), 5);
        let entity = stage.mount(still(50));
        stage.set_dark_mode(true);
        assert!(!stage.ghost(entity).unwrap().is_dark());
        stage.advance(16);
        assert!(stage.ghost(entity).unwrap().is_dark());
        assert_eq!(stage.build_instances().0[0].dark, 1);
    }

    #[test]
    fn removed_frame_falls_back_to_viewport() {
        let mut stage = Stage::with_seed(Viewport::new(1280.0, 800.0), 6);
        stage.set_frame("box", FrameRect::new(100.0, 100.0, 300.0, 200.0));
        let entity = stage.mount(GhostConfig {
            frame_id: Some("box".into()),
            speed: SpeedTier::Fast,
            ..GhostConfig::default()
        });
        for _ in 0..50 {
            stage.advance(1_000);
            let px = stage.viewport().to_px(stage.ghost(entity).unwrap().position());
            assert!(px.x >= 100.0 && px.x <= 400.0, "{px:?}");
        }

        assert!(stage.remove_frame("box"));
        assert!(!stage.remove_frame("box"));
        stage.advance(600_000);
        let pos = stage.ghost(entity).unwrap().position();
        assert!(pos.x >= 5.0 && pos.y >= 5.0);
    }

    #[test]
    fn resize_updates_drawn_size_only() {
        let mut stage = Stage::with_seed(Viewport::new(1280.0, 800.0), 7);
        let entity = stage.mount(still(50));
        let before = stage.ghost(entity).unwrap().position();
        stage.resize(Viewport::new(2560.0, 1440.0));
        let ghost = stage.ghost(entity).unwrap();
        assert_eq!(ghost.position(), before);
        assert!((ghost.render_size().width - 46.0).abs() < 1e-3);
    }

    #[test]
    fn shrinking_viewport_pulls_boxes_inside() {
        let mut stage = Stage::with_seed(Viewport::new(1920.0, 1080.0), 12);
        let entities: Vec<_> = (0..20).map(|_| stage.mount(still(50))).collect();
        let small = Viewport::new(100.0, 80.0);
        stage.resize(small);
        for entity in entities {
            let ghost = stage.ghost(entity).unwrap();
            let size = ghost.render_size();
            let px = small.to_px(ghost.position());
            assert!(px.x + size.width <= small.width * 0.98 + 1e-3, "{px:?}");
            assert!(px.y + size.height <= small.height * 0.95 + 1e-3, "{px:?}");
        }
    }

    #[test]
    fn instances_sorted_by_z() {
        let mut stage = Stage::with_seed(Viewport::new(1280.0, 800.0), 8);
        stage.mount(still(70));
        stage.mount(GhostConfig {
            z_index: 20,
            ..GhostConfig::default()
        });
        stage.mount(still(40));
        let (ghosts, particles) = stage.build_instances();
        let z: Vec<_> = ghosts.iter().map(|g| g.z_index).collect();
        assert_eq!(z, vec![20, 40, 70]);
        assert_eq!(particles.len(), 3);
    }

    #[test]
    fn reconfigure_unknown_entity_is_rejected() {
        let mut stage = Stage::with_seed(Viewport::new(1280.0, 800.0), 9);
        let entity = stage.mount(still(50));
        stage.unmount(entity);
        assert!(!stage.reconfigure(entity, GhostConfig::default()));
    }

    #[test]
    fn click_reaction_plays_out_through_stage() {
        let mut stage = Stage::with_seed(Viewport::new(1280.0, 800.0), 10);
        let entity = stage.mount(still(50));
        let at = center_of(&stage, entity);
        assert_eq!(stage.click_at(at), Some(entity));
        stage.advance(300);
        assert_eq!(stage.ghost(entity).unwrap().mood(), MoodState::Surprised);
        stage.advance(700);
        assert_eq!(stage.ghost(entity).unwrap().mood(), MoodState::Idle);
    }

    #[test]
    fn follower_chases_pointer() {
        let mut stage = Stage::with_seed(Viewport::new(1280.0, 800.0), 11);
        let entity = stage.mount(GhostConfig {
            behavior: Behavior::Follow,
            effects: false,
            ..GhostConfig::default()
        });
        assert!(stage.set_follower(entity, crate::ghost::movement::EaseToward::default()));

        let target = Vec2::new(640.0, 400.0);
        stage.pointer_moved(target);
        let start = stage.ghost(entity).unwrap().position();
        stage.advance(15_000);
        let end = stage.ghost(entity).unwrap().position();
        let goal = stage.viewport().to_pct(target);
        assert!(end.distance(goal) < start.distance(goal));
    }
}
