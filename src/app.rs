use std::path::Path;

use glam::Vec2;
use instant::Instant;

use ghostpet::config::{Behavior, GhostConfig, SpeedTier};
use ghostpet::geometry::{FrameRect, Viewport};
use ghostpet::ghost::movement::EaseToward;
use ghostpet::Stage;

/// Simulated frame length (milliseconds).
const FRAME_MS: u64 = 16;
/// How long the demo runs, in simulated milliseconds.
const DEMO_LENGTH_MS: u64 = 30_000;
/// How often to log ghost state and frame timing (simulated milliseconds).
const LOG_INTERVAL_MS: u64 = 5_000;
/// Gap between scripted clicks on the first ghost.
const CLICK_INTERVAL_MS: u64 = 1_600;
/// The host flips to dark mode at this point.
const DARK_MODE_AT_MS: u64 = 10_000;
/// The first ghost is sped up at this point.
const SPEED_UP_AT_MS: u64 = 20_000;
/// Radius of the pointer's circular sweep, pixels.
const POINTER_ORBIT: f32 = 200.0;

const VIEWPORT: Viewport = Viewport {
    width: 1280.0,
    height: 800.0,
};

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

/// Wall-clock cost of each simulated frame.
struct FrameStats {
    frame_count: u64,
    frame_time_sum: f64,
    frame_time_min: f64,
    frame_time_max: f64,
    frames_since_log: u32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            frame_time_sum: 0.0,
            frame_time_min: f64::MAX,
            frame_time_max: 0.0,
            frames_since_log: 0,
        }
    }

    fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frames_since_log += 1;
        self.frame_time_sum += dt;
        self.frame_time_min = self.frame_time_min.min(dt);
        self.frame_time_max = self.frame_time_max.max(dt);
    }

    fn log_and_reset(&mut self) {
        if self.frames_since_log == 0 {
            return;
        }
        let avg_us = (self.frame_time_sum / self.frames_since_log as f64) * 1_000_000.0;
        log::info!(
            "frame cost avg: {:.1}us | min: {:.1}us | max: {:.1}us | total frames: {}",
            avg_us,
            self.frame_time_min * 1_000_000.0,
            self.frame_time_max * 1_000_000.0,
            self.frame_count,
        );
        self.frame_time_sum = 0.0;
        self.frame_time_min = f64::MAX;
        self.frame_time_max = 0.0;
        self.frames_since_log = 0;
    }
}

// ---------------------------------------------------------------------------
// Demo
// ---------------------------------------------------------------------------

/// Ghosts used when no config file is given: a roamer, one confined to a
/// sidebar container and one following the pointer.
fn default_configs() -> Vec<GhostConfig> {
    vec![
        GhostConfig {
            identity: "home".into(),
            ..GhostConfig::default()
        },
        GhostConfig {
            identity: "sidebar".into(),
            frame_id: Some("sidebar".into()),
            speed: SpeedTier::Slow,
            z_index: 60,
            ..GhostConfig::default()
        },
        GhostConfig {
            identity: "cursor".into(),
            behavior: Behavior::Follow,
            effects: false,
            z_index: 70,
            ..GhostConfig::default()
        },
    ]
}

fn center_px(stage: &Stage, entity: hecs::Entity) -> Option<Vec2> {
    let ghost = stage.ghost(entity)?;
    let size = ghost.render_size();
    Some(stage.viewport().to_px(ghost.position()) + Vec2::new(size.width, size.height) * 0.5)
}

fn log_ghosts(stage: &Stage, entities: &[hecs::Entity]) {
    for &entity in entities {
        let Some(ghost) = stage.ghost(entity) else {
            continue;
        };
        let pos = ghost.position();
        log::info!(
            "  {:<8} pos=({:5.1}, {:5.1}) mood={:?} emote={} clicks={} visible={} dark={}",
            ghost.config().identity,
            pos.x,
            pos.y,
            ghost.mood(),
            ghost.emote().map_or("-", |e| e.symbol()),
            ghost.interactions(),
            ghost.is_visible(),
            ghost.is_dark(),
        );
    }
}

/// Entry point: run the scripted demo in simulated time.
///
/// An optional first argument names a JSON file holding one config or a
/// list of them.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let configs = match std::env::args().nth(1) {
        Some(path) => {
            let configs = GhostConfig::load_all(Path::new(&path))?;
            log::info!("Loaded {} ghost configs from {path}", configs.len());
            configs
        }
        None => default_configs(),
    };

    let mut stage = Stage::new(VIEWPORT);
    stage.set_frame("sidebar", FrameRect::new(960.0, 80.0, 300.0, 640.0));

    let entities: Vec<_> = configs
        .into_iter()
        .map(|config| {
            let follow = config.behavior == Behavior::Follow;
            let entity = stage.mount(config);
            if follow {
                stage.set_follower(entity, EaseToward::default());
            }
            entity
        })
        .collect();
    log::info!("Mounted {} ghosts", stage.len());

    let mut frame_stats = FrameStats::new();
    let mut next_click = CLICK_INTERVAL_MS;
    let mut next_log = LOG_INTERVAL_MS;
    let center = Vec2::new(VIEWPORT.width, VIEWPORT.height) * 0.5;

    let mut now = 0;
    while now < DEMO_LENGTH_MS {
        let started = Instant::now();

        let angle = now as f32 / 1_000.0;
        stage.pointer_moved(center + Vec2::new(angle.cos(), angle.sin()) * POINTER_ORBIT);

        if now >= next_click {
            next_click += CLICK_INTERVAL_MS;
            if let Some(at) = entities.first().and_then(|&e| center_px(&stage, e)) {
                if stage.click_at(at).is_none() {
                    log::debug!("click at ({:.0}, {:.0}) hit nothing", at.x, at.y);
                }
            }
        }
        if now == DARK_MODE_AT_MS {
            log::info!("Host switched to dark mode");
            stage.set_dark_mode(true);
        }
        if now == SPEED_UP_AT_MS {
            if let Some(&first) = entities.first() {
                let config = stage.ghost(first).map(|g| GhostConfig {
                    speed: SpeedTier::Fast,
                    ..g.config().clone()
                });
                if let Some(config) = config {
                    log::info!("Speeding up '{}'", config.identity);
                    stage.reconfigure(first, config);
                }
            }
        }

        stage.advance(FRAME_MS);
        let (ghosts, particles) = stage.build_instances();
        log::trace!("frame {now}: {} ghosts, {} particles", ghosts.len(), particles.len());

        frame_stats.record_frame(started.elapsed().as_secs_f64());
        now += FRAME_MS;

        if now >= next_log {
            next_log += LOG_INTERVAL_MS;
            log::info!("t={:.1}s", now as f64 / 1_000.0);
            log_ghosts(&stage, &entities);
            frame_stats.log_and_reset();
        }
    }

    for entity in entities {
        stage.unmount(entity);
    }
    log::info!("Demo finished, {} ghosts left mounted", stage.len());
    Ok(())
}
