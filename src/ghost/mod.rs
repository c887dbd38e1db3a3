pub mod flags;
pub mod interaction;
pub mod maneuver;
pub mod movement;
pub mod sizing;

use glam::Vec2;

use crate::config::{Behavior, GhostConfig};
use crate::debug::ring::RingBuffer;
use crate::debug::{DebugReadout, PATH_HISTORY_LEN};
use crate::effects::{Effects, Particle, ParticleId, ParticleKind};
use crate::geometry::{Bounds, EntitySize, FrameLookup, Viewport};
use crate::rng::RandomSource;
use crate::scheduler::{Scheduler, TimerGroup, TimerId};
use crate::theme::{Subscription, ThemeSource};

use self::flags::{VisualFlag, VisualFlags};
use self::interaction::{
    Emote, Expression, Interaction, MoodState, Reaction, GREETING_MS, POP_MS, REAPPEAR_AFTER_MS,
    RESET_AFTER_MS, REVEAL_DELAY_MS, VANISH_DELAY_MS,
};
use self::maneuver::{Maneuver, PAUSE_MS};
use self::movement::{Follower, Stationary};

/// How long the bump cue stays after a wall bounce.
const BUMP_MS: u64 = 300;
/// Primary tick = base period / this.
const PRIMARY_DIVISOR: u64 = 8;
/// Maneuver tick = base period / this.
const MANEUVER_DIVISOR: u64 = 2;
/// Rescue tick = base period * this.
const RESCUE_MULTIPLIER: u64 = 2;

/// Which way the body is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    RoamTick,
    ManeuverTick,
    RescueTick,
    FollowTick,
    Reveal { reaction: Reaction, farewell: bool },
    Revert,
    CueEnd(VisualFlag),
    Vanish,
    Reappear,
    ClearGreeting,
    ResetCounter,
    ExpireParticle(ParticleId),
}

/// One mounted roaming ghost.
///
/// Owns its position, heading, interaction state, particles and every timer
/// that drives them. Time only moves through [`Ghost::advance`].
pub struct Ghost<R = fastrand::Rng> {
    config: GhostConfig,
    position: Vec2,
    direction: Vec2,
    viewport: Viewport,
    measured: Option<EntitySize>,
    pointer: Option<Vec2>,
    interaction: Interaction,
    flags: VisualFlags,
    cue_timers: Vec<(VisualFlag, TimerId)>,
    effects: Effects,
    scheduler: Scheduler<TimerEvent>,
    follower: Box<dyn Follower + Send + Sync>,
    theme_sub: Option<Subscription>,
    system_dark: bool,
    history: RingBuffer<Vec2>,
    rng: R,
}

impl<R: RandomSource> Ghost<R> {
    /// Seed position and heading, subscribe to the theme and start the
    /// behavior regime.
    pub fn mount(
        config: GhostConfig,
        viewport: Viewport,
        frames: &dyn FrameLookup,
        theme: &mut dyn ThemeSource,
        rng: R,
    ) -> Self {
        let mut ghost = Self {
            config,
            position: Vec2::splat(50.0),
            direction: Vec2::ONE,
            viewport,
            measured: None,
            pointer: None,
            interaction: Interaction::new(),
            flags: VisualFlags::default(),
            cue_timers: Vec::with_capacity(3),
            effects: Effects::new(),
            scheduler: Scheduler::new(),
            follower: Box::new(Stationary),
            theme_sub: Some(theme.subscribe()),
            system_dark: theme.is_dark(),
            history: RingBuffer::new(PATH_HISTORY_LEN),
            rng,
        };
        ghost.seed(frames);
        ghost.start_regime();
        log::debug!(
            "ghost '{}' mounted at ({:.1}, {:.1}), behavior={}",
            ghost.config.identity,
            ghost.position.x,
            ghost.position.y,
            ghost.config.behavior.label(),
        );
        ghost
    }

    /// Replace the steering used in `follow` mode.
    pub fn set_follower(&mut self, follower: impl Follower + Send + Sync + 'static) {
        self.follower = Box::new(follower);
    }

    /// Apply a new configuration. Behavior or speed changes tear down every
    /// timer before the new regime starts; frame, identity or effects changes
    /// reseed the ghost.
    pub fn reconfigure(&mut self, config: GhostConfig, frames: &dyn FrameLookup) {
        let reschedule = self.config.needs_reschedule(&config);
        let reseed = self.config.needs_reseed(&config);
        self.config = config;

        if !self.config.interactive {
            self.interaction.set_hovered(false);
        }
        if !self.config.effects {
            self.scheduler.cancel_group(TimerGroup::Particle);
            self.effects.clear();
        }
        if !self.config.debug {
            self.history.clear();
        }
        if reschedule {
            self.stop_all();
            self.start_regime();
            log::debug!(
                "ghost '{}' regime restarted: behavior={}, speed={:?}",
                self.config.identity,
                self.config.behavior.label(),
                self.config.speed,
            );
        }
        if reseed {
            self.seed(frames);
        }
    }

    /// Tear down: cancel every timer and drop the theme subscription.
    pub fn unmount(mut self, theme: &mut dyn ThemeSource) {
        self.stop_all();
        if let Some(sub) = self.theme_sub.take() {
            theme.unsubscribe(sub);
        }
        log::debug!("ghost '{}' unmounted", self.config.identity);
    }

    /// Fire every timer due within the next `dt_ms`, in time order.
    pub fn advance(&mut self, dt_ms: u64, frames: &dyn FrameLookup) {
        let until = self.scheduler.now_ms() + dt_ms;
        while let Some(fired) = self.scheduler.pop_due(until) {
            log::trace!(
                "ghost '{}' timer {:?} ({:?}) fired at {}ms",
                self.config.identity,
                fired.id,
                fired.group,
                fired.at_ms,
            );
            self.handle(fired.event, frames);
        }
        self.scheduler.settle(until);
    }

    /// User clicked the ghost. Returns whether the click was taken.
    pub fn click(&mut self) -> bool {
        if !self.config.interactive {
            return false;
        }
        let Some(click) = self.interaction.register_click() else {
            return false;
        };

        if self.config.effects {
            self.sparkle_burst();
        }

        self.scheduler.cancel_group(TimerGroup::Reaction);
        self.flags.remove_reactions();
        self.raise_cue(VisualFlag::Pop, POP_MS);
        self.scheduler.after(
            REVEAL_DELAY_MS,
            TimerGroup::Reaction,
            TimerEvent::Reveal {
                reaction: click.reaction,
                farewell: click.farewell,
            },
        );
        self.scheduler.after(
            click.reaction.revert_after_ms(),
            TimerGroup::Reaction,
            TimerEvent::Revert,
        );

        if click.farewell {
            self.scheduler
                .after(VANISH_DELAY_MS, TimerGroup::Vanish, TimerEvent::Vanish);
            self.scheduler
                .after(REAPPEAR_AFTER_MS, TimerGroup::Vanish, TimerEvent::Reappear);
            self.scheduler.after(
                REAPPEAR_AFTER_MS + GREETING_MS,
                TimerGroup::Vanish,
                TimerEvent::ClearGreeting,
            );
            self.scheduler
                .after(RESET_AFTER_MS, TimerGroup::Vanish, TimerEvent::ResetCounter);
            log::debug!("ghost '{}' waving goodbye", self.config.identity);
        }

        log::trace!(
            "ghost '{}' clicked: count={}, reaction={:?}",
            self.config.identity,
            click.count,
            click.reaction,
        );
        true
    }

    /// Pointer entered or left the ghost. Ignored when not interactive.
    pub fn set_hovered(&mut self, hovered: bool) {
        self.interaction
            .set_hovered(hovered && self.config.interactive);
    }

    /// Latest pointer position in viewport percent, for `follow` mode.
    pub fn pointer_moved(&mut self, pointer: Vec2) {
        self.pointer = Some(pointer);
    }

    /// New viewport size. The position keeps its percentages unless the box
    /// no longer fits, in which case it is pulled back inside.
    pub fn resize(&mut self, viewport: Viewport, frames: &dyn FrameLookup) {
        self.viewport = viewport;
        self.position = self.bounds(frames).constrain(self.position);
    }

    /// Rendered size reported by the render layer; `None` falls back to the
    /// default box.
    pub fn set_measured_size(&mut self, size: Option<EntitySize>) {
        self.measured = size;
    }

    /// Pick up any theme change published since the last call.
    pub fn sync_theme(&mut self, theme: &mut dyn ThemeSource) {
        if let Some(dark) = self.theme_sub.and_then(|sub| theme.poll(sub)) {
            self.system_dark = dark;
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &GhostConfig {
        &self.config
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn facing(&self) -> Facing {
        if self.direction.x < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        }
    }

    pub fn interactions(&self) -> u32 {
        self.interaction.count()
    }

    pub fn mood(&self) -> MoodState {
        self.interaction.mood()
    }

    pub fn emote(&self) -> Option<Emote> {
        self.interaction.emote()
    }

    pub fn is_visible(&self) -> bool {
        self.interaction.is_visible()
    }

    pub fn is_hovered(&self) -> bool {
        self.interaction.is_hovered()
    }

    pub fn expression(&self) -> Expression {
        self.interaction.expression(self.config.mood)
    }

    pub fn speech_line(&self) -> Option<&'static str> {
        self.interaction.speech_line()
    }

    pub fn flags(&self) -> VisualFlags {
        self.flags
    }

    pub fn particles(&self) -> &[Particle] {
        self.effects.particles()
    }

    pub fn is_dark(&self) -> bool {
        self.config.dark_mode.unwrap_or(self.system_dark)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Size the render layer should draw at.
    pub fn render_size(&self) -> EntitySize {
        sizing::responsive_size(self.config.size, self.viewport, self.config.responsive_scale)
    }

    /// Ghost-local clock in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn pending_behavior_timers(&self) -> usize {
        self.scheduler.pending(TimerGroup::Behavior)
    }

    /// Overlay text, only when the debug flag is set.
    pub fn debug_readout(&self) -> Option<DebugReadout> {
        self.config.debug.then(|| {
            DebugReadout::new(
                self.position,
                self.direction,
                self.interaction.count(),
                &self.history,
            )
        })
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn bounds(&self, frames: &dyn FrameLookup) -> Bounds {
        let frame = self.config.frame_id.as_deref().and_then(|id| {
            let rect = frames.frame_rect(id);
            if rect.is_none() {
                log::trace!("frame '{id}' not found, using viewport");
            }
            rect
        });
        Bounds {
            viewport: self.viewport,
            frame,
            entity: self.measured.unwrap_or_default(),
        }
    }

    fn seed(&mut self, frames: &dyn FrameLookup) {
        let bounds = self.bounds(frames);
        self.position = movement::seed_position(&bounds, &mut self.rng);
        self.direction = movement::seed_direction(&mut self.rng);
        self.history.clear();
        if self.config.effects {
            self.sparkle_burst();
        }
    }

    fn start_regime(&mut self) {
        let base = self.config.speed.base_period_ms();
        match self.config.behavior {
            Behavior::Roam => {
                self.scheduler.every(
                    base / PRIMARY_DIVISOR,
                    TimerGroup::Behavior,
                    TimerEvent::RoamTick,
                );
                self.scheduler.every(
                    base / MANEUVER_DIVISOR,
                    TimerGroup::Behavior,
                    TimerEvent::ManeuverTick,
                );
                self.scheduler.every(
                    base * RESCUE_MULTIPLIER,
                    TimerGroup::Behavior,
                    TimerEvent::RescueTick,
                );
            }
            Behavior::Follow => {
                self.scheduler.every(
                    base / PRIMARY_DIVISOR,
                    TimerGroup::Behavior,
                    TimerEvent::FollowTick,
                );
            }
            Behavior::Static => {}
        }
    }

    /// Cancel every timer of every group and drop what they would have
    /// cleaned up.
    fn stop_all(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        self.cue_timers.clear();
        self.flags.clear();
        self.effects.clear();
        self.interaction.settle();
        log::trace!("ghost '{}' cancelled {cancelled} timers", self.config.identity);
    }

    fn sparkle_burst(&mut self) {
        let now = self.scheduler.now_ms();
        for id in self.effects.sparkle_burst(&mut self.rng, now) {
            self.scheduler.after(
                ParticleKind::Sparkle.lifetime_ms(),
                TimerGroup::Particle,
                TimerEvent::ExpireParticle(id),
            );
        }
    }

    /// Raise a cue flag, restarting its countdown if already up.
    fn raise_cue(&mut self, flag: VisualFlag, duration_ms: u64) {
        if let Some(idx) = self.cue_timers.iter().position(|(f, _)| *f == flag) {
            let (_, old) = self.cue_timers.swap_remove(idx);
            self.scheduler.cancel(old);
        }
        self.flags.insert(flag);
        let id = self
            .scheduler
            .after(duration_ms, TimerGroup::Cue, TimerEvent::CueEnd(flag));
        self.cue_timers.push((flag, id));
    }

    fn handle(&mut self, event: TimerEvent, frames: &dyn FrameLookup) {
        match event {
            TimerEvent::RoamTick => self.roam(frames),
            TimerEvent::ManeuverTick => self.run_maneuver(frames),
            TimerEvent::RescueTick => {
                self.direction = movement::rescue_direction(&mut self.rng);
                log::trace!("ghost '{}' rescue re-heading", self.config.identity);
            }
            TimerEvent::FollowTick => {
                let bounds = self.bounds(frames);
                let (pos, dir) = self
                    .follower
                    .follow(self.position, self.direction, self.pointer);
                self.position = bounds.constrain(pos);
                self.direction = dir;
                self.record_position();
            }
            TimerEvent::Reveal { reaction, farewell } => {
                let emote = if farewell {
                    Emote::Wave
                } else {
                    match reaction {
                        Reaction::Surprised => Emote::Exclamation,
                        Reaction::HappyBounce => Emote::Heart,
                        Reaction::Celebrate => {
                            if self.rng.f32() > 0.5 {
                                Emote::Sparkles
                            } else {
                                Emote::Dizzy
                            }
                        }
                    }
                };
                self.interaction.reveal(reaction, emote);
                if self.interaction.mood() == reaction.mood() {
                    self.flags.insert(match reaction {
                        Reaction::Surprised => VisualFlag::Surprised,
                        Reaction::HappyBounce => VisualFlag::HappyBounce,
                        Reaction::Celebrate => VisualFlag::Celebrate,
                    });
                }
            }
            TimerEvent::Revert => {
                self.flags.remove_reactions();
                self.interaction.revert();
            }
            TimerEvent::CueEnd(flag) => {
                self.flags.remove(flag);
                self.cue_timers.retain(|(f, _)| *f != flag);
            }
            TimerEvent::Vanish => {
                self.flags.remove_reactions();
                self.interaction.vanish();
                log::debug!("ghost '{}' vanished", self.config.identity);
            }
            TimerEvent::Reappear => {
                self.interaction.reappear();
                log::debug!("ghost '{}' is back", self.config.identity);
            }
            TimerEvent::ClearGreeting => self.interaction.clear_greeting(),
            TimerEvent::ResetCounter => self.interaction.reset_counter(),
            TimerEvent::ExpireParticle(id) => {
                self.effects.expire(id);
            }
        }
    }

    fn roam(&mut self, frames: &dyn FrameLookup) {
        let bounds = self.bounds(frames);
        let step = movement::roam_step(
            self.position,
            self.direction,
            self.config.speed,
            &bounds,
            &mut self.rng,
        );
        self.position = step.position;
        self.direction = step.direction;
        if step.bounced {
            self.raise_cue(VisualFlag::Bump, BUMP_MS);
        }

        if self.config.effects {
            let now = self.scheduler.now_ms();
            if let Some(id) = self.effects.maybe_trail(&mut self.rng, self.position, now) {
                self.scheduler.after(
                    ParticleKind::Trail.lifetime_ms(),
                    TimerGroup::Particle,
                    TimerEvent::ExpireParticle(id),
                );
            }
        }

        if let Some(dir) = movement::maybe_nudge(self.direction, &mut self.rng) {
            self.direction = dir;
        }
        self.record_position();
    }

    fn run_maneuver(&mut self, frames: &dyn FrameLookup) {
        let Some(picked) = Maneuver::roll(&mut self.rng) else {
            return;
        };
        match picked {
            Maneuver::Dart => {
                let bounds = self.bounds(frames);
                self.position = maneuver::dart(self.position, self.direction, &bounds);
                self.record_position();
            }
            Maneuver::ZigZag => self.direction = maneuver::zig_zag(self.direction),
            Maneuver::Circle => self.direction = maneuver::circle(&mut self.rng),
            Maneuver::Pause => self.raise_cue(VisualFlag::Pause, PAUSE_MS),
        }
        log::trace!("ghost '{}' maneuver {picked:?}", self.config.identity);
    }

    fn record_position(&mut self) {
        if self.config.debug {
            self.history.push(self.position);
        }
    }
}
