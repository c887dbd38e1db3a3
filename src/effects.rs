use glam::Vec2;

use crate::rng::RandomSource;

/// Sparkles per burst.
pub const SPARKLE_BURST: usize = 3;
/// Sparkle lifetime in milliseconds.
pub const SPARKLE_LIFETIME_MS: u64 = 2_000;
/// Trail particle lifetime in milliseconds.
pub const TRAIL_LIFETIME_MS: u64 = 1_500;
/// Fraction of movement ticks that leave a trail particle.
const TRAIL_CHANCE: f32 = 0.3;
/// Sparkle offsets span this many percent of the ghost box either side.
const SPARKLE_SPREAD: f32 = 50.0;
/// Live particles kept per kind; the oldest is dropped past this.
const MAX_PER_KIND: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Offset is relative to the ghost box, in percent of its size.
    Sparkle,
    /// Offset is an absolute viewport-percent position on the trail surface.
    Trail,
}

impl ParticleKind {
    pub fn lifetime_ms(self) -> u64 {
        match self {
            ParticleKind::Sparkle => SPARKLE_LIFETIME_MS,
            ParticleKind::Trail => TRAIL_LIFETIME_MS,
        }
    }
}

/// A short-lived visual element. Never changes after creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub id: ParticleId,
    pub kind: ParticleKind,
    pub offset: Vec2,
    pub born_ms: u64,
}

impl Particle {
    /// Fraction of lifetime used at `now_ms`, in `[0, 1]`.
    pub fn age(&self, now_ms: u64) -> f32 {
        let elapsed = now_ms.saturating_sub(self.born_ms) as f32;
        (elapsed / self.kind.lifetime_ms() as f32).clamp(0.0, 1.0)
    }
}

/// Sparkle and trail particles for one ghost.
#[derive(Debug, Clone, Default)]
pub struct Effects {
    particles: Vec<Particle>,
    next_id: u64,
}

impl Effects {
    pub fn new() -> Self {
        Self {
            particles: Vec::with_capacity(SPARKLE_BURST * 4),
            next_id: 0,
        }
    }

    /// Spawn a sparkle batch around the ghost. Returns the new ids so the
    /// caller can schedule their expiry.
    pub fn sparkle_burst(&mut self, rng: &mut impl RandomSource, now_ms: u64) -> Vec<ParticleId> {
        (0..SPARKLE_BURST)
            .map(|_| {
                let offset = Vec2::new(
                    rng.centered(SPARKLE_SPREAD),
                    rng.centered(SPARKLE_SPREAD),
                );
                self.push(ParticleKind::Sparkle, offset, now_ms)
            })
            .collect()
    }

    /// Roll the trail gate and maybe leave a particle at `pos`.
    pub fn maybe_trail(
        &mut self,
        rng: &mut impl RandomSource,
        pos: Vec2,
        now_ms: u64,
    ) -> Option<ParticleId> {
        if rng.f32() > TRAIL_CHANCE {
            return None;
        }
        Some(self.push(ParticleKind::Trail, pos, now_ms))
    }

    fn push(&mut self, kind: ParticleKind, offset: Vec2, now_ms: u64) -> ParticleId {
        if self.count(kind) >= MAX_PER_KIND {
            if let Some(oldest) = self.particles.iter().position(|p| p.kind == kind) {
                self.particles.remove(oldest);
            }
        }
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        self.particles.push(Particle {
            id,
            kind,
            offset,
            born_ms: now_ms,
        });
        id
    }

    /// Remove a particle. Already-removed ids are a no-op and return false.
    pub fn expire(&mut self, id: ParticleId) -> bool {
        match self.particles.iter().position(|p| p.id == id) {
            Some(idx) => {
                self.particles.remove(idx);
                true
            }
            None => {
                log::trace!("particle {id:?} already gone");
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Live particles, oldest first.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn count(&self, kind: ParticleKind) -> usize {
        self.particles.iter().filter(|p| p.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;

    #[test]
    fn burst_offsets_span_the_box() {
        let mut fx = Effects::new();
        let mut rng = ScriptedRng::new(vec![0.0, 1.0, 0.5, 0.5, 0.25, 0.75]);
        let ids = fx.sparkle_burst(&mut rng, 10);
        assert_eq!(ids.len(), SPARKLE_BURST);
        let offsets: Vec<Vec2> = fx.particles().iter().map(|p| p.offset).collect();
        assert_eq!(
            offsets,
            vec![
                Vec2::new(-50.0, 50.0),
                Vec2::new(0.0, 0.0),
                Vec2::new(-25.0, 25.0)
            ]
        );
        assert!(fx.particles().iter().all(|p| p.born_ms == 10));
    }

    #[test]
    fn trail_gate_is_thirty_percent() {
        let mut fx = Effects::new();
        let pos = Vec2::new(30.0, 40.0);
        assert!(fx.maybe_trail(&mut ScriptedRng::constant(0.31), pos, 0).is_none());
        let id = fx.maybe_trail(&mut ScriptedRng::constant(0.3), pos, 0).unwrap();
        assert_eq!(fx.particles()[0].id, id);
        assert_eq!(fx.particles()[0].offset, pos);
        assert_eq!(fx.count(ParticleKind::Trail), 1);
    }

    #[test]
    fn expire_is_guarded() {
        let mut fx = Effects::new();
        let mut rng = ScriptedRng::constant(0.1);
        let id = fx.maybe_trail(&mut rng, Vec2::ZERO, 0).unwrap();
        assert!(fx.expire(id));
        assert!(!fx.expire(id));
        assert!(fx.is_empty());
    }

    #[test]
    fn oldest_dropped_at_capacity() {
        let mut fx = Effects::new();
        let mut rng = ScriptedRng::constant(0.0);
        let first = fx.maybe_trail(&mut rng, Vec2::ZERO, 0).unwrap();
        for t in 1..MAX_PER_KIND as u64 {
            fx.maybe_trail(&mut rng, Vec2::ZERO, t);
        }
        assert_eq!(fx.count(ParticleKind::Trail), MAX_PER_KIND);
        fx.maybe_trail(&mut rng, Vec2::ZERO, 999);
        assert_eq!(fx.count(ParticleKind::Trail), MAX_PER_KIND);
        assert!(!fx.expire(first));
    }

    #[test]
    fn age_runs_from_zero_to_one() {
        let p = Particle {
            id: ParticleId(0),
            kind: ParticleKind::Trail,
            offset: Vec2::ZERO,
            born_ms: 1_000,
        };
        assert_eq!(p.age(1_000), 0.0);
        assert_eq!(p.age(1_750), 0.5);
        assert_eq!(p.age(9_000), 1.0);
    }
}
