/// Source of uniform random numbers for the simulation.
///
/// Every random branch in the ghost (step size, jitter, maneuver choice,
/// particle offsets) pulls from one of these, so tests can feed a fixed
/// sequence and assert the exact branch taken.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn f32(&mut self) -> f32;

    /// Uniform value in `[min, max)`.
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.f32() * (max - min)
    }

    /// Uniform value in `[-half, half)`.
    fn centered(&mut self, half: f32) -> f32 {
        (self.f32() - 0.5) * half * 2.0
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        ((self.f32() * len as f32) as usize).min(len - 1)
    }
}

impl RandomSource for fastrand::Rng {
    fn f32(&mut self) -> f32 {
        fastrand::Rng::f32(self)
    }
}

/// Replays a fixed list of values, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(values: Vec<f32>) -> Self {
        assert!(!values.is_empty(), "scripted rng needs at least one value");
        Self { values, cursor: 0 }
    }

    /// Always returns `value`.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }

    /// How many values have been drawn so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRng {
    fn f32(&mut self) -> f32 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}
