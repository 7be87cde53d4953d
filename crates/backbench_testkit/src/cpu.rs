//! Deterministic CPU samples.

use backbench_core::CpuSampler;

/// A [`CpuSampler`] that replays a fixed list of readings, cycling when it
/// runs out.
#[derive(Debug, Clone)]
pub struct ScriptedCpuSampler {
    readings: Vec<f32>,
    next: usize,
    taken: usize,
}

impl ScriptedCpuSampler {
    /// Creates a sampler over `readings`. An empty list always reads zero.
    pub fn new(readings: impl Into<Vec<f32>>) -> Self {
        Self {
            readings: readings.into(),
            next: 0,
            taken: 0,
        }
    }

    /// A sampler that always reads `value`.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }

    /// Number of samples taken so far.
    pub fn taken(&self) -> usize {
        self.taken
    }
}

impl Default for ScriptedCpuSampler {
    fn default() -> Self {
        Self::new(vec![12.5, 87.25])
    }
}

impl CpuSampler for ScriptedCpuSampler {
    fn sample(&mut self) -> f32 {
        self.taken += 1;
        if self.readings.is_empty() {
            return 0.0;
        }
        let value = self.readings[self.next];
        self.next = (self.next + 1) % self.readings.len();
        value
    }
}
