//! # Noise Field Module
//!
//! Deterministic scalar terrain function. Wraps the `noise` crate's Perlin
//! gradient noise behind a multi-octave sampler with an explicit seed, so
//! the same seed and coordinates always produce the same terrain.

use noise::{NoiseFn, Perlin};

/// A seeded, stateless source of multi-octave gradient noise.
pub struct NoiseField {
    perlin: Perlin,
    seed: u32,
}

impl NoiseField {
    /// Creates a noise field for the given seed.
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
        }
    }

    /// The seed this field was constructed with.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Samples the field at the given coordinates.
    ///
    /// Octaves are summed with halved amplitude and doubled frequency per
    /// step and the result is normalized back into roughly `[-1, 1]`.
    /// An octave count of zero is treated as one.
    pub fn sample(&self, octaves: u32, x: f64, y: f64, z: f64) -> f64 {
        let mut sum = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut norm = 0.0;

        for _ in 0..octaves.max(1) {
            sum += amplitude * self.perlin.get([x * frequency, y * frequency, z * frequency]);
            norm += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        sum / norm
    }
}
