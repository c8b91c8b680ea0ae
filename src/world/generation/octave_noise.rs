//! Octave noise helpers
//!
//! Thin wrapper over `noise::Simplex` that sums octaves by hand and
//! normalises the result into [0, 1].

use noise::{NoiseFn, Simplex};

/// Seeded multi-octave simplex source
#[derive(Clone)]
pub struct OctaveNoise {
    simplex: Simplex,
}

impl std::fmt::Debug for OctaveNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctaveNoise").finish_non_exhaustive()
    }
}

impl OctaveNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            simplex: Simplex::new(seed),
        }
    }

    /// 2-D fractal noise in [0, 1]
    pub fn sample2(&self, x: f64, z: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        self.accumulate(octaves, persistence, lacunarity, |freq| {
            self.simplex.get([x * freq, z * freq])
        })
    }

    /// 3-D fractal noise in [0, 1]
    pub fn sample3(
        &self,
        x: f64,
        y: f64,
        z: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
    ) -> f64 {
        self.accumulate(octaves, persistence, lacunarity, |freq| {
            self.simplex.get([x * freq, y * freq, z * freq])
        })
    }

    fn accumulate<F>(&self, octaves: u32, persistence: f64, lacunarity: f64, sample: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let mut freq = 1.0;
        let mut amp = 1.0;
        let mut max = 1.0;
        let mut total = sample(freq);
        for _ in 1..octaves {
            freq *= lacunarity;
            amp *= persistence;
            max += amp;
            total += sample(freq) * amp;
        }
        ((1.0 + total / max) / 2.0).clamp(0.0, 1.0)
    }
}
