use glam::{vec2, UVec2, Vec2};

use crate::Sampler;

/// Per-pixel PCG-style hash.
#[derive(Copy, Clone, Debug)]
pub struct WhiteNoise {
    state: u32,
}

impl WhiteNoise {
    pub fn new(seed: u32, id: UVec2) -> Self {
        Self {
            state: seed
                ^ 48619u32.wrapping_mul(id.x)
                ^ 95461u32.wrapping_mul(id.y),
        }
    }

    /// Generates a uniform sample in range `<0.0, 1.0>`.
    pub fn sample(&mut self) -> f32 {
        (self.sample_int() as f32) / (u32::MAX as f32)
    }

    /// Generates a uniform sample in range `<0, u32::MAX>`.
    pub fn sample_int(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(747796405).wrapping_add(2891336453);

        let word = ((self.state >> ((self.state >> 28) + 4)) ^ self.state)
            .wrapping_mul(277803737);

        (word >> 22) ^ word
    }
}

impl Sampler for WhiteNoise {
    fn sample_2d(&mut self, _: u32) -> Vec2 {
        vec2(self.sample(), self.sample())
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;

    #[test]
    fn is_deterministic_per_pixel() {
        let mut a = WhiteNoise::new(1, uvec2(10, 20));
        let mut b = WhiteNoise::new(1, uvec2(10, 20));
        let mut c = WhiteNoise::new(2, uvec2(10, 20));

        let a = a.sample_int();

        assert_eq!(a, b.sample_int());
        assert_ne!(a, c.sample_int());
    }

    #[test]
    fn samples_stay_in_range() {
        let mut noise = WhiteNoise::new(123, uvec2(4, 5));

        for _ in 0..1000 {
            let sample = noise.sample();

            assert!((0.0..=1.0).contains(&sample));
        }
    }
}
