use glam::{vec2, UVec2, Vec2};

use crate::Sampler;

/// Low-discrepancy, blue-noise-distributed sampler over the scrambled-Sobol
/// tables published by Heitz et al. ("A Low-Discrepancy Sampler that
/// Distributes Monte Carlo Errors as a Blue Noise in Screen Space").
///
/// Tables are expected in the `spp2` layout: 256x256 Sobol entries and
/// 128x128x8 scrambling and ranking tiles.
#[derive(Clone, Copy)]
pub struct BlueNoise<'a> {
    sobol: &'a [u32],
    scrambling_tile: &'a [u32],
    ranking_tile: &'a [u32],
    pixel: UVec2,
    sample_idx: u32,
}

impl<'a> BlueNoise<'a> {
    pub const SOBOL_LEN: usize = 256 * 256;
    pub const TILE_LEN: usize = 128 * 128 * 8;

    pub fn new(
        sobol: &'a [u32],
        scrambling_tile: &'a [u32],
        ranking_tile: &'a [u32],
        pixel: UVec2,
        sample_idx: u32,
    ) -> Self {
        Self {
            sobol,
            scrambling_tile,
            ranking_tile,
            pixel,
            sample_idx,
        }
    }

    /// Returns a sample in `<0.0, 1.0)` for given dimension.
    pub fn sample(&self, dim: u32) -> f32 {
        let x = self.pixel.x & 127;
        let y = self.pixel.y & 127;
        let sample_idx = self.sample_idx & 255;
        let dim = dim & 255;
        let tile = ((dim % 8) + (x + y * 128) * 8) as usize;

        let ranked_idx = sample_idx ^ self.ranking_tile[tile];
        let value = self.sobol[(dim + ranked_idx * 256) as usize];
        let value = value ^ self.scrambling_tile[tile];

        (0.5 + value as f32) / 256.0
    }
}

impl Sampler for BlueNoise<'_> {
    fn sample_2d(&mut self, ray: u32) -> Vec2 {
        vec2(self.sample(2 * ray), self.sample(2 * ray + 1))
    }
}
