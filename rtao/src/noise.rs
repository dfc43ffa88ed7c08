use glam::UVec2;

use crate::{gpu, Bindable, StorageBuffer};

/// Scrambled-Sobol tables driving the blue-noise sampler, converted into the
/// layout expected by [`gpu::BlueNoise`].
#[derive(Clone, Debug)]
pub struct BlueNoiseTables {
    pub sobol: Vec<u32>,
    pub scrambling_tile: Vec<u32>,
    pub ranking_tile: Vec<u32>,
}

impl BlueNoiseTables {
    pub fn new() -> Self {
        use blue_noise_sampler::spp2 as bn;

        let this = Self {
            sobol: bn::SOBOL.iter().map(|&v| v as u32).collect(),
            scrambling_tile: bn::SCRAMBLING_TILE
                .iter()
                .map(|&v| v as u32)
                .collect(),
            ranking_tile: bn::RANKING_TILE.iter().map(|&v| v as u32).collect(),
        };

        assert!(this.sobol.len() >= gpu::BlueNoise::SOBOL_LEN);
        assert!(this.scrambling_tile.len() >= gpu::BlueNoise::TILE_LEN);
        assert!(this.ranking_tile.len() >= gpu::BlueNoise::TILE_LEN);

        this
    }

    pub fn sampler(&self, pixel: UVec2, sample_idx: u32) -> gpu::BlueNoise<'_> {
        gpu::BlueNoise::new(
            &self.sobol,
            &self.scrambling_tile,
            &self.ranking_tile,
            pixel,
            sample_idx,
        )
    }
}

impl Default for BlueNoiseTables {
    fn default() -> Self {
        Self::new()
    }
}

/// Blue-noise tables uploaded into the GPU.
#[derive(Debug)]
pub struct Noise {
    blue_noise_sobol: StorageBuffer,
    blue_noise_scrambling_tile: StorageBuffer,
    blue_noise_ranking_tile: StorageBuffer,
}

impl Noise {
    pub fn new(device: &wgpu::Device) -> Self {
        let tables = BlueNoiseTables::new();

        Self {
            blue_noise_sobol: StorageBuffer::new(
                device,
                "rtao_blue_noise_sobol",
                &tables.sobol,
            ),
            blue_noise_scrambling_tile: StorageBuffer::new(
                device,
                "rtao_blue_noise_scrambling_tile",
                &tables.scrambling_tile,
            ),
            blue_noise_ranking_tile: StorageBuffer::new(
                device,
                "rtao_blue_noise_ranking_tile",
                &tables.ranking_tile,
            ),
        }
    }

    /// Binds all three tables, at consecutive bindings.
    pub fn bind_blue_noise(&self) -> impl Bindable + '_ {
        BlueNoiseBinder { parent: self }
    }
}

struct BlueNoiseBinder<'a> {
    parent: &'a Noise,
}

impl Bindable for BlueNoiseBinder<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        [
            &self.parent.blue_noise_sobol,
            &self.parent.blue_noise_scrambling_tile,
            &self.parent.blue_noise_ranking_tile,
        ]
        .into_iter()
        .enumerate()
        .flat_map(|(idx, buffer)| buffer.bind(binding + idx as u32))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;
    use crate::gpu::Sampler;

    #[test]
    fn samples_stay_in_unit_square() {
        let tables = BlueNoiseTables::new();

        for y in 0..4 {
            for x in 0..4 {
                let mut sampler = tables.sampler(uvec2(x, y), 3);

                for ray in 0..8 {
                    let sample = sampler.sample_2d(ray);

                    assert!(sample.x > 0.0 && sample.x < 1.0);
                    assert!(sample.y > 0.0 && sample.y < 1.0);
                }
            }
        }
    }
}
