use glam::{uvec2, UVec2};

use crate::gpu;

/// Single-channel, mip-mapped image living in RAM.
///
/// Freshly allocated images are filled with NaNs, which stand for undefined
/// contents: any pass reading memory that was never written poisons its
/// output.
#[derive(Clone, Debug)]
pub struct CpuImage {
    mips: Vec<(UVec2, Vec<f32>)>,
}

impl CpuImage {
    pub fn new(size: UVec2, mip_levels: u32) -> Self {
        assert!(size.x > 0);
        assert!(size.y > 0);
        assert!(mip_levels > 0);

        let mips = (0..mip_levels)
            .map(|level| {
                let size = gpu::mip_size(size, level);

                (size, vec![f32::NAN; (size.x * size.y) as usize])
            })
            .collect();

        Self { mips }
    }

    pub fn size(&self) -> UVec2 {
        self.mips[0].0
    }

    pub fn mip_levels(&self) -> u32 {
        self.mips.len() as u32
    }

    pub fn mip(&self, level: u32) -> CpuMip<'_> {
        let (size, texels) = &self.mips[level as usize];

        CpuMip {
            size: *size,
            texels,
        }
    }

    pub fn mips(&self) -> Vec<CpuMip<'_>> {
        (0..self.mip_levels()).map(|level| self.mip(level)).collect()
    }

    /// Replaces the contents of given level.
    pub fn store(&mut self, level: u32, texels: Vec<f32>) {
        let (size, dst) = &mut self.mips[level as usize];

        assert_eq!((size.x * size.y) as usize, texels.len());

        *dst = texels;
    }

    pub fn fill(&mut self, level: u32, value: f32) {
        self.mips[level as usize].1.fill(value);
    }
}

/// Read-only view into a single level of [`CpuImage`].
#[derive(Clone, Copy, Debug)]
pub struct CpuMip<'a> {
    size: UVec2,
    texels: &'a [f32],
}

impl CpuMip<'_> {
    pub fn texels(&self) -> &[f32] {
        self.texels
    }

    /// Evaluates `f` for each texel of an image of given size, in row-major
    /// order.
    pub fn compute(size: UVec2, mut f: impl FnMut(UVec2) -> f32) -> Vec<f32> {
        let mut texels = Vec::with_capacity((size.x * size.y) as usize);

        for y in 0..size.y {
            for x in 0..size.x {
                texels.push(f(uvec2(x, y)));
            }
        }

        texels
    }
}

impl gpu::TexR32 for CpuMip<'_> {
    fn size(&self) -> UVec2 {
        self.size
    }

    fn read(&self, pos: UVec2) -> f32 {
        debug_assert!(pos.x < self.size.x && pos.y < self.size.y);

        self.texels[(pos.x + pos.y * self.size.x) as usize]
    }
}

#[cfg(test)]
mod tests {
    use glam::ivec2;

    use super::*;
    use crate::gpu::TexR32;

    #[test]
    fn mip_chain() {
        let image = CpuImage::new(uvec2(20, 9), 5);

        assert_eq!(uvec2(20, 9), image.mip(0).size());
        assert_eq!(uvec2(10, 4), image.mip(1).size());
        assert_eq!(uvec2(5, 2), image.mip(2).size());
        assert_eq!(uvec2(2, 1), image.mip(3).size());
        assert_eq!(uvec2(1, 1), image.mip(4).size());
    }

    #[test]
    fn starts_undefined() {
        let image = CpuImage::new(uvec2(2, 2), 1);

        assert!(image.mip(0).texels().iter().all(|texel| texel.is_nan()));
    }

    #[test]
    fn store() {
        let mut image = CpuImage::new(uvec2(3, 2), 1);

        image.store(
            0,
            CpuMip::compute(uvec2(3, 2), |pos| (pos.x + pos.y * 10) as f32),
        );

        let mip = image.mip(0);

        assert_eq!(2.0, mip.read(uvec2(2, 0)));
        assert_eq!(11.0, mip.read(uvec2(1, 1)));
        assert_eq!(12.0, mip.read_clamped(ivec2(5, 5)));
    }
}
