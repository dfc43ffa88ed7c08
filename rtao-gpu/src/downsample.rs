use glam::{ivec2, UVec2};

use crate::TexR32;

/// Returns the size of given mip level of an image.
pub fn mip_size(base: UVec2, level: u32) -> UVec2 {
    (base >> level).max(UVec2::ONE)
}

/// Computes texel `pos` of the next mip level by averaging the 2x2 footprint
/// of the source level, which is what a bilinear read at the footprint's
/// center yields; texels falling outside of odd-sized sources are clamped.
pub fn downsample(src: impl TexR32, pos: UVec2) -> f32 {
    let base = pos.as_ivec2() * 2;

    (src.read_clamped(base)
        + src.read_clamped(base + ivec2(1, 0))
        + src.read_clamped(base + ivec2(0, 1))
        + src.read_clamped(base + ivec2(1, 1)))
        * 0.25
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::uvec2;

    use super::*;

    struct Checker;

    impl TexR32 for Checker {
        fn size(&self) -> UVec2 {
            uvec2(5, 4)
        }

        fn read(&self, pos: UVec2) -> f32 {
            ((pos.x + pos.y) % 2) as f32
        }
    }

    #[test]
    fn averages_footprint() {
        assert_relative_eq!(downsample(Checker, uvec2(0, 0)), 0.5);
        assert_relative_eq!(downsample(Checker, uvec2(1, 1)), 0.5);
    }

    #[test]
    fn clamps_odd_edge() {
        // (4,0) and (4,1) get duplicated
        assert_relative_eq!(downsample(Checker, uvec2(2, 0)), 0.5);
    }

    #[test]
    fn sizes() {
        assert_eq!(uvec2(320, 180), mip_size(uvec2(640, 360), 1));
        assert_eq!(uvec2(40, 22), mip_size(uvec2(640, 360), 4));
        assert_eq!(uvec2(1, 1), mip_size(uvec2(3, 2), 4));
    }
}
