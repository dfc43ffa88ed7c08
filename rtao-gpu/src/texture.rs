use glam::{IVec2, UVec2};

/// Single-channel, single-mip image that can be read texel by texel.
///
/// On the GPU this corresponds to `texture_2d<f32>` + `textureLoad()`; on the
/// host it's implemented by the CPU reference executor's images.
pub trait TexR32 {
    fn size(&self) -> UVec2;

    fn read(&self, pos: UVec2) -> f32;

    /// Returns whether given point lays inside the image.
    fn contains(&self, pos: IVec2) -> bool {
        let size = self.size().as_ivec2();

        pos.x >= 0 && pos.y >= 0 && pos.x < size.x && pos.y < size.y
    }

    /// Reads texel at given position, clamping it to the image's bounds.
    fn read_clamped(&self, pos: IVec2) -> f32 {
        let max = self.size().as_ivec2() - IVec2::ONE;

        self.read(pos.clamp(IVec2::ZERO, max).as_uvec2())
    }
}

impl<T> TexR32 for &T
where
    T: TexR32 + ?Sized,
{
    fn size(&self) -> UVec2 {
        T::size(self)
    }

    fn read(&self, pos: UVec2) -> f32 {
        T::read(self, pos)
    }
}
