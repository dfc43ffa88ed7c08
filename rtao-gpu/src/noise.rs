mod blue;
mod white;

use glam::Vec2;

pub use self::blue::*;
pub use self::white::*;

/// Source of per-ray random numbers for the ray-trace pass.
pub trait Sampler {
    /// Returns a 2D sample in `<0.0, 1.0)` for `ray`-th ray of the current
    /// pixel.
    fn sample_2d(&mut self, ray: u32) -> Vec2;
}
