use bytemuck::{Pod, Zeroable};
use glam::{IVec2, Vec4};

/// Value of [`RayTracePassParams::sampler_type`] selecting the blue-noise
/// sampler.
pub const SAMPLER_BLUE_NOISE: u32 = 0;

/// Value of [`RayTracePassParams::sampler_type`] selecting the white-noise
/// (per-pixel hash) sampler.
pub const SAMPLER_WHITE_NOISE: u32 = 1;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct RayTracePassParams {
    pub num_rays: u32,
    pub num_frames: u32,
    pub ray_length: f32,
    pub power: f32,
    pub bias: f32,
    pub sampler_type: u32,

    /// Seed of the white-noise sampler; ignored by the blue-noise one.
    pub seed: u32,
    pub _padding: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct TemporalReprojectionPassParams {
    pub alpha: f32,
    pub _padding: [u32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct GaussianBlurPassParams {
    pub z_buffer_params: Vec4,
    pub direction: IVec2,
    pub radius: i32,
    pub _padding: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct RecurrentBlurPassParams {
    pub z_buffer_params: Vec4,
    pub radius: f32,
    pub num_frames: u32,
    pub self_stabilize: u32,
    pub _padding: u32,
}

impl RecurrentBlurPassParams {
    pub fn self_stabilize(&self) -> bool {
        self.self_stabilize != 0
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct UpsamplePassParams {
    pub z_buffer_params: Vec4,
}

#[cfg(test)]
mod tests {
    use std::mem;

    use super::*;

    /// Push-constant blocks are declared in WGSL with 16-byte alignment, so
    /// host-side structs must match that.
    #[test]
    fn sizes() {
        assert_eq!(32, mem::size_of::<RayTracePassParams>());
        assert_eq!(16, mem::size_of::<TemporalReprojectionPassParams>());
        assert_eq!(32, mem::size_of::<GaussianBlurPassParams>());
        assert_eq!(32, mem::size_of::<RecurrentBlurPassParams>());
        assert_eq!(16, mem::size_of::<UpsamplePassParams>());
    }
}
