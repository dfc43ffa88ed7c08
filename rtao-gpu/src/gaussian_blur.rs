use glam::{IVec2, UVec2, Vec4};

use crate::{
    F32Ext, GBufferMap, GaussianBlurPassParams, TexR32, HISTORY_LENGTH_MAX,
};

/// Depth-similarity falloff, relative to the center's linear depth.
pub const BLUR_DEPTH_SIGMA: f32 = 0.05;

/// Returns how much a sample at `sample_z` may contribute to a pixel at
/// `center_z` (both linear).
pub fn depth_weight(center_z: f32, sample_z: f32) -> f32 {
    let sigma = BLUR_DEPTH_SIGMA * center_z.max(crate::RTAO_EPSILON);

    (-(center_z - sample_z).abs() / sigma).exp()
}

pub fn spatial_weight(distance: f32, sigma: f32) -> f32 {
    (-distance.sqr() / (2.0 * sigma.sqr())).exp()
}

/// One direction of the separable, depth-aware Gaussian blur.
#[derive(Clone, Copy, Debug)]
pub struct GaussianBlur {
    pub z_buffer_params: Vec4,
    pub direction: IVec2,
    pub radius: i32,
}

impl GaussianBlur {
    pub fn new(params: &GaussianBlurPassParams) -> Self {
        Self {
            z_buffer_params: params.z_buffer_params,
            direction: params.direction,
            radius: params.radius.max(1),
        }
    }

    pub fn run(
        &self,
        pos: UVec2,
        input: impl TexR32,
        history_length: impl TexR32,
        gbuffer: &impl GBufferMap,
    ) -> f32 {
        let center = gbuffer.get_half(pos);

        if center.is_sky() {
            return input.read(pos);
        }

        let center_z = center.linear_depth(self.z_buffer_params);

        // Pixels with long history are already smooth, so they get a tighter
        // kernel
        let confidence =
            (history_length.read(pos) / HISTORY_LENGTH_MAX).saturate();

        let sigma =
            (self.radius as f32 * (1.0 - 0.5 * confidence)).max(1.0) * 0.5;

        let mut sum = 0.0;
        let mut weight_sum = 0.0;

        for i in -self.radius..=self.radius {
            let sample_pos = pos.as_ivec2() + self.direction * i;

            if !input.contains(sample_pos) {
                continue;
            }

            let sample_pos = sample_pos.as_uvec2();
            let sample = gbuffer.get_half(sample_pos);

            if sample.is_sky() {
                continue;
            }

            let weight = spatial_weight(i as f32, sigma)
                * depth_weight(
                    center_z,
                    sample.linear_depth(self.z_buffer_params),
                );

            sum += input.read(sample_pos) * weight;
            weight_sum += weight;
        }

        if weight_sum > 0.0 {
            sum / weight_sum
        } else {
            input.read(pos)
        }
    }
}
