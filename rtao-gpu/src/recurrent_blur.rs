use glam::{vec2, IVec2, UVec2, Vec4};

use crate::{
    depth_weight, spatial_weight, F32Ext, GBufferMap, RecurrentBlurPassParams,
    TexR32, GOLDEN_ANGLE, HISTORY_LENGTH_MAX,
};

/// Number of spiral taps, not counting the center.
pub const RECURRENT_BLUR_SAMPLES: u32 = 8;

/// Single-pass blur over a golden-angle spiral that rotates every frame;
/// meant to be fed back into temporal reprojection, which turns the per-frame
/// rotation into a much wider effective kernel.
#[derive(Clone, Copy, Debug)]
pub struct RecurrentBlur {
    pub z_buffer_params: Vec4,
    pub radius: f32,
    pub num_frames: u32,
    pub self_stabilize: bool,
}

impl RecurrentBlur {
    pub fn new(params: &RecurrentBlurPassParams) -> Self {
        Self {
            z_buffer_params: params.z_buffer_params,
            radius: params.radius.max(1.0),
            num_frames: params.num_frames,
            self_stabilize: params.self_stabilize(),
        }
    }

    /// Returns the kernel radius for a pixel with given history length.
    pub fn effective_radius(&self, history_length: f32) -> f32 {
        if self.self_stabilize {
            let confidence = (history_length / HISTORY_LENGTH_MAX).saturate();

            (self.radius * (1.0 - 0.75 * confidence)).max(1.0)
        } else {
            self.radius
        }
    }

    /// Returns how much a tap is trusted, given its history length.
    ///
    /// History is compared against the longest one achievable by now, so
    /// that early frames don't penalize every sample equally.
    pub fn temporal_weight(&self, history_length: f32) -> f32 {
        let reachable =
            HISTORY_LENGTH_MAX.min(self.num_frames as f32 + 1.0);

        ((1.0 + history_length) / (1.0 + reachable)).saturate()
    }

    /// Returns the mip level that's sampled for given radius, so that wide
    /// kernels read prefiltered data instead of aliasing.
    pub fn lod(radius: f32, mip_levels: u32) -> u32 {
        let lod = (radius.max(1.0).log2() - 1.0).floor().max(0.0) as u32;

        lod.min(mip_levels.saturating_sub(1))
    }

    /// Returns the offset of `idx`-th spiral tap, in working-resolution
    /// pixels.
    pub fn tap_offset(&self, idx: u32, radius: f32) -> IVec2 {
        let rotation = (self.num_frames % 360) as f32 * GOLDEN_ANGLE;
        let angle = rotation + idx as f32 * GOLDEN_ANGLE;
        let dist = ((idx as f32 + 0.5) / RECURRENT_BLUR_SAMPLES as f32).sqrt()
            * radius;

        (vec2(angle.cos(), angle.sin()) * dist).round().as_ivec2()
    }

    /// Blurs pixel `pos`; `input` holds mip levels of the reprojected image,
    /// starting at zero.
    pub fn run<T>(
        &self,
        pos: UVec2,
        input: &[T],
        history_length: impl TexR32,
        gbuffer: &impl GBufferMap,
    ) -> f32
    where
        T: TexR32,
    {
        let center_value = input[0].read(pos);
        let center = gbuffer.get_half(pos);

        if center.is_sky() {
            return center_value;
        }

        let center_z = center.linear_depth(self.z_buffer_params);
        let radius = self.effective_radius(history_length.read(pos));
        let lod = Self::lod(radius, input.len() as u32);
        let mip = &input[lod as usize];
        let sigma = radius * 0.5;

        let mut sum = center_value;
        let mut weight_sum = 1.0;

        for idx in 0..RECURRENT_BLUR_SAMPLES {
            let offset = self.tap_offset(idx, radius);
            let sample_pos = pos.as_ivec2() + offset;

            if !input[0].contains(sample_pos) {
                continue;
            }

            let sample_pos = sample_pos.as_uvec2();
            let sample = gbuffer.get_half(sample_pos);

            if sample.is_sky() {
                continue;
            }

            let confidence =
                self.temporal_weight(history_length.read(sample_pos));

            let weight = spatial_weight(offset.as_vec2().length(), sigma)
                * depth_weight(
                    center_z,
                    sample.linear_depth(self.z_buffer_params),
                )
                * confidence;

            sum += mip.read_clamped((sample_pos >> lod).as_ivec2()) * weight;
            weight_sum += weight;
        }

        sum / weight_sum
    }
}
