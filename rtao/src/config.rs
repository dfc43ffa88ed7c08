use std::ops::RangeInclusive;

use crate::gpu;

/// Tunables of the ambient-occlusion pipeline.
///
/// Every field may be changed at any time; values are clamped into their
/// ranges by the setters and, once more, by [`AoConfig::clamped()`] at the
/// beginning of every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct AoConfig {
    /// When disabled, rendering records no work at all and the output image
    /// is left untouched.
    pub enabled: bool,

    /// When disabled, the raw ray-traced image is upsampled directly.
    pub denoise: bool,

    pub denoiser: Denoiser,
    pub sampler: SamplerType,
    pub ray_trace: RayTraceConfig,
    pub temporal: TemporalConfig,
    pub gaussian_blur: GaussianBlurConfig,
    pub recurrent_blur: RecurrentBlurConfig,
}

impl AoConfig {
    pub fn clamped(&self) -> Self {
        Self {
            ray_trace: self.ray_trace.clamped(),
            temporal: self.temporal.clamped(),
            gaussian_blur: self.gaussian_blur.clamped(),
            recurrent_blur: self.recurrent_blur.clamped(),
            ..self.clone()
        }
    }

    /// Returns whether the recurrent blur's output should be fed back into
    /// temporal reprojection, provided it's available.
    pub fn wants_feedback(&self) -> bool {
        self.denoise
            && self.denoiser == Denoiser::Recurrent
            && self.recurrent_blur.feedback
    }
}

impl Default for AoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            denoise: true,
            denoiser: Default::default(),
            sampler: Default::default(),
            ray_trace: Default::default(),
            temporal: Default::default(),
            gaussian_blur: Default::default(),
            recurrent_blur: Default::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Denoiser {
    /// Two-pass separable, depth-aware Gaussian blur.
    #[default]
    Gaussian,

    /// Single-pass spiral blur that can be fed back into temporal
    /// reprojection.
    Recurrent,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SamplerType {
    #[default]
    BlueNoise,
    WhiteNoise,
}

impl SamplerType {
    pub fn serialize(self) -> u32 {
        match self {
            SamplerType::BlueNoise => gpu::SAMPLER_BLUE_NOISE,
            SamplerType::WhiteNoise => gpu::SAMPLER_WHITE_NOISE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RayTraceConfig {
    pub num_rays: u32,
    pub ray_length: f32,
    pub power: f32,

    /// Offset along the normal applied to ray origins; not range-limited.
    pub bias: f32,
}

impl RayTraceConfig {
    pub const NUM_RAYS: RangeInclusive<u32> = 1..=8;
    pub const RAY_LENGTH: RangeInclusive<f32> = 1.0..=100.0;
    pub const POWER: RangeInclusive<f32> = 1.0..=5.0;

    pub fn set_num_rays(&mut self, num_rays: u32) {
        self.num_rays = clamp(num_rays, Self::NUM_RAYS);
    }

    pub fn set_ray_length(&mut self, ray_length: f32) {
        self.ray_length = clamp_f32(ray_length, Self::RAY_LENGTH);
    }

    pub fn set_power(&mut self, power: f32) {
        self.power = clamp_f32(power, Self::POWER);
    }

    pub fn set_bias(&mut self, bias: f32) {
        if bias.is_finite() {
            self.bias = bias;
        }
    }

    pub fn clamped(&self) -> Self {
        Self {
            num_rays: clamp(self.num_rays, Self::NUM_RAYS),
            ray_length: clamp_f32(self.ray_length, Self::RAY_LENGTH),
            power: clamp_f32(self.power, Self::POWER),
            bias: if self.bias.is_finite() { self.bias } else { 0.0 },
        }
    }
}

impl Default for RayTraceConfig {
    fn default() -> Self {
        Self {
            num_rays: 2,
            ray_length: 7.0,
            power: 1.2,
            bias: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TemporalConfig {
    /// Weight of the reprojected history when blending it with the new
    /// sample.
    pub alpha: f32,
}

impl TemporalConfig {
    pub const ALPHA: RangeInclusive<f32> = 0.0..=gpu::ALPHA_MAX;

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = gpu::clamp_alpha(alpha);
    }

    pub fn clamped(&self) -> Self {
        Self {
            alpha: gpu::clamp_alpha(self.alpha),
        }
    }
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self { alpha: 0.5 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GaussianBlurConfig {
    pub radius: u32,
}

impl GaussianBlurConfig {
    pub const RADIUS: RangeInclusive<u32> = 1..=20;

    pub fn set_radius(&mut self, radius: u32) {
        self.radius = clamp(radius, Self::RADIUS);
    }

    pub fn clamped(&self) -> Self {
        Self {
            radius: clamp(self.radius, Self::RADIUS),
        }
    }
}

impl Default for GaussianBlurConfig {
    fn default() -> Self {
        Self { radius: 5 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecurrentBlurConfig {
    pub radius: u32,
    pub self_stabilize: bool,
    pub feedback: bool,
}

impl RecurrentBlurConfig {
    pub const RADIUS: RangeInclusive<u32> = 1..=30;

    pub fn set_radius(&mut self, radius: u32) {
        self.radius = clamp(radius, Self::RADIUS);
    }

    pub fn clamped(&self) -> Self {
        Self {
            radius: clamp(self.radius, Self::RADIUS),
            ..self.clone()
        }
    }
}

impl Default for RecurrentBlurConfig {
    fn default() -> Self {
        Self {
            radius: 10,
            self_stabilize: true,
            feedback: false,
        }
    }
}

fn clamp(value: u32, range: RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

fn clamp_f32(value: f32, range: RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        *range.start()
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp() {
        let mut config = AoConfig::default();

        config.ray_trace.set_num_rays(0);
        assert_eq!(1, config.ray_trace.num_rays);

        config.ray_trace.set_num_rays(100);
        assert_eq!(8, config.ray_trace.num_rays);

        config.ray_trace.set_ray_length(0.5);
        assert_eq!(1.0, config.ray_trace.ray_length);

        config.ray_trace.set_power(f32::NAN);
        assert_eq!(1.0, config.ray_trace.power);

        config.temporal.set_alpha(0.75);
        assert_eq!(0.5, config.temporal.alpha);

        config.gaussian_blur.set_radius(25);
        assert_eq!(20, config.gaussian_blur.radius);

        config.recurrent_blur.set_radius(0);
        assert_eq!(1, config.recurrent_blur.radius);
    }

    #[test]
    fn bias_is_not_range_limited() {
        let mut config = RayTraceConfig::default();

        config.set_bias(-12.5);
        assert_eq!(-12.5, config.bias);

        config.set_bias(f32::INFINITY);
        assert_eq!(-12.5, config.bias);
    }

    #[test]
    fn clamped_fixes_directly_assigned_fields() {
        let config = AoConfig {
            ray_trace: RayTraceConfig {
                num_rays: 64,
                ray_length: 1000.0,
                power: 0.0,
                bias: f32::NAN,
            },
            temporal: TemporalConfig { alpha: -1.0 },
            gaussian_blur: GaussianBlurConfig { radius: 0 },
            recurrent_blur: RecurrentBlurConfig {
                radius: 99,
                self_stabilize: false,
                feedback: true,
            },
            ..Default::default()
        }
        .clamped();

        assert_eq!(
            RayTraceConfig {
                num_rays: 8,
                ray_length: 100.0,
                power: 1.0,
                bias: 0.0,
            },
            config.ray_trace
        );

        assert_eq!(0.0, config.temporal.alpha);
        assert_eq!(1, config.gaussian_blur.radius);
        assert_eq!(30, config.recurrent_blur.radius);
        assert!(!config.recurrent_blur.self_stabilize);
        assert!(config.recurrent_blur.feedback);
    }

    #[test]
    fn feedback_needs_recurrent_denoiser() {
        let mut config = AoConfig::default();

        config.recurrent_blur.feedback = true;
        assert!(!config.wants_feedback());

        config.denoiser = Denoiser::Recurrent;
        assert!(config.wants_feedback());

        config.denoise = false;
        assert!(!config.wants_feedback());
    }
}
