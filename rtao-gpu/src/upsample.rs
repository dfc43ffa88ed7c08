use glam::{ivec2, vec4, UVec2, Vec2, Vec4};

use crate::{depth_weight, GBufferMap, TexR32, UpsamplePassParams};

/// Returns the resolution of the upsampled image for given working
/// resolution.
pub fn upsample_size(working_size: UVec2) -> UVec2 {
    working_size * 2
}

/// Depth- and normal-aware reconstruction of a full-resolution pixel from the
/// working-resolution image.
#[derive(Clone, Copy, Debug)]
pub struct Upsample {
    pub z_buffer_params: Vec4,
}

impl Upsample {
    pub fn new(params: &UpsamplePassParams) -> Self {
        Self {
            z_buffer_params: params.z_buffer_params,
        }
    }

    pub fn run(
        &self,
        full_pos: UVec2,
        input: impl TexR32,
        gbuffer: &impl GBufferMap,
    ) -> f32 {
        let half_pos = half_position(full_pos);
        let nearest = half_pos.round().as_ivec2();
        let center = gbuffer.get(full_pos.min(gbuffer.size() - UVec2::ONE));

        if center.is_sky() {
            return input.read_clamped(nearest);
        }

        let center_z = center.linear_depth(self.z_buffer_params);
        let base = half_pos.floor();
        let uv = half_pos - base;
        let base = base.as_ivec2();

        let bilinear = vec4(
            (1.0 - uv.x) * (1.0 - uv.y),
            uv.x * (1.0 - uv.y),
            (1.0 - uv.x) * uv.y,
            uv.x * uv.y,
        );

        let taps = [
            base,
            base + ivec2(1, 0),
            base + ivec2(0, 1),
            base + ivec2(1, 1),
        ];

        let mut sum = 0.0;
        let mut weight_sum = 0.0;

        for (tap, bilinear) in taps.into_iter().zip(bilinear.to_array()) {
            if !input.contains(tap) {
                continue;
            }

            let sample = gbuffer.get_half(tap.as_uvec2());

            if sample.is_sky() {
                continue;
            }

            let normal_weight = center.normal.dot(sample.normal).max(0.0).powi(8);

            let weight = bilinear
                * normal_weight
                * depth_weight(
                    center_z,
                    sample.linear_depth(self.z_buffer_params),
                );

            sum += input.read(tap.as_uvec2()) * weight;
            weight_sum += weight;
        }

        if weight_sum > crate::RTAO_EPSILON {
            sum / weight_sum
        } else {
            input.read_clamped(nearest)
        }
    }
}

/// Returns the working-resolution position closest to given full-resolution
/// pixel.
pub fn half_position(full_pos: UVec2) -> Vec2 {
    (full_pos.as_vec2() + 0.5) * 0.5 - 0.5
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec3, Vec3};

    use super::*;
    use crate::{Camera, GBufferEntry};

    struct Gradient;

    impl TexR32 for Gradient {
        fn size(&self) -> UVec2 {
            uvec2(4, 4)
        }

        fn read(&self, pos: UVec2) -> f32 {
            pos.x as f32 * 0.25
        }
    }

    struct Wall {
        edge: u32,
    }

    impl GBufferMap for Wall {
        fn size(&self) -> UVec2 {
            uvec2(8, 8)
        }

        fn get(&self, pos: UVec2) -> GBufferEntry {
            let (depth, normal) = if pos.x < self.edge {
                (0.9, Vec3::Z)
            } else {
                (0.99, vec3(1.0, 0.0, 0.0))
            };

            GBufferEntry {
                depth,
                normal,
                motion: Vec2::ZERO,
            }
        }
    }

    fn upsample() -> Upsample {
        Upsample::new(&UpsamplePassParams {
            z_buffer_params: Camera::z_buffer_params(0.1, 100.0),
        })
    }

    #[test]
    fn doubles_resolution() {
        assert_eq!(uvec2(1280, 720), upsample_size(uvec2(640, 360)));
    }

    #[test]
    fn interpolates_continuous_surfaces() {
        let target = upsample().run(uvec2(3, 2), Gradient, &Wall { edge: 8 });

        // half-position is (1.25, 0.75)
        assert_relative_eq!(target, 0.3125, epsilon = 1e-5);
    }

    #[test]
    fn does_not_bleed_across_edges() {
        let target = upsample().run(uvec2(3, 2), Gradient, &Wall { edge: 4 });

        // only the taps at x = 1 lay on the same surface
        assert_relative_eq!(target, 0.25, epsilon = 1e-5);
    }
}
