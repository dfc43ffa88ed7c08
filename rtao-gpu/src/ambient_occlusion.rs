use core::f32::consts::PI;

use glam::{vec3, Vec2, Vec3};

use crate::{GBufferEntry, Ray, RayTracePassParams, Sampler};

/// Stochastic ambient-occlusion estimator for a single pixel.
#[derive(Clone, Copy, Debug)]
pub struct AmbientOcclusion {
    pub num_rays: u32,
    pub ray_length: f32,
    pub power: f32,
    pub bias: f32,
}

impl AmbientOcclusion {
    pub fn new(params: &RayTracePassParams) -> Self {
        Self {
            num_rays: params.num_rays.max(1),
            ray_length: params.ray_length,
            power: params.power,
            bias: params.bias,
        }
    }

    /// Returns the visibility (`1.0` = unoccluded) of given surface point.
    ///
    /// `occluded` answers whether a ray hits anything up to given distance;
    /// it's the only place where the scene is consulted.
    pub fn estimate(
        &self,
        entry: &GBufferEntry,
        world_pos: Vec3,
        sampler: &mut impl Sampler,
        occluded: impl Fn(Ray, f32) -> bool,
    ) -> f32 {
        if entry.is_sky() {
            return 1.0;
        }

        let normal = entry.normal.normalize_or_zero();

        if normal == Vec3::ZERO {
            return 1.0;
        }

        let origin = world_pos + normal * self.bias;
        let mut visible = 0;

        for ray_idx in 0..self.num_rays {
            let dir = cosine_hemisphere(normal, sampler.sample_2d(ray_idx));

            if !occluded(Ray::new(origin, dir), self.ray_length) {
                visible += 1;
            }
        }

        (visible as f32 / self.num_rays as f32).powf(self.power)
    }
}

/// Maps a uniform 2D sample onto a cosine-weighted hemisphere around `normal`.
pub fn cosine_hemisphere(normal: Vec3, sample: Vec2) -> Vec3 {
    let radius = sample.x.sqrt();
    let angle = 2.0 * PI * sample.y;

    let local = vec3(
        radius * angle.cos(),
        radius * angle.sin(),
        (1.0 - sample.x).max(0.0).sqrt(),
    );

    let (tangent, bitangent) = orthonormal_basis(normal);

    (tangent * local.x + bitangent * local.y + normal * local.z).normalize()
}

/// Builds an orthonormal basis around `n`.
///
/// Thanks to:
///
/// - https://graphics.pixar.com/library/OrthonormalB/paper.pdf
///   (Building an Orthonormal Basis, Revisited by Duff et al.)
fn orthonormal_basis(n: Vec3) -> (Vec3, Vec3) {
    let sign = 1.0f32.copysign(n.z);
    let a = -1.0 / (sign + n.z);
    let b = n.x * n.y * a;

    (
        vec3(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x),
        vec3(b, sign + n.y * n.y * a, -n.y),
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec2};

    use super::*;
    use crate::WhiteNoise;

    fn estimator(num_rays: u32, power: f32) -> AmbientOcclusion {
        AmbientOcclusion::new(&RayTracePassParams {
            num_rays,
            ray_length: 7.0,
            power,
            bias: 0.3,
            ..Default::default()
        })
    }

    fn surface() -> GBufferEntry {
        GBufferEntry {
            depth: 0.5,
            normal: Vec3::Y,
            motion: Vec2::ZERO,
        }
    }

    #[test]
    fn unoccluded_is_fully_visible() {
        let mut noise = WhiteNoise::new(0, uvec2(1, 2));

        let target = estimator(1, 1.2).estimate(
            &surface(),
            Vec3::ZERO,
            &mut noise,
            |_, _| false,
        );

        assert_eq!(1.0, target);
    }

    /// Replays given samples, one per ray.
    struct Fixed(Vec<Vec2>);

    impl Sampler for Fixed {
        fn sample_2d(&mut self, ray: u32) -> Vec2 {
            self.0[ray as usize]
        }
    }

    #[test]
    fn applies_power_curve() {
        // For the +Y normal, the tangent is +X; angle 0 points towards it and
        // angle PI away from it
        let mut sampler = Fixed(vec![
            vec2(0.5, 0.5),
            vec2(0.5, 0.0),
            vec2(0.5, 0.5),
            vec2(0.5, 0.5),
        ]);

        let target = estimator(4, 2.0).estimate(
            &surface(),
            Vec3::ZERO,
            &mut sampler,
            |ray, _| ray.direction().x > 0.0,
        );

        assert_relative_eq!(target, 0.5625);
    }

    #[test]
    fn rays_start_above_surface() {
        let mut noise = WhiteNoise::new(7, uvec2(3, 3));

        estimator(8, 1.0).estimate(
            &surface(),
            Vec3::ZERO,
            &mut noise,
            |ray, t_max| {
                assert_relative_eq!(ray.origin().y, 0.3);
                assert_eq!(7.0, t_max);
                assert!(ray.direction().dot(Vec3::Y) >= 0.0);

                false
            },
        );
    }

    #[test]
    fn sky_is_unoccluded() {
        let mut noise = WhiteNoise::new(0, uvec2(0, 0));
        let sky = GBufferEntry {
            depth: 1.0,
            ..surface()
        };

        let target =
            estimator(8, 1.0).estimate(&sky, Vec3::ZERO, &mut noise, |_, _| true);

        assert_eq!(1.0, target);
    }

    #[test]
    fn hemisphere_samples_are_normalized() {
        for normal in [Vec3::X, Vec3::NEG_Z, vec3(0.3, -0.4, 0.5).normalize()] {
            for sample in [vec2(0.1, 0.2), vec2(0.9, 0.7), vec2(0.5, 0.0)] {
                let dir = cosine_hemisphere(normal, sample);

                assert_relative_eq!(dir.length(), 1.0, epsilon = 1e-5);
                assert!(dir.dot(normal) >= 0.0);
            }
        }
    }
}
