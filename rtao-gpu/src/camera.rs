use bytemuck::{Pod, Zeroable};
use glam::{uvec2, vec2, vec4, Mat4, UVec2, Vec2, Vec3, Vec4, Vec4Swizzles};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct Camera {
    /// Transforms normalized device coordinates back into world space.
    pub ndc_to_world: Mat4,

    /// See: [`Camera::z_buffer_params()`].
    pub z_buffer_params: Vec4,

    /// `xy` = full-resolution size, `zw` = working (half) resolution size.
    pub viewport: Vec4,
}

impl Camera {
    pub fn new(
        ndc_to_world: Mat4,
        near: f32,
        far: f32,
        full_size: UVec2,
    ) -> Self {
        let working_size = Self::working_size_of(full_size);

        Self {
            ndc_to_world,
            z_buffer_params: Self::z_buffer_params(near, far),
            viewport: vec4(
                full_size.x as f32,
                full_size.y as f32,
                working_size.x as f32,
                working_size.y as f32,
            ),
        }
    }

    /// Returns the resolution at which the ambient occlusion is traced and
    /// denoised for given render-target size.
    pub fn working_size_of(full_size: UVec2) -> UVec2 {
        uvec2(full_size.x / 2, full_size.y / 2).max(UVec2::ONE)
    }

    /// Packs near and far planes so that a non-linear depth-buffer value can
    /// be turned into view-space distance with a single fma + rcp:
    ///
    /// `x = 1 - far / near`, `y = far / near`, `z = x / far`, `w = y / far`.
    pub fn z_buffer_params(near: f32, far: f32) -> Vec4 {
        let x = 1.0 - far / near;
        let y = far / near;

        vec4(x, y, x / far, y / far)
    }

    pub fn full_size(&self) -> UVec2 {
        self.viewport.xy().as_uvec2()
    }

    pub fn working_size(&self) -> UVec2 {
        self.viewport.zw().as_uvec2()
    }

    /// Given a depth-buffer value, returns the view-space distance.
    pub fn linearize_depth(&self, depth: f32) -> f32 {
        linearize_depth(self.z_buffer_params, depth)
    }

    /// Given a full-resolution pixel and its depth, returns its position in
    /// world-coordinates.
    pub fn world_position(&self, full_pos: UVec2, depth: f32) -> Vec3 {
        let uv = (full_pos.as_vec2() + 0.5) / self.viewport.xy();
        let ndc = uv * 2.0 - Vec2::ONE;
        let ndc = vec2(ndc.x, -ndc.y);

        self.ndc_to_world.project_point3(ndc.extend(depth))
    }
}

/// See: [`Camera::z_buffer_params()`].
pub fn linearize_depth(z_buffer_params: Vec4, depth: f32) -> f32 {
    1.0 / (z_buffer_params.z * depth + z_buffer_params.w)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn linearize_depth_maps_planes() {
        let params = Camera::z_buffer_params(0.1, 100.0);

        assert_relative_eq!(linearize_depth(params, 0.0), 0.1, epsilon = 1e-4);
        assert_relative_eq!(linearize_depth(params, 1.0), 100.0, epsilon = 1e-2);
    }

    #[test]
    fn working_size_is_half() {
        assert_eq!(uvec2(640, 360), Camera::working_size_of(uvec2(1280, 720)));
        assert_eq!(uvec2(3, 1), Camera::working_size_of(uvec2(7, 1)));
    }

    #[test]
    fn world_position_of_center() {
        let camera =
            Camera::new(Mat4::IDENTITY, 0.1, 100.0, uvec2(4, 4));

        let pos = camera.world_position(uvec2(2, 2), 0.5);

        assert_relative_eq!(pos.x, 0.25);
        assert_relative_eq!(pos.y, -0.25);
        assert_relative_eq!(pos.z, 0.5);
    }
}
