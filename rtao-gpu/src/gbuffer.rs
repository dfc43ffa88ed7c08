use glam::{UVec2, Vec2, Vec3, Vec4};

use crate::linearize_depth;

/// Maximum relative difference between linear depths of two surfaces for
/// them to be considered the same surface.
pub const DEPTH_TOLERANCE: f32 = 0.1;

/// Minimum cosine between normals of two surfaces for them to be considered
/// the same surface.
pub const NORMAL_TOLERANCE: f32 = 0.9;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GBufferEntry {
    /// Non-linear depth-buffer value; `1.0` means sky.
    pub depth: f32,

    /// World-space normal.
    pub normal: Vec3,

    /// Screen-space motion, as `current_uv - previous_uv`.
    pub motion: Vec2,
}

impl GBufferEntry {
    pub fn is_sky(&self) -> bool {
        self.depth >= 1.0
    }

    pub fn is_some(&self) -> bool {
        !self.is_sky()
    }

    pub fn linear_depth(&self, z_buffer_params: Vec4) -> f32 {
        linearize_depth(z_buffer_params, self.depth)
    }

    /// Returns whether `other` looks like the same surface as `self`, judging
    /// by their depths and normals.
    pub fn is_continuous_with(
        &self,
        other: &Self,
        z_buffer_params: Vec4,
    ) -> bool {
        if self.is_sky() || other.is_sky() {
            return false;
        }

        let z = self.linear_depth(z_buffer_params);
        let other_z = other.linear_depth(z_buffer_params);

        (z - other_z).abs() <= DEPTH_TOLERANCE * z
            && self.normal.dot(other.normal) >= NORMAL_TOLERANCE
    }
}

/// Full-resolution G-buffer (current or history).
pub trait GBufferMap {
    /// Returns the full resolution of this G-buffer.
    fn size(&self) -> UVec2;

    fn get(&self, pos: UVec2) -> GBufferEntry;

    /// Returns the entry corresponding to given working-resolution pixel.
    fn get_half(&self, half_pos: UVec2) -> GBufferEntry {
        let max = self.size().max(UVec2::ONE) - UVec2::ONE;

        self.get((half_pos * 2).min(max))
    }
}

impl<T> GBufferMap for &T
where
    T: GBufferMap + ?Sized,
{
    fn size(&self) -> UVec2 {
        T::size(self)
    }

    fn get(&self, pos: UVec2) -> GBufferEntry {
        T::get(self, pos)
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;
    use crate::Camera;

    fn entry(depth: f32, normal: Vec3) -> GBufferEntry {
        GBufferEntry {
            depth,
            normal,
            motion: Vec2::ZERO,
        }
    }

    #[test]
    fn continuity() {
        let params = Camera::z_buffer_params(0.1, 100.0);
        let up = vec3(0.0, 1.0, 0.0);

        let a = entry(0.9, up);

        assert!(a.is_continuous_with(&entry(0.9, up), params));
        assert!(!a.is_continuous_with(&entry(0.5, up), params));
        assert!(!a.is_continuous_with(&entry(0.9, vec3(1.0, 0.0, 0.0)), params));
        assert!(!a.is_continuous_with(&entry(1.0, up), params));
    }
}
