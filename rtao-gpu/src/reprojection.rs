use glam::{vec2, UVec2, Vec2, Vec4};

use crate::{BilinearFilter, GBufferMap};

/// Describes where a working-resolution pixel was in the previous frame and
/// which of the four texels surrounding that point are trustworthy.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reprojection {
    pub prev_x: f32,
    pub prev_y: f32,

    /// Bits 0..4 correspond to the `(0,0)`, `(1,0)`, `(0,1)` and `(1,1)`
    /// texels around `(prev_x, prev_y)`.
    pub validity: u32,
}

impl Reprojection {
    pub fn none() -> Self {
        Default::default()
    }

    /// Reprojects given working-resolution pixel into the previous frame,
    /// validating each bilinear tap against the history G-buffer.
    pub fn find(
        pos: UVec2,
        working_size: UVec2,
        curr_gbuffer: &impl GBufferMap,
        prev_gbuffer: &impl GBufferMap,
        z_buffer_params: Vec4,
    ) -> Self {
        let entry = curr_gbuffer.get_half(pos);

        if entry.is_sky() {
            return Self::none();
        }

        let size = working_size.as_vec2();
        let uv = (pos.as_vec2() + 0.5) / size;
        let prev_pos = (uv - entry.motion) * size - 0.5;

        let mut validity = 0;

        for (idx, tap) in BilinearFilter::reprojection_coords(prev_pos.x, prev_pos.y)
            .into_iter()
            .enumerate()
        {
            if tap.x < 0
                || tap.y < 0
                || tap.x >= working_size.x as i32
                || tap.y >= working_size.y as i32
            {
                continue;
            }

            let prev_entry = prev_gbuffer.get_half(tap.as_uvec2());

            if entry.is_continuous_with(&prev_entry, z_buffer_params) {
                validity |= 1 << idx;
            }
        }

        Self {
            prev_x: prev_pos.x,
            prev_y: prev_pos.y,
            validity,
        }
    }

    pub fn is_some(&self) -> bool {
        self.validity != 0
    }

    pub fn is_none(&self) -> bool {
        !self.is_some()
    }

    pub fn prev_pos(&self) -> Vec2 {
        vec2(self.prev_x, self.prev_y)
    }

    /// Returns the position within the `(0,0)` texel, as used for bilinear
    /// weights.
    pub fn prev_pos_fract(&self) -> Vec2 {
        self.prev_pos() - self.prev_pos().floor()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec3};

    use super::*;
    use crate::{Camera, GBufferEntry};

    struct Flat {
        size: UVec2,
        depth: f32,
        motion: Vec2,
    }

    impl GBufferMap for Flat {
        fn size(&self) -> UVec2 {
            self.size
        }

        fn get(&self, _: UVec2) -> GBufferEntry {
            GBufferEntry {
                depth: self.depth,
                normal: vec3(0.0, 0.0, 1.0),
                motion: self.motion,
            }
        }
    }

    fn params() -> Vec4 {
        Camera::z_buffer_params(0.1, 100.0)
    }

    #[test]
    fn static_scene() {
        let gbuffer = Flat {
            size: uvec2(16, 16),
            depth: 0.9,
            motion: Vec2::ZERO,
        };

        let target =
            Reprojection::find(uvec2(3, 4), uvec2(8, 8), &gbuffer, &gbuffer, params());

        assert_relative_eq!(target.prev_x, 3.0);
        assert_relative_eq!(target.prev_y, 4.0);
        assert_eq!(0b1111, target.validity);
        assert_eq!(Vec2::ZERO, target.prev_pos_fract());
    }

    #[test]
    fn moving_off_screen() {
        let gbuffer = Flat {
            size: uvec2(16, 16),
            depth: 0.9,
            motion: vec2(0.5, 0.0),
        };

        let target =
            Reprojection::find(uvec2(0, 0), uvec2(8, 8), &gbuffer, &gbuffer, params());

        assert!(target.is_none());
    }

    #[test]
    fn disocclusion() {
        let curr = Flat {
            size: uvec2(16, 16),
            depth: 0.9,
            motion: Vec2::ZERO,
        };

        let prev = Flat {
            size: uvec2(16, 16),
            depth: 0.2,
            motion: Vec2::ZERO,
        };

        let target =
            Reprojection::find(uvec2(3, 4), uvec2(8, 8), &curr, &prev, params());

        assert!(target.is_none());
    }

    #[test]
    fn sky() {
        let gbuffer = Flat {
            size: uvec2(16, 16),
            depth: 1.0,
            motion: Vec2::ZERO,
        };

        let target =
            Reprojection::find(uvec2(3, 4), uvec2(8, 8), &gbuffer, &gbuffer, params());

        assert_eq!(Reprojection::none(), target);
    }
}
