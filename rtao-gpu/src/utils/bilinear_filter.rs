use glam::{ivec2, vec4, IVec2, UVec2, Vec2, Vec4};

use crate::Reprojection;

#[derive(Clone, Copy, Debug, Default)]
pub struct BilinearFilter {
    /// Sample at `f(x=0, y=0)`
    pub s00: f32,

    /// Sample at `f(x=1, y=0)`
    pub s10: f32,

    /// Sample at `f(x=0, y=1)`
    pub s01: f32,

    /// Sample at `f(x=1, y=1)`
    pub s11: f32,

    /// Weights for each sample; zero for samples rejected by the
    /// reprojection's validity mask.
    pub weights: Vec4,
}

impl BilinearFilter {
    /// Gathers the four previous-frame samples surrounding given reprojection,
    /// skipping the ones its validity mask rejects.
    pub fn from_reprojection(
        reprojection: Reprojection,
        sample: impl Fn(UVec2) -> f32,
    ) -> Self {
        let mut this = Self::default();

        let [p00, p10, p01, p11] =
            Self::reprojection_coords(reprojection.prev_x, reprojection.prev_y);

        if reprojection.validity & 0b0001 > 0 {
            this.s00 = sample(p00.as_uvec2());
            this.weights.x = 1.0;
        }

        if reprojection.validity & 0b0010 > 0 {
            this.s10 = sample(p10.as_uvec2());
            this.weights.y = 1.0;
        }

        if reprojection.validity & 0b0100 > 0 {
            this.s01 = sample(p01.as_uvec2());
            this.weights.z = 1.0;
        }

        if reprojection.validity & 0b1000 > 0 {
            this.s11 = sample(p11.as_uvec2());
            this.weights.w = 1.0;
        }

        this
    }

    /// Returns the four integer coordinates surrounding given point, in the
    /// order matching [`Reprojection::validity`]'s bits.
    pub fn reprojection_coords(prev_x: f32, prev_y: f32) -> [IVec2; 4] {
        let x = prev_x.floor() as i32;
        let y = prev_y.floor() as i32;

        [ivec2(x, y), ivec2(x + 1, y), ivec2(x, y + 1), ivec2(x + 1, y + 1)]
    }

    fn bilinear_weights(&self, uv: Vec2) -> Vec4 {
        self.weights
            * vec4(
                (1.0 - uv.x) * (1.0 - uv.y),
                uv.x * (1.0 - uv.y),
                (1.0 - uv.x) * uv.y,
                uv.x * uv.y,
            )
    }

    /// Returns the total weight of accepted samples at given sub-texel
    /// position; zero means there's nothing to interpolate.
    pub fn weight_sum(&self, uv: Vec2) -> f32 {
        self.bilinear_weights(uv).dot(Vec4::ONE)
    }

    pub fn eval(&self, uv: Vec2) -> f32 {
        let weights = self.bilinear_weights(uv);
        let w_sum = weights.dot(Vec4::ONE);

        if w_sum == 0.0 {
            Default::default()
        } else {
            (self.s00 * weights.x
                + self.s10 * weights.y
                + self.s01 * weights.z
                + self.s11 * weights.w)
                / w_sum
        }
    }
}
