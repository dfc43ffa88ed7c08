//! Common structs and per-pixel algorithms used by rtao's shaders and by its
//! CPU reference executor.
//!
//! Everything here is written against single-pixel inputs so that the WGSL
//! kernels and the host-side executor can share one definition of the math.

#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::too_many_arguments)]

mod ambient_occlusion;
mod camera;
mod downsample;
mod gaussian_blur;
mod gbuffer;
mod noise;
mod passes;
mod ray;
mod recurrent_blur;
mod reprojection;
mod temporal_accumulation;
mod texture;
mod upsample;
mod utils;

pub use self::ambient_occlusion::*;
pub use self::camera::*;
pub use self::downsample::*;
pub use self::gaussian_blur::*;
pub use self::gbuffer::*;
pub use self::noise::*;
pub use self::passes::*;
pub use self::ray::*;
pub use self::recurrent_blur::*;
pub use self::reprojection::*;
pub use self::temporal_accumulation::*;
pub use self::texture::*;
pub use self::upsample::*;
pub use self::utils::*;

/// Golden angle, used for spatial filters.
pub const GOLDEN_ANGLE: f32 = 2.39996;

/// Number of mip levels of the raw ray-traced image and of each reprojection
/// buffer.
pub const MIP_LEVELS: u32 = 5;

/// Size of the compute workgroups used by every pass, in both dimensions.
pub const WORKGROUP_SIZE: u32 = 8;

pub const RTAO_EPSILON: f32 = 0.0001;
