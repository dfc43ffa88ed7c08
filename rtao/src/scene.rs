use std::borrow::Cow;

use glam::UVec2;

use crate::DoubleBuffered;

/// Scene as seen by the ray-trace pass.
///
/// The pipeline doesn't know how the scene is stored; it only needs a WGSL
/// function answering occlusion queries plus whatever bindings that function
/// relies on, which get attached as bind group 0.
pub trait GpuScene {
    /// WGSL source defining:
    ///
    /// ```wgsl
    /// fn scene_is_occluded(
    ///     origin: vec3<f32>,
    ///     direction: vec3<f32>,
    ///     t_max: f32,
    /// ) -> bool
    /// ```
    ///
    /// together with its `@group(0)` bindings.
    fn intersection_source(&self) -> Cow<'_, str>;

    fn bind_group_layout(&self) -> &wgpu::BindGroupLayout;

    fn bind_group(&self) -> &wgpu::BindGroup;
}

/// Full-resolution G-buffer, rendered by the host.
///
/// Depth and normals are double-buffered: the host renders frame `n` into
/// slot [`crate::FrameContext::curr_slot()`] and keeps the other slot intact,
/// since temporal reprojection validates history against it.
#[derive(Debug)]
pub struct GBufferViews {
    /// `R32Float`, non-linear depth; `1.0` means sky.
    pub depth: DoubleBuffered<wgpu::TextureView>,

    /// `Rgba16Float` / `Rgba32Float`; world-space normal in `xyz`.
    pub normals: DoubleBuffered<wgpu::TextureView>,

    /// `Rg16Float` / `Rg32Float`; `current_uv - previous_uv`.
    pub motion: wgpu::TextureView,

    /// Size of the views; the pipeline works at half of it.
    pub size: UVec2,
}
