//! Ray-traced ambient occlusion for wgpu.
//!
//! Every frame, a handful of occlusion rays is traced per pixel at half of
//! the render-target resolution, the result is accumulated over time,
//! spatially denoised and then upsampled back to full resolution:
//!
//! ```text
//! ray trace -> temporal reprojection -> downsample -> blur -> upsample
//! ```
//!
//! Work is described as a [`FrameGraph`], validated and annotated with
//! barriers by the [`ResourceTracker`] and then recorded either into a wgpu
//! command encoder (see [`RayTracedAo`]) or executed on the CPU (see
//! [`CpuRayTracedAo`]).

mod buffers;
mod config;
mod cpu;
mod frame;
mod graph;
mod noise;
mod pipeline;
mod scene;
mod shaders;

use derivative::Derivative;
use glam::Mat4;
use log::{debug, info, trace};
use rand::Rng;
pub use rtao_gpu as gpu;

pub use self::buffers::*;
pub use self::config::*;
pub use self::cpu::*;
pub use self::frame::*;
pub use self::graph::*;
pub use self::noise::*;
pub use self::pipeline::*;
pub use self::scene::*;
pub use self::shaders::*;

#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct RayTracedAo<S>
where
    S: GpuScene,
{
    #[derivative(Debug = "ignore")]
    scene: S,

    config: AoConfig,
    buffers: AoBuffers,
    passes: AoPasses,
    tracker: ResourceTracker,
    last_schedule: Option<Schedule>,
}

impl<S> RayTracedAo<S>
where
    S: GpuScene,
{
    /// Features the device has to be created with.
    pub fn required_features() -> wgpu::Features {
        wgpu::Features::PUSH_CONSTANTS
    }

    /// Limits the device has to be created with.
    pub fn required_limits() -> wgpu::Limits {
        wgpu::Limits {
            max_push_constant_size: 32,
            ..Default::default()
        }
    }

    /// Creates the pipeline.
    ///
    /// The pipeline works at half of `gbuffer`'s resolution; to change the
    /// resolution, create a new instance.
    pub fn new(
        device: &wgpu::Device,
        scene: S,
        gbuffer: &GBufferViews,
        camera: gpu::Camera,
        config: AoConfig,
    ) -> Self {
        info!(
            "Creating ambient occlusion; full_size={:?}, working_size={:?}",
            camera.full_size(),
            camera.working_size()
        );

        assert!(
            device.features().contains(Self::required_features()),
            "device doesn't support push constants"
        );

        assert_eq!(
            camera.full_size(),
            gbuffer.size,
            "G-buffer doesn't match the camera's viewport"
        );

        let shaders = Shaders::new(device, &scene);
        let noise = Noise::new(device);
        let buffers = AoBuffers::new(device, camera);

        let deps = PassDeps {
            shaders: &shaders,
            noise: &noise,
            gbuffer,
            scene_layout: scene.bind_group_layout(),
        };

        let passes = AoPasses::new(device, &deps, &buffers);

        debug!("Ambient occlusion created");

        Self {
            scene,
            config,
            buffers,
            passes,
            tracker: ResourceTracker::new(),
            last_schedule: None,
        }
    }

    pub fn config(&self) -> &AoConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AoConfig {
        &mut self.config
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// Returns the schedule recorded by the most recent [`Self::render()`].
    pub fn last_schedule(&self) -> Option<&Schedule> {
        self.last_schedule.as_ref()
    }

    /// Updates the camera; gets uploaded during the next render.
    pub fn update_camera(&mut self, ndc_to_world: Mat4, near: f32, far: f32) {
        let full_size = self.buffers.camera.full_size();

        *self.buffers.camera =
            gpu::Camera::new(ndc_to_world, near, far, full_size);
    }

    /// Records a frame into `encoder`.
    ///
    /// When the frame graph turns out to be invalid, nothing gets recorded
    /// and the error is returned instead.
    pub fn render(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        ctx: &FrameContext,
    ) -> Result<(), GraphError> {
        let config = self.config.clamped();
        let graph = FrameGraph::ambient_occlusion(&config, ctx, &self.tracker);

        if graph.is_empty() {
            trace!("Nothing to render (frame={})", ctx.frame());
            return Ok(());
        }

        let schedule = self.tracker.schedule(&graph, ctx)?;

        self.buffers.camera.flush(queue);

        let seed = rand::thread_rng().gen();

        // Barriers are realized by wgpu, which synchronizes accesses between
        // consecutive compute passes on its own
        for pass in &schedule.passes {
            match pass.node.kind {
                PassKind::ClearHistory => {
                    self.passes.clear_history.run(ctx, &self.buffers, encoder);
                }

                PassKind::RayTrace => {
                    self.passes.ray_trace.run(
                        ctx,
                        &self.buffers,
                        encoder,
                        self.scene.bind_group(),
                        &config,
                        seed,
                    );
                }

                PassKind::Downsample { target, level } => {
                    self.passes.downsample.run(
                        ctx,
                        &self.buffers,
                        encoder,
                        target,
                        level,
                    );
                }

                PassKind::TemporalReprojection { feedback } => {
                    self.passes.temporal_reprojection.run(
                        ctx,
                        &self.buffers,
                        encoder,
                        &config,
                        feedback,
                    );
                }

                PassKind::GaussianBlur(stage) => {
                    self.passes.gaussian_blur.run(
                        ctx,
                        &self.buffers,
                        encoder,
                        &config,
                        stage,
                    );
                }

                PassKind::RecurrentBlur => {
                    self.passes.recurrent_blur.run(
                        ctx,
                        &self.buffers,
                        encoder,
                        &config,
                    );
                }

                PassKind::Upsample { source } => {
                    self.passes.upsample.run(
                        ctx,
                        &self.buffers,
                        encoder,
                        source,
                    );
                }
            }
        }

        self.last_schedule = Some(schedule);

        Ok(())
    }

    /// Full-resolution ambient occlusion, `R32Float`.
    pub fn output(&self) -> &wgpu::TextureView {
        self.buffers.upsample.view()
    }

    pub fn output_texture(&self) -> &wgpu::Texture {
        self.buffers.upsample.tex()
    }

    /// Given mip of the raw ray-traced image, for debugging.
    pub fn ray_trace_view(&self, mip: u32) -> &wgpu::TextureView {
        self.buffers.ray_trace.mip_view(mip)
    }

    /// Image the most recent frame has upsampled.
    pub fn denoised_view(&self) -> Option<&wgpu::TextureView> {
        let source = self.last_schedule.as_ref()?.kinds().find_map(|kind| {
            match kind {
                PassKind::Upsample { source } => Some(source),
                _ => None,
            }
        })?;

        Some(self.buffers.texture(source.resource()).view())
    }
}

impl<S> Drop for RayTracedAo<S>
where
    S: GpuScene,
{
    fn drop(&mut self) {
        info!("Deleting ambient occlusion");
    }
}
