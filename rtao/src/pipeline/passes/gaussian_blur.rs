use glam::ivec2;

use crate::{
    gpu, AoBuffers, AoComputePass, AoConfig, BlurStage, FrameContext,
    PassDeps,
};

#[derive(Debug)]
pub struct GaussianBlurPass {
    /// Indexed with [`BlurStage::index()`].
    passes: [AoComputePass<gpu::GaussianBlurPassParams>; 2],
}

impl GaussianBlurPass {
    pub fn new(
        device: &wgpu::Device,
        deps: &PassDeps,
        buffers: &AoBuffers,
    ) -> Self {
        let gbuffer = deps.gbuffer;
        let shader = &deps.shaders.gaussian_blur;

        let vertical_pass = AoComputePass::builder("gaussian_blur_vertical")
            .bind([&gbuffer.depth.curr().bind_readable()])
            .bind([
                &buffers.reprojection.curr().bind_readable(),
                &buffers.history_length.curr().bind_readable(),
                &buffers.gaussian_blur(BlurStage::Vertical).bind_writable(),
            ])
            .build(device, shader);

        let horizontal_pass =
            AoComputePass::builder("gaussian_blur_horizontal")
                .bind([&gbuffer.depth.curr().bind_readable()])
                .bind([
                    &buffers.gaussian_blur(BlurStage::Vertical).bind_readable(),
                    &buffers.history_length.curr().bind_readable(),
                    &buffers
                        .gaussian_blur(BlurStage::Horizontal)
                        .bind_writable(),
                ])
                .build(device, shader);

        Self {
            passes: [vertical_pass, horizontal_pass],
        }
    }

    pub fn run(
        &self,
        ctx: &FrameContext,
        buffers: &AoBuffers,
        encoder: &mut wgpu::CommandEncoder,
        config: &AoConfig,
        stage: BlurStage,
    ) {
        let direction = match stage {
            BlurStage::Vertical => ivec2(0, 1),
            BlurStage::Horizontal => ivec2(1, 0),
        };

        self.passes[stage.index()].run(
            ctx,
            encoder,
            buffers.gaussian_blur(stage).size(),
            gpu::GaussianBlurPassParams {
                z_buffer_params: buffers.camera.z_buffer_params,
                direction,
                radius: config.gaussian_blur.radius as i32,
                _padding: Default::default(),
            },
        );
    }
}
