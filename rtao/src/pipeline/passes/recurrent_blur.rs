use crate::{
    gpu, AoBuffers, AoComputePass, AoConfig, FrameContext, PassDeps,
};

#[derive(Debug)]
pub struct RecurrentBlurPass {
    pass: AoComputePass<gpu::RecurrentBlurPassParams>,
}

impl RecurrentBlurPass {
    pub fn new(
        device: &wgpu::Device,
        deps: &PassDeps,
        buffers: &AoBuffers,
    ) -> Self {
        let pass = AoComputePass::builder("recurrent_blur")
            .bind([&deps.gbuffer.depth.curr().bind_readable()])
            .bind([
                &buffers.reprojection.curr().bind_all_readable(),
                &buffers.history_length.curr().bind_readable(),
                &buffers.recurrent_blur.bind_writable(),
            ])
            .build(device, &deps.shaders.recurrent_blur);

        Self { pass }
    }

    pub fn run(
        &self,
        ctx: &FrameContext,
        buffers: &AoBuffers,
        encoder: &mut wgpu::CommandEncoder,
        config: &AoConfig,
    ) {
        self.pass.run(
            ctx,
            encoder,
            buffers.recurrent_blur.size(),
            gpu::RecurrentBlurPassParams {
                z_buffer_params: buffers.camera.z_buffer_params,
                radius: config.recurrent_blur.radius as f32,
                num_frames: ctx.num_frames(),
                self_stabilize: config.recurrent_blur.self_stabilize as u32,
                _padding: Default::default(),
            },
        );
    }
}
