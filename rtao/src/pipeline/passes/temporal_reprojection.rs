use crate::{
    gpu, AoBuffers, AoComputePass, AoConfig, FrameContext, PassDeps,
};

#[derive(Debug)]
pub struct TemporalReprojectionPass {
    /// Reads history from the previous reprojection slot.
    pass: AoComputePass<gpu::TemporalReprojectionPassParams>,

    /// Reads history from the recurrent blur's output.
    feedback_pass: AoComputePass<gpu::TemporalReprojectionPassParams>,
}

impl TemporalReprojectionPass {
    pub fn new(
        device: &wgpu::Device,
        deps: &PassDeps,
        buffers: &AoBuffers,
    ) -> Self {
        let gbuffer = deps.gbuffer;
        let shader = &deps.shaders.temporal_reprojection;

        let pass = AoComputePass::builder("temporal_reprojection")
            .bind([
                &buffers.camera.bind_readable(),
                &gbuffer.depth.curr().bind_readable(),
                &gbuffer.normals.curr().bind_readable(),
                &gbuffer.motion,
                &gbuffer.depth.past().bind_readable(),
                &gbuffer.normals.past().bind_readable(),
            ])
            .bind([
                &buffers.ray_trace.bind_readable(),
                &buffers.reprojection.past().bind_readable(),
                &buffers.history_length.past().bind_readable(),
                &buffers.reprojection.curr().bind_writable(),
                &buffers.history_length.curr().bind_writable(),
            ])
            .build(device, shader);

        let feedback_pass =
            AoComputePass::builder("temporal_reprojection_feedback")
                .bind([
                    &buffers.camera.bind_readable(),
                    &gbuffer.depth.curr().bind_readable(),
                    &gbuffer.normals.curr().bind_readable(),
                    &gbuffer.motion,
                    &gbuffer.depth.past().bind_readable(),
                    &gbuffer.normals.past().bind_readable(),
                ])
                .bind([
                    &buffers.ray_trace.bind_readable(),
                    &buffers.recurrent_blur.bind_readable(),
                    &buffers.history_length.past().bind_readable(),
                    &buffers.reprojection.curr().bind_writable(),
                    &buffers.history_length.curr().bind_writable(),
                ])
                .build(device, shader);

        Self {
            pass,
            feedback_pass,
        }
    }

    pub fn run(
        &self,
        ctx: &FrameContext,
        buffers: &AoBuffers,
        encoder: &mut wgpu::CommandEncoder,
        config: &AoConfig,
        feedback: bool,
    ) {
        let pass = if feedback {
            &self.feedback_pass
        } else {
            &self.pass
        };

        pass.run(
            ctx,
            encoder,
            buffers.ray_trace.size(),
            gpu::TemporalReprojectionPassParams {
                alpha: gpu::clamp_alpha(config.temporal.alpha),
                _padding: Default::default(),
            },
        );
    }
}
