use crate::{AoBuffers, AoComputePass, FrameContext, PassDeps};

/// Zeroes the history that temporal reprojection is about to read.
#[derive(Debug)]
pub struct ClearHistoryPass {
    pass: AoComputePass,
}

impl ClearHistoryPass {
    pub fn new(
        device: &wgpu::Device,
        deps: &PassDeps,
        buffers: &AoBuffers,
    ) -> Self {
        let pass = AoComputePass::builder("clear_history")
            .bind([
                &buffers.reprojection.past().bind_mip_writable(0),
                &buffers.history_length.past().bind_writable(),
            ])
            .build(device, &deps.shaders.clear_history);

        Self { pass }
    }

    pub fn run(
        &self,
        ctx: &FrameContext,
        buffers: &AoBuffers,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        self.pass
            .run(ctx, encoder, buffers.ray_trace.size(), Default::default());
    }
}
