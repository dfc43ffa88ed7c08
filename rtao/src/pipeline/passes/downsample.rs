use crate::{
    gpu, AoBuffers, AoComputePass, FrameContext, PassDeps, ResourceId,
};

/// Builds mip chains, one level per dispatch.
#[derive(Debug)]
pub struct DownsamplePass {
    /// `ray_trace_passes[n]` builds mip `n + 1`
    ray_trace_passes: Vec<AoComputePass>,

    /// Same as above, for the current reprojection slot
    reprojection_passes: Vec<AoComputePass>,
}

impl DownsamplePass {
    pub fn new(
        device: &wgpu::Device,
        deps: &PassDeps,
        buffers: &AoBuffers,
    ) -> Self {
        let shader = &deps.shaders.downsample;

        let ray_trace_passes = (1..gpu::MIP_LEVELS)
            .map(|mip| {
                AoComputePass::builder(format!("downsample_ray_trace_{mip}"))
                    .bind([
                        &buffers.ray_trace.bind_mip_readable(mip - 1),
                        &buffers.ray_trace.bind_mip_writable(mip),
                    ])
                    .build(device, shader)
            })
            .collect();

        let reprojection_passes = (1..gpu::MIP_LEVELS)
            .map(|mip| {
                AoComputePass::builder(format!("downsample_reprojection_{mip}"))
                    .bind([
                        &buffers.reprojection.curr().bind_mip_readable(mip - 1),
                        &buffers.reprojection.curr().bind_mip_writable(mip),
                    ])
                    .build(device, shader)
            })
            .collect();

        Self {
            ray_trace_passes,
            reprojection_passes,
        }
    }

    pub fn run(
        &self,
        ctx: &FrameContext,
        buffers: &AoBuffers,
        encoder: &mut wgpu::CommandEncoder,
        target: ResourceId,
        level: u32,
    ) {
        assert!(level >= 1 && level < gpu::MIP_LEVELS);

        let passes = match target {
            ResourceId::RayTrace => &self.ray_trace_passes,
            ResourceId::Reprojection(slot) => {
                assert_eq!(slot, ctx.curr_slot());

                &self.reprojection_passes
            }
            _ => panic!("`{target}` has no mips to downsample"),
        };

        passes[(level - 1) as usize].run(
            ctx,
            encoder,
            buffers.texture(target).mip_size(level),
            Default::default(),
        );
    }
}
