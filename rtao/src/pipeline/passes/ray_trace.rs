use crate::{
    gpu, AoBuffers, AoComputePass, AoConfig, FrameContext, PassDeps,
};

#[derive(Debug)]
pub struct RayTracePass {
    pass: AoComputePass<gpu::RayTracePassParams>,
}

impl RayTracePass {
    pub fn new(
        device: &wgpu::Device,
        deps: &PassDeps,
        buffers: &AoBuffers,
    ) -> Self {
        let gbuffer = deps.gbuffer;

        let pass = AoComputePass::builder("ray_trace")
            .scene(deps.scene_layout)
            .bind([
                &buffers.camera.bind_readable(),
                &gbuffer.depth.curr().bind_readable(),
                &gbuffer.normals.curr().bind_readable(),
                &deps.noise.bind_blue_noise(),
                &buffers.ray_trace.bind_writable(),
            ])
            .build(device, &deps.shaders.ray_trace);

        Self { pass }
    }

    pub fn run(
        &self,
        ctx: &FrameContext,
        buffers: &AoBuffers,
        encoder: &mut wgpu::CommandEncoder,
        scene: &wgpu::BindGroup,
        config: &AoConfig,
        seed: u32,
    ) {
        let params = gpu::RayTracePassParams {
            num_rays: config.ray_trace.num_rays,
            num_frames: ctx.num_frames(),
            ray_length: config.ray_trace.ray_length,
            power: config.ray_trace.power,
            bias: config.ray_trace.bias,
            sampler_type: config.sampler.serialize(),
            seed,
            _padding: Default::default(),
        };

        self.pass.run_in_scene(
            ctx,
            encoder,
            scene,
            buffers.ray_trace.size(),
            params,
        );
    }
}
