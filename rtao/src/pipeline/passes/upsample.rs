use crate::{
    gpu, AoBuffers, AoComputePass, BlurStage, FrameContext, PassDeps,
    UpsampleSource,
};

#[derive(Debug)]
pub struct UpsamplePass {
    raw_pass: AoComputePass<gpu::UpsamplePassParams>,
    gaussian_blur_pass: AoComputePass<gpu::UpsamplePassParams>,
    recurrent_blur_pass: AoComputePass<gpu::UpsamplePassParams>,
}

impl UpsamplePass {
    pub fn new(
        device: &wgpu::Device,
        deps: &PassDeps,
        buffers: &AoBuffers,
    ) -> Self {
        let gbuffer = deps.gbuffer;
        let shader = &deps.shaders.upsample;

        let build = |label: &str, src: &crate::Texture| {
            AoComputePass::<gpu::UpsamplePassParams>::builder(label)
                .bind([
                    &gbuffer.depth.curr().bind_readable(),
                    &gbuffer.normals.curr().bind_readable(),
                ])
                .bind([&src.bind_readable(), &buffers.upsample.bind_writable()])
                .build(device, shader)
        };

        Self {
            raw_pass: build("upsample_raw", &buffers.ray_trace),
            gaussian_blur_pass: build(
                "upsample_gaussian_blur",
                buffers.gaussian_blur(BlurStage::Horizontal),
            ),
            recurrent_blur_pass: build(
                "upsample_recurrent_blur",
                &buffers.recurrent_blur,
            ),
        }
    }

    pub fn run(
        &self,
        ctx: &FrameContext,
        buffers: &AoBuffers,
        encoder: &mut wgpu::CommandEncoder,
        source: UpsampleSource,
    ) {
        let pass = match source {
            UpsampleSource::Raw => &self.raw_pass,
            UpsampleSource::GaussianBlur => &self.gaussian_blur_pass,
            UpsampleSource::RecurrentBlur => &self.recurrent_blur_pass,
        };

        pass.run(
            ctx,
            encoder,
            buffers.upsample.size(),
            gpu::UpsamplePassParams {
                z_buffer_params: buffers.camera.z_buffer_params,
            },
        );
    }
}
