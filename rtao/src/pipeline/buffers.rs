use log::debug;

use crate::{
    gpu, BlurStage, DoubleBuffered, MappedUniformBuffer, ResourceId, Texture,
};

/// Every image the pipeline owns, sized from the camera's viewport.
#[derive(Debug)]
pub struct AoBuffers {
    pub camera: MappedUniformBuffer<gpu::Camera>,
    pub ray_trace: Texture,
    pub reprojection: DoubleBuffered<Texture>,
    pub history_length: DoubleBuffered<Texture>,
    pub gaussian_blur: [Texture; 2],
    pub recurrent_blur: Texture,
    pub upsample: Texture,
}

impl AoBuffers {
    pub fn new(device: &wgpu::Device, camera: gpu::Camera) -> Self {
        let size = camera.working_size();

        debug!("Initializing buffers; working_size={size:?}");

        Self {
            camera: MappedUniformBuffer::new(device, "rtao_camera", camera),
            ray_trace: Texture::with_mips(
                device,
                "rtao_ray_trace",
                size,
                gpu::MIP_LEVELS,
            ),
            reprojection: DoubleBuffered::<Texture>::new(
                device,
                "rtao_reprojection",
                size,
                gpu::MIP_LEVELS,
            ),
            history_length: DoubleBuffered::<Texture>::new(
                device,
                "rtao_history_length",
                size,
                1,
            ),
            gaussian_blur: [
                Texture::new(device, "rtao_gaussian_blur_vertical", size),
                Texture::new(device, "rtao_gaussian_blur_horizontal", size),
            ],
            recurrent_blur: Texture::new(device, "rtao_recurrent_blur", size),
            upsample: Texture::new(
                device,
                "rtao_upsample",
                gpu::upsample_size(size),
            ),
        }
    }

    pub fn texture(&self, resource: ResourceId) -> &Texture {
        match resource {
            ResourceId::RayTrace => &self.ray_trace,
            ResourceId::Reprojection(slot) => self.reprojection.slot(slot),
            ResourceId::HistoryLength(slot) => self.history_length.slot(slot),
            ResourceId::GaussianBlur(stage) => {
                &self.gaussian_blur[stage.index()]
            }
            ResourceId::RecurrentBlur => &self.recurrent_blur,
            ResourceId::Upsample => &self.upsample,
        }
    }

    pub fn gaussian_blur(&self, stage: BlurStage) -> &Texture {
        &self.gaussian_blur[stage.index()]
    }
}
