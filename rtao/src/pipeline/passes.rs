use log::debug;

use crate::{AoBuffers, GBufferViews, Noise, Shaders};

/// Everything passes are built from, apart from the buffers themselves.
pub struct PassDeps<'a> {
    pub shaders: &'a Shaders,
    pub noise: &'a Noise,
    pub gbuffer: &'a GBufferViews,
    pub scene_layout: &'a wgpu::BindGroupLayout,
}

macro_rules! passes {
    ([ $( $name:ident => $class:ident, )* ]) => {
        $( mod $name; )*
        $( pub use self::$name::*; )*

        #[derive(Debug)]
        pub struct AoPasses {
            $( pub $name: $class, )*
        }

        impl AoPasses {
            pub fn new(
                device: &wgpu::Device,
                deps: &PassDeps,
                buffers: &AoBuffers,
            ) -> Self {
                debug!("Initializing passes");

                Self {
                    $( $name: $class::new(device, deps, buffers), )*
                }
            }
        }
    };
}

passes!([
    clear_history => ClearHistoryPass,
    downsample => DownsamplePass,
    gaussian_blur => GaussianBlurPass,
    ray_trace => RayTracePass,
    recurrent_blur => RecurrentBlurPass,
    temporal_reprojection => TemporalReprojectionPass,
    upsample => UpsamplePass,
]);
