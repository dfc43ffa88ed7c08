use std::borrow::Cow;

use log::debug;

use crate::GpuScene;

const COMMON: &str = include_str!("shaders/common.wgsl");
const CLEAR_HISTORY: &str = include_str!("shaders/clear_history.wgsl");
const RAY_TRACE: &str = include_str!("shaders/ray_trace.wgsl");
const DOWNSAMPLE: &str = include_str!("shaders/downsample.wgsl");
const TEMPORAL_REPROJECTION: &str =
    include_str!("shaders/temporal_reprojection.wgsl");
const GAUSSIAN_BLUR: &str = include_str!("shaders/gaussian_blur.wgsl");
const RECURRENT_BLUR: &str = include_str!("shaders/recurrent_blur.wgsl");
const UPSAMPLE: &str = include_str!("shaders/upsample.wgsl");

/// Compute shader together with its entry point.
pub type Shader = (wgpu::ShaderModule, &'static str);

#[derive(Debug)]
pub struct Shaders {
    pub clear_history: Shader,
    pub ray_trace: Shader,
    pub downsample: Shader,
    pub temporal_reprojection: Shader,
    pub gaussian_blur: Shader,
    pub recurrent_blur: Shader,
    pub upsample: Shader,
}

impl Shaders {
    pub fn new(device: &wgpu::Device, scene: &impl GpuScene) -> Self {
        debug!("Compiling shaders");

        let ray_trace = Self::ray_trace_source(&scene.intersection_source());

        Self {
            clear_history: Self::load(device, "clear_history", CLEAR_HISTORY),
            ray_trace: Self::load(device, "ray_trace", &ray_trace),
            downsample: Self::load(device, "downsample", DOWNSAMPLE),
            temporal_reprojection: Self::load(
                device,
                "temporal_reprojection",
                TEMPORAL_REPROJECTION,
            ),
            gaussian_blur: Self::load(device, "gaussian_blur", GAUSSIAN_BLUR),
            recurrent_blur: Self::load(
                device,
                "recurrent_blur",
                RECURRENT_BLUR,
            ),
            upsample: Self::load(device, "upsample", UPSAMPLE),
        }
    }

    /// Ray-tracing shader, preceded by the scene's intersection routine.
    fn ray_trace_source(intersection_source: &str) -> String {
        format!("{intersection_source}\n{RAY_TRACE}")
    }

    /// Complete source of a shader, with the shared definitions prepended.
    fn source(body: &str) -> String {
        format!("{COMMON}\n{body}")
    }

    fn load(device: &wgpu::Device, name: &str, body: &str) -> Shader {
        let module =
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("rtao_{name}")),
                source: wgpu::ShaderSource::Wgsl(Cow::Owned(Self::source(
                    body,
                ))),
            });

        (module, "main")
    }
}

#[cfg(test)]
mod tests {
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    use super::*;

    const SCENE: &str = "
        fn scene_is_occluded(
            origin: vec3<f32>,
            direction: vec3<f32>,
            t_max: f32,
        ) -> bool {
            return t_max < 0.0;
        }
    ";

    fn validate(name: &str, body: &str) {
        let source = Shaders::source(body);

        let module =
            naga::front::wgsl::parse_str(&source).unwrap_or_else(|err| {
                panic!("{name}: {}", err.emit_to_string(&source))
            });

        Validator::new(ValidationFlags::all(), Capabilities::PUSH_CONSTANT)
            .validate(&module)
            .unwrap_or_else(|err| panic!("{name}: {err:?}"));

        assert!(
            module
                .entry_points
                .iter()
                .any(|entry_point| entry_point.name == "main"),
            "{name}: missing entry point"
        );
    }

    #[test]
    fn clear_history() {
        validate("clear_history", CLEAR_HISTORY);
    }

    #[test]
    fn ray_trace() {
        validate("ray_trace", &Shaders::ray_trace_source(SCENE));
    }

    #[test]
    fn downsample() {
        validate("downsample", DOWNSAMPLE);
    }

    #[test]
    fn temporal_reprojection() {
        validate("temporal_reprojection", TEMPORAL_REPROJECTION);
    }

    #[test]
    fn gaussian_blur() {
        validate("gaussian_blur", GAUSSIAN_BLUR);
    }

    #[test]
    fn recurrent_blur() {
        validate("recurrent_blur", RECURRENT_BLUR);
    }

    #[test]
    fn upsample() {
        validate("upsample", UPSAMPLE);
    }
}
