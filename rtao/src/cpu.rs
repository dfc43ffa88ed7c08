//! Reference executor: runs the same schedules as the wgpu backend, but on
//! the CPU and with the kernels from `rtao-gpu`.
//!
//! On top of computing the images, it tracks layouts of its own images and
//! refuses to run passes whose inputs haven't been transitioned by a
//! barrier, which makes it a checker for schedules as well.

mod gbuffer;
mod image;

use derivative::Derivative;
use fxhash::FxHashMap;
use glam::{ivec2, Mat4, UVec2};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use self::gbuffer::*;
pub use self::image::*;
use crate::gpu::{GBufferMap, TexR32};
use crate::{
    gpu, AoConfig, BlueNoiseTables, BlurStage, FrameContext, FrameGraph,
    GraphError, Layout, PassKind, PassNode, ResourceId, ResourceTracker,
    SamplerType, Schedule, Slot, Subresource, UpsampleSource,
};

#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct CpuRayTracedAo<S> {
    /// Answers whether given ray hits anything up to given distance.
    #[derivative(Debug = "ignore")]
    scene: S,

    #[derivative(Debug = "ignore")]
    blue_noise: BlueNoiseTables,

    camera: gpu::Camera,
    config: AoConfig,
    images: FxHashMap<ResourceId, CpuImage>,
    layouts: FxHashMap<(ResourceId, u32), Layout>,
    tracker: ResourceTracker,
    last_schedule: Option<Schedule>,
}

impl<S> CpuRayTracedAo<S>
where
    S: Fn(gpu::Ray, f32) -> bool,
{
    pub fn new(scene: S, camera: gpu::Camera, config: AoConfig) -> Self {
        let size = camera.working_size();

        info!(
            "Creating CPU ambient occlusion; full_size={:?}, working_size={:?}",
            camera.full_size(),
            size
        );

        let mut images = FxHashMap::default();

        for resource in Self::resources() {
            let image_size = if resource == ResourceId::Upsample {
                gpu::upsample_size(size)
            } else {
                size
            };

            images.insert(
                resource,
                CpuImage::new(image_size, resource.mip_levels()),
            );
        }

        Self {
            scene,
            blue_noise: BlueNoiseTables::new(),
            camera,
            config,
            images,
            layouts: Default::default(),
            tracker: ResourceTracker::new(),
            last_schedule: None,
        }
    }

    fn resources() -> impl Iterator<Item = ResourceId> {
        [
            ResourceId::RayTrace,
            ResourceId::Reprojection(Slot::A),
            ResourceId::Reprojection(Slot::B),
            ResourceId::HistoryLength(Slot::A),
            ResourceId::HistoryLength(Slot::B),
            ResourceId::GaussianBlur(BlurStage::Vertical),
            ResourceId::GaussianBlur(BlurStage::Horizontal),
            ResourceId::RecurrentBlur,
            ResourceId::Upsample,
        ]
        .into_iter()
    }

    pub fn config(&self) -> &AoConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AoConfig {
        &mut self.config
    }

    pub fn camera(&self) -> &gpu::Camera {
        &self.camera
    }

    /// Updates the view; changing the resolution requires creating a new
    /// executor.
    pub fn update_camera(&mut self, ndc_to_world: Mat4, near: f32, far: f32) {
        self.camera =
            gpu::Camera::new(ndc_to_world, near, far, self.camera.full_size());
    }

    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// Returns the schedule executed by the most recent [`Self::render()`]
    /// that recorded any work.
    pub fn last_schedule(&self) -> Option<&Schedule> {
        self.last_schedule.as_ref()
    }

    pub fn image(&self, resource: ResourceId) -> &CpuImage {
        &self.images[&resource]
    }

    /// Returns the full-resolution result.
    pub fn output(&self) -> CpuMip<'_> {
        self.image(ResourceId::Upsample).mip(0)
    }

    pub fn layout(&self, resource: ResourceId, mip: u32) -> Layout {
        self.layouts
            .get(&(resource, mip))
            .copied()
            .unwrap_or_default()
    }

    /// Renders a frame.
    ///
    /// `gbuffer` is the current frame's G-buffer, `prev_gbuffer` the one
    /// rendered for the previous frame.
    pub fn render(
        &mut self,
        ctx: &FrameContext,
        gbuffer: &CpuGBuffer,
        prev_gbuffer: &CpuGBuffer,
    ) -> Result<(), GraphError> {
        let config = self.config.clamped();
        let graph = FrameGraph::ambient_occlusion(&config, ctx, &self.tracker);

        if graph.is_empty() {
            debug!("Nothing to render (frame={})", ctx.frame());
            return Ok(());
        }

        let schedule = self.tracker.schedule(&graph, ctx)?;

        self.execute(ctx, &schedule, gbuffer, prev_gbuffer)?;
        self.last_schedule = Some(schedule);

        Ok(())
    }

    /// Runs given schedule, checking that every pass observes its inputs in
    /// the layouts it requires.
    pub fn execute(
        &mut self,
        ctx: &FrameContext,
        schedule: &Schedule,
        gbuffer: &CpuGBuffer,
        prev_gbuffer: &CpuGBuffer,
    ) -> Result<(), GraphError> {
        assert_eq!(self.camera.full_size(), gbuffer.size());
        assert_eq!(self.camera.full_size(), prev_gbuffer.size());

        let config = self.config.clamped();

        for pass in &schedule.passes {
            for barrier in &pass.barriers {
                let sub = barrier.subresource;

                for mip in sub.levels() {
                    let layout = self.layout(sub.resource, mip);

                    if barrier.src_layout != Layout::Undefined
                        && barrier.src_layout != layout
                    {
                        return Err(GraphError::MissingBarrier {
                            pass: pass.node.kind,
                            resource: sub.resource,
                            mip,
                            expected: barrier.src_layout,
                            actual: layout,
                        });
                    }

                    self.layouts
                        .insert((sub.resource, mip), barrier.dst_layout);
                }
            }

            self.validate(&pass.node)?;

            self.run(ctx, &config, &pass.node, gbuffer, prev_gbuffer);
        }

        for barrier in &schedule.export {
            for mip in barrier.subresource.levels() {
                self.layouts.insert(
                    (barrier.subresource.resource, mip),
                    barrier.dst_layout,
                );
            }
        }

        Ok(())
    }

    fn validate(&self, node: &PassNode) -> Result<(), GraphError> {
        let check = |sub: &Subresource, expected: Layout| {
            for mip in sub.levels() {
                let actual = self.layout(sub.resource, mip);

                if actual != expected {
                    return Err(GraphError::MissingBarrier {
                        pass: node.kind,
                        resource: sub.resource,
                        mip,
                        expected,
                        actual,
                    });
                }
            }

            Ok(())
        };

        for sub in node.all_reads() {
            check(sub, Layout::ShaderReadOnly)?;
        }

        for sub in &node.writes {
            check(sub, Layout::General)?;
        }

        Ok(())
    }

    fn run(
        &mut self,
        ctx: &FrameContext,
        config: &AoConfig,
        node: &PassNode,
        gbuffer: &CpuGBuffer,
        prev_gbuffer: &CpuGBuffer,
    ) {
        match node.kind {
            PassKind::ClearHistory => {
                for sub in &node.writes {
                    let image = self.image_mut(sub.resource);

                    for mip in sub.levels() {
                        image.fill(mip, 0.0);
                    }
                }
            }

            PassKind::RayTrace => {
                let texels = self.ray_trace(ctx, config, gbuffer);

                self.store(node.writes[0], texels);
            }

            PassKind::Downsample { target, level } => {
                let src = self.image(target).mip(level - 1);

                let texels = CpuMip::compute(
                    gpu::mip_size(self.image(target).size(), level),
                    |pos| gpu::downsample(src, pos),
                );

                self.store(node.writes[0], texels);
            }

            PassKind::TemporalReprojection { .. } => {
                let (colors, history_lengths) = self.temporal_reprojection(
                    config,
                    node,
                    gbuffer,
                    prev_gbuffer,
                );

                self.store(node.writes[0], colors);
                self.store(node.writes[1], history_lengths);
            }

            PassKind::GaussianBlur(stage) => {
                let direction = match stage {
                    BlurStage::Vertical => ivec2(0, 1),
                    BlurStage::Horizontal => ivec2(1, 0),
                };

                let blur = gpu::GaussianBlur::new(&gpu::GaussianBlurPassParams {
                    z_buffer_params: self.camera.z_buffer_params,
                    direction,
                    radius: config.gaussian_blur.radius as i32,
                    _padding: Default::default(),
                });

                let input = self.image(node.reads[0].resource).mip(0);
                let history_length = self.image(node.reads[1].resource).mip(0);

                let texels = CpuMip::compute(input.size(), |pos| {
                    blur.run(pos, input, history_length, gbuffer)
                });

                self.store(node.writes[0], texels);
            }

            PassKind::RecurrentBlur => {
                let blur =
                    gpu::RecurrentBlur::new(&gpu::RecurrentBlurPassParams {
                        z_buffer_params: self.camera.z_buffer_params,
                        radius: config.recurrent_blur.radius as f32,
                        num_frames: ctx.num_frames(),
                        self_stabilize: config.recurrent_blur.self_stabilize
                            as u32,
                        _padding: Default::default(),
                    });

                let input = self.image(node.reads[0].resource).mips();
                let history_length = self.image(node.reads[1].resource).mip(0);

                let texels = CpuMip::compute(input[0].size(), |pos| {
                    blur.run(pos, input.as_slice(), history_length, gbuffer)
                });

                self.store(node.writes[0], texels);
            }

            PassKind::Upsample { .. } => {
                let upsample = gpu::Upsample::new(&gpu::UpsamplePassParams {
                    z_buffer_params: self.camera.z_buffer_params,
                });

                let input = self.image(node.reads[0].resource).mip(0);

                let texels = CpuMip::compute(
                    self.image(ResourceId::Upsample).size(),
                    |pos| upsample.run(pos, input, gbuffer),
                );

                self.store(node.writes[0], texels);
            }
        }
    }

    fn ray_trace(
        &self,
        ctx: &FrameContext,
        config: &AoConfig,
        gbuffer: &CpuGBuffer,
    ) -> Vec<f32> {
        let ao = gpu::AmbientOcclusion::new(&gpu::RayTracePassParams {
            num_rays: config.ray_trace.num_rays,
            num_frames: ctx.num_frames(),
            ray_length: config.ray_trace.ray_length,
            power: config.ray_trace.power,
            bias: config.ray_trace.bias,
            sampler_type: config.sampler.serialize(),
            seed: 0,
            _padding: 0,
        });

        let seed: u32 = StdRng::seed_from_u64(ctx.frame()).gen();
        let max_pos = gbuffer.size() - UVec2::ONE;

        CpuMip::compute(self.camera.working_size(), |pos| {
            let entry = gbuffer.get_half(pos);
            let full_pos = (pos * 2).min(max_pos);
            let world_pos = self.camera.world_position(full_pos, entry.depth);
            let occluded = |ray, t_max| (self.scene)(ray, t_max);

            match config.sampler {
                SamplerType::BlueNoise => {
                    let mut sampler =
                        self.blue_noise.sampler(pos, ctx.num_frames());

                    ao.estimate(&entry, world_pos, &mut sampler, occluded)
                }

                SamplerType::WhiteNoise => {
                    let mut sampler = gpu::WhiteNoise::new(seed, pos);

                    ao.estimate(&entry, world_pos, &mut sampler, occluded)
                }
            }
        })
    }

    fn temporal_reprojection(
        &self,
        config: &AoConfig,
        node: &PassNode,
        gbuffer: &CpuGBuffer,
        prev_gbuffer: &CpuGBuffer,
    ) -> (Vec<f32>, Vec<f32>) {
        let raw = self.image(node.reads[0].resource).mip(0);
        let prev_color = self.image(node.history_reads[0].resource).mip(0);

        let prev_history_length =
            self.image(node.history_reads[1].resource).mip(0);

        let size = raw.size();
        let mut colors = Vec::with_capacity((size.x * size.y) as usize);
        let mut history_lengths = Vec::with_capacity(colors.capacity());

        for y in 0..size.y {
            for x in 0..size.x {
                let pos = UVec2::new(x, y);

                let reprojection = gpu::Reprojection::find(
                    pos,
                    size,
                    gbuffer,
                    prev_gbuffer,
                    self.camera.z_buffer_params,
                );

                let sample = gpu::accumulate(
                    raw.read(pos),
                    reprojection,
                    config.temporal.alpha,
                    |pos| prev_color.read(pos),
                    |pos| prev_history_length.read(pos),
                );

                colors.push(sample.color);
                history_lengths.push(sample.history_length);
            }
        }

        (colors, history_lengths)
    }

    fn image_mut(&mut self, resource: ResourceId) -> &mut CpuImage {
        self.images
            .get_mut(&resource)
            .unwrap_or_else(|| panic!("unknown resource: {resource}"))
    }

    fn store(&mut self, sub: Subresource, texels: Vec<f32>) {
        assert_eq!(1, sub.mip_count);

        self.image_mut(sub.resource).store(sub.base_mip, texels);
    }
}

impl<S> CpuRayTracedAo<S> {
    /// Returns which image the most recent upsample pass has read.
    pub fn denoised_source(&self) -> Option<UpsampleSource> {
        self.last_schedule.as_ref()?.kinds().find_map(|kind| match kind {
            PassKind::Upsample { source } => Some(source),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use approx::assert_relative_eq;
    use glam::{uvec2, Vec2, Vec3};

    use super::*;
    use crate::Denoiser;

    fn camera(size: UVec2) -> gpu::Camera {
        gpu::Camera::new(Mat4::IDENTITY, 0.1, 100.0, size)
    }

    fn flat_gbuffer(size: UVec2, depth: f32) -> CpuGBuffer {
        CpuGBuffer::filled(
            size,
            gpu::GBufferEntry {
                depth,
                normal: Vec3::Z,
                motion: Vec2::ZERO,
            },
        )
    }

    fn unoccluded(_: gpu::Ray, _: f32) -> bool {
        false
    }

    fn occluded(_: gpu::Ray, _: f32) -> bool {
        true
    }

    fn assert_all(texels: &[f32], expected: f32) {
        for &texel in texels {
            assert_relative_eq!(expected, texel, epsilon = 0.0001);
        }
    }

    #[test]
    fn unoccluded_flat_scene_converges() {
        let mut config = AoConfig::default();

        config.ray_trace.set_num_rays(1);
        config.temporal.set_alpha(0.5);

        let camera = camera(uvec2(16, 12));
        let gbuffer = flat_gbuffer(camera.full_size(), 0.5);
        let mut target = CpuRayTracedAo::new(unoccluded, camera, config);
        let mut ctx = FrameContext::first();

        target.render(&ctx, &gbuffer, &gbuffer).unwrap();

        assert_all(target.image(ResourceId::RayTrace).mip(0).texels(), 1.0);

        for _ in 1..10 {
            ctx.advance();
            target.render(&ctx, &gbuffer, &gbuffer).unwrap();
        }

        assert_all(target.output().texels(), 1.0);

        assert_all(
            target
                .image(ResourceId::HistoryLength(ctx.curr_slot()))
                .mip(0)
                .texels(),
            gpu::HISTORY_LENGTH_MAX,
        );
    }

    #[test]
    fn history_length_grows_until_saturated() {
        let camera = camera(uvec2(8, 8));
        let gbuffer = flat_gbuffer(camera.full_size(), 0.5);

        let mut target =
            CpuRayTracedAo::new(unoccluded, camera, AoConfig::default());

        let mut ctx = FrameContext::first();

        for expected in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 8.0, 8.0] {
            target.render(&ctx, &gbuffer, &gbuffer).unwrap();

            assert_all(
                target
                    .image(ResourceId::HistoryLength(ctx.curr_slot()))
                    .mip(0)
                    .texels(),
                expected,
            );

            ctx.advance();
        }
    }

    #[test]
    fn history_resets_on_disocclusion() {
        let camera = camera(uvec2(8, 8));
        let near = flat_gbuffer(camera.full_size(), 0.5);
        let far = flat_gbuffer(camera.full_size(), 0.9);

        let mut target =
            CpuRayTracedAo::new(unoccluded, camera, AoConfig::default());

        let mut ctx = FrameContext::first();

        target.render(&ctx, &far, &far).unwrap();
        ctx.advance();
        target.render(&ctx, &near, &far).unwrap();

        assert_all(
            target
                .image(ResourceId::HistoryLength(ctx.curr_slot()))
                .mip(0)
                .texels(),
            0.0,
        );
    }

    #[test]
    fn occluded_scene_is_dark() {
        let camera = camera(uvec2(8, 6));
        let gbuffer = flat_gbuffer(camera.full_size(), 0.5);

        let mut target =
            CpuRayTracedAo::new(occluded, camera, AoConfig::default());

        target
            .render(&FrameContext::first(), &gbuffer, &gbuffer)
            .unwrap();

        assert_all(target.image(ResourceId::RayTrace).mip(0).texels(), 0.0);
        assert_all(target.output().texels(), 0.0);
    }

    #[test]
    fn flickering_scene_follows_running_mean() {
        for alpha in [0.25, 0.5] {
            let is_occluded = Cell::new(false);
            let scene = |_: gpu::Ray, _: f32| is_occluded.get();
            let camera = camera(uvec2(12, 8));
            let gbuffer = flat_gbuffer(camera.full_size(), 0.5);
            let mut config = AoConfig::default();

            config.ray_trace.set_num_rays(1);
            config.temporal.set_alpha(alpha);

            let mut target = CpuRayTracedAo::new(scene, camera, config);
            let mut ctx = FrameContext::first();
            let mut expected = None;

            for frame in 0..8 {
                is_occluded.set(frame % 2 == 1);

                let raw = if is_occluded.get() { 0.0 } else { 1.0 };

                target.render(&ctx, &gbuffer, &gbuffer).unwrap();

                let mean = match expected {
                    Some(history) => raw * (1.0 - alpha) + history * alpha,
                    None => raw,
                };

                assert_all(
                    target.image(ResourceId::RayTrace).mip(0).texels(),
                    raw,
                );

                assert_all(
                    target
                        .image(ResourceId::Reprojection(ctx.curr_slot()))
                        .mip(0)
                        .texels(),
                    mean,
                );

                assert_all(target.output().texels(), mean);

                expected = Some(mean);
                ctx.advance();
            }
        }
    }

    #[test]
    fn feedback_blends_denoised_history() {
        // Right half of the screen is fully occluded
        let scene = |ray: gpu::Ray, _: f32| ray.origin().x > 0.0;
        let camera = camera(uvec2(16, 12));
        let gbuffer = flat_gbuffer(camera.full_size(), 0.5);

        let reprojection = |denoiser: Denoiser, feedback: bool| {
            let mut config = AoConfig::default();

            config.ray_trace.set_num_rays(1);
            config.temporal.set_alpha(0.5);
            config.denoiser = denoiser;
            config.recurrent_blur.feedback = feedback;

            let mut target = CpuRayTracedAo::new(scene, camera, config);
            let mut ctx = FrameContext::first();

            for _ in 0..4 {
                target.render(&ctx, &gbuffer, &gbuffer).unwrap();
                ctx.advance();
            }

            let schedule = target.last_schedule().unwrap();

            assert_eq!(
                feedback,
                schedule
                    .pass(PassKind::TemporalReprojection { feedback: true })
                    .is_some()
            );

            let texels = target
                .image(ResourceId::Reprojection(ctx.prev_slot()))
                .mip(0)
                .texels()
                .to_vec();

            texels
        };

        let gaussian = reprojection(Denoiser::Gaussian, false);
        let recurrent = reprojection(Denoiser::Recurrent, false);
        let recurrent_with_feedback = reprojection(Denoiser::Recurrent, true);

        // Without feedback, history holds the raw signal, which is constant
        assert_eq!(gaussian, recurrent);
        assert!(gaussian.iter().all(|&texel| texel == 0.0 || texel == 1.0));

        let difference: f32 = gaussian
            .iter()
            .zip(&recurrent_with_feedback)
            .map(|(a, b)| (a - b).abs())
            .sum();

        assert!(difference > 0.01, "difference = {difference}");
    }

    #[test]
    fn output_is_twice_the_working_resolution() {
        for size in [uvec2(16, 12), uvec2(15, 9), uvec2(2, 2)] {
            let camera = camera(size);
            let gbuffer = flat_gbuffer(size, 0.5);

            let mut target =
                CpuRayTracedAo::new(unoccluded, camera, AoConfig::default());

            target
                .render(&FrameContext::first(), &gbuffer, &gbuffer)
                .unwrap();

            assert_eq!(camera.working_size() * 2, target.output().size());
            assert_all(target.output().texels(), 1.0);
        }
    }

    #[test]
    fn slots_ping_pong() {
        let camera = camera(uvec2(8, 8));
        let gbuffer = flat_gbuffer(camera.full_size(), 0.5);

        let mut target =
            CpuRayTracedAo::new(unoccluded, camera, AoConfig::default());

        let mut ctx = FrameContext::first();

        target.render(&ctx, &gbuffer, &gbuffer).unwrap();

        ctx.advance();
        target.render(&ctx, &gbuffer, &gbuffer).unwrap();

        let node = &target
            .last_schedule()
            .unwrap()
            .pass(PassKind::TemporalReprojection { feedback: false })
            .unwrap()
            .node;

        assert!(node
            .history_reads
            .contains(&ResourceId::Reprojection(Slot::A).mip(0)));

        assert!(node
            .writes
            .contains(&ResourceId::Reprojection(Slot::B).mip(0)));

        let tracker = target.tracker();

        assert_eq!(
            Some(0),
            tracker.last_written(ResourceId::Reprojection(Slot::A), 0)
        );

        assert_eq!(
            Some(1),
            tracker.last_written(ResourceId::Reprojection(Slot::B), 0)
        );
    }

    #[test]
    fn first_frame_reads_cleared_history() {
        let camera = camera(uvec2(8, 8));
        let gbuffer = flat_gbuffer(camera.full_size(), 0.5);

        let mut target =
            CpuRayTracedAo::new(unoccluded, camera, AoConfig::default());

        let ctx = FrameContext::first();

        target.render(&ctx, &gbuffer, &gbuffer).unwrap();

        let kinds: Vec<_> = target.last_schedule().unwrap().kinds().collect();

        let clear_idx = kinds
            .iter()
            .position(|kind| *kind == PassKind::ClearHistory)
            .unwrap();

        let reprojection_idx = kinds
            .iter()
            .position(|kind| {
                *kind == PassKind::TemporalReprojection { feedback: false }
            })
            .unwrap();

        assert!(clear_idx < reprojection_idx);

        let prev = ctx.prev_slot();

        assert_all(
            target.image(ResourceId::Reprojection(prev)).mip(0).texels(),
            0.0,
        );

        assert_all(
            target.image(ResourceId::HistoryLength(prev)).mip(0).texels(),
            0.0,
        );

        // Cleared history is dropped, but the pixels start accumulating
        assert_all(
            target
                .image(ResourceId::HistoryLength(ctx.curr_slot()))
                .mip(0)
                .texels(),
            1.0,
        );

        assert_all(target.output().texels(), 1.0);
    }

    #[test]
    fn switching_denoisers_mid_run() {
        let camera = camera(uvec2(12, 10));
        let gbuffer = flat_gbuffer(camera.full_size(), 0.5);
        let mut config = AoConfig::default();

        config.recurrent_blur.feedback = true;

        let mut target = CpuRayTracedAo::new(unoccluded, camera, config);
        let mut ctx = FrameContext::first();

        for frame in 0..12 {
            let (denoiser, source) = if (frame / 3) % 2 == 0 {
                (Denoiser::Gaussian, UpsampleSource::GaussianBlur)
            } else {
                (Denoiser::Recurrent, UpsampleSource::RecurrentBlur)
            };

            target.config_mut().denoiser = denoiser;
            target.render(&ctx, &gbuffer, &gbuffer).unwrap();

            assert_eq!(Some(source), target.denoised_source());
            assert_all(target.output().texels(), 1.0);

            ctx.advance();
        }
    }

    #[test]
    fn reenabling_denoise_clears_history() {
        let camera = camera(uvec2(8, 8));
        let gbuffer = flat_gbuffer(camera.full_size(), 0.5);

        let mut target =
            CpuRayTracedAo::new(unoccluded, camera, AoConfig::default());

        let mut ctx = FrameContext::first();

        for denoise in [true, true, false, false, true] {
            target.config_mut().denoise = denoise;
            target.render(&ctx, &gbuffer, &gbuffer).unwrap();

            if !denoise {
                assert_eq!(Some(UpsampleSource::Raw), target.denoised_source());
            }

            ctx.advance();
        }

        let schedule = target.last_schedule().unwrap();

        assert!(schedule.pass(PassKind::ClearHistory).is_some());

        assert_all(
            target
                .image(ResourceId::HistoryLength(ctx.prev_slot()))
                .mip(0)
                .texels(),
            1.0,
        );
    }

    #[test]
    fn disabled_leaves_output_untouched() {
        let camera = camera(uvec2(8, 8));
        let gbuffer = flat_gbuffer(camera.full_size(), 0.5);
        let mut config = AoConfig::default();

        config.enabled = false;

        let mut target = CpuRayTracedAo::new(unoccluded, camera, config);

        target
            .render(&FrameContext::first(), &gbuffer, &gbuffer)
            .unwrap();

        assert!(target.last_schedule().is_none());
        assert!(target.output().texels().iter().all(|texel| texel.is_nan()));
    }

    #[test]
    fn rejects_missing_barriers() {
        let camera = camera(uvec2(8, 8));
        let gbuffer = flat_gbuffer(camera.full_size(), 0.5);
        let config = AoConfig::default();
        let ctx = FrameContext::first();

        let mut target =
            CpuRayTracedAo::new(unoccluded, camera, config.clone());
        let mut tracker = ResourceTracker::new();
        let graph = FrameGraph::ambient_occlusion(&config, &ctx, &tracker);
        let mut schedule = tracker.schedule(&graph, &ctx).unwrap();

        schedule
            .passes
            .iter_mut()
            .find(|pass| pass.node.kind == PassKind::RayTrace)
            .unwrap()
            .barriers
            .clear();

        let actual = target
            .execute(&ctx, &schedule, &gbuffer, &gbuffer)
            .unwrap_err();

        assert_eq!(
            GraphError::MissingBarrier {
                pass: PassKind::RayTrace,
                resource: ResourceId::RayTrace,
                mip: 0,
                expected: Layout::General,
                actual: Layout::Undefined,
            },
            actual
        );
    }
}
