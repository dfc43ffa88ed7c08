use std::marker::PhantomData;
use std::mem;
use std::ops::Range;

use bytemuck::Pod;
use glam::UVec2;
use log::debug;

use crate::{
    gpu, BindGroup, BindGroupBuilder, DoubleBufferedBindable, FrameContext,
    Shader,
};

/// Returns the number of workgroups covering an image of given size.
pub fn workgroups(size: UVec2) -> UVec2 {
    (size + gpu::WORKGROUP_SIZE - 1) / gpu::WORKGROUP_SIZE
}

#[derive(Debug)]
pub struct AoComputePass<P = ()> {
    label: String,
    uses_scene: bool,
    bind_groups: Vec<BindGroup>,
    pipeline: wgpu::ComputePipeline,
    _params: PhantomData<P>,
}

impl<P> AoComputePass<P>
where
    P: Pod,
{
    pub fn builder<'a>(label: impl ToString) -> AoPassBuilder<'a, P> {
        AoPassBuilder {
            label: label.to_string(),
            scene_layout: None,
            bind_groups: Default::default(),
            _params: PhantomData,
        }
    }

    /// Records a dispatch covering `size` pixels.
    pub fn run(
        &self,
        ctx: &FrameContext,
        encoder: &mut wgpu::CommandEncoder,
        size: UVec2,
        params: P,
    ) {
        assert!(!self.uses_scene, "pass `{}` requires a scene", self.label);

        self.record(ctx, encoder, None, size, params);
    }

    /// Records a dispatch covering `size` pixels, with the scene attached as
    /// bind group 0.
    pub fn run_in_scene(
        &self,
        ctx: &FrameContext,
        encoder: &mut wgpu::CommandEncoder,
        scene: &wgpu::BindGroup,
        size: UVec2,
        params: P,
    ) {
        assert!(self.uses_scene, "pass `{}` doesn't use a scene", self.label);

        self.record(ctx, encoder, Some(scene), size, params);
    }

    fn record(
        &self,
        ctx: &FrameContext,
        encoder: &mut wgpu::CommandEncoder,
        scene: Option<&wgpu::BindGroup>,
        size: UVec2,
        params: P,
    ) {
        let label = format!("rtao_{}_pass", self.label);

        let mut pass =
            encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(&label),
                timestamp_writes: None,
            });

        pass.set_pipeline(&self.pipeline);

        if mem::size_of::<P>() > 0 {
            pass.set_push_constants(0, bytemuck::bytes_of(&params));
        }

        let mut bind_group_idx = 0;

        if let Some(scene) = scene {
            pass.set_bind_group(bind_group_idx, scene, &[]);
            bind_group_idx += 1;
        }

        for bind_group in &self.bind_groups {
            pass.set_bind_group(
                bind_group_idx,
                bind_group.get(ctx.is_alternate()),
                &[],
            );

            bind_group_idx += 1;
        }

        let workgroups = workgroups(size);

        pass.dispatch_workgroups(workgroups.x, workgroups.y, 1);
    }
}

pub struct AoPassBuilder<'a, P> {
    label: String,
    scene_layout: Option<&'a wgpu::BindGroupLayout>,
    bind_groups: Vec<BindGroupBuilder<'a>>,
    _params: PhantomData<P>,
}

impl<'a, P> AoPassBuilder<'a, P>
where
    P: Pod,
{
    /// Reserves bind group 0 for the scene.
    pub fn scene(mut self, layout: &'a wgpu::BindGroupLayout) -> Self {
        assert!(self.bind_groups.is_empty());

        self.scene_layout = Some(layout);
        self
    }

    pub fn bind<const N: usize>(
        mut self,
        items: [&'a dyn DoubleBufferedBindable; N],
    ) -> Self {
        let mut bind_group = BindGroup::builder(format!(
            "{}_bg{}",
            self.label,
            self.bind_groups.len()
        ));

        for item in items {
            bind_group = bind_group.add(item);
        }

        self.bind_groups.push(bind_group);
        self
    }

    pub fn build(
        self,
        device: &wgpu::Device,
        (module, entry_point): &Shader,
    ) -> AoComputePass<P> {
        debug!("Initializing pass: {}:{}", self.label, entry_point);

        let bind_groups: Vec<_> = self
            .bind_groups
            .into_iter()
            .map(|bg| bg.build(device))
            .collect();

        let bind_group_layouts: Vec<_> = self
            .scene_layout
            .into_iter()
            .chain(bind_groups.iter().map(|bg| bg.layout()))
            .collect();

        let push_constant_ranges = if mem::size_of::<P>() > 0 {
            vec![wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::COMPUTE,
                range: Range {
                    start: 0,
                    end: mem::size_of::<P>() as u32,
                },
            }]
        } else {
            vec![]
        };

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("rtao_{}_pipeline_layout", self.label)),
                bind_group_layouts: &bind_group_layouts,
                push_constant_ranges: &push_constant_ranges,
            });

        let pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(&format!("rtao_{}_pipeline", self.label)),
                layout: Some(&pipeline_layout),
                module,
                entry_point: Some(*entry_point),
                compilation_options: Default::default(),
                cache: None,
            });

        AoComputePass {
            label: self.label,
            uses_scene: self.scene_layout.is_some(),
            bind_groups,
            pipeline,
            _params: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;

    #[test]
    fn workgroups_cover_partial_tiles() {
        assert_eq!(uvec2(1, 1), workgroups(uvec2(1, 8)));
        assert_eq!(uvec2(2, 3), workgroups(uvec2(9, 17)));
        assert_eq!(uvec2(80, 45), workgroups(uvec2(640, 360)));
    }
}
