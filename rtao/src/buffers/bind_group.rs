use crate::DoubleBufferedBindable;

/// Pair of bind groups sharing one layout; [`BindGroup::get()`] picks the one
/// matching the current ping-pong slot.
#[derive(Debug)]
pub struct BindGroup {
    bind_group_a: wgpu::BindGroup,
    bind_group_b: wgpu::BindGroup,
    layout: wgpu::BindGroupLayout,
}

impl BindGroup {
    pub fn builder<'a>(label: impl ToString) -> BindGroupBuilder<'a> {
        BindGroupBuilder {
            label: label.to_string(),
            layouts: Default::default(),
            resources: Default::default(),
        }
    }

    pub fn get(&self, alternate: bool) -> &wgpu::BindGroup {
        if alternate {
            &self.bind_group_b
        } else {
            &self.bind_group_a
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }
}

pub struct BindGroupBuilder<'a> {
    label: String,
    layouts: Vec<wgpu::BindGroupLayoutEntry>,
    resources: Vec<[wgpu::BindingResource<'a>; 2]>,
}

impl<'a> BindGroupBuilder<'a> {
    pub fn add(mut self, item: &'a dyn DoubleBufferedBindable) -> Self {
        for (layout, resources) in item.bind(self.resources.len() as u32) {
            self.layouts.push(layout);
            self.resources.push(resources);
        }

        self
    }

    pub fn build(self, device: &wgpu::Device) -> BindGroup {
        let label = format!("rtao_{}", self.label);

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{label}_layout")),
                entries: &self.layouts,
            });

        let mut entries_a = Vec::with_capacity(self.resources.len());
        let mut entries_b = Vec::with_capacity(self.resources.len());

        for (binding, [resource_a, resource_b]) in
            self.resources.into_iter().enumerate()
        {
            let binding = binding as u32;

            entries_a.push(wgpu::BindGroupEntry {
                binding,
                resource: resource_a,
            });

            entries_b.push(wgpu::BindGroupEntry {
                binding,
                resource: resource_b,
            });
        }

        let bind_group_a =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{label}_a")),
                layout: &layout,
                entries: &entries_a,
            });

        let bind_group_b =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{label}_b")),
                layout: &layout,
                entries: &entries_b,
            });

        BindGroup {
            bind_group_a,
            bind_group_b,
            layout,
        }
    }
}
