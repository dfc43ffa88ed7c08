use std::any;

use bytemuck::Pod;
use log::info;
use wgpu::util::DeviceExt;

use crate::Bindable;

/// Read-only storage buffer, uploaded once at creation.
#[derive(Debug)]
pub struct StorageBuffer {
    buffer: wgpu::Buffer,
}

impl StorageBuffer {
    pub fn new<T>(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        data: &[T],
    ) -> Self
    where
        T: Pod,
    {
        let label = label.as_ref();

        info!(
            "Allocating storage buffer `{label}`; ty={}, len={}",
            any::type_name::<T>(),
            data.len(),
        );

        assert!(!data.is_empty());

        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::STORAGE,
            });

        Self { buffer }
    }
}

impl Bindable for StorageBuffer {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        vec![(layout, self.buffer.as_entire_binding())]
    }
}
