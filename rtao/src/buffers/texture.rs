use glam::UVec2;
use log::debug;

use crate::{gpu, Bindable};

/// Single-channel image the pipeline works on.
pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;

/// Single-channel, optionally mip-mapped image.
///
/// Each mip level gets its own view, so that one pass can read level `n - 1`
/// while writing level `n`; the filters that pick a level per pixel bind all
/// of them at once through [`Texture::bind_all_readable()`].
#[derive(Debug)]
pub struct Texture {
    tex: wgpu::Texture,
    mip_views: Vec<wgpu::TextureView>,
    all_mips_view: wgpu::TextureView,
    size: UVec2,
}

impl Texture {
    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: UVec2,
    ) -> Self {
        Self::with_mips(device, label, size, 1)
    }

    pub fn with_mips(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: UVec2,
        mip_levels: u32,
    ) -> Self {
        let label = label.as_ref();

        debug!(
            "Allocating texture `{label}`; size={size:?}, mip_levels={mip_levels}"
        );

        assert!(size.x > 0);
        assert!(size.y > 0);
        assert!(mip_levels > 0);

        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let mip_views = (0..mip_levels)
            .map(|mip| {
                tex.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(&format!("{label}_mip{mip}")),
                    base_mip_level: mip,
                    mip_level_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        let all_mips_view = tex.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{label}_mips")),
            ..Default::default()
        });

        Self {
            tex,
            mip_views,
            all_mips_view,
            size,
        }
    }

    pub fn tex(&self) -> &wgpu::Texture {
        &self.tex
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn mip_size(&self, mip: u32) -> UVec2 {
        gpu::mip_size(self.size, mip)
    }

    pub fn mip_levels(&self) -> u32 {
        self.mip_views.len() as u32
    }

    /// Returns view of the base level.
    pub fn view(&self) -> &wgpu::TextureView {
        self.mip_view(0)
    }

    pub fn mip_view(&self, mip: u32) -> &wgpu::TextureView {
        &self.mip_views[mip as usize]
    }

    /// Binds the base level as `texture_2d<f32>`.
    pub fn bind_readable(&self) -> impl Bindable + '_ {
        self.bind_mip_readable(0)
    }

    /// Binds the base level as `texture_storage_2d<r32float, write>`.
    pub fn bind_writable(&self) -> impl Bindable + '_ {
        self.bind_mip_writable(0)
    }

    pub fn bind_mip_readable(&self, mip: u32) -> impl Bindable + '_ {
        ReadableTexture {
            view: self.mip_view(mip),
        }
    }

    pub fn bind_mip_writable(&self, mip: u32) -> impl Bindable + '_ {
        WritableTexture {
            view: self.mip_view(mip),
        }
    }

    /// Binds the entire mip chain as `texture_2d<f32>`, to be read with
    /// `textureLoad(tex, pos, lod)`.
    pub fn bind_all_readable(&self) -> impl Bindable + '_ {
        ReadableTexture {
            view: &self.all_mips_view,
        }
    }
}

pub struct ReadableTexture<'a> {
    view: &'a wgpu::TextureView,
}

impl Bindable for ReadableTexture<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        self.view.bind(binding)
    }
}

pub struct WritableTexture<'a> {
    view: &'a wgpu::TextureView,
}

impl Bindable for WritableTexture<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format: FORMAT,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            count: None,
        };

        vec![(layout, wgpu::BindingResource::TextureView(self.view))]
    }
}
