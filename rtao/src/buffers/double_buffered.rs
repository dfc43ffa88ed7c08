use glam::UVec2;

use crate::{Bindable, DoubleBufferedBindable, Slot, Texture};

/// Resource existing in two versions, one per [`Slot`].
///
/// `curr()` binds slot A to the `a` bind group and slot B to the `b` one;
/// `past()` binds them crosswise. Since bind groups are picked using the
/// ping-pong flag, `curr()` always resolves to the slot written this frame
/// and `past()` to the one written by the previous frame.
#[derive(Debug)]
pub struct DoubleBuffered<T> {
    a: T,
    b: T,
}

impl DoubleBuffered<Texture> {
    /// See: [`Texture::with_mips()`].
    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: UVec2,
        mip_levels: u32,
    ) -> Self {
        let label = label.as_ref();

        Self {
            a: Texture::with_mips(
                device,
                format!("{label}_a"),
                size,
                mip_levels,
            ),
            b: Texture::with_mips(
                device,
                format!("{label}_b"),
                size,
                mip_levels,
            ),
        }
    }
}

impl DoubleBuffered<&Texture> {
    /// See: [`Texture::bind_readable()`].
    pub fn bind_readable(&self) -> impl DoubleBufferedBindable + '_ {
        DoubleBufferedBinder {
            a: self.a.bind_readable(),
            b: self.b.bind_readable(),
        }
    }

    /// See: [`Texture::bind_writable()`].
    pub fn bind_writable(&self) -> impl DoubleBufferedBindable + '_ {
        DoubleBufferedBinder {
            a: self.a.bind_writable(),
            b: self.b.bind_writable(),
        }
    }

    /// See: [`Texture::bind_mip_readable()`].
    pub fn bind_mip_readable(
        &self,
        mip: u32,
    ) -> impl DoubleBufferedBindable + '_ {
        DoubleBufferedBinder {
            a: self.a.bind_mip_readable(mip),
            b: self.b.bind_mip_readable(mip),
        }
    }

    /// See: [`Texture::bind_mip_writable()`].
    pub fn bind_mip_writable(
        &self,
        mip: u32,
    ) -> impl DoubleBufferedBindable + '_ {
        DoubleBufferedBinder {
            a: self.a.bind_mip_writable(mip),
            b: self.b.bind_mip_writable(mip),
        }
    }

    /// See: [`Texture::bind_all_readable()`].
    pub fn bind_all_readable(&self) -> impl DoubleBufferedBindable + '_ {
        DoubleBufferedBinder {
            a: self.a.bind_all_readable(),
            b: self.b.bind_all_readable(),
        }
    }
}

impl DoubleBuffered<&wgpu::TextureView> {
    pub fn bind_readable(&self) -> impl DoubleBufferedBindable + '_ {
        DoubleBufferedBinder {
            a: self.a,
            b: self.b,
        }
    }
}

impl<T> DoubleBuffered<T> {
    pub fn get(&self, alternate: bool) -> &T {
        if alternate {
            &self.b
        } else {
            &self.a
        }
    }

    pub fn slot(&self, slot: Slot) -> &T {
        match slot {
            Slot::A => &self.a,
            Slot::B => &self.b,
        }
    }

    pub fn curr(&self) -> DoubleBuffered<&T> {
        DoubleBuffered {
            a: &self.a,
            b: &self.b,
        }
    }

    pub fn past(&self) -> DoubleBuffered<&T> {
        DoubleBuffered {
            a: &self.b,
            b: &self.a,
        }
    }
}

/// Creates a resource from its slot-A and slot-B versions.
impl<T> From<[T; 2]> for DoubleBuffered<T> {
    fn from([a, b]: [T; 2]) -> Self {
        Self { a, b }
    }
}

pub struct DoubleBufferedBinder<T> {
    a: T,
    b: T,
}

impl<T> DoubleBufferedBindable for DoubleBufferedBinder<T>
where
    T: Bindable,
{
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, [wgpu::BindingResource; 2])> {
        let entries_a = self.a.bind(binding);
        let entries_b = self.b.bind(binding);

        assert_eq!(entries_a.len(), entries_b.len());

        entries_a
            .into_iter()
            .zip(entries_b)
            .map(|((layout_a, resource_a), (layout_b, resource_b))| {
                assert_eq!(layout_a, layout_b);

                (layout_a, [resource_a, resource_b])
            })
            .collect()
    }
}
