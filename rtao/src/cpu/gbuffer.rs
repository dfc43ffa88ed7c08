use glam::UVec2;

use crate::gpu;

/// Full-resolution G-buffer living in RAM.
#[derive(Clone, Debug)]
pub struct CpuGBuffer {
    size: UVec2,
    entries: Vec<gpu::GBufferEntry>,
}

impl CpuGBuffer {
    pub fn new(
        size: UVec2,
        mut f: impl FnMut(UVec2) -> gpu::GBufferEntry,
    ) -> Self {
        assert!(size.x > 0);
        assert!(size.y > 0);

        let mut entries = Vec::with_capacity((size.x * size.y) as usize);

        for y in 0..size.y {
            for x in 0..size.x {
                entries.push(f(UVec2::new(x, y)));
            }
        }

        Self { size, entries }
    }

    pub fn filled(size: UVec2, entry: gpu::GBufferEntry) -> Self {
        Self::new(size, |_| entry)
    }

    pub fn set(&mut self, pos: UVec2, entry: gpu::GBufferEntry) {
        let idx = self.index(pos);

        self.entries[idx] = entry;
    }

    fn index(&self, pos: UVec2) -> usize {
        assert!(pos.x < self.size.x && pos.y < self.size.y);

        (pos.x + pos.y * self.size.x) as usize
    }
}

impl gpu::GBufferMap for CpuGBuffer {
    fn size(&self) -> UVec2 {
        self.size
    }

    fn get(&self, pos: UVec2) -> gpu::GBufferEntry {
        self.entries[self.index(pos)]
    }
}
