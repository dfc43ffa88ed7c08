use std::fmt;

use crate::gpu;

/// One of the two instances of a double-buffered resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn from_ping_pong(ping_pong: bool) -> Self {
        if ping_pong {
            Slot::B
        } else {
            Slot::A
        }
    }

    pub fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlurStage {
    Vertical,
    Horizontal,
}

impl BlurStage {
    pub fn index(self) -> usize {
        match self {
            BlurStage::Vertical => 0,
            BlurStage::Horizontal => 1,
        }
    }
}

/// Image owned by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceId {
    /// Raw ray-traced occlusion (with mips).
    RayTrace,

    /// Temporally accumulated occlusion (with mips).
    Reprojection(Slot),

    HistoryLength(Slot),

    /// Output of given Gaussian blur half-pass.
    GaussianBlur(BlurStage),

    RecurrentBlur,

    /// Full-resolution output.
    Upsample,
}

impl ResourceId {
    pub fn mip_levels(&self) -> u32 {
        match self {
            ResourceId::RayTrace | ResourceId::Reprojection(_) => {
                gpu::MIP_LEVELS
            }
            _ => 1,
        }
    }

    pub fn all(self) -> Subresource {
        Subresource::mips(self, 0, self.mip_levels())
    }

    pub fn mip(self, level: u32) -> Subresource {
        Subresource::mips(self, level, 1)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::RayTrace => write!(f, "ray_trace"),
            ResourceId::Reprojection(slot) => {
                write!(f, "reprojection_{slot:?}")
            }
            ResourceId::HistoryLength(slot) => {
                write!(f, "history_length_{slot:?}")
            }
            ResourceId::GaussianBlur(stage) => {
                write!(f, "gaussian_blur_{stage:?}")
            }
            ResourceId::RecurrentBlur => write!(f, "recurrent_blur"),
            ResourceId::Upsample => write!(f, "upsample"),
        }
    }
}

/// Range of mip levels of a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subresource {
    pub resource: ResourceId,
    pub base_mip: u32,
    pub mip_count: u32,
}

impl Subresource {
    pub fn mips(resource: ResourceId, base_mip: u32, mip_count: u32) -> Self {
        assert!(mip_count > 0);
        assert!(base_mip + mip_count <= resource.mip_levels());

        Self {
            resource,
            base_mip,
            mip_count,
        }
    }

    pub fn levels(&self) -> impl Iterator<Item = u32> {
        self.base_mip..(self.base_mip + self.mip_count)
    }

    pub fn contains(&self, resource: ResourceId, mip: u32) -> bool {
        self.resource == resource && self.levels().any(|level| level == mip)
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.resource == other.resource
            && self.base_mip < other.base_mip + other.mip_count
            && other.base_mip < self.base_mip + self.mip_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlaps() {
        let a = ResourceId::RayTrace.mip(1);
        let b = ResourceId::RayTrace.all();
        let c = ResourceId::RayTrace.mip(2);
        let d = ResourceId::Reprojection(Slot::A).mip(1);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&c));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
    }

    #[test]
    #[should_panic]
    fn rejects_missing_mips() {
        ResourceId::Upsample.mip(1);
    }
}
