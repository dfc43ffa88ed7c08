use crate::{BlurStage, ResourceId, Subresource};

/// Image sampled by the upsample pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpsampleSource {
    /// Ray-traced image, when denoising is disabled.
    Raw,
    GaussianBlur,
    RecurrentBlur,
}

impl UpsampleSource {
    pub fn resource(self) -> ResourceId {
        match self {
            UpsampleSource::Raw => ResourceId::RayTrace,
            UpsampleSource::GaussianBlur => {
                ResourceId::GaussianBlur(BlurStage::Horizontal)
            }
            UpsampleSource::RecurrentBlur => ResourceId::RecurrentBlur,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Zeroes the history that's about to be read, so that reprojection
    /// doesn't sample undefined memory.
    ClearHistory,

    RayTrace,

    /// Builds mip `level` of `target` from mip `level - 1`.
    Downsample { target: ResourceId, level: u32 },

    TemporalReprojection { feedback: bool },

    GaussianBlur(BlurStage),

    RecurrentBlur,

    Upsample { source: UpsampleSource },
}

#[derive(Clone, Debug, PartialEq)]
pub struct PassNode {
    pub kind: PassKind,

    /// Subresources that must have been written earlier in this frame.
    pub reads: Vec<Subresource>,

    /// Subresources that must have been written by the previous frame (or
    /// cleared earlier in this one).
    pub history_reads: Vec<Subresource>,

    pub writes: Vec<Subresource>,
}

impl PassNode {
    pub fn new(kind: PassKind) -> Self {
        Self {
            kind,
            reads: Default::default(),
            history_reads: Default::default(),
            writes: Default::default(),
        }
    }

    pub fn read(mut self, subresource: Subresource) -> Self {
        self.reads.push(subresource);
        self
    }

    pub fn read_history(mut self, subresource: Subresource) -> Self {
        self.history_reads.push(subresource);
        self
    }

    pub fn write(mut self, subresource: Subresource) -> Self {
        self.writes.push(subresource);
        self
    }

    /// Returns every subresource read by this pass, history included.
    pub fn all_reads(&self) -> impl Iterator<Item = &Subresource> + '_ {
        self.reads.iter().chain(&self.history_reads)
    }

    pub fn reads_resource(&self, resource: ResourceId) -> bool {
        self.all_reads().any(|sub| sub.resource == resource)
    }

    pub fn writes_resource(&self, resource: ResourceId) -> bool {
        self.writes.iter().any(|sub| sub.resource == resource)
    }
}
