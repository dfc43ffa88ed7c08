use fxhash::FxHashMap;
use log::trace;
use thiserror::Error;

use crate::{
    FrameContext, FrameGraph, PassKind, PassNode, ResourceId, Subresource,
};

/// Layout (in the Vulkan sense) of a single mip level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Contents are undefined; the initial state of every image.
    #[default]
    Undefined,

    /// Writable by compute shaders.
    General,

    /// Readable by compute shaders.
    ShaderReadOnly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    Read,
    Write,
}

/// Memory + layout barrier over a range of mip levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Barrier {
    pub subresource: Subresource,
    pub src_layout: Layout,
    pub dst_layout: Layout,

    /// Access that has to complete before the barrier; `None` if the image
    /// hasn't been accessed yet.
    pub src_access: Option<Access>,
    pub dst_access: Access,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledPass {
    pub node: PassNode,

    /// Barriers to execute right before the pass.
    pub barriers: Vec<Barrier>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schedule {
    pub passes: Vec<ScheduledPass>,

    /// Barriers making the output readable by whoever consumes it.
    pub export: Vec<Barrier>,
}

impl Schedule {
    pub fn kinds(&self) -> impl Iterator<Item = PassKind> + '_ {
        self.passes.iter().map(|pass| pass.node.kind)
    }

    pub fn pass(&self, kind: PassKind) -> Option<&ScheduledPass> {
        self.passes.iter().find(|pass| pass.node.kind == kind)
    }

    pub fn barriers(&self) -> impl Iterator<Item = &Barrier> + '_ {
        self.passes
            .iter()
            .flat_map(|pass| &pass.barriers)
            .chain(&self.export)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("pass {pass:?} reads `{resource}` (mip {mip}), which has never been written")]
    UninitializedRead {
        pass: PassKind,
        resource: ResourceId,
        mip: u32,
    },

    #[error("pass {pass:?} reads `{resource}` (mip {mip}), which was last written in frame {written_at}")]
    StaleRead {
        pass: PassKind,
        resource: ResourceId,
        mip: u32,
        written_at: u64,
    },

    #[error("pass {pass:?} both reads and writes `{resource}` (mip {mip})")]
    ReadWriteAlias {
        pass: PassKind,
        resource: ResourceId,
        mip: u32,
    },

    #[error("pass {pass:?} accesses `{resource}` (mip {mip}) in layout {actual:?}, but it requires {expected:?}")]
    MissingBarrier {
        pass: PassKind,
        resource: ResourceId,
        mip: u32,
        expected: Layout,
        actual: Layout,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct MipState {
    layout: Layout,
    last_access: Option<Access>,
    written_at: Option<u64>,
}

/// Tracks layouts and write history of every mip level across frames and
/// turns frame graphs into schedules with the barriers they need.
#[derive(Clone, Debug, Default)]
pub struct ResourceTracker {
    states: FxHashMap<(ResourceId, u32), MipState>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Default::default()
    }

    /// Forgets everything, e.g. after resources have been recreated.
    pub fn reset(&mut self) {
        self.states.clear();
    }

    pub fn layout(&self, resource: ResourceId, mip: u32) -> Layout {
        self.state(resource, mip).layout
    }

    /// Returns the frame in which given mip was last written.
    pub fn last_written(&self, resource: ResourceId, mip: u32) -> Option<u64> {
        self.state(resource, mip).written_at
    }

    /// Returns whether given mip was written by the frame right before
    /// `ctx`.
    pub fn written_by_prev_frame(
        &self,
        resource: ResourceId,
        mip: u32,
        ctx: &FrameContext,
    ) -> bool {
        match (self.last_written(resource, mip), ctx.frame().checked_sub(1)) {
            (Some(written_at), Some(prev_frame)) => written_at == prev_frame,
            _ => false,
        }
    }

    fn state(&self, resource: ResourceId, mip: u32) -> MipState {
        self.states
            .get(&(resource, mip))
            .copied()
            .unwrap_or_default()
    }

    /// Validates given graph and computes the barriers it requires.
    ///
    /// On success the tracker assumes the schedule has been executed; on
    /// failure it's left untouched.
    pub fn schedule(
        &mut self,
        graph: &FrameGraph,
        ctx: &FrameContext,
    ) -> Result<Schedule, GraphError> {
        let mut states = self.states.clone();
        let frame = ctx.frame();
        let mut passes = Vec::with_capacity(graph.nodes().len());

        for node in graph.nodes() {
            Self::check_aliasing(node)?;

            for sub in &node.reads {
                for mip in sub.levels() {
                    let state = Self::state_of(&states, sub.resource, mip);

                    match state.written_at {
                        None => {
                            return Err(GraphError::UninitializedRead {
                                pass: node.kind,
                                resource: sub.resource,
                                mip,
                            });
                        }
                        Some(written_at) if written_at != frame => {
                            return Err(GraphError::StaleRead {
                                pass: node.kind,
                                resource: sub.resource,
                                mip,
                                written_at,
                            });
                        }
                        _ => (),
                    }
                }
            }

            for sub in &node.history_reads {
                for mip in sub.levels() {
                    let state = Self::state_of(&states, sub.resource, mip);

                    match state.written_at {
                        None => {
                            return Err(GraphError::UninitializedRead {
                                pass: node.kind,
                                resource: sub.resource,
                                mip,
                            });
                        }
                        Some(written_at)
                            if written_at != frame
                                && written_at + 1 != frame =>
                        {
                            return Err(GraphError::StaleRead {
                                pass: node.kind,
                                resource: sub.resource,
                                mip,
                                written_at,
                            });
                        }
                        _ => (),
                    }
                }
            }

            let mut barriers = Vec::new();

            for sub in node.all_reads() {
                for mip in sub.levels() {
                    let state = states.entry((sub.resource, mip)).or_default();

                    if let Some(barrier) = Self::transition(
                        state,
                        sub.resource,
                        mip,
                        Access::Read,
                        frame,
                    ) {
                        barriers.push(barrier);
                    }
                }
            }

            for sub in &node.writes {
                for mip in sub.levels() {
                    let state = states.entry((sub.resource, mip)).or_default();

                    if let Some(barrier) = Self::transition(
                        state,
                        sub.resource,
                        mip,
                        Access::Write,
                        frame,
                    ) {
                        barriers.push(barrier);
                    }
                }
            }

            let barriers = coalesce(barriers);

            for barrier in &barriers {
                trace!("{:?}: {}", node.kind, DisplayBarrier(barrier));
            }

            passes.push(ScheduledPass {
                node: node.clone(),
                barriers,
            });
        }

        let mut export = Vec::new();

        if let Some(output) = graph.output() {
            for mip in output.levels() {
                let state = states.entry((output.resource, mip)).or_default();

                if state.layout != Layout::ShaderReadOnly {
                    export.push(Barrier {
                        subresource: output.resource.mip(mip),
                        src_layout: state.layout,
                        dst_layout: Layout::ShaderReadOnly,
                        src_access: state.last_access,
                        dst_access: Access::Read,
                    });

                    state.layout = Layout::ShaderReadOnly;
                }
            }
        }

        let export = coalesce(export);

        for barrier in &export {
            trace!("export: {}", DisplayBarrier(barrier));
        }

        self.states = states;

        Ok(Schedule { passes, export })
    }

    fn state_of(
        states: &FxHashMap<(ResourceId, u32), MipState>,
        resource: ResourceId,
        mip: u32,
    ) -> MipState {
        states.get(&(resource, mip)).copied().unwrap_or_default()
    }

    fn check_aliasing(node: &PassNode) -> Result<(), GraphError> {
        for write in &node.writes {
            for read in node.all_reads() {
                if write.overlaps(read) {
                    let mip = write.base_mip.max(read.base_mip);

                    return Err(GraphError::ReadWriteAlias {
                        pass: node.kind,
                        resource: write.resource,
                        mip,
                    });
                }
            }
        }

        Ok(())
    }

    /// Updates state of a mip that's about to be accessed, returning the
    /// barrier that's needed beforehand (if any).
    fn transition(
        state: &mut MipState,
        resource: ResourceId,
        mip: u32,
        access: Access,
        frame: u64,
    ) -> Option<Barrier> {
        let subresource = resource.mip(mip);

        let barrier = match access {
            Access::Read => {
                (state.layout != Layout::ShaderReadOnly).then_some(Barrier {
                    subresource,
                    src_layout: state.layout,
                    dst_layout: Layout::ShaderReadOnly,
                    src_access: state.last_access,
                    dst_access: Access::Read,
                })
            }

            Access::Write => {
                if state.layout != Layout::General {
                    // Previous contents get overwritten anyway, so there's no
                    // need to preserve them
                    Some(Barrier {
                        subresource,
                        src_layout: Layout::Undefined,
                        dst_layout: Layout::General,
                        src_access: state.last_access,
                        dst_access: Access::Write,
                    })
                } else if state.last_access == Some(Access::Write) {
                    Some(Barrier {
                        subresource,
                        src_layout: Layout::General,
                        dst_layout: Layout::General,
                        src_access: Some(Access::Write),
                        dst_access: Access::Write,
                    })
                } else {
                    None
                }
            }
        };

        match access {
            Access::Read => {
                state.layout = Layout::ShaderReadOnly;
            }
            Access::Write => {
                state.layout = Layout::General;
                state.written_at = Some(frame);
            }
        }

        state.last_access = Some(access);

        barrier
    }
}

/// Merges barriers over consecutive mips of the same resource.
fn coalesce(barriers: Vec<Barrier>) -> Vec<Barrier> {
    let mut out: Vec<Barrier> = Vec::with_capacity(barriers.len());

    for barrier in barriers {
        if let Some(last) = out.last_mut() {
            let last_sub = last.subresource;
            let sub = barrier.subresource;

            if last_sub.resource == sub.resource
                && last_sub.base_mip + last_sub.mip_count == sub.base_mip
                && last.src_layout == barrier.src_layout
                && last.dst_layout == barrier.dst_layout
                && last.src_access == barrier.src_access
                && last.dst_access == barrier.dst_access
            {
                last.subresource.mip_count += sub.mip_count;
                continue;
            }
        }

        out.push(barrier);
    }

    out
}

struct DisplayBarrier<'a>(&'a Barrier);

impl std::fmt::Display for DisplayBarrier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let b = self.0;

        write!(
            f,
            "`{}` mips {}..{}: {:?} -> {:?} ({:?} -> {:?})",
            b.subresource.resource,
            b.subresource.base_mip,
            b.subresource.base_mip + b.subresource.mip_count,
            b.src_layout,
            b.dst_layout,
            b.src_access,
            b.dst_access,
        )
    }
}
