use log::debug;

use crate::{
    gpu, AoConfig, BlurStage, Denoiser, FrameContext, PassKind, PassNode,
    ResourceId, ResourceTracker, Subresource, UpsampleSource,
};

/// Passes of a single frame, in submission order, together with the
/// subresources each of them reads and writes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameGraph {
    nodes: Vec<PassNode>,
    output: Option<Subresource>,
    history_reset: bool,
    feedback: bool,
}

impl FrameGraph {
    /// Builds the ambient-occlusion graph for given frame.
    ///
    /// `tracker` is consulted to find out whether history is still valid:
    /// besides the first frame, history is cleared whenever the slot about to
    /// be read wasn't written by the previous frame (e.g. after denoising was
    /// turned back on).
    pub fn ambient_occlusion(
        config: &AoConfig,
        ctx: &FrameContext,
        tracker: &ResourceTracker,
    ) -> Self {
        let mut this = Self::default();

        if !config.enabled {
            return this;
        }

        let curr = ctx.curr_slot();
        let prev = ctx.prev_slot();

        let source = if config.denoise {
            this.history_reset = ctx.is_first_frame()
                || !tracker.written_by_prev_frame(
                    ResourceId::HistoryLength(prev),
                    0,
                    ctx,
                )
                || !tracker.written_by_prev_frame(
                    ResourceId::Reprojection(prev),
                    0,
                    ctx,
                );

            this.feedback = config.wants_feedback()
                && !this.history_reset
                && tracker.written_by_prev_frame(
                    ResourceId::RecurrentBlur,
                    0,
                    ctx,
                );

            if this.history_reset {
                debug!(
                    "Clearing history (frame={}, slot={:?}, first_frame={})",
                    ctx.frame(),
                    prev,
                    ctx.is_first_frame()
                );

                this.nodes.push(
                    PassNode::new(PassKind::ClearHistory)
                        .write(ResourceId::Reprojection(prev).mip(0))
                        .write(ResourceId::HistoryLength(prev).all()),
                );
            }

            this.add_ray_trace();

            let history = if this.feedback {
                ResourceId::RecurrentBlur
            } else {
                ResourceId::Reprojection(prev)
            };

            this.nodes.push(
                PassNode::new(PassKind::TemporalReprojection {
                    feedback: this.feedback,
                })
                .read(ResourceId::RayTrace.mip(0))
                .read_history(history.mip(0))
                .read_history(ResourceId::HistoryLength(prev).all())
                .write(ResourceId::Reprojection(curr).mip(0))
                .write(ResourceId::HistoryLength(curr).all()),
            );

            this.add_downsample(ResourceId::Reprojection(curr));

            match config.denoiser {
                Denoiser::Gaussian => {
                    let vertical = ResourceId::GaussianBlur(BlurStage::Vertical);

                    let horizontal =
                        ResourceId::GaussianBlur(BlurStage::Horizontal);

                    this.nodes.push(
                        PassNode::new(PassKind::GaussianBlur(
                            BlurStage::Vertical,
                        ))
                        .read(ResourceId::Reprojection(curr).mip(0))
                        .read(ResourceId::HistoryLength(curr).all())
                        .write(vertical.all()),
                    );

                    this.nodes.push(
                        PassNode::new(PassKind::GaussianBlur(
                            BlurStage::Horizontal,
                        ))
                        .read(vertical.all())
                        .read(ResourceId::HistoryLength(curr).all())
                        .write(horizontal.all()),
                    );

                    UpsampleSource::GaussianBlur
                }

                Denoiser::Recurrent => {
                    this.nodes.push(
                        PassNode::new(PassKind::RecurrentBlur)
                            .read(ResourceId::Reprojection(curr).all())
                            .read(ResourceId::HistoryLength(curr).all())
                            .write(ResourceId::RecurrentBlur.all()),
                    );

                    UpsampleSource::RecurrentBlur
                }
            }
        } else {
            this.add_ray_trace();

            UpsampleSource::Raw
        };

        this.nodes.push(
            PassNode::new(PassKind::Upsample { source })
                .read(source.resource().mip(0))
                .write(ResourceId::Upsample.all()),
        );

        this.output = Some(ResourceId::Upsample.all());
        this
    }

    fn add_ray_trace(&mut self) {
        self.nodes.push(
            PassNode::new(PassKind::RayTrace)
                .write(ResourceId::RayTrace.mip(0)),
        );

        self.add_downsample(ResourceId::RayTrace);
    }

    fn add_downsample(&mut self, target: ResourceId) {
        for level in 1..gpu::MIP_LEVELS {
            self.nodes.push(
                PassNode::new(PassKind::Downsample { target, level })
                    .read(target.mip(level - 1))
                    .write(target.mip(level)),
            );
        }
    }

    pub fn nodes(&self) -> &[PassNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Subresource consumed outside of the pipeline; `None` if the graph
    /// records no work.
    pub fn output(&self) -> Option<Subresource> {
        self.output
    }

    /// Returns whether this frame starts from cleared history.
    pub fn history_reset(&self) -> bool {
        self.history_reset
    }

    /// Returns whether temporal reprojection reads the recurrent blur's
    /// output instead of its own.
    pub fn feedback(&self) -> bool {
        self.feedback
    }

    pub fn node(&self, kind: PassKind) -> Option<&PassNode> {
        self.nodes.iter().find(|node| node.kind == kind)
    }

    /// Returns `(producer, consumer)` pairs of node indices; for each read,
    /// the producer is the last earlier node writing an overlapping
    /// subresource.
    pub fn dependencies(&self) -> Vec<(usize, usize)> {
        let mut edges = Vec::new();

        for (consumer_idx, consumer) in self.nodes.iter().enumerate() {
            for read in consumer.all_reads() {
                let producer_idx = self.nodes[..consumer_idx]
                    .iter()
                    .rposition(|producer| {
                        producer.writes.iter().any(|write| write.overlaps(read))
                    });

                if let Some(producer_idx) = producer_idx {
                    let edge = (producer_idx, consumer_idx);

                    if !edges.contains(&edge) {
                        edges.push(edge);
                    }
                }
            }
        }

        edges
    }
}
