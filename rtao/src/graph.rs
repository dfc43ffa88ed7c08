//! Explicit per-frame pass graph.
//!
//! Every pass declares the subresources (image + mip range) it reads and
//! writes; [`ResourceTracker`] walks the graph in submission order, checks
//! that reads observe fully-written data and derives the barriers each pass
//! needs. The Gaussian / recurrent denoisers are just two different subgraphs
//! feeding the upsample pass.

mod frame_graph;
mod node;
mod resource;
mod scheduler;

pub use self::frame_graph::*;
pub use self::node::*;
pub use self::resource::*;
pub use self::scheduler::*;
