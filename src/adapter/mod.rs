//! Source adapter layer
//!
//! Adapters read a source's native files and push raw records through a
//! [`GraphSink`], which canonicalizes them into an
//! [`OwlnetsGraph`](crate::owlnets::OwlnetsGraph).

mod edges_nodes;
mod sink;
mod traits;

pub use edges_nodes::{EdgesNodesAdapter, OwlnetsFilesAdapter};
pub use sink::{AdapterError, EmitResult, GraphSink, Rejection, RejectionReason, SinkOutput};
pub use traits::SourceAdapter;
