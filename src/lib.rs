//! owlnets: biomedical ontology ingestion into a canonical intermediate graph
//!
//! Every source (an OWL ontology, a custom converter, a directory of
//! pre-built edges/nodes files) is reduced to the same three per-source TSV
//! files, with every concept identifier rewritten to `NAMESPACE:CODE` and
//! every relation label normalized.
//!
//! # Core Concepts
//!
//! - **Canonicalization**: an ordered rule overlay plus a default pass,
//!   turning IRIs, CURIEs and legacy forms into [`CodeId`]s
//! - **Relations**: RO IRIs, `isa`, or sanitized custom labels
//! - **OWLNETS files**: the edge list, node metadata and relations contract
//! - **Ordering**: contexts, a source registry and dependency-aware resolution
//!
//! # Example
//!
//! ```
//! use owlnets::Canonicalizer;
//!
//! let engine = Canonicalizer::default();
//! let id = engine.canonicalize("http://purl.obolibrary.org/obo/MONDO_0019052", "MONDO");
//! assert_eq!(id.value, "MONDO:0019052");
//! ```

pub mod adapter;
pub mod batch;
pub mod canon;
pub mod config;
pub mod ordering;
pub mod owlnets;

pub use adapter::{AdapterError, EdgesNodesAdapter, EmitResult, GraphSink, SourceAdapter};
pub use batch::{BatchError, BatchOptions, BatchResult, BatchRunner, SourceOutcome};
pub use canon::{normalize_relation, Canonical, Canonicalizer, CodeId, Fidelity, RelationLabel};
pub use config::{CommandSpec, ConfigError, PipelineConfig};
pub use ordering::{resolve_order, ContextConfig, DependencyPolicy, OrderError, SourceRegistry};
pub use owlnets::{IngestReport, OwlnetsError, OwlnetsGraph, OwlnetsPaths};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
