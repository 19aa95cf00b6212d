//! Ingestion order resolution
//!
//! Turns a user request (a context name or a list of sources) into the
//! validated, dependency-respecting sequence the batch runner executes.

mod context;
mod registry;
mod resolver;

pub use context::{ContextConfig, BASE_CONTEXT};
pub use registry::{RegistryEntry, SourceKind, SourceRegistry};
pub use resolver::{expand_context, resolve_order, DependencyPolicy};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("no sources requested")]
    NoSources,

    #[error("sources not found in the registry: {}", .0.join(", "))]
    UnknownSources(Vec<String>),

    #[error("dependency cycle among: {}", .0.join(", "))]
    DependencyCycle(Vec<String>),

    #[error("{sab} depends on {dependency}, which is not in this batch")]
    MissingDependency { sab: String, dependency: String },
}

pub type OrderResult<T> = Result<T, OrderError>;
