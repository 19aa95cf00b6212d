//! The OWLNETS intermediate graph contract
//!
//! Every source adapter's output reduces to three tab-delimited files per
//! SAB, under `<owlnets_dir>/<SAB>/`:
//!
//! - `OWLNETS_edgelist.txt`: `subject predicate object`
//! - `OWLNETS_node_metadata.txt`: `node_id node_namespace node_label
//!   node_definition node_synonyms node_dbxrefs`, plus the quantity and
//!   submitter column groups when any node carries them
//! - `OWLNETS_relations.txt`: `relation_id relation_namespace relation_label
//!   relation_definition`
//!
//! [`OwlnetsGraph`] is the in-memory form of one SAB's files. Raw (not yet
//! canonical) files are read through [`RawOwlnets`].

mod edge;
mod graph;
mod node;
pub(crate) mod raw;
mod relation;
mod report;
pub mod tsv;

pub use edge::{Edge, RawEdge};
pub use graph::{Finding, OwlnetsGraph};
pub use node::{join_multi, split_multi, NodeRecord, Quantity, RawNode, Submitter, MULTI_VALUE_SEPARATOR};
pub use raw::RawOwlnets;
pub use relation::{RawRelation, RelationRecord};
pub use report::{IngestReport, NamespaceCount, PredicateCount};

use crate::canon::CodeIdError;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const EDGELIST_FILE: &str = "OWLNETS_edgelist.txt";
pub const NODE_METADATA_FILE: &str = "OWLNETS_node_metadata.txt";
pub const RELATIONS_FILE: &str = "OWLNETS_relations.txt";
pub const REPORT_FILE: &str = "ingest_report.txt";

pub const EDGE_COLUMNS: [&str; 3] = ["subject", "predicate", "object"];
pub const NODE_COLUMNS: [&str; 6] = [
    "node_id",
    "node_namespace",
    "node_label",
    "node_definition",
    "node_synonyms",
    "node_dbxrefs",
];
pub const QUANTITY_COLUMNS: [&str; 4] = ["value", "lowerbound", "upperbound", "unit"];
pub const SUBMITTER_COLUMNS: [&str; 3] = ["firstname", "lastname", "email"];
pub const RELATION_COLUMNS: [&str; 4] = [
    "relation_id",
    "relation_namespace",
    "relation_label",
    "relation_definition",
];

#[derive(Debug, Error)]
pub enum OwlnetsError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: missing required column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("duplicate node_id: {0}")]
    DuplicateNode(String),

    #[error("{file} row {row}: {source}")]
    InvalidCodeId {
        file: String,
        row: usize,
        #[source]
        source: CodeIdError,
    },
}

impl OwlnetsError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

pub type OwlnetsResult<T> = Result<T, OwlnetsError>;

/// Locations of one SAB's OWLNETS files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwlnetsPaths {
    pub dir: PathBuf,
    pub edgelist: PathBuf,
    pub node_metadata: PathBuf,
    pub relations: PathBuf,
    pub report: PathBuf,
}

impl OwlnetsPaths {
    /// `<owlnets_dir>/<sab>/...`
    pub fn new(owlnets_dir: impl AsRef<Path>, sab: &str) -> Self {
        Self::in_dir(owlnets_dir.as_ref().join(sab))
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            edgelist: dir.join(EDGELIST_FILE),
            node_metadata: dir.join(NODE_METADATA_FILE),
            relations: dir.join(RELATIONS_FILE),
            report: dir.join(REPORT_FILE),
            dir,
        }
    }
}
