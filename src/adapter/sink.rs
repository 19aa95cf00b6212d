//! GraphSink: the single write path from adapters into an OWLNETS graph
//!
//! Adapters hand raw records to the sink; the sink canonicalizes every
//! identifier, normalizes every predicate and commits what it can. Records
//! that cannot be committed are rejected individually, never the batch:
//! - Edges: rejected when either endpoint is empty
//! - Nodes: rejected when the id is empty or already present
//! - Relations: rejected when the id is empty

use crate::canon::{normalize_relation, Canonicalizer, CodeId, Fidelity};
use crate::owlnets::{
    Edge, NodeRecord, OwlnetsError, OwlnetsGraph, RawEdge, RawNode, RawOwlnets, RawRelation, RelationRecord,
};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Why an individual record was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// Subject or object canonicalized to nothing
    EmptyEndpoint,
    /// Node or relation without an id
    EmptyId,
    /// A node with this id was already committed
    DuplicateNode(CodeId),
    /// Adapter-side problem with one record
    Other(String),
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEndpoint => write!(f, "empty endpoint"),
            Self::EmptyId => write!(f, "empty id"),
            Self::DuplicateNode(id) => write!(f, "duplicate node_id {}", id),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

/// A single rejected record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Human-readable description of what was rejected
    pub description: String,
    pub reason: RejectionReason,
}

impl Rejection {
    pub fn new(description: impl Into<String>, reason: RejectionReason) -> Self {
        Self {
            description: description.into(),
            reason,
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.description, self.reason)
    }
}

/// The result of an `emit()` call. Partial success is the normal case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitResult {
    pub nodes_committed: usize,
    pub edges_committed: usize,
    pub relations_committed: usize,
    pub rejections: Vec<Rejection>,
}

impl EmitResult {
    /// True if no records were rejected
    pub fn is_fully_committed(&self) -> bool {
        self.rejections.is_empty()
    }

    /// True if nothing was committed and nothing was rejected
    pub fn is_noop(&self) -> bool {
        self.nodes_committed == 0
            && self.edges_committed == 0
            && self.relations_committed == 0
            && self.rejections.is_empty()
    }
}

/// Errors from adapter processing (not from individual record rejection).
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Owlnets(#[from] OwlnetsError),

    #[error("no edges/nodes files found in {0}")]
    NoInputFiles(String),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a sink accumulated for one SAB.
#[derive(Debug, Clone)]
pub struct SinkOutput {
    pub graph: OwlnetsGraph,
    pub fidelity: BTreeMap<Fidelity, usize>,
    pub rejections: Vec<Rejection>,
}

/// Canonicalizing sink for one SAB.
pub struct GraphSink<'a> {
    canonicalizer: &'a Canonicalizer,
    graph: OwlnetsGraph,
    fidelity: BTreeMap<Fidelity, usize>,
    rejections: Vec<Rejection>,
}

impl<'a> GraphSink<'a> {
    pub fn new(canonicalizer: &'a Canonicalizer, sab: impl Into<String>) -> Self {
        Self {
            canonicalizer,
            graph: OwlnetsGraph::new(sab),
            fidelity: BTreeMap::new(),
            rejections: Vec::new(),
        }
    }

    pub fn sab(&self) -> &str {
        self.graph.sab()
    }

    pub fn graph(&self) -> &OwlnetsGraph {
        &self.graph
    }

    fn canonical(&mut self, raw: &str) -> Option<CodeId> {
        let canonical = self.canonicalizer.canonicalize(raw, self.graph.sab());
        *self.fidelity.entry(canonical.fidelity).or_default() += 1;
        canonical.code_id()
    }

    fn reject(&mut self, rejection: Rejection) -> Rejection {
        debug!(sab = %self.graph.sab(), rejection = %rejection, "rejected record");
        self.rejections.push(rejection.clone());
        rejection
    }

    pub fn emit_edge(&mut self, raw: &RawEdge) -> Result<(), Rejection> {
        let subject = self.canonical(&raw.subject);
        let object = self.canonical(&raw.object);
        match (subject, object) {
            (Some(subject), Some(object)) => {
                self.graph
                    .add_edge(Edge::new(subject, normalize_relation(&raw.predicate), object));
                Ok(())
            }
            _ => Err(self.reject(Rejection::new(
                format!("edge {} {} {}", raw.subject, raw.predicate, raw.object),
                RejectionReason::EmptyEndpoint,
            ))),
        }
    }

    pub fn emit_node(&mut self, raw: &RawNode) -> Result<(), Rejection> {
        let Some(node_id) = self.canonical(&raw.node_id) else {
            return Err(self.reject(Rejection::new(
                format!("node with label '{}'", raw.label),
                RejectionReason::EmptyId,
            )));
        };
        if self.graph.contains_node(&node_id) {
            return Err(self.reject(Rejection::new(
                format!("node {}", raw.node_id),
                RejectionReason::DuplicateNode(node_id),
            )));
        }

        let mut node = NodeRecord::new(node_id);
        if !raw.namespace.is_empty() {
            node.namespace = raw.namespace.clone();
        }
        node.label = raw.label.clone();
        node.definition = raw.definition.clone();
        node.synonyms = raw.synonyms.clone();
        node.dbxrefs = raw.dbxrefs.iter().filter_map(|x| self.canonical(x)).collect();
        node.quantity = raw.quantity.clone();
        node.submitter = raw.submitter.clone();

        let id = node.node_id.clone();
        self.graph
            .add_node(node)
            .map_err(|_| self.reject(Rejection::new(format!("node {}", raw.node_id), RejectionReason::DuplicateNode(id))))
    }

    pub fn emit_relation(&mut self, raw: &RawRelation) -> Result<(), Rejection> {
        if raw.relation_id.trim().is_empty() {
            return Err(self.reject(Rejection::new(
                format!("relation with label '{}'", raw.label),
                RejectionReason::EmptyId,
            )));
        }
        let relation_id = normalize_relation(&raw.relation_id);
        let mut record = RelationRecord::derived(relation_id, self.graph.sab());
        if !raw.namespace.is_empty() {
            record.namespace = raw.namespace.clone();
        }
        if !raw.label.is_empty() {
            record.label = raw.label.clone();
        }
        record.definition = raw.definition.clone();
        self.graph.add_relation(record);
        Ok(())
    }

    /// Emit a batch of raw records; each is validated independently.
    pub fn emit(&mut self, emission: &RawOwlnets) -> EmitResult {
        let mut result = EmitResult::default();
        for node in &emission.nodes {
            match self.emit_node(node) {
                Ok(()) => result.nodes_committed += 1,
                Err(r) => result.rejections.push(r),
            }
        }
        for edge in &emission.edges {
            match self.emit_edge(edge) {
                Ok(()) => result.edges_committed += 1,
                Err(r) => result.rejections.push(r),
            }
        }
        for relation in &emission.relations {
            match self.emit_relation(relation) {
                Ok(()) => result.relations_committed += 1,
                Err(r) => result.rejections.push(r),
            }
        }
        result
    }

    pub fn finish(self) -> SinkOutput {
        SinkOutput {
            graph: self.graph,
            fidelity: self.fidelity,
            rejections: self.rejections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_result_default_is_noop() {
        let result = EmitResult::default();
        assert!(result.is_noop());
        assert!(result.is_fully_committed());
    }

    #[test]
    fn records_are_canonicalized_on_the_way_in() {
        let engine = Canonicalizer::default();
        let mut sink = GraphSink::new(&engine, "MONDO");
        let emission = RawOwlnets {
            edges: vec![RawEdge::new(
                "http://purl.obolibrary.org/obo/MONDO_0019052",
                "http://www.w3.org/2000/01/rdf-schema#subClassOf",
                "http://purl.obolibrary.org/obo/MONDO_0000001",
            )],
            nodes: vec![RawNode::new("http://purl.obolibrary.org/obo/MONDO_0019052", "disease")
                .with_dbxrefs(["UMLS:C0012634", "", "http://identifiers.org/hgnc/1097"])],
            relations: vec![],
        };
        let result = sink.emit(&emission);
        assert!(result.is_fully_committed());
        assert_eq!((result.nodes_committed, result.edges_committed), (1, 1));

        let out = sink.finish();
        let edge = &out.graph.edges()[0];
        assert_eq!(edge.subject.as_str(), "MONDO:0019052");
        assert_eq!(edge.predicate.as_str(), "isa");
        let node = &out.graph.nodes()[0];
        assert_eq!(node.namespace, "MONDO");
        let xrefs: Vec<_> = node.dbxrefs.iter().map(|x| x.as_str()).collect();
        assert_eq!(xrefs, vec!["UMLS:C0012634", "HGNC:1097"]);
        assert_eq!(out.fidelity.get(&Fidelity::Empty), Some(&1));
    }

    #[test]
    fn bad_records_are_rejected_individually() {
        let engine = Canonicalizer::default();
        let mut sink = GraphSink::new(&engine, "X");
        let emission = RawOwlnets {
            edges: vec![RawEdge::new("X:1", "isa", " "), RawEdge::new("X:1", "isa", "X:2")],
            nodes: vec![RawNode::new("X:1", "a"), RawNode::new("X_1", "again"), RawNode::new("", "nothing")],
            relations: vec![RawRelation::new("", "blank")],
        };
        let result = sink.emit(&emission);
        assert_eq!(result.nodes_committed, 1);
        assert_eq!(result.edges_committed, 1);
        assert_eq!(result.rejections.len(), 4);
        assert!(result
            .rejections
            .iter()
            .any(|r| r.reason == RejectionReason::DuplicateNode(CodeId::parse("X:1").unwrap())));
        assert_eq!(sink.finish().rejections.len(), 4);
    }

    #[test]
    fn non_ascii_namespace_is_coerced_not_rejected() {
        let engine = Canonicalizer::default();
        let mut sink = GraphSink::new(&engine, "X");
        assert!(sink.emit_edge(&RawEdge::new("ªbc 12", "isa", "ª:a")).is_ok());

        let out = sink.finish();
        let edge = &out.graph.edges()[0];
        assert_eq!(edge.subject.as_str(), "X:12");
        assert_eq!(edge.object.as_str(), "X:a");
        assert_eq!(out.fidelity.get(&Fidelity::Coerced), Some(&2));
    }
}
