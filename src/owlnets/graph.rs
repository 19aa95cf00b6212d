//! In-memory OWLNETS graph for one SAB

use super::edge::Edge;
use super::node::{join_multi, split_multi, NodeRecord, Quantity, Submitter};
use super::relation::RelationRecord;
use super::tsv::{cell, TsvTable};
use super::{
    OwlnetsError, OwlnetsPaths, OwlnetsResult, EDGE_COLUMNS, NODE_COLUMNS, QUANTITY_COLUMNS, RELATION_COLUMNS,
    SUBMITTER_COLUMNS,
};
use crate::canon::{normalize_relation, CodeId, RelationLabel};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// A quality observation. Findings never reject data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Subject absent from the node file
    DanglingSubject(CodeId),
    /// Object absent from the node file; expected to resolve against an
    /// earlier SAB
    DanglingObject(CodeId),
    /// Relation metadata whose id never appears in the edges
    UnusedRelation(RelationLabel),
    DuplicateEdge { edge: Edge, occurrences: usize },
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingSubject(id) => write!(f, "subject {} is not in the node file", id),
            Self::DanglingObject(id) => write!(f, "object {} is not in the node file", id),
            Self::UnusedRelation(rel) => write!(f, "relation {} does not appear in any edge", rel),
            Self::DuplicateEdge { edge, occurrences } => {
                write!(f, "edge {} appears {} times", edge, occurrences)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OwlnetsGraph {
    sab: String,
    edges: Vec<Edge>,
    nodes: Vec<NodeRecord>,
    node_index: HashMap<CodeId, usize>,
    /// Explicit relation metadata, first record per id
    relations: Vec<RelationRecord>,
}

impl OwlnetsGraph {
    pub fn new(sab: impl Into<String>) -> Self {
        Self {
            sab: sab.into(),
            ..Default::default()
        }
    }

    pub fn sab(&self) -> &str {
        &self.sab
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Add a node; a second record for the same `node_id` is rejected.
    pub fn add_node(&mut self, node: NodeRecord) -> OwlnetsResult<()> {
        if self.node_index.contains_key(&node.node_id) {
            return Err(OwlnetsError::DuplicateNode(node.node_id.to_string()));
        }
        self.node_index.insert(node.node_id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Add explicit relation metadata. The first record for an id wins.
    pub fn add_relation(&mut self, record: RelationRecord) {
        if self.relations.iter().any(|r| r.relation_id == record.relation_id) {
            debug!(relation = %record.relation_id, "ignoring repeated relation metadata");
            return;
        }
        self.relations.push(record);
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn node(&self, id: &CodeId) -> Option<&NodeRecord> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains_node(&self, id: &CodeId) -> bool {
        self.node_index.contains_key(id)
    }

    /// Edges without exact duplicates, in first-occurrence order.
    pub fn unique_edges(&self) -> Vec<&Edge> {
        let mut seen = HashSet::new();
        self.edges.iter().filter(|e| seen.insert(*e)).collect()
    }

    /// Distinct predicates of the edges, in first-occurrence order.
    pub fn predicates(&self) -> Vec<&RelationLabel> {
        let mut seen = HashSet::new();
        self.edges
            .iter()
            .map(|e| &e.predicate)
            .filter(|p| seen.insert(*p))
            .collect()
    }

    /// One record per distinct predicate: explicit metadata when present,
    /// otherwise derived from the label. Unused explicit records are omitted.
    pub fn relations(&self) -> Vec<RelationRecord> {
        self.predicates()
            .into_iter()
            .map(|p| {
                self.relations
                    .iter()
                    .find(|r| &r.relation_id == p)
                    .cloned()
                    .unwrap_or_else(|| RelationRecord::derived(p.clone(), &self.sab))
            })
            .collect()
    }

    pub fn has_quantities(&self) -> bool {
        self.nodes.iter().any(|n| n.quantity.is_some())
    }

    pub fn has_submitters(&self) -> bool {
        self.nodes.iter().any(|n| n.submitter.is_some())
    }

    /// Quality findings, grouped by kind.
    pub fn validate(&self) -> Vec<Finding> {
        let mut findings = Vec::new();

        let mut seen = HashSet::new();
        for edge in &self.edges {
            if !self.contains_node(&edge.subject) && seen.insert(&edge.subject) {
                findings.push(Finding::DanglingSubject(edge.subject.clone()));
            }
        }
        let mut seen = HashSet::new();
        for edge in &self.edges {
            if !self.contains_node(&edge.object) && seen.insert(&edge.object) {
                findings.push(Finding::DanglingObject(edge.object.clone()));
            }
        }

        let used: HashSet<&RelationLabel> = self.edges.iter().map(|e| &e.predicate).collect();
        for record in &self.relations {
            if !used.contains(&record.relation_id) {
                findings.push(Finding::UnusedRelation(record.relation_id.clone()));
            }
        }

        let mut counts: HashMap<&Edge, usize> = HashMap::new();
        for edge in &self.edges {
            *counts.entry(edge).or_default() += 1;
        }
        for edge in self.unique_edges() {
            let occurrences = counts.get(edge).copied().unwrap_or_default();
            if occurrences > 1 {
                findings.push(Finding::DuplicateEdge {
                    edge: edge.clone(),
                    occurrences,
                });
            }
        }

        findings
    }

    /// Write the three OWLNETS files, creating the directory.
    pub fn write(&self, paths: &OwlnetsPaths) -> OwlnetsResult<()> {
        std::fs::create_dir_all(&paths.dir).map_err(|e| OwlnetsError::io(&paths.dir, e))?;

        let mut edges = TsvTable::new(&EDGE_COLUMNS);
        let unique = self.unique_edges();
        let dropped = self.edges.len() - unique.len();
        for edge in unique {
            edges.push_row(edge.to_row());
        }
        edges.write(&paths.edgelist)?;

        self.node_table().write(&paths.node_metadata)?;

        let mut relations = TsvTable::new(&RELATION_COLUMNS);
        for record in self.relations() {
            relations.push_row(record.to_row());
        }
        relations.write(&paths.relations)?;

        info!(
            sab = %self.sab,
            edges = edges.len(),
            duplicates_dropped = dropped,
            nodes = self.nodes.len(),
            relations = relations.len(),
            dir = %paths.dir.display(),
            "wrote OWLNETS files"
        );
        Ok(())
    }

    fn node_table(&self) -> TsvTable {
        let quantities = self.has_quantities();
        let submitters = self.has_submitters();

        let mut header: Vec<&str> = NODE_COLUMNS.to_vec();
        if quantities {
            header.extend(QUANTITY_COLUMNS);
        }
        if submitters {
            header.extend(SUBMITTER_COLUMNS);
        }

        let mut table = TsvTable::new(&header);
        for node in &self.nodes {
            let mut row = vec![
                node.node_id.to_string(),
                node.namespace.clone(),
                node.label.clone(),
                node.definition.clone(),
                join_multi(&node.synonyms),
                join_multi(&node.dbxrefs),
            ];
            if quantities {
                let q = node.quantity.clone().unwrap_or_default();
                row.extend([q.value, q.lowerbound, q.upperbound, q.unit]);
            }
            if submitters {
                let s = node.submitter.clone().unwrap_or_default();
                row.extend([s.firstname, s.lastname, s.email]);
            }
            table.push_row(row);
        }
        table
    }

    /// Load canonical OWLNETS files. Identifiers must already be canonical;
    /// repeated node ids keep their first record.
    pub fn read(paths: &OwlnetsPaths, sab: &str) -> OwlnetsResult<Self> {
        let mut graph = Self::new(sab);

        let edges = TsvTable::read(&paths.edgelist)?;
        let file = paths.edgelist.display().to_string();
        let (s, p, o) = (edges.require("subject")?, edges.require("predicate")?, edges.require("object")?);
        for (i, row) in edges.rows().iter().enumerate() {
            graph.add_edge(Edge::new(
                parse_id(&row[s], &file, i)?,
                normalize_relation(&row[p]),
                parse_id(&row[o], &file, i)?,
            ));
        }

        if paths.node_metadata.is_file() {
            let nodes = TsvTable::read(&paths.node_metadata)?;
            let file = paths.node_metadata.display().to_string();
            let id = nodes.require("node_id")?;
            let col = |name: &str| nodes.column(name);
            for (i, row) in nodes.rows().iter().enumerate() {
                let mut node = NodeRecord::new(parse_id(&row[id], &file, i)?);
                let namespace = cell(row, col("node_namespace"));
                if !namespace.is_empty() {
                    node.namespace = namespace.to_string();
                }
                node.label = cell(row, col("node_label")).to_string();
                node.definition = cell(row, col("node_definition")).to_string();
                node.synonyms = split_multi(cell(row, col("node_synonyms")));
                node.dbxrefs = split_multi(cell(row, col("node_dbxrefs")))
                    .iter()
                    .map(|x| parse_id(x, &file, i))
                    .collect::<OwlnetsResult<_>>()?;
                let quantity = Quantity {
                    value: cell(row, col("value")).to_string(),
                    lowerbound: cell(row, col("lowerbound")).to_string(),
                    upperbound: cell(row, col("upperbound")).to_string(),
                    unit: cell(row, col("unit")).to_string(),
                };
                node.quantity = (!quantity.is_empty()).then_some(quantity);
                let submitter = Submitter {
                    firstname: cell(row, col("firstname")).to_string(),
                    lastname: cell(row, col("lastname")).to_string(),
                    email: cell(row, col("email")).to_string(),
                };
                node.submitter = (!submitter.is_empty()).then_some(submitter);

                if let Err(e) = graph.add_node(node) {
                    warn!(file = %file, row = i + 2, error = %e, "skipping node");
                }
            }
        }

        if paths.relations.is_file() {
            let relations = TsvTable::read(&paths.relations)?;
            let id = relations.require("relation_id")?;
            let col = |name: &str| relations.column(name);
            for row in relations.rows() {
                graph.add_relation(RelationRecord {
                    relation_id: normalize_relation(&row[id]),
                    namespace: cell(row, col("relation_namespace")).to_string(),
                    label: cell(row, col("relation_label")).to_string(),
                    definition: cell(row, col("relation_definition")).to_string(),
                });
            }
        }

        Ok(graph)
    }
}

/// Data row `i` is line `i + 2` of its file.
fn parse_id(value: &str, file: &str, i: usize) -> OwlnetsResult<CodeId> {
    CodeId::parse(value).map_err(|source| OwlnetsError::InvalidCodeId {
        file: file.to_string(),
        row: i + 2,
        source,
    })
}
