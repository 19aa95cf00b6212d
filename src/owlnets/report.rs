//! Per-SAB quality-control report

use super::graph::{Finding, OwlnetsGraph};
use super::{OwlnetsError, OwlnetsResult};
use crate::canon::Fidelity;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write as _;
use std::path::Path;

const BAR: &str = "--------------------";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceCount {
    pub namespace: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredicateCount {
    pub predicate: String,
    pub label: String,
    pub inverse: String,
    pub count: usize,
}

/// Statistics over one SAB's canonical files plus ingest diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub run_date: DateTime<Local>,
    pub sab: String,
    pub edge_rows: usize,
    pub node_rows: usize,
    pub relation_rows: usize,
    pub duplicate_edges: usize,
    pub subjects_by_namespace: Vec<NamespaceCount>,
    pub objects_by_namespace: Vec<NamespaceCount>,
    pub subjects_in_nodes: usize,
    pub missing_subjects: Vec<String>,
    pub objects_in_nodes: usize,
    pub missing_objects: Vec<String>,
    pub predicates: Vec<PredicateCount>,
    pub dbxrefs_by_namespace: Vec<NamespaceCount>,
    pub fidelity: BTreeMap<String, usize>,
    pub rejections: Vec<String>,
}

fn by_namespace<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<NamespaceCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for id in ids {
        let namespace = id.split(':').next().unwrap_or_default();
        *counts.entry(namespace).or_default() += 1;
    }
    let mut out: Vec<NamespaceCount> = counts
        .into_iter()
        .map(|(namespace, count)| NamespaceCount {
            namespace: namespace.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.namespace.cmp(&b.namespace)));
    out
}

impl IngestReport {
    pub fn from_graph(graph: &OwlnetsGraph) -> Self {
        let edges = graph.unique_edges();

        let mut seen = HashSet::new();
        let subjects: Vec<&str> = edges
            .iter()
            .map(|e| e.subject.as_str())
            .filter(|s| seen.insert(*s))
            .collect();
        let mut seen = HashSet::new();
        let objects: Vec<&str> = edges
            .iter()
            .map(|e| e.object.as_str())
            .filter(|o| seen.insert(*o))
            .collect();

        let findings = graph.validate();
        let missing_subjects: Vec<String> = findings
            .iter()
            .filter_map(|f| match f {
                Finding::DanglingSubject(id) => Some(id.to_string()),
                _ => None,
            })
            .collect();
        let missing_objects: Vec<String> = findings
            .iter()
            .filter_map(|f| match f {
                Finding::DanglingObject(id) => Some(id.to_string()),
                _ => None,
            })
            .collect();

        let relations = graph.relations();
        let mut predicate_counts: HashMap<&str, usize> = HashMap::new();
        for edge in &edges {
            *predicate_counts.entry(edge.predicate.as_str()).or_default() += 1;
        }
        let mut predicates: Vec<PredicateCount> = relations
            .iter()
            .map(|r| PredicateCount {
                predicate: r.relation_id.to_string(),
                label: r.label.clone(),
                inverse: r.relation_id.inverse(),
                count: predicate_counts.get(r.relation_id.as_str()).copied().unwrap_or_default(),
            })
            .collect();
        predicates.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.predicate.cmp(&b.predicate)));

        Self {
            run_date: Local::now(),
            sab: graph.sab().to_string(),
            edge_rows: edges.len(),
            node_rows: graph.nodes().len(),
            relation_rows: relations.len(),
            duplicate_edges: graph.edges().len() - edges.len(),
            subjects_by_namespace: by_namespace(subjects.iter().copied()),
            objects_by_namespace: by_namespace(objects.iter().copied()),
            subjects_in_nodes: subjects.len() - missing_subjects.len(),
            missing_subjects,
            objects_in_nodes: objects.len() - missing_objects.len(),
            missing_objects,
            predicates,
            dbxrefs_by_namespace: by_namespace(
                graph
                    .nodes()
                    .iter()
                    .flat_map(|n| n.dbxrefs.iter().map(|x| x.as_str())),
            ),
            fidelity: BTreeMap::new(),
            rejections: Vec::new(),
        }
    }

    /// Record canonicalization fidelity counts.
    pub fn with_fidelity<I>(mut self, counts: I) -> Self
    where
        I: IntoIterator<Item = (Fidelity, usize)>,
    {
        for (fidelity, count) in counts {
            *self.fidelity.entry(fidelity.to_string()).or_default() += count;
        }
        self
    }

    pub fn with_rejections(mut self, rejections: Vec<String>) -> Self {
        self.rejections = rejections;
        self
    }

    fn write_counts(out: &mut String, title: &str, counts: &[NamespaceCount]) {
        let _ = writeln!(out, "\n{}\n", title);
        let _ = writeln!(out, "Count\tSAB");
        let _ = writeln!(out, "-----\t---");
        for c in counts {
            let _ = writeln!(out, "{}\t{}", c.count, c.namespace);
        }
    }

    fn write_comparison(out: &mut String, kind: &str, present: usize, missing: &[String]) {
        let _ = writeln!(out, "\nCounts of unique {} nodes by whether they are also in node file.\n", kind);
        let _ = writeln!(out, "Count\tIn Both Edge and Node file");
        let _ = writeln!(out, "------\t-------");
        let _ = writeln!(out, "{}\tTrue", present);
        let _ = writeln!(out, "{}\tFalse", missing.len());
        if !missing.is_empty() {
            let mut title = kind.to_string();
            title[..1].make_ascii_uppercase();
            let _ = writeln!(out, "\n{} nodes that are in the edge file but not in the node file.", title);
            for id in missing {
                let _ = writeln!(out, "{}", id);
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "OWLNETS INGESTION REPORT");
        let _ = writeln!(out, "{}", BAR);
        let _ = writeln!(out, "RUN DATE: {}", self.run_date.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out, "SAB: {}", self.sab);
        let _ = writeln!(out, "{}\n", BAR);

        let _ = writeln!(out, "FILE STATISTICS");
        let _ = writeln!(out, "{}", BAR);
        let _ = writeln!(out, "Numbers of non-empty rows\n");
        let _ = writeln!(out, "Rows\tFile");
        let _ = writeln!(out, "----\t----");
        let _ = writeln!(out, "{}\tEdge", self.edge_rows);
        let _ = writeln!(out, "{}\tNode", self.node_rows);
        let _ = writeln!(out, "{}\tRelation", self.relation_rows);
        if self.duplicate_edges > 0 {
            let _ = writeln!(out, "({} duplicate edges dropped)", self.duplicate_edges);
        }

        let _ = writeln!(out, "\nEDGE FILE STATISTICS");
        let _ = writeln!(out, "{}", BAR);
        if self.edge_rows == 0 {
            let _ = writeln!(out, "No edges.");
        } else {
            Self::write_counts(&mut out, "Counts of unique subject nodes by SAB", &self.subjects_by_namespace);
            Self::write_counts(&mut out, "Counts of unique object nodes by SAB", &self.objects_by_namespace);
            let _ = writeln!(out, "\n{}", BAR);
            let _ = writeln!(out, "\nComparison of nodes in edge file with nodes in node file");
            let _ = writeln!(
                out,
                "(An object node that is not in the node file is expected to have been ingested by an earlier SAB.)"
            );
            Self::write_comparison(&mut out, "subject", self.subjects_in_nodes, &self.missing_subjects);
            Self::write_comparison(&mut out, "object", self.objects_in_nodes, &self.missing_objects);

            let _ = writeln!(out, "\n{}", BAR);
            let _ = writeln!(out, "PREDICATE STATISTICS\n");
            let _ = writeln!(
                out,
                "Predicates without Relation Ontology IRIs are custom labels, with inverses of the form inverse_<label>.\n"
            );
            let _ = writeln!(out, "Count\tPredicate\tLabel\tInverse");
            let _ = writeln!(out, "-----\t---------\t-----\t-------");
            for p in &self.predicates {
                let _ = writeln!(out, "{}\t{}\t{}\t{}", p.count, p.predicate, p.label, p.inverse);
            }
        }

        let _ = writeln!(out, "\n{}", BAR);
        let _ = writeln!(out, "NODE STATISTICS");
        Self::write_counts(&mut out, "Counts of dbxrefs by SAB", &self.dbxrefs_by_namespace);

        if !self.fidelity.is_empty() {
            let _ = writeln!(out, "\n{}", BAR);
            let _ = writeln!(out, "CANONICALIZATION\n");
            let _ = writeln!(out, "Count\tFidelity");
            let _ = writeln!(out, "-----\t--------");
            for (fidelity, count) in &self.fidelity {
                let _ = writeln!(out, "{}\t{}", count, fidelity);
            }
        }

        if !self.rejections.is_empty() {
            let _ = writeln!(out, "\n{}", BAR);
            let _ = writeln!(out, "REJECTED RECORDS ({})\n", self.rejections.len());
            for r in &self.rejections {
                let _ = writeln!(out, "{}", r);
            }
        }
        out
    }

    pub fn write(&self, path: &Path) -> OwlnetsResult<()> {
        std::fs::write(path, self.render()).map_err(|e| OwlnetsError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::{normalize_relation, CodeId};
    use crate::owlnets::{Edge, NodeRecord};

    fn id(s: &str) -> CodeId {
        CodeId::parse(s).unwrap()
    }

    fn graph() -> OwlnetsGraph {
        let mut g = OwlnetsGraph::new("GENCODE");
        let mut node = NodeRecord::new(id("ENSEMBL:ENSG1")).with_label("gene");
        node.dbxrefs = vec![id("HGNC:5"), id("HGNC:6"), id("UMLS:C1")];
        g.add_node(node).unwrap();
        for (s, p, o) in [
            ("ENSEMBL:ENSG1", "RO:0002510", "ENSEMBL:ENST1"),
            ("ENSEMBL:ENSG1", "RO:0002510", "ENSEMBL:ENST1"),
            ("ENSEMBL:ENSG1", "isa", "SO:0000704"),
        ] {
            g.add_edge(Edge::new(id(s), normalize_relation(p), id(o)));
        }
        g
    }

    #[test]
    fn counts_reflect_written_edges() {
        let report = IngestReport::from_graph(&graph());
        assert_eq!(report.edge_rows, 2);
        assert_eq!(report.duplicate_edges, 1);
        assert_eq!(report.subjects_in_nodes, 1);
        assert_eq!(report.missing_objects, vec!["ENSEMBL:ENST1", "SO:0000704"]);
        assert_eq!(
            report.dbxrefs_by_namespace[0],
            NamespaceCount {
                namespace: "HGNC".into(),
                count: 2
            }
        );
        assert_eq!(report.predicates.len(), 2);
        assert_eq!(report.predicates[0].label, "transcribed from");
        assert_eq!(report.predicates[1].label, "isa");
        assert_eq!(report.predicates[0].inverse, "inverse_ro_0002510");
        let row = "http://purl.obolibrary.org/obo/RO_0002510\ttranscribed from\tinverse_ro_0002510";
        assert!(report.render().contains(row));
    }

    #[test]
    fn render_includes_diagnostics() {
        let report = IngestReport::from_graph(&graph())
            .with_fidelity([(Fidelity::Exact, 3), (Fidelity::Coerced, 1)])
            .with_rejections(vec!["node X: duplicate node_id".into()]);
        let text = report.render();
        assert!(text.contains("SAB: GENCODE"));
        assert!(text.contains("1\tTrue"));
        assert!(text.contains("Object nodes that are in the edge file but not in the node file."));
        assert!(text.contains("3\texact"));
        assert!(text.contains("REJECTED RECORDS (1)"));
    }
}
