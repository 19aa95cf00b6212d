//! Built-in adapters for sources that already ship tabular graph files

use super::sink::{AdapterError, EmitResult, GraphSink};
use super::traits::SourceAdapter;
use crate::owlnets::tsv::TsvTable;
use crate::owlnets::{raw, OwlnetsPaths, RawOwlnets};
use std::path::PathBuf;
use tracing::{debug, info};

/// Reads a directory of pre-built UBKG edges/nodes files.
///
/// Files are classified by header: a `subject` column marks an edge file,
/// `node_id` a node file and `relation_id` a relation file. Anything else in
/// the directory is ignored.
#[derive(Debug, Clone)]
pub struct EdgesNodesAdapter {
    dir: PathBuf,
}

impl EdgesNodesAdapter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Read and classify every file in the directory.
    pub fn read(&self) -> Result<RawOwlnets, AdapterError> {
        let io_err = |source| AdapterError::Io {
            path: self.dir.display().to_string(),
            source,
        };
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.dir)
            .map_err(io_err)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        let mut out = RawOwlnets::default();
        let mut found_edges = false;
        for path in files {
            let table = TsvTable::read(&path)?;
            if table.has_column("subject") {
                found_edges = true;
                out.edges.extend(raw::edges_from_table(&table)?);
            } else if table.has_column("node_id") {
                out.nodes.extend(raw::nodes_from_table(&table)?);
            } else if table.has_column("relation_id") {
                out.relations.extend(raw::relations_from_table(&table)?);
            } else {
                debug!(path = %path.display(), "not an edges/nodes file");
                continue;
            }
            debug!(path = %path.display(), rows = table.len(), "read edges/nodes file");
        }

        if !found_edges {
            return Err(AdapterError::NoInputFiles(self.dir.display().to_string()));
        }
        Ok(out)
    }
}

impl SourceAdapter for EdgesNodesAdapter {
    fn id(&self) -> &str {
        "edges-nodes"
    }

    fn process(&self, sink: &mut GraphSink<'_>) -> Result<EmitResult, AdapterError> {
        let raw = self.read()?;
        let result = sink.emit(&raw);
        info!(
            sab = %sink.sab(),
            dir = %self.dir.display(),
            edges = result.edges_committed,
            nodes = result.nodes_committed,
            rejected = result.rejections.len(),
            "ingested edges/nodes files"
        );
        Ok(result)
    }
}

/// Re-reads the raw OWLNETS files a converter left in a SAB directory.
#[derive(Debug, Clone)]
pub struct OwlnetsFilesAdapter {
    paths: OwlnetsPaths,
}

impl OwlnetsFilesAdapter {
    pub fn new(paths: OwlnetsPaths) -> Self {
        Self { paths }
    }
}

impl SourceAdapter for OwlnetsFilesAdapter {
    fn id(&self) -> &str {
        "owlnets-files"
    }

    fn process(&self, sink: &mut GraphSink<'_>) -> Result<EmitResult, AdapterError> {
        let raw = RawOwlnets::read(&self.paths)?;
        let result = sink.emit(&raw);
        info!(
            sab = %sink.sab(),
            edges = result.edges_committed,
            nodes = result.nodes_committed,
            rejected = result.rejections.len(),
            "canonicalized OWLNETS files"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::Canonicalizer;

    #[test]
    fn classifies_files_by_header() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("edges.tsv"), "subject\tpredicate\tobject\nHRAVS_1\tisa\tHRAVS_2\n").unwrap();
        std::fs::write(dir.path().join("nodes.tsv"), "node_id\tnode_label\nHRAVS_1\tone\nHRAVS_2\ttwo\n").unwrap();
        std::fs::write(dir.path().join("README.md"), "# notes\n").unwrap();

        let engine = Canonicalizer::default();
        let mut sink = GraphSink::new(&engine, "HRAVS");
        let result = EdgesNodesAdapter::new(dir.path()).process(&mut sink).unwrap();
        assert_eq!((result.edges_committed, result.nodes_committed), (1, 2));
        assert_eq!(sink.graph().edges()[0].subject.as_str(), "HRAVS:1");
    }

    #[test]
    fn directory_without_edges_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("nodes.tsv"), "node_id\nX:1\n").unwrap();
        let err = EdgesNodesAdapter::new(dir.path()).read().unwrap_err();
        assert!(matches!(err, AdapterError::NoInputFiles(_)));
    }
}
