//! Shared fixtures for the integration tests
//!
//! A [`Workspace`] is a scratch directory laid out like a pipeline
//! checkout: a configuration file, a source registry, optional contexts,
//! and per-source input directories.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, content).expect("write fixture");
        path
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(rel)).expect("read output")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.dir.path().join(rel).exists()
    }

    /// A pipeline configuration pointing at `ontologies.json` and
    /// `contexts.yaml` in this workspace, plus any extra YAML lines.
    pub fn config(&self, extra: &str) -> PathBuf {
        self.write(
            "pipeline.yaml",
            &format!(
                "owlnets_dir: owlnets_output\nowl_dir: owl\nregistry: ontologies.json\ncontexts: contexts.yaml\n{}",
                extra
            ),
        )
    }
}

/// Tab-join rows under a header into file text.
pub fn tsv(header: &[&str], rows: &[&[&str]]) -> String {
    let mut out = header.join("\t");
    out.push('\n');
    for row in rows {
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    out
}

/// Data lines (header excluded) of a TSV file.
pub fn data_lines(text: &str) -> Vec<&str> {
    text.lines().skip(1).filter(|l| !l.is_empty()).collect()
}
