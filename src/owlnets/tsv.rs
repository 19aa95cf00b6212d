//! Header-driven tab-delimited tables
//!
//! Columns are located by name, so extra or reordered columns are tolerated.
//! Rows whose width differs from the header are padded or truncated with a
//! warning rather than rejected.

use super::{OwlnetsError, OwlnetsResult};
use std::path::Path;
use tracing::{debug, warn};

/// Cell values that read as empty.
const NULL_MARKERS: &[&str] = &["None", "nan", "NaN"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsvTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Source name used in diagnostics
    source: String,
}

impl TsvTable {
    /// An empty table with the given columns, for writing.
    pub fn new<S: AsRef<str>>(header: &[S]) -> Self {
        Self {
            header: header.iter().map(|h| h.as_ref().to_string()).collect(),
            rows: Vec::new(),
            source: String::new(),
        }
    }

    /// Parse tab-delimited text. The first non-blank line is the header.
    pub fn parse(text: &str, source: &str) -> Self {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
            .filter(|(_, l)| !l.trim().is_empty());

        let header: Vec<String> = match lines.next() {
            Some((_, line)) => line.split('\t').map(|h| h.trim().to_string()).collect(),
            None => Vec::new(),
        };

        let width = header.len();
        let mut ragged = 0usize;
        let mut rows = Vec::new();
        for (line_no, line) in lines {
            let mut row: Vec<String> = line.split('\t').map(clean_cell).collect();
            if row.len() != width {
                ragged += 1;
                debug!(source, line = line_no, columns = row.len(), expected = width, "ragged row");
                row.resize(width, String::new());
            }
            rows.push(row);
        }
        if ragged > 0 {
            warn!(source, rows = ragged, expected = width, "padded or truncated ragged rows to header width");
        }

        Self {
            header,
            rows,
            source: source.to_string(),
        }
    }

    pub fn read(path: &Path) -> OwlnetsResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| OwlnetsError::io(path, e))?;
        Ok(Self::parse(&text, &path.display().to_string()))
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, matched case-insensitively.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Index of a column that must be present.
    pub fn require(&self, name: &str) -> OwlnetsResult<usize> {
        self.column(name).ok_or_else(|| OwlnetsError::MissingColumn {
            file: self.source.clone(),
            column: name.to_string(),
        })
    }

    /// Append a row, sanitizing cells and fitting it to the header width.
    pub fn push_row(&mut self, row: Vec<String>) {
        let mut row: Vec<String> = row.into_iter().map(|c| sanitize_cell(&c)).collect();
        row.resize(self.header.len(), String::new());
        self.rows.push(row);
    }

    pub fn to_tsv_string(&self) -> String {
        let mut out = self.header.join("\t");
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join("\t"));
            out.push('\n');
        }
        out
    }

    pub fn write(&self, path: &Path) -> OwlnetsResult<()> {
        std::fs::write(path, self.to_tsv_string()).map_err(|e| OwlnetsError::io(path, e))?;
        debug!(path = %path.display(), rows = self.rows.len(), "wrote table");
        Ok(())
    }
}

/// Value of an optional column in a row; absent columns read as empty.
pub fn cell(row: &[String], column: Option<usize>) -> &str {
    column
        .and_then(|i| row.get(i))
        .map(String::as_str)
        .unwrap_or_default()
}

fn clean_cell(raw: &str) -> String {
    let value = raw.trim();
    if NULL_MARKERS.contains(&value) {
        String::new()
    } else {
        value.to_string()
    }
}

/// Replace characters that would break the row structure.
pub fn sanitize_cell(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
