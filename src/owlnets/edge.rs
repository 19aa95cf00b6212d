//! Edge list rows

use crate::canon::{CodeId, RelationLabel};

/// A `subject predicate object` row as an adapter produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEdge {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl RawEdge {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// A canonical triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub subject: CodeId,
    pub predicate: RelationLabel,
    pub object: CodeId,
}

impl Edge {
    pub fn new(subject: CodeId, predicate: RelationLabel, object: CodeId) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    pub(crate) fn to_row(&self) -> Vec<String> {
        vec![
            self.subject.to_string(),
            self.predicate.to_string(),
            self.object.to_string(),
        ]
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -[{}]-> {}", self.subject, self.predicate, self.object)
    }
}
