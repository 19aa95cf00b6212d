//! Relation metadata rows

use crate::canon::RelationLabel;

/// A relation row as an adapter produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRelation {
    pub relation_id: String,
    pub namespace: String,
    pub label: String,
    pub definition: String,
}

impl RawRelation {
    pub fn new(relation_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            relation_id: relation_id.into(),
            label: label.into(),
            ..Default::default()
        }
    }
}

/// Metadata for one distinct predicate of a SAB's edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRecord {
    pub relation_id: RelationLabel,
    pub namespace: String,
    pub label: String,
    pub definition: String,
}

impl RelationRecord {
    /// Metadata derived from the label alone.
    pub fn derived(relation_id: RelationLabel, namespace: &str) -> Self {
        Self {
            label: relation_id.display_label(),
            relation_id,
            namespace: namespace.to_string(),
            definition: String::new(),
        }
    }

    pub(crate) fn to_row(&self) -> Vec<String> {
        vec![
            self.relation_id.to_string(),
            self.namespace.clone(),
            self.label.clone(),
            self.definition.clone(),
        ]
    }
}
