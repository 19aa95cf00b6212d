//! Node metadata rows

use crate::canon::CodeId;

/// Separator for multi-valued node fields.
pub const MULTI_VALUE_SEPARATOR: char = '|';

/// Optional numeric payload of a quantitative node. Values are kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quantity {
    pub value: String,
    pub lowerbound: String,
    pub upperbound: String,
    pub unit: String,
}

impl Quantity {
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.lowerbound.is_empty() && self.upperbound.is_empty() && self.unit.is_empty()
    }
}

/// Optional provenance of a submitted node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submitter {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

impl Submitter {
    pub fn is_empty(&self) -> bool {
        self.firstname.is_empty() && self.lastname.is_empty() && self.email.is_empty()
    }
}

/// A node row as an adapter produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawNode {
    pub node_id: String,
    pub namespace: String,
    pub label: String,
    pub definition: String,
    pub synonyms: Vec<String>,
    pub dbxrefs: Vec<String>,
    pub quantity: Option<Quantity>,
    pub submitter: Option<Submitter>,
}

impl RawNode {
    pub fn new(node_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dbxrefs<I, S>(mut self, dbxrefs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dbxrefs = dbxrefs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = (!quantity.is_empty()).then_some(quantity);
        self
    }

    pub fn with_submitter(mut self, submitter: Submitter) -> Self {
        self.submitter = (!submitter.is_empty()).then_some(submitter);
        self
    }
}

/// A canonical node metadata row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub node_id: CodeId,
    pub namespace: String,
    pub label: String,
    pub definition: String,
    pub synonyms: Vec<String>,
    pub dbxrefs: Vec<CodeId>,
    pub quantity: Option<Quantity>,
    pub submitter: Option<Submitter>,
}

impl NodeRecord {
    /// A record with only an id; the namespace defaults to the id's.
    pub fn new(node_id: CodeId) -> Self {
        Self {
            namespace: node_id.namespace().to_string(),
            node_id,
            label: String::new(),
            definition: String::new(),
            synonyms: Vec::new(),
            dbxrefs: Vec::new(),
            quantity: None,
            submitter: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Split a pipe-delimited field, dropping empty items.
pub fn split_multi(field: &str) -> Vec<String> {
    field
        .split(MULTI_VALUE_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join items into a pipe-delimited field.
pub fn join_multi<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(&MULTI_VALUE_SEPARATOR.to_string())
}
