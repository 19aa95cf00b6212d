//! Canonical `NAMESPACE:CODE` identifiers

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a string is not a canonical identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeIdError {
    #[error("missing namespace delimiter in '{0}'")]
    MissingDelimiter(String),

    #[error("empty namespace in '{0}'")]
    EmptyNamespace(String),

    #[error("namespace is not uppercase in '{0}'")]
    LowercaseNamespace(String),

    #[error("empty code in '{0}'")]
    EmptyCode(String),

    #[error("code begins with whitespace in '{0}'")]
    LeadingWhitespace(String),
}

/// A canonical identifier of the form `NAMESPACE:CODE`.
///
/// The first colon is the delimiter, so the code may itself contain colons.
/// Construct through [`CodeId::parse`] or [`CodeId::new`]; both enforce the
/// shape invariants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CodeId {
    value: String,
    split: usize,
}

impl CodeId {
    /// Parse an already-canonical string.
    pub fn parse(s: &str) -> Result<Self, CodeIdError> {
        let split = s
            .find(':')
            .ok_or_else(|| CodeIdError::MissingDelimiter(s.to_string()))?;
        let (namespace, code) = (&s[..split], &s[split + 1..]);

        if namespace.is_empty() {
            return Err(CodeIdError::EmptyNamespace(s.to_string()));
        }
        if namespace.chars().any(|c| c.is_lowercase()) {
            return Err(CodeIdError::LowercaseNamespace(s.to_string()));
        }
        if code.is_empty() {
            return Err(CodeIdError::EmptyCode(s.to_string()));
        }
        if code.starts_with(char::is_whitespace) {
            return Err(CodeIdError::LeadingWhitespace(s.to_string()));
        }

        Ok(Self {
            value: s.to_string(),
            split,
        })
    }

    /// Build from parts, uppercasing the namespace.
    pub fn new(namespace: &str, code: &str) -> Result<Self, CodeIdError> {
        Self::parse(&format!("{}:{}", namespace.to_uppercase(), code))
    }

    /// The source abbreviation part.
    pub fn namespace(&self) -> &str {
        &self.value[..self.split]
    }

    /// Everything after the first colon.
    pub fn code(&self) -> &str {
        &self.value[self.split + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for CodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl std::str::FromStr for CodeId {
    type Err = CodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CodeId {
    type Error = CodeIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CodeId> for String {
    fn from(id: CodeId) -> Self {
        id.value
    }
}

impl AsRef<str> for CodeId {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_first_colon() {
        let id = CodeId::parse("GO:GO:0005575").unwrap();
        assert_eq!(id.namespace(), "GO");
        assert_eq!(id.code(), "GO:0005575");
    }

    #[test]
    fn parse_keeps_underscores_in_code() {
        let id = CodeId::parse("REFSEQ:NR_001234").unwrap();
        assert_eq!(id.code(), "NR_001234");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(matches!(CodeId::parse("HGNC"), Err(CodeIdError::MissingDelimiter(_))));
        assert!(matches!(CodeId::parse(":123"), Err(CodeIdError::EmptyNamespace(_))));
        assert!(matches!(CodeId::parse("hgnc:1"), Err(CodeIdError::LowercaseNamespace(_))));
        assert!(matches!(CodeId::parse("HGNC:"), Err(CodeIdError::EmptyCode(_))));
        assert!(matches!(CodeId::parse("HGNC: 1"), Err(CodeIdError::LeadingWhitespace(_))));
    }

    #[test]
    fn new_uppercases_namespace() {
        let id = CodeId::new("glyco.glycan", "G00001MO").unwrap();
        assert_eq!(id.as_str(), "GLYCO.GLYCAN:G00001MO");
    }

    #[test]
    fn serde_round_trips_as_plain_string() {
        let id = CodeId::parse("UBERON:0000955").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"UBERON:0000955\"");
        let back: CodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<CodeId>("\"nope\"").is_err());
    }
}
