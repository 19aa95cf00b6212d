//! Relation label normalization
//!
//! Predicates arrive as Relation Ontology IRIs or CURIEs, RDF/RDFS IRIs,
//! other IRIs, or free text. Structural forms are recognized first; anything
//! left over is reduced to a safe lowercase identifier.

use serde::{Serialize, Serializer};

/// IRI stem for Relation Ontology terms.
pub const RO_IRI_PREFIX: &str = "http://purl.obolibrary.org/obo/RO_";

const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Marker prepended to labels that would not start with a letter.
pub const LABEL_MARKER: &str = "rel_";

/// A normalized predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationLabel {
    /// The taxonomic parent relation
    Isa,
    /// A full Relation Ontology IRI
    Ontology(String),
    /// A sanitized free-text label matching `^[a-z][a-z0-9_]*$`
    Custom(String),
}

impl RelationLabel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Isa => "isa",
            Self::Ontology(iri) => iri,
            Self::Custom(label) => label,
        }
    }

    /// Local part of an ontology IRI (`RO_0002510`), the label otherwise.
    pub fn short_form(&self) -> &str {
        match self {
            Self::Ontology(iri) => iri.rsplit('/').next().unwrap_or(iri),
            other => other.as_str(),
        }
    }

    /// Label for the reverse direction, listed beside each predicate in the
    /// QC report.
    pub fn inverse(&self) -> String {
        format!("inverse_{}", self.short_form().to_lowercase())
    }

    /// Human-readable label, when one is known.
    pub fn display_label(&self) -> String {
        match self {
            Self::Isa => "isa".to_string(),
            Self::Ontology(iri) => relation_ontology_label(iri)
                .map(str::to_string)
                .unwrap_or_else(|| self.short_form().to_string()),
            Self::Custom(label) => label.replace('_', " "),
        }
    }
}

impl std::fmt::Display for RelationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RelationLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Normalize a raw predicate.
pub fn normalize_relation(raw: &str) -> RelationLabel {
    let raw = raw.trim();

    if let Some(iri) = relation_ontology_iri(raw) {
        return RelationLabel::Ontology(iri);
    }
    if is_structural_isa(raw) {
        return RelationLabel::Isa;
    }

    let local = if is_iri(raw) { local_name(raw) } else { raw };
    if let Some(iri) = relation_ontology_iri(local) {
        return RelationLabel::Ontology(iri);
    }
    if is_structural_isa(local) {
        return RelationLabel::Isa;
    }
    RelationLabel::Custom(sanitize(local))
}

/// Known labels for Relation Ontology terms emitted by the bundled converters.
pub fn relation_ontology_label(iri: &str) -> Option<&'static str> {
    let code = iri.strip_prefix(RO_IRI_PREFIX)?;
    let label = match code {
        "0000057" => "has participant",
        "0001025" => "located in",
        "0002162" => "in taxon",
        "0002200" => "has phenotype",
        "0002205" => "has gene product",
        "0002211" => "regulates",
        "0002331" => "involved in",
        "0002510" => "transcribed from",
        "0004048" => "has directional form of",
        _ => return None,
    };
    Some(label)
}

/// `RO:nnnnnnn`, `RO_nnnnnnn` or a full RO IRI, as a full IRI.
fn relation_ontology_iri(s: &str) -> Option<String> {
    let code = s
        .strip_prefix(RO_IRI_PREFIX)
        .or_else(|| s.strip_prefix("RO:"))
        .or_else(|| s.strip_prefix("RO_"))?;
    (code.len() == 7 && code.bytes().all(|b| b.is_ascii_digit()))
        .then(|| format!("{}{}", RO_IRI_PREFIX, code))
}

fn is_structural_isa(s: &str) -> bool {
    s == RDFS_SUBCLASS_OF
        || s == RDF_TYPE
        || s.eq_ignore_ascii_case("subClassOf")
        || s.eq_ignore_ascii_case("isa")
}

fn is_iri(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("urn:")
}

fn local_name(iri: &str) -> &str {
    let cut = iri.rfind(['#', '/']).map(|i| i + 1).unwrap_or(0);
    &iri[cut..]
}

fn sanitize(label: &str) -> String {
    let mut out: String = label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' { c } else { '_' })
        .collect();
    if !out.starts_with(|c: char| c.is_ascii_lowercase()) {
        out.insert_str(0, LABEL_MARKER);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ro_curie_expands_to_iri() {
        assert_eq!(
            normalize_relation("RO:0002510"),
            RelationLabel::Ontology("http://purl.obolibrary.org/obo/RO_0002510".into())
        );
        assert_eq!(
            normalize_relation("RO_0002205").as_str(),
            "http://purl.obolibrary.org/obo/RO_0002205"
        );
        assert_eq!(
            normalize_relation("http://purl.obolibrary.org/obo/RO_0001025").as_str(),
            "http://purl.obolibrary.org/obo/RO_0001025"
        );
    }

    #[test]
    fn subclass_forms_become_isa() {
        for raw in [
            "http://www.w3.org/2000/01/rdf-schema#subClassOf",
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
            "subClassOf",
            "subclassOf",
            "ISA",
        ] {
            assert_eq!(normalize_relation(raw), RelationLabel::Isa, "{raw}");
        }
    }

    #[test]
    fn other_iris_keep_local_name() {
        assert_eq!(
            normalize_relation("http://purl.obolibrary.org/obo/uberon/core#part_of").as_str(),
            "part_of"
        );
        assert_eq!(normalize_relation("http://example.org/rel/hasMember").as_str(), "hasmember");
    }

    #[test]
    fn free_text_is_sanitized() {
        assert_eq!(normalize_relation("has gene product (protein)").as_str(), "has_gene_product__protein_");
        assert_eq!(normalize_relation("3' UTR of").as_str(), "rel_3__utr_of");
        assert_eq!(normalize_relation("_x").as_str(), "rel__x");
        assert_eq!(normalize_relation("").as_str(), "rel_");
    }

    #[test]
    fn inverse_and_labels() {
        let ro = normalize_relation("RO:0002510");
        assert_eq!(ro.inverse(), "inverse_ro_0002510");
        assert_eq!(ro.display_label(), "transcribed from");
        assert_eq!(RelationLabel::Isa.inverse(), "inverse_isa");
        assert_eq!(normalize_relation("has_marker").display_label(), "has marker");
        assert_eq!(relation_ontology_label("http://purl.obolibrary.org/obo/RO_9999999"), None);
    }
}
