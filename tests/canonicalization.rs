//! Identifier canonicalization and relation normalization, end to end
//! through the public API.

use owlnets::canon::{is_canonical_shape, PrefixTable, RuleSet, RuleSpec};
use owlnets::{normalize_relation, Canonicalizer, CodeId, Fidelity, RelationLabel};
use proptest::prelude::*;

fn engine() -> Canonicalizer {
    Canonicalizer::default()
}

#[test]
fn obo_iri_becomes_curie() {
    let c = engine().canonicalize("http://purl.obolibrary.org/obo/MONDO_0019052", "MONDO");
    assert_eq!(c.value, "MONDO:0019052");
    let id = c.code_id().unwrap();
    assert_eq!(id.namespace(), "MONDO");
    assert_eq!(id.code(), "0019052");
}

#[test]
fn legacy_double_prefix_is_collapsed() {
    assert_eq!(engine().canonicalize("HGNC HGNC:1097", "X").value, "HGNC:1097");
}

#[test]
fn refseq_accession_keeps_its_underscore() {
    assert_eq!(engine().canonicalize("REFSEQ NR_001234", "GENCODE").value, "REFSEQ:NR_001234");
}

#[test]
fn ro_curie_expands_to_full_iri() {
    let label = normalize_relation("RO:0002510");
    assert_eq!(label.as_str(), "http://purl.obolibrary.org/obo/RO_0002510");
    assert_eq!(label.display_label(), "transcribed from");
}

#[test]
fn structural_predicates_are_isa() {
    for raw in [
        "http://www.w3.org/2000/01/rdf-schema#subClassOf",
        "subClassOf",
        "isa",
        "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
    ] {
        assert_eq!(normalize_relation(raw), RelationLabel::Isa, "{raw}");
    }
}

#[test]
fn custom_predicates_are_sanitized() {
    assert_eq!(normalize_relation("has gene product").as_str(), "has_gene_product");
    assert_eq!(normalize_relation("2nd-order link").as_str(), "rel_2nd_order_link");
    assert_eq!(normalize_relation("http://example.org/vocab#partOf").as_str(), "partof");
}

#[test]
fn injected_prefix_table_drives_its_rule() {
    let prefixes = PrefixTable::parse("# prefix\tSAB\nhttp://identifiers.org/ncbigene/\tENTREZ\n");
    let engine = Canonicalizer::new(RuleSet::builtin(), prefixes);
    let c = engine.canonicalize("http://identifiers.org/ncbigene/7157", "HGNC");
    assert_eq!(c.value, "ENTREZ:7157");
    assert_eq!(c.fidelity, Fidelity::Exact);
}

#[test]
fn configured_rule_overrides_builtins() {
    let mut rules = RuleSet::builtin();
    let spec: RuleSpec =
        serde_yaml::from_str("name: ordo\ncontains: \"Orphanet_\"\ntemplate: \"ORDO {token}\"\n").unwrap();
    rules.extend_from_specs(&[spec]).unwrap();
    let engine = Canonicalizer::new(rules, PrefixTable::empty());

    let c = engine.canonicalize("http://www.orpha.net/ORDO/Orphanet_558", "ORDO");
    assert_eq!(c.value, "ORDO:558");
    assert_eq!(c.rule.as_deref(), Some("ordo"));
}

#[test]
fn bare_code_is_coerced_to_source_sab() {
    let c = engine().canonicalize("0000123", "pato");
    assert_eq!(c.value, "PATO:0000123");
    assert_eq!(c.fidelity, Fidelity::Coerced);
}

fn canonical_id() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Z0-9_.]{1,8}:[A-Za-z0-9_.:/#-]{1,16}").unwrap()
}

fn printable() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[ -~]{0,40}").unwrap()
}

fn mixed_script() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[ -~ªºʰßéİǅﬀ]{0,30}").unwrap()
}

fn sab() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z_]{0,8}").unwrap()
}

proptest! {
    #[test]
    fn canonical_ids_are_fixed_points(id in canonical_id(), sab in sab()) {
        prop_assert!(is_canonical_shape(&id));
        let c = engine().canonicalize(&id, &sab);
        prop_assert_eq!(&c.value, &id);
        prop_assert_eq!(c.fidelity, Fidelity::Exact);
    }

    #[test]
    fn output_is_canonical_for_any_input(raw in printable(), sab in sab()) {
        let c = engine().canonicalize(&raw, &sab);
        if raw.trim().is_empty() {
            prop_assert!(c.is_empty());
        } else {
            let id: CodeId = c.value.parse().unwrap();
            prop_assert!(!id.namespace().is_empty());
            prop_assert!(!id.namespace().contains(':'));
            prop_assert_eq!(id.namespace().to_uppercase(), id.namespace());
            prop_assert!(!id.code().is_empty());
        }
    }

    #[test]
    fn non_ascii_input_still_parses(raw in mixed_script(), sab in "[A-Za-zªʰß_]{0,8}") {
        let c = engine().canonicalize(&raw, &sab);
        if raw.trim().is_empty() {
            prop_assert!(c.is_empty());
        } else {
            let id = c.code_id();
            prop_assert!(id.is_some(), "{:?} -> {:?}", raw, c.value);
        }
    }

    #[test]
    fn canonicalize_is_deterministic(raw in printable(), sab in sab()) {
        let a = Canonicalizer::default().canonicalize(&raw, &sab);
        let b = Canonicalizer::default().canonicalize(&raw, &sab);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn relation_labels_have_a_fixed_shape(raw in printable()) {
        let label = normalize_relation(&raw);
        match &label {
            RelationLabel::Isa => prop_assert_eq!(label.as_str(), "isa"),
            RelationLabel::Ontology(iri) => prop_assert!(iri.starts_with("http://purl.obolibrary.org/obo/RO_")),
            RelationLabel::Custom(s) => {
                prop_assert!(s.starts_with(|c: char| c.is_ascii_lowercase()));
                prop_assert!(s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
            }
        }
        prop_assert_eq!(normalize_relation(label.as_str()), label);
    }
}
