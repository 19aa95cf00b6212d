//! Identifier canonicalization and relation normalization
//!
//! Every identifier that enters the graph passes through a [`Canonicalizer`]:
//! a default delimiter pass, an ordered overlay of special-case rules where
//! the last match wins, and a finalization step that guarantees the
//! `NAMESPACE:CODE` shape. Predicates pass through [`normalize_relation`].

mod engine;
mod identifier;
mod prefix;
mod relation;
mod rules;
mod template;

pub use engine::{Canonical, Canonicalizer, Fidelity, UNKNOWN_SAB};
pub use identifier::{CodeId, CodeIdError};
pub use prefix::{PrefixMatch, PrefixTable};
pub use relation::{normalize_relation, relation_ontology_label, RelationLabel, LABEL_MARKER, RO_IRI_PREFIX};
pub use rules::{
    is_canonical_shape, CanonicalizationRule, Matcher, RuleContext, RuleError, RuleSet, RuleSpec, FIXED_POINT_RULE,
};
pub use template::{default_pass, Template, TemplateContext, TemplateError};
