//! Reading not-yet-canonical OWLNETS and edges/nodes tables

use super::node::split_multi;
use super::tsv::{cell, TsvTable};
use super::{OwlnetsPaths, OwlnetsResult, Quantity, RawEdge, RawNode, RawRelation, Submitter};
use tracing::{debug, warn};

/// The raw contents of one SAB's files, as an adapter wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOwlnets {
    pub edges: Vec<RawEdge>,
    pub nodes: Vec<RawNode>,
    pub relations: Vec<RawRelation>,
}

impl RawOwlnets {
    /// Read a SAB directory. The edge list is required; node and relation
    /// metadata are optional.
    pub fn read(paths: &OwlnetsPaths) -> OwlnetsResult<Self> {
        let edges = edges_from_table(&TsvTable::read(&paths.edgelist)?)?;

        let nodes = if paths.node_metadata.is_file() {
            nodes_from_table(&TsvTable::read(&paths.node_metadata)?)?
        } else {
            warn!(path = %paths.node_metadata.display(), "no node metadata file");
            Vec::new()
        };

        let relations = if paths.relations.is_file() {
            relations_from_table(&TsvTable::read(&paths.relations)?)?
        } else {
            debug!(path = %paths.relations.display(), "no relations file");
            Vec::new()
        };

        Ok(Self {
            edges,
            nodes,
            relations,
        })
    }
}

/// Edge rows from a table with `subject`, `predicate` and `object` columns.
pub(crate) fn edges_from_table(table: &TsvTable) -> OwlnetsResult<Vec<RawEdge>> {
    let s = table.require("subject")?;
    let p = table.require("predicate")?;
    let o = table.require("object")?;
    Ok(table
        .rows()
        .iter()
        .map(|row| RawEdge::new(&row[s], &row[p], &row[o]))
        .collect())
}

/// Node rows from a table with at least a `node_id` column.
pub(crate) fn nodes_from_table(table: &TsvTable) -> OwlnetsResult<Vec<RawNode>> {
    let id = table.require("node_id")?;
    let namespace = table.column("node_namespace");
    let label = table.column("node_label");
    let definition = table.column("node_definition");
    let synonyms = table.column("node_synonyms");
    let dbxrefs = table.column("node_dbxrefs");
    let quantity = ["value", "lowerbound", "upperbound", "unit"].map(|c| table.column(c));
    let submitter = ["firstname", "lastname", "email"].map(|c| table.column(c));

    Ok(table
        .rows()
        .iter()
        .map(|row| {
            let mut node = RawNode::new(&row[id], cell(row, label))
                .with_definition(cell(row, definition))
                .with_synonyms(split_multi(cell(row, synonyms)))
                .with_dbxrefs(split_multi(cell(row, dbxrefs)))
                .with_quantity(Quantity {
                    value: cell(row, quantity[0]).to_string(),
                    lowerbound: cell(row, quantity[1]).to_string(),
                    upperbound: cell(row, quantity[2]).to_string(),
                    unit: cell(row, quantity[3]).to_string(),
                })
                .with_submitter(Submitter {
                    firstname: cell(row, submitter[0]).to_string(),
                    lastname: cell(row, submitter[1]).to_string(),
                    email: cell(row, submitter[2]).to_string(),
                });
            node.namespace = cell(row, namespace).to_string();
            node
        })
        .collect())
}

/// Relation rows from a table with at least a `relation_id` column.
pub(crate) fn relations_from_table(table: &TsvTable) -> OwlnetsResult<Vec<RawRelation>> {
    let id = table.require("relation_id")?;
    let namespace = table.column("relation_namespace");
    let label = table.column("relation_label");
    let definition = table.column("relation_definition");
    Ok(table
        .rows()
        .iter()
        .map(|row| RawRelation {
            relation_id: row[id].clone(),
            namespace: cell(row, namespace).to_string(),
            label: cell(row, label).to_string(),
            definition: cell(row, definition).to_string(),
        })
        .collect())
}
