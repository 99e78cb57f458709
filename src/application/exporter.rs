//! Write a tree back in the importer's TOML shape, ids included.

use std::collections::HashMap;

use itertools::Itertools;
use toml::{Table, Value};
use tracing::instrument;

use crate::application::importer::DocumentTree;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{NodeRef, TreeError};

pub struct Exporter;

impl Exporter {
    #[instrument(level = "debug", skip(tree))]
    pub fn export(tree: &DocumentTree, root: NodeRef) -> ApplicationResult<Table> {
        node_table(tree, root)
    }

    pub fn export_string(tree: &DocumentTree, root: NodeRef) -> ApplicationResult<String> {
        let table = Self::export(tree, root)?;
        toml::to_string(&table).map_err(|e| ApplicationError::Export {
            message: e.to_string(),
        })
    }
}

/// Assemble node tables bottom-up so depth never reaches the call stack.
fn node_table(tree: &DocumentTree, root: NodeRef) -> ApplicationResult<Table> {
    let mut finished: HashMap<NodeRef, Table> = HashMap::new();
    for (node_idx, node) in tree.subtree_postorder(root)? {
        let mut table = Table::new();

        table.insert("name".into(), Value::String(node.name().to_string()));
        if let Some(gate) = node.gate() {
            table.insert("gate".into(), Value::String(gate.clone()));
        }
        let id = i64::try_from(node.id()).map_err(|_| ApplicationError::Export {
            message: format!("id {} exceeds the TOML integer range", node.id()),
        })?;
        table.insert("id".into(), Value::Integer(id));

        if !node.index().is_empty() {
            let index = node.index().iter().cloned().sorted().map(Value::String);
            table.insert("index".into(), Value::Array(index.collect()));
        }
        if !node.attributes().is_empty() {
            let attributes: Table = node
                .attributes()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            table.insert("attributes".into(), Value::Table(attributes));
        }

        let children: Vec<Value> = node
            .children()
            .iter()
            .filter_map(|child| finished.remove(child))
            .map(Value::Table)
            .collect();
        if !children.is_empty() {
            table.insert("children".into(), Value::Array(children));
        }
        finished.insert(node_idx, table);
    }
    finished
        .remove(&root)
        .ok_or_else(|| ApplicationError::Tree(TreeError::NodeNotFound(root)))
}
