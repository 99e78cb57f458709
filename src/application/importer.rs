//! Build a tree from a nested TOML description.
//!
//! ```toml
//! name = "root"
//! gate = "and"
//! index = [1, 2]
//!
//! [attributes]
//! colour = "red"
//!
//! [[children]]
//! name = "c1"
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{IdPolicy, NodeRef, NodeSpec, TreeArena};

/// Tree shape produced by the importer: gates and index elements as text.
pub type DocumentTree = TreeArena<Option<String>, String>;

/// An imported tree together with its root handle.
#[derive(Debug)]
pub struct ImportedTree {
    pub tree: DocumentTree,
    pub root: NodeRef,
}

/// One node of the description. Unknown keys (e.g. an exported `id`) are ignored.
#[derive(Debug, Deserialize)]
struct NodeDocument {
    name: String,
    #[serde(default)]
    gate: Option<toml::Value>,
    #[serde(default)]
    index: Vec<toml::Value>,
    #[serde(default)]
    attributes: toml::Table,
    #[serde(default)]
    children: Vec<NodeDocument>,
}

/// Strings stay as they are, every other value uses its TOML text.
pub fn scalar_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct Importer {
    separator: String,
    id_policy: IdPolicy,
}

impl Importer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            separator: settings.separator.clone(),
            id_policy: settings.id_policy,
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn import_path(&self, path: &Path) -> ApplicationResult<ImportedTree> {
        let content = std::fs::read_to_string(path).with_path_context("read tree", path)?;
        self.import_str(&content).map_err(|e| match e {
            ApplicationError::Import { message } => ApplicationError::Import {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    pub fn import_str(&self, content: &str) -> ApplicationResult<ImportedTree> {
        let document: NodeDocument =
            toml::from_str(content).map_err(|e| ApplicationError::Import {
                message: e.to_string(),
            })?;
        self.build(document)
    }

    /// Create nodes parent-first in pre-order, so ids follow document order.
    fn build(&self, document: NodeDocument) -> ApplicationResult<ImportedTree> {
        let mut tree = DocumentTree::new()
            .with_separator(self.separator.clone())
            .with_id_policy(self.id_policy);
        let mut root = None;
        let mut stack = vec![(document, None)];

        while let Some((document, parent)) = stack.pop() {
            let NodeDocument {
                name,
                gate,
                index,
                attributes,
                children,
            } = document;

            let spec = NodeSpec::new(
                gate.as_ref().map(scalar_text),
                name,
                index.iter().map(scalar_text),
            )
            .maybe_parent(parent)
            .attrs(attributes);
            let current_idx = tree.create(spec)?;
            root.get_or_insert(current_idx);

            for child in children.into_iter().rev() {
                stack.push((child, Some(current_idx)));
            }
        }

        let root = root.ok_or_else(|| ApplicationError::Import {
            message: "document contains no node".to_string(),
        })?;
        debug!(nodes = tree.len(), "imported tree");
        Ok(ImportedTree { tree, root })
    }
}
