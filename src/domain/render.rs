use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::TreeArena;
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::node::NodeRef;

/// Label used for each node when rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// Full representation: path plus attributes
    #[default]
    Repr,
    /// Node name only
    Name,
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStyle::Repr => write!(f, "repr"),
            RenderStyle::Name => write!(f, "name"),
        }
    }
}

impl FromStr for RenderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "repr" => Ok(RenderStyle::Repr),
            "name" => Ok(RenderStyle::Name),
            other => Err(format!("unknown render style '{other}' (expected repr or name)")),
        }
    }
}

/// Box-drawing view of a subtree, shown through [`fmt::Display`].
///
/// Nested levels are released with an explicit stack on drop, so a deep
/// chain does not exhaust the call stack.
pub struct RenderedTree(Tree<String>);

impl RenderedTree {
    fn leaf(label: String) -> Self {
        Self(Tree::new(label))
    }

    fn push(&mut self, child: RenderedTree) {
        self.0.push(child.into_inner());
    }

    fn into_inner(mut self) -> Tree<String> {
        std::mem::replace(&mut self.0, Tree::new(String::new()))
    }

    pub fn tree(&self) -> &Tree<String> {
        &self.0
    }

    /// Number of levels, the root included.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(&self.0, 1)];
        while let Some((tree, level)) = stack.pop() {
            max = max.max(level);
            stack.extend(tree.leaves.iter().map(|leaf| (leaf, level + 1)));
        }
        max
    }
}

impl fmt::Display for RenderedTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for RenderedTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedTree")
            .field("root", &self.0.root)
            .field("depth", &self.depth())
            .finish()
    }
}

impl Drop for RenderedTree {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.0.leaves);
        while let Some(mut tree) = pending.pop() {
            pending.append(&mut tree.leaves);
        }
    }
}

pub trait TreeRender {
    /// Box-drawing view of the subtree below `root`.
    fn to_tree_string(&self, root: NodeRef, style: RenderStyle) -> TreeResult<RenderedTree>;
}

impl<G: Debug, E: Debug> TreeRender for TreeArena<G, E> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, root: NodeRef, style: RenderStyle) -> TreeResult<RenderedTree> {
        // post-order: every child is rendered before its parent picks it up
        let mut rendered: HashMap<NodeRef, RenderedTree> = HashMap::new();
        for (node_idx, node) in self.subtree_postorder(root)? {
            let label = match style {
                RenderStyle::Repr => self.repr(node_idx)?,
                RenderStyle::Name => node.name().to_string(),
            };
            let mut tree = RenderedTree::leaf(label);
            for child_idx in node.children() {
                if let Some(child) = rendered.remove(child_idx) {
                    tree.push(child);
                }
            }
            rendered.insert(node_idx, tree);
        }
        rendered.remove(&root).ok_or(TreeError::NodeNotFound(root))
    }
}
