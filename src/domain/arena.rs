use std::collections::{HashMap, HashSet};
use std::fmt::{self, Debug};

use generational_arena::Arena;
use tracing::{debug, instrument};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::ids::{IdAllocator, IdPolicy};
use crate::domain::node::{Node, NodeId, NodeRef, NodeSpec};

/// Default path separator.
pub const SEPARATOR: &str = "/";

/// Arena-based forest of [`Node`]s.
///
/// Uses a generational arena for memory-safe node handles and O(1) lookups.
/// A stale handle (node removed) yields [`TreeError::NodeNotFound`].
/// Every parentless node is the root of its own tree.
#[derive(Debug)]
pub struct TreeArena<G, E> {
    /// Arena storage for all nodes
    arena: Arena<Node<G, E>>,
    /// Joins names in paths and representations
    separator: String,
    ids: IdAllocator,
}

impl<G, E> Default for TreeArena<G, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G, E> TreeArena<G, E> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            separator: SEPARATOR.to_string(),
            ids: IdAllocator::default(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_id_policy(mut self, policy: IdPolicy) -> Self {
        self.ids = IdAllocator::new(policy);
        self
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn id_policy(&self) -> IdPolicy {
        self.ids.policy()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, node: NodeRef) -> bool {
        self.arena.contains(node)
    }

    pub fn get(&self, node: NodeRef) -> TreeResult<&Node<G, E>> {
        self.arena.get(node).ok_or(TreeError::NodeNotFound(node))
    }

    /// Mutable payload access. Links and id stay under arena control.
    pub fn get_mut(&mut self, node: NodeRef) -> TreeResult<&mut Node<G, E>> {
        self.arena.get_mut(node).ok_or(TreeError::NodeNotFound(node))
    }

    /// Construct a node, wire it into the tree and assign its id.
    ///
    /// Validation runs before any mutation, so an error leaves the arena untouched.
    #[instrument(level = "debug", skip(self, spec), fields(name = %spec.name))]
    pub fn create(&mut self, mut spec: NodeSpec<G, E>) -> TreeResult<NodeRef> {
        if let Some(parent) = spec.parent {
            self.get(parent)?;
        }
        self.validate_children(spec.parent, &spec.children)?;

        let max_existing = match (self.ids.policy(), spec.parent) {
            (IdPolicy::Scan, Some(parent)) => self.max_id_after_wiring(parent, &spec.children)?,
            _ => None,
        };
        let id = self.ids.allocate(spec.parent.is_some(), max_existing);

        let attributes = spec.take_attributes();
        let node = Node::new(spec.gate, spec.name, spec.index, id, attributes);
        let node_idx = self.arena.insert(node);

        if let Some(parent) = spec.parent {
            self.link(node_idx, parent)?;
        }
        if !spec.children.is_empty() {
            self.adopt(node_idx, spec.children)?;
        }
        debug!(?node_idx, id, "created node");
        Ok(node_idx)
    }

    /// Highest id the new node will find among its root's descendants.
    ///
    /// Children handed over in bulk are part of that subtree once wired, so
    /// their subtrees are scanned as well.
    fn max_id_after_wiring(
        &self,
        parent: NodeRef,
        children: &[NodeRef],
    ) -> TreeResult<Option<NodeId>> {
        let root = self.root(parent)?;
        let mut max = self.descendants(root)?.map(|(_, n)| n.id()).max();
        for &child in children {
            let child_max = self.subtree(child)?.map(|(_, n)| n.id()).max();
            max = max.max(child_max);
        }
        Ok(max)
    }

    /// Children must exist, be unique and must not sit on the path above `parent`.
    fn validate_children(&self, parent: Option<NodeRef>, children: &[NodeRef]) -> TreeResult<()> {
        let mut seen = HashSet::with_capacity(children.len());
        for &child in children {
            self.get(child)?;
            if !seen.insert(child) {
                return Err(TreeError::DuplicateChild(child));
            }
            if let Some(parent) = parent {
                if self.is_ancestor_or_self(child, parent)? {
                    return Err(TreeError::CycleDetected {
                        node: child,
                        parent,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn parent(&self, node: NodeRef) -> TreeResult<Option<NodeRef>> {
        Ok(self.get(node)?.parent)
    }

    pub fn children(&self, node: NodeRef) -> TreeResult<&[NodeRef]> {
        Ok(&self.get(node)?.children)
    }

    pub fn is_root(&self, node: NodeRef) -> TreeResult<bool> {
        Ok(self.get(node)?.is_root())
    }

    pub fn is_leaf(&self, node: NodeRef) -> TreeResult<bool> {
        Ok(self.get(node)?.is_leaf())
    }

    /// Walk parent links up to the parentless ancestor.
    #[instrument(level = "trace", skip(self))]
    pub fn root(&self, node: NodeRef) -> TreeResult<NodeRef> {
        let mut current = node;
        while let Some(parent) = self.get(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, node: NodeRef) -> TreeResult<Vec<NodeRef>> {
        let mut ancestors = Vec::new();
        let mut current = self.get(node)?.parent;
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.get(parent)?.parent;
        }
        Ok(ancestors)
    }

    /// True if `candidate` is `node` or one of its ancestors.
    fn is_ancestor_or_self(&self, candidate: NodeRef, node: NodeRef) -> TreeResult<bool> {
        let mut current = Some(node);
        while let Some(idx) = current {
            if idx == candidate {
                return Ok(true);
            }
            current = self.get(idx)?.parent;
        }
        Ok(false)
    }

    /// Pre-order walk of everything below `node`, excluding `node`.
    #[instrument(level = "trace", skip(self))]
    pub fn descendants(&self, node: NodeRef) -> TreeResult<Descendants<'_, G, E>> {
        self.get(node)?;
        Ok(Descendants::new(self, node, false))
    }

    /// Pre-order walk of `node` and everything below it.
    #[instrument(level = "trace", skip(self))]
    pub fn subtree(&self, node: NodeRef) -> TreeResult<Descendants<'_, G, E>> {
        self.get(node)?;
        Ok(Descendants::new(self, node, true))
    }

    /// Post-order walk of `node` and everything below it.
    #[instrument(level = "trace", skip(self))]
    pub fn subtree_postorder(&self, node: NodeRef) -> TreeResult<PostOrderIterator<'_, G, E>> {
        self.get(node)?;
        Ok(PostOrderIterator::new(self, node))
    }

    /// Other children of the same parent, in order. Roots have no siblings.
    pub fn siblings(&self, node: NodeRef) -> TreeResult<Vec<NodeRef>> {
        match self.get(node)?.parent {
            Some(parent) => Ok(self
                .children(parent)?
                .iter()
                .copied()
                .filter(|&c| c != node)
                .collect()),
            None => Ok(Vec::new()),
        }
    }

    /// Nodes from the root down to `node`, inclusive.
    pub fn path(&self, node: NodeRef) -> TreeResult<Vec<NodeRef>> {
        let mut path = self.ancestors(node)?;
        path.reverse();
        path.push(node);
        Ok(path)
    }

    /// Separator-joined names from the root, with a leading separator.
    pub fn path_string(&self, node: NodeRef) -> TreeResult<String> {
        let mut out = String::new();
        for idx in self.path(node)? {
            out.push_str(&self.separator);
            out.push_str(self.get(idx)?.name());
        }
        Ok(out)
    }

    /// Number of ancestors; roots have depth 0.
    pub fn depth(&self, node: NodeRef) -> TreeResult<usize> {
        Ok(self.ancestors(node)?.len())
    }

    /// Number of levels in the subtree rooted at `node`; a leaf has height 1.
    #[instrument(level = "debug", skip(self))]
    pub fn height(&self, node: NodeRef) -> TreeResult<usize> {
        // children finish before their parent, so each entry is read once and dropped
        let mut heights: HashMap<NodeRef, usize> = HashMap::new();
        for (idx, n) in self.subtree_postorder(node)? {
            let below = n
                .children
                .iter()
                .filter_map(|c| heights.remove(c))
                .max()
                .unwrap_or(0);
            heights.insert(idx, below + 1);
        }
        heights.remove(&node).ok_or(TreeError::NodeNotFound(node))
    }

    /// Leaf nodes below (or equal to) `node`, left to right.
    #[instrument(level = "debug", skip(self))]
    pub fn leaves(&self, node: NodeRef) -> TreeResult<Vec<NodeRef>> {
        Ok(self
            .subtree(node)?
            .filter(|(_, n)| n.is_leaf())
            .map(|(idx, _)| idx)
            .collect())
    }

    /// All parentless nodes in the arena.
    pub fn roots(&self) -> Vec<NodeRef> {
        self.arena
            .iter()
            .filter(|(_, n)| n.is_root())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Reparent `node` below `parent`, or detach it with `None`.
    ///
    /// Setting the current parent again keeps the child's position.
    #[instrument(level = "debug", skip(self))]
    pub fn set_parent(&mut self, node: NodeRef, parent: Option<NodeRef>) -> TreeResult<()> {
        let current = self.get(node)?.parent;
        match parent {
            None => {
                self.unlink(node)?;
                Ok(())
            }
            Some(parent) if current == Some(parent) => Ok(()),
            Some(parent) => {
                self.get(parent)?;
                if self.is_ancestor_or_self(node, parent)? {
                    return Err(TreeError::CycleDetected { node, parent });
                }
                self.unlink(node)?;
                self.link(node, parent)
            }
        }
    }

    pub fn detach(&mut self, node: NodeRef) -> TreeResult<()> {
        self.set_parent(node, None)
    }

    /// Replace all children of `node`. Previous children become roots.
    #[instrument(level = "debug", skip(self, children))]
    pub fn set_children(
        &mut self,
        node: NodeRef,
        children: impl IntoIterator<Item = NodeRef>,
    ) -> TreeResult<()> {
        let children: Vec<NodeRef> = children.into_iter().collect();
        self.get(node)?;
        self.validate_children(Some(node), &children)?;

        let previous = std::mem::take(&mut self.get_mut(node)?.children);
        for old in previous {
            self.get_mut(old)?.parent = None;
        }
        self.adopt(node, children)
    }

    /// Detach `node` and drop it together with its subtree.
    ///
    /// Returns the number of nodes dropped.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, node: NodeRef) -> TreeResult<usize> {
        self.unlink(node)?;
        let doomed: Vec<NodeRef> = self.subtree_postorder(node)?.map(|(idx, _)| idx).collect();
        for idx in &doomed {
            self.arena.remove(*idx);
        }
        debug!(count = doomed.len(), "removed subtree");
        Ok(doomed.len())
    }

    /// First node in the subtree of `root` carrying `id`.
    pub fn find_by_id(&self, root: NodeRef, id: NodeId) -> TreeResult<Option<NodeRef>> {
        Ok(self
            .subtree(root)?
            .find(|(_, n)| n.id() == id)
            .map(|(idx, _)| idx))
    }

    pub fn find_by_name(&self, root: NodeRef, name: &str) -> TreeResult<Vec<NodeRef>> {
        self.find_all(root, |n| n.name() == name)
    }

    /// Pre-order search of the subtree of `root`.
    pub fn find_all<F>(&self, root: NodeRef, mut predicate: F) -> TreeResult<Vec<NodeRef>>
    where
        F: FnMut(&Node<G, E>) -> bool,
    {
        Ok(self
            .subtree(root)?
            .filter(|(_, n)| predicate(*n))
            .map(|(idx, _)| idx)
            .collect())
    }

    /// Append `node` to `parent`'s children. Caller has validated both.
    fn link(&mut self, node: NodeRef, parent: NodeRef) -> TreeResult<()> {
        self.get_mut(parent)?.children.push(node);
        self.get_mut(node)?.parent = Some(parent);
        Ok(())
    }

    /// Remove `node` from its parent's children, if any.
    fn unlink(&mut self, node: NodeRef) -> TreeResult<()> {
        if let Some(parent) = self.get_mut(node)?.parent.take() {
            self.get_mut(parent)?.children.retain(|&c| c != node);
        }
        Ok(())
    }

    /// Move already validated `children` below `node`, in order.
    fn adopt(&mut self, node: NodeRef, children: Vec<NodeRef>) -> TreeResult<()> {
        for child in children {
            self.unlink(child)?;
            self.link(child, node)?;
        }
        Ok(())
    }
}

impl<G: Debug, E: Debug> TreeArena<G, E> {
    /// One-line representation: quoted path, then `key=value` pairs sorted by key.
    ///
    /// The pairs are the attributes plus `gate`, `id` and `index`; `name` is
    /// never listed. `gate` uses its `Debug` form, so an `Option` gate shows as
    /// `Some(..)`/`None`. `index` prints as `{a, b}` with elements sorted by their
    /// `Debug` text, and an empty index as `{}`. Attribute values use TOML
    /// formatting, so strings are double-quoted.
    ///
    /// ```
    /// use gatetree::domain::{NodeSpec, TreeArena};
    ///
    /// let mut tree: TreeArena<Option<&str>, u8> = TreeArena::new();
    /// let root = tree.create(NodeSpec::new(Some("and"), "root", [])).unwrap();
    /// let sub = tree
    ///     .create(NodeSpec::new(None, "sub0", [2, 1]).parent(root).attr("colour", "red"))
    ///     .unwrap();
    ///
    /// assert_eq!(
    ///     tree.repr(root).unwrap(),
    ///     r#"Node('/root', gate=Some("and"), id=0, index={})"#
    /// );
    /// assert_eq!(
    ///     tree.repr(sub).unwrap(),
    ///     r#"Node('/root/sub0', colour="red", gate=None, id=1, index={1, 2})"#
    /// );
    /// ```
    pub fn repr(&self, node: NodeRef) -> TreeResult<String> {
        Ok(self.display(node)?.to_string())
    }

    /// [`fmt::Display`] adapter writing the same text as [`TreeArena::repr`].
    pub fn display(&self, node: NodeRef) -> TreeResult<NodeDisplay<'_, G, E>> {
        Ok(NodeDisplay {
            path: self.path_string(node)?,
            node: self.get(node)?,
        })
    }
}

/// A node bound to its resolved path, ready for formatting.
pub struct NodeDisplay<'a, G, E> {
    path: String,
    node: &'a Node<G, E>,
}

impl<G: Debug, E: Debug> fmt::Display for NodeDisplay<'_, G, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node('{}'", self.path)?;
        for arg in self.node.repr_args() {
            write!(f, ", {arg}")?;
        }
        write!(f, ")")
    }
}

pub struct Descendants<'a, G, E> {
    arena: &'a TreeArena<G, E>,
    stack: Vec<NodeRef>,
}

impl<'a, G, E> Descendants<'a, G, E> {
    fn new(arena: &'a TreeArena<G, E>, start: NodeRef, include_start: bool) -> Self {
        let stack = if include_start {
            vec![start]
        } else {
            arena
                .arena
                .get(start)
                .map(|n| n.children.iter().rev().copied().collect())
                .unwrap_or_default()
        };
        Self { arena, stack }
    }
}

impl<'a, G, E> Iterator for Descendants<'a, G, E> {
    type Item = (NodeRef, &'a Node<G, E>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.arena.get(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a, G, E> {
    arena: &'a TreeArena<G, E>,
    stack: Vec<(NodeRef, bool)>,
}

impl<'a, G, E> PostOrderIterator<'a, G, E> {
    fn new(arena: &'a TreeArena<G, E>, start: NodeRef) -> Self {
        Self {
            arena,
            stack: vec![(start, false)],
        }
    }
}

impl<'a, G, E> Iterator for PostOrderIterator<'a, G, E> {
    type Item = (NodeRef, &'a Node<G, E>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.arena.get(current_idx) {
                if visited {
                    return Some((current_idx, node));
                }
                self.stack.push((current_idx, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}
