//! Node payload and the construction contract.

use std::collections::{BTreeMap, HashSet};
use std::fmt::{self, Debug};
use std::hash::Hash;

use generational_arena::Index;
use itertools::Itertools;
use toml::Value;
use tracing::warn;

/// Handle of a node inside a [`TreeArena`](crate::domain::TreeArena).
pub type NodeRef = Index;

/// Tree-unique identifier assigned at construction.
pub type NodeId = u64;

/// Attribute keys that collide with explicit node fields.
///
/// Attributes using one of these keys are dropped during construction so the
/// explicit parameter always wins.
pub const RESERVED_KEYS: [&str; 6] = ["children", "gate", "id", "index", "name", "parent"];

/// A tree node: gate value, name, index set, id and free-form attributes.
///
/// Structural links are owned by the arena; `id` has no setter.
#[derive(Debug, Clone)]
pub struct Node<G, E> {
    gate: G,
    name: String,
    index: HashSet<E>,
    id: NodeId,
    attributes: BTreeMap<String, Value>,
    pub(crate) parent: Option<NodeRef>,
    pub(crate) children: Vec<NodeRef>,
}

impl<G, E> Node<G, E> {
    pub(crate) fn new(
        gate: G,
        name: String,
        index: HashSet<E>,
        id: NodeId,
        attributes: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            gate,
            name,
            index,
            id,
            attributes,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn gate(&self) -> &G {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut G {
        &mut self.gate
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> &HashSet<E> {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut HashSet<E> {
        &mut self.index
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Set an attribute, returning the previous value.
    ///
    /// Reserved keys are ignored and logged.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        if is_reserved(&key) {
            warn!(key = %key, node = %self.name, "ignoring reserved attribute key");
            return None;
        }
        self.attributes.insert(key, value.into())
    }

    pub fn remove_attr(&mut self, key: &str) -> Option<Value> {
        self.attributes.remove(key)
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.parent
    }

    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl<G: Debug, E: Debug> Node<G, E> {
    /// `key=value` pairs for the representation, sorted by key, `name` excluded.
    pub(crate) fn repr_args(&self) -> Vec<String> {
        let mut args: BTreeMap<&str, String> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.to_string()))
            .collect();
        args.insert("gate", format!("{:?}", self.gate));
        args.insert("id", self.id.to_string());
        args.insert("index", IndexRepr(&self.index).to_string());
        args.into_iter().map(|(k, v)| format!("{k}={v}")).collect()
    }
}

/// Renders a set with elements sorted by their debug text.
struct IndexRepr<'a, E>(&'a HashSet<E>);

impl<E: Debug> fmt::Display for IndexRepr<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.0.iter().map(|e| format!("{e:?}")).sorted().join(", ");
        write!(f, "{{{items}}}")
    }
}

fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Everything needed to construct a node.
///
/// ```
/// use gatetree::domain::{NodeSpec, TreeArena};
///
/// let mut tree: TreeArena<(), u8> = TreeArena::new();
/// let root = tree.create(NodeSpec::new((), "root", [])).unwrap();
/// let child = tree
///     .create(NodeSpec::new((), "c1", [1, 2, 2]).parent(root).attr("foo", 4))
///     .unwrap();
/// assert_eq!(tree.get(child).unwrap().id(), 1);
/// assert_eq!(tree.get(child).unwrap().index().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct NodeSpec<G, E> {
    pub(crate) gate: G,
    pub(crate) name: String,
    pub(crate) index: HashSet<E>,
    pub(crate) parent: Option<NodeRef>,
    pub(crate) children: Vec<NodeRef>,
    pub(crate) attributes: BTreeMap<String, Value>,
}

impl<G, E: Eq + Hash> NodeSpec<G, E> {
    pub fn new(gate: G, name: impl Into<String>, index: impl IntoIterator<Item = E>) -> Self {
        Self {
            gate,
            name: name.into(),
            index: index.into_iter().collect(),
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }
}

impl<G, E> NodeSpec<G, E> {
    pub fn parent(mut self, parent: NodeRef) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn maybe_parent(mut self, parent: Option<NodeRef>) -> Self {
        self.parent = parent;
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = NodeRef>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attrs<K, V>(mut self, attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.attributes
            .extend(attrs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Drop reserved keys from the attribute bag.
    pub(crate) fn take_attributes(&mut self) -> BTreeMap<String, Value> {
        let mut attributes = std::mem::take(&mut self.attributes);
        attributes.retain(|key, _| {
            let reserved = is_reserved(key);
            if reserved {
                warn!(key = %key, node = %self.name, "explicit field overrides attribute");
            }
            !reserved
        });
        attributes
    }
}
