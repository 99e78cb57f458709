//! In-memory gate trees.
//!
//! Every node carries a `gate` value, a `name`, a set-valued `index`, free-form
//! attributes and an `id` that is unique within its tree at the time it is
//! assigned. Nodes live in a [`TreeArena`](domain::TreeArena), which owns the
//! parent/child links and rejects cycles and duplicate children.
//!
//! ```
//! use gatetree::domain::{NodeSpec, TreeArena};
//!
//! let mut tree: TreeArena<Option<&str>, u32> = TreeArena::new();
//! let root = tree.create(NodeSpec::new(None, "root", [])).unwrap();
//! let c1 = tree.create(NodeSpec::new(None, "c1", []).parent(root)).unwrap();
//! let c2 = tree.create(NodeSpec::new(None, "c2", []).parent(root)).unwrap();
//! let g1 = tree.create(NodeSpec::new(None, "g1", []).parent(c1)).unwrap();
//!
//! let ids: Vec<u64> = [root, c1, c2, g1]
//!     .iter()
//!     .map(|&n| tree.get(n).unwrap().id())
//!     .collect();
//! assert_eq!(ids, vec![0, 1, 2, 3]);
//! assert_eq!(tree.path_string(g1).unwrap(), "/root/c1/g1");
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use application::{ApplicationError, ApplicationResult, Exporter, Importer};
pub use domain::{
    IdPolicy, Node, NodeDisplay, NodeId, NodeRef, NodeSpec, RenderStyle, RenderedTree, TreeArena,
    TreeError, TreeRender, TreeResult,
};
