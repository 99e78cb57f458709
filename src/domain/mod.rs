//! Domain layer: nodes, the tree arena and id assignment
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod ids;
pub mod node;
pub mod render;

pub use arena::{Descendants, NodeDisplay, PostOrderIterator, TreeArena, SEPARATOR};
pub use error::{TreeError, TreeResult};
pub use ids::IdPolicy;
pub use node::{Node, NodeId, NodeRef, NodeSpec, RESERVED_KEYS};
pub use render::{RenderStyle, RenderedTree, TreeRender};
