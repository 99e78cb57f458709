//! Identifier assignment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::node::NodeId;

/// How a new node's id is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdPolicy {
    /// Scan every descendant of the root and take `max + 1`.
    ///
    /// Ids freed by removing nodes can come back once no remaining node
    /// holds a higher one.
    #[default]
    Scan,
    /// Arena-wide high-water mark: O(1) and never reuses an id.
    Counter,
}

impl fmt::Display for IdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdPolicy::Scan => write!(f, "scan"),
            IdPolicy::Counter => write!(f, "counter"),
        }
    }
}

impl FromStr for IdPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scan" => Ok(IdPolicy::Scan),
            "counter" => Ok(IdPolicy::Counter),
            other => Err(format!("unknown id policy '{other}' (expected scan or counter)")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct IdAllocator {
    policy: IdPolicy,
    high_water: NodeId,
}

impl IdAllocator {
    pub(crate) fn new(policy: IdPolicy) -> Self {
        Self {
            policy,
            high_water: 0,
        }
    }

    pub(crate) fn policy(&self) -> IdPolicy {
        self.policy
    }

    /// Pick the id for a node being constructed.
    ///
    /// `max_existing` is the highest id among the root's descendants and is
    /// only consulted by [`IdPolicy::Scan`].
    pub(crate) fn allocate(&mut self, attached: bool, max_existing: Option<NodeId>) -> NodeId {
        if !attached {
            return 0;
        }
        let id = match self.policy {
            IdPolicy::Scan => max_existing.map_or(1, |max| max + 1),
            IdPolicy::Counter => self.high_water + 1,
        };
        self.high_water = self.high_water.max(id);
        debug!(policy = %self.policy, id, "assigned node id");
        id
    }
}
