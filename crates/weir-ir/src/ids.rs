//! Identifier allocation for graph nodes and scopes.
//!
//! Ids come from an explicit `IdGen` handed to each graph at construction
//! rather than a process-global counter. The counters are atomic, so builds
//! sharing one allocator may run on different threads without id reuse.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a graph node. Unique per allocator, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(pub u64);

/// Identity of a logical scope. Copies of the same scope share this id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ScopeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Allocator for node and scope ids.
///
/// Each counter is strictly increasing with no reuse. Cheap to share behind
/// an `Arc`; tests get deterministic ids from a fresh allocator.
#[derive(Debug, Default)]
pub struct IdGen {
    nodes: AtomicU64,
    scopes: AtomicU64,
}

impl IdGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh node id.
    pub fn next_node(&self) -> NodeId {
        NodeId(self.nodes.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocate a fresh scope id.
    pub fn next_scope(&self) -> ScopeId {
        ScopeId(self.scopes.fetch_add(1, Ordering::Relaxed))
    }
}
