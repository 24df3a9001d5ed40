//! Dependency ordering for the translation walk.
//!
//! The builder requires every data-flow predecessor translated before its
//! consumers. This utility is the single source of that order; the build
//! context still reports an ordering violation if a caller bypasses it.

use indexmap::IndexMap;
use weir_ir::{GraphError, IrGraph, NodeId};

use crate::{Result, TranslateError};

/// Order nodes so that every parent precedes its consumers.
///
/// Ties break on arena insertion order, keeping the result deterministic.
pub fn topo_order(graph: &IrGraph) -> Result<Vec<NodeId>> {
    let mut pending: IndexMap<NodeId, usize> = IndexMap::new();
    let mut consumers: IndexMap<NodeId, Vec<NodeId>> = IndexMap::new();

    for node in graph.iter() {
        for p in &node.parents {
            if !graph.contains(*p) {
                return Err(TranslateError::Graph(GraphError::UnknownNode(*p)));
            }
            consumers.entry(*p).or_default().push(node.id);
        }
        pending.insert(node.id, node.parents.len());
    }

    let mut ready: Vec<NodeId> = pending
        .iter()
        .filter(|(_, unresolved)| **unresolved == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut order = Vec::with_capacity(pending.len());
    let mut next = 0;

    while next < ready.len() {
        let id = ready[next];
        next += 1;
        order.push(id);

        if let Some(users) = consumers.get(&id) {
            for user in users {
                if let Some(unresolved) = pending.get_mut(user) {
                    *unresolved -= 1;
                    if *unresolved == 0 {
                        ready.push(*user);
                    }
                }
            }
        }
    }

    if order.len() < pending.len() {
        for (id, unresolved) in &pending {
            if *unresolved > 0 {
                return Err(TranslateError::Cycle(*id));
            }
        }
    }

    Ok(order)
}
