//! Arena storage and typed constructors for the query IR.
//!
//! Nodes live in an insertion-ordered map keyed by `NodeId`. Scope/unscope
//! cross-links are id-sets edited by the lifecycle operations in `scopes`,
//! so no node ever holds a reference to another.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::ids::{IdGen, NodeId, ScopeId};
use crate::node::{IrKind, IrNode, Sink, Transform};
use crate::value::ValueKind;
use crate::{GraphError, Result};

/// Substitution map produced by a rewrite pass: replaced node → replacement.
///
/// Consulted, never owned, by the lifecycle operations when cross-links must
/// follow a replacement.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    map: IndexMap<NodeId, NodeId>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `old` was replaced by `new`.
    pub fn insert(&mut self, old: NodeId, new: NodeId) {
        self.map.insert(old, new);
    }

    /// Replacement for `id`, if it was substituted.
    pub fn get(&self, id: NodeId) -> Option<NodeId> {
        self.map.get(&id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

/// The query IR: an arena of typed nodes with parent edges.
#[derive(Debug)]
pub struct IrGraph {
    nodes: IndexMap<NodeId, IrNode>,
    ids: Arc<IdGen>,
}

impl IrGraph {
    pub fn new(ids: Arc<IdGen>) -> Self {
        Self {
            nodes: IndexMap::new(),
            ids,
        }
    }

    /// Allocator this graph draws ids from.
    pub fn ids(&self) -> &Arc<IdGen> {
        &self.ids
    }

    pub fn node(&self, id: NodeId) -> Result<&IrNode> {
        self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut IrNode> {
        self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &IrNode> {
        self.nodes.values()
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    pub(crate) fn alloc_node_id(&self) -> NodeId {
        self.ids.next_node()
    }

    pub(crate) fn insert_node(&mut self, node: IrNode) {
        self.nodes.insert(node.id, node);
    }

    pub(crate) fn remove_entry(&mut self, id: NodeId) -> Option<IrNode> {
        self.nodes.shift_remove(&id)
    }

    fn insert(&mut self, parents: Vec<NodeId>, terminal: bool, kind: IrKind) -> Result<NodeId> {
        for p in &parents {
            if !self.nodes.contains_key(p) {
                return Err(GraphError::UnknownNode(*p));
            }
        }
        let id = self.ids.next_node();
        self.nodes.insert(
            id,
            IrNode {
                id,
                parents,
                terminal,
                kind,
            },
        );
        Ok(id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Typed constructors
    // ─────────────────────────────────────────────────────────────────────

    /// Add the graph entry node.
    pub fn add_root(&mut self) -> NodeId {
        let id = self.ids.next_node();
        self.nodes.insert(
            id,
            IrNode {
                id,
                parents: Vec::new(),
                terminal: false,
                kind: IrKind::Root,
            },
        );
        id
    }

    pub fn add_map(&mut self, parent: NodeId, transform: Transform) -> Result<NodeId> {
        self.insert(vec![parent], false, IrKind::Map(transform))
    }

    pub fn add_flat_map(&mut self, parent: NodeId, transform: Transform) -> Result<NodeId> {
        self.insert(vec![parent], false, IrKind::FlatMap(transform))
    }

    pub fn add_filter(&mut self, parent: NodeId, transform: Transform) -> Result<NodeId> {
        self.insert(vec![parent], false, IrKind::Filter(transform))
    }

    pub fn add_filter_non_null(&mut self, parent: NodeId) -> Result<NodeId> {
        self.insert(vec![parent], false, IrKind::FilterNonNull)
    }

    pub fn add_filter_type(
        &mut self,
        parent: NodeId,
        kinds: IndexSet<ValueKind>,
    ) -> Result<NodeId> {
        self.insert(vec![parent], false, IrKind::FilterType(kinds))
    }

    pub fn add_aggregate(&mut self, parent: NodeId, transform: Transform) -> Result<NodeId> {
        self.insert(vec![parent], false, IrKind::Aggregate(transform))
    }

    pub fn add_aggregate_drop(&mut self, parent: NodeId, transform: Transform) -> Result<NodeId> {
        self.insert(vec![parent], false, IrKind::AggregateDrop(transform))
    }

    pub fn add_combine(
        &mut self,
        left: NodeId,
        right: NodeId,
        transform: Transform,
    ) -> Result<NodeId> {
        self.insert(vec![left, right], false, IrKind::Combine(transform))
    }

    pub fn add_combine_drop(
        &mut self,
        left: NodeId,
        right: NodeId,
        transform: Transform,
    ) -> Result<NodeId> {
        self.insert(vec![left, right], false, IrKind::CombineDrop(transform))
    }

    /// Add a terminal sink.
    pub fn add_consumer(&mut self, parent: NodeId, sink: Sink) -> Result<NodeId> {
        self.insert(vec![parent], true, IrKind::Consumer(sink))
    }

    pub fn add_union(&mut self, parents: Vec<NodeId>) -> Result<NodeId> {
        self.insert(parents, false, IrKind::Union)
    }

    /// Open a scope under `parent`.
    pub fn add_scope(&mut self, parent: NodeId, scope: ScopeId) -> Result<NodeId> {
        self.insert(
            vec![parent],
            false,
            IrKind::Scope {
                scope,
                unscopes: IndexSet::new(),
            },
        )
    }

    /// Close `scope_starts` under `parent`.
    ///
    /// Fails if the set is empty or names a non-scope node; on success the
    /// pairing is installed in both directions before returning.
    pub fn add_unscope(
        &mut self,
        parent: NodeId,
        scope_starts: IndexSet<NodeId>,
    ) -> Result<NodeId> {
        if scope_starts.is_empty() {
            return Err(GraphError::EmptyUnscope);
        }
        for s in &scope_starts {
            match self.nodes.get(s).map(|n| &n.kind) {
                None => return Err(GraphError::UnknownNode(*s)),
                Some(IrKind::Scope { .. }) => {}
                Some(_) => return Err(GraphError::NotAScope(*s)),
            }
        }
        let id = self.insert(
            vec![parent],
            false,
            IrKind::Unscope {
                scope_starts: scope_starts.clone(),
            },
        )?;
        for s in &scope_starts {
            if let Some(IrKind::Scope { unscopes, .. }) = self.nodes.get_mut(s).map(|n| &mut n.kind)
            {
                unscopes.insert(id);
            }
        }
        Ok(id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scope accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Scope id carried by a scope node.
    pub fn scope_id(&self, id: NodeId) -> Result<ScopeId> {
        match &self.node(id)?.kind {
            IrKind::Scope { scope, .. } => Ok(*scope),
            _ => Err(GraphError::NotAScope(id)),
        }
    }

    /// Scope-side pairing set.
    pub fn scope_unscopes(&self, id: NodeId) -> Result<&IndexSet<NodeId>> {
        match &self.node(id)?.kind {
            IrKind::Scope { unscopes, .. } => Ok(unscopes),
            _ => Err(GraphError::NotAScope(id)),
        }
    }

    /// Unscope-side pairing set.
    pub fn unscope_starts(&self, id: NodeId) -> Result<&IndexSet<NodeId>> {
        match &self.node(id)?.kind {
            IrKind::Unscope { scope_starts } => Ok(scope_starts),
            _ => Err(GraphError::NotAnUnscope(id)),
        }
    }
}
