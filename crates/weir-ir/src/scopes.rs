//! Scope/unscope pairing lifecycle.
//!
//! A scope node opens a nested evaluation context; unscope nodes close one or
//! more scopes. The pairing is bidirectional: `u ∈ s.unscopes ⇔ s ∈
//! u.scope_starts`. Every operation here restores that invariant before
//! returning, with one documented exception (`copy_unscope`). Mutation is
//! always an id-set edit in the arena.

use crate::graph::{IrGraph, TranslationTable};
use crate::ids::NodeId;
use crate::node::{IrKind, IrNode};
use crate::{GraphError, Result};

/// Render targets of an unscope's closing edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeLinks {
    /// Predecessors of every paired scope, in pairing order.
    Resolved(Vec<NodeId>),
    /// At least one paired scope's predecessor is missing or unclassified.
    Unresolved,
}

#[derive(Clone, Copy)]
enum Side {
    Scope,
    Unscope,
}

impl IrGraph {
    /// Whether two nodes may be merged by a deduplication pass.
    ///
    /// Scopes merge when they carry the same scope id (copies of one logical
    /// scope); unscopes merge when they close the same set of scopes. The
    /// comparison is structural, never by node identity.
    pub fn mergeable(&self, a: NodeId, b: NodeId) -> Result<bool> {
        let (na, nb) = (self.node(a)?, self.node(b)?);
        Ok(match (&na.kind, &nb.kind) {
            (IrKind::Scope { scope: sa, .. }, IrKind::Scope { scope: sb, .. }) => sa == sb,
            (IrKind::Unscope { scope_starts: ua }, IrKind::Unscope { scope_starts: ub }) => {
                ua == ub
            }
            _ => false,
        })
    }

    /// Duplicate a scope node.
    ///
    /// The duplicate carries the same scope id and the original's unscope
    /// pairing; every paired unscope is re-registered against the duplicate,
    /// so the pairing invariant holds for original and copy alike.
    pub fn copy_scope(&mut self, id: NodeId) -> Result<NodeId> {
        let node = self.node(id)?;
        let (scope, unscopes) = match &node.kind {
            IrKind::Scope { scope, unscopes } => (*scope, unscopes.clone()),
            _ => return Err(GraphError::NotAScope(id)),
        };
        let parents = node.parents.clone();
        let terminal = node.terminal;

        let dup = self.alloc_node_id();
        self.insert_node(IrNode {
            id: dup,
            parents,
            terminal,
            kind: IrKind::Scope {
                scope,
                unscopes: unscopes.clone(),
            },
        });
        for u in &unscopes {
            if let IrKind::Unscope { scope_starts } = &mut self.node_mut(*u)?.kind {
                scope_starts.insert(dup);
            }
        }
        Ok(dup)
    }

    /// Duplicate an unscope node.
    ///
    /// The copy references the same `scope_starts` set but is not registered
    /// on the scope side; the caller re-pairs when the duplication is a new
    /// closing edge. Scope is the owning side of the scope id; unscope is
    /// the referencing side.
    pub fn copy_unscope(&mut self, id: NodeId) -> Result<NodeId> {
        let node = self.node(id)?;
        let scope_starts = match &node.kind {
            IrKind::Unscope { scope_starts } => scope_starts.clone(),
            _ => return Err(GraphError::NotAnUnscope(id)),
        };
        let parents = node.parents.clone();
        let terminal = node.terminal;

        let dup = self.alloc_node_id();
        self.insert_node(IrNode {
            id: dup,
            parents,
            terminal,
            kind: IrKind::Unscope { scope_starts },
        });
        Ok(dup)
    }

    /// Redirect this node's pairings through a substitution table.
    ///
    /// Works over a snapshot of the current pairing set, since re-pairing
    /// mutates the set being scanned. Exactly one redirection hop is taken
    /// per call; chained replacements are the rewrite pass's responsibility,
    /// issued once per affected node in dependency order.
    pub fn apply_translation(&mut self, id: NodeId, table: &TranslationTable) -> Result<()> {
        let (side, snapshot) = match &self.node(id)?.kind {
            IrKind::Scope { unscopes, .. } => {
                (Side::Scope, unscopes.iter().copied().collect::<Vec<_>>())
            }
            IrKind::Unscope { scope_starts } => {
                (Side::Unscope, scope_starts.iter().copied().collect::<Vec<_>>())
            }
            _ => return Ok(()),
        };
        for old in snapshot {
            let Some(new) = table.get(old) else { continue };
            match side {
                Side::Scope => {
                    self.expect_unscope(new)?;
                    self.redirect_scope_pairing(id, old, new)?;
                }
                Side::Unscope => {
                    self.expect_scope(new)?;
                    self.redirect_unscope_pairing(id, old, new)?;
                }
            }
        }
        Ok(())
    }

    /// Remove a node, clearing every cross-reference to it first.
    ///
    /// Deleting a scope clears it from every paired unscope's `scope_starts`;
    /// deleting an unscope clears it from every paired scope's `unscopes`.
    /// Skipping this and editing the arena directly would leave dangling
    /// cross-references for later traversals to follow.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let counterparts: Vec<NodeId> = match &self.node(id)?.kind {
            IrKind::Scope { unscopes, .. } => unscopes.iter().copied().collect(),
            IrKind::Unscope { scope_starts } => scope_starts.iter().copied().collect(),
            _ => Vec::new(),
        };
        for c in counterparts {
            if let Ok(node) = self.node_mut(c) {
                match &mut node.kind {
                    IrKind::Scope { unscopes, .. } => {
                        unscopes.shift_remove(&id);
                    }
                    IrKind::Unscope { scope_starts } => {
                        scope_starts.shift_remove(&id);
                    }
                    _ => {}
                }
            }
        }
        self.remove_entry(id);
        Ok(())
    }

    /// Check the bidirectional pairing invariant across the whole arena.
    pub fn pairing_consistent(&self) -> bool {
        for node in self.iter() {
            match &node.kind {
                IrKind::Scope { unscopes, .. } => {
                    for u in unscopes {
                        match self.unscope_starts(*u) {
                            Ok(starts) if starts.contains(&node.id) => {}
                            _ => return false,
                        }
                    }
                }
                IrKind::Unscope { scope_starts } => {
                    for s in scope_starts {
                        match self.scope_unscopes(*s) {
                            Ok(us) if us.contains(&node.id) => {}
                            _ => return false,
                        }
                    }
                }
                _ => {}
            }
        }
        true
    }

    fn expect_scope(&self, id: NodeId) -> Result<()> {
        match &self.node(id)?.kind {
            IrKind::Scope { .. } => Ok(()),
            _ => Err(GraphError::NotAScope(id)),
        }
    }

    fn expect_unscope(&self, id: NodeId) -> Result<()> {
        match &self.node(id)?.kind {
            IrKind::Unscope { .. } => Ok(()),
            _ => Err(GraphError::NotAnUnscope(id)),
        }
    }

    fn redirect_scope_pairing(&mut self, scope: NodeId, old: NodeId, new: NodeId) -> Result<()> {
        if let IrKind::Scope { unscopes, .. } = &mut self.node_mut(scope)?.kind {
            unscopes.shift_remove(&old);
            unscopes.insert(new);
        }
        // The stale counterpart may already have left the arena.
        if let Ok(node) = self.node_mut(old) {
            if let IrKind::Unscope { scope_starts } = &mut node.kind {
                scope_starts.shift_remove(&scope);
            }
        }
        if let IrKind::Unscope { scope_starts } = &mut self.node_mut(new)?.kind {
            scope_starts.insert(scope);
        }
        Ok(())
    }

    fn redirect_unscope_pairing(&mut self, unscope: NodeId, old: NodeId, new: NodeId) -> Result<()> {
        if let IrKind::Unscope { scope_starts } = &mut self.node_mut(unscope)?.kind {
            scope_starts.shift_remove(&old);
            scope_starts.insert(new);
        }
        if let Ok(node) = self.node_mut(old) {
            if let IrKind::Scope { unscopes, .. } = &mut node.kind {
                unscopes.shift_remove(&unscope);
            }
        }
        if let IrKind::Scope { unscopes, .. } = &mut self.node_mut(new)?.kind {
            unscopes.insert(unscope);
        }
        Ok(())
    }
}
