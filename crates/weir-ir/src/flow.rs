//! Flow classification queries for the diagnostics layer.
//!
//! Classifying ordinary nodes is the diagnostics traversal's job; this module
//! answers the unscope-specific combination: the join of every paired scope's
//! predecessor class with the unscope's own predecessor class.

use indexmap::IndexMap;

use crate::Result;
use crate::graph::IrGraph;
use crate::ids::NodeId;
use crate::scopes::ScopeLinks;

/// Flow shape of the element stream entering a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FlowClass {
    /// Exactly one element per batch.
    One,
    /// Zero or more elements per batch.
    Many,
    /// Classification could not be resolved; rendered, never raised.
    Error,
}

impl FlowClass {
    /// Associative, commutative join: `Error` absorbs, `Many` dominates.
    pub fn union(self, other: FlowClass) -> FlowClass {
        use FlowClass::*;
        match (self, other) {
            (Error, _) | (_, Error) => Error,
            (Many, _) | (_, Many) => Many,
            (One, One) => One,
        }
    }
}

/// Per-node classifications supplied by the diagnostics traversal.
pub type FlowMap = IndexMap<NodeId, FlowClass>;

impl IrGraph {
    /// Flow classification of an unscope node.
    ///
    /// Joins the classification of each paired scope's predecessor with the
    /// unscope's own predecessor's. Any predecessor absent from `classes`
    /// yields `FlowClass::Error`: the traversal must classify all scope
    /// predecessors before visiting their unscopes.
    pub fn unscope_flow(&self, id: NodeId, classes: &FlowMap) -> Result<FlowClass> {
        let starts = self.unscope_starts(id)?;
        let mut acc: Option<FlowClass> = None;
        for s in starts {
            let class = match self.node(*s)?.parent().and_then(|p| classes.get(&p)) {
                Some(c) => *c,
                None => return Ok(FlowClass::Error),
            };
            acc = Some(match acc {
                Some(a) => a.union(class),
                None => class,
            });
        }
        let own = match self.node(id)?.parent().and_then(|p| classes.get(&p)) {
            Some(c) => *c,
            None => return Ok(FlowClass::Error),
        };
        Ok(match acc {
            Some(a) => a.union(own),
            None => own,
        })
    }

    /// Secondary render targets of an unscope: each paired scope's
    /// predecessor, or `Unresolved` when any predecessor is missing or
    /// unclassified.
    pub fn unscope_links(&self, id: NodeId, classes: &FlowMap) -> Result<ScopeLinks> {
        let starts = self.unscope_starts(id)?;
        let mut targets = Vec::with_capacity(starts.len());
        for s in starts {
            match self.node(*s)?.parent() {
                Some(p) if classes.contains_key(&p) => targets.push(p),
                _ => return Ok(ScopeLinks::Unresolved),
            }
        }
        Ok(ScopeLinks::Resolved(targets))
    }
}
